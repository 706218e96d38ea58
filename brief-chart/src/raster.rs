// Shape rasterizer backing the PNG fallback

use crate::color::Rgb;
use brief_core::{BriefError, Result};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

fn rgba(color: Rgb) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, 255])
}

/// White canvas with just enough primitives for bars, boxes and arrows.
pub(crate) struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { image: ImageBuffer::from_pixel(width, height, rgba(Rgb::WHITE)) }
    }

    fn put(&mut self, x: i64, y: i64, color: Rgba<u8>) {
        if x >= 0 && y >= 0 && (x as u32) < self.image.width() && (y as u32) < self.image.height() {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    /// Axis-aligned rectangle covering pixel centers inside `[x0, x1) x [y0, y1)`.
    pub fn fill_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb) {
        let color = rgba(color);
        for y in y0.round() as i64..y1.round() as i64 {
            for x in x0.round() as i64..x1.round() as i64 {
                self.put(x, y, color);
            }
        }
    }

    pub fn fill_rounded_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64, color: Rgb) {
        let color = rgba(color);
        let radius = radius.min(w / 2.0).min(h / 2.0).max(0.0);
        for py in y.floor() as i64..(y + h).ceil() as i64 {
            for px in x.floor() as i64..(x + w).ceil() as i64 {
                let (cx, cy) = (px as f64 + 0.5, py as f64 + 0.5);
                if inside_rounded(cx, cy, x, y, w, h, radius) {
                    self.put(px, py, color);
                }
            }
        }
    }

    /// Thick line stamped as squares along its length.
    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), thickness: f64, color: Rgb) {
        self.dashed_line(from, to, thickness, color, None);
    }

    /// Line drawn as `dash` on / `gap` off segments when a pattern is given.
    pub fn dashed_line(
        &mut self,
        (x0, y0): (f64, f64),
        (x1, y1): (f64, f64),
        thickness: f64,
        color: Rgb,
        pattern: Option<(f64, f64)>,
    ) {
        let color = rgba(color);
        let length = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        let steps = length.ceil().max(1.0) as i64;
        let half = (thickness / 2.0).max(0.5);

        for step in 0..=steps {
            let travelled = length * step as f64 / steps as f64;
            if let Some((dash, gap)) = pattern {
                if travelled % (dash + gap) >= dash {
                    continue;
                }
            }
            let t = step as f64 / steps as f64;
            let (cx, cy) = (x0 + (x1 - x0) * t, y0 + (y1 - y0) * t);
            for py in (cy - half).round() as i64..(cy + half).round() as i64 {
                for px in (cx - half).round() as i64..(cx + half).round() as i64 {
                    self.put(px, py, color);
                }
            }
        }
    }

    pub fn fill_triangle(&mut self, points: [(f64, f64); 3], color: Rgb) {
        let color = rgba(color);
        let min_x = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min).floor() as i64;
        let max_x = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max).ceil() as i64;
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min).floor() as i64;
        let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max).ceil() as i64;

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                if inside_triangle((px as f64 + 0.5, py as f64 + 0.5), &points) {
                    self.put(px, py, color);
                }
            }
        }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let Rgba([r, g, b, _]) = *self.image.get_pixel(x, y);
        Rgb::new(r, g, b)
    }

    pub fn encode_png(self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(self.image)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| BriefError::Chart(format!("PNG encoding failed: {e}")))?;
        Ok(buffer)
    }
}

fn inside_rounded(px: f64, py: f64, x: f64, y: f64, w: f64, h: f64, r: f64) -> bool {
    if px < x || px > x + w || py < y || py > y + h {
        return false;
    }
    // Nearest corner circle center; points outside the corner squares are inside.
    let cx = px.clamp(x + r, x + w - r);
    let cy = py.clamp(y + r, y + h - r);
    (px - cx).powi(2) + (py - cy).powi(2) <= r * r
}

fn inside_triangle(p: (f64, f64), [a, b, c]: &[(f64, f64); 3]) -> bool {
    let cross = |o: (f64, f64), u: (f64, f64), v: (f64, f64)| {
        (u.0 - o.0) * (v.1 - o.1) - (u.1 - o.1) * (v.0 - o.0)
    };
    let d1 = cross(*a, *b, p);
    let d2 = cross(*b, *c, p);
    let d3 = cross(*c, *a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
