/// A rendered figure: full SVG plus a PNG fallback of identical size.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub svg: String,
    pub png: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

impl Figure {
    /// Height over width, used to size the figure when placed at a fixed width.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width_px == 0 { 0.0 } else { f64::from(self.height_px) / f64::from(self.width_px) }
    }

    pub fn svg_bytes(&self) -> &[u8] {
        self.svg.as_bytes()
    }
}
