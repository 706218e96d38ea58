// SVG generation for chart figures

use crate::color::Rgb;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Text element options
#[derive(Debug, Clone)]
pub(crate) struct TextStyle {
    pub size: f64,
    pub bold: bool,
    pub anchor: Anchor,
    pub fill: Rgb,
    /// Rotation in degrees around the text origin
    pub rotate: Option<f64>,
}

impl TextStyle {
    pub fn new(size: f64, fill: Rgb) -> Self {
        Self { size, bold: false, anchor: Anchor::Middle, fill, rotate: None }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn rotate(mut self, degrees: f64) -> Self {
        self.rotate = Some(degrees);
        self
    }
}

/// Accumulates SVG elements and serializes the document
pub(crate) struct SvgBuilder {
    width: u32,
    height: u32,
    font_family: String,
    elements: Vec<String>,
}

impl SvgBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            font_family: "Calibri, Arial, Helvetica, sans-serif".to_string(),
            elements: Vec::new(),
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Rgb) {
        self.elements.push(format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill}"/>"#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(w),
            fmt_num(h),
        ));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn rounded_rect(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        radius: f64,
        fill: Rgb,
        stroke: Rgb,
        stroke_width: f64,
    ) {
        self.elements.push(format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{r}" ry="{r}" fill="{fill}" stroke="{stroke}" stroke-width="{}"/>"#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(w),
            fmt_num(h),
            fmt_num(stroke_width),
            r = fmt_num(radius),
        ));
    }

    pub fn line(
        &mut self,
        (x1, y1): (f64, f64),
        (x2, y2): (f64, f64),
        stroke: Rgb,
        width: f64,
        dash: Option<&str>,
        opacity: Option<f64>,
    ) {
        let mut element = format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{stroke}" stroke-width="{}""#,
            fmt_num(x1),
            fmt_num(y1),
            fmt_num(x2),
            fmt_num(y2),
            fmt_num(width),
        );
        if let Some(dash) = dash {
            let _ = write!(element, r#" stroke-dasharray="{dash}""#);
        }
        if let Some(opacity) = opacity {
            let _ = write!(element, r#" stroke-opacity="{}""#, fmt_num(opacity));
        }
        element.push_str("/>");
        self.elements.push(element);
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], fill: Rgb) {
        let points: Vec<String> =
            points.iter().map(|(x, y)| format!("{},{}", fmt_num(*x), fmt_num(*y))).collect();
        self.elements.push(format!(r#"<polygon points="{}" fill="{fill}"/>"#, points.join(" ")));
    }

    pub fn text(&mut self, x: f64, y: f64, text: &str, style: &TextStyle) {
        let mut element = format!(
            r#"<text x="{}" y="{}" font-size="{}" text-anchor="{}" fill="{}""#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(style.size),
            style.anchor.as_str(),
            style.fill,
        );
        if style.bold {
            element.push_str(r#" font-weight="bold""#);
        }
        if let Some(degrees) = style.rotate {
            let _ = write!(
                element,
                r#" transform="rotate({} {} {})""#,
                fmt_num(degrees),
                fmt_num(x),
                fmt_num(y)
            );
        }
        let _ = write!(element, ">{}</text>", escape(text));
        self.elements.push(element);
    }

    pub fn build(&self) -> String {
        let mut svg = String::new();
        svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        svg.push('\n');
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{}">"#,
            escape(&self.font_family),
            w = self.width,
            h = self.height,
        );
        svg.push('\n');
        let _ = writeln!(
            svg,
            r#"  <rect width="{}" height="{}" fill="{}"/>"#,
            self.width,
            self.height,
            Rgb::WHITE
        );
        for element in &self.elements {
            svg.push_str("  ");
            svg.push_str(element);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }
}

/// Two decimals at most, trailing zeros trimmed.
fn fmt_num(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_compact() {
        assert_eq!(fmt_num(12.0), "12");
        assert_eq!(fmt_num(12.5), "12.5");
        assert_eq!(fmt_num(1.0 / 3.0), "0.33");
        assert_eq!(fmt_num(-0.001), "0");
    }

    #[test]
    fn text_is_escaped_and_rotated() {
        let mut svg = SvgBuilder::new(100, 50);
        let style = TextStyle::new(10.0, Rgb::new(0, 0, 0)).bold().rotate(-90.0);
        svg.text(5.0, 25.0, "R&D <core>", &style);
        let out = svg.build();

        assert!(out.contains("R&amp;D &lt;core&gt;"));
        assert!(out.contains(r#"transform="rotate(-90 5 25)""#));
        assert!(out.contains(r#"font-weight="bold""#));
        assert!(out.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn dashed_line_attributes() {
        let mut svg = SvgBuilder::new(10, 10);
        svg.line((0.0, 5.0), (10.0, 5.0), Rgb::new(0x55, 0x55, 0x55), 1.0, Some("4 4"), Some(0.3));
        let out = svg.build();
        assert!(out.contains(r#"stroke-dasharray="4 4""#));
        assert!(out.contains(r#"stroke-opacity="0.3""#));
        assert!(out.contains(r##"stroke="#555555""##));
    }
}
