use crate::color::Palette;
use crate::figure::Figure;
use crate::raster::Canvas;
use crate::svg::{SvgBuilder, TextStyle};
use brief_core::{BriefError, Result};
use serde::{Deserialize, Serialize};

const WIDTH: u32 = 960;
const HEIGHT: u32 = 600;
const BORDER: f64 = 3.0;
const CORNER_RADIUS: f64 = 14.0;
const ARROW_WIDTH: f64 = 3.0;
const HEAD_LENGTH: f64 = 16.0;
const HEAD_HALF_WIDTH: f64 = 9.0;

/// A labelled box. Coordinates are fractions of the figure with the origin
/// at the bottom-left corner; `(x, y)` is the box's lower-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub label: String,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_node_width")]
    pub width: f64,
    #[serde(default = "default_node_height")]
    pub height: f64,
}

fn default_node_width() -> f64 {
    0.2
}

fn default_node_height() -> f64 {
    0.15
}

impl Node {
    pub fn new(label: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            label: label.into(),
            x,
            y,
            width: default_node_width(),
            height: default_node_height(),
        }
    }

    fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Boxes joined by arrows, with a title across the top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureDiagram {
    pub title: String,
    pub nodes: Vec<Node>,
    /// `(from, to)` pairs of node labels.
    pub edges: Vec<(String, String)>,
}

impl ArchitectureDiagram {
    /// The five-box orchestration layer: data feeding an agent core that
    /// drives actions, the user interface and the legacy ERP.
    pub fn orchestration_layer() -> Self {
        const CORE: &str = "AI Agent Core";
        Self {
            title: "Proposed AI Orchestration Layer".to_string(),
            nodes: vec![
                Node::new("Data Lake", 0.1, 0.4),
                Node::new(CORE, 0.4, 0.4),
                Node::new("Action Layer", 0.7, 0.4),
                Node::new("User Interface", 0.4, 0.7),
                Node::new("Legacy ERP", 0.4, 0.1),
            ],
            edges: [
                ("Data Lake", CORE),
                (CORE, "Action Layer"),
                (CORE, "User Interface"),
                (CORE, "Legacy ERP"),
            ]
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect(),
        }
    }

    fn node(&self, label: &str) -> Result<&Node> {
        self.nodes
            .iter()
            .find(|n| n.label == label)
            .ok_or_else(|| BriefError::Chart(format!("diagram edge names unknown node '{label}'")))
    }

    /// Start and end of each arrow in diagram units.
    ///
    /// Arrows leave and enter on the box sides facing each other: left/right
    /// when the horizontal offset between centers dominates, otherwise
    /// top/bottom.
    pub fn arrow_endpoints(&self) -> Result<Vec<((f64, f64), (f64, f64))>> {
        self.edges
            .iter()
            .map(|(from, to)| {
                let (a, b) = (self.node(from)?, self.node(to)?);
                let ((ax, ay), (bx, by)) = (a.center(), b.center());
                let (dx, dy) = (bx - ax, by - ay);
                Ok(if dx.abs() >= dy.abs() {
                    let (start_x, end_x) =
                        if dx >= 0.0 { (a.x + a.width, b.x) } else { (a.x, b.x + b.width) };
                    ((start_x, ay), (end_x, by))
                } else {
                    let (start_y, end_y) =
                        if dy >= 0.0 { (a.y + a.height, b.y) } else { (a.y, b.y + b.height) };
                    ((ax, start_y), (bx, end_y))
                })
            })
            .collect()
    }

    pub fn render(&self, palette: &Palette) -> Result<Figure> {
        if self.nodes.is_empty() {
            return Err(BriefError::Chart("diagram has no nodes".to_string()));
        }
        let arrows = self.arrow_endpoints()?;

        let (w, h) = (f64::from(WIDTH), f64::from(HEIGHT));
        let to_px = |(x, y): (f64, f64)| (x * w, (1.0 - y) * h);

        let mut svg = SvgBuilder::new(WIDTH, HEIGHT);
        let mut canvas = Canvas::new(WIDTH, HEIGHT);

        for node in &self.nodes {
            let (left, top) = to_px((node.x, node.y + node.height));
            let (bw, bh) = (node.width * w, node.height * h);
            svg.rounded_rect(left, top, bw, bh, CORNER_RADIUS, palette.fill, palette.primary, BORDER);
            canvas.fill_rounded_rect(left, top, bw, bh, CORNER_RADIUS, palette.primary);
            canvas.fill_rounded_rect(
                left + BORDER,
                top + BORDER,
                bw - 2.0 * BORDER,
                bh - 2.0 * BORDER,
                CORNER_RADIUS - BORDER,
                palette.fill,
            );
        }

        for (start, end) in arrows {
            let (start, end) = (to_px(start), to_px(end));
            let (dx, dy) = (end.0 - start.0, end.1 - start.1);
            let length = (dx * dx + dy * dy).sqrt();
            if length < f64::EPSILON {
                continue;
            }
            let (ux, uy) = (dx / length, dy / length);
            let head_length = HEAD_LENGTH.min(length);
            let neck = (end.0 - ux * head_length, end.1 - uy * head_length);
            let head = [
                end,
                (neck.0 - uy * HEAD_HALF_WIDTH, neck.1 + ux * HEAD_HALF_WIDTH),
                (neck.0 + uy * HEAD_HALF_WIDTH, neck.1 - ux * HEAD_HALF_WIDTH),
            ];

            svg.line(start, neck, palette.connector, ARROW_WIDTH, None, None);
            svg.polygon(&head, palette.connector);
            canvas.line(start, neck, ARROW_WIDTH, palette.connector);
            canvas.fill_triangle(head, palette.connector);
        }

        let label_style = TextStyle::new(15.0, palette.text).bold();
        for node in &self.nodes {
            let (cx, cy) = to_px(node.center());
            svg.text(cx, cy + 5.0, &node.label, &label_style);
        }

        let title_style = TextStyle::new(20.0, palette.primary).bold();
        let (tx, ty) = to_px((0.5, 0.9));
        svg.text(tx, ty, &self.title, &title_style);

        Ok(Figure {
            svg: svg.build(),
            png: canvas.encode_png()?,
            width_px: WIDTH,
            height_px: HEIGHT,
        })
    }
}
