use crate::color::{Palette, Rgb};
use crate::figure::Figure;
use crate::raster::Canvas;
use crate::svg::{Anchor, SvgBuilder, TextStyle};
use brief_core::{BriefError, Result};
use serde::{Deserialize, Serialize};

const WIDTH: u32 = 840;
const HEIGHT: u32 = 480;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 80.0;
const MARGIN_BOTTOM: f64 = 60.0;
/// Share of each category slot covered by its bar.
const BAR_WIDTH: f64 = 0.6;
/// Largest bar value that still yields a finite, nice value axis.
pub const MAX_VALUE: f64 = 1e15;
/// Upper bound on gridlines drawn on the value axis.
const MAX_TICKS: usize = 20;

/// One bar: a category label and a non-negative value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
}

impl DataPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self { label: label.into(), value }
    }

    /// Finite, non-negative and at most [`MAX_VALUE`].
    pub fn is_plottable(&self) -> bool {
        self.value.is_finite() && (0.0..=MAX_VALUE).contains(&self.value)
    }
}

/// A single-series vertical bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub title: String,
    pub y_label: String,
    pub points: Vec<DataPoint>,
    /// Bar color; the palette's primary color when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

impl BarChart {
    pub fn new(title: impl Into<String>, y_label: impl Into<String>, points: Vec<DataPoint>) -> Self {
        Self { title: title.into(), y_label: y_label.into(), points, color: None }
    }

    /// The operating-expense trend used when the memo carries no figures.
    pub fn operational_costs(company: &str) -> Self {
        Self::new(
            format!("{company}: Rising Operational Costs"),
            "Billions ($)",
            vec![
                DataPoint::new("2022", 12.5),
                DataPoint::new("2023", 13.2),
                DataPoint::new("2024", 14.8),
                DataPoint::new("2025 (Est)", 16.1),
            ],
        )
    }

    pub fn with_points(mut self, points: Vec<DataPoint>) -> Self {
        self.points = points;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// Checks that the series is non-empty and every value is plottable.
    pub fn validate(&self) -> Result<()> {
        if self.points.is_empty() {
            return Err(BriefError::Chart("bar chart has no data points".to_string()));
        }
        if let Some(bad) = self.points.iter().find(|p| !p.is_plottable()) {
            return Err(BriefError::Chart(format!(
                "bar '{}' has invalid value {}",
                bad.label, bad.value
            )));
        }
        Ok(())
    }

    /// Value axis as `(step, max)`, both "nice" numbers.
    pub fn value_axis(&self) -> (f64, f64) {
        let max = self.points.iter().map(|p| p.value).fold(0.0, f64::max);
        nice_axis(max)
    }

    pub fn render(&self, palette: &Palette) -> Result<Figure> {
        self.validate()?;

        let bar_color = self.color.unwrap_or(palette.primary);
        let grid_color = palette.connector.over(Rgb::WHITE, 0.3);
        let (step, axis_max) = self.value_axis();
        if !(step > 0.0 && axis_max.is_finite()) {
            return Err(BriefError::Chart(format!("cannot scale value axis to {axis_max}")));
        }

        let plot_left = MARGIN_LEFT;
        let plot_right = f64::from(WIDTH) - MARGIN_RIGHT;
        let plot_top = MARGIN_TOP;
        let plot_bottom = f64::from(HEIGHT) - MARGIN_BOTTOM;
        let plot_height = plot_bottom - plot_top;
        let y_of = |value: f64| plot_bottom - value / axis_max * plot_height;

        let mut svg = SvgBuilder::new(WIDTH, HEIGHT);
        let mut canvas = Canvas::new(WIDTH, HEIGHT);

        let tick_style = TextStyle::new(12.0, palette.text).anchor(Anchor::End);
        let ticks = ((axis_max / step).round() as usize).min(MAX_TICKS);
        for i in 0..=ticks {
            let value = step * i as f64;
            let y = y_of(value);
            if i > 0 {
                svg.line((plot_left, y), (plot_right, y), palette.connector, 1.0, Some("6 4"), Some(0.3));
                canvas.dashed_line((plot_left, y), (plot_right, y), 1.0, grid_color, Some((6.0, 4.0)));
            }
            svg.text(plot_left - 8.0, y + 4.0, &format_tick(value, step), &tick_style);
        }

        let slot = (plot_right - plot_left) / self.points.len() as f64;
        let bar_width = slot * BAR_WIDTH;
        let label_style = TextStyle::new(12.0, palette.text);
        for (i, point) in self.points.iter().enumerate() {
            let x = plot_left + slot * i as f64 + (slot - bar_width) / 2.0;
            let top = y_of(point.value);
            svg.rect(x, top, bar_width, plot_bottom - top, bar_color);
            canvas.fill_rect(x, top, x + bar_width, plot_bottom, bar_color);
            svg.text(x + bar_width / 2.0, plot_bottom + 22.0, &point.label, &label_style);
        }

        // Axis spines
        svg.line((plot_left, plot_top), (plot_left, plot_bottom), palette.connector, 1.0, None, None);
        svg.line((plot_left, plot_bottom), (plot_right, plot_bottom), palette.connector, 1.0, None, None);
        canvas.line((plot_left, plot_top), (plot_left, plot_bottom), 1.0, palette.connector);
        canvas.line((plot_left, plot_bottom), (plot_right, plot_bottom), 1.0, palette.connector);

        let title_style = TextStyle::new(20.0, palette.text).bold();
        svg.text(f64::from(WIDTH) / 2.0, 40.0, &self.title, &title_style);

        let axis_label_style = TextStyle::new(13.0, palette.text).rotate(-90.0);
        svg.text(28.0, (plot_top + plot_bottom) / 2.0, &self.y_label, &axis_label_style);

        Ok(Figure {
            svg: svg.build(),
            png: canvas.encode_png()?,
            width_px: WIDTH,
            height_px: HEIGHT,
        })
    }
}

/// Picks a step of 1, 2, 2.5 or 5 times a power of ten giving about five
/// ticks, and the smallest multiple of it at or above `max`.
fn nice_axis(max: f64) -> (f64, f64) {
    if max <= 0.0 {
        return (1.0, 1.0);
    }
    let raw = max / 5.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .find(|f| *f >= normalized)
        .unwrap_or(10.0);
    let step = factor * magnitude;
    let axis_max = ((max / step) - 1e-9).ceil().max(1.0) * step;
    (step, axis_max)
}

fn format_tick(value: f64, step: f64) -> String {
    if step.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else if (step * 10.0).fract().abs() < 1e-9 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    }
}
