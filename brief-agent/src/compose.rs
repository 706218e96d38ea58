//! Turns research, memo and figures into a report, a slide list or template fields.

use crate::branding::Branding;
use crate::memo::StrategyMemo;
use crate::research::Research;
use brief_chart::{BarChart, Figure};
use brief_core::Result;
use brief_office::{Alignment, DocxDocument, SlideContent, TemplateFields};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const CHART_WIDTH_IN: f64 = 5.0;
const DIAGRAM_WIDTH_IN: f64 = 5.5;

/// How the financial chart lands in a Word report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    /// An editable Word chart part.
    #[default]
    Native,
    /// The rendered SVG with its PNG fallback.
    Image,
}

/// The chart definition and both rendered figures.
#[derive(Debug, Clone, PartialEq)]
pub struct Figures {
    pub chart: BarChart,
    pub chart_image: Figure,
    pub diagram: Figure,
}

/// The financial chart for `company`, using the memo's figures when it has them.
pub fn financial_chart(company: &str, memo: &StrategyMemo) -> BarChart {
    let chart = BarChart::operational_costs(company);
    match &memo.financials {
        Some(points) => chart.with_points(points.clone()),
        None => chart,
    }
}

fn cover_title(company: &str) -> String {
    format!("Strategic Intelligence Brief: {company}")
}

/// Builds the Word report.
pub fn compose_report(
    company: &str,
    research: &Research,
    memo: &StrategyMemo,
    figures: &Figures,
    branding: &Branding,
    chart_mode: ChartMode,
    date: NaiveDate,
) -> Result<DocxDocument> {
    let mut doc = DocxDocument::new(branding.document_style());
    doc.set_core_properties(&cover_title(company), &branding.author);

    doc.add_heading(&cover_title(company), 0)?;
    doc.add_paragraph(&branding.byline(date));
    doc.add_aligned_paragraph(&branding.confidentiality, Alignment::Center);
    doc.add_page_break();

    doc.add_heading("1. Executive Summary", 1)?;
    doc.add_paragraph(&memo.executive_summary);

    doc.add_heading("2. The Strategic Bottleneck", 1)?;
    doc.add_paragraph(&memo.problem_statement);
    doc.add_caption("Figure 1: Financial Trend Analysis");
    match chart_mode {
        ChartMode::Native => doc.add_bar_chart(&figures.chart, &branding.palette, CHART_WIDTH_IN)?,
        ChartMode::Image => doc.add_figure(&figures.chart_image, CHART_WIDTH_IN)?,
    };

    doc.add_heading("3. Proposed AI Architecture", 1)?;
    doc.add_paragraph(&memo.solution_architecture);
    doc.add_caption("Figure 2: Multi-Agent System Design");
    doc.add_figure(&figures.diagram, DIAGRAM_WIDTH_IN)?;

    doc.add_heading("4. ROI & Implementation", 1)?;
    doc.add_paragraph(&memo.roi_analysis);
    doc.add_heading("Execution Timeline", 2)?;
    doc.add_paragraph(&memo.implementation_plan);

    if !research.sources.is_empty() {
        doc.add_heading("Sources", 1)?;
        for (i, source) in research.sources.iter().enumerate() {
            let line = match (&source.title, &source.uri) {
                (Some(title), Some(uri)) => format!("[{}] {title} ({uri})", i + 1),
                (Some(title), None) => format!("[{}] {title}", i + 1),
                (None, Some(uri)) => format!("[{}] {uri}", i + 1),
                (None, None) => continue,
            };
            doc.add_paragraph(&line);
        }
    }
    Ok(doc)
}

/// One slide per memo section after a title slide. The bottleneck slide
/// carries the chart and the architecture slide the diagram.
pub fn compose_deck(
    company: &str,
    memo: &StrategyMemo,
    figures: &Figures,
    branding: &Branding,
    date: NaiveDate,
) -> Vec<SlideContent> {
    let mut slides = vec![
        SlideContent::new()
            .with_title(memo.title.clone())
            .with_body(format!("{}\n{}", cover_title(company), branding.byline(date))),
    ];
    for section in memo.sections() {
        let mut slide = SlideContent::new().with_title(section.heading).with_body(section.text);
        match section.key {
            "problem_statement" => slide = slide.with_picture(figures.chart_image.clone()),
            "solution_architecture" => slide = slide.with_picture(figures.diagram.clone()),
            _ => {}
        }
        slides.push(slide);
    }
    slides
}

/// Values for the `{{key}}` placeholders of a Word template.
pub fn template_fields(company: &str, memo: &StrategyMemo, branding: &Branding, date: NaiveDate) -> TemplateFields {
    let mut fields = TemplateFields::new()
        .with("company", company)
        .with("title", memo.title.clone())
        .with("date", date.format("%B %Y").to_string())
        .with("author", branding.author.clone())
        .with("confidentiality", branding.confidentiality.clone());
    for section in memo.sections() {
        fields.insert(section.key, section.text);
    }
    fields
}
