use crate::branding::Branding;
use crate::compose::{ChartMode, Figures, compose_deck, compose_report, financial_chart, template_fields};
use crate::prompts::Prompts;
use crate::research::ResearchAgent;
use crate::strategy::StrategyAgent;
use brief_chart::ArchitectureDiagram;
use brief_core::{BriefError, Llm, Result};
use brief_office::{DOCX_MIME_TYPE, PPTX_MIME_TYPE, populate_docx, populate_pptx};
use brief_telemetry::Instrument;
use chrono::{Local, NaiveDate};
use std::fmt;
use std::sync::Arc;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Research,
    Strategy,
    Chart,
    Diagram,
    Compile,
}

impl Stage {
    pub const ALL: [Stage; 5] = [Stage::Research, Stage::Strategy, Stage::Chart, Stage::Diagram, Stage::Compile];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Research => "research",
            Stage::Strategy => "strategy",
            Stage::Chart => "chart",
            Stage::Diagram => "diagram",
            Stage::Compile => "compile",
        }
    }

    /// Human status line shown while the stage runs.
    pub fn status(self) -> &'static str {
        match self {
            Stage::Research => "Scanning research sources for financial leaks...",
            Stage::Strategy => "Architecting the solution...",
            Stage::Chart => "Rendering financial model...",
            Stage::Diagram => "Designing system architecture...",
            Stage::Compile => "Compiling document...",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Called as each stage starts.
pub type StageCallback = Box<dyn Fn(Stage) + Send + Sync>;

/// What the compile stage produces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputKind {
    /// A Word report built from scratch.
    #[default]
    Report,
    /// A Word template whose `{{key}}` placeholders are filled.
    DocxTemplate(Vec<u8>),
    /// A slide deck whose placeholders are filled slide by slide.
    PptxTemplate(Vec<u8>),
}

impl OutputKind {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputKind::Report | OutputKind::DocxTemplate(_) => "docx",
            OutputKind::PptxTemplate(_) => "pptx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputKind::Report | OutputKind::DocxTemplate(_) => DOCX_MIME_TYPE,
            OutputKind::PptxTemplate(_) => PPTX_MIME_TYPE,
        }
    }
}

/// A finished brief.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    /// The memo is the fallback because the strategy call failed.
    pub degraded: bool,
    /// The figures embedded in the document.
    pub figures: Figures,
}

/// `Strategy_Brief_<company>_<suffix>.<ext>`, keeping only alphanumerics,
/// `-` and `_` from the company name and the suffix. Spaces become `_`.
pub fn output_file_name(company: &str, suffix: &str, extension: &str) -> String {
    let clean = |s: &str| -> String {
        s.trim()
            .chars()
            .filter_map(|c| match c {
                c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
                c if c.is_whitespace() => Some('_'),
                _ => None,
            })
            .collect()
    };
    let company = match clean(company) {
        name if name.is_empty() => "Company".to_string(),
        name => name,
    };
    match clean(suffix) {
        suffix if suffix.is_empty() => format!("Strategy_Brief_{company}.{extension}"),
        suffix => format!("Strategy_Brief_{company}_{suffix}.{extension}"),
    }
}

/// Research, strategy, figures and compilation for one company.
pub struct Pipeline {
    research: ResearchAgent,
    strategy: StrategyAgent,
    branding: Branding,
    output: OutputKind,
    chart_mode: ChartMode,
    date: Option<NaiveDate>,
    on_stage: Option<StageCallback>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("research", &self.research)
            .field("strategy", &self.strategy)
            .field("output", &self.output.extension())
            .field("chart_mode", &self.chart_mode)
            .finish()
    }
}

pub struct PipelineBuilder {
    hunter: Option<Arc<dyn Llm>>,
    architect: Option<Arc<dyn Llm>>,
    prompts: Prompts,
    branding: Branding,
    output: OutputKind,
    chart_mode: ChartMode,
    stream: bool,
    hunter_temperature: Option<f32>,
    architect_temperature: Option<f32>,
    date: Option<NaiveDate>,
    on_stage: Option<StageCallback>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            hunter: None,
            architect: None,
            prompts: Prompts::default(),
            branding: Branding::default(),
            output: OutputKind::default(),
            chart_mode: ChartMode::default(),
            stream: false,
            hunter_temperature: None,
            architect_temperature: None,
            date: None,
            on_stage: None,
        }
    }

    /// The research model.
    pub fn hunter(mut self, model: Arc<dyn Llm>) -> Self {
        self.hunter = Some(model);
        self
    }

    /// The strategy model.
    pub fn architect(mut self, model: Arc<dyn Llm>) -> Self {
        self.architect = Some(model);
        self
    }

    pub fn prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn branding(mut self, branding: Branding) -> Self {
        self.branding = branding;
        self
    }

    pub fn output(mut self, output: OutputKind) -> Self {
        self.output = output;
        self
    }

    pub fn chart_mode(mut self, chart_mode: ChartMode) -> Self {
        self.chart_mode = chart_mode;
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn hunter_temperature(mut self, temperature: Option<f32>) -> Self {
        self.hunter_temperature = temperature;
        self
    }

    pub fn architect_temperature(mut self, temperature: Option<f32>) -> Self {
        self.architect_temperature = temperature;
        self
    }

    /// Fixes the cover date instead of using today's.
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn on_stage(mut self, callback: impl Fn(Stage) + Send + Sync + 'static) -> Self {
        self.on_stage = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let hunter = self.hunter.ok_or_else(|| BriefError::Agent("hunter model is required".to_string()))?;
        let architect =
            self.architect.ok_or_else(|| BriefError::Agent("architect model is required".to_string()))?;
        let year = self.branding.target_year;

        let mut research = ResearchAgent::new(hunter)
            .with_prompt(self.prompts.research)
            .with_target_year(year)
            .with_stream(self.stream);
        if let Some(t) = self.hunter_temperature {
            research = research.with_temperature(t);
        }
        let mut strategy = StrategyAgent::new(architect)
            .with_prompt(self.prompts.strategy)
            .with_target_year(year)
            .with_stream(self.stream);
        if let Some(t) = self.architect_temperature {
            strategy = strategy.with_temperature(t);
        }

        Ok(Pipeline {
            research,
            strategy,
            branding: self.branding,
            output: self.output,
            chart_mode: self.chart_mode,
            date: self.date,
            on_stage: self.on_stage,
        })
    }
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    fn enter(&self, stage: Stage) -> brief_telemetry::Span {
        if let Some(callback) = &self.on_stage {
            callback(stage);
        }
        brief_telemetry::info!(stage = %stage, "{}", stage.status());
        brief_telemetry::stage_span(stage.as_str())
    }

    /// Generates the brief for `company`.
    pub async fn run(&self, company: &str) -> Result<Artifact> {
        let company = company.trim();
        if company.is_empty() {
            return Err(BriefError::Agent("company name is blank".to_string()));
        }
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = brief_telemetry::pipeline_span(company, &run_id);
        self.run_stages(company).instrument(span).await
    }

    async fn run_stages(&self, company: &str) -> Result<Artifact> {
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        let palette = &self.branding.palette;

        let span = self.enter(Stage::Research);
        let research = self.research.research(company).instrument(span).await?;

        let span = self.enter(Stage::Strategy);
        let outcome = self.strategy.strategize(&research).instrument(span).await?;
        let memo = outcome.memo;

        let (chart, chart_image) = {
            let _span = self.enter(Stage::Chart).entered();
            let chart = financial_chart(company, &memo);
            let image = chart.render(palette)?;
            (chart, image)
        };

        let diagram = {
            let _span = self.enter(Stage::Diagram).entered();
            ArchitectureDiagram::orchestration_layer().render(palette)?
        };
        let figures = Figures { chart, chart_image, diagram };

        let bytes = {
            let _span = self.enter(Stage::Compile).entered();
            match &self.output {
                OutputKind::Report => {
                    compose_report(company, &research, &memo, &figures, &self.branding, self.chart_mode, date)?
                        .to_bytes()?
                }
                OutputKind::DocxTemplate(template) => {
                    populate_docx(template, &template_fields(company, &memo, &self.branding, date))?
                }
                OutputKind::PptxTemplate(template) => {
                    populate_pptx(template, &compose_deck(company, &memo, &figures, &self.branding, date))?
                }
            }
        };

        let artifact = Artifact {
            file_name: output_file_name(company, &self.branding.file_suffix, self.output.extension()),
            mime_type: self.output.mime_type().to_string(),
            bytes,
            degraded: outcome.degraded,
            figures,
        };
        brief_telemetry::info!(
            file = %artifact.file_name,
            bytes = artifact.bytes.len(),
            degraded = artifact.degraded,
            "brief ready"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(output_file_name("Contoso", "Report", "docx"), "Strategy_Brief_Contoso_Report.docx");
        assert_eq!(output_file_name(" AT&T Inc. ", "Q3 Deck", "pptx"), "Strategy_Brief_ATT_Inc_Q3_Deck.pptx");
        assert_eq!(output_file_name("../../etc", "", "docx"), "Strategy_Brief_etc.docx");
        assert_eq!(output_file_name("???", "x", "docx"), "Strategy_Brief_Company_x.docx");
    }

    #[test]
    fn output_kind_extensions_and_mime_types() {
        assert_eq!(OutputKind::Report.extension(), "docx");
        assert_eq!(OutputKind::PptxTemplate(vec![]).mime_type(), PPTX_MIME_TYPE);
        assert_eq!(OutputKind::DocxTemplate(vec![]).mime_type(), DOCX_MIME_TYPE);
    }

    #[test]
    fn builder_requires_both_models() {
        let err = Pipeline::builder().build().unwrap_err();
        assert!(matches!(err, BriefError::Agent(msg) if msg.contains("hunter")));
    }

    #[test]
    fn stages_are_ordered() {
        let names: Vec<_> = Stage::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["research", "strategy", "chart", "diagram", "compile"]);
    }
}
