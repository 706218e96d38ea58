//! The `brief` subcommands.

use crate::cli::{GenerateArgs, OutputFormat};
use crate::config::BriefConfig;
use crate::secrets::ApiKeys;
use anyhow::{Context, Result, bail};
use brief_agent::{OutputKind, Pipeline, Stage};
use brief_chart::{ArchitectureDiagram, BarChart, Figure};
use brief_model::{GeminiClient, PerplexityClient};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Runs `brief generate` with keys from the environment.
pub async fn generate(args: GenerateArgs) -> Result<PathBuf> {
    let config = BriefConfig::load(args.config.as_deref())?;
    let keys = ApiKeys::from_env(&config)?;
    generate_with(&args, &config, &keys).await
}

/// Generates one brief and writes it to disk, returning the written path.
pub async fn generate_with(args: &GenerateArgs, config: &BriefConfig, keys: &ApiKeys) -> Result<PathBuf> {
    let output = output_kind(args.format, args.template.as_deref())?;
    let retry = config.retry.to_retry_config();

    let hunter = PerplexityClient::new(config.hunter_config(&keys.perplexity))
        .context("cannot create the research client")?
        .with_retry_config(retry.clone());
    let architect = GeminiClient::new(config.architect_config(&keys.gemini))
        .context("cannot create the strategy client")?
        .with_retry_config(retry);

    let pipeline = Pipeline::builder()
        .hunter(Arc::new(hunter))
        .architect(Arc::new(architect))
        .prompts(config.prompts.clone())
        .branding(config.branding.clone())
        .output(output)
        .chart_mode(args.chart.map(Into::into).unwrap_or(config.output.chart))
        .stream(config.models.stream)
        .on_stage(print_stage)
        .build()?;

    let artifact = pipeline.run(&args.company).await?;
    if artifact.degraded {
        eprintln!("{} strategy call failed, the brief uses the fallback memo", "warning:".yellow().bold());
    }

    let target = output_path(args.output.as_deref().or(config.output.directory.as_deref()), &artifact.file_name);
    write_file(&target, &artifact.bytes).await?;

    if let Some(dir) = &args.figures_dir {
        for path in write_figures(dir, &artifact.figures.chart_image, &artifact.figures.diagram).await? {
            eprintln!("{} {}", "figure".dimmed(), path.display());
        }
    }
    eprintln!("{} {}", "✓".green().bold(), artifact.file_name);
    Ok(target)
}

/// Renders the chart and diagram for `company` without calling any model.
pub async fn figures(company: &str, out: &Path, config: Option<&Path>) -> Result<Vec<PathBuf>> {
    let config = BriefConfig::load(config)?;
    let palette = &config.branding.palette;
    let chart = BarChart::operational_costs(company.trim()).render(palette)?;
    let diagram = ArchitectureDiagram::orchestration_layer().render(palette)?;
    write_figures(out, &chart, &diagram).await
}

/// Prints the effective configuration.
pub fn show_config(config: Option<&Path>) -> Result<()> {
    let config = BriefConfig::load(config)?;
    print!("{}", config.to_redacted_toml()?);
    Ok(())
}

fn print_stage(stage: Stage) {
    eprintln!("{} {}", "▸".cyan(), stage.status());
}

/// Chooses the output kind from `--format` and the template's extension.
pub fn output_kind(format: Option<OutputFormat>, template: Option<&Path>) -> Result<OutputKind> {
    let Some(template) = template else {
        return match format {
            Some(OutputFormat::Pptx) => bail!("pptx output needs a slide template, pass --template deck.pptx"),
            _ => Ok(OutputKind::Report),
        };
    };

    let extension = template.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    let inferred = match extension.as_deref() {
        Some("docx") => OutputFormat::Docx,
        Some("pptx") => OutputFormat::Pptx,
        _ => match format {
            Some(format) => format,
            None => bail!("cannot tell the format of {}, pass --format docx|pptx", template.display()),
        },
    };
    if let Some(format) = format {
        if format != inferred {
            bail!("template {} does not match --format", template.display());
        }
    }

    let bytes = std::fs::read(template).with_context(|| format!("cannot read template {}", template.display()))?;
    Ok(match inferred {
        OutputFormat::Docx => OutputKind::DocxTemplate(bytes),
        OutputFormat::Pptx => OutputKind::PptxTemplate(bytes),
    })
}

/// `output` itself, or `output/<file_name>` when it is a directory. With no
/// output the file lands in the working directory.
pub fn output_path(output: Option<&Path>, file_name: &str) -> PathBuf {
    match output {
        None => PathBuf::from(file_name),
        Some(path) if path.is_dir() || path.as_os_str().to_string_lossy().ends_with(['/', '\\']) => {
            path.join(file_name)
        }
        Some(path) => path.to_path_buf(),
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("cannot create directory {}", parent.display()))?;
    }
    tokio::fs::write(path, bytes).await.with_context(|| format!("cannot write {}", path.display()))?;
    brief_telemetry::info!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

async fn write_figures(dir: &Path, chart: &Figure, diagram: &Figure) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(4);
    for (stem, figure) in [("chart", chart), ("diagram", diagram)] {
        let svg = dir.join(format!("{stem}.svg"));
        write_file(&svg, figure.svg_bytes()).await?;
        let png = dir.join(format!("{stem}.png"));
        write_file(&png, &figure.png).await?;
        written.extend([svg, png]);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_is_the_default_output() {
        assert_eq!(output_kind(None, None).unwrap(), OutputKind::Report);
        assert_eq!(output_kind(Some(OutputFormat::Docx), None).unwrap(), OutputKind::Report);
    }

    #[test]
    fn pptx_needs_a_template() {
        let err = output_kind(Some(OutputFormat::Pptx), None).unwrap_err();
        assert!(err.to_string().contains("--template"));
    }

    #[test]
    fn template_extension_selects_the_kind() {
        let dir = tempfile::tempdir().unwrap();
        let deck = dir.path().join("Deck.PPTX");
        std::fs::write(&deck, b"pk").unwrap();

        assert_eq!(output_kind(None, Some(&deck)).unwrap(), OutputKind::PptxTemplate(b"pk".to_vec()));
        assert!(output_kind(Some(OutputFormat::Docx), Some(&deck)).is_err());
    }

    #[test]
    fn unknown_extension_needs_a_format() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("brief.tmpl");
        std::fs::write(&template, b"pk").unwrap();

        assert!(output_kind(None, Some(&template)).is_err());
        assert_eq!(
            output_kind(Some(OutputFormat::Docx), Some(&template)).unwrap(),
            OutputKind::DocxTemplate(b"pk".to_vec())
        );
    }

    #[test]
    fn missing_template_is_an_error() {
        let err = output_kind(None, Some(Path::new("/nowhere/deck.pptx"))).unwrap_err();
        assert!(err.to_string().contains("cannot read template"));
    }

    #[test]
    fn output_paths() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(output_path(None, "a.docx"), PathBuf::from("a.docx"));
        assert_eq!(output_path(Some(dir.path()), "a.docx"), dir.path().join("a.docx"));
        assert_eq!(output_path(Some(Path::new("out/")), "a.docx"), PathBuf::from("out/a.docx"));
        assert_eq!(output_path(Some(Path::new("out/b.docx")), "a.docx"), PathBuf::from("out/b.docx"));
    }

    #[tokio::test]
    async fn figures_are_written_as_svg_and_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("figs");
        let config = dir.path().join("brief.toml");
        std::fs::write(&config, "").unwrap();

        let written = figures("Contoso", &out, Some(&config)).await.unwrap();

        let names: Vec<_> = written.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
        assert_eq!(names, ["chart.svg", "chart.png", "diagram.svg", "diagram.png"]);
        let svg = std::fs::read_to_string(out.join("chart.svg")).unwrap();
        assert!(svg.contains("Contoso"));
        let png = std::fs::read(out.join("diagram.png")).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
