use brief_agent::ChartMode;
use brief_telemetry::LogFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Strategic intelligence briefs from research and strategy models
#[derive(Parser, Debug)]
#[command(name = "brief")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log line format on stderr
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a company and write the brief
    Generate(GenerateArgs),
    /// Render the chart and architecture diagram without calling any model
    Figures {
        /// Company named in the chart title
        company: String,
        /// Directory for chart.svg, chart.png, diagram.svg and diagram.png
        #[arg(long)]
        out: PathBuf,
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the effective configuration with secrets redacted
    Config {
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Target company
    pub company: String,

    /// Output format; inferred from --template when omitted
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// DOCX or PPTX template to populate instead of building a report
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Output file, or directory for the default file name
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Also write the rendered figures to this directory
    #[arg(long)]
    pub figures_dir: Option<PathBuf>,

    /// How the financial chart is embedded in a report
    #[arg(long, value_enum)]
    pub chart: Option<ChartArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Docx,
    Pptx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartArg {
    /// Editable Word chart
    Native,
    /// Rendered picture
    Image,
}

impl From<ChartArg> for ChartMode {
    fn from(arg: ChartArg) -> Self {
        match arg {
            ChartArg::Native => ChartMode::Native,
            ChartArg::Image => ChartMode::Image,
        }
    }
}
