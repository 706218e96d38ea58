use anyhow::{Result, anyhow};
use brief_cli::{Cli, Commands, commands};
use clap::Parser;
use colored::Colorize;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    brief_telemetry::init_telemetry("brief", cli.log_format).map_err(|e| anyhow!("{e}"))?;

    match cli.command {
        Commands::Generate(args) => {
            let path = commands::generate(args).await?;
            println!("{}", path.display());
        }
        Commands::Figures { company, out, config } => {
            for path in commands::figures(&company, &out, config.as_deref()).await? {
                println!("{}", path.display());
            }
        }
        Commands::Config { config } => commands::show_config(config.as_deref())?,
    }
    Ok(())
}
