//! Sovereign CLI - streams a research session to the terminal

mod commands;
mod logging;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sovereign_core::{ClientConfig, ExportFormat};

#[derive(Parser)]
#[command(name = "sovereign-cli")]
#[command(about = "Terminal client for the Sovereign research pipeline")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one research session and follow it live
    Research(ResearchArgs),
    /// Lay out an existing report file offline
    Export(ExportArgs),
}

#[derive(Args)]
pub struct ResearchArgs {
    /// Research topic
    pub topic: String,

    /// Override the configured streaming endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Write the exported document once the session ends with a report
    #[arg(long)]
    pub export: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct ExportArgs {
    #[arg(long)]
    pub topic: String,

    /// Report text file
    #[arg(long)]
    pub report: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct OutputArgs {
    /// Output directory (defaults to the configured export_dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = FormatArg::Pdf)]
    pub format: FormatArg,
}

impl OutputArgs {
    pub fn dir(&self, config: &ClientConfig) -> PathBuf {
        self.out_dir.clone().unwrap_or_else(|| config.export_dir())
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Pdf,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Pdf => ExportFormat::Pdf,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ClientConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(logging::resolve_level(
        config.log_level.as_deref(),
        cli.verbose,
    ));
    tracing::debug!(
        "{} v{} configuration resolved: endpoint={}, idle_timeout_secs={}",
        sovereign_core::CORE_NAME,
        sovereign_core::VERSION,
        config.endpoint,
        config.idle_timeout_secs
    );

    let result = match cli.command {
        Command::Research(args) => commands::research(args, config).await,
        Command::Export(args) => commands::export(args, &config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Command failed: error={:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
