//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, estimate::EstimateArgs,
    extract::ExtractArgs, init::InitArgs, list::ListArgs, quote::QuoteArgs, refs::RefsCommands,
    show::ShowArgs,
};

#[derive(Parser)]
#[command(name = "qf")]
#[command(author, version, about = "QuoteForge machining quote estimator")]
#[command(long_about = "Recover part signals from drawing text and turn them into a priced machining estimate.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .qf/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new QuoteForge project
    Init(InitArgs),

    /// Extract part signals from drawing text
    Extract(ExtractArgs),

    /// Full pipeline: text, signals, references, estimate
    Quote(QuoteArgs),

    /// Run only the estimation engine on a signal map
    Estimate(EstimateArgs),

    /// List saved quotes
    List(ListArgs),

    /// Show a saved quote
    Show(ShowArgs),

    /// Reference knowledge store
    #[command(subcommand)]
    Refs(RefsCommands),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for single results, tsv for lists)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// Tab-separated values (for piping)
    Tsv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(OutputFormat::Auto),
            "yaml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            "tsv" => Ok(OutputFormat::Tsv),
            _ => Err(format!(
                "Unknown format: {}. Use auto, yaml, json, or tsv",
                s
            )),
        }
    }
}
