//! `qf estimate` command - run the estimation engine on a signal map

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

use crate::cli::helpers::{print_structured, single_format, SignalOverrides};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::estimate::{EstimateResult, EstimationEngine, ReadinessPolicy};
use crate::signals::PartSignals;

#[derive(clap::Args, Debug)]
pub struct EstimateArgs {
    /// Signal map to start from (JSON or YAML)
    #[arg(long)]
    pub signals: Option<PathBuf>,

    /// Readiness policy (default from config, else lenient)
    #[arg(long)]
    pub policy: Option<ReadinessPolicy>,

    #[command(flatten)]
    pub overrides: SignalOverrides,
}

pub fn run(args: EstimateArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();

    let mut signals = match &args.signals {
        Some(path) => read_signal_map(path)?,
        None => PartSignals::default(),
    };
    signals.apply_overrides(&args.overrides.to_signals());

    let policy = args.policy.unwrap_or_else(|| config.policy());
    let result = EstimationEngine::new(policy).estimate(&signals);

    match single_format(global, &config) {
        OutputFormat::Tsv => print_estimate_tsv(&result),
        format => print_structured(&result, format)?,
    }
    Ok(())
}

/// Parse a signal map file; `.json` as JSON, anything else as YAML
pub fn read_signal_map(path: &Path) -> Result<PartSignals> {
    let contents = std::fs::read_to_string(path).into_diagnostic()?;
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let parsed: std::result::Result<PartSignals, String> = if is_json {
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    } else {
        serde_yml::from_str(&contents).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| miette::miette!("invalid signal map {}: {}", path.display(), e))
}

/// One-row summary of an estimate
pub fn print_estimate_tsv(result: &EstimateResult) {
    println!(
        "{}",
        style("ready\tcost_usd\tlead_time_days\tconfidence\tmissing_inputs").bold()
    );
    match result.quoted() {
        Some(q) => println!(
            "true\t{:.2}\t{}\t{}\t",
            q.cost_usd, q.lead_time_days, q.confidence
        ),
        None => println!(
            "false\t\t\t{}\t{}",
            result.confidence(),
            result.missing_inputs().join(",")
        ),
    }
}
