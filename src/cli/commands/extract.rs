//! `qf extract` command - print the signal map recovered from drawing text

use console::style;
use miette::Result;

use crate::cli::helpers::{escape_tsv, single_format, InputArgs};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::signals::{PartSignals, SignalAggregator};

#[derive(clap::Args, Debug)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Leave the raw text preview and debug record out of the output
    #[arg(long)]
    pub brief: bool,
}

pub fn run(args: ExtractArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let (extracted, _) = args.input.read()?;

    let aggregator = SignalAggregator::with_thresholds(config.thresholds());
    let mut signals = aggregator.extract(&extracted.text);
    if args.brief {
        signals.raw_text_preview = None;
        signals.extraction_debug = None;
    }

    match single_format(global, &config) {
        OutputFormat::Tsv => print_tsv(&signals),
        format => crate::cli::helpers::print_structured(&signals, format)?,
    }
    Ok(())
}

fn print_tsv(signals: &PartSignals) {
    let num = |v: Option<f64>| v.map_or(String::new(), |v| v.to_string());
    let text = |v: &Option<String>| v.as_deref().map_or(String::new(), escape_tsv);

    println!(
        "{}",
        style("material\tqty\tlength_in\twidth_in\theight_in\tweight_lbs\tcomplexity\tsize").bold()
    );
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        text(&signals.material),
        signals.qty.unwrap_or(1),
        num(signals.length_in),
        num(signals.width_in),
        num(signals.height_in),
        num(signals.material_weight_lbs),
        text(&signals.complexity),
        text(&signals.size),
    );
}
