//! `qf list` command - list saved quote records

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{escape_tsv, format_short_id, list_format, load_project, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::entities::QuoteRecord;

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only quotes whose estimate is ready
    #[arg(long = "ready-only")]
    pub ready_only: bool,

    /// Filter by material (substring match)
    #[arg(long)]
    pub material: Option<String>,

    /// Show the newest first
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

/// One line of list output
#[derive(Debug, Serialize)]
struct QuoteSummary<'a> {
    id: String,
    title: &'a str,
    material: Option<&'a str>,
    ready: bool,
    cost_usd: Option<f64>,
    lead_time_days: Option<u32>,
    confidence: String,
    created: String,
}

impl<'a> QuoteSummary<'a> {
    fn from_record(record: &'a QuoteRecord) -> Self {
        let quoted = record.estimate.quoted();
        Self {
            id: record.id.to_string(),
            title: &record.title,
            material: record.material(),
            ready: record.estimate.is_ready(),
            cost_usd: quoted.map(|q| q.cost_usd),
            lead_time_days: quoted.map(|q| q.lead_time_days),
            confidence: record.estimate.confidence().to_string(),
            created: record.created.format("%Y-%m-%d").to_string(),
        }
    }
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let project = load_project(global)?;

    let material_filter = args.material.as_ref().map(|m| m.trim().to_lowercase());

    let mut records: Vec<QuoteRecord> = QuoteRecord::load_all(&project)
        .into_iter()
        .filter(|r| !args.ready_only || r.estimate.is_ready())
        .filter(|r| {
            material_filter.as_ref().map_or(true, |m| {
                r.material()
                    .is_some_and(|rm| rm.to_lowercase().contains(m.as_str()))
            })
        })
        .collect();

    if args.reverse {
        records.reverse();
    }

    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    if args.count {
        println!("{}", records.len());
        return Ok(());
    }

    if records.is_empty() {
        if !global.quiet {
            println!("No quotes found.");
        }
        return Ok(());
    }

    let summaries: Vec<QuoteSummary> = records.iter().map(QuoteSummary::from_record).collect();

    match list_format(global, &config) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summaries).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&summaries).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            println!(
                "{:<17} {:<20} {:<16} {:<6} {:>10} {:>5} {:<7}",
                style("ID").bold(),
                style("TITLE").bold(),
                style("MATERIAL").bold(),
                style("READY").bold(),
                style("COST").bold(),
                style("DAYS").bold(),
                style("CONF").bold(),
            );
            println!("{}", "-".repeat(88));

            for (record, summary) in records.iter().zip(&summaries) {
                println!(
                    "{:<17} {:<20} {:<16} {:<6} {:>10} {:>5} {:<7}",
                    style(format_short_id(&record.id)).cyan(),
                    escape_tsv(&truncate_str(summary.title, 18)),
                    truncate_str(summary.material.unwrap_or("-"), 16),
                    if summary.ready { "yes" } else { "no" },
                    summary
                        .cost_usd
                        .map_or("-".to_string(), |c| format!("{:.2}", c)),
                    summary
                        .lead_time_days
                        .map_or("-".to_string(), |d| d.to_string()),
                    summary.confidence,
                );
            }

            if !global.quiet {
                println!();
                println!(
                    "{} quote(s) found. Use {} to view details.",
                    style(records.len()).cyan(),
                    style("qf show <ID>").yellow()
                );
            }
        }
    }

    Ok(())
}
