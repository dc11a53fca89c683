//! `qf show` command - print one saved quote record

use console::style;
use miette::Result;

use crate::cli::commands::estimate::print_estimate_tsv;
use crate::cli::helpers::{load_project, print_structured, single_format};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::entities::QuoteRecord;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Quote ID or unambiguous prefix (with or without QUOT-)
    pub id: String,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let project = load_project(global)?;
    let record = QuoteRecord::find(&project, &args.id)?;

    match single_format(global, &config) {
        OutputFormat::Tsv => {
            if !global.quiet {
                println!("{} {}", style(&record.id).cyan(), style(&record.title).bold());
            }
            print_estimate_tsv(&record.estimate);
        }
        format => print_structured(&record, format)?,
    }
    Ok(())
}
