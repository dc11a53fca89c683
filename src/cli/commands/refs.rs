//! `qf refs` command - manage the reference knowledge store

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{escape_tsv, list_format, load_project, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::knowledge::{index_directory, KnowledgeStore, ReferenceLookup};
use crate::core::source::PlainTextSource;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum RefsCommands {
    /// Rebuild the store from every .txt/.md file in a directory
    Index(IndexArgs),

    /// Keyword search over indexed snippets
    Search(SearchArgs),

    /// List indexed source files
    Sources,
}

#[derive(clap::Args, Debug)]
pub struct IndexArgs {
    /// Directory of reference documents
    pub dir: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Phrase to look for
    pub query: String,

    /// Maximum number of snippets
    #[arg(long = "top-k", short = 'k', default_value = "5")]
    pub top_k: usize,
}

pub fn run(cmd: RefsCommands, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let db_path = store_path(&config, global)?;

    match cmd {
        RefsCommands::Index(args) => run_index(args, db_path, global),
        RefsCommands::Search(args) => run_search(args, db_path, &config, global),
        RefsCommands::Sources => run_sources(db_path, &config, global),
    }
}

/// Configured store path, else the current project's default
fn store_path(config: &Config, global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(path) = config.knowledge_db(None) {
        return Ok(path);
    }
    let project = load_project(global)?;
    config
        .knowledge_db(Some(&project))
        .ok_or_else(|| miette::miette!("No knowledge store configured"))
}

fn run_index(args: IndexArgs, db_path: PathBuf, global: &GlobalOpts) -> Result<()> {
    let chunks =
        index_directory(&args.dir, &PlainTextSource).map_err(|e| miette::miette!("{}", e))?;

    if chunks.is_empty() {
        println!(
            "{} No indexable text found in {} (only .txt and .md files are read)",
            style("!").yellow(),
            style(args.dir.display()).cyan()
        );
        return Ok(());
    }

    let mut store = KnowledgeStore::open(&db_path).map_err(|e| miette::miette!("{}", e))?;
    let saved = store
        .replace_all(&chunks)
        .map_err(|e| miette::miette!("{}", e))?;

    if !global.quiet {
        println!(
            "{} Saved {} chunks to {}",
            style("✓").green(),
            style(saved).cyan(),
            style(db_path.display()).dim()
        );
    }
    Ok(())
}

fn run_search(args: SearchArgs, db_path: PathBuf, config: &Config, global: &GlobalOpts) -> Result<()> {
    let store = KnowledgeStore::open_existing(&db_path).map_err(|e| miette::miette!("{}", e))?;
    let hits = store
        .query(&args.query, args.top_k)
        .map_err(|e| miette::miette!("{}", e))?;

    match list_format(global, config) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&hits).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&hits).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            if hits.is_empty() {
                if !global.quiet {
                    println!("No references found.");
                }
                return Ok(());
            }
            println!(
                "{}\t{}\t{}\t{}",
                style("SOURCE").bold(),
                style("PAGE").bold(),
                style("CHUNK").bold(),
                style("TEXT").bold()
            );
            for hit in &hits {
                println!(
                    "{}\t{}\t{}\t{}",
                    style(&hit.source_file).cyan(),
                    hit.page,
                    hit.chunk_index,
                    escape_tsv(&truncate_str(&hit.text, 80))
                );
            }
        }
    }
    Ok(())
}

fn run_sources(db_path: PathBuf, config: &Config, global: &GlobalOpts) -> Result<()> {
    let store = KnowledgeStore::open_existing(&db_path).map_err(|e| miette::miette!("{}", e))?;
    let sources = store.sources().map_err(|e| miette::miette!("{}", e))?;

    match list_format(global, config) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&sources).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&sources).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            for source in &sources {
                println!("{}", source);
            }
        }
    }
    Ok(())
}
