//! `qf quote` command - text to signals to references to estimate
//!
//! This is the single-shot flow: read a drawing, layer the caller's values
//! over what the text gave us, pull a few reference snippets and price it.

use console::style;
use log::warn;
use miette::Result;
use serde::Serialize;
use std::path::Path;

use crate::cli::commands::estimate::print_estimate_tsv;
use crate::cli::helpers::{
    load_project, print_structured, single_format, take_chars, InputArgs, SignalOverrides,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::knowledge::{KnowledgeStore, ReferenceChunk, ReferenceLookup};
use crate::core::source::ExtractionMethod;
use crate::core::{Config, Project};
use crate::entities::QuoteRecord;
use crate::estimate::{EstimateResult, EstimationEngine, ReadinessPolicy};
use crate::signals::{PartSignals, SignalAggregator};

/// Characters of input echoed back in the response
const RESPONSE_PREVIEW_CHARS: usize = 500;

/// Reference snippets attached to a quote
const REFERENCE_TOP_K: usize = 5;

/// Characters kept from each reference snippet
const REFERENCE_SNIPPET_CHARS: usize = 600;

#[derive(clap::Args, Debug)]
pub struct QuoteArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub overrides: SignalOverrides,

    /// Readiness policy (default from config, else lenient)
    #[arg(long)]
    pub policy: Option<ReadinessPolicy>,

    /// Skip the reference lookup
    #[arg(long = "no-refs")]
    pub no_refs: bool,

    /// Save the result as a quote record in the current project
    #[arg(long)]
    pub save: bool,

    /// Title for the saved record (default: file name)
    #[arg(long)]
    pub title: Option<String>,
}

/// What `qf quote` prints
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub quote_id: Option<String>,
    pub uploaded_file: Option<String>,
    pub text_extracted: bool,
    pub extraction_method: ExtractionMethod,
    pub text_length: usize,
    pub raw_text_preview: String,
    pub signals: PartSignals,
    pub references: Vec<ReferenceChunk>,
    pub estimate: EstimateResult,
    pub next_step: String,
}

pub fn run(args: QuoteArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let project = if args.save {
        Some(load_project(global)?)
    } else {
        load_project(global).ok()
    };

    let (extracted, uploaded_file) = args.input.read()?;

    let aggregator = SignalAggregator::with_thresholds(config.thresholds());
    let mut signals = aggregator.extract(&extracted.text);

    let mut overrides = args.overrides.to_signals();
    if overrides.notes.is_none() {
        overrides.notes = uploaded_file.as_ref().map(|f| format!("Uploaded {}", f));
    }
    signals.apply_overrides(&overrides);

    let references = if args.no_refs {
        Vec::new()
    } else {
        fetch_references(&config, project.as_ref(), signals.material.as_deref())
    };

    let policy = args.policy.unwrap_or_else(|| config.policy());
    let estimate = EstimationEngine::new(policy).estimate(&signals);
    let next = next_step(&estimate).to_string();

    let mut response = QuoteResponse {
        quote_id: None,
        uploaded_file: uploaded_file.clone(),
        text_extracted: !extracted.text.is_empty(),
        extraction_method: extracted.method,
        text_length: extracted.text.chars().count(),
        raw_text_preview: take_chars(&extracted.text, RESPONSE_PREVIEW_CHARS),
        signals,
        references,
        estimate,
        next_step: next,
    };

    if let Some(project) = project.as_ref().filter(|_| args.save) {
        let title = args
            .title
            .clone()
            .or_else(|| {
                uploaded_file
                    .as_deref()
                    .and_then(|f| Path::new(f).file_stem())
                    .map(|s| s.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| "Untitled quote".to_string());

        let mut record = QuoteRecord::new(
            title,
            config.author(),
            response.signals.clone(),
            response.estimate.clone(),
        );
        record.source = uploaded_file;
        record.extraction_method = extracted.method;
        record.references = response.references.clone();

        let path = record.save(project)?;
        response.quote_id = Some(record.id.to_string());

        if !global.quiet {
            eprintln!(
                "{} Saved {} to {}",
                style("✓").green(),
                style(&record.id).cyan(),
                style(path.display()).dim()
            );
        }
    }

    match single_format(global, &config) {
        OutputFormat::Tsv => print_estimate_tsv(&response.estimate),
        format => print_structured(&response, format)?,
    }
    Ok(())
}

fn next_step(estimate: &EstimateResult) -> &'static str {
    if estimate.is_ready() {
        "Quote complete"
    } else {
        "Ask user for missing inputs"
    }
}

/// Keyword phrase used to find pricing references for a material
pub fn reference_query(material: Option<&str>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(m) = material.map(str::trim).filter(|m| !m.is_empty()) {
        parts.push(m);
    }
    parts.extend(["rate", "cost", "multiplier", "lead time"]);
    parts.join(" ")
}

/// Top reference snippets, each cut to a fixed length
pub fn lookup_references(lookup: &dyn ReferenceLookup, material: Option<&str>) -> Vec<ReferenceChunk> {
    match lookup.query(&reference_query(material), REFERENCE_TOP_K) {
        Ok(chunks) => chunks
            .into_iter()
            .map(|mut c| {
                c.text = take_chars(&c.text, REFERENCE_SNIPPET_CHARS);
                c
            })
            .collect(),
        Err(e) => {
            warn!("reference lookup failed: {}", e);
            Vec::new()
        }
    }
}

/// References from the configured store; any failure yields none
fn fetch_references(
    config: &Config,
    project: Option<&Project>,
    material: Option<&str>,
) -> Vec<ReferenceChunk> {
    let Some(path) = config.knowledge_db(project) else {
        return Vec::new();
    };

    match KnowledgeStore::open_existing(&path) {
        Ok(store) => lookup_references(&store, material),
        Err(e) => {
            warn!("{}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::knowledge::KnowledgeError;

    struct Canned(Vec<ReferenceChunk>);

    impl ReferenceLookup for Canned {
        fn query(&self, _query: &str, top_k: usize) -> std::result::Result<Vec<ReferenceChunk>, KnowledgeError> {
            Ok(self.0.iter().take(top_k).cloned().collect())
        }
    }

    struct Broken;

    impl ReferenceLookup for Broken {
        fn query(&self, _query: &str, _top_k: usize) -> std::result::Result<Vec<ReferenceChunk>, KnowledgeError> {
            Err(KnowledgeError::Io {
                path: "kb.sqlite".into(),
                message: "gone".to_string(),
            })
        }
    }

    fn chunk(text: &str) -> ReferenceChunk {
        ReferenceChunk {
            source_file: "rates.md".to_string(),
            page: 1,
            chunk_index: 0,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_reference_query_phrase() {
        assert_eq!(
            reference_query(Some("titanium")),
            "titanium rate cost multiplier lead time"
        );
        assert_eq!(reference_query(None), "rate cost multiplier lead time");
        assert_eq!(reference_query(Some("  ")), "rate cost multiplier lead time");
    }

    #[test]
    fn test_lookup_truncates_and_limits() {
        let long = "x".repeat(REFERENCE_SNIPPET_CHARS + 100);
        let canned = Canned(vec![chunk(&long); 8]);
        let refs = lookup_references(&canned, Some("steel"));

        assert_eq!(refs.len(), REFERENCE_TOP_K);
        assert!(refs.iter().all(|r| r.text.chars().count() == REFERENCE_SNIPPET_CHARS));
    }

    #[test]
    fn test_lookup_failure_yields_no_references() {
        assert!(lookup_references(&Broken, Some("steel")).is_empty());
    }

    #[test]
    fn test_next_step_wording() {
        let ready = crate::estimate::compute_estimate(&PartSignals {
            material: Some("steel".to_string()),
            ..Default::default()
        });
        assert_eq!(next_step(&ready), "Quote complete");
        assert_eq!(
            next_step(&crate::estimate::compute_estimate(&PartSignals::default())),
            "Ask user for missing inputs"
        );
    }
}
