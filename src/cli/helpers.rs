//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use clap::ArgGroup;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::QuoteId;
use crate::core::project::Project;
use crate::core::source::{ExtractedText, PlainTextSource, TextSource};
use crate::core::Config;
use crate::signals::{parse_qty, PartSignals};

/// Format a QuoteId for list output: prefix plus the first 8 ULID characters
pub fn format_short_id(id: &QuoteId) -> String {
    truncate_str(&id.to_string(), 16)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// First `n` characters of `s`
pub fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Replace tabs and newlines so a value fits in one TSV cell
pub fn escape_tsv(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

/// Resolve the project from `--project` or by walking up from the cwd
pub fn load_project(global: &GlobalOpts) -> Result<Project> {
    match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    }
    .map_err(|e| miette::miette!("{}", e))
}

/// Effective output format for a single structured result
pub fn single_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    resolve_format(global, config, OutputFormat::Yaml)
}

/// Effective output format for a list
pub fn list_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    resolve_format(global, config, OutputFormat::Tsv)
}

fn resolve_format(global: &GlobalOpts, config: &Config, auto: OutputFormat) -> OutputFormat {
    let chosen = match global.format {
        OutputFormat::Auto => config
            .default_format
            .as_deref()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Auto),
        other => other,
    };
    match chosen {
        OutputFormat::Auto => auto,
        other => other,
    }
}

/// Print a value as YAML or JSON (TSV callers handle their own layout)
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
        }
        _ => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

/// Drawing text input shared by `extract` and `quote`
#[derive(clap::Args, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["file", "text"])))]
pub struct InputArgs {
    /// Text file to read (`-` for stdin)
    pub file: Option<PathBuf>,

    /// Use this text instead of reading a file
    #[arg(long)]
    pub text: Option<String>,
}

impl InputArgs {
    /// Produce the input text and the uploaded file name, if any
    pub fn read(&self) -> Result<(ExtractedText, Option<String>)> {
        if let Some(text) = &self.text {
            return Ok((ExtractedText::direct(text), None));
        }

        let path = self.file.as_deref().unwrap_or(Path::new("-"));
        let extracted = PlainTextSource
            .extract(path)
            .map_err(|e| miette::miette!("{}", e))?;

        let name = if path == Path::new("-") {
            None
        } else {
            path.file_name().map(|n| n.to_string_lossy().to_string())
        };
        Ok((extracted, name))
    }
}

/// Caller-supplied signal values; each one wins over extracted text
#[derive(clap::Args, Debug, Default)]
pub struct SignalOverrides {
    /// Material (aluminum, steel, mild steel, stainless, titanium, ...)
    #[arg(long)]
    pub material: Option<String>,

    /// Part quantity (non-integers count as 1)
    #[arg(long)]
    pub qty: Option<String>,

    /// Machining time per part, minutes
    #[arg(long = "machining-minutes")]
    pub machining_minutes: Option<f64>,

    /// Stock weight per part, pounds
    #[arg(long = "weight")]
    pub material_weight_lbs: Option<f64>,

    /// Length, inches
    #[arg(long)]
    pub length: Option<f64>,

    /// Width, inches
    #[arg(long)]
    pub width: Option<f64>,

    /// Height, inches
    #[arg(long)]
    pub height: Option<f64>,

    /// Complexity (simple, moderate, complex)
    #[arg(long)]
    pub complexity: Option<String>,

    /// Size class (small, medium, large)
    #[arg(long)]
    pub size: Option<String>,

    /// Tolerance (normal, tight, aerospace)
    #[arg(long)]
    pub tolerance: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl SignalOverrides {
    /// Overrides as a signal map; non-positive numbers are dropped
    pub fn to_signals(&self) -> PartSignals {
        let positive = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0);

        PartSignals {
            material: self.material.clone(),
            qty: self.qty.as_deref().map(parse_qty),
            length_in: positive(self.length),
            width_in: positive(self.width),
            height_in: positive(self.height),
            material_weight_lbs: positive(self.material_weight_lbs),
            machining_minutes: positive(self.machining_minutes),
            complexity: self.complexity.clone(),
            size: self.size.clone(),
            tolerance: self.tolerance.clone(),
            notes: self.notes.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_short_id() {
        let id = QuoteId::new();
        let formatted = format_short_id(&id);
        assert_eq!(formatted.chars().count(), 16);
        assert!(formatted.starts_with("QUOT-"));
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        // multi-byte characters are never split
        assert_eq!(truncate_str("ØØØØØØ", 5), "ØØ...");
    }

    #[test]
    fn test_escape_tsv() {
        assert_eq!(escape_tsv("a\tb\nc"), "a b c");
    }

    #[test]
    fn test_overrides_to_signals() {
        let overrides = SignalOverrides {
            material: Some("Titanium".to_string()),
            qty: Some("2.5".to_string()),
            length: Some(-1.0),
            width: Some(2.0),
            ..Default::default()
        };
        let signals = overrides.to_signals();
        assert_eq!(signals.material.as_deref(), Some("Titanium"));
        assert_eq!(signals.qty, Some(1));
        assert_eq!(signals.length_in, None);
        assert_eq!(signals.width_in, Some(2.0));
    }
}
