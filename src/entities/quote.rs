//! Quote record entity - a saved run of the quoting pipeline

use chrono::{DateTime, Utc};
use log::warn;
use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::identity::QuoteId;
use crate::core::knowledge::ReferenceChunk;
use crate::core::project::Project;
use crate::core::source::ExtractionMethod;
use crate::estimate::EstimateResult;
use crate::signals::PartSignals;

/// A quote saved under `quotes/<id>.qf.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// Unique identifier
    pub id: QuoteId,

    /// Short human label
    pub title: String,

    /// Uploaded file name (absent for pasted text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default)]
    pub extraction_method: ExtractionMethod,

    pub created: DateTime<Utc>,

    pub author: String,

    /// Signals after caller overrides
    pub signals: PartSignals,

    pub estimate: EstimateResult,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<ReferenceChunk>,
}

impl QuoteRecord {
    pub fn new(
        title: String,
        author: String,
        signals: PartSignals,
        estimate: EstimateResult,
    ) -> Self {
        Self {
            id: QuoteId::new(),
            title,
            source: None,
            extraction_method: ExtractionMethod::default(),
            created: Utc::now(),
            author,
            signals,
            estimate,
            references: Vec::new(),
        }
    }

    /// Material the estimate priced, falling back to the signal value
    pub fn material(&self) -> Option<&str> {
        match self.estimate.quoted() {
            Some(quoted) => Some(quoted.breakdown.material.as_str()),
            None => self.signals.material.as_deref(),
        }
    }

    pub fn cost_usd(&self) -> Option<f64> {
        self.estimate.quoted().map(|q| q.cost_usd)
    }

    /// Write the record into the project, returning the file path
    pub fn save(&self, project: &Project) -> Result<PathBuf> {
        let path = project.quote_path(&self.id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).into_diagnostic()?;
        }
        let yaml = serde_yml::to_string(self).into_diagnostic()?;
        std::fs::write(&path, yaml).into_diagnostic()?;
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        serde_yml::from_str(&contents)
            .map_err(|e| miette::miette!("invalid quote record {}: {}", path.display(), e))
    }

    /// Load every saved record, oldest first
    ///
    /// Files that fail to parse are skipped.
    pub fn load_all(project: &Project) -> Vec<Self> {
        let mut records: Vec<Self> = project
            .iter_quote_files()
            .filter_map(|path| match Self::load(&path) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("skipping {}: {}", path.display(), e);
                    None
                }
            })
            .collect();
        records.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        records
    }

    /// Find a saved record by full id or unambiguous prefix
    pub fn find(project: &Project, partial: &str) -> Result<Self> {
        let mut matches: Vec<Self> = Self::load_all(project)
            .into_iter()
            .filter(|r| r.id.matches_prefix(partial))
            .collect();

        match matches.len() {
            0 => Err(miette::miette!("No quote found matching '{}'", partial)),
            1 => Ok(matches.remove(0)),
            n => Err(miette::miette!(
                "'{}' matches {} quotes; use more characters",
                partial,
                n
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::compute_estimate;
    use tempfile::tempdir;

    fn sample() -> QuoteRecord {
        let signals = PartSignals {
            material: Some("aluminum".to_string()),
            qty: Some(4),
            machining_minutes: Some(30.0),
            material_weight_lbs: Some(1.0),
            ..Default::default()
        };
        let estimate = compute_estimate(&signals);
        QuoteRecord::new("Bracket".to_string(), "test".to_string(), signals, estimate)
    }

    #[test]
    fn test_quote_record_creation() {
        let record = sample();
        assert!(record.id.to_string().starts_with("QUOT-"));
        assert_eq!(record.material(), Some("aluminum"));
        assert!(record.cost_usd().is_some());
    }

    #[test]
    fn test_quote_record_roundtrip() {
        let mut record = sample();
        record.source = Some("bracket.txt".to_string());
        record.extraction_method = ExtractionMethod::Direct;

        let yaml = serde_yml::to_string(&record).unwrap();
        let parsed: QuoteRecord = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(parsed.id, record.id);
        assert_eq!(parsed.source.as_deref(), Some("bracket.txt"));
        assert_eq!(parsed.extraction_method, ExtractionMethod::Direct);
        assert_eq!(parsed.estimate, record.estimate);
        assert_eq!(parsed.signals, record.signals);
    }

    #[test]
    fn test_save_and_find_by_prefix() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let record = sample();
        let path = record.save(&project).unwrap();
        assert!(path.ends_with(format!("{}.qf.yaml", record.id)));

        let ulid = record.id.ulid().to_string();
        let found = QuoteRecord::find(&project, &ulid[..10]).unwrap();
        assert_eq!(found.id, record.id);

        assert!(QuoteRecord::find(&project, "QUOT-7ZZZ").is_err());
    }

    #[test]
    fn test_load_all_skips_broken_files() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        sample().save(&project).unwrap();
        std::fs::write(project.quotes_dir().join("QUOT-broken.qf.yaml"), "{ not: [yaml").unwrap();

        assert_eq!(QuoteRecord::load_all(&project).len(), 1);
    }
}
