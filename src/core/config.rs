//! Configuration management with layered hierarchy

use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::Project;
use crate::estimate::ReadinessPolicy;
use crate::signals::ExtractionThresholds;

/// QuoteForge configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Author recorded on saved quotes
    pub author: Option<String>,

    /// Readiness policy for the estimation engine
    pub policy: Option<ReadinessPolicy>,

    /// Path of the reference knowledge store
    pub knowledge_db: Option<PathBuf>,

    /// Default output format
    pub default_format: Option<String>,

    /// Dimension extraction thresholds (any omitted field keeps its default)
    pub thresholds: Option<ExtractionThresholds>,
}

/// Errors reading a single config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// An unreadable or invalid layer is skipped with a warning.
    pub fn load() -> Self {
        let project = Project::discover().ok();
        Self::load_layers(
            Self::global_config_path().as_deref(),
            project.as_ref(),
        )
    }

    /// Merge defaults, the given global file, the project config and the
    /// environment
    pub fn load_layers(global_path: Option<&Path>, project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/quoteforge/config.yaml)
        if let Some(global_path) = global_path {
            config.merge_file(global_path);
        }

        // 3. Project config (.qf/config.yaml)
        if let Some(project) = project {
            config.merge_file(&project.config_path());

            // A relative store path is relative to the project root
            if let Some(db) = &config.knowledge_db {
                if db.is_relative() {
                    config.knowledge_db = Some(project.root().join(db));
                }
            }
        }

        // 4. Environment variables
        if let Ok(author) = std::env::var("QF_AUTHOR") {
            config.author = Some(author);
        }
        if let Ok(policy) = std::env::var("QF_POLICY") {
            match policy.parse() {
                Ok(policy) => config.policy = Some(policy),
                Err(e) => warn!("ignoring QF_POLICY: {}", e),
            }
        }
        if let Ok(db) = std::env::var("QF_KNOWLEDGE_DB") {
            config.knowledge_db = Some(PathBuf::from(db));
        }

        config
    }

    /// Parse one config file
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    fn from_yaml(contents: &str) -> Result<Config, String> {
        // A file with only comments parses as null
        if contents.lines().all(|l| l.trim().is_empty() || l.trim_start().starts_with('#')) {
            return Ok(Config::default());
        }
        serde_yml::from_str(contents).map_err(|e| e.to_string())
    }

    fn merge_file(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        match Self::from_file(path) {
            Ok(layer) => self.merge(layer),
            Err(e) => warn!("{}", e),
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "quoteforge")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.policy.is_some() {
            self.policy = other.policy;
        }
        if other.knowledge_db.is_some() {
            self.knowledge_db = other.knowledge_db;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.thresholds.is_some() {
            self.thresholds = other.thresholds;
        }
    }

    /// Get the author name, falling back to git config or username
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    pub fn policy(&self) -> ReadinessPolicy {
        self.policy.unwrap_or_default()
    }

    pub fn thresholds(&self) -> ExtractionThresholds {
        self.thresholds.clone().unwrap_or_default()
    }

    /// Knowledge store path: configured, else the project default
    pub fn knowledge_db(&self, project: Option<&Project>) -> Option<PathBuf> {
        self.knowledge_db
            .clone()
            .or_else(|| project.map(|p| p.knowledge_db_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_comment_only_file_is_empty_config() {
        let config = Config::from_yaml("# nothing\n\n# author: x\n").unwrap();
        assert!(config.author.is_none());
        assert!(config.policy.is_none());
    }

    #[test]
    fn test_partial_thresholds_keep_defaults() {
        let config = Config::from_yaml("thresholds:\n  millimeter_trigger: 100.0\n").unwrap();
        let thresholds = config.thresholds();
        assert_eq!(thresholds.millimeter_trigger, 100.0);
        assert_eq!(thresholds, ExtractionThresholds {
            millimeter_trigger: 100.0,
            ..Default::default()
        });
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "policy: sometimes\n").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_project_layer_overrides_global() {
        let tmp = tempdir().unwrap();
        let global = tmp.path().join("global.yaml");
        std::fs::write(&global, "author: Global\npolicy: strict\ndefault_format: json\n").unwrap();

        let project = Project::init(&tmp.path().join("proj")).unwrap();
        std::fs::write(project.config_path(), "policy: lenient\nknowledge_db: refs.sqlite\n").unwrap();

        let config = Config::load_layers(Some(&global), Some(&project));
        assert_eq!(config.policy(), ReadinessPolicy::Lenient);
        assert_eq!(config.default_format.as_deref(), Some("json"));
        assert_eq!(
            config.knowledge_db(Some(&project)),
            Some(project.root().join("refs.sqlite"))
        );
    }

    #[test]
    fn test_knowledge_db_defaults_to_project_store() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let config = Config::default();
        assert_eq!(
            config.knowledge_db(Some(&project)),
            Some(project.knowledge_db_path())
        );
        assert_eq!(config.knowledge_db(None), None);
    }
}
