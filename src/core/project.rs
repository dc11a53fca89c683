//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::QuoteId;

/// Name of the per-project metadata directory
pub const PROJECT_DIR: &str = ".qf";

/// File extension of saved quote records
pub const QUOTE_EXTENSION: &str = ".qf.yaml";

/// Represents a QuoteForge project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .qf/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::create_layout(root)
    }

    /// Force initialization even if .qf/ exists
    ///
    /// Rewrites the default config; saved quotes and the knowledge store are
    /// left alone.
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        Self::create_layout(root)
    }

    fn create_layout(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };

        for dir in [project.qf_dir(), project.knowledge_dir(), project.quotes_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# QuoteForge Project Configuration

# Author recorded on saved quotes (can be overridden by global config)
# author: ""

# Readiness policy: lenient (defaults missing machining time / weight)
# or strict (reports them as missing inputs)
# policy: lenient

# Knowledge store used for reference lookup
# knowledge_db: .qf/knowledge/knowledge.sqlite

# Default output format (auto, yaml, json, tsv)
# default_format: auto

# Dimension extraction threshold overrides
# thresholds:
#   millimeter_trigger: 20.0
#   significant_value: 10.0
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .qf configuration directory
    pub fn qf_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.qf_dir().join("config.yaml")
    }

    pub fn knowledge_dir(&self) -> PathBuf {
        self.qf_dir().join("knowledge")
    }

    /// Default location of the reference knowledge store
    pub fn knowledge_db_path(&self) -> PathBuf {
        self.knowledge_dir().join("knowledge.sqlite")
    }

    pub fn quotes_dir(&self) -> PathBuf {
        self.root.join("quotes")
    }

    /// Get the path for a saved quote record
    pub fn quote_path(&self, id: &QuoteId) -> PathBuf {
        self.quotes_dir().join(format!("{}{}", id, QUOTE_EXTENSION))
    }

    /// Iterate saved quote files, sorted by file name
    pub fn iter_quote_files(&self) -> impl Iterator<Item = PathBuf> {
        walkdir::WalkDir::new(self.quotes_dir())
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(QUOTE_EXTENSION))
            .map(|e| e.path().to_path_buf())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a QuoteForge project (searched from {searched_from:?}). Run 'qf init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("QuoteForge project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.qf_dir().is_dir());
        assert!(project.config_path().exists());
        assert!(project.knowledge_dir().is_dir());
        assert!(project.quotes_dir().is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_init_force_keeps_saved_quotes() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let saved = project.quote_path(&QuoteId::new());
        std::fs::write(&saved, "title: keep me\n").unwrap();

        Project::init_force(tmp.path()).unwrap();
        assert!(saved.exists());
    }

    #[test]
    fn test_project_discover_finds_qf_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_qf_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_iter_quote_files_filters_extension() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let id = QuoteId::new();
        std::fs::write(project.quote_path(&id), "x: 1\n").unwrap();
        std::fs::write(project.quotes_dir().join("notes.txt"), "ignored").unwrap();

        let files: Vec<_> = project.iter_quote_files().collect();
        assert_eq!(files, vec![project.quote_path(&id)]);
    }
}
