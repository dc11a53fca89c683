//! Text producers - turn an uploaded document into raw text
//!
//! The signal extractors only ever see a string. How that string is produced
//! (direct text extraction, OCR, a paste) is hidden behind [`TextSource`].

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How the text of a document was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ExtractionMethod {
    /// Text layer read directly
    Direct,
    /// Image-based recognition
    Ocr,
    /// Nothing usable was found
    #[default]
    None,
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionMethod::Direct => write!(f, "direct"),
            ExtractionMethod::Ocr => write!(f, "ocr"),
            ExtractionMethod::None => write!(f, "none"),
        }
    }
}

/// Text recovered from one document
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub method: ExtractionMethod,
}

impl ExtractedText {
    /// Wrap already-available text, e.g. from `--text`
    pub fn direct(text: &str) -> Self {
        let text = collapse_whitespace(text);
        let method = if text.is_empty() {
            ExtractionMethod::None
        } else {
            ExtractionMethod::Direct
        };
        Self { text, method }
    }
}

/// Errors producing text from a document
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported input {path:?}: {reason}")]
    Unsupported { path: PathBuf, reason: String },
}

/// A document-to-text converter
pub trait TextSource {
    /// Produce text for `path`; `-` means stdin where the source supports it
    fn extract(&self, path: &Path) -> Result<ExtractedText, SourceError>;
}

/// Extensions [`PlainTextSource`] refuses because they need a real converter
const BINARY_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "tif", "tiff", "bmp", "gif"];

/// Reads UTF-8 text files (lossily) or stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    fn extract(&self, path: &Path) -> Result<ExtractedText, SourceError> {
        let io_err = |source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        };

        let bytes = if path == Path::new("-") {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf).map_err(io_err)?;
            buf
        } else {
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                if BINARY_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
                    return Err(SourceError::Unsupported {
                        path: path.to_path_buf(),
                        reason: format!(".{} files need a document converter", ext),
                    });
                }
            }
            std::fs::read(path).map_err(io_err)?
        };

        Ok(ExtractedText::direct(&String::from_utf8_lossy(&bytes)))
    }
}

/// Collapse whitespace runs to single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
