//! Core module - project plumbing and collaborators around the engine

pub mod config;
pub mod identity;
pub mod knowledge;
pub mod project;
pub mod source;

pub use config::{Config, ConfigError};
pub use identity::{IdParseError, QuoteId};
pub use knowledge::{
    chunk_text, index_directory, KnowledgeError, KnowledgeStore, ReferenceChunk, ReferenceLookup,
};
pub use project::{Project, ProjectError};
pub use source::{ExtractedText, ExtractionMethod, PlainTextSource, SourceError, TextSource};
