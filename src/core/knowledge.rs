//! Reference knowledge store - keyword search over indexed shop documents
//!
//! Snippets found here are shown next to a quote for context. The
//! estimation engine never reads them.

use log::{debug, info};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::source::TextSource;

/// Default window size for [`chunk_text`], in characters
pub const CHUNK_SIZE: usize = 1200;

/// Default overlap between consecutive chunks, in characters
pub const CHUNK_OVERLAP: usize = 150;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS chunks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_file TEXT NOT NULL,
    page INTEGER NOT NULL,
    chunk_index INTEGER NOT NULL,
    text TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source_file);
"#;

/// File extensions picked up by [`index_directory`]
const INDEXED_EXTENSIONS: &[&str] = &["txt", "md"];

/// One indexed passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceChunk {
    pub source_file: String,
    /// 1-based
    pub page: u32,
    pub chunk_index: u32,
    pub text: String,
}

/// Errors from the knowledge store
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("knowledge store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error on {path:?}: {message}")]
    Io { path: PathBuf, message: String },
}

/// Keyword lookup of reference snippets
pub trait ReferenceLookup {
    fn query(&self, query: &str, top_k: usize) -> Result<Vec<ReferenceChunk>, KnowledgeError>;
}

/// SQLite-backed store of [`ReferenceChunk`]s
pub struct KnowledgeStore {
    conn: Connection,
}

impl KnowledgeStore {
    /// Open (creating if needed) the store at `path`
    pub fn open(path: &Path) -> Result<Self, KnowledgeError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| KnowledgeError::Io {
                    path: parent.to_path_buf(),
                    message: e.to_string(),
                })?;
            }
        }

        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open an existing store without creating it
    pub fn open_existing(path: &Path) -> Result<Self, KnowledgeError> {
        if !path.is_file() {
            return Err(KnowledgeError::Io {
                path: path.to_path_buf(),
                message: "knowledge store not found (run 'qf refs index')".to_string(),
            });
        }
        Self::open(path)
    }

    pub fn open_in_memory() -> Result<Self, KnowledgeError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, KnowledgeError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Replace the whole index with `chunks` in one transaction
    pub fn replace_all(&mut self, chunks: &[ReferenceChunk]) -> Result<usize, KnowledgeError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM chunks", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO chunks (source_file, page, chunk_index, text) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for chunk in chunks {
                stmt.execute(params![
                    chunk.source_file,
                    chunk.page,
                    chunk.chunk_index,
                    chunk.text
                ])?;
            }
        }
        tx.commit()?;
        debug!("knowledge store now holds {} chunks", chunks.len());
        Ok(chunks.len())
    }

    /// Distinct indexed source files, sorted
    pub fn sources(&self) -> Result<Vec<String>, KnowledgeError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT source_file FROM chunks ORDER BY source_file")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut sources = Vec::new();
        for row in rows {
            sources.push(row?);
        }
        Ok(sources)
    }

    pub fn chunk_count(&self) -> Result<usize, KnowledgeError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }
}

impl ReferenceLookup for KnowledgeStore {
    /// Phrase match (`LIKE %query%`), insertion order, at most `top_k` rows
    fn query(&self, query: &str, top_k: usize) -> Result<Vec<ReferenceChunk>, KnowledgeError> {
        let query = query.trim();
        if query.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let pattern = format!("%{}%", query);
        let limit = i64::try_from(top_k).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT source_file, page, chunk_index, text FROM chunks \
             WHERE text LIKE ?1 ORDER BY id LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![pattern, limit], |row| {
            Ok(ReferenceChunk {
                source_file: row.get(0)?,
                page: row.get(1)?,
                chunk_index: row.get(2)?,
                text: row.get(3)?,
            })
        })?;

        let mut chunks = Vec::new();
        for row in rows {
            chunks.push(row?);
        }
        debug!("reference query {:?}: {} hits", query, chunks.len());
        Ok(chunks)
    }
}

/// Split text into overlapping character windows
///
/// Windows are trimmed and empty windows dropped. Each window starts
/// strictly after the previous one, even when `overlap >= size`.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.trim().chars().collect();
    if chars.is_empty() || size == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        if end == chars.len() {
            break;
        }
        let next = end.saturating_sub(overlap);
        start = if next <= start { end } else { next };
    }
    chunks
}

/// Read every `.txt`/`.md` file under `dir` (sorted) into chunks
///
/// Each file counts as a single page.
pub fn index_directory(
    dir: &Path,
    source: &dyn TextSource,
) -> Result<Vec<ReferenceChunk>, KnowledgeError> {
    if !dir.is_dir() {
        return Err(KnowledgeError::Io {
            path: dir.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut chunks = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let indexed = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| INDEXED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false);
        if !indexed {
            continue;
        }

        let extracted = source.extract(path).map_err(|e| KnowledgeError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let source_file = path
            .strip_prefix(dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        let pieces = chunk_text(&extracted.text, CHUNK_SIZE, CHUNK_OVERLAP);
        info!("indexed {}: {} chunks", source_file, pieces.len());

        for (i, text) in pieces.into_iter().enumerate() {
            chunks.push(ReferenceChunk {
                source_file: source_file.clone(),
                page: 1,
                chunk_index: i as u32,
                text,
            });
        }
    }
    Ok(chunks)
}
