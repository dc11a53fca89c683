//! Saved quote identity using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Prefix every quote record id carries
pub const QUOTE_PREFIX: &str = "QUOT";

/// Identifier of a saved quote record, `QUOT-<ULID>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuoteId {
    ulid: Ulid,
}

impl QuoteId {
    /// Generate a fresh id
    pub fn new() -> Self {
        Self { ulid: Ulid::new() }
    }

    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }

    /// True when `partial` is a case-insensitive prefix of this id, with or
    /// without the `QUOT-` part
    pub fn matches_prefix(&self, partial: &str) -> bool {
        let partial = partial.trim().to_uppercase();
        if partial.is_empty() {
            return false;
        }
        let full = self.to_string();
        full.starts_with(&partial) || self.ulid.to_string().starts_with(&partial)
    }
}

impl Default for QuoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", QUOTE_PREFIX, self.ulid)
    }
}

impl FromStr for QuoteId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        if !prefix.eq_ignore_ascii_case(QUOTE_PREFIX) {
            return Err(IdParseError::InvalidPrefix(prefix.to_string()));
        }

        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { ulid })
    }
}

impl Serialize for QuoteId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for QuoteId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing quote ids
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid quote id prefix: '{0}' (expected QUOT)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in quote id: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}
