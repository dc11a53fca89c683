//! Entity type definitions
//!
//! - [`QuoteRecord`] - a saved quote: signals, estimate and reference snippets

pub mod quote;

pub use quote::QuoteRecord;
