//! CLI command implementations

pub mod completions;
pub mod config;
pub mod estimate;
pub mod extract;
pub mod init;
pub mod list;
pub mod quote;
pub mod refs;
pub mod show;
