//! CLI command implementations

pub mod utils;

pub mod completions;
pub mod delete;
pub mod doc;
pub mod edit;
pub mod export;
pub mod import;
pub mod list;
pub mod new;
pub mod share;
pub mod show;
