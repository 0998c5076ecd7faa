//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs,
    delete::DeleteArgs,
    doc::DocArgs,
    edit::EditArgs,
    export::ExportArgs,
    import::ImportArgs,
    list::ListArgs,
    new::NewArgs,
    share::{OpenArgs, ShareArgs},
    show::ShowArgs,
};

#[derive(Parser)]
#[command(name = "rfp")]
#[command(author, version, about = "Request For Proposal desk")]
#[command(long_about = "Record, browse, search and share Request For Proposal records kept in a local data directory.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Data directory (default: RFP_DATA_DIR, config file, then platform data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a new RFP
    New(NewArgs),

    /// List RFPs under a tab, optionally searching
    List(ListArgs),

    /// Show one RFP in detail
    Show(ShowArgs),

    /// Change fields of an RFP
    Edit(EditArgs),

    /// Delete an RFP
    Delete(DeleteArgs),

    /// View or save the document attached to an RFP
    Doc(DocArgs),

    /// Export all RFPs to a JSON file
    Export(ExportArgs),

    /// Import RFPs from an exported JSON file
    Import(ImportArgs),

    /// Create a share link for all RFPs
    Share(ShareArgs),

    /// Load RFPs from a share link
    Open(OpenArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (pretty for show, tsv for list)
    #[default]
    Auto,
    /// YAML format
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (same shape as the stored data)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl OutputFormat {
    /// Resolve `Auto` against the configured default, then `fallback`
    pub fn resolve(self, configured: Option<&str>, fallback: OutputFormat) -> OutputFormat {
        if self != OutputFormat::Auto {
            return self;
        }
        configured
            .and_then(|name| OutputFormat::from_str(name, true).ok())
            .filter(|f| *f != OutputFormat::Auto)
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_format_resolution() {
        assert_eq!(
            OutputFormat::Json.resolve(Some("csv"), OutputFormat::Tsv),
            OutputFormat::Json
        );
        assert_eq!(
            OutputFormat::Auto.resolve(Some("CSV"), OutputFormat::Tsv),
            OutputFormat::Csv
        );
        assert_eq!(
            OutputFormat::Auto.resolve(Some("bogus"), OutputFormat::Tsv),
            OutputFormat::Tsv
        );
        assert_eq!(OutputFormat::Auto.resolve(None, OutputFormat::Md), OutputFormat::Md);
    }
}
