//! `rfp import` command - load RFPs from an exported JSON document

use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::fs;
use std::io::Read;
use std::path::PathBuf;

use crate::cli::commands::utils::{confirm, open_session};
use crate::cli::GlobalOpts;
use crate::core::codec::{self, ImportMode};

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Export document or bare JSON array of RFPs ("-" for stdin)
    pub file: PathBuf,

    /// Replace all stored RFPs instead of merging by id
    #[arg(long)]
    pub replace: bool,

    /// Skip the confirmation prompt for --replace
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let text = if args.file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).into_diagnostic()?;
        buf
    } else {
        fs::read_to_string(&args.file)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", args.file.display()))?
    };

    // Parse before touching the store so a bad file changes nothing
    let incoming = codec::parse_import(&text)?;

    let (_config, mut session) = open_session(global)?;
    let mode = if args.replace {
        ImportMode::Replace
    } else {
        ImportMode::Merge
    };

    if mode == ImportMode::Replace {
        let existing = session.store().list().len();
        let prompt = format!("Replace {} stored RFP(s) with {} imported?", existing, incoming.len());
        if existing > 0 && !confirm(&prompt, args.yes)? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let report = session.store_mut().import(incoming, mode)?;

    if !global.quiet {
        println!(
            "{} Successfully imported {} RFP(s) ({} total)",
            style("✓").green(),
            style(report.imported).cyan(),
            report.total
        );
        if report.skipped > 0 {
            println!(
                "   {} skipped {} built-in example record(s)",
                style("!").yellow(),
                report.skipped
            );
        }
    }
    Ok(())
}
