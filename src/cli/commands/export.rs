//! `rfp export` command - write all RFPs to a JSON document

use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::fs;
use std::path::PathBuf;

use crate::cli::commands::utils::open_session;
use crate::cli::GlobalOpts;
use crate::core::codec;

/// File name used when no output path is given
pub const DEFAULT_EXPORT_FILE: &str = "rfp_data.json";

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Output file ("-" for stdout)
    #[arg(long, short = 'o', default_value = DEFAULT_EXPORT_FILE)]
    pub output: PathBuf,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let (_config, session) = open_session(global)?;
    let rfps = session.store().list();
    let document = codec::export_document(&rfps, session.now())?;

    if args.output.as_os_str() == "-" {
        println!("{}", document);
        return Ok(());
    }

    fs::write(&args.output, document)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write {}", args.output.display()))?;

    if !global.quiet {
        println!(
            "{} Exported {} RFP(s) to {}",
            style("✓").green(),
            style(rfps.len()).cyan(),
            style(args.output.display()).cyan()
        );
    }
    Ok(())
}
