//! `rfp edit` command - patch fields of an RFP

use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::fs;
use std::path::PathBuf;

use crate::cli::commands::utils::{open_session, resolve_id};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::attachment;
use crate::core::entity::Status;
use crate::entities::rfp::{parse_deadline, Attachment, RfpPatch};

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// RFP id or unambiguous id prefix
    pub id: String,

    /// New project name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// New product requirement summary
    #[arg(long, short = 's')]
    pub summary: Option<String>,

    /// New deadline (YYYY-MM-DD); recomputes the duration unless --duration is given
    #[arg(long, short = 'd')]
    pub deadline: Option<String>,

    /// New duration in days
    #[arg(long)]
    pub duration: Option<u32>,

    /// New status (open, extended, closed)
    #[arg(long)]
    pub status: Option<String>,

    /// Replace the document with a local file
    #[arg(long, conflicts_with_all = ["url", "remove_doc"])]
    pub file: Option<PathBuf>,

    /// Replace the document with a URL
    #[arg(long, conflicts_with = "remove_doc")]
    pub url: Option<String>,

    /// Remove the attached document
    #[arg(long)]
    pub remove_doc: bool,
}

pub fn run(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let (_config, mut session) = open_session(global)?;
    let id = resolve_id(&session, &args.id)?;

    let patch = build_patch(&args)?;
    if patch.is_empty() {
        return Err(miette::miette!(
            "Nothing to change. Pass at least one of --name, --summary, --deadline, --duration, --status, --file, --url, --remove-doc"
        ));
    }

    let rfp = session.store_mut().update(id.as_str(), patch)?;

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rfp).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Id => println!("{}", rfp.id()),
        _ if global.quiet => {}
        _ => {
            println!(
                "{} Updated RFP {}",
                style("✓").green(),
                style(rfp.id()).cyan()
            );
            println!("   Project: {}", style(&rfp.project_name).yellow());
            println!(
                "   Status: {} | Deadline: {} ({} days)",
                rfp.status,
                rfp.formatted_deadline(),
                rfp.duration_days
            );
        }
    }

    Ok(())
}

fn build_patch(args: &EditArgs) -> Result<RfpPatch> {
    let deadline = match args.deadline {
        Some(ref s) => Some(
            parse_deadline(s)
                .ok_or_else(|| miette::miette!("Invalid deadline '{}': expected YYYY-MM-DD", s))?,
        ),
        None => None,
    };

    let status = match args.status {
        Some(ref s) => Some(s.parse::<Status>().map_err(|e| miette::miette!("{}", e))?),
        None => None,
    };

    let attachment = if args.remove_doc {
        Some(None)
    } else if let Some(ref path) = args.file {
        let bytes = fs::read(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Some(Some(attachment::encode(&bytes, &file_name)))
    } else {
        args.url.as_ref().map(|url| {
            Some(Attachment::External {
                url: url.clone(),
                file_name: None,
            })
        })
    };

    Ok(RfpPatch {
        project_name: args.name.clone(),
        product_summary: args.summary.clone(),
        deadline,
        duration_days: args.duration,
        status,
        attachment,
    })
}
