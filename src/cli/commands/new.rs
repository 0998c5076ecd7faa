//! `rfp new` command - record a new RFP

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::commands::utils::open_session;
use crate::cli::helpers::format_size;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Status;
use crate::entities::rfp::{parse_deadline, Attachment, AttachmentSource, NewRfp};

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Product requirement summary
    #[arg(long, short = 's')]
    pub summary: Option<String>,

    /// Deadline date (YYYY-MM-DD)
    #[arg(long, short = 'd')]
    pub deadline: Option<String>,

    /// Duration in days (default: days remaining until the deadline)
    #[arg(long)]
    pub duration: Option<u32>,

    /// Status (open, extended, closed)
    #[arg(long, default_value = "open")]
    pub status: String,

    /// Attach a document from a local file
    #[arg(long, conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// Attach a document by URL
    #[arg(long)]
    pub url: Option<String>,

    /// Prompt for each field
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

pub fn run(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (_config, mut session) = open_session(global)?;

    let input = if args.interactive {
        prompt_input(&args)?
    } else {
        NewRfp {
            project_name: args.name.clone().unwrap_or_default(),
            product_summary: args.summary.clone().unwrap_or_default(),
            deadline: args.deadline.as_deref().map(parse_deadline_arg).transpose()?,
            duration_days: args.duration,
            status: parse_status(&args.status)?,
            attachment: None,
        }
    };

    let attachment = match (&args.file, &args.url) {
        (Some(path), _) => Some(read_attachment(path)?),
        (None, Some(url)) => Some(AttachmentSource::Url {
            url: url.clone(),
            file_name: None,
        }),
        (None, None) => None,
    };

    let rfp = session.store_mut().create(NewRfp {
        attachment,
        ..input
    })?;

    if global.quiet {
        println!("{}", rfp.id());
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rfp).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Id => println!("{}", rfp.id()),
        _ => {
            println!(
                "{} Created RFP {}",
                style("✓").green(),
                style(rfp.id()).cyan()
            );
            println!("   Project: {}", style(&rfp.project_name).yellow());
            println!(
                "   Deadline: {} ({} days)",
                rfp.formatted_deadline(),
                rfp.duration_days
            );
            if let Some(ref attachment) = rfp.attachment {
                print!("   Document: {}", attachment.label());
                if let Attachment::Embedded {
                    file_size: Some(size),
                    ..
                } = attachment
                {
                    print!(" ({})", format_size(*size));
                }
                println!();
            }
        }
    }

    Ok(())
}

fn parse_deadline_arg(s: &str) -> Result<chrono::NaiveDate> {
    parse_deadline(s)
        .ok_or_else(|| miette::miette!("Invalid deadline '{}': expected YYYY-MM-DD", s))
}

fn parse_status(s: &str) -> Result<Status> {
    s.parse::<Status>().map_err(|e| miette::miette!("{}", e))
}

fn read_attachment(path: &Path) -> Result<AttachmentSource> {
    let bytes = fs::read(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());
    tracing::debug!(file = %path.display(), bytes = bytes.len(), "read attachment");
    Ok(AttachmentSource::File { file_name, bytes })
}

fn prompt_input(args: &NewArgs) -> Result<NewRfp> {
    let theme = ColorfulTheme::default();

    let project_name: String = Input::with_theme(&theme)
        .with_prompt("Project name")
        .with_initial_text(args.name.clone().unwrap_or_default())
        .validate_with(|s: &String| -> std::result::Result<(), &str> {
            if s.trim().is_empty() {
                Err("Project name is required.")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .into_diagnostic()?;

    let product_summary: String = Input::with_theme(&theme)
        .with_prompt("Product requirement summary")
        .with_initial_text(args.summary.clone().unwrap_or_default())
        .validate_with(|s: &String| -> std::result::Result<(), &str> {
            if s.trim().is_empty() {
                Err("Product requirement summary is required.")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .into_diagnostic()?;

    let deadline: String = Input::with_theme(&theme)
        .with_prompt("Deadline (YYYY-MM-DD)")
        .with_initial_text(args.deadline.clone().unwrap_or_default())
        .validate_with(|s: &String| -> std::result::Result<(), &str> {
            parse_deadline(s).map(|_| ()).ok_or("Expected a date like 2026-04-30")
        })
        .interact_text()
        .into_diagnostic()?;

    let statuses = Status::all();
    let labels: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
    let status_idx = Select::with_theme(&theme)
        .with_prompt("Status")
        .items(&labels)
        .default(0)
        .interact()
        .into_diagnostic()?;

    Ok(NewRfp {
        project_name,
        product_summary,
        deadline: Some(parse_deadline_arg(&deadline)?),
        duration_days: args.duration,
        status: statuses[status_idx],
        attachment: None,
    })
}
