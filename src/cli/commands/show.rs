//! `rfp show` command - one RFP in detail

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::{find_rfp, open_session, visible_rfps};
use crate::cli::helpers::{format_size, format_uploaded};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::rfp::Attachment;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// RFP id or unambiguous id prefix
    pub id: String,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_config, session) = open_session(global)?;
    let rfp = find_rfp(&visible_rfps(&session), &args.id)?;
    let now = session.now();

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rfp).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&rfp).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => println!("{}", rfp.id()),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(rfp.id()).cyan());
            println!(
                "{}: {}",
                style("Project").bold(),
                style(&rfp.project_name).yellow()
            );
            let status = if rfp.is_past_deadline(now) {
                format!("{} (deadline passed)", rfp.status)
            } else {
                rfp.status.to_string()
            };
            println!("{}: {}", style("Status").bold(), status);
            println!(
                "{}: {} ({} days)",
                style("Deadline").bold(),
                rfp.formatted_deadline(),
                rfp.duration_days
            );
            println!("{}", style("─".repeat(60)).dim());

            println!();
            println!("{}", style("Product requirements:").bold());
            println!("{}", rfp.product_summary);

            if let Some(ref attachment) = rfp.attachment {
                println!();
                match attachment {
                    Attachment::External { url, .. } => {
                        println!("{}: {}", style("Document").bold(), attachment.label());
                        println!("   {}", style(url).dim());
                    }
                    Attachment::Embedded { file_size, .. } => {
                        print!("{}: {}", style("Document").bold(), attachment.label());
                        if let Some(size) = file_size {
                            print!(" ({})", format_size(*size));
                        }
                        println!();
                        println!("   {}", style(format!("rfp doc {}", rfp.id())).dim());
                    }
                }
            }

            println!("{}", style("─".repeat(60)).dim());
            let origin = if rfp.is_seed() { " | built-in example" } else { "" };
            println!(
                "{}: {}{}",
                style("Uploaded").dim(),
                format_uploaded(rfp.uploaded_at()),
                origin
            );
        }
    }

    Ok(())
}
