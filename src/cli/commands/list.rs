//! `rfp list` command - tab views with search

use console::style;
use miette::{IntoDiagnostic, Result};
use std::io;

use crate::cli::commands::utils::open_session;
use crate::cli::helpers::{format_short_id, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Status;
use crate::core::query::Tab;
use crate::entities::rfp::Rfp;

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Tab to show: recent, open, extended or completed (anything else means recent)
    #[arg(long, short = 't', default_value = "recent")]
    pub tab: String,

    /// Search project name, summary, status and deadline
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (config, mut session) = open_session(global)?;

    session.set_tab(Tab::parse_lenient(&args.tab));
    if let Some(ref term) = args.search {
        session.set_search(term.as_str());
    }

    let mut rfps = session.view();
    if let Some(limit) = args.limit {
        rfps.truncate(limit);
    }

    if args.count {
        println!("{}", rfps.len());
        return Ok(());
    }

    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Tsv);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rfps).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&rfps).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => write_csv(&rfps)?,
        OutputFormat::Id => {
            for rfp in &rfps {
                println!("{}", rfp.id());
            }
        }
        OutputFormat::Md => {
            println!("| ID | Project | Status | Deadline | Days | Document |");
            println!("|---|---|---|---|---|---|");
            for rfp in &rfps {
                println!(
                    "| {} | {} | {} | {} | {} | {} |",
                    rfp.id(),
                    rfp.project_name.replace('|', "\\|"),
                    rfp.status,
                    rfp.formatted_deadline(),
                    rfp.duration_days,
                    rfp.attachment.as_ref().map_or("-", |a| a.label())
                );
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            if rfps.is_empty() {
                println!("No RFPs found.");
                return Ok(());
            }

            println!(
                "{:<17} {:<30} {:<10} {:<14} {:>5}  {}",
                style("ID").bold(),
                style("PROJECT").bold(),
                style("STATUS").bold(),
                style("DEADLINE").bold(),
                style("DAYS").bold(),
                style("DOCUMENT").bold()
            );
            println!("{}", "-".repeat(95));

            for rfp in &rfps {
                let status = format!("{:<10}", rfp.status);
                let status = match rfp.status {
                    Status::Open => style(status).green(),
                    Status::Extended => style(status).yellow(),
                    Status::Closed => style(status).dim(),
                };
                println!(
                    "{:<17} {:<30} {} {:<14} {:>5}  {}",
                    style(format!("{:<17}", format_short_id(rfp.id()))).cyan(),
                    truncate_str(&rfp.project_name, 28),
                    status,
                    rfp.formatted_deadline(),
                    rfp.duration_days,
                    truncate_str(rfp.attachment.as_ref().map_or("-", |a| a.label()), 24)
                );
            }

            if !global.quiet {
                println!();
                let counts: Vec<String> = session
                    .tab_counts()
                    .into_iter()
                    .map(|(tab, n)| {
                        let label = format!("{} {}", tab, n);
                        if tab == session.tab() {
                            style(label).bold().to_string()
                        } else {
                            style(label).dim().to_string()
                        }
                    })
                    .collect();
                println!("{}", counts.join("  "));
                if session.store().list().is_empty() {
                    println!(
                        "{}",
                        style("Showing built-in examples; add your own with `rfp new`.").dim()
                    );
                }
            }
        }
    }

    Ok(())
}

fn write_csv(rfps: &[Rfp]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer
        .write_record([
            "id",
            "project_name",
            "product_summary",
            "status",
            "deadline",
            "duration_days",
            "uploaded_at",
            "document",
        ])
        .into_diagnostic()?;

    for rfp in rfps {
        let deadline = rfp.deadline.format("%Y-%m-%d").to_string();
        let duration = rfp.duration_days.to_string();
        let uploaded = rfp
            .uploaded_at()
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        writer
            .write_record([
                rfp.id().as_str(),
                rfp.project_name.as_str(),
                rfp.product_summary.as_str(),
                rfp.status.as_str(),
                deadline.as_str(),
                duration.as_str(),
                uploaded.as_str(),
                rfp.attachment.as_ref().and_then(|a| a.file_name()).unwrap_or(""),
            ])
            .into_diagnostic()?;
    }

    writer.flush().into_diagnostic()?;
    Ok(())
}
