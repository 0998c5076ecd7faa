//! `rfp share` and `rfp open` commands - share links

use console::style;
use miette::Result;

use crate::cli::commands::utils::open_session;
use crate::cli::GlobalOpts;
use crate::core::session::{Bootstrap, Shared};

#[derive(clap::Args, Debug)]
pub struct ShareArgs {
    /// Page the link points at (default: share.base_url from config)
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct OpenArgs {
    /// Share link, query string or bare payload
    #[arg(required_unless_present = "stored")]
    pub link: Option<String>,

    /// Load the payload kept by the last oversized `rfp share`
    #[arg(long, conflicts_with = "link")]
    pub stored: bool,
}

pub fn run_share(args: ShareArgs, global: &GlobalOpts) -> Result<()> {
    let (config, mut session) = open_session(global)?;
    let base_url = args
        .base_url
        .as_deref()
        .unwrap_or_else(|| config.share_base_url())
        .to_string();

    match session.share(&base_url, config.max_url_len())? {
        Shared::Url(url) => println!("{}", url),
        Shared::Stored { payload_len } => {
            if !global.quiet {
                println!(
                    "{} Share link would exceed {} characters; stored the {}-character payload instead",
                    style("!").yellow(),
                    config.max_url_len(),
                    payload_len
                );
                println!("   Load it with {}", style("rfp open --stored").cyan());
            }
        }
    }
    Ok(())
}

pub fn run_open(args: OpenArgs, global: &GlobalOpts) -> Result<()> {
    let (_config, mut session) = open_session(global)?;

    let report = if args.stored {
        session
            .open_stored_share()?
            .ok_or_else(|| miette::miette!("No stored share payload found"))?
    } else {
        match session.bootstrap(args.link.as_deref())? {
            Bootstrap::Loaded(report) => report,
            Bootstrap::NoShare => {
                return Err(miette::miette!("The link carries no 'data' parameter"));
            }
            Bootstrap::Rejected(e) => {
                return Err(miette::Report::new(e)
                    .wrap_err("Share data could not be read; stored RFPs were kept"));
            }
        }
    };

    if !global.quiet {
        println!(
            "{} Loaded {} shared RFP(s)",
            style("✓").green(),
            style(report.imported).cyan()
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
