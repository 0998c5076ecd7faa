//! `rfp delete` command - remove an RFP

use console::style;
use miette::Result;

use crate::cli::commands::utils::{confirm, find_rfp, open_session, visible_rfps};
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// RFP id or unambiguous id prefix
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let (_config, mut session) = open_session(global)?;
    let rfp = find_rfp(&visible_rfps(&session), &args.id)?;

    let prompt = format!("Delete RFP '{}' ({})?", rfp.project_name, rfp.id());
    if !confirm(&prompt, args.yes)? {
        if !global.quiet {
            println!("Cancelled.");
        }
        return Ok(());
    }

    session.store_mut().delete(rfp.id().as_str())?;

    if !global.quiet {
        println!(
            "{} Deleted RFP {} ({})",
            style("✓").green(),
            style(rfp.id()).cyan(),
            rfp.project_name
        );
    }
    Ok(())
}
