//! Shared utilities for CLI commands

use std::io::IsTerminal;

use dialoguer::Confirm;
use miette::{IntoDiagnostic, Result};

use crate::core::clock::SystemClock;
use crate::core::config::Config;
use crate::core::identity::RfpId;
use crate::core::query::{self, Tab};
use crate::core::session::Session;
use crate::core::storage::FileStorage;
use crate::core::store::RfpStore;
use crate::cli::GlobalOpts;
use crate::entities::rfp::Rfp;

/// Session over the configured data directory
pub type DeskSession = Session<FileStorage, SystemClock>;

/// Load configuration and open the session every command works against
pub fn open_session(global: &GlobalOpts) -> Result<(Config, DeskSession)> {
    let config = Config::load_with_data_dir(global.data_dir.as_deref());
    let storage = FileStorage::open(config.data_dir())?;
    tracing::debug!(dir = %storage.dir().display(), "opened data directory");
    let session = Session::new(RfpStore::new(storage, SystemClock));
    Ok((config, session))
}

/// The records a user can see: the stored ones, or the built-in examples
/// while nothing is stored
pub fn visible_rfps(session: &DeskSession) -> Vec<Rfp> {
    query::by_tab(Tab::Recent, &session.store().list(), session.now())
}

/// Find a record by full id or unambiguous id prefix
pub fn find_rfp(rfps: &[Rfp], input: &str) -> Result<Rfp> {
    let input = input.trim();
    if let Some(exact) = rfps.iter().find(|r| r.id().as_str() == input) {
        return Ok(exact.clone());
    }

    let needle = input.to_uppercase();
    let matches: Vec<&Rfp> = rfps
        .iter()
        .filter(|r| !input.is_empty() && r.id().as_str().to_uppercase().starts_with(&needle))
        .collect();

    match matches.as_slice() {
        [one] => Ok((*one).clone()),
        [] => Err(miette::miette!("No RFP found matching '{}'", input)),
        many => {
            let ids: Vec<&str> = many.iter().map(|r| r.id().as_str()).collect();
            Err(miette::miette!(
                "'{}' matches {} RFPs: {}",
                input,
                many.len(),
                ids.join(", ")
            ))
        }
    }
}

/// Resolve user input to a stored id
pub fn resolve_id(session: &DeskSession, input: &str) -> Result<RfpId> {
    Ok(find_rfp(&visible_rfps(session), input)?.id().clone())
}

/// Ask for confirmation unless `assume_yes` or stdin is not a terminal
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes || !std::io::stdin().is_terminal() {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}
