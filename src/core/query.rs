//! Query engine: tab views and free-text search
//!
//! Every function here is pure over a borrowed collection and takes `now`
//! explicitly. Presentation order is defined here, never by storage order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::core::entity::Status;
use crate::entities::rfp::Rfp;
use crate::entities::seed::seed_rfps;

/// A named lifecycle view of the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    /// Everything, newest upload first
    #[default]
    Recent,
    /// Status open, newest upload first
    Open,
    /// Status extended, newest upload first
    Extended,
    /// Deadline already passed, latest deadline first
    Completed,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Recent => "recent",
            Tab::Open => "open",
            Tab::Extended => "extended",
            Tab::Completed => "completed",
        }
    }

    pub fn all() -> &'static [Tab] {
        &[Tab::Recent, Tab::Open, Tab::Extended, Tab::Completed]
    }

    /// Parse a tab name; anything unknown means [`Tab::Recent`]
    pub fn parse_lenient(s: &str) -> Tab {
        match s.trim().to_lowercase().as_str() {
            "open" => Tab::Open,
            "extended" => Tab::Extended,
            "completed" => Tab::Completed,
            _ => Tab::Recent,
        }
    }

    /// Whether `rfp` belongs in this tab at time `now`
    pub fn matches(&self, rfp: &Rfp, now: DateTime<Utc>) -> bool {
        match self {
            Tab::Recent => true,
            Tab::Open => rfp.status == Status::Open,
            Tab::Extended => rfp.status == Status::Extended,
            Tab::Completed => rfp.is_past_deadline(now),
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Newest upload first; records without a timestamp sort last
fn by_uploaded_desc(a: &Rfp, b: &Rfp) -> Ordering {
    b.uploaded_at().cmp(&a.uploaded_at())
}

fn by_deadline_desc(a: &Rfp, b: &Rfp) -> Ordering {
    b.deadline.cmp(&a.deadline)
}

fn filter_and_sort(tab: Tab, rfps: &[Rfp], now: DateTime<Utc>) -> Vec<Rfp> {
    let mut view: Vec<Rfp> = rfps
        .iter()
        .filter(|rfp| tab.matches(rfp, now))
        .cloned()
        .collect();

    match tab {
        Tab::Completed => view.sort_by(by_deadline_desc),
        Tab::Recent | Tab::Open | Tab::Extended => view.sort_by(by_uploaded_desc),
    }
    view
}

/// The records shown under `tab`
///
/// An empty collection falls back to the seed records, filtered and sorted
/// the same way.
pub fn by_tab(tab: Tab, rfps: &[Rfp], now: DateTime<Utc>) -> Vec<Rfp> {
    if rfps.is_empty() {
        return filter_and_sort(tab, &seed_rfps(now), now);
    }
    filter_and_sort(tab, rfps, now)
}

/// Whether `rfp` matches a free-text search term
///
/// Matches case-insensitively against the project name, product summary,
/// status and display-formatted deadline. A blank term matches everything.
pub fn matches_term(rfp: &Rfp, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    [
        rfp.project_name.to_lowercase(),
        rfp.product_summary.to_lowercase(),
        rfp.status.as_str().to_string(),
        rfp.formatted_deadline().to_lowercase(),
    ]
    .iter()
    .any(|field| field.contains(&needle))
}

/// Records matching `term`, in their incoming order
pub fn search(rfps: &[Rfp], term: &str) -> Vec<Rfp> {
    rfps.iter()
        .filter(|rfp| matches_term(rfp, term))
        .cloned()
        .collect()
}

/// Tab view with search applied on top
pub fn view(rfps: &[Rfp], tab: Tab, term: &str, now: DateTime<Utc>) -> Vec<Rfp> {
    search(&by_tab(tab, rfps, now), term)
}

/// Number of records in each tab, in [`Tab::all`] order
pub fn tab_counts(rfps: &[Rfp], now: DateTime<Utc>) -> Vec<(Tab, usize)> {
    Tab::all()
        .iter()
        .map(|tab| (*tab, by_tab(*tab, rfps, now).len()))
        .collect()
}
