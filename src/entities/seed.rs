//! Built-in example records shown when nothing has been stored yet
//!
//! Seeds are rebuilt on every call relative to the supplied `now`; they are
//! never persisted and their reserved `default-` ids keep them out of every
//! mutation path.

use chrono::{DateTime, NaiveDate, Utc};

use crate::core::entity::Status;
use crate::core::identity::RfpId;
use crate::entities::rfp::{duration_until, Attachment, Rfp};

/// Sample tender document served next to the web app
const SAMPLE_PDF: &str = "/REQUEST%20FOR%20PROPOSAL%20(RFP)%20(2).pdf";

struct SeedDef {
    id: &'static str,
    project_name: &'static str,
    product_summary: &'static str,
    deadline: (i32, u32, u32),
    status: Status,
    file_url: &'static str,
    file_name: &'static str,
}

const SEEDS: [SeedDef; 3] = [
    SeedDef {
        id: "default-dmrc",
        project_name: "DELHI METRO RAIL CORPORATION (DMRC)",
        product_summary: "Supply of Control and Communications grade Copper Cables",
        deadline: (2026, 4, 30),
        status: Status::Open,
        file_url: SAMPLE_PDF,
        file_name: "REQUEST FOR PROPOSAL (RFP) (2).pdf",
    },
    SeedDef {
        id: "default-drl",
        project_name: "DELHI RAIL LIMITED (DRL)",
        product_summary: "Supply and Installation of Station Networking Equipment",
        deadline: (2026, 6, 15),
        status: Status::Open,
        file_url: "about:blank",
        file_name: "Document",
    },
    SeedDef {
        id: "default-dmrc-phase4",
        project_name: "DELHI METRO RAIL CORPORATION (DMRC) - PHASE 4",
        product_summary: "Supply of Industrial Grade Fiber Optic Cables",
        deadline: (2026, 5, 20),
        status: Status::Extended,
        file_url: "about:blank",
        file_name: "Document",
    },
];

/// The seed records as of `now`
pub fn seed_rfps(now: DateTime<Utc>) -> Vec<Rfp> {
    SEEDS
        .iter()
        .filter_map(|def| {
            let (y, m, d) = def.deadline;
            let deadline = NaiveDate::from_ymd_opt(y, m, d)?;
            Some(
                Rfp::new(
                    RfpId::from(def.id),
                    Some(now),
                    def.project_name,
                    def.product_summary,
                    deadline,
                    def.status,
                )
                .with_duration(duration_until(deadline, now))
                .with_attachment(Attachment::External {
                    url: def.file_url.to_string(),
                    file_name: Some(def.file_name.to_string()),
                }),
            )
        })
        .collect()
}
