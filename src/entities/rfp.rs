//! RFP entity type

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::entity::Status;
use crate::core::identity::RfpId;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// The document attached to an RFP
///
/// A record carries at most one of the two representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// A URL or path used directly as the document location
    External {
        url: String,
        file_name: Option<String>,
    },

    /// The file itself, stored as a `data:<type>;base64,<payload>` URL
    Embedded {
        data: String,
        file_name: Option<String>,
        file_size: Option<u64>,
    },
}

impl Attachment {
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Attachment::External { file_name, .. } | Attachment::Embedded { file_name, .. } => {
                file_name.as_deref()
            }
        }
    }

    /// Name shown next to the view action
    pub fn label(&self) -> &str {
        self.file_name().unwrap_or("Document")
    }

    /// Name used when saving the document locally
    pub fn download_name(&self) -> &str {
        self.file_name().unwrap_or("document.pdf")
    }
}

/// A Request For Proposal record
///
/// `id` and `uploaded_at` are assigned once, by the store, and are only
/// readable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RfpRecord", into = "RfpRecord")]
pub struct Rfp {
    id: RfpId,

    /// Display name of the issuing project
    pub project_name: String,

    /// Summary of the requested product or service
    pub product_summary: String,

    /// Submission deadline
    pub deadline: NaiveDate,

    /// Days remaining until the deadline when last derived
    pub duration_days: u32,

    /// Stored lifecycle status
    pub status: Status,

    uploaded_at: Option<DateTime<Utc>>,

    /// Attached document, if any
    pub attachment: Option<Attachment>,
}

impl Rfp {
    /// Build a record with an explicit identity
    pub fn new(
        id: RfpId,
        uploaded_at: Option<DateTime<Utc>>,
        project_name: impl Into<String>,
        product_summary: impl Into<String>,
        deadline: NaiveDate,
        status: Status,
    ) -> Self {
        Self {
            id,
            project_name: project_name.into(),
            product_summary: product_summary.into(),
            deadline,
            duration_days: 0,
            status,
            uploaded_at,
            attachment: None,
        }
    }

    pub fn with_duration(mut self, days: u32) -> Self {
        self.duration_days = days;
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn id(&self) -> &RfpId {
        &self.id
    }

    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        self.uploaded_at
    }

    /// Whether this is one of the built-in seed records
    pub fn is_seed(&self) -> bool {
        self.id.is_seed()
    }

    /// The deadline as an instant (midnight UTC)
    pub fn deadline_at(&self) -> DateTime<Utc> {
        deadline_instant(self.deadline)
    }

    /// Whether the deadline lies strictly before `now`
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.deadline_at() < now
    }

    /// Deadline as shown to users, e.g. `Apr 30, 2026`
    pub fn formatted_deadline(&self) -> String {
        format_deadline(self.deadline)
    }
}

/// Midnight UTC of a deadline date
pub fn deadline_instant(deadline: NaiveDate) -> DateTime<Utc> {
    deadline.and_time(NaiveTime::MIN).and_utc()
}

/// Whole days from `now` until `deadline`, rounded up, never negative
pub fn duration_until(deadline: NaiveDate, now: DateTime<Utc>) -> u32 {
    let millis = (deadline_instant(deadline) - now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    let days = (millis + MS_PER_DAY - 1) / MS_PER_DAY;
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Format a deadline for display (`Apr 30, 2026`)
pub fn format_deadline(deadline: NaiveDate) -> String {
    deadline.format("%b %-d, %Y").to_string()
}

/// Parse a deadline from `YYYY-MM-DD` or a full RFC 3339 timestamp
pub fn parse_deadline(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

/// A required field was missing or blank
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Project name is required.")]
    MissingProjectName,

    #[error("Product requirement summary is required.")]
    MissingProductSummary,

    #[error("Deadline date is required.")]
    MissingDeadline,
}

/// Source of a document supplied at creation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSource {
    /// Raw file contents, encoded before the record is stored
    File { file_name: String, bytes: Vec<u8> },

    /// An external location stored as-is
    Url {
        url: String,
        file_name: Option<String>,
    },
}

/// Input to [`crate::core::store::RfpStore::create`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRfp {
    pub project_name: String,
    pub product_summary: String,
    pub deadline: Option<NaiveDate>,
    /// Explicit duration; derived from the deadline when `None`
    pub duration_days: Option<u32>,
    pub status: Status,
    pub attachment: Option<AttachmentSource>,
}

impl NewRfp {
    /// Check required fields, returning the validated deadline
    pub fn validate(&self) -> Result<NaiveDate, ValidationError> {
        if self.project_name.trim().is_empty() {
            return Err(ValidationError::MissingProjectName);
        }
        if self.product_summary.trim().is_empty() {
            return Err(ValidationError::MissingProductSummary);
        }
        self.deadline.ok_or(ValidationError::MissingDeadline)
    }
}

/// A partial edit. Absent fields leave the record untouched.
///
/// There is no way to express a change to `id` or `uploaded_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RfpPatch {
    pub project_name: Option<String>,
    pub product_summary: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub duration_days: Option<u32>,
    pub status: Option<Status>,
    /// `Some(None)` removes the attachment
    pub attachment: Option<Option<Attachment>>,
}

impl RfpPatch {
    pub fn is_empty(&self) -> bool {
        *self == RfpPatch::default()
    }

    /// Merge this patch onto `rfp`
    ///
    /// The record is left untouched if validation fails. A new deadline
    /// without an explicit duration re-derives the duration from `now`.
    pub fn apply(self, rfp: &mut Rfp, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if matches!(&self.project_name, Some(name) if name.trim().is_empty()) {
            return Err(ValidationError::MissingProjectName);
        }
        if matches!(&self.product_summary, Some(summary) if summary.trim().is_empty()) {
            return Err(ValidationError::MissingProductSummary);
        }

        if let Some(name) = self.project_name {
            rfp.project_name = name.trim().to_string();
        }
        if let Some(summary) = self.product_summary {
            rfp.product_summary = summary.trim().to_string();
        }
        if let Some(deadline) = self.deadline {
            rfp.deadline = deadline;
            if self.duration_days.is_none() {
                rfp.duration_days = duration_until(deadline, now);
            }
        }
        if let Some(days) = self.duration_days {
            rfp.duration_days = days;
        }
        if let Some(status) = self.status {
            rfp.status = status;
        }
        if let Some(attachment) = self.attachment {
            rfp.attachment = attachment;
        }
        Ok(())
    }
}

/// Persisted JSON shape, compatible with collections written by the web app
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RfpRecord {
    #[serde(rename = "_id")]
    id: RfpId,

    project_name: String,

    #[serde(default)]
    product_summary: String,

    deadline: String,

    #[serde(default)]
    duration_days: Option<serde_json::Value>,

    #[serde(default)]
    status: Option<String>,

    #[serde(default)]
    uploaded_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_data: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_size: Option<u64>,
}

/// Accepts integers, floats and numeric strings; negatives clamp to zero
fn lenient_days(value: Option<serde_json::Value>) -> Result<u32, String> {
    let days = match value {
        None | Some(serde_json::Value::Null) => return Ok(0),
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => return Ok(0),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(other) => return Err(format!("invalid durationDays: {}", other)),
    };
    let days = days
        .filter(|d| d.is_finite())
        .ok_or_else(|| "invalid durationDays".to_string())?;
    Ok(days.max(0.0).ceil().min(u32::MAX as f64) as u32)
}

impl TryFrom<RfpRecord> for Rfp {
    type Error = String;

    fn try_from(record: RfpRecord) -> Result<Self, Self::Error> {
        let deadline = parse_deadline(&record.deadline)
            .ok_or_else(|| format!("invalid deadline '{}'", record.deadline))?;

        let status = match record.status.as_deref().map(str::trim) {
            None | Some("") => Status::Open,
            Some(s) => s.parse()?,
        };

        let uploaded_at = record
            .uploaded_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let attachment = match (record.file_url, record.file_data) {
            (Some(_), Some(_)) => {
                return Err(format!(
                    "record '{}' has both fileUrl and fileData",
                    record.id
                ))
            }
            (Some(url), None) => Some(Attachment::External {
                url,
                file_name: record.file_name,
            }),
            (None, Some(data)) => Some(Attachment::Embedded {
                data,
                file_name: record.file_name,
                file_size: record.file_size,
            }),
            (None, None) => None,
        };

        Ok(Rfp {
            id: record.id,
            project_name: record.project_name,
            product_summary: record.product_summary,
            deadline,
            duration_days: lenient_days(record.duration_days)?,
            status,
            uploaded_at,
            attachment,
        })
    }
}

impl From<Rfp> for RfpRecord {
    fn from(rfp: Rfp) -> Self {
        let (file_url, file_data, file_name, file_size) = match rfp.attachment {
            Some(Attachment::External { url, file_name }) => (Some(url), None, file_name, None),
            Some(Attachment::Embedded {
                data,
                file_name,
                file_size,
            }) => (None, Some(data), file_name, file_size),
            None => (None, None, None, None),
        };

        RfpRecord {
            id: rfp.id,
            project_name: rfp.project_name,
            product_summary: rfp.product_summary,
            deadline: rfp.deadline.format("%Y-%m-%d").to_string(),
            duration_days: Some(serde_json::Value::from(rfp.duration_days)),
            status: Some(rfp.status.to_string()),
            uploaded_at: rfp
                .uploaded_at
                .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)),
            file_url,
            file_data,
            file_name,
            file_size,
        }
    }
}
