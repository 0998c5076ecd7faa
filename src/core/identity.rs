//! Record identity: opaque string ids backed by monotonic ULIDs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;
use ulid::{Generator, Ulid};

/// Prefix carried by every id the store generates
pub const ID_PREFIX: &str = "RFP";

/// Prefix reserved for the built-in seed records
pub const SEED_PREFIX: &str = "default-";

/// A record identifier
///
/// Ids are opaque: records imported from older exports may carry any string
/// (millisecond timestamps, `"1"`, ...), so this is not parsed or validated
/// beyond the reserved seed prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RfpId(String);

impl RfpId {
    /// Wrap an existing id string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id belongs to the built-in seed set
    pub fn is_seed(&self) -> bool {
        self.0.starts_with(SEED_PREFIX)
    }
}

impl fmt::Display for RfpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RfpId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RfpId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for RfpId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generates `RFP-<ULID>` ids that never repeat within a process
///
/// Two ids requested in the same millisecond are ordered by incrementing the
/// random component of the previous ULID.
pub struct IdGenerator {
    inner: Generator,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            inner: Generator::new(),
        }
    }

    /// Next id stamped with the given time
    pub fn next_at(&mut self, now: DateTime<Utc>) -> RfpId {
        let ulid = self
            .inner
            .generate_from_datetime(SystemTime::from(now))
            // The random component overflowed within one millisecond.
            .unwrap_or_else(|_| Ulid::new());
        RfpId(format!("{}-{}", ID_PREFIX, ulid))
    }
}
