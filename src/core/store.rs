//! Record store: the single owner of the persisted RFP collection
//!
//! Every mutation reads the whole collection, changes it in memory and writes
//! the whole collection back. The medium has no transactions, so nothing is
//! written until the in-memory change has fully succeeded. Two processes
//! writing the same medium concurrently lose updates (last write wins).

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use thiserror::Error;

use crate::core::attachment;
use crate::core::clock::{Clock, SystemClock};
use crate::core::codec::{self, CodecError, ImportMode};
use crate::core::identity::{IdGenerator, RfpId};
use crate::core::storage::{KeyValueStore, StorageError, PRIMARY_KEY, SHARE_KEY};
use crate::entities::rfp::{
    duration_until, Attachment, AttachmentSource, NewRfp, Rfp, RfpPatch, ValidationError,
};

/// Errors surfaced by store operations
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error(transparent)]
    #[diagnostic(code(rfp::store::validation))]
    Validation(#[from] ValidationError),

    #[error("RFP not found: {0}")]
    #[diagnostic(code(rfp::store::not_found))]
    NotFound(String),

    #[error("built-in RFP '{0}' cannot be modified")]
    #[diagnostic(code(rfp::store::read_only))]
    ReadOnly(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Codec(#[from] CodecError),
}

/// Outcome of [`RfpStore::import`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportReport {
    /// Records taken from the incoming collection
    pub imported: usize,
    /// Incoming records dropped because they carry a reserved seed id
    pub skipped: usize,
    /// Size of the collection after the import
    pub total: usize,
}

/// The authoritative RFP collection over an injected storage medium
#[derive(Debug)]
pub struct RfpStore<S, C = SystemClock> {
    storage: S,
    clock: C,
    ids: IdGenerator,
}

impl<S: KeyValueStore, C: Clock> RfpStore<S, C> {
    pub fn new(storage: S, clock: C) -> Self {
        Self {
            storage,
            clock,
            ids: IdGenerator::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Current time according to the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The full persisted collection
    ///
    /// Missing, unreadable or corrupt data all read as an empty collection.
    pub fn list(&self) -> Vec<Rfp> {
        match self.load() {
            Ok(rfps) => rfps,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored RFPs, treating as empty");
                Vec::new()
            }
        }
    }

    /// Look up one record by id
    pub fn get(&self, id: &str) -> Result<Rfp, StoreError> {
        self.list()
            .into_iter()
            .find(|r| r.id().as_str() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Validate and insert a new record
    pub fn create(&mut self, input: NewRfp) -> Result<Rfp, StoreError> {
        let deadline = input.validate()?;
        let mut rfps = self.load_for_write()?;
        let now = self.clock.now();

        let mut id = self.ids.next_at(now);
        while rfps.iter().any(|r| r.id() == &id) {
            id = self.ids.next_at(now);
        }

        let duration = input
            .duration_days
            .unwrap_or_else(|| duration_until(deadline, now));

        let mut rfp = Rfp::new(
            id,
            Some(now),
            input.project_name.trim(),
            input.product_summary.trim(),
            deadline,
            input.status,
        )
        .with_duration(duration);

        rfp.attachment = input.attachment.map(|source| match source {
            AttachmentSource::File { file_name, bytes } => attachment::encode(&bytes, &file_name),
            AttachmentSource::Url { url, file_name } => Attachment::External { url, file_name },
        });

        rfps.push(rfp.clone());
        self.persist(&rfps)?;
        tracing::debug!(id = %rfp.id(), "created RFP");
        Ok(rfp)
    }

    /// Merge `patch` onto the record with `id`
    pub fn update(&mut self, id: &str, patch: RfpPatch) -> Result<Rfp, StoreError> {
        Self::ensure_mutable(id)?;
        let mut rfps = self.load_for_write()?;
        let now = self.clock.now();

        let rfp = rfps
            .iter_mut()
            .find(|r| r.id().as_str() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply(rfp, now)?;
        let updated = rfp.clone();

        self.persist(&rfps)?;
        tracing::debug!(id, "updated RFP");
        Ok(updated)
    }

    /// Remove the record with `id`
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        Self::ensure_mutable(id)?;
        let mut rfps = self.load_for_write()?;

        let before = rfps.len();
        rfps.retain(|r| r.id().as_str() != id);
        if rfps.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }

        self.persist(&rfps)?;
        tracing::debug!(id, "deleted RFP");
        Ok(())
    }

    /// Persist a collection computed elsewhere, replacing the stored one
    ///
    /// Records carrying a reserved seed id are dropped, as on import.
    pub fn replace_all(&mut self, rfps: &[Rfp]) -> Result<ImportReport, StoreError> {
        self.import(rfps.to_vec(), ImportMode::Replace)
    }

    /// Combine an imported collection with the stored one and persist it
    pub fn import(&mut self, incoming: Vec<Rfp>, mode: ImportMode) -> Result<ImportReport, StoreError> {
        let offered = incoming.len();
        let incoming: Vec<Rfp> = incoming.into_iter().filter(|r| !r.is_seed()).collect();
        let skipped = offered - incoming.len();
        if skipped > 0 {
            tracing::warn!(skipped, "ignored incoming records with reserved ids");
        }

        let imported = incoming.len();
        let existing = match mode {
            ImportMode::Merge => self.load_for_write()?,
            ImportMode::Replace => Vec::new(),
        };
        let merged = codec::apply_import(existing, incoming, mode);

        self.persist(&merged)?;
        tracing::debug!(imported, total = merged.len(), ?mode, "imported RFPs");
        Ok(ImportReport {
            imported,
            skipped,
            total: merged.len(),
        })
    }

    /// Keep a share payload under the secondary key
    pub fn save_share_payload(&mut self, payload: &str) -> Result<(), StoreError> {
        Ok(self.storage.set(SHARE_KEY, payload)?)
    }

    /// The last share payload kept under the secondary key
    pub fn share_payload(&self) -> Result<Option<String>, StoreError> {
        Ok(self.storage.get(SHARE_KEY)?)
    }

    /// Drop the payload kept under the secondary key
    pub fn clear_share_payload(&mut self) -> Result<bool, StoreError> {
        Ok(self.storage.remove(SHARE_KEY)?)
    }

    fn ensure_mutable(id: &str) -> Result<(), StoreError> {
        if RfpId::from(id).is_seed() {
            return Err(StoreError::ReadOnly(id.to_string()));
        }
        Ok(())
    }

    fn load(&self) -> Result<Vec<Rfp>, StoreError> {
        match self.storage.get(PRIMARY_KEY)? {
            Some(text) if !text.trim().is_empty() => Ok(codec::from_json(&text)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Like [`Self::load`], but a medium that cannot be read at all is an
    /// error; only corrupt contents degrade to an empty collection.
    fn load_for_write(&self) -> Result<Vec<Rfp>, StoreError> {
        match self.load() {
            Err(StoreError::Storage(e)) => Err(StoreError::Storage(e)),
            Err(e) => {
                tracing::warn!(error = %e, "overwriting unreadable stored RFPs");
                Ok(Vec::new())
            }
            Ok(rfps) => Ok(rfps),
        }
    }

    fn persist(&mut self, rfps: &[Rfp]) -> Result<(), StoreError> {
        let json = codec::to_json(rfps)?;
        self.storage.set(PRIMARY_KEY, &json)?;
        Ok(())
    }
}
