//! Browse session: share-link bootstrap and the tab/search view state

use chrono::{DateTime, Utc};

use crate::core::clock::Clock;
use crate::core::codec::{self, CodecError};
use crate::core::query::{self, Tab};
use crate::core::storage::KeyValueStore;
use crate::core::store::{ImportReport, RfpStore, StoreError};
use crate::entities::rfp::Rfp;

/// What [`Session::bootstrap`] did with the share parameter
#[derive(Debug)]
pub enum Bootstrap {
    /// No share parameter was present
    NoShare,
    /// The shared collection replaced the stored one
    Loaded(ImportReport),
    /// The parameter could not be decoded; the stored collection is untouched
    Rejected(CodecError),
}

/// Result of [`Session::share`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shared {
    /// A link carrying the whole collection
    Url(String),
    /// The link would be too long; the payload was kept under the share key
    Stored { payload_len: usize },
}

/// A store plus the view state of one browsing context
#[derive(Debug)]
pub struct Session<S, C> {
    store: RfpStore<S, C>,
    tab: Tab,
    term: String,
}

impl<S: KeyValueStore, C: Clock> Session<S, C> {
    pub fn new(store: RfpStore<S, C>) -> Self {
        Self {
            store,
            tab: Tab::default(),
            term: String::new(),
        }
    }

    pub fn store(&self) -> &RfpStore<S, C> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RfpStore<S, C> {
        &mut self.store
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.store.now()
    }

    /// Apply a share parameter, if any, once at load time
    ///
    /// A decodable payload overwrites the stored collection, minus any records
    /// with reserved seed ids. An invalid one is logged and otherwise ignored.
    pub fn bootstrap(&mut self, param: Option<&str>) -> Result<Bootstrap, StoreError> {
        let Some(param) = param.and_then(codec::share_param) else {
            return Ok(Bootstrap::NoShare);
        };

        match codec::decode_share(&param) {
            Ok(rfps) => {
                let report = self.store.replace_all(&rfps)?;
                tracing::info!(count = report.imported, skipped = report.skipped, "loaded shared RFPs");
                Ok(Bootstrap::Loaded(report))
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring invalid share data");
                Ok(Bootstrap::Rejected(e))
            }
        }
    }

    /// Load the payload last kept under the share key, then clear the key
    ///
    /// Returns `None` when nothing was stored.
    pub fn open_stored_share(&mut self) -> Result<Option<ImportReport>, StoreError> {
        let Some(payload) = self.store.share_payload()? else {
            return Ok(None);
        };
        let rfps = codec::decode_share(&payload)?;
        let report = self.store.replace_all(&rfps)?;
        self.store.clear_share_payload()?;
        Ok(Some(report))
    }

    /// Share the stored collection
    ///
    /// Links longer than `max_url_len` are not produced; the payload goes to
    /// the share key instead.
    pub fn share(&mut self, base_url: &str, max_url_len: usize) -> Result<Shared, StoreError> {
        let rfps = self.store.list();
        let url = codec::share_url(base_url, &rfps)?;
        if url.len() <= max_url_len {
            return Ok(Shared::Url(url));
        }

        let payload = codec::encode_share(&rfps)?;
        self.store.save_share_payload(&payload)?;
        tracing::info!(url_len = url.len(), max_url_len, "share link too long, stored payload");
        Ok(Shared::Stored {
            payload_len: payload.len(),
        })
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn search_term(&self) -> &str {
        &self.term
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.term = term.into();
    }

    /// Records visible under the current tab and search term
    pub fn view(&self) -> Vec<Rfp> {
        query::view(&self.store.list(), self.tab, &self.term, self.now())
    }

    pub fn tab_counts(&self) -> Vec<(Tab, usize)> {
        query::tab_counts(&self.store.list(), self.now())
    }
}
