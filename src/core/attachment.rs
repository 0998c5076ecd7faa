//! Attachment encoding and resolution
//!
//! Files are encoded once, at creation, into a self-describing
//! `data:<type>;base64,<payload>` string; that string is the only form that
//! is ever persisted. Resolving turns it back into a dereferenceable handle
//! through a [`BlobHandles`] collaborator. Handles belong to the caller, who
//! must [`BlobHandles::release`] them once the document is no longer shown,
//! and must release a record's earlier handles (see
//! [`BlobHandles::release_owned_by`]) before asking for a fresh one.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use ulid::Ulid;

use crate::entities::rfp::{Attachment, Rfp};

/// Media type every resolved handle is typed as
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

const OCTET_STREAM: &str = "application/octet-stream";

/// Why a stored payload could not be turned into a handle
#[derive(Debug, Error)]
pub enum AttachmentDecodeError {
    #[error("payload is not a data URL (no ',' separator)")]
    NotDataUrl,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("could not create a handle: {0}")]
    Handle(String),
}

/// A process-local location for decoded document bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    pub url: String,
    pub media_type: String,
    pub len: usize,
}

/// Where a record's document can be opened from
#[derive(Debug)]
pub enum Resolved {
    /// An external reference, used as-is
    External(String),

    /// A freshly created handle; the caller must release it
    Handle(ResourceHandle),

    /// Decoding failed; the raw stored payload is the best remaining option
    Fallback {
        raw: String,
        reason: AttachmentDecodeError,
    },
}

impl Resolved {
    /// The location to open or download
    pub fn location(&self) -> &str {
        match self {
            Resolved::External(url) => url,
            Resolved::Handle(handle) => &handle.url,
            Resolved::Fallback { raw, .. } => raw,
        }
    }

    pub fn handle(&self) -> Option<&ResourceHandle> {
        match self {
            Resolved::Handle(handle) => Some(handle),
            _ => None,
        }
    }
}

/// Blob-to-handle primitive (the `URL.createObjectURL` of this crate)
///
/// Every handle is created on behalf of an owner, the id of the record whose
/// document it holds.
pub trait BlobHandles {
    /// Register `bytes` for `owner` and return a handle that dereferences to them
    fn create(&mut self, owner: &str, bytes: Vec<u8>, media_type: &str)
        -> Result<ResourceHandle, String>;

    /// Free a handle. Returns `false` if it was unknown or already released.
    fn release(&mut self, handle: &ResourceHandle) -> bool;

    /// Free every live handle created for `owner`, returning how many
    fn release_owned_by(&mut self, owner: &str) -> usize;
}

/// Handles backed by an in-process map, with `blob:rfp/<ulid>` urls
#[derive(Debug, Default)]
pub struct MemoryBlobHandles {
    blobs: HashMap<String, (String, Vec<u8>)>,
}

impl MemoryBlobHandles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dereference a handle url
    pub fn get(&self, url: &str) -> Option<&[u8]> {
        self.blobs.get(url).map(|(_, bytes)| bytes.as_slice())
    }

    /// Number of handles not yet released
    pub fn live(&self) -> usize {
        self.blobs.len()
    }
}

impl BlobHandles for MemoryBlobHandles {
    fn create(
        &mut self,
        owner: &str,
        bytes: Vec<u8>,
        media_type: &str,
    ) -> Result<ResourceHandle, String> {
        let url = format!("blob:rfp/{}", Ulid::new());
        let handle = ResourceHandle {
            url: url.clone(),
            media_type: media_type.to_string(),
            len: bytes.len(),
        };
        self.blobs.insert(url, (owner.to_string(), bytes));
        Ok(handle)
    }

    fn release(&mut self, handle: &ResourceHandle) -> bool {
        self.blobs.remove(&handle.url).is_some()
    }

    fn release_owned_by(&mut self, owner: &str) -> usize {
        let before = self.blobs.len();
        self.blobs.retain(|_, (o, _)| o.as_str() != owner);
        before - self.blobs.len()
    }
}

/// Handles backed by files in a spool directory, with `file://` urls
///
/// Files are named `<owner>.<ulid>.<ext>`, with any character of the owner
/// outside `[A-Za-z0-9_-]` replaced by `_`, so a later process can find a
/// record's earlier files.
#[derive(Debug, Clone)]
pub struct DirBlobHandles {
    dir: PathBuf,
}

impl DirBlobHandles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Handles for every file still in the spool directory
    ///
    /// Lets a later process release handles an earlier one left behind.
    pub fn spooled(&self) -> Vec<ResourceHandle> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let meta = entry.metadata().ok()?;
                if !meta.is_file() {
                    return None;
                }
                let path = entry.path();
                let media_type = match path.extension().and_then(|e| e.to_str()) {
                    Some("pdf") => PDF_MEDIA_TYPE,
                    _ => OCTET_STREAM,
                };
                Some(ResourceHandle {
                    url: format!("file://{}", path.display()),
                    media_type: media_type.to_string(),
                    len: meta.len() as usize,
                })
            })
            .collect()
    }

    fn owner_stem(owner: &str) -> String {
        owner
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect()
    }

    fn path_of(&self, handle: &ResourceHandle) -> Option<PathBuf> {
        let path = PathBuf::from(handle.url.strip_prefix("file://")?);
        path.starts_with(&self.dir).then_some(path)
    }
}

impl BlobHandles for DirBlobHandles {
    fn create(
        &mut self,
        owner: &str,
        bytes: Vec<u8>,
        media_type: &str,
    ) -> Result<ResourceHandle, String> {
        fs::create_dir_all(&self.dir).map_err(|e| e.to_string())?;
        let extension = if media_type == PDF_MEDIA_TYPE { "pdf" } else { "bin" };
        let path = self.dir.join(format!(
            "{}.{}.{}",
            Self::owner_stem(owner),
            Ulid::new(),
            extension
        ));
        fs::write(&path, &bytes).map_err(|e| e.to_string())?;
        Ok(ResourceHandle {
            url: format!("file://{}", path.display()),
            media_type: media_type.to_string(),
            len: bytes.len(),
        })
    }

    fn release(&mut self, handle: &ResourceHandle) -> bool {
        match self.path_of(handle) {
            Some(path) => fs::remove_file(path).is_ok(),
            None => false,
        }
    }

    fn release_owned_by(&mut self, owner: &str) -> usize {
        let prefix = format!("{}.", Self::owner_stem(owner));
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return 0;
        };
        entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
            .filter(|entry| fs::remove_file(entry.path()).is_ok())
            .count()
    }
}

/// Guess a media type from a file name's extension
pub fn media_type_for(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".pdf") {
        PDF_MEDIA_TYPE
    } else {
        OCTET_STREAM
    }
}

/// Encode file contents into the persisted attachment form
pub fn encode(bytes: &[u8], file_name: &str) -> Attachment {
    Attachment::Embedded {
        data: format!(
            "data:{};base64,{}",
            media_type_for(file_name),
            STANDARD.encode(bytes)
        ),
        file_name: Some(file_name.to_string()),
        file_size: Some(bytes.len() as u64),
    }
}

/// Decode a stored data URL back into raw bytes
pub fn decode_bytes(payload: &str) -> Result<Vec<u8>, AttachmentDecodeError> {
    let (_, encoded) = payload
        .split_once(',')
        .ok_or(AttachmentDecodeError::NotDataUrl)?;
    Ok(STANDARD.decode(encoded.trim())?)
}

/// Turn `owner`'s stored payload into a handle, falling back to the raw payload
pub fn resolve(owner: &str, payload: &str, handles: &mut impl BlobHandles) -> Resolved {
    let created = decode_bytes(payload).and_then(|bytes| {
        handles
            .create(owner, bytes, PDF_MEDIA_TYPE)
            .map_err(AttachmentDecodeError::Handle)
    });

    match created {
        Ok(handle) => Resolved::Handle(handle),
        Err(reason) => {
            tracing::warn!(%reason, "attachment could not be decoded, using raw payload");
            Resolved::Fallback {
                raw: payload.to_string(),
                reason,
            }
        }
    }
}

/// Where to open `rfp`'s document from, `None` if it has none
///
/// External references bypass decoding entirely.
pub fn locate(rfp: &Rfp, handles: &mut impl BlobHandles) -> Option<Resolved> {
    match rfp.attachment.as_ref()? {
        Attachment::External { url, .. } => Some(Resolved::External(url.clone())),
        Attachment::Embedded { data, .. } => Some(resolve(rfp.id().as_str(), data, handles)),
    }
}
