//! Collection codec: persistence JSON, share links, export and import
//!
//! The share encoding is a reversible text transform (JSON, then URL-safe
//! base64), not compression. Everything here is pure: callers persist results
//! through the store.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use chrono::{DateTime, Utc};
use miette::Diagnostic;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;

use crate::entities::rfp::Rfp;

/// Version tag written into export documents
pub const EXPORT_VERSION: &str = "1.0";

/// Query parameter carrying a shared collection
pub const SHARE_PARAM: &str = "data";

/// URL-safe decoder that tolerates trailing `=` padding
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors raised while decoding a collection
#[derive(Debug, Error, Diagnostic)]
pub enum CodecError {
    #[error("invalid {source_kind} data: {reason}")]
    #[diagnostic(
        code(rfp::codec::invalid_format),
        help("expected a JSON array of RFP records, or an export document with an 'rfps' array")
    )]
    InvalidFormat {
        source_kind: &'static str,
        reason: String,
    },

    #[error("failed to encode collection: {0}")]
    #[diagnostic(code(rfp::codec::encode))]
    Encode(#[from] serde_json::Error),
}

impl CodecError {
    fn invalid(source_kind: &'static str, reason: impl ToString) -> Self {
        CodecError::InvalidFormat {
            source_kind,
            reason: reason.to_string(),
        }
    }
}

/// How an imported collection combines with the existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Replace records with matching ids in place, append the rest
    #[default]
    Merge,
    /// Discard everything and keep only the incoming records
    Replace,
}

/// File export envelope
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub rfps: Vec<Rfp>,
}

/// Import input: an export envelope or a bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportDocument {
    Envelope { rfps: Vec<Rfp> },
    Bare(Vec<Rfp>),
}

/// Serialize a collection as stored under the primary key
pub fn to_json(rfps: &[Rfp]) -> Result<String, CodecError> {
    Ok(serde_json::to_string(rfps)?)
}

/// Parse a stored collection
pub fn from_json(text: &str) -> Result<Vec<Rfp>, CodecError> {
    serde_json::from_str(text).map_err(|e| CodecError::invalid("stored", e))
}

/// Encode a collection into a string safe to place in a URL query
pub fn encode_share(rfps: &[Rfp]) -> Result<String, CodecError> {
    let json = to_json(rfps)?;
    Ok(URL_SAFE_NO_PAD.encode(json.as_bytes()))
}

/// Decode a share payload produced by [`encode_share`]
///
/// Standard-alphabet payloads are accepted too, including a `+` that a query
/// decoder already turned into a space.
pub fn decode_share(text: &str) -> Result<Vec<Rfp>, CodecError> {
    let normalized: String = text
        .trim()
        .chars()
        .map(|c| match c {
            '+' | ' ' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = LENIENT_URL_SAFE
        .decode(normalized.as_bytes())
        .map_err(|e| CodecError::invalid("share", e))?;
    let json = String::from_utf8(bytes).map_err(|e| CodecError::invalid("share", e))?;
    serde_json::from_str(&json).map_err(|e| CodecError::invalid("share", e))
}

/// Build a share link by appending the encoded collection to `base`
pub fn share_url(base: &str, rfps: &[Rfp]) -> Result<String, CodecError> {
    let encoded = encode_share(rfps)?;
    let separator = if base.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}={}", base, separator, SHARE_PARAM, encoded))
}

/// Extract the share payload from a URL, a query string or a bare payload
///
/// The query value is percent-decoded, so `%2B`, `%2F` and `%3D` escapes of a
/// standard-alphabet payload come back as `+`, `/` and `=`.
pub fn share_param(input: &str) -> Option<Cow<'_, str>> {
    let input = input.trim();
    if !input.contains('=') && !input.contains('?') {
        return (!input.is_empty()).then_some(Cow::Borrowed(input));
    }

    let query = input.split_once('?').map_or(input, |(_, q)| q);
    let query = query.split_once('#').map_or(query, |(q, _)| q);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == SHARE_PARAM)
        .map(|(_, value)| percent_decode_str(value).decode_utf8_lossy())
        .filter(|value| !value.is_empty())
}

/// Render the export document for a collection
pub fn export_document(rfps: &[Rfp], now: DateTime<Utc>) -> Result<String, CodecError> {
    let document = ExportDocument {
        version: EXPORT_VERSION.to_string(),
        export_date: now,
        rfps: rfps.to_vec(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parse an import file: an export document or a bare array of records
pub fn parse_import(text: &str) -> Result<Vec<Rfp>, CodecError> {
    match serde_json::from_str::<ImportDocument>(text) {
        Ok(ImportDocument::Envelope { rfps }) | Ok(ImportDocument::Bare(rfps)) => Ok(rfps),
        Err(_) => {
            // The untagged error is uninformative; report the bare-array error.
            let reason = serde_json::from_str::<Vec<Rfp>>(text)
                .err()
                .map_or_else(|| "unrecognized document".to_string(), |e| e.to_string());
            Err(CodecError::invalid("import", reason))
        }
    }
}

/// Merge `incoming` into `existing` by id
///
/// A record whose id already exists replaces it at its original position;
/// new ids are appended in incoming order.
pub fn import_merge(existing: Vec<Rfp>, incoming: Vec<Rfp>) -> Vec<Rfp> {
    let mut merged = existing;
    for rfp in incoming {
        match merged.iter().position(|r| r.id() == rfp.id()) {
            Some(idx) => merged[idx] = rfp,
            None => merged.push(rfp),
        }
    }
    merged
}

/// The incoming collection replaces everything
pub fn import_replace(incoming: Vec<Rfp>) -> Vec<Rfp> {
    incoming
}

/// Combine collections according to `mode`
pub fn apply_import(existing: Vec<Rfp>, incoming: Vec<Rfp>, mode: ImportMode) -> Vec<Rfp> {
    match mode {
        ImportMode::Merge => import_merge(existing, incoming),
        ImportMode::Replace => import_replace(incoming),
    }
}
