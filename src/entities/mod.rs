//! Entity type definitions
//!
//! - [`Rfp`] - a Request For Proposal with its optional document
//! - [`seed`] - the built-in example records

pub mod rfp;
pub mod seed;

pub use rfp::{Attachment, AttachmentSource, NewRfp, Rfp, RfpPatch, ValidationError};
pub use seed::seed_rfps;
