//! RFP Desk: a local store for Request For Proposal records
//!
//! Records live in a key/value medium as one JSON collection. The crate is
//! organised around four parts:
//!
//! - [`core::store`] owns the persisted collection and every mutation
//! - [`core::query`] derives tab views and search results from it
//! - [`core::attachment`] encodes documents at creation and resolves them later
//! - [`core::codec`] moves collections in and out (share links, export, import)

pub mod cli;
pub mod core;
pub mod entities;
