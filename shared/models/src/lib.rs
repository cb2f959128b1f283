//! # House of Clarence Domain Models
//!
//! Core domain models for the House of Clarence catalogue operations system.
//! All models implement serialization/deserialization with serde; insertable
//! records carry validation rules from the validator crate.
//!
//! ## Key Models
//!
//! - **Product**: a persisted catalogue product with serial id and timestamps
//! - **NewProduct**: the insertable product record produced by the ingestion
//!   pipeline and handed to the storage collaborator
//! - **ImportReport**: per-batch outcome of a catalogue import

pub mod import;
pub mod product;

pub use import::*;
pub use product::*;
