//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs represent the versioned schema for persisting data.
//! They are private to the infrastructure layer and handle the evolution
//! of the storage format over time.
//!
//! ## Schema Versioning (Semantic Versioning)
//!
//! - **MAJOR (X.0.0)**: Breaking changes. Documents with another major
//!   version are not read.
//! - **MINOR (1.X.0)**: Backward-compatible additions (new optional fields)
//!
//! ### History Version History
//! - **unversioned**: Bare JSON array of entries
//! - **1.0.0**: `{ version, entries }` document

mod history;

pub use history::{
    HISTORY_SCHEMA_VERSION, HistoryDocumentV1_0_0, HistoryEntryV1_0_0, decode_history,
    encode_history,
};
