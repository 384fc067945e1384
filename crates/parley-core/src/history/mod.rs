//! History domain module.
//!
//! The history is the bounded, persisted list of past user submissions. It is
//! distinct from the transcript, which lives only in session memory.
//!
//! # Module Structure
//!
//! - `model`: History entry type and preview policy
//! - `repository`: Persistence adapter trait
//! - `manager`: Capacity-bounded history list (`HistoryManager`)

mod manager;
mod model;
mod repository;

pub use manager::HistoryManager;
pub use model::{ELLIPSIS, HistoryEntry, make_preview};
pub use repository::HistoryRepository;
