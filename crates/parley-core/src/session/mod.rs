//! Session domain module.
//!
//! This module contains the session state machine and the types it exposes
//! to renderers and adapters.
//!
//! # Module Structure
//!
//! - `message`: Transcript message types (`Sender`, `Message`)
//! - `state`: Session state and phase (`SessionState`, `SessionPhase`)
//! - `event`: State-change notifications (`SessionEvent`)
//! - `manager`: The state machine itself (`Session`)
//!
//! # Usage
//!
//! ```ignore
//! use parley_core::session::{Session, SessionEvent, SubmitOutcome};
//! ```

mod event;
mod manager;
mod message;
mod state;

pub use event::SessionEvent;
pub use manager::{
    ERROR_NOTICE, FALLBACK_REPLY, OFFLINE_NOTICE, RejectReason, Session, SubmitOutcome,
};
pub use message::{Message, Sender};
pub use state::{SessionPhase, SessionState};
