//! Autosave for open memos.
//!
//! # Responsibility
//! - `state`: pure per-session state machine (Clean / Dirty / Saving).
//! - `timer`: the single debounce timer each session owns.
//! - `controller`: the task that serializes session events, runs saves and
//!   reports to the host.
//!
//! # Invariants
//! - Sessions share no mutable state; each runs on its own task.

pub mod controller;
pub mod state;
pub mod timer;

pub use controller::{AutosaveController, SessionError, SessionHandle};
pub use state::{CloseOutcome, NoteSession, SaveStatus, SessionSnapshot};
