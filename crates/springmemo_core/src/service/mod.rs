//! Memo service seam and its local implementation.
//!
//! # Responsibility
//! - Define the persistence contract used by autosave and the memo desk.
//! - Keep host and session code decoupled from storage details.

pub mod local;
pub mod memo_service;
