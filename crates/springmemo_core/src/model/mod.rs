//! Domain model for memos mirrored against the memo service.
//!
//! # Responsibility
//! - Define the canonical memo record shared by codec, autosave and storage.
//! - Own title validation so every layer rejects the same inputs.
//!
//! # Invariants
//! - Every memo is identified by a stable `MemoId` assigned at creation.
//! - A persisted memo title is never empty.

pub mod memo;
