//! Repository layer for the local memo store.
//!
//! # Responsibility
//! - Define memo data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod memo_repo;
