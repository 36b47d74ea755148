//! Core of the SpringMemo desktop client.
//!
//! Holds the content codec, the per-note autosave state machine, the memo
//! service seam with its local SQLite implementation, and the host-side memo
//! desk. Windows, tray menus and dialogs live in the host.

pub mod autosave;
pub mod codec;
pub mod config;
pub mod db;
pub mod desk;
pub mod host;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use autosave::{
    AutosaveController, CloseOutcome, NoteSession, SaveStatus, SessionError, SessionHandle,
    SessionSnapshot,
};
pub use config::{load_config, AppConfig, AutosaveConfig, ConfigError};
pub use desk::{DeskError, MemoDesk};
pub use host::{ChannelNoteHost, HostNotification, InstanceGuard, NoteHost, SingleInstance};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::memo::{Memo, MemoId, MemoKind, MemoPage, MemoValidationError};
pub use repo::memo_repo::{MemoRepository, RepoError, RepoResult, SqliteMemoRepository};
pub use service::local::LocalMemoService;
pub use service::memo_service::{MemoService, MemoServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
