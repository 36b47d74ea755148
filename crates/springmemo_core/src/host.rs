//! Host-facing contract for note sessions.
//!
//! # Responsibility
//! - Define the callbacks a note host receives from autosave sessions.
//! - Provide a channel-backed host for hosts living on another task or thread.
//! - Provide the single-instance guard hosts use for modal flows.
//!
//! # Invariants
//! - Host callbacks are invoked from the owning session task, in transition
//!   order for that session.
//! - At most one `InstanceGuard` per `SingleInstance` is alive at a time.

use crate::autosave::state::{CloseOutcome, SaveStatus};
use crate::model::memo::MemoId;
use crate::service::memo_service::MemoServiceError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Receiver of session notifications (status indicator, window visibility).
pub trait NoteHost: Send + Sync {
    fn status_changed(&self, memo_id: MemoId, status: SaveStatus);
    /// A save attempt failed; the session stays dirty.
    fn save_failed(&self, memo_id: MemoId, error: &MemoServiceError);
    fn visibility_changed(&self, memo_id: MemoId, is_open: bool);
    fn close_completed(&self, memo_id: MemoId, outcome: CloseOutcome);
}

/// Owned form of one host callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostNotification {
    Status {
        memo_id: MemoId,
        status: SaveStatus,
    },
    SaveFailed {
        memo_id: MemoId,
        message: String,
    },
    Visibility {
        memo_id: MemoId,
        is_open: bool,
    },
    Closed {
        memo_id: MemoId,
        outcome: CloseOutcome,
    },
}

/// Forwards host callbacks over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNoteHost {
    tx: mpsc::UnboundedSender<HostNotification>,
}

impl ChannelNoteHost {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, notification: HostNotification) {
        // A host that stopped listening only loses its indicator updates.
        let _ = self.tx.send(notification);
    }
}

impl NoteHost for ChannelNoteHost {
    fn status_changed(&self, memo_id: MemoId, status: SaveStatus) {
        self.forward(HostNotification::Status { memo_id, status });
    }

    fn save_failed(&self, memo_id: MemoId, error: &MemoServiceError) {
        self.forward(HostNotification::SaveFailed {
            memo_id,
            message: error.to_string(),
        });
    }

    fn visibility_changed(&self, memo_id: MemoId, is_open: bool) {
        self.forward(HostNotification::Visibility { memo_id, is_open });
    }

    fn close_completed(&self, memo_id: MemoId, outcome: CloseOutcome) {
        self.forward(HostNotification::Closed { memo_id, outcome });
    }
}

/// Single-instance guard for host flows such as the "new memo" dialog.
#[derive(Debug, Clone, Default)]
pub struct SingleInstance {
    busy: Arc<AtomicBool>,
}

impl SingleInstance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the guard, or returns `None` while another holder is alive.
    pub fn try_acquire(&self) -> Option<InstanceGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InstanceGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases its `SingleInstance` on drop.
#[derive(Debug)]
pub struct InstanceGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
