//! Pure autosave state machine for one open memo.
//!
//! # Responsibility
//! - Track the latest editable text, title and visibility of a note session.
//! - Decide when a save is scheduled, started, settled and when a close may
//!   complete.
//! - Describe side effects as `Effect` values; executing them is the
//!   controller's job.
//!
//! # Invariants
//! - `Clean` implies the pending text decodes from `memo.source` and the
//!   pending title/visibility equal the memo's.
//! - `Dirty` implies an armed debounce deadline, except right after a failed
//!   save: the retry waits for the next user action or explicit trigger.
//! - At most one save is in flight; edits made meanwhile bump the revision but
//!   never leak into the in-flight payload.

use crate::codec;
use crate::model::memo::{validate_title, Memo, MemoId, MemoPage, MemoValidationError};
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, Instant};

/// Save indicator state reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    /// Everything shown is persisted.
    Clean,
    /// Local changes are waiting for a save.
    Dirty,
    /// A save call is outstanding.
    Saving,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseOutcome {
    /// All changes reached the memo service.
    Saved,
    /// The last save attempt failed; local changes were not persisted.
    Unsaved,
}

/// Payload of one save call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub memo_id: MemoId,
    /// Session revision the payload was built from.
    pub revision: u64,
    pub page: MemoPage,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Cancel any scheduled save and schedule a new one at the deadline.
    ArmTimer(Instant),
    CancelTimer,
    Persist(SaveRequest),
    Status(SaveStatus),
    VisibilityChanged(bool),
    CloseComplete(CloseOutcome),
}

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Last confirmed-persisted memo.
    pub memo: Memo,
    pub status: SaveStatus,
    pub pending_text: String,
    pub pending_title: String,
    pub pending_open: bool,
    pub debounce_deadline: Option<Instant>,
}

/// Runtime state of one open memo.
#[derive(Debug)]
pub struct NoteSession {
    memo: Memo,
    quiet_period: Duration,
    status: SaveStatus,
    pending_text: String,
    pending_title: String,
    pending_open: bool,
    debounce_deadline: Option<Instant>,
    revision: u64,
    in_flight: Option<SaveRequest>,
    close_requested: bool,
    closed: bool,
}

impl NoteSession {
    /// Starts a clean session from a freshly loaded memo.
    pub fn new(memo: Memo, quiet_period: Duration) -> Self {
        let pending_text = codec::decode(&memo.source);
        let pending_title = memo.title.clone();
        let pending_open = memo.is_open;
        Self {
            memo,
            quiet_period,
            status: SaveStatus::Clean,
            pending_text,
            pending_title,
            pending_open,
            debounce_deadline: None,
            revision: 0,
            in_flight: None,
            close_requested: false,
            closed: false,
        }
    }

    pub fn memo_id(&self) -> MemoId {
        self.memo.id
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn pending_text(&self) -> &str {
        &self.pending_text
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debounce_deadline
    }

    /// Whether new user changes are still accepted.
    pub fn accepts_changes(&self) -> bool {
        !self.close_requested
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            memo: self.memo.clone(),
            status: self.status,
            pending_text: self.pending_text.clone(),
            pending_title: self.pending_title.clone(),
            pending_open: self.pending_open,
            debounce_deadline: self.debounce_deadline,
        }
    }

    /// Replaces the editable text with the latest snapshot from the host.
    pub fn edit_text(&mut self, text: impl Into<String>, now: Instant) -> Vec<Effect> {
        if !self.accepts_changes() {
            return Vec::new();
        }
        self.pending_text = text.into();
        self.mark_changed(now)
    }

    /// Accepts a new title. Empty titles leave the session untouched.
    pub fn rename(
        &mut self,
        title: impl Into<String>,
        now: Instant,
    ) -> Result<Vec<Effect>, MemoValidationError> {
        let title = title.into();
        validate_title(&title)?;
        if !self.accepts_changes() {
            return Ok(Vec::new());
        }
        self.pending_title = title;
        Ok(self.mark_changed(now))
    }

    /// Flips visibility. Always dirties the session, since the flag is
    /// persisted with the memo.
    pub fn toggle_open(&mut self, now: Instant) -> Vec<Effect> {
        if !self.accepts_changes() {
            return Vec::new();
        }
        self.pending_open = !self.pending_open;
        let mut effects = vec![Effect::VisibilityChanged(self.pending_open)];
        effects.extend(self.mark_changed(now));
        effects
    }

    /// Debounce deadline reached.
    pub fn timer_fired(&mut self, now: Instant) -> Vec<Effect> {
        let due = self
            .debounce_deadline
            .is_some_and(|deadline| deadline <= now);
        if self.status != SaveStatus::Dirty || !due {
            return Vec::new();
        }
        self.begin_save()
    }

    /// Explicit save (status indicator click). No-op unless dirty.
    pub fn request_save(&mut self) -> Vec<Effect> {
        if self.status != SaveStatus::Dirty {
            return Vec::new();
        }
        self.begin_save()
    }

    /// Host asked to close the note.
    pub fn close(&mut self) -> Vec<Effect> {
        if self.closed {
            return Vec::new();
        }
        self.close_requested = true;
        match self.status {
            SaveStatus::Clean => self.finish_close(CloseOutcome::Saved),
            SaveStatus::Dirty => self.begin_save(),
            SaveStatus::Saving => Vec::new(),
        }
    }

    /// The in-flight save finished.
    pub fn save_settled(&mut self, succeeded: bool, now: Instant) -> Vec<Effect> {
        let Some(request) = self.in_flight.take() else {
            return Vec::new();
        };
        let newer_changes = request.revision != self.revision;
        let mut effects = Vec::new();

        if succeeded {
            self.memo.apply_page(request.page);
            if !newer_changes {
                self.set_status(SaveStatus::Clean, &mut effects);
                if self.close_requested {
                    effects.extend(self.finish_close(CloseOutcome::Saved));
                }
                return effects;
            }
            self.set_status(SaveStatus::Dirty, &mut effects);
            if self.close_requested {
                effects.extend(self.begin_save());
            } else {
                effects.push(self.arm(now));
            }
            return effects;
        }

        self.set_status(SaveStatus::Dirty, &mut effects);
        if self.close_requested {
            effects.extend(self.finish_close(CloseOutcome::Unsaved));
        } else if newer_changes {
            // Changes made during the failed save count as the next user action.
            effects.push(self.arm(now));
        }
        effects
    }

    fn mark_changed(&mut self, now: Instant) -> Vec<Effect> {
        self.revision += 1;
        let mut effects = Vec::new();
        if self.status == SaveStatus::Saving {
            return effects;
        }
        self.set_status(SaveStatus::Dirty, &mut effects);
        effects.push(self.arm(now));
        effects
    }

    fn arm(&mut self, now: Instant) -> Effect {
        let deadline = now + self.quiet_period;
        self.debounce_deadline = Some(deadline);
        Effect::ArmTimer(deadline)
    }

    fn begin_save(&mut self) -> Vec<Effect> {
        self.debounce_deadline = None;
        let request = SaveRequest {
            memo_id: self.memo.id,
            revision: self.revision,
            page: MemoPage {
                title: self.pending_title.clone(),
                source: codec::encode(&self.pending_text),
                is_open: self.pending_open,
            },
        };
        self.in_flight = Some(request.clone());

        let mut effects = vec![Effect::CancelTimer];
        self.set_status(SaveStatus::Saving, &mut effects);
        effects.push(Effect::Persist(request));
        effects
    }

    fn finish_close(&mut self, outcome: CloseOutcome) -> Vec<Effect> {
        self.closed = true;
        self.debounce_deadline = None;
        vec![Effect::CancelTimer, Effect::CloseComplete(outcome)]
    }

    fn set_status(&mut self, next: SaveStatus, effects: &mut Vec<Effect>) {
        if self.status != next {
            self.status = next;
            effects.push(Effect::Status(next));
        }
    }
}
