//! Host-side orchestration of memos and their open sessions.
//!
//! # Responsibility
//! - Load memos from the service and open a session for each visible one.
//! - Create, close and delete memos on behalf of the host.
//! - Own the "new memo" single-instance guard.
//!
//! # Invariants
//! - At most one session per memo id.
//! - A memo's session is closed (and flushed) before the memo is deleted.

use crate::autosave::{AutosaveController, CloseOutcome, SessionError, SessionHandle};
use crate::config::AutosaveConfig;
use crate::host::{InstanceGuard, NoteHost, SingleInstance};
use crate::model::memo::{validate_title, Memo, MemoId, MemoKind};
use crate::service::memo_service::{MemoService, MemoServiceError};
use log::{info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug)]
pub enum DeskError {
    Service(MemoServiceError),
    Session(SessionError),
    /// No open session for this memo.
    NoSession(MemoId),
    /// Another "new memo" flow is already running.
    DialogBusy,
}

impl Display for DeskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::Session(err) => write!(f, "{err}"),
            Self::NoSession(id) => write!(f, "no open session for memo {id}"),
            Self::DialogBusy => write!(f, "a new memo dialog is already open"),
        }
    }
}

impl Error for DeskError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            Self::Session(err) => Some(err),
            Self::NoSession(_) | Self::DialogBusy => None,
        }
    }
}

impl From<MemoServiceError> for DeskError {
    fn from(value: MemoServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<SessionError> for DeskError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

/// All memos of one user plus the sessions of the open ones.
pub struct MemoDesk {
    service: Arc<dyn MemoService>,
    host: Arc<dyn NoteHost>,
    config: AutosaveConfig,
    sessions: HashMap<MemoId, SessionHandle>,
    new_memo_dialog: SingleInstance,
}

impl MemoDesk {
    pub fn new(
        service: Arc<dyn MemoService>,
        host: Arc<dyn NoteHost>,
        config: AutosaveConfig,
    ) -> Self {
        Self {
            service,
            host,
            config,
            sessions: HashMap::new(),
            new_memo_dialog: SingleInstance::new(),
        }
    }

    /// Lists every memo and opens a session for each visible one.
    pub async fn load(&mut self) -> Result<Vec<Memo>, DeskError> {
        let memos = self.service.list().await?;
        for memo in memos.iter().filter(|memo| memo.is_open) {
            self.open_memo(memo.clone());
        }
        info!(
            "event=desk_load module=desk status=ok memos={} open_sessions={}",
            memos.len(),
            self.sessions.len()
        );
        Ok(memos)
    }

    /// Lists memos without touching sessions.
    pub async fn list(&self) -> Result<Vec<Memo>, DeskError> {
        Ok(self.service.list().await?)
    }

    /// Claims the "new memo" dialog; `None` while one is already showing.
    pub fn begin_new_memo(&self) -> Option<InstanceGuard> {
        self.new_memo_dialog.try_acquire()
    }

    /// Creates a memo and opens its session.
    pub async fn create_memo(
        &mut self,
        kind: MemoKind,
        title: &str,
    ) -> Result<SessionHandle, DeskError> {
        validate_title(title).map_err(MemoServiceError::from)?;
        let memo = self.service.create(kind, title).await?;
        Ok(self.open_memo(memo))
    }

    /// Returns the session for `memo`, opening one if needed.
    pub fn open_memo(&mut self, memo: Memo) -> SessionHandle {
        if let Some(existing) = self.sessions.get(&memo.id).filter(|h| !h.is_closed()) {
            return existing.clone();
        }
        let handle = AutosaveController::spawn(
            memo,
            Arc::clone(&self.service),
            Arc::clone(&self.host),
            &self.config,
        );
        self.sessions.insert(handle.memo_id(), handle.clone());
        handle
    }

    pub fn session(&self, id: MemoId) -> Option<&SessionHandle> {
        self.sessions.get(&id)
    }

    pub fn open_session_ids(&self) -> Vec<MemoId> {
        self.sessions.keys().copied().collect()
    }

    /// Ends the memo's session locally; the memo itself is kept.
    pub async fn close_memo(&mut self, id: MemoId) -> Result<CloseOutcome, DeskError> {
        let handle = self.sessions.remove(&id).ok_or(DeskError::NoSession(id))?;
        Ok(handle.close().await?)
    }

    /// Closes any session of the memo, then deletes it from the service.
    pub async fn delete_memo(&mut self, id: MemoId) -> Result<(), DeskError> {
        if let Some(handle) = self.sessions.remove(&id) {
            match handle.close().await {
                Ok(_) | Err(SessionError::Closed) => {}
                Err(other) => return Err(other.into()),
            }
        }
        self.service.delete(id).await?;
        Ok(())
    }

    /// Closes every session, flushing dirty ones, and reports each outcome.
    pub async fn quit(&mut self) -> Vec<(MemoId, CloseOutcome)> {
        let mut outcomes = Vec::with_capacity(self.sessions.len());
        for (id, handle) in self.sessions.drain() {
            match handle.close().await {
                Ok(outcome) => outcomes.push((id, outcome)),
                Err(err) => warn!(
                    "event=desk_quit module=desk status=skipped memo_id={} error={}",
                    id, err
                ),
            }
        }
        info!(
            "event=desk_quit module=desk status=ok closed={}",
            outcomes.len()
        );
        outcomes
    }
}
