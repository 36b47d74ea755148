//! Per-session autosave task.
//!
//! # Responsibility
//! - Serialize edit, rename, toggle, save and close commands for one memo.
//! - Own the session's debounce timer and its single in-flight save.
//! - Forward status changes and failures to the note host.
//!
//! # Invariants
//! - Transitions for one session never run concurrently.
//! - An in-flight save always runs to completion, even when closing.
//! - A close request is answered only after any in-flight save settles.

use crate::autosave::state::{
    CloseOutcome, Effect, NoteSession, SaveRequest, SessionSnapshot,
};
use crate::autosave::timer::DebounceTimer;
use crate::config::AutosaveConfig;
use crate::host::NoteHost;
use crate::model::memo::{validate_title, Memo, MemoId, MemoValidationError};
use crate::service::memo_service::{MemoService, MemoServiceError, ServiceResult};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Error returned by `SessionHandle` calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Proposed title rejected; nothing was sent to the session.
    InvalidTitle(MemoValidationError),
    /// The session already ended.
    Closed,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle(err) => write!(f, "{err}"),
            Self::Closed => write!(f, "note session is closed"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTitle(err) => Some(err),
            Self::Closed => None,
        }
    }
}

impl From<MemoValidationError> for SessionError {
    fn from(value: MemoValidationError) -> Self {
        Self::InvalidTitle(value)
    }
}

#[derive(Debug)]
enum SessionCommand {
    Edit(String),
    Rename(String),
    ToggleOpen,
    Save,
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Close(oneshot::Sender<CloseOutcome>),
}

/// Cloneable handle the host uses to drive one note session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    memo_id: MemoId,
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub fn memo_id(&self) -> MemoId {
        self.memo_id
    }

    /// Whether the session task has ended.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Delivers the latest full text of the note body.
    pub fn edit_text(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionCommand::Edit(text.into()))
    }

    /// Proposes a new title; empty titles are rejected here, synchronously.
    pub fn rename(&self, title: impl Into<String>) -> Result<(), SessionError> {
        let title = title.into();
        validate_title(&title)?;
        self.send(SessionCommand::Rename(title))
    }

    pub fn toggle_open(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::ToggleOpen)
    }

    /// Saves now if there is anything pending.
    pub fn request_save(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Save)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot(reply_tx))?;
        reply_rx.await.map_err(|_| SessionError::Closed)
    }

    /// Closes the session, flushing pending changes first.
    ///
    /// Resolves once the session has fully settled.
    pub async fn close(&self) -> Result<CloseOutcome, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Close(reply_tx))?;
        reply_rx.await.map_err(|_| SessionError::Closed)
    }

    fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.tx.send(command).map_err(|_| SessionError::Closed)
    }
}

struct InFlightSave {
    revision: u64,
    started_at: Instant,
    handle: JoinHandle<ServiceResult<()>>,
}

enum Step {
    Command(Option<SessionCommand>),
    TimerFired,
    SaveSettled(ServiceResult<()>),
}

/// Task driving one `NoteSession`.
pub struct AutosaveController {
    session: NoteSession,
    service: Arc<dyn MemoService>,
    host: Arc<dyn NoteHost>,
    rx: mpsc::UnboundedReceiver<SessionCommand>,
    rx_open: bool,
    timer: DebounceTimer,
    in_flight: Option<InFlightSave>,
    close_waiters: Vec<oneshot::Sender<CloseOutcome>>,
}

impl AutosaveController {
    /// Starts a session task for `memo` on the current tokio runtime.
    pub fn spawn(
        memo: Memo,
        service: Arc<dyn MemoService>,
        host: Arc<dyn NoteHost>,
        config: &AutosaveConfig,
    ) -> SessionHandle {
        let memo_id = memo.id;
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            session: NoteSession::new(memo, config.quiet_period()),
            service,
            host,
            rx,
            rx_open: true,
            timer: DebounceTimer::new(),
            in_flight: None,
            close_waiters: Vec::new(),
        };
        tokio::spawn(controller.run());
        info!("event=session_open module=autosave status=ok memo_id={memo_id}");
        SessionHandle { memo_id, tx }
    }

    async fn run(mut self) {
        while !self.session.is_closed() {
            let step = tokio::select! {
                biased;
                result = settle(&mut self.in_flight) => Step::SaveSettled(result),
                command = self.rx.recv(), if self.rx_open => Step::Command(command),
                () = self.timer.expired() => Step::TimerFired,
            };

            match step {
                Step::Command(Some(command)) => self.handle_command(command),
                Step::Command(None) => {
                    self.rx_open = false;
                    debug!(
                        "event=session_detached module=autosave memo_id={}",
                        self.session.memo_id()
                    );
                    let effects = self.session.close();
                    self.apply(effects);
                }
                Step::TimerFired => {
                    let effects = self.session.timer_fired(Instant::now());
                    self.apply(effects);
                }
                Step::SaveSettled(result) => self.on_save_settled(result),
            }
        }
        info!(
            "event=session_close module=autosave status=ok memo_id={}",
            self.session.memo_id()
        );
    }

    fn handle_command(&mut self, command: SessionCommand) {
        let now = Instant::now();
        if !self.session.accepts_changes()
            && matches!(
                command,
                SessionCommand::Edit(_) | SessionCommand::Rename(_) | SessionCommand::ToggleOpen
            )
        {
            warn!(
                "event=session_command module=autosave status=ignored reason=closing memo_id={}",
                self.session.memo_id()
            );
            return;
        }

        let effects = match command {
            SessionCommand::Edit(text) => self.session.edit_text(text, now),
            SessionCommand::Rename(title) => match self.session.rename(title, now) {
                Ok(effects) => effects,
                Err(err) => {
                    warn!(
                        "event=session_rename module=autosave status=rejected memo_id={} error={}",
                        self.session.memo_id(),
                        err
                    );
                    Vec::new()
                }
            },
            SessionCommand::ToggleOpen => self.session.toggle_open(now),
            SessionCommand::Save => self.session.request_save(),
            SessionCommand::Snapshot(reply) => {
                let _ = reply.send(self.session.snapshot());
                Vec::new()
            }
            SessionCommand::Close(reply) => {
                self.close_waiters.push(reply);
                self.session.close()
            }
        };
        self.apply(effects);
    }

    fn on_save_settled(&mut self, result: ServiceResult<()>) {
        let Some(save) = self.in_flight.take() else {
            return;
        };
        let memo_id = self.session.memo_id();
        let duration_ms = save.started_at.elapsed().as_millis();

        match &result {
            Ok(()) => info!(
                "event=memo_save module=autosave status=ok memo_id={} revision={} duration_ms={}",
                memo_id, save.revision, duration_ms
            ),
            Err(err) => {
                warn!(
                    "event=memo_save module=autosave status=error memo_id={} revision={} duration_ms={} error={}",
                    memo_id, save.revision, duration_ms, err
                );
                self.host.save_failed(memo_id, err);
            }
        }

        let effects = self.session.save_settled(result.is_ok(), Instant::now());
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        let memo_id = self.session.memo_id();
        for effect in effects {
            match effect {
                Effect::ArmTimer(deadline) => self.timer.arm(deadline),
                Effect::CancelTimer => self.timer.cancel(),
                Effect::Persist(request) => self.start_save(request),
                Effect::Status(status) => self.host.status_changed(memo_id, status),
                Effect::VisibilityChanged(is_open) => {
                    self.host.visibility_changed(memo_id, is_open)
                }
                Effect::CloseComplete(outcome) => {
                    self.host.close_completed(memo_id, outcome);
                    for waiter in self.close_waiters.drain(..) {
                        let _ = waiter.send(outcome);
                    }
                }
            }
        }
    }

    fn start_save(&mut self, request: SaveRequest) {
        let service = Arc::clone(&self.service);
        let SaveRequest {
            memo_id,
            revision,
            page,
        } = request;
        debug!(
            "event=memo_save module=autosave status=start memo_id={} revision={} source_len={}",
            memo_id,
            revision,
            page.source.len()
        );
        let handle = tokio::spawn(async move { service.update(memo_id, &page).await });
        self.in_flight = Some(InFlightSave {
            revision,
            started_at: Instant::now(),
            handle,
        });
    }
}

async fn settle(in_flight: &mut Option<InFlightSave>) -> ServiceResult<()> {
    match in_flight.as_mut() {
        Some(save) => match (&mut save.handle).await {
            Ok(result) => result,
            Err(join_err) => Err(MemoServiceError::Unavailable(format!(
                "save task did not complete: {join_err}"
            ))),
        },
        None => future::pending().await,
    }
}
