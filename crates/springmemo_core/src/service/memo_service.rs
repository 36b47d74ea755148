//! Memo service contract.
//!
//! # Responsibility
//! - Define the create/read/update/delete seam the client persists through.
//! - Classify failures so callers can keep a session dirty instead of
//!   crashing.
//!
//! # Invariants
//! - `create` assigns the memo id; callers never invent one.
//! - `update` replaces the whole page (title, source, visibility).

use crate::model::memo::{Memo, MemoId, MemoKind, MemoPage, MemoValidationError};
use crate::repo::memo_repo::RepoError;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, MemoServiceError>;

/// Failure reported by a memo service implementation.
#[derive(Debug)]
pub enum MemoServiceError {
    /// Proposed title is empty.
    InvalidTitle(MemoValidationError),
    /// Target memo does not exist (anymore).
    NotFound(MemoId),
    /// Remote side unreachable or refused the call (network, auth, server).
    Unavailable(String),
    /// Local persistence failure.
    Repo(RepoError),
}

impl Display for MemoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "memo not found: {id}"),
            Self::Unavailable(details) => write!(f, "memo service unavailable: {details}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MemoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTitle(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<MemoValidationError> for MemoServiceError {
    fn from(value: MemoValidationError) -> Self {
        Self::InvalidTitle(value)
    }
}

impl From<RepoError> for MemoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::InvalidTitle(err),
            other => Self::Repo(other),
        }
    }
}

/// Storage backend for memo pages.
///
/// The autosave controller only calls `update`; the memo desk drives the
/// rest.
#[async_trait]
pub trait MemoService: Send + Sync {
    async fn create(&self, kind: MemoKind, title: &str) -> ServiceResult<Memo>;
    async fn update(&self, id: MemoId, page: &MemoPage) -> ServiceResult<()>;
    async fn delete(&self, id: MemoId) -> ServiceResult<()>;
    async fn list(&self) -> ServiceResult<Vec<Memo>>;
    async fn get(&self, id: MemoId) -> ServiceResult<Option<Memo>>;
}
