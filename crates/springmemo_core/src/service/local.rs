//! SQLite-backed memo service for single-machine use.
//!
//! # Responsibility
//! - Serve the `MemoService` contract from the local memo store.
//! - Serialize access to one connection across sessions.
//!
//! # Invariants
//! - The connection lock is never held across an `.await`.
//! - SQLite calls run on the blocking pool, never on runtime workers.
//! - Created memos are read back before being returned.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::memo::{validate_title, Memo, MemoId, MemoKind, MemoPage};
use crate::repo::memo_repo::{MemoRepository, SqliteMemoRepository};
use crate::service::memo_service::{MemoService, MemoServiceError, ServiceResult};
use async_trait::async_trait;
use log::info;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Memo service over a local SQLite database.
pub struct LocalMemoService {
    conn: Arc<Mutex<Connection>>,
}

impl LocalMemoService {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a throwaway in-memory store.
    pub fn in_memory() -> DbResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Runs `op` against the repository on the blocking pool.
    async fn with_repo<T, F>(&self, op: F) -> ServiceResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteMemoRepository<'_>) -> ServiceResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| {
                MemoServiceError::Unavailable("memo store lock poisoned".to_string())
            })?;
            let repo = SqliteMemoRepository::new(&conn);
            op(&repo)
        })
        .await
        .map_err(|err| MemoServiceError::Unavailable(format!("memo store task failed: {err}")))?
    }
}

#[async_trait]
impl MemoService for LocalMemoService {
    async fn create(&self, kind: MemoKind, title: &str) -> ServiceResult<Memo> {
        validate_title(title)?;
        let memo = Memo::new(kind, title);

        let created = self
            .with_repo(move |repo| {
                let id = repo.create_memo(&memo)?;
                repo.get_memo(id)?.ok_or(MemoServiceError::NotFound(id))
            })
            .await?;
        info!(
            "event=memo_create module=service status=ok memo_id={} kind={}",
            created.id,
            kind.as_str()
        );
        Ok(created)
    }

    async fn update(&self, id: MemoId, page: &MemoPage) -> ServiceResult<()> {
        let page = page.clone();
        self.with_repo(move |repo| Ok(repo.update_page(id, &page)?))
            .await
    }

    async fn delete(&self, id: MemoId) -> ServiceResult<()> {
        self.with_repo(move |repo| Ok(repo.delete_memo(id)?)).await?;
        info!("event=memo_delete module=service status=ok memo_id={id}");
        Ok(())
    }

    async fn list(&self) -> ServiceResult<Vec<Memo>> {
        self.with_repo(|repo| Ok(repo.list_memos()?)).await
    }

    async fn get(&self, id: MemoId) -> ServiceResult<Option<Memo>> {
        self.with_repo(move |repo| Ok(repo.get_memo(id)?)).await
    }
}
