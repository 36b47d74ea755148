//! Memo repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the local `memos` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate the memo title before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Lists are ordered by `updated_at DESC, uuid ASC`.

use crate::db::DbError;
use crate::model::memo::{validate_title, Memo, MemoId, MemoKind, MemoPage, MemoValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const MEMO_SELECT_SQL: &str = "SELECT
    uuid,
    kind,
    title,
    source,
    is_open
FROM memos";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for memo persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(MemoValidationError),
    Db(DbError),
    NotFound(MemoId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "memo not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted memo data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<MemoValidationError> for RepoError {
    fn from(value: MemoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for memo CRUD operations.
pub trait MemoRepository {
    fn create_memo(&self, memo: &Memo) -> RepoResult<MemoId>;
    /// Replaces title, source and visibility of one memo.
    fn update_page(&self, id: MemoId, page: &MemoPage) -> RepoResult<()>;
    fn get_memo(&self, id: MemoId) -> RepoResult<Option<Memo>>;
    fn list_memos(&self) -> RepoResult<Vec<Memo>>;
    /// Removes one memo permanently.
    fn delete_memo(&self, id: MemoId) -> RepoResult<()>;
}

/// SQLite-backed memo repository.
pub struct SqliteMemoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemoRepository<'conn> {
    /// Wraps a migrated connection (see [`crate::db::open_db`]).
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MemoRepository for SqliteMemoRepository<'_> {
    fn create_memo(&self, memo: &Memo) -> RepoResult<MemoId> {
        memo.validate()?;

        self.conn.execute(
            "INSERT INTO memos (uuid, kind, title, source, is_open)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                memo.id.to_string(),
                memo.kind.as_str(),
                memo.title.as_str(),
                memo.source.as_str(),
                bool_to_int(memo.is_open),
            ],
        )?;

        Ok(memo.id)
    }

    fn update_page(&self, id: MemoId, page: &MemoPage) -> RepoResult<()> {
        validate_title(&page.title)?;

        let changed = self.conn.execute(
            "UPDATE memos
             SET
                title = ?2,
                source = ?3,
                is_open = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                page.title.as_str(),
                page.source.as_str(),
                bool_to_int(page.is_open),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_memo(&self, id: MemoId) -> RepoResult<Option<Memo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMO_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_memo_row(row)?));
        }

        Ok(None)
    }

    fn list_memos(&self) -> RepoResult<Vec<Memo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMO_SELECT_SQL} ORDER BY updated_at DESC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut memos = Vec::new();

        while let Some(row) = rows.next()? {
            memos.push(parse_memo_row(row)?);
        }

        Ok(memos)
    }

    fn delete_memo(&self, id: MemoId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM memos WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_memo_row(row: &Row<'_>) -> RepoResult<Memo> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in memos.uuid"))
    })?;

    let kind_text: String = row.get("kind")?;
    let kind = MemoKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid memo kind `{kind_text}` in memos.kind"))
    })?;

    let is_open = match row.get::<_, i64>("is_open")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_open value `{other}` in memos.is_open"
            )));
        }
    };

    let memo = Memo {
        id,
        kind,
        title: row.get("title")?,
        source: row.get("source")?,
        is_open,
    };
    memo.validate()?;
    Ok(memo)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
