//! Memo domain model.
//!
//! # Responsibility
//! - Define the memo identity plus its mutable page (title, source, visibility).
//! - Provide title validation used before any title reaches the service.
//!
//! # Invariants
//! - `id` is stable and never reused for another memo.
//! - `title` is never the empty string.
//! - `source` holds the stored markup fragment verbatim; it may be empty for a
//!   memo that has never been saved with a body.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one memo.
pub type MemoId = Uuid;

/// Memo flavour picked in the "new memo" flow.
///
/// Each kind has a name (stored form) and a numeric code (1/2/3, the order of
/// the kind choices in the "new memo" dialog). `parse` accepts either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoKind {
    /// Free-form text memo.
    Normal,
    /// Checklist-style memo.
    Todo,
    /// Date-bound memo.
    Schedule,
}

impl MemoKind {
    /// Numeric code of the kind.
    pub fn code(self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::Todo => 2,
            Self::Schedule => 3,
        }
    }

    /// Parses a numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Normal),
            2 => Some(Self::Todo),
            3 => Some(Self::Schedule),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Todo => "todo",
            Self::Schedule => "schedule",
        }
    }

    /// Parses a kind name (case-insensitive) or a numeric code.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(code) = value.parse::<u8>() {
            return Self::from_code(code);
        }
        match value.to_ascii_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "todo" => Some(Self::Todo),
            "schedule" => Some(Self::Schedule),
            _ => None,
        }
    }
}

/// Validation errors for memo fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoValidationError {
    /// Proposed title is empty.
    EmptyTitle,
}

impl Display for MemoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "memo title cannot be empty"),
        }
    }
}

impl Error for MemoValidationError {}

/// Mutable part of a memo, sent as one unit on every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoPage {
    pub title: String,
    /// Stored markup fragment.
    pub source: String,
    pub is_open: bool,
}

/// Canonical memo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    /// Assigned by the memo service; immutable after creation.
    pub id: MemoId,
    pub kind: MemoKind,
    pub title: String,
    /// Stored markup fragment (persisted form of the body).
    pub source: String,
    /// Visibility flag persisted alongside the memo.
    pub is_open: bool,
}

impl Memo {
    /// Creates a new memo with a generated stable ID and no body yet.
    ///
    /// New memos start visible, matching the "new memo" flow that pops the
    /// note window right away.
    pub fn new(kind: MemoKind, title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), kind, title)
    }

    /// Creates a memo with a caller-provided ID.
    ///
    /// Used by storage read paths where identity already exists.
    pub fn with_id(id: MemoId, kind: MemoKind, title: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            source: String::new(),
            is_open: true,
        }
    }

    /// Validates persisted-state invariants.
    pub fn validate(&self) -> Result<(), MemoValidationError> {
        validate_title(&self.title)
    }

    /// Returns the mutable page of this memo.
    pub fn page(&self) -> MemoPage {
        MemoPage {
            title: self.title.clone(),
            source: self.source.clone(),
            is_open: self.is_open,
        }
    }

    /// Replaces the mutable page with a confirmed-persisted one.
    pub fn apply_page(&mut self, page: MemoPage) {
        self.title = page.title;
        self.source = page.source;
        self.is_open = page.is_open;
    }
}

/// Rejects empty titles. Whitespace is content.
pub fn validate_title(title: &str) -> Result<(), MemoValidationError> {
    if title.is_empty() {
        return Err(MemoValidationError::EmptyTitle);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_title, Memo, MemoKind, MemoValidationError};

    #[test]
    fn kind_codes_roundtrip() {
        for kind in [MemoKind::Normal, MemoKind::Todo, MemoKind::Schedule] {
            assert_eq!(MemoKind::from_code(kind.code()), Some(kind));
            assert_eq!(MemoKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MemoKind::from_code(0), None);
        assert_eq!(MemoKind::parse("calendar"), None);
    }

    #[test]
    fn parse_accepts_names_and_codes() {
        assert_eq!(MemoKind::parse("2"), Some(MemoKind::Todo));
        assert_eq!(MemoKind::parse(" 3 "), Some(MemoKind::Schedule));
        assert_eq!(MemoKind::parse("Normal"), Some(MemoKind::Normal));
        assert_eq!(MemoKind::parse("4"), None);
    }

    #[test]
    fn new_memo_is_open_and_has_no_body() {
        let memo = Memo::new(MemoKind::Todo, "groceries");
        assert!(memo.is_open);
        assert!(memo.source.is_empty());
        assert!(memo.validate().is_ok());
    }

    #[test]
    fn only_empty_titles_are_rejected() {
        assert_eq!(validate_title(""), Err(MemoValidationError::EmptyTitle));
        assert!(validate_title("  \t").is_ok());
        assert!(validate_title(" ").is_ok());
        assert!(validate_title("x").is_ok());
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&MemoKind::Schedule).unwrap();
        assert_eq!(json, "\"schedule\"");
    }
}
