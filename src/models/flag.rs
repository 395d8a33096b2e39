//! Flag model
//!
//! A user report against existing content, awaiting moderation. A flag is
//! addressable only under its recorded content type and is resolved
//! exactly once.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Kind of content a flag points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagContentType {
    ContributedFoods,
    Workouts,
    Meals,
}

impl FlagContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagContentType::ContributedFoods => "contributed_foods",
            FlagContentType::Workouts => "workouts",
            FlagContentType::Meals => "meals",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "contributed_foods" => Some(FlagContentType::ContributedFoods),
            "workouts" => Some(FlagContentType::Workouts),
            "meals" => Some(FlagContentType::Meals),
            _ => None,
        }
    }
}

/// Resolution state of a flag.
///
/// `Open` is the only non-terminal state. `ResolvedAccepted` means the
/// flagged content was judged acceptable and stays live;
/// `ResolvedUpheld` means the report was upheld. Any removal of upheld
/// content is a separate, explicit caller action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagStatus {
    Open,
    ResolvedAccepted,
    ResolvedUpheld,
}

impl FlagStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagStatus::Open => "open",
            FlagStatus::ResolvedAccepted => "resolved_accepted",
            FlagStatus::ResolvedUpheld => "resolved_upheld",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(FlagStatus::Open),
            "resolved_accepted" => Some(FlagStatus::ResolvedAccepted),
            "resolved_upheld" => Some(FlagStatus::ResolvedUpheld),
            _ => None,
        }
    }

    /// Whether this state admits no further transition
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FlagStatus::Open)
    }
}

/// A report filed against existing content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlaggedContent {
    pub id: i64,
    pub content_type: FlagContentType,
    pub content_id: i64,
    pub reason: String,
    pub reporter_id: i64,
    pub status: FlagStatus,
    pub created_at: String,
}

/// Data for filing a new flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagCreate {
    pub content_type: FlagContentType,
    pub content_id: i64,
    pub reason: String,
    pub reporter_id: i64,
}

impl FlaggedContent {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let content_type: String = row.get("content_type")?;
        let status: String = row.get("status")?;

        Ok(Self {
            id: row.get("id")?,
            content_type: FlagContentType::from_str(&content_type)
                .unwrap_or(FlagContentType::Meals),
            content_id: row.get("content_id")?,
            reason: row.get("reason")?,
            reporter_id: row.get("reporter_id")?,
            status: FlagStatus::from_str(&status).unwrap_or(FlagStatus::Open),
            created_at: row.get("created_at")?,
        })
    }

    /// File a new flag in the open state
    pub fn create(conn: &Connection, data: &FlagCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO flags (content_type, content_id, reason, reporter_id)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                data.content_type.as_str(),
                data.content_id,
                data.reason,
                data.reporter_id,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a flag by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM flags WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(flag) => Ok(Some(flag)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List open flags, optionally restricted to one content type,
    /// oldest first
    pub fn list_open(
        conn: &Connection,
        content_type: Option<FlagContentType>,
    ) -> DbResult<Vec<Self>> {
        if let Some(ct) = content_type {
            let mut stmt = conn.prepare(
                r#"
                SELECT * FROM flags
                WHERE status = 'open' AND content_type = ?1
                ORDER BY created_at ASC, id ASC
                "#,
            )?;
            let flags = stmt
                .query_map([ct.as_str()], Self::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(flags)
        } else {
            let mut stmt = conn.prepare(
                "SELECT * FROM flags WHERE status = 'open' ORDER BY created_at ASC, id ASC",
            )?;
            let flags = stmt
                .query_map([], Self::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(flags)
        }
    }

    /// Compare-and-set the status out of `open`.
    ///
    /// The flag must match both the id and the caller-supplied content
    /// type. Returns `true` if this call resolved the flag, `false` if it
    /// was already resolved or did not match.
    pub fn try_resolve(
        conn: &Connection,
        content_type: FlagContentType,
        id: i64,
        to: FlagStatus,
    ) -> DbResult<bool> {
        let rows = conn.execute(
            r#"
            UPDATE flags
            SET status = ?1
            WHERE id = ?2 AND content_type = ?3 AND status = 'open'
            "#,
            params![to.as_str(), id, content_type.as_str()],
        )?;
        Ok(rows > 0)
    }
}
