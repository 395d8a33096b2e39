//! Contributed food model
//!
//! A user-submitted food item awaiting moderation. Rows are never deleted;
//! the approval status is flipped exactly once by the moderation engine.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::MacroTotals;
use crate::db::DbResult;

/// Moderation state of a contribution.
///
/// `Pending` is the only non-terminal state; the transition out of it
/// happens at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ApprovalStatus::Pending),
            "approved" => Some(ApprovalStatus::Approved),
            "rejected" => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }

    /// Whether this state admits no further transition
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }
}

/// A user-contributed food item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributedFood {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub macros: MacroTotals,
    pub serving_size: f64,
    pub serving_unit: String,
    pub contributor_id: i64,
    pub approval_status: ApprovalStatus,
    pub created_at: String,
}

/// Data for submitting a new contribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributedFoodCreate {
    pub name: String,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub serving_size: f64,
    pub serving_unit: String,
    pub contributor_id: i64,
}

impl ContributedFood {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status: String = row.get("approval_status")?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            brand: row.get("brand")?,
            barcode: row.get("barcode")?,
            macros: MacroTotals {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                fats: row.get("fats")?,
            },
            serving_size: row.get("serving_size")?,
            serving_unit: row.get("serving_unit")?,
            contributor_id: row.get("contributor_id")?,
            approval_status: ApprovalStatus::from_str(&status).unwrap_or(ApprovalStatus::Pending),
            created_at: row.get("created_at")?,
        })
    }

    /// Insert a new contribution in the pending state
    pub fn create(conn: &Connection, data: &ContributedFoodCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO contributed_foods (
                name, brand, barcode, calories, protein, carbs, fats,
                serving_size, serving_unit, contributor_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                data.name,
                data.brand,
                data.barcode,
                data.calories,
                data.protein,
                data.carbs,
                data.fats,
                data.serving_size,
                data.serving_unit,
                data.contributor_id,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a contribution by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM contributed_foods WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(food) => Ok(Some(food)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List contributions still awaiting review, oldest first
    pub fn list_pending(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM contributed_foods
            WHERE approval_status = 'pending'
            ORDER BY created_at ASC, id ASC
            "#,
        )?;

        let foods = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(foods)
    }

    /// Compare-and-set the status out of `pending`.
    ///
    /// Returns `true` if this call performed the flip, `false` if the row
    /// was no longer pending (or never existed). Only the first reviewer
    /// of a contribution sees `true`.
    pub fn try_set_status(conn: &Connection, id: i64, to: ApprovalStatus) -> DbResult<bool> {
        let rows = conn.execute(
            r#"
            UPDATE contributed_foods
            SET approval_status = ?1
            WHERE id = ?2 AND approval_status = 'pending'
            "#,
            params![to.as_str(), id],
        )?;
        Ok(rows > 0)
    }
}
