//! Meal model
//!
//! A logged meal belonging to one user on one date. Meals are created by
//! direct logging or by the moderation engine's approval cascade, are
//! never auto-mutated afterwards, and are deleted only by explicit call.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::MacroTotals;
use crate::db::{DbError, DbResult};

/// A logged meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub user_id: i64,
    pub date: String, // ISO date: "2025-01-09"
    pub name: String,
    pub macros: MacroTotals,
    pub serving: Option<String>,
    pub created_at: String,
}

/// Data for logging a new meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealCreate {
    pub user_id: i64,
    pub date: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub serving: Option<String>,
}

impl Meal {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            name: row.get("name")?,
            macros: MacroTotals {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                fats: row.get("fats")?,
            },
            serving: row.get("serving")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Insert a new meal. The date must be a valid ISO `YYYY-MM-DD` string.
    pub fn create(conn: &Connection, data: &MealCreate) -> DbResult<Self> {
        // Reject malformed dates up front so date-scoped queries stay exact
        if NaiveDate::parse_from_str(&data.date, "%Y-%m-%d").is_err() {
            return Err(DbError::Invalid(format!("invalid meal date: {}", data.date)));
        }

        conn.execute(
            r#"
            INSERT INTO meals (user_id, date, name, calories, protein, carbs, fats, serving)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                data.user_id,
                data.date,
                data.name,
                data.calories,
                data.protein,
                data.carbs,
                data.fats,
                data.serving,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or_else(|| DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a meal by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(meal) => Ok(Some(meal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List a user's meals for one date, in logging order
    pub fn list_for_date(conn: &Connection, user_id: i64, date: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM meals
            WHERE user_id = ?1 AND date = ?2
            ORDER BY id ASC
            "#,
        )?;

        let meals = stmt
            .query_map(params![user_id, date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(meals)
    }

    /// Delete a meal owned by the given user.
    /// Returns `true` if a row was deleted.
    pub fn delete(conn: &Connection, user_id: i64, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM meals WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }
}
