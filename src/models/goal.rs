//! Nutrition goal model
//!
//! Caller-cached output of the goal engine, one row per user. The engine
//! itself never writes this table; storing a computed goal is an explicit
//! caller decision, and it is never refreshed automatically on profile
//! change.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Stored daily nutrition targets for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionGoal {
    pub user_id: i64,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub updated_at: String,
}

impl NutritionGoal {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get("user_id")?,
            calories: row.get("calories")?,
            protein_g: row.get("protein_g")?,
            carbs_g: row.get("carbs_g")?,
            fat_g: row.get("fat_g")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the stored goal for a user
    pub fn get(conn: &Connection, user_id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM nutrition_goals WHERE user_id = ?1")?;

        let result = stmt.query_row([user_id], Self::from_row);
        match result {
            Ok(goal) => Ok(Some(goal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set or update the stored goal for a user (upsert)
    pub fn upsert(
        conn: &Connection,
        user_id: i64,
        calories: f64,
        protein_g: f64,
        carbs_g: f64,
        fat_g: f64,
    ) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO nutrition_goals (user_id, calories, protein_g, carbs_g, fat_g)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id) DO UPDATE SET
                calories = excluded.calories,
                protein_g = excluded.protein_g,
                carbs_g = excluded.carbs_g,
                fat_g = excluded.fat_g,
                updated_at = datetime('now')
            "#,
            params![user_id, calories, protein_g, carbs_g, fat_g],
        )?;

        Self::get(conn, user_id)?
            .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }
}
