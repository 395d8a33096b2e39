//! Exercise catalog models
//!
//! The muscle-group / muscle / exercise hierarchy used for browsing, plus
//! the independent many-to-many targeted-muscle set. The navigation
//! hierarchy is strict containment; which muscles an exercise *targets*
//! is recorded separately in the `exercise_muscles` junction, and all
//! exercise queries go through that junction so an exercise reachable
//! under a muscle always declares it as a target.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Exercise difficulty rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Beginner" => Some(Difficulty::Beginner),
            "Intermediate" => Some(Difficulty::Intermediate),
            "Advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

/// Top level of the navigation hierarchy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuscleGroup {
    pub id: i64,
    pub name: String,
}

/// Second level: a muscle within a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Muscle {
    pub id: i64,
    pub group_id: i64,
    pub name: String,
}

/// A catalog exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub difficulty: Difficulty,
    pub equipment: Vec<String>,
    pub description: Option<String>,
}

/// Data for inserting a catalog exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseCreate {
    pub name: String,
    pub difficulty: Difficulty,
    pub equipment: Vec<String>,
    pub description: Option<String>,
    /// Ids of the muscles this exercise targets
    pub muscle_ids: Vec<i64>,
}

impl MuscleGroup {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }

    /// Insert a group; returns the existing row if the name is taken
    pub fn create(conn: &Connection, name: &str) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO muscle_groups (name) VALUES (?1)
             ON CONFLICT(name) DO NOTHING",
            [name],
        )?;

        let mut stmt = conn.prepare("SELECT * FROM muscle_groups WHERE name = ?1")?;
        Ok(stmt.query_row([name], Self::from_row)?)
    }

    /// List all groups in insertion order
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM muscle_groups ORDER BY id ASC")?;

        let groups = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(groups)
    }
}

impl Muscle {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            group_id: row.get("group_id")?,
            name: row.get("name")?,
        })
    }

    /// Insert a muscle under a group; returns the existing row if the
    /// name is already present under the same group.
    ///
    /// Muscle names are globally unique because the muscle is the
    /// addressable unit for exercise queries, so re-creating a name under
    /// a different group is an error rather than a silent reparent.
    pub fn create(conn: &Connection, group_id: i64, name: &str) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO muscles (group_id, name) VALUES (?1, ?2)
             ON CONFLICT(name) DO NOTHING",
            params![group_id, name],
        )?;

        let mut stmt = conn.prepare("SELECT * FROM muscles WHERE name = ?1")?;
        let muscle = stmt.query_row([name], Self::from_row)?;
        if muscle.group_id != group_id {
            return Err(crate::db::DbError::Invalid(format!(
                "muscle '{}' already belongs to another group",
                name
            )));
        }
        Ok(muscle)
    }

    /// List the muscles of the named group, in insertion order.
    /// An unknown group name yields an empty list.
    pub fn list_for_group(conn: &Connection, group_name: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT m.* FROM muscles m
            INNER JOIN muscle_groups g ON g.id = m.group_id
            WHERE g.name = ?1
            ORDER BY m.id ASC
            "#,
        )?;

        let muscles = stmt
            .query_map([group_name], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(muscles)
    }
}

impl Exercise {
    /// Create from a database row.
    ///
    /// The equipment column holds a JSON array; rows with unparsable
    /// equipment decode to an empty list rather than failing the query.
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let difficulty: String = row.get("difficulty")?;
        let equipment_json: String = row.get("equipment")?;
        let equipment: Vec<String> = serde_json::from_str(&equipment_json).unwrap_or_default();

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            difficulty: Difficulty::from_str(&difficulty).unwrap_or(Difficulty::Beginner),
            equipment,
            description: row.get("description")?,
        })
    }

    /// Insert an exercise and its targeted-muscle set
    pub fn create(conn: &Connection, data: &ExerciseCreate) -> DbResult<Self> {
        let equipment_json = serde_json::to_string(&data.equipment)
            .map_err(|e| crate::db::DbError::Invalid(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO exercises (name, difficulty, equipment, description)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                data.name,
                data.difficulty.as_str(),
                equipment_json,
                data.description,
            ],
        )?;

        let id = conn.last_insert_rowid();
        for muscle_id in &data.muscle_ids {
            conn.execute(
                "INSERT OR IGNORE INTO exercise_muscles (exercise_id, muscle_id) VALUES (?1, ?2)",
                params![id, muscle_id],
            )?;
        }

        Self::get_by_id(conn, id)?
            .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get an exercise by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM exercises WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(exercise) => Ok(Some(exercise)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List the exercises whose targeted-muscle set contains the named
    /// muscle, in insertion order. Unknown muscle names yield an empty
    /// list.
    pub fn list_for_muscle(conn: &Connection, muscle_name: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT e.* FROM exercises e
            INNER JOIN exercise_muscles em ON em.exercise_id = e.id
            INNER JOIN muscles m ON m.id = em.muscle_id
            WHERE m.name = ?1
            ORDER BY e.id ASC
            "#,
        )?;

        let exercises = stmt
            .query_map([muscle_name], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(exercises)
    }
}
