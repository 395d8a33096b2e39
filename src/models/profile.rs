//! User profile model
//!
//! Stores the physical attributes and stated goal that drive nutrition
//! target computation. Goal-relevant fields are optional in storage so
//! that an incomplete profile can be saved and completed later.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Biological sex, as used by the Mifflin-St Jeor equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" => Some(Sex::Male),
            "female" => Some(Sex::Female),
            _ => None,
        }
    }
}

/// Self-reported activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
        }
    }

    /// Unrecognized levels decode to the lightly-active default
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "sedentary" => ActivityLevel::Sedentary,
            "moderately_active" => ActivityLevel::ModeratelyActive,
            "very_active" => ActivityLevel::VeryActive,
            _ => ActivityLevel::LightlyActive,
        }
    }
}

/// Stated fitness goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    WeightLoss,
    MuscleGain,
    Maintenance,
    Endurance,
    GeneralFitness,
}

impl FitnessGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessGoal::WeightLoss => "weight_loss",
            FitnessGoal::MuscleGain => "muscle_gain",
            FitnessGoal::Maintenance => "maintenance",
            FitnessGoal::Endurance => "endurance",
            FitnessGoal::GeneralFitness => "general_fitness",
        }
    }

    /// Unrecognized goals decode to general fitness (no calorie adjustment)
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "weight_loss" => FitnessGoal::WeightLoss,
            "muscle_gain" => FitnessGoal::MuscleGain,
            "maintenance" => FitnessGoal::Maintenance,
            "endurance" => FitnessGoal::Endurance,
            _ => FitnessGoal::GeneralFitness,
        }
    }
}

/// A user's profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age_years: Option<i64>,
    pub sex: Option<Sex>,
    pub activity_level: Option<ActivityLevel>,
    pub fitness_goal: Option<FitnessGoal>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating or updating a profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age_years: Option<i64>,
    pub sex: Option<Sex>,
    pub activity_level: Option<ActivityLevel>,
    pub fitness_goal: Option<FitnessGoal>,
}

impl UserProfile {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let sex: Option<String> = row.get("sex")?;
        let activity: Option<String> = row.get("activity_level")?;
        let goal: Option<String> = row.get("fitness_goal")?;

        Ok(Self {
            user_id: row.get("user_id")?,
            weight_kg: row.get("weight_kg")?,
            height_cm: row.get("height_cm")?,
            age_years: row.get("age_years")?,
            sex: sex.as_deref().and_then(Sex::from_str),
            activity_level: activity.as_deref().map(ActivityLevel::from_str),
            fitness_goal: goal.as_deref().map(FitnessGoal::from_str),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get a profile by user id
    pub fn get(conn: &Connection, user_id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM profiles WHERE user_id = ?1")?;

        let result = stmt.query_row([user_id], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set or update a profile (upsert)
    pub fn upsert(conn: &Connection, user_id: i64, data: &ProfileUpdate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO profiles (
                user_id, weight_kg, height_cm, age_years, sex, activity_level, fitness_goal
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id) DO UPDATE SET
                weight_kg = excluded.weight_kg,
                height_cm = excluded.height_cm,
                age_years = excluded.age_years,
                sex = excluded.sex,
                activity_level = excluded.activity_level,
                fitness_goal = excluded.fitness_goal,
                updated_at = datetime('now')
            "#,
            params![
                user_id,
                data.weight_kg,
                data.height_cm,
                data.age_years,
                data.sex.map(|s| s.as_str()),
                data.activity_level.map(|a| a.as_str()),
                data.fitness_goal.map(|g| g.as_str()),
            ],
        )?;

        Self::get(conn, user_id)?
            .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }
}
