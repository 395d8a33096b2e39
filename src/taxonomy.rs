//! Taxonomy index
//!
//! Read-only queries over the exercise catalog: the group -> muscle ->
//! exercise drill-down, per-muscle filtering, sorting, and equipment
//! option derivation. The muscle is the addressable unit for exercise
//! selection; a group's exercises are the union over its muscles,
//! recomputed per selection rather than cached, because the
//! difficulty/equipment filters are scoped to one muscle selection.
//!
//! The catalog is partially curated: entries with blank names are
//! excluded from results (with a warning) instead of failing the query.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::{Exercise, Muscle, MuscleGroup};

/// Taxonomy error types
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Exercise catalog unavailable: {0}")]
    CatalogUnavailable(#[from] DbError),
}

/// The wildcard filter value meaning "unrestricted"
const FILTER_ALL: &str = "all";

/// Per-muscle exercise filter. `None` or `"all"` leaves a criterion
/// unrestricted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseFilter {
    /// Exact, case-sensitive difficulty match ("Beginner", "Intermediate",
    /// "Advanced")
    pub difficulty: Option<String>,
    /// Case-insensitive equipment membership match
    pub equipment: Option<String>,
}

impl ExerciseFilter {
    fn matches(&self, exercise: &Exercise) -> bool {
        if let Some(want) = restriction(&self.difficulty) {
            if exercise.difficulty.as_str() != want {
                return false;
            }
        }
        if let Some(want) = restriction(&self.equipment) {
            let want = want.to_lowercase();
            if !exercise
                .equipment
                .iter()
                .any(|e| e.to_lowercase() == want)
            {
                return false;
            }
        }
        true
    }
}

/// Treat `None` and `"all"` as no restriction
fn restriction(value: &Option<String>) -> Option<&str> {
    match value.as_deref() {
        None => None,
        Some(v) if v.eq_ignore_ascii_case(FILTER_ALL) => None,
        Some(v) => Some(v),
    }
}

/// Sort direction for exercise name ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// List all muscle groups in insertion order
pub fn list_muscle_groups(db: &Database) -> Result<Vec<MuscleGroup>, TaxonomyError> {
    let conn = db.get_conn()?;
    Ok(MuscleGroup::list(&conn)?)
}

/// List the muscles of the named group. An unknown group name yields an
/// empty list, not an error; catalog membership is advisory.
pub fn list_muscles(db: &Database, group_name: &str) -> Result<Vec<Muscle>, TaxonomyError> {
    let conn = db.get_conn()?;
    Ok(Muscle::list_for_group(&conn, group_name)?)
}

/// List the exercises targeting the named muscle, restricted by the
/// filter. Blank-named catalog entries are excluded.
pub fn list_exercises(
    db: &Database,
    muscle_name: &str,
    filter: &ExerciseFilter,
) -> Result<Vec<Exercise>, TaxonomyError> {
    let conn = db.get_conn()?;
    let exercises = Exercise::list_for_muscle(&conn, muscle_name)?;

    let result = exercises
        .into_iter()
        .filter(|e| {
            if e.name.trim().is_empty() {
                tracing::warn!(exercise_id = e.id, "skipping catalog entry with blank name");
                return false;
            }
            filter.matches(e)
        })
        .collect();

    Ok(result)
}

/// Sort exercises by name, case-insensitively. The sort is stable, so
/// exercises with equal names keep their relative order.
pub fn sort_exercises(exercises: &mut [Exercise], order: SortOrder) {
    exercises.sort_by(|a, b| {
        let cmp = a.name.to_lowercase().cmp(&b.name.to_lowercase());
        match order {
            SortOrder::Asc => cmp,
            SortOrder::Desc => cmp.reverse(),
        }
    });
}

/// Deduplicated equipment tokens across the given exercises, for filter
/// option lists. Reflects only the exercises passed in, never the whole
/// catalog. Blank tokens are dropped; deduplication is case-insensitive
/// (matching the filter), with the first-seen casing kept.
pub fn unique_equipment(exercises: &[Exercise]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();

    for exercise in exercises {
        for token in &exercise.equipment {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            if seen.insert(token.to_lowercase()) {
                out.push(token.to_string());
            }
        }
    }

    out
}
