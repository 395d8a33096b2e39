//! Utility to load an exercise catalog JSON file into the database
//!
//! Usage: seed_catalog <catalog.json>
//!
//! Expected shape:
//! {
//!   "groups": [
//!     { "name": "Chest", "muscles": ["Pectoralis Major"] }
//!   ],
//!   "exercises": [
//!     { "name": "Bench Press", "difficulty": "Intermediate",
//!       "equipment": ["Barbell", "Bench"],
//!       "muscles": ["Pectoralis Major"] }
//!   ]
//! }

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use fittrack_core::db;
use fittrack_core::models::{Difficulty, Exercise, ExerciseCreate, Muscle, MuscleGroup};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    groups: Vec<GroupEntry>,
    exercises: Vec<ExerciseEntry>,
}

#[derive(Debug, Deserialize)]
struct GroupEntry {
    name: String,
    muscles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ExerciseEntry {
    name: String,
    difficulty: String,
    #[serde(default)]
    equipment: Vec<String>,
    muscles: Vec<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Get the database path from environment or use default
fn get_database_path() -> PathBuf {
    std::env::var("FITTRACK_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = PathBuf::from("data");
            std::fs::create_dir_all(&path).ok();
            path.push("fittrack.db");
            path
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("fittrack_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let catalog_path = std::env::args()
        .nth(1)
        .ok_or("usage: seed_catalog <catalog.json>")?;
    let catalog: CatalogFile = serde_json::from_str(&std::fs::read_to_string(&catalog_path)?)?;

    let db_path = get_database_path();
    println!("Database path: {}", db_path.display());

    let database = db::Database::new(&db_path)?;

    // Run migrations
    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let mut muscle_ids: HashMap<String, i64> = HashMap::new();

    database.with_conn(|conn| {
        for group in &catalog.groups {
            let g = MuscleGroup::create(conn, &group.name)?;
            for muscle in &group.muscles {
                let m = Muscle::create(conn, g.id, muscle)?;
                muscle_ids.insert(m.name.clone(), m.id);
            }
        }
        Ok(())
    })?;

    let mut inserted = 0usize;
    let mut skipped = 0usize;

    database.with_conn(|conn| {
        for entry in &catalog.exercises {
            let Some(difficulty) = Difficulty::from_str(&entry.difficulty) else {
                eprintln!(
                    "Skipping '{}': unknown difficulty '{}'",
                    entry.name, entry.difficulty
                );
                skipped += 1;
                continue;
            };

            let ids: Vec<i64> = entry
                .muscles
                .iter()
                .filter_map(|name| muscle_ids.get(name).copied())
                .collect();
            if ids.is_empty() {
                eprintln!("Skipping '{}': no known target muscles", entry.name);
                skipped += 1;
                continue;
            }

            Exercise::create(
                conn,
                &ExerciseCreate {
                    name: entry.name.clone(),
                    difficulty,
                    equipment: entry.equipment.clone(),
                    description: entry.description.clone(),
                    muscle_ids: ids,
                },
            )?;
            inserted += 1;
        }
        Ok(())
    })?;

    println!("Catalog seeded:");
    println!("  Groups: {}", catalog.groups.len());
    println!("  Muscles: {}", muscle_ids.len());
    println!("  Exercises inserted: {}", inserted);
    println!("  Exercises skipped: {}", skipped);

    Ok(())
}
