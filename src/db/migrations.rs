//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    // Create migrations table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    // Get current version
    let current_version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    // Run migrations
    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- USER PROFILES
        -- One row per user; goal-relevant fields are
        -- nullable so incomplete profiles are storable
        -- ============================================
        CREATE TABLE profiles (
            user_id INTEGER PRIMARY KEY,
            weight_kg REAL,
            height_cm REAL,
            age_years INTEGER,
            sex TEXT CHECK(sex IN ('male', 'female')),
            activity_level TEXT,
            fitness_goal TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- CONTRIBUTED FOODS
        -- User submissions awaiting moderation
        -- ============================================
        CREATE TABLE contributed_foods (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            brand TEXT,                          -- nullable, for branded products
            barcode TEXT,

            -- Macro values (per serving)
            calories REAL NOT NULL DEFAULT 0,
            protein REAL NOT NULL DEFAULT 0,     -- grams
            carbs REAL NOT NULL DEFAULT 0,       -- grams
            fats REAL NOT NULL DEFAULT 0,        -- grams

            serving_size REAL NOT NULL,          -- e.g., 100.0
            serving_unit TEXT NOT NULL,          -- e.g., "g", "ml", "each"

            contributor_id INTEGER NOT NULL,
            approval_status TEXT NOT NULL
                CHECK(approval_status IN ('pending', 'approved', 'rejected'))
                DEFAULT 'pending',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_contributed_foods_status ON contributed_foods(approval_status);
        CREATE INDEX idx_contributed_foods_contributor ON contributed_foods(contributor_id);

        -- ============================================
        -- FLAGS
        -- User reports against existing content
        -- ============================================
        CREATE TABLE flags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content_type TEXT NOT NULL
                CHECK(content_type IN ('contributed_foods', 'workouts', 'meals')),
            content_id INTEGER NOT NULL,
            reason TEXT NOT NULL,
            reporter_id INTEGER NOT NULL,
            status TEXT NOT NULL
                CHECK(status IN ('open', 'resolved_accepted', 'resolved_upheld'))
                DEFAULT 'open',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_flags_status ON flags(status);
        CREATE INDEX idx_flags_target ON flags(content_type, content_id);

        -- ============================================
        -- MEALS
        -- Logged food, either directly or from an
        -- approved contribution
        -- ============================================
        CREATE TABLE meals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            date TEXT NOT NULL,                  -- ISO date: "2025-01-09"
            name TEXT NOT NULL,

            calories REAL NOT NULL DEFAULT 0,
            protein REAL NOT NULL DEFAULT 0,     -- grams
            carbs REAL NOT NULL DEFAULT 0,       -- grams
            fats REAL NOT NULL DEFAULT 0,        -- grams

            serving TEXT,                        -- free-form serving descriptor
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_meals_user_date ON meals(user_id, date);

        -- ============================================
        -- NUTRITION GOALS
        -- Caller-cached GoalEngine output, one row
        -- per user
        -- ============================================
        CREATE TABLE nutrition_goals (
            user_id INTEGER PRIMARY KEY,
            calories REAL NOT NULL DEFAULT 0,
            protein_g REAL NOT NULL DEFAULT 0,
            carbs_g REAL NOT NULL DEFAULT 0,
            fat_g REAL NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- EXERCISE CATALOG
        -- Three-level navigation hierarchy plus an
        -- independent targeted-muscle junction
        -- ============================================
        CREATE TABLE muscle_groups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE muscles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            group_id INTEGER NOT NULL REFERENCES muscle_groups(id) ON DELETE CASCADE,
            name TEXT NOT NULL UNIQUE
        );

        CREATE INDEX idx_muscles_group ON muscles(group_id);

        CREATE TABLE exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL DEFAULT '',       -- blank allowed; curated later
            difficulty TEXT NOT NULL
                CHECK(difficulty IN ('Beginner', 'Intermediate', 'Advanced')),
            equipment TEXT NOT NULL DEFAULT '[]', -- JSON array of equipment tokens
            description TEXT
        );

        CREATE TABLE exercise_muscles (
            exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
            muscle_id INTEGER NOT NULL REFERENCES muscles(id) ON DELETE CASCADE,
            PRIMARY KEY (exercise_id, muscle_id)
        );
        "#,
    )?;

    Ok(())
}
