//! Database migrations
//!
//! Schema creation for the recipe catalog.

use rusqlite::Connection;
use tracing::info;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        info!(version = 1, "applied catalog migration");
    }

    Ok(())
}

/// Migration v1: Initial catalog schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- RECIPES
        -- Catalog entries; rowid order is the store order
        -- ============================================
        CREATE TABLE recipes (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            calories REAL NOT NULL DEFAULT 0 CHECK(calories >= 0),
            base_servings REAL NOT NULL DEFAULT 1.0 CHECK(base_servings > 0),  -- servings the ingredient amounts are written for
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_recipes_title ON recipes(title);

        -- ============================================
        -- MEDICAL TAGS
        -- Controlled vocabulary, e.g. "High Sugar", "Low Sodium"
        -- ============================================
        CREATE TABLE recipe_medical_tags (
            recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            tag TEXT NOT NULL,
            UNIQUE(recipe_id, tag)
        );

        CREATE INDEX idx_recipe_medical_tags_recipe ON recipe_medical_tags(recipe_id);

        -- ============================================
        -- RECIPE INGREDIENTS
        -- Ordered by position; nutrients kept as a JSON array
        -- ============================================
        CREATE TABLE recipe_ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            name TEXT NOT NULL,
            amount REAL NOT NULL CHECK(amount >= 0),
            unit TEXT NOT NULL,
            nutrients_json TEXT NOT NULL DEFAULT '[]',

            UNIQUE(recipe_id, position)
        );

        CREATE INDEX idx_recipe_ingredients_recipe ON recipe_ingredients(recipe_id);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(needs_migration(&conn).unwrap());

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_schema_rejects_non_positive_base_servings() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO recipes (id, title, base_servings) VALUES ('bad', 'Bad', 0)",
            [],
        );
        assert!(result.is_err());

        conn.execute(
            "INSERT INTO recipes (id, title, base_servings) VALUES ('ok', 'Ok', 0.5)",
            [],
        )
        .unwrap();
    }
}
