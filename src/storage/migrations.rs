//! Database migrations for listall.
//!
//! Each migration is a function that upgrades the schema by one version.
//! Migrations are run automatically when the database is opened.

use rusqlite::Connection;

use crate::error::ListAllError;

/// Current schema version.
const CURRENT_VERSION: i32 = 1;

/// Get the current schema version from the database.
///
/// Returns 0 if no version has been set (new database).
pub fn get_version(conn: &Connection) -> Result<i32, ListAllError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| ListAllError::Database(format!("Failed to get schema version: {e}")))
}

/// Set the schema version in the database.
fn set_version(conn: &Connection, version: i32) -> Result<(), ListAllError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| ListAllError::Database(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
pub fn run(conn: &Connection) -> Result<(), ListAllError> {
    let current = get_version(conn)?;

    if current > CURRENT_VERSION {
        return Err(ListAllError::Database(format!(
            "Database schema version {current} is newer than this build supports ({CURRENT_VERSION})"
        )));
    }

    for version in (current + 1)..=CURRENT_VERSION {
        tracing::info!(version, "running database migration");
        run_migration(conn, version)?;
        set_version(conn, version)?;
    }

    Ok(())
}

/// Run a specific migration.
fn run_migration(conn: &Connection, version: i32) -> Result<(), ListAllError> {
    match version {
        1 => migrate_v1(conn),
        _ => Err(ListAllError::Database(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: Initial schema.
///
/// Creates tables for:
/// - `lists`: User lists
/// - `items`: Entries belonging to exactly one list
/// - `item_images`: Binary payloads attached to items
/// - `user_data`: The single preferences row
fn migrate_v1(conn: &Connection) -> Result<(), ListAllError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS lists (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            order_number INTEGER NOT NULL,
            is_archived INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            modified_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_lists_order
        ON lists(order_number);

        CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            list_id TEXT NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            quantity INTEGER NOT NULL DEFAULT 1 CHECK (quantity >= 1),
            order_number INTEGER NOT NULL,
            is_crossed_out INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            modified_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_items_list
        ON items(list_id, order_number);

        CREATE TABLE IF NOT EXISTS item_images (
            id TEXT PRIMARY KEY,
            item_id TEXT NOT NULL REFERENCES items(id) ON DELETE CASCADE,
            data BLOB NOT NULL,
            order_number INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_item_images_item
        ON item_images(item_id, order_number);

        CREATE TABLE IF NOT EXISTS user_data (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            user_id TEXT NOT NULL,
            show_crossed_out_items INTEGER NOT NULL DEFAULT 1,
            default_import_strategy TEXT NOT NULL DEFAULT 'merge',
            default_export_format TEXT NOT NULL DEFAULT 'json',
            last_sync_date TEXT,
            created_at TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| ListAllError::Database(format!("Migration v1 failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_v1() {
        let conn = Connection::open_in_memory().unwrap();

        run(&conn).unwrap();

        assert_eq!(get_version(&conn).unwrap(), CURRENT_VERSION);

        conn.execute(
            "INSERT INTO lists (id, name, order_number, created_at, modified_at)
             VALUES ('l1', 'Groceries', 0, '2024-01-01T10:00:00Z', '2024-01-01T10:00:00Z')",
            [],
        )
        .unwrap();

        conn.execute(
            "INSERT INTO items (id, list_id, title, order_number, created_at, modified_at)
             VALUES ('i1', 'l1', 'Milk', 0, '2024-01-01T10:00:00Z', '2024-01-01T10:00:00Z')",
            [],
        )
        .unwrap();

        conn.execute(
            "INSERT INTO item_images (id, item_id, data, order_number, created_at)
             VALUES ('img1', 'i1', x'ffd8', 0, '2024-01-01T10:00:00Z')",
            [],
        )
        .unwrap();
    }

    #[test]
    fn test_quantity_must_be_positive() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();

        conn.execute(
            "INSERT INTO lists (id, name, order_number, created_at, modified_at)
             VALUES ('l1', 'Groceries', 0, 'now', 'now')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO items (id, list_id, title, quantity, order_number, created_at, modified_at)
             VALUES ('i1', 'l1', 'Milk', 0, 0, 'now', 'now')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_migration_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        run(&conn).unwrap();
        run(&conn).unwrap();

        assert_eq!(get_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_newer_schema_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();

        assert!(run(&conn).is_err());
    }

    #[test]
    fn test_get_version_new_database() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_version(&conn).unwrap(), 0);
    }
}
