//! `SQLite` database connection and transactions.
//!
//! The database lives at `<container>/listall.db` so that every process
//! resolving the same container shares one store.

use std::path::Path;

use rusqlite::Connection;

use crate::config::Paths;
use crate::error::ListAllError;

use super::migrations;
use super::store::Store;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database inside the given container.
    ///
    /// Creates the container, the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open(paths: &Paths) -> Result<Self, ListAllError> {
        paths.ensure_dirs()?;
        Self::open_at(&paths.database)
    }

    /// Open the database at a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &Path) -> Result<Self, ListAllError> {
        let conn = Connection::open(path).map_err(|e| {
            ListAllError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "opened database");

        Self::init(conn)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, ListAllError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            ListAllError::Database(format!("Failed to open in-memory database: {e}"))
        })?;

        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, ListAllError> {
        // Cascading deletes depend on this; a companion process may hold the
        // file, so wait briefly for its lock instead of failing.
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(|e| ListAllError::Database(format!("Failed to configure connection: {e}")))?;

        let db = Self { conn };
        migrations::run(&db.conn)?;

        Ok(db)
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, ListAllError> {
        migrations::get_version(&self.conn)
    }

    /// Data access on the plain connection (autocommit).
    #[must_use]
    pub const fn store(&self) -> Store<'_> {
        Store::new(&self.conn)
    }

    /// Run `f` inside a transaction.
    ///
    /// The transaction commits only if `f` succeeds; any error rolls back
    /// every write made through the provided store.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`, or a database error if the
    /// transaction cannot be started or committed.
    pub fn transaction<T, F>(&self, f: F) -> Result<T, ListAllError>
    where
        F: FnOnce(&Store<'_>) -> Result<T, ListAllError>,
    {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| ListAllError::db("Failed to begin transaction", &e))?;

        let value = f(&Store::new(&tx))?;

        tx.commit()
            .map_err(|e| ListAllError::db("Failed to commit transaction", &e))?;
        Ok(value)
    }

    /// Run `f` inside a transaction that is always rolled back.
    ///
    /// Used for previews: `f` sees its own writes, nothing persists.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`, or a database error if the
    /// transaction cannot be started or rolled back.
    pub fn dry_run<T, F>(&self, f: F) -> Result<T, ListAllError>
    where
        F: FnOnce(&Store<'_>) -> Result<T, ListAllError>,
    {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| ListAllError::db("Failed to begin transaction", &e))?;

        let value = f(&Store::new(&tx))?;

        tx.rollback()
            .map_err(|e| ListAllError::db("Failed to roll back transaction", &e))?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.schema_version().unwrap() > 0);
    }

    #[test]
    fn test_open_in_container() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().join("shared"));

        let db = Database::open(&paths).unwrap();
        assert!(db.schema_version().unwrap() > 0);
        assert!(paths.database.exists());
    }

    #[test]
    fn test_two_handles_share_data() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let primary = Database::open_at(&db_path).unwrap();
        let companion = Database::open_at(&db_path).unwrap();

        primary.store().create_list("Groceries").unwrap();

        let lists = companion.store().all_lists(false).unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name, "Groceries");
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();

        let result: Result<(), ListAllError> = db.transaction(|store| {
            store.create_list("Doomed")?;
            Err(ListAllError::InvalidInput("abort".to_string()))
        });

        assert!(result.is_err());
        assert!(db.store().all_lists(true).unwrap().is_empty());
    }

    #[test]
    fn test_dry_run_discards_writes() {
        let db = Database::open_in_memory().unwrap();

        let seen = db
            .dry_run(|store| {
                store.create_list("Preview")?;
                Ok(store.all_lists(true)?.len())
            })
            .unwrap();

        assert_eq!(seen, 1);
        assert!(db.store().all_lists(true).unwrap().is_empty());
    }

    #[test]
    fn test_transaction_commits() {
        let db = Database::open_in_memory().unwrap();

        let list = db.transaction(|store| store.create_list("Kept")).unwrap();

        assert!(db.store().get_list(list.id).unwrap().is_some());
    }
}
