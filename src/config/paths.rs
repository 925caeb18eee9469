//! Path resolution for the shared container.
//!
//! Every process working on the same lists resolves the same container root:
//! - `config.yaml` - Preferences file
//! - `listall.db` - SQLite database holding lists, items and images
//! - `exports/` - Default destination for exported files

use std::path::{Path, PathBuf};

use crate::error::ListAllError;

/// Environment variable that overrides the container root.
pub const CONTAINER_ENV: &str = "LISTALL_CONTAINER";

/// Paths inside the shared container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Root directory: `~/.listall/` unless overridden.
    pub root: PathBuf,
    /// Config file: `<root>/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `<root>/listall.db`
    pub database: PathBuf,
    /// Export directory: `<root>/exports/`
    pub exports: PathBuf,
}

impl Paths {
    /// Resolve the container from `LISTALL_CONTAINER`, falling back to `~/.listall`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the override nor the home directory is set.
    pub fn new() -> Result<Self, ListAllError> {
        if let Some(root) = std::env::var_os(CONTAINER_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }

        let home = std::env::var("HOME").map_err(|_| {
            ListAllError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".listall")))
    }

    /// Resolve with an explicit root taking precedence over the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if no root is given and the environment lookup fails.
    pub fn resolve(root: Option<&Path>) -> Result<Self, ListAllError> {
        match root {
            Some(root) => Ok(Self::with_root(root.to_path_buf())),
            None => Self::new(),
        }
    }

    /// Create paths with a custom root directory.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("listall.db"),
            exports: root.join("exports"),
            root,
        }
    }

    /// Ensure all directories exist, creating them if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), ListAllError> {
        for dir in [&self.root, &self.exports] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    ListAllError::Config(format!(
                        "Failed to create directory {}: {e}",
                        dir.display()
                    ))
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_with_root() {
        let root = PathBuf::from("/tmp/test-listall");
        let paths = Paths::with_root(root.clone());

        assert_eq!(paths.root, root);
        assert_eq!(paths.config_file, root.join("config.yaml"));
        assert_eq!(paths.database, root.join("listall.db"));
        assert_eq!(paths.exports, root.join("exports"));
    }

    #[test]
    fn test_resolve_prefers_explicit_root() {
        let root = PathBuf::from("/tmp/explicit");
        let paths = Paths::resolve(Some(&root)).unwrap();
        assert_eq!(paths.root, root);
    }

    #[test]
    fn test_ensure_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().join("container"));

        paths.ensure_dirs().unwrap();

        assert!(paths.root.exists());
        assert!(paths.exports.exists());
    }
}
