//! Storage layer for listall.
//!
//! This module provides SQLite-based persistence for:
//! - Lists and their items
//! - Images attached to items
//! - The single user preferences record

mod database;
mod migrations;
mod store;

pub use database::Database;
pub use store::Store;
