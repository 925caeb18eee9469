//! listall - lists, items and pictures in a local store
//!
//! This crate provides the data model, `SQLite` storage, and JSON/CSV/plain
//! text import and export behind the `listall` command-line tool.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod output;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::ListAllError;
pub use model::{ExportFormat, ImportStrategy, Item, ItemImage, List, UserData};
pub use storage::{Database, Store};
