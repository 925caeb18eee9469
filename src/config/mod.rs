//! Configuration management for listall.
//!
//! This module resolves the shared container directory and loads
//! `config.yaml` from it.

mod paths;
mod settings;

pub use paths::{Paths, CONTAINER_ENV};
pub use settings::{ColorSetting, Config, ExportConfig, GeneralConfig, ImageConfig, ImportConfig};
