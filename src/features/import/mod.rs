//! Import of JSON, CSV and plain-text lists with a replace, merge or append strategy.

mod importer;
mod parse;

pub use importer::{apply_to_store, ImportPayload, ImportResult, Importer};
pub use parse::{detect_format, parse, parse_csv, parse_json, parse_text, DEFAULT_LIST_NAME};
