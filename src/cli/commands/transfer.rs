//! Export and import commands.

use std::io::Read;
use std::path::Path;

use chrono::Utc;

use crate::cli::args::{ExportArgs, ImportArgs, OutputFormat};
use crate::config::{Config, ImportConfig, Paths};
use crate::error::ListAllError;
use crate::features::export::{default_file_name, ExportOptions, Exporter};
use crate::features::import::{ImportPayload, Importer};
use crate::model::ExportFormat;
use crate::output::{format_export_summary, format_import_result};
use crate::storage::Database;

/// Execute export command
///
/// With `--stdout` the rendered export itself is returned, regardless of
/// the output format.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the file cannot be written.
pub fn export(
    db: &Database,
    paths: &Paths,
    config: &Config,
    args: ExportArgs,
    format: OutputFormat,
) -> Result<String, ListAllError> {
    let store = db.store();
    let export_format = match args.format {
        Some(f) => f,
        None => store.load_user_data()?.default_export_format,
    };

    let mut options = if args.full {
        ExportOptions::full()
    } else if args.minimal {
        ExportOptions::minimal()
    } else {
        ExportOptions::from(&config.export)
    };
    if args.include_archived {
        options.include_archived_lists = true;
    }
    if args.include_images {
        options.include_images = true;
    }
    if args.skip_crossed_out {
        options.include_crossed_out_items = false;
    }

    let exporter = Exporter::new(store, options);
    if args.stdout {
        return exporter.export_to_string(export_format);
    }

    let path = args
        .file
        .unwrap_or_else(|| paths.exports.join(default_file_name(export_format, Utc::now())));
    let summary = exporter.export_to_file(export_format, &path)?;
    format_export_summary(&summary, format)
}

/// Execute import command
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, or the import
/// fails (in which case nothing is written).
pub fn import(
    db: &Database,
    config: &ImportConfig,
    args: ImportArgs,
    format: OutputFormat,
) -> Result<String, ListAllError> {
    let payload = if args.path == Path::new("-") {
        read_stdin(args.format, config.max_file_bytes)?
    } else {
        ImportPayload::from_file(&args.path, args.format, config.max_file_bytes)?
    };

    let strategy = match args.strategy {
        Some(s) => s,
        None => db.store().load_user_data()?.default_import_strategy,
    };

    let importer = Importer::new(db);
    let result = if args.dry_run || (config.preview_by_default && !args.yes) {
        importer.preview(&payload, strategy)?
    } else {
        importer.apply(&payload, strategy)?
    };
    format_import_result(&result, format)
}

fn read_stdin(
    format: Option<ExportFormat>,
    max_bytes: u64,
) -> Result<ImportPayload, ListAllError> {
    let mut content = String::new();
    std::io::stdin()
        .take(max_bytes.saturating_add(1))
        .read_to_string(&mut content)
        .map_err(|e| ListAllError::Import(format!("Cannot read stdin: {e}")))?;

    if u64::try_from(content.len()).unwrap_or(u64::MAX) > max_bytes {
        return Err(ListAllError::Import(format!(
            "stdin is larger than the {max_bytes} byte import limit"
        )));
    }
    ImportPayload::parse(&content, format)
}
