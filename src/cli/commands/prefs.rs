use crate::cli::args::{OutputFormat, PrefsCommands};
use crate::error::ListAllError;
use crate::output::format_prefs;
use crate::storage::Database;

/// Execute prefs subcommands
///
/// # Errors
///
/// Returns an error if no change was requested, the store cannot be
/// updated, or output formatting fails.
pub fn prefs(db: &Database, cmd: PrefsCommands, format: OutputFormat) -> Result<String, ListAllError> {
    let store = db.store();
    let mut prefs = store.load_user_data()?;

    match cmd {
        PrefsCommands::Show => format_prefs(&prefs, format),
        PrefsCommands::Set {
            show_crossed_out,
            import_strategy,
            export_format,
        } => {
            if show_crossed_out.is_none() && import_strategy.is_none() && export_format.is_none() {
                return Err(ListAllError::InvalidInput(
                    "Nothing to change: pass --show-crossed-out, --import-strategy or --export-format"
                        .to_string(),
                ));
            }

            if let Some(show) = show_crossed_out {
                prefs.show_crossed_out_items = show;
            }
            if let Some(strategy) = import_strategy {
                prefs.default_import_strategy = strategy;
            }
            if let Some(export_format) = export_format {
                prefs.default_export_format = export_format;
            }
            store.save_user_data(&prefs)?;
            tracing::info!(
                strategy = %prefs.default_import_strategy,
                format = %prefs.default_export_format,
                "preferences updated"
            );
            format_prefs(&prefs, format)
        }
    }
}
