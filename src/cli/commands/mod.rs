//! Command implementations for listall.
//!
//! Every command returns the text to print; `main` decides where it goes.

mod image;
mod prefs;
mod transfer;

pub use image::image;
pub use prefs::prefs;
pub use transfer::{export, import};

use clap_complete::Shell;

use crate::cli::args::{AddItemArgs, EditItemArgs, ItemCommands, ListCommands, OutputFormat};
use crate::error::ListAllError;
use crate::features::completions::{completion_install_instructions, generate_completions};
use crate::model::{ItemUpdate, NewItem};
use crate::output::{format_item, format_list, format_lists, format_message};
use crate::storage::{Database, Store};

/// Execute lists command
///
/// # Errors
///
/// Returns an error if the store cannot be read or output formatting fails.
pub fn lists(db: &Database, all: bool, format: OutputFormat) -> Result<String, ListAllError> {
    let lists = db.store().lists_with_items(all, false)?;
    format_lists(&lists, format)
}

/// Execute list subcommands
///
/// # Errors
///
/// Returns an error if the list cannot be resolved, the store rejects the
/// change, or output formatting fails. A failed command writes nothing.
pub fn list(db: &Database, cmd: ListCommands, format: OutputFormat) -> Result<String, ListAllError> {
    db.transaction(|store| match cmd {
        ListCommands::Create { name } => {
            let list = store.create_list(&name)?;
            format_list(&list, format)
        }
        ListCommands::Show {
            list,
            all,
            with_images,
        } => {
            let found = store.resolve_list(&list)?;
            let mut list = store.list_with_items(found.id, with_images)?;
            if !all && !store.load_user_data()?.show_crossed_out_items {
                list.items.retain(|item| !item.is_crossed_out);
            }
            format_list(&list, format)
        }
        ListCommands::Rename { list, name } => {
            let found = store.resolve_list(&list)?;
            let renamed = store.rename_list(found.id, &name)?;
            format_message(
                &format!("Renamed list: {} -> {}", found.name, renamed.name),
                format,
            )
        }
        ListCommands::Delete { list } => {
            let found = store.resolve_list(&list)?;
            store.delete_list(found.id)?;
            format_message(&format!("Deleted list: {}", found.name), format)
        }
        ListCommands::Move { list, position } => {
            let found = store.resolve_list(&list)?;
            let lists = store.move_list(found.id, to_index(position))?;
            let placed = lists
                .iter()
                .position(|l| l.id == found.id)
                .map_or(0, |index| index + 1);
            format_message(
                &format!("Moved list {} to position {placed}", found.name),
                format,
            )
        }
        ListCommands::Archive { list } => {
            let found = store.resolve_list(&list)?;
            store.set_archived(found.id, true)?;
            format_message(&format!("Archived list: {}", found.name), format)
        }
        ListCommands::Restore { list } => {
            let found = store.resolve_list(&list)?;
            store.set_archived(found.id, false)?;
            format_message(&format!("Restored list: {}", found.name), format)
        }
    })
}

/// Execute item subcommands
///
/// # Errors
///
/// Returns an error if the item or list cannot be resolved, the store
/// rejects the change, or output formatting fails. A failed command writes
/// nothing.
pub fn item(db: &Database, cmd: ItemCommands, format: OutputFormat) -> Result<String, ListAllError> {
    db.transaction(|store| match cmd {
        ItemCommands::Add(args) => add_item(store, args, format),
        ItemCommands::Show { item } => {
            let mut found = store.resolve_item(&item)?;
            found.images = store.images_for_item(found.id)?;
            format_item(&found, format)
        }
        ItemCommands::Edit(args) => edit_item(store, args, format),
        ItemCommands::Toggle { item } => {
            let found = store.resolve_item(&item)?;
            let toggled = store.toggle_item(found.id)?;
            format_item(&toggled, format)
        }
        ItemCommands::Delete { item } => {
            let found = store.resolve_item(&item)?;
            store.delete_item(found.id)?;
            format_message(&format!("Deleted item: {}", found.title), format)
        }
        ItemCommands::Move { item, to } => {
            let found = store.resolve_item(&item)?;
            let target = store.resolve_list(&to)?;
            let moved = store.move_item_to_list(found.id, target.id)?;
            format_item(&moved, format)
        }
        ItemCommands::Reorder { item, position } => {
            let found = store.resolve_item(&item)?;
            let items = store.move_item(found.id, to_index(position))?;
            let placed = items
                .iter()
                .position(|i| i.id == found.id)
                .map_or(0, |index| index + 1);
            format_message(
                &format!("Moved item {} to position {placed}", found.title),
                format,
            )
        }
        ItemCommands::ClearCompleted { list } => {
            let found = store.resolve_list(&list)?;
            let removed = store.delete_crossed_out_items(found.id)?;
            format_message(
                &format!("Removed {removed} crossed-out items from {}", found.name),
                format,
            )
        }
    })
}

fn add_item(store: &Store<'_>, args: AddItemArgs, format: OutputFormat) -> Result<String, ListAllError> {
    let list = store.resolve_list(&args.list)?;
    let item = store.add_item(
        list.id,
        &NewItem {
            title: args.title,
            description: args.description,
            quantity: args.quantity,
        },
    )?;
    format_item(&item, format)
}

fn edit_item(store: &Store<'_>, args: EditItemArgs, format: OutputFormat) -> Result<String, ListAllError> {
    let update = ItemUpdate {
        title: args.title,
        description: args.description,
        quantity: args.quantity,
        is_crossed_out: args.crossed_out,
    };
    if update.is_empty() {
        return Err(ListAllError::InvalidInput(
            "Nothing to change: pass --title, --description, --quantity or --crossed-out"
                .to_string(),
        ));
    }

    let found = store.resolve_item(&args.item)?;
    let updated = store.update_item(found.id, &update)?;
    format_item(&updated, format)
}

/// Execute completions command
///
/// # Errors
///
/// Returns an error if the completion script cannot be generated.
pub fn completions(shell: Shell, instructions: bool) -> Result<String, ListAllError> {
    if instructions {
        Ok(completion_install_instructions(shell))
    } else {
        generate_completions(shell)
    }
}

/// 1-based CLI position to a 0-based index.
fn to_index(position: u32) -> usize {
    usize::try_from(position.saturating_sub(1)).unwrap_or(usize::MAX)
}
