use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

use crate::config::CONTAINER_ENV;
use crate::model::{ExportFormat, ImportStrategy};

#[derive(Parser)]
#[command(name = "listall")]
#[command(about = "Lists, items and pictures in a local store, with JSON, CSV and text import/export")]
#[command(long_about = "listall - lists and checklists on the command line

Keeps lists, their items and item pictures in a SQLite store inside a
container directory, and moves them in and out as JSON, CSV or plain text.

QUICK START:
  listall list create Groceries          Create a list
  listall item add Groceries Milk -q 2   Add an item
  listall list show Groceries            Show the list
  listall export --format text --stdout  Print everything as plain text
  listall import backup.json --strategy merge

IMPORT STRATEGIES:
  replace   Delete every list, then insert the imported ones
  merge     Update matching lists and items, create the rest
  append    Always create new lists, even when names collide

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  listall <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output, or 'json' for
    /// machine-readable output. Defaults to `general.default_output` from
    /// config.yaml.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Container directory holding the database, config and exports
    ///
    /// Defaults to ~/.listall.
    #[arg(long, global = true, env = CONTAINER_ENV, value_name = "DIR")]
    pub container: Option<PathBuf>,

    /// Log more to stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show all lists
    ///
    /// Lists are shown in their display order with open and done counts.
    /// Archived lists are hidden unless --all is given.
    ///
    /// # Examples
    ///
    ///   listall lists             Active lists
    ///   listall ls --all          Include archived lists
    ///   listall lists -o json     Output as JSON
    #[command(alias = "ls")]
    Lists {
        /// Include archived lists
        #[arg(short, long)]
        all: bool,
    },

    /// Create, show, rename, reorder, archive or delete a list
    ///
    /// Lists are addressed by name (case-insensitive), full id, or an id
    /// prefix of at least four characters.
    List(ListArgs),

    /// Add, edit, toggle, move or delete items
    ///
    /// Items are addressed by full id or an id prefix of at least four
    /// characters, as shown by 'listall list show'.
    #[command(alias = "i")]
    Item(ItemArgs),

    /// Attach, list, remove and preview item pictures
    Image(ImageArgs),

    /// Export lists as JSON, CSV or plain text
    ///
    /// By default the export is written to the container's exports/
    /// directory with a timestamped file name. What is included follows the
    /// `export` section of config.yaml unless overridden by flags.
    ///
    /// # Examples
    ///
    ///   listall export                         JSON into exports/
    ///   listall export --format csv --file lists.csv
    ///   listall export --format text --stdout
    ///   listall export --full --file backup.json   Archived lists and images too
    Export(ExportArgs),

    /// Import lists from JSON, CSV or plain text
    ///
    /// The format is taken from --format, then the file extension, then the
    /// content itself. The strategy defaults to the stored preference
    /// (merge unless changed with 'listall prefs set').
    ///
    /// # Examples
    ///
    ///   listall import backup.json --strategy replace
    ///   listall import groceries.txt                 Merge into same-named lists
    ///   listall import list.csv --strategy append --dry-run
    ///   cat notes.txt | listall import -
    Import(ImportArgs),

    /// Show or change preferences stored with the data
    Prefs(PrefsArgs),

    /// Generate shell completions
    ///
    /// # Examples
    ///
    ///   listall completions bash > ~/.local/share/bash-completion/completions/listall
    ///   listall completions zsh --instructions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,

        /// Print installation instructions instead of the script
        #[arg(long)]
        instructions: bool,
    },
}

#[derive(Args)]
pub struct ListArgs {
    #[command(subcommand)]
    pub command: ListCommands,
}

#[derive(Subcommand)]
pub enum ListCommands {
    /// Create a new list at the end of the display order
    ///
    /// # Examples
    ///
    ///   listall list create Groceries
    ///   listall list create "Weekend trip"
    Create {
        /// Name of the new list
        name: String,
    },

    /// Show a list and its items
    ///
    /// Crossed-out items are hidden when the 'show crossed-out items'
    /// preference is off, unless --all is given.
    ///
    /// # Examples
    ///
    ///   listall list show Groceries
    ///   listall list show 3f2a --all -o json
    Show {
        /// List name, id, or id prefix
        list: String,

        /// Show crossed-out items regardless of preferences
        #[arg(short, long)]
        all: bool,

        /// Include image payloads in JSON output
        #[arg(long)]
        with_images: bool,
    },

    /// Rename a list
    Rename {
        /// List name, id, or id prefix
        list: String,
        /// New name
        name: String,
    },

    /// Delete a list with all its items and pictures
    #[command(alias = "rm")]
    Delete {
        /// List name, id, or id prefix
        list: String,
    },

    /// Move a list to a position in the display order
    ///
    /// # Examples
    ///
    ///   listall list move Groceries 1    Make it the first list
    Move {
        /// List name, id, or id prefix
        list: String,
        /// New position, starting at 1
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        position: u32,
    },

    /// Archive a list (hidden from 'listall lists')
    Archive {
        /// List name, id, or id prefix
        list: String,
    },

    /// Restore an archived list
    Restore {
        /// List name, id, or id prefix
        list: String,
    },
}

#[derive(Args)]
pub struct ItemArgs {
    #[command(subcommand)]
    pub command: ItemCommands,
}

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Add an item at the end of a list
    ///
    /// # Examples
    ///
    ///   listall item add Groceries Milk
    ///   listall item add Groceries Eggs -q 12 -d "Free range"
    Add(AddItemArgs),

    /// Show an item with all its fields
    Show {
        /// Item id or id prefix
        item: String,
    },

    /// Change an item's title, description, quantity or state
    ///
    /// # Examples
    ///
    ///   listall item edit 3f2a --quantity 3
    ///   listall item edit 3f2a --title "Oat milk" --description ""
    Edit(EditItemArgs),

    /// Cross an item out, or bring it back
    #[command(alias = "x")]
    Toggle {
        /// Item id or id prefix
        item: String,
    },

    /// Delete an item with its pictures
    #[command(alias = "rm")]
    Delete {
        /// Item id or id prefix
        item: String,
    },

    /// Move an item to the end of another list
    ///
    /// # Examples
    ///
    ///   listall item move 3f2a --to "Hardware store"
    Move {
        /// Item id or id prefix
        item: String,
        /// Target list name, id, or id prefix
        #[arg(long)]
        to: String,
    },

    /// Move an item to a position within its list
    ///
    /// # Examples
    ///
    ///   listall item reorder 3f2a 1    Make it the first item
    Reorder {
        /// Item id or id prefix
        item: String,
        /// New position, starting at 1
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        position: u32,
    },

    /// Delete every crossed-out item of a list
    ClearCompleted {
        /// List name, id, or id prefix
        list: String,
    },
}

#[derive(Args)]
pub struct AddItemArgs {
    /// List name, id, or id prefix
    pub list: String,

    /// Item title
    pub title: String,

    /// Longer description
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Quantity (at least 1)
    #[arg(short, long, default_value_t = 1)]
    pub quantity: u32,
}

#[derive(Args)]
pub struct EditItemArgs {
    /// Item id or id prefix
    pub item: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New description (empty string clears it)
    #[arg(short, long)]
    pub description: Option<String>,

    /// New quantity
    #[arg(short, long)]
    pub quantity: Option<u32>,

    /// Set the crossed-out state explicitly
    #[arg(long)]
    pub crossed_out: Option<bool>,
}

#[derive(Args)]
pub struct ImageArgs {
    #[command(subcommand)]
    pub command: ImageCommands,
}

#[derive(Subcommand)]
pub enum ImageCommands {
    /// Attach a picture to an item
    ///
    /// The picture is downscaled and stored as JPEG according to the
    /// `images` section of config.yaml.
    ///
    /// # Examples
    ///
    ///   listall image attach 3f2a receipt.png
    Attach {
        /// Item id or id prefix
        item: String,
        /// Image file (PNG or JPEG)
        path: PathBuf,
        /// Store the file as-is without recompressing
        #[arg(long)]
        raw: bool,
    },

    /// List the pictures of an item
    #[command(alias = "ls")]
    List {
        /// Item id or id prefix
        item: String,
    },

    /// Remove a picture
    #[command(alias = "rm")]
    Remove {
        /// Image id or id prefix
        image: String,
    },

    /// Write a JPEG thumbnail of a picture to a file
    ///
    /// # Examples
    ///
    ///   listall image thumbnail 9c1e --out thumb.jpg --size 128
    Thumbnail {
        /// Image id or id prefix
        image: String,
        /// Destination file
        #[arg(long)]
        out: PathBuf,
        /// Bounding box in pixels (defaults to images.thumbnail_size)
        #[arg(long)]
        size: Option<u32>,
    },
}

#[derive(Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct ExportArgs {
    /// Output format (defaults to the stored preference)
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Destination file (defaults to a timestamped file in exports/)
    #[arg(long, conflicts_with = "stdout")]
    pub file: Option<PathBuf>,

    /// Print the export instead of writing a file
    #[arg(long)]
    pub stdout: bool,

    /// Only titles and states: no descriptions, quantities or dates
    #[arg(long, conflicts_with = "full")]
    pub minimal: bool,

    /// Everything, including archived lists and images
    #[arg(long)]
    pub full: bool,

    /// Include archived lists
    #[arg(long)]
    pub include_archived: bool,

    /// Include images (JSON only)
    #[arg(long)]
    pub include_images: bool,

    /// Leave crossed-out items out
    #[arg(long)]
    pub skip_crossed_out: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// File to import, or '-' for stdin
    pub path: PathBuf,

    /// Input format (detected when omitted)
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,

    /// How imported lists combine with existing ones
    #[arg(short, long, value_enum)]
    pub strategy: Option<ImportStrategy>,

    /// Report what would change without writing
    #[arg(long, conflicts_with = "yes")]
    pub dry_run: bool,

    /// Apply even when `import.preview_by_default` is set
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct PrefsArgs {
    #[command(subcommand)]
    pub command: PrefsCommands,
}

#[derive(Subcommand)]
pub enum PrefsCommands {
    /// Show preferences and the last sync date
    Show,

    /// Change preferences
    ///
    /// # Examples
    ///
    ///   listall prefs set --import-strategy append
    ///   listall prefs set --show-crossed-out false --export-format csv
    Set {
        /// Show crossed-out items in 'listall list show'
        #[arg(long)]
        show_crossed_out: Option<bool>,

        /// Strategy used by 'listall import' when none is given
        #[arg(long, value_enum)]
        import_strategy: Option<ImportStrategy>,

        /// Format used by 'listall export' when none is given
        #[arg(long, value_enum)]
        export_format: Option<ExportFormat>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import_with_strategy() {
        let cli = Cli::try_parse_from([
            "listall", "import", "lists.txt", "--strategy", "append", "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Import(args) => {
                assert_eq!(args.strategy, Some(ImportStrategy::Append));
                assert!(args.dry_run);
                assert!(args.format.is_none());
            }
            _ => panic!("expected import"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "listall",
            "lists",
            "-o",
            "json",
            "--container",
            "/tmp/box",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.container, Some(PathBuf::from("/tmp/box")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_text_format_aliases() {
        let cli = Cli::try_parse_from(["listall", "export", "--format", "txt", "--stdout"]).unwrap();
        match cli.command {
            Commands::Export(args) => assert_eq!(args.format, Some(ExportFormat::Text)),
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn test_position_must_be_positive() {
        assert!(Cli::try_parse_from(["listall", "list", "move", "Groceries", "0"]).is_err());
    }

    #[test]
    fn test_export_file_conflicts_with_stdout() {
        assert!(
            Cli::try_parse_from(["listall", "export", "--file", "x.json", "--stdout"]).is_err()
        );
    }
}
