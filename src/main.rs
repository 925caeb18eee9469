use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use listall::cli::args::{Cli, Commands};
use listall::cli::commands;
use listall::config::{ColorSetting, Config, Paths};
use listall::logging;
use listall::storage::Database;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Commands::Completions {
        shell,
        instructions,
    } = cli.command
    {
        println!("{}", commands::completions(shell, instructions)?);
        return Ok(());
    }

    let paths = Paths::resolve(cli.container.as_deref())?;
    let config = Config::load(&paths)?;
    match config.general.color {
        ColorSetting::Always => colored::control::set_override(true),
        ColorSetting::Never => colored::control::set_override(false),
        ColorSetting::Auto => {}
    }
    let format = cli.output.unwrap_or(config.general.default_output);

    let db = Database::open(&paths)
        .with_context(|| format!("cannot open store in {}", paths.root.display()))?;
    tracing::debug!(root = %paths.root.display(), "using container");

    let output = match cli.command {
        Commands::Lists { all } => commands::lists(&db, all, format)?,
        Commands::List(args) => commands::list(&db, args.command, format)?,
        Commands::Item(args) => commands::item(&db, args.command, format)?,
        Commands::Image(args) => commands::image(&db, &config.images, args.command, format)?,
        Commands::Export(args) => commands::export(&db, &paths, &config, args, format)?,
        Commands::Import(args) => commands::import(&db, &config.import, args, format)?,
        Commands::Prefs(args) => commands::prefs(&db, args.command, format)?,
        Commands::Completions { .. } => String::new(),
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
