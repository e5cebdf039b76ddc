mod commands;
mod config;
mod session;

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    DeleteArgs, DuplicateArgs, ExportArgs, ImportArgs, NewArgs, RenameArgs, SetArgs, ShowArgs,
    SwitchArgs,
};
use config::Config;
use session::Session;
use tracing_subscriber::EnvFilter;

/// OnePager CLI - project status pages with undo history
#[derive(Parser, Debug)]
#[command(name = "onepager")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log storage and migration activity
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List projects; the active one is marked with *
    List,

    /// Show a project
    Show(ShowArgs),

    /// Create a project and make it active
    New(NewArgs),

    /// Make another project active
    Switch(SwitchArgs),

    /// Set a text field of the active document
    Set(SetArgs),

    /// Undo the last change to the active document
    Undo,

    /// Redo the last undone change
    Redo,

    /// Rename a project
    Rename(RenameArgs),

    /// Copy a project under a new name
    Duplicate(DuplicateArgs),

    /// Delete a project and its history
    Delete(DeleteArgs),

    /// Write the active document to a JSON file
    Export(ExportArgs),

    /// Replace the active document with a JSON file
    Import(ImportArgs),

    /// List project templates
    Templates,

    /// Run storage migration and print what it did
    Migrate,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Command, cwd: &Path) -> anyhow::Result<()> {
    if let Command::Templates = command {
        return commands::templates();
    }

    let config = Config::load(cwd).context("Failed to load onepager.config.json")?;
    let mut session = Session::open(cwd, &config).await?;

    let result = match command {
        Command::List => commands::list(&mut session).await,
        Command::Show(args) => commands::show(args, &mut session).await,
        Command::New(args) => commands::new(args, &mut session).await,
        Command::Switch(args) => commands::switch(args, &mut session).await,
        Command::Set(args) => commands::set(args, &mut session).await,
        Command::Undo => commands::undo(&mut session).await,
        Command::Redo => commands::redo(&mut session).await,
        Command::Rename(args) => commands::rename(args, &mut session).await,
        Command::Duplicate(args) => commands::duplicate(args, &mut session).await,
        Command::Delete(args) => commands::delete(args, &mut session).await,
        Command::Export(args) => commands::export(args, &mut session).await,
        Command::Import(args) => commands::import(args, &mut session).await,
        Command::Migrate => commands::migrate(&mut session).await,
        Command::Templates => commands::templates(),
    };

    session.close().await;
    result
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match std::env::current_dir() {
        Ok(cwd) => run(cli.command, &cwd).await,
        Err(err) => Err(anyhow::Error::new(err).context("Cannot get current directory")),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
