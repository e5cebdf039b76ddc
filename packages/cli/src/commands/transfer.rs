use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;
use onepager_editor::{export_document, export_file_name, import_document};
use onepager_model::OnePagerData;

use crate::session::Session;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output file (defaults to `<project-name>-<date>.json`)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// JSON document to load into the active project
    pub file: PathBuf,
}

pub async fn export(args: ExportArgs, session: &mut Session) -> Result<()> {
    let snapshot = session.active().await?;
    let document = snapshot.document();

    let path = match args.out {
        Some(path) => path,
        None => session.cwd.join(export_file_name(
            &document.project_name,
            Local::now().date_naive(),
        )),
    };

    let bytes = export_document(document)?;
    fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} Exported to {}", "✓".green(), path.display());
    Ok(())
}

/// Replaces the active document; the import is one undoable step
pub async fn import(args: ImportArgs, session: &mut Session) -> Result<()> {
    let bytes = fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let document: OnePagerData = import_document(&bytes)?;

    let snapshot = session.active().await?;
    session.registry.commit_edit(&snapshot.project, document).await?;
    println!(
        "{} Imported {} into {}",
        "✓".green(),
        args.file.display(),
        snapshot.project.name.bright_white()
    );
    Ok(())
}
