use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use super::projects::print_summary;
use crate::session::Session;

const TEXT_FIELDS: &str = "projectName, niicDate, goal, description, comments";

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Text field of the active document
    pub field: String,
    pub value: String,
}

pub async fn set(args: SetArgs, session: &mut Session) -> Result<()> {
    let snapshot = session.active().await?;

    let mut next = snapshot.document().clone();
    if !next.set_text_field(&args.field, args.value) {
        bail!("Unknown field: {} (expected one of {})", args.field, TEXT_FIELDS);
    }

    let updated = session.registry.commit_edit(&snapshot.project, next).await?;
    if updated.history == snapshot.history {
        println!("{} No change", "•".dimmed());
    } else {
        println!("{} Updated {}", "✓".green(), args.field.bright_white());
    }
    Ok(())
}

pub async fn undo(session: &mut Session) -> Result<()> {
    let snapshot = session.active().await?;
    if !snapshot.can_undo() {
        println!("{} Nothing to undo", "•".dimmed());
        return Ok(());
    }

    let updated = session.registry.undo(&snapshot.project).await?;
    println!("{} Reverted to previous state", "✓".green());
    print_summary(&updated);
    Ok(())
}

pub async fn redo(session: &mut Session) -> Result<()> {
    let snapshot = session.active().await?;
    if !snapshot.can_redo() {
        println!("{} Nothing to redo", "•".dimmed());
        return Ok(());
    }

    let updated = session.registry.redo(&snapshot.project).await?;
    println!("{} Restored next state", "✓".green());
    print_summary(&updated);
    Ok(())
}
