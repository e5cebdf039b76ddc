use anyhow::{anyhow, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;
use onepager_editor::Snapshot;
use onepager_model::{template_by_id, OnePagerData};

use crate::session::Session;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Project to show (defaults to the active project)
    #[arg(long)]
    pub id: Option<String>,

    /// Print the whole document as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Project name
    pub name: String,

    /// Start from a template (see `onepager templates`)
    #[arg(short, long)]
    pub template: Option<String>,
}

#[derive(Debug, Args)]
pub struct SwitchArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Args)]
pub struct DuplicateArgs {
    pub id: String,
    /// Name of the copy
    pub name: String,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub id: String,
}

pub async fn list(session: &mut Session) -> Result<()> {
    let active = session.active().await?;
    let projects = session.registry.list_projects().await?;

    println!("{}", "Projects".bright_blue().bold());
    for project in projects {
        let marker = if project.id == active.project.id {
            "*".green().bold()
        } else {
            " ".normal()
        };
        let updated = project
            .updated_at
            .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            " {} {}  {}  {}",
            marker,
            project.id.dimmed(),
            project.name.bright_white(),
            updated.dimmed()
        );
    }
    Ok(())
}

pub async fn show(args: ShowArgs, session: &mut Session) -> Result<()> {
    let snapshot = match args.id {
        Some(id) => session.registry.current(&id).await?,
        None => session.active().await?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(snapshot.document())?);
        return Ok(());
    }

    print_summary(&snapshot);
    Ok(())
}

pub async fn new(args: NewArgs, session: &mut Session) -> Result<()> {
    let today = Local::now().date_naive();
    let data = match &args.template {
        Some(id) => {
            let template = template_by_id(id, today)
                .ok_or_else(|| anyhow!("Unknown template: {}", id))?;
            OnePagerData {
                project_name: args.name.clone(),
                ..template.data
            }
        }
        None => OnePagerData::new_default(&args.name, today),
    };

    let snapshot = session.registry.create_project(&args.name, data).await?;
    println!(
        "{} Created {} ({})",
        "✓".green(),
        snapshot.project.name.bright_white(),
        snapshot.project.id.dimmed()
    );
    Ok(())
}

pub async fn switch(args: SwitchArgs, session: &mut Session) -> Result<()> {
    let snapshot = session.registry.switch_project(&args.id).await?;
    println!(
        "{} Switched to {}",
        "✓".green(),
        snapshot.project.name.bright_white()
    );
    Ok(())
}

pub async fn rename(args: RenameArgs, session: &mut Session) -> Result<()> {
    let project = session.registry.rename_project(&args.id, &args.name).await?;
    println!("{} Renamed to {}", "✓".green(), project.name.bright_white());
    Ok(())
}

pub async fn duplicate(args: DuplicateArgs, session: &mut Session) -> Result<()> {
    let snapshot = session
        .registry
        .duplicate_project(&args.id, &args.name)
        .await?;
    println!(
        "{} Created {} ({})",
        "✓".green(),
        snapshot.project.name.bright_white(),
        snapshot.project.id.dimmed()
    );
    Ok(())
}

pub async fn delete(args: DeleteArgs, session: &mut Session) -> Result<()> {
    session.registry.delete_project(&args.id).await?;
    println!("{} Deleted {}", "✓".green(), args.id);
    Ok(())
}

pub fn print_summary(snapshot: &Snapshot<OnePagerData>) {
    let document = snapshot.document();
    println!(
        "{} {}",
        snapshot.project.name.bright_white().bold(),
        format!("({})", snapshot.project.id).dimmed()
    );
    println!("  {:<12} {}", "projectName", document.project_name);
    println!("  {:<12} {}", "goal", document.goal);
    println!("  {:<12} {}", "description", document.description);
    println!("  {:<12} {}", "comments", document.comments);
    println!(
        "  {:<12} {} undo / {} redo",
        "history",
        snapshot.history.undo_levels(),
        snapshot.history.redo_levels()
    );
}
