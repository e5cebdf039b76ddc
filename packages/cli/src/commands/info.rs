use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use onepager_model::templates as all_templates;

use crate::session::Session;

pub fn templates() -> Result<()> {
    println!("{}", "Templates".bright_blue().bold());
    for template in all_templates(Local::now().date_naive()) {
        println!(
            "  {:<22} {:<24} {}",
            template.id.bright_white(),
            template.name,
            format!("[{}]", template.category.as_str()).dimmed()
        );
        println!("  {:<22} {}", "", template.description.dimmed());
    }
    Ok(())
}

pub async fn migrate(session: &mut Session) -> Result<()> {
    let report = session.context.ensure_migrated().await;

    println!("{}", "Migration".bright_blue().bold());
    match (&report.recovered_from, &report.recovered_project_id) {
        (Some(key), Some(id)) => println!("  {} Recovered legacy data from {} as {}", "✓".green(), key, id),
        _ => println!("  {} No legacy data recovered", "•".dimmed()),
    }
    println!("  Projects copied to database: {}", report.copied_projects);
    if report.failed_copies > 0 {
        println!(
            "  {} {} copies failed, will retry next run",
            "⚠️".yellow(),
            report.failed_copies
        );
    }
    let backend = if report.database_authoritative {
        "database".green()
    } else {
        "local storage".yellow()
    };
    println!("  Authoritative storage: {}", backend);
    Ok(())
}
