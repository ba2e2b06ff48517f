//! Operator CLI handlers for `timeline project` subcommands.
//!
//! Implements:
//! - `timeline project create --email <e> --title <t>` -- intake a project
//! - `timeline project list [--email <e>]`             -- list projects
//! - `timeline project show <project-id>`              -- one project and its timeline

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use timeline_core::project::{self, NewProject};
use timeline_core::reconcile::parse_event_date;
use timeline_core::render::render_plain_text;
use timeline_core::schedule::ScheduleItem;
use timeline_db::models::{Project, ProjectSource};
use timeline_db::queries::timelines as timeline_queries;

use crate::ProjectCommands;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `ProjectCommands` variant to the appropriate handler.
pub async fn run_project_command(command: ProjectCommands, pool: &PgPool) -> Result<()> {
    match command {
        ProjectCommands::Create {
            email,
            title,
            event_date,
            name,
            source,
        } => {
            let new = build_new_project(email, title, event_date.as_deref(), name, &source)?;
            cmd_create(pool, &new).await
        }
        ProjectCommands::List { email } => cmd_list(pool, email.as_deref()).await,
        ProjectCommands::Show { project_id } => cmd_show(pool, &project_id).await,
    }
}

/// Turn raw CLI arguments into a [`NewProject`].
fn build_new_project(
    email: String,
    title: String,
    event_date: Option<&str>,
    name: Option<String>,
    source: &str,
) -> Result<NewProject> {
    let event_date = match event_date {
        Some(raw) => parse_event_date(raw)?,
        None => None,
    };
    let source: ProjectSource = source.parse()?;

    Ok(NewProject {
        email,
        name,
        title,
        event_date,
        source,
    })
}

fn format_date(project: &Project) -> String {
    project
        .event_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string())
}

// -----------------------------------------------------------------------
// timeline project create
// -----------------------------------------------------------------------

async fn cmd_create(pool: &PgPool, new: &NewProject) -> Result<()> {
    let (account, project) = project::intake_project(pool, new).await?;

    println!("Project created.");
    println!();
    println!("  Project ID: {}", project.id);
    println!("  Title:      {}", project.title);
    println!("  Event date: {}", format_date(&project));
    println!("  Source:     {}", project.source);
    println!("  Account:    {} ({})", account.email, account.id);
    println!();
    println!(
        "Next: run `timeline generate {} --ceremony-time \"4:30 PM\"`.",
        project.id
    );

    Ok(())
}

// -----------------------------------------------------------------------
// timeline project list
// -----------------------------------------------------------------------

async fn cmd_list(pool: &PgPool, email: Option<&str>) -> Result<()> {
    let projects = match email {
        Some(email) => project::list_projects_for_email(pool, email).await?,
        None => project::list_projects(pool).await?,
    };

    if projects.is_empty() {
        println!("No projects found.");
        return Ok(());
    }

    println!(
        "{:<38} {:<30} {:<12} {:<16} {:<10}",
        "ID", "TITLE", "DATE", "STATUS", "SOURCE"
    );
    println!("{}", "-".repeat(110));
    for p in &projects {
        println!(
            "{:<38} {:<30} {:<12} {:<16} {:<10}",
            p.id,
            truncate(&p.title, 28),
            format_date(p),
            p.status,
            p.source
        );
    }

    Ok(())
}

/// Truncate to at most `max` characters, marking the cut with `..`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(2)).collect();
        format!("{kept}..")
    }
}

// -----------------------------------------------------------------------
// timeline project show <id>
// -----------------------------------------------------------------------

async fn cmd_show(pool: &PgPool, project_id_str: &str) -> Result<()> {
    let project_id = Uuid::parse_str(project_id_str)
        .with_context(|| format!("invalid project ID: {project_id_str}"))?;

    let project = project::get_project(pool, project_id).await?;

    println!("Project: {}", project.title);
    println!("  ID:         {}", project.id);
    println!("  Event date: {}", format_date(&project));
    println!("  Status:     {}", project.status);
    println!("  Source:     {}", project.source);
    println!("  Created:    {}", project.created_at.format("%Y-%m-%d %H:%M:%S UTC"));

    match timeline_queries::get_timeline_for_project(pool, project_id).await? {
        Some(timeline) => {
            let items: Vec<ScheduleItem> = serde_json::from_value(timeline.items)
                .context("stored timeline items are malformed")?;
            println!("  Slug:       {}", timeline.public_slug);
            println!();
            println!(
                "{}",
                render_plain_text(&project.title, project.event_date, &items)
            );
        }
        None => {
            println!();
            println!("No timeline generated yet.");
        }
    }

    Ok(())
}
