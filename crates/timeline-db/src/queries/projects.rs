//! Database query functions for the `projects` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Project, ProjectSource};

/// Insert a new project row. Returns the inserted project with
/// server-generated defaults (id, created_at, status).
pub async fn insert_project(
    pool: &PgPool,
    account_id: Uuid,
    title: &str,
    event_date: Option<NaiveDate>,
    source: ProjectSource,
) -> Result<Project> {
    let project = sqlx::query_as::<_, Project>(
        "INSERT INTO projects (account_id, title, event_date, source) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(account_id)
    .bind(title)
    .bind(event_date)
    .bind(source)
    .fetch_one(pool)
    .await
    .context("failed to insert project")?;

    Ok(project)
}

/// Fetch a project by its ID.
pub async fn get_project(pool: &PgPool, id: Uuid) -> Result<Option<Project>> {
    let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch project")?;

    Ok(project)
}

/// List all projects, newest first.
pub async fn list_projects(pool: &PgPool) -> Result<Vec<Project>> {
    let projects =
        sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
            .context("failed to list projects")?;

    Ok(projects)
}

/// List the projects owned by one account, newest first.
pub async fn list_projects_for_account(pool: &PgPool, account_id: Uuid) -> Result<Vec<Project>> {
    let projects = sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE account_id = $1 ORDER BY created_at DESC",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await
    .context("failed to list projects for account")?;

    Ok(projects)
}
