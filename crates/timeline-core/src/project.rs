//! Project intake: accounts keyed by email, projects hanging off them.

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use timeline_db::models::{Account, Project, ProjectSource};
use timeline_db::queries::{accounts, projects};

use crate::error::{Result, TimelineError};

/// A new project as submitted through intake.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub title: String,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub source: ProjectSource,
}

/// Upsert the account for `new.email` and create a project under it.
///
/// Calling this twice with the same email reuses the account but creates a
/// second project; projects are not deduplicated.
pub async fn intake_project(pool: &PgPool, new: &NewProject) -> Result<(Account, Project)> {
    let email = new.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(TimelineError::InvalidArgument(format!(
            "invalid account email {:?}",
            new.email
        )));
    }
    let title = new.title.trim();
    if title.is_empty() {
        return Err(TimelineError::InvalidArgument(
            "project title must not be empty".into(),
        ));
    }

    let account = accounts::upsert_account(pool, email, new.name.as_deref()).await?;
    let project =
        projects::insert_project(pool, account.id, title, new.event_date, new.source).await?;

    info!(
        account_id = %account.id,
        project_id = %project.id,
        source = %project.source,
        "project created"
    );

    Ok((account, project))
}

/// Fetch a project, mapping absence to `NotFound`.
pub async fn get_project(pool: &PgPool, id: Uuid) -> Result<Project> {
    projects::get_project(pool, id)
        .await?
        .ok_or_else(|| TimelineError::NotFound(format!("project {id} not found")))
}

/// All projects, newest first.
pub async fn list_projects(pool: &PgPool) -> Result<Vec<Project>> {
    Ok(projects::list_projects(pool).await?)
}

/// Projects owned by the account with `email`, newest first.
///
/// An unknown email yields an empty list rather than `NotFound`.
pub async fn list_projects_for_email(pool: &PgPool, email: &str) -> Result<Vec<Project>> {
    match accounts::get_account_by_email(pool, email).await? {
        Some(account) => Ok(projects::list_projects_for_account(pool, account.id).await?),
        None => Ok(Vec::new()),
    }
}
