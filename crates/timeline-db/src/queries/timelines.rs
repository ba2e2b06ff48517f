//! Read-side query functions for the `timelines` table.
//!
//! Writes go through `timeline-core`'s reconciler, which needs row locks and
//! a transaction around them.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Timeline;

/// Fetch the timeline belonging to a project.
pub async fn get_timeline_for_project(pool: &PgPool, project_id: Uuid) -> Result<Option<Timeline>> {
    let timeline = sqlx::query_as::<_, Timeline>("SELECT * FROM timelines WHERE project_id = $1")
        .bind(project_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch timeline for project")?;

    Ok(timeline)
}

/// Fetch a timeline by its public slug.
pub async fn get_timeline_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Timeline>> {
    let timeline = sqlx::query_as::<_, Timeline>("SELECT * FROM timelines WHERE public_slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("failed to fetch timeline by slug")?;

    Ok(timeline)
}

/// Count the timelines in the database.
pub async fn count_timelines(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM timelines")
        .fetch_one(pool)
        .await
        .context("failed to count timelines")?;

    Ok(count)
}
