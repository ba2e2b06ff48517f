//! Store reconciler.
//!
//! Bridges the pure generator to persisted state: first-time creation vs.
//! regeneration of a project's timeline, public lookup by slug, and
//! wholesale user edits.
//!
//! Every write runs in one transaction that locks the owning project row
//! (`FOR UPDATE`) before touching its timeline, so two writers on the same
//! timeline serialize instead of overwriting each other. Lock order is
//! always project, then timeline.

pub mod edit;
pub mod slug;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use timeline_db::models::{Project, Timeline};
use timeline_db::queries::{projects as project_queries, timelines as timeline_queries};

use crate::error::{Result, TimelineError};
use crate::schedule::{ScheduleInputs, ScheduleItem, generate};

pub use edit::{DatePatch, TimelineEdit, parse_event_date};
pub use slug::{MAX_SLUG_ATTEMPTS, new_slug};

/// Result of [`generate_and_store`].
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedTimeline {
    pub project_id: Uuid,
    pub slug: String,
    pub items: Vec<ScheduleItem>,
}

/// A timeline as seen through its public slug.
///
/// `title` and `event_date` are read from the owning project.
#[derive(Debug, Clone, Serialize)]
pub struct PublicTimeline {
    pub title: String,
    pub event_date: Option<NaiveDate>,
    pub items: Vec<ScheduleItem>,
}

/// Generate a project's timeline and persist it.
///
/// The first generation mints a public slug; later ones replace `items`
/// and `inputs` but keep the slug.
///
/// Fails with `NotFound` when the project does not exist and
/// `MissingPrecondition` when it has no event date.
pub async fn generate_and_store(
    pool: &PgPool,
    project_id: Uuid,
    inputs: ScheduleInputs,
) -> Result<GeneratedTimeline> {
    generate_and_store_with_slugs(pool, project_id, inputs, new_slug).await
}

/// [`generate_and_store`] with a caller-supplied slug source.
pub async fn generate_and_store_with_slugs(
    pool: &PgPool,
    project_id: Uuid,
    inputs: ScheduleInputs,
    next_slug: impl FnMut() -> String,
) -> Result<GeneratedTimeline> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let project = lock_project(&mut tx, project_id).await?;
    let event_date = project.event_date.ok_or_else(|| {
        TimelineError::MissingPrecondition(format!("project {project_id} has no event date"))
    })?;

    let params = inputs.on(event_date);
    let items = generate(&params)?;

    let items_json = serde_json::to_value(&items).context("failed to serialize items")?;
    let inputs_json = serde_json::to_value(&params).context("failed to serialize inputs")?;

    let existing = sqlx::query_as::<_, Timeline>(
        "SELECT * FROM timelines WHERE project_id = $1 FOR UPDATE",
    )
    .bind(project_id)
    .fetch_optional(&mut *tx)
    .await
    .context("failed to fetch timeline for project")?;

    let timeline = match existing {
        Some(timeline) => {
            debug!(%project_id, slug = %timeline.public_slug, "regenerating existing timeline");
            sqlx::query_as::<_, Timeline>(
                "UPDATE timelines \
                 SET items = $1, inputs = $2, updated_at = now() \
                 WHERE id = $3 \
                 RETURNING *",
            )
            .bind(&items_json)
            .bind(&inputs_json)
            .bind(timeline.id)
            .fetch_one(&mut *tx)
            .await
            .context("failed to update timeline")?
        }
        None => insert_with_fresh_slug(&mut tx, project_id, &items_json, &inputs_json, next_slug)
            .await?,
    };

    sqlx::query("UPDATE projects SET status = 'timeline_ready' WHERE id = $1")
        .bind(project_id)
        .execute(&mut *tx)
        .await
        .context("failed to update project status")?;

    tx.commit().await.context("failed to commit transaction")?;

    info!(
        %project_id,
        slug = %timeline.public_slug,
        item_count = items.len(),
        first_look = params.inputs.first_look,
        "timeline generated"
    );

    Ok(GeneratedTimeline {
        project_id,
        slug: timeline.public_slug,
        items,
    })
}

/// Look up a timeline by its public slug.
pub async fn fetch_by_slug(pool: &PgPool, slug: &str) -> Result<PublicTimeline> {
    let timeline = timeline_queries::get_timeline_by_slug(pool, slug)
        .await?
        .ok_or_else(|| timeline_not_found(slug))?;

    let project = project_queries::get_project(pool, timeline.project_id)
        .await?
        .ok_or_else(|| timeline_not_found(slug))?;

    Ok(PublicTimeline {
        title: project.title,
        event_date: project.event_date,
        items: decode_items(timeline.items)?,
    })
}

/// Apply a user edit to the timeline behind `slug`.
///
/// The stored item list is replaced wholesale by the payload's (validated)
/// items, so clients must resend the full list. See [`TimelineEdit`] for how
/// `title` and `event_date` are interpreted.
pub async fn apply_edit(
    pool: &PgPool,
    slug: &str,
    payload: &serde_json::Value,
) -> Result<PublicTimeline> {
    let located = timeline_queries::get_timeline_by_slug(pool, slug)
        .await?
        .ok_or_else(|| timeline_not_found(slug))?;

    let edit = TimelineEdit::from_json(payload)?;
    let items_json = serde_json::to_value(&edit.items).context("failed to serialize items")?;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    lock_project(&mut tx, located.project_id).await?;

    let rows = sqlx::query(
        "UPDATE timelines SET items = $1, updated_at = now() WHERE id = $2",
    )
    .bind(&items_json)
    .bind(located.id)
    .execute(&mut *tx)
    .await
    .context("failed to update timeline items")?
    .rows_affected();
    if rows == 0 {
        // Deleted between the lookup and the lock.
        return Err(timeline_not_found(slug));
    }

    let (touch_date, new_date) = match edit.event_date {
        DatePatch::Keep => (false, None),
        DatePatch::Clear => (true, None),
        DatePatch::Set(date) => (true, Some(date)),
    };

    let project = sqlx::query_as::<_, Project>(
        "UPDATE projects \
         SET title = COALESCE($2, title), \
             event_date = CASE WHEN $3 THEN $4 ELSE event_date END \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(located.project_id)
    .bind(edit.title.as_deref())
    .bind(touch_date)
    .bind(new_date)
    .fetch_one(&mut *tx)
    .await
    .context("failed to update project")?;

    tx.commit().await.context("failed to commit transaction")?;

    info!(
        slug,
        item_count = edit.items.len(),
        title_changed = edit.title.is_some(),
        date_patch = ?edit.event_date,
        "timeline edited"
    );

    Ok(PublicTimeline {
        title: project.title,
        event_date: project.event_date,
        items: edit.items,
    })
}

async fn lock_project(conn: &mut PgConnection, project_id: Uuid) -> Result<Project> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1 FOR UPDATE")
        .bind(project_id)
        .fetch_optional(&mut *conn)
        .await
        .context("failed to lock project")?
        .ok_or_else(|| TimelineError::NotFound(format!("project {project_id} not found")))
}

/// Insert a new timeline row, minting slugs until one is free.
///
/// `ON CONFLICT (public_slug) DO NOTHING` turns a collision into an empty
/// result instead of an aborted transaction.
async fn insert_with_fresh_slug(
    conn: &mut PgConnection,
    project_id: Uuid,
    items: &serde_json::Value,
    inputs: &serde_json::Value,
    mut next_slug: impl FnMut() -> String,
) -> Result<Timeline> {
    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        let slug = next_slug();
        let inserted = sqlx::query_as::<_, Timeline>(
            "INSERT INTO timelines (project_id, items, inputs, public_slug) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (public_slug) DO NOTHING \
             RETURNING *",
        )
        .bind(project_id)
        .bind(items)
        .bind(inputs)
        .bind(&slug)
        .fetch_optional(&mut *conn)
        .await
        .context("failed to insert timeline")?;

        match inserted {
            Some(timeline) => return Ok(timeline),
            None => warn!(%project_id, attempt, "public slug collision, retrying"),
        }
    }

    Err(TimelineError::Conflict(format!(
        "could not mint a unique public slug after {MAX_SLUG_ATTEMPTS} attempts"
    )))
}

fn decode_items(items: serde_json::Value) -> Result<Vec<ScheduleItem>> {
    let items: Vec<ScheduleItem> =
        serde_json::from_value(items).context("stored timeline items are malformed")?;
    Ok(items)
}

fn timeline_not_found(slug: &str) -> TimelineError {
    TimelineError::NotFound(format!("timeline {slug:?} not found"))
}
