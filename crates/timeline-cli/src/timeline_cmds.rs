//! CLI handlers for `timeline generate`, `timeline show`, and
//! `timeline preview`.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use timeline_core::reconcile::{self, parse_event_date};
use timeline_core::render::{DEFAULT_TITLE, render_plain_text};
use timeline_core::schedule::{ScheduleInputs, generate};

/// Collect generation knobs from CLI arguments.
pub fn schedule_inputs(
    ceremony_time: String,
    first_look: bool,
    group_photo_count: i32,
    travel_minutes: i32,
) -> ScheduleInputs {
    ScheduleInputs {
        ceremony_time,
        first_look,
        group_photo_count,
        travel_minutes,
    }
}

// -----------------------------------------------------------------------
// timeline generate <project-id>
// -----------------------------------------------------------------------

pub async fn run_generate(pool: &PgPool, project_id_str: &str, inputs: ScheduleInputs) -> Result<()> {
    let project_id = Uuid::parse_str(project_id_str)
        .with_context(|| format!("invalid project ID: {project_id_str}"))?;

    let generated = reconcile::generate_and_store(pool, project_id, inputs).await?;

    println!("Timeline generated for project {}.", generated.project_id);
    println!("  Public slug: {}", generated.slug);
    println!();
    for item in &generated.items {
        println!("  {:>8}  {}", item.time, item.label);
    }

    Ok(())
}

// -----------------------------------------------------------------------
// timeline show <slug>
// -----------------------------------------------------------------------

pub async fn run_show(pool: &PgPool, slug: &str) -> Result<()> {
    let timeline = reconcile::fetch_by_slug(pool, slug).await?;
    println!(
        "{}",
        render_plain_text(&timeline.title, timeline.event_date, &timeline.items)
    );
    Ok(())
}

// -----------------------------------------------------------------------
// timeline preview <date>
// -----------------------------------------------------------------------

pub fn run_preview(date: &str, inputs: ScheduleInputs) -> Result<()> {
    println!("{}", preview_text(date, inputs)?);
    Ok(())
}

/// Render a schedule for `date` without persisting anything.
fn preview_text(date: &str, inputs: ScheduleInputs) -> Result<String> {
    let event_date = parse_event_date(date)?
        .with_context(|| format!("preview needs an event date, got {date:?}"))?;
    let items = generate(&inputs.on(event_date))?;
    Ok(render_plain_text(DEFAULT_TITLE, Some(event_date), &items))
}
