use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Where a project came from. Provenance tag only; nothing syncs back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectSource {
    #[default]
    Manual,
    Honeybook,
    Vagaro,
}

impl fmt::Display for ProjectSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Manual => "manual",
            Self::Honeybook => "honeybook",
            Self::Vagaro => "vagaro",
        };
        f.write_str(s)
    }
}

impl FromStr for ProjectSource {
    type Err = ProjectSourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "honeybook" => Ok(Self::Honeybook),
            "vagaro" => Ok(Self::Vagaro),
            other => Err(ProjectSourceParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ProjectSource`] string.
#[derive(Debug, Clone)]
pub struct ProjectSourceParseError(pub String);

impl fmt::Display for ProjectSourceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid project source: {:?}", self.0)
    }
}

impl std::error::Error for ProjectSourceParseError {}

// ---------------------------------------------------------------------------

/// Workflow status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    AwaitingIntake,
    TimelineReady,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AwaitingIntake => "awaiting_intake",
            Self::TimelineReady => "timeline_ready",
        };
        f.write_str(s)
    }
}

impl FromStr for ProjectStatus {
    type Err = ProjectStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting_intake" => Ok(Self::AwaitingIntake),
            "timeline_ready" => Ok(Self::TimelineReady),
            other => Err(ProjectStatusParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ProjectStatus`] string.
#[derive(Debug, Clone)]
pub struct ProjectStatusParseError(pub String);

impl fmt::Display for ProjectStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid project status: {:?}", self.0)
    }
}

impl std::error::Error for ProjectStatusParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A row in the `accounts` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub plan: String,
    pub created_at: DateTime<Utc>,
}

/// A row in the `projects` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub account_id: Uuid,
    pub title: String,
    pub event_date: Option<NaiveDate>,
    pub source: ProjectSource,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

/// A row in the `timelines` table.
///
/// `items` and `inputs` are stored as JSONB; their typed shapes live in
/// `timeline-core`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Timeline {
    pub id: Uuid,
    pub project_id: Uuid,
    pub items: serde_json::Value,
    pub inputs: serde_json::Value,
    pub public_slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_source_roundtrips_through_strings() {
        for source in [
            ProjectSource::Manual,
            ProjectSource::Honeybook,
            ProjectSource::Vagaro,
        ] {
            let parsed: ProjectSource = source.to_string().parse().unwrap();
            assert_eq!(parsed, source);
        }
    }

    #[test]
    fn unknown_source_is_rejected() {
        let err = "calendly".parse::<ProjectSource>().unwrap_err();
        assert_eq!(err.to_string(), "invalid project source: \"calendly\"");
    }

    #[test]
    fn project_status_defaults_to_awaiting_intake() {
        assert_eq!(ProjectStatus::default(), ProjectStatus::AwaitingIntake);
        assert_eq!(
            "timeline_ready".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::TimelineReady
        );
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ProjectStatus::TimelineReady).unwrap();
        assert_eq!(json, "\"timeline_ready\"");
    }
}
