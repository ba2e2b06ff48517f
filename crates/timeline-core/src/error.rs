//! Error kinds surfaced by the reconciler and intake paths.

use thiserror::Error;

/// Caller-visible failure of a timeline operation.
///
/// Ceremony-time parse failures never show up here; the generator falls
/// back to a noon anchor instead.
#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MissingPrecondition(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

impl From<sqlx::Error> for TimelineError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.into())
    }
}

pub type Result<T, E = TimelineError> = std::result::Result<T, E>;
