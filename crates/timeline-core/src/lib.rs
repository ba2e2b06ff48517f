//! Timeline+ core: schedule generation and the store reconciler.

pub mod error;
pub mod project;
pub mod reconcile;
pub mod render;
pub mod schedule;

pub use error::TimelineError;
