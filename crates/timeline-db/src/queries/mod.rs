//! Query functions, one module per table.

pub mod accounts;
pub mod projects;
pub mod timelines;
