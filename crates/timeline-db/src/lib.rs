//! PostgreSQL persistence for accounts, projects, and timelines.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
