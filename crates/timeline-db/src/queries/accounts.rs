//! Database query functions for the `accounts` table.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::Account;

/// Insert an account keyed on email, or return the existing one.
///
/// Emails are normalised to lowercase before the upsert. A `name` supplied
/// for an existing account replaces the stored one; `None` keeps it.
pub async fn upsert_account(pool: &PgPool, email: &str, name: Option<&str>) -> Result<Account> {
    let email = email.trim().to_lowercase();
    let account = sqlx::query_as::<_, Account>(
        "INSERT INTO accounts (email, name) VALUES ($1, $2) \
         ON CONFLICT (email) DO UPDATE SET name = COALESCE(EXCLUDED.name, accounts.name) \
         RETURNING *",
    )
    .bind(&email)
    .bind(name)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to upsert account {email:?}"))?;

    Ok(account)
}

/// Fetch an account by email (case-insensitive).
pub async fn get_account_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = $1")
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await
        .context("failed to fetch account")?;

    Ok(account)
}
