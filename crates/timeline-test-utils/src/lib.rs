//! Test harness for Timeline+ integration tests.
//!
//! Every test gets a private, fully migrated database on one PostgreSQL
//! server per test binary. The server is either the one named by
//! `TIMELINE_TEST_PG_URL` (a CI service container) or a testcontainers
//! instance started on first use.

use std::time::Duration;

use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use timeline_db::models::{Project, ProjectSource};
use timeline_db::pool;
use timeline_db::queries::{accounts, projects};

/// Environment variable naming an already-running server.
pub const TEST_PG_URL_VAR: &str = "TIMELINE_TEST_PG_URL";

const POSTGRES_TAG: &str = "16";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

struct TestServer {
    root_url: String,
    _container: Option<ContainerAsync<Postgres>>,
}

static SERVER: OnceCell<TestServer> = OnceCell::const_new();

async fn start_server() -> TestServer {
    if let Ok(url) = std::env::var(TEST_PG_URL_VAR) {
        return TestServer {
            root_url: url.trim_end_matches('/').to_owned(),
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag(POSTGRES_TAG)
        .start()
        .await
        .expect("failed to start PostgreSQL container");
    let host = container.get_host().await.expect("failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("failed to get mapped port");

    TestServer {
        root_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

/// Server root URL (no database name appended).
pub async fn pg_url() -> &'static str {
    &SERVER.get_or_init(start_server).await.root_url
}

async fn connect(db: &str, max_connections: u32) -> PgPool {
    let url = format!("{}/{db}", pg_url().await);
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(CONNECT_TIMEOUT)
        .connect(&url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to {db}: {e}"))
}

/// Create a uniquely named, migrated database.
///
/// Returns `(pool, db_name)`; hand `db_name` to [`drop_test_db`] once the
/// pool is closed.
pub async fn create_test_db() -> (PgPool, String) {
    let db_name = format!("timeline_test_{}", Uuid::new_v4().simple());

    let admin = connect("postgres", 1).await;
    admin
        .execute(format!("CREATE DATABASE {db_name}").as_str())
        .await
        .unwrap_or_else(|e| panic!("failed to create {db_name}: {e}"));
    admin.close().await;

    let pool = connect(&db_name, 5).await;
    pool::run_migrations(&pool)
        .await
        .expect("migrations should succeed");

    (pool, db_name)
}

/// Drop a database made by [`create_test_db`], kicking out any lingering
/// sessions. Missing databases are ignored.
pub async fn drop_test_db(db_name: &str) {
    assert!(
        db_name.starts_with("timeline_test_"),
        "refusing to drop non-test database {db_name:?}"
    );

    let admin = connect("postgres", 1).await;
    let _ = sqlx::query(
        "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
         WHERE datname = $1 AND pid <> pg_backend_pid()",
    )
    .bind(db_name)
    .execute(&admin)
    .await;
    let _ = admin
        .execute(format!("DROP DATABASE IF EXISTS {db_name}").as_str())
        .await;
    admin.close().await;
}

/// Insert a manual-source project owned by `email`, creating the account
/// on first use.
pub async fn seed_project(
    pool: &PgPool,
    email: &str,
    title: &str,
    event_date: Option<NaiveDate>,
) -> Project {
    let account = accounts::upsert_account(pool, email, None)
        .await
        .expect("seed account");
    projects::insert_project(pool, account.id, title, event_date, ProjectSource::Manual)
        .await
        .expect("seed project")
}
