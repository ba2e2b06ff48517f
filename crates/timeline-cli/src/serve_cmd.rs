use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use timeline_core::TimelineError;
use timeline_core::project::{self, NewProject};
use timeline_core::reconcile::{self, GeneratedTimeline, PublicTimeline};
use timeline_core::schedule::ScheduleInputs;
use timeline_db::models::{Account, Project};

use crate::config::ServerConfig;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl From<TimelineError> for AppError {
    fn from(err: TimelineError) -> Self {
        let status = match &err {
            TimelineError::NotFound(_) => StatusCode::NOT_FOUND,
            TimelineError::MissingPrecondition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TimelineError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            TimelineError::Conflict(_) => StatusCode::CONFLICT,
            TimelineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = format!("{err:#}");
        if status.is_server_error() {
            tracing::error!(error = %message, "request failed");
        }
        Self { status, message }
    }
}

// Extractor rejections keep axum's status but use the JSON error body.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub project_id: Uuid,
    #[serde(flatten)]
    pub inputs: ScheduleInputs,
}

#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedProjectResponse {
    pub account: Account,
    pub project: Project,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(pool: PgPool) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/{id}", get(get_project))
        .route("/timeline/generate", post(generate_timeline))
        .route("/timeline/{slug}", patch(edit_timeline))
        .route("/t/{slug}", get(public_timeline))
        .layer(CorsLayer::permissive())
        .with_state(pool)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(pool: PgPool, server: &ServerConfig) -> Result<()> {
    let app = build_router(pool);
    let addr: SocketAddr = format!("{}:{}", server.bind, server.port).parse()?;
    tracing::info!("timeline serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("timeline serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Timeline+ API is running" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_projects(
    State(pool): State<PgPool>,
    query: Result<Query<ProjectListQuery>, QueryRejection>,
) -> Result<Json<Vec<Project>>, AppError> {
    let Query(query) = query?;
    let projects = match query.email.as_deref() {
        Some(email) => project::list_projects_for_email(&pool, email).await?,
        None => project::list_projects(&pool).await?,
    };
    Ok(Json(projects))
}

async fn create_project(
    State(pool): State<PgPool>,
    body: Result<Json<NewProject>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedProjectResponse>), AppError> {
    let Json(new) = body?;
    let (account, project) = project::intake_project(&pool, &new).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedProjectResponse { account, project }),
    ))
}

async fn get_project(
    State(pool): State<PgPool>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Project>, AppError> {
    let Path(id) = id?;
    Ok(Json(project::get_project(&pool, id).await?))
}

async fn generate_timeline(
    State(pool): State<PgPool>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GeneratedTimeline>, AppError> {
    let Json(req) = body?;
    let generated = reconcile::generate_and_store(&pool, req.project_id, req.inputs).await?;
    Ok(Json(generated))
}

async fn public_timeline(
    State(pool): State<PgPool>,
    slug: Result<Path<String>, PathRejection>,
) -> Result<Json<PublicTimeline>, AppError> {
    let Path(slug) = slug?;
    Ok(Json(reconcile::fetch_by_slug(&pool, &slug).await?))
}

async fn edit_timeline(
    State(pool): State<PgPool>,
    slug: Result<Path<String>, PathRejection>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<PublicTimeline>, AppError> {
    let Path(slug) = slug?;
    let Json(payload) = body?;
    Ok(Json(reconcile::apply_edit(&pool, &slug, &payload).await?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
