//! JSON HTTP API.
//!
//! Serves the dashboard's data and search over HTTP. The search index is
//! built once at startup and replaced wholesale on `POST /reindex`. Handlers
//! clone the current `Arc<SearchIndex>` and never hold the lock while
//! searching.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Status, version, source name and index size |
//! | `GET`  | `/search?q=&limit=&types=&grouped=` | Ranked or grouped search results |
//! | `GET`  | `/notes` | Kanban board and pending action count |
//! | `POST` | `/notes/{id}/move` | Move a note to another column |
//! | `GET`  | `/tasks?status=&agent=&board=` | Tasks by priority, or grouped by status |
//! | `GET`  | `/agents` | Squad overview with status counts |
//! | `GET`  | `/agents/{id}` | Agent detail with parsed WORKING.md |
//! | `GET`  | `/activity?limit=` | Activity feed, newest first |
//! | `POST` | `/reindex` | Refetch everything and swap in a new index |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "no agent with id: zed" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `source_error` (502).
//!
//! # Note moves
//!
//! Data sources are read-only. A move is kept in memory as a column override
//! that is applied to every later `/notes` response until the server exits.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser dashboard
//! on another port can call the API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};

use command_center_core::board::{move_note, squad_counts};
use command_center_core::models::{Column, Note};
use command_center_core::search::{group_results, search, SearchIndex, SearchOptions};
use command_center_core::source::{index_from_source, DataSource};

use crate::agents::detail_json;
use crate::config::Config;
use crate::notes::board_json;
use crate::search::parse_types;
use crate::tasks::{tasks_json, TaskFilter};

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    source: Arc<dyn DataSource>,
    index: Arc<RwLock<Arc<SearchIndex>>>,
    /// Column overrides by note id, in the order they were made.
    moves: Arc<Mutex<Vec<(String, Column)>>>,
}

impl AppState {
    fn current_index(&self) -> Arc<SearchIndex> {
        let guard = self.index.read().unwrap_or_else(|p| p.into_inner());
        Arc::clone(&*guard)
    }

    fn swap_index(&self, index: SearchIndex) {
        let mut guard = self.index.write().unwrap_or_else(|p| p.into_inner());
        *guard = Arc::new(index);
    }

    fn apply_moves(&self, notes: &mut [Note]) {
        let moves = self.moves.lock().unwrap_or_else(|p| p.into_inner());
        for (id, column) in moves.iter() {
            move_note(notes, id, *column);
        }
    }

    fn record_move(&self, id: String, column: Column) {
        let mut moves = self.moves.lock().unwrap_or_else(|p| p.into_inner());
        moves.retain(|(existing, _)| *existing != id);
        moves.push((id, column));
    }
}

/// Builds the index from `source` and returns the API router.
pub async fn build_router(config: &Config, source: Arc<dyn DataSource>) -> anyhow::Result<Router> {
    let index = index_from_source(source.as_ref()).await?;
    tracing::info!(source = source.name(), items = index.len(), "index built");

    let state = AppState {
        config: Arc::new(config.clone()),
        source,
        index: Arc::new(RwLock::new(Arc::new(index))),
        moves: Arc::new(Mutex::new(Vec::new())),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/health", get(handle_health))
        .route("/search", get(handle_search))
        .route("/notes", get(handle_notes))
        .route("/notes/{id}/move", post(handle_move_note))
        .route("/tasks", get(handle_tasks))
        .route("/agents", get(handle_agents))
        .route("/agents/{id}", get(handle_agent_detail))
        .route("/activity", get(handle_activity))
        .route("/reindex", post(handle_reindex))
        .layer(cors)
        .with_state(state))
}

/// Starts the server on `[server].bind` and runs until the process ends.
pub async fn run_server(config: &Config, source: Box<dyn DataSource>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = build_router(config, Arc::from(source)).await?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "server listening");
    println!("Command Center API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

/// The data source failed; the API itself is healthy.
fn source_error(err: anyhow::Error) -> AppError {
    tracing::warn!(error = %err, "data source request failed");
    AppError {
        status: StatusCode::BAD_GATEWAY,
        code: "source_error",
        message: format!("{:#}", err),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    source: String,
    items: usize,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        source: state.source.name().to_string(),
        items: state.current_index().len(),
    })
}

// ============ GET /search ============

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    limit: Option<usize>,
    /// Comma-separated type names.
    types: Option<String>,
    #[serde(default)]
    grouped: bool,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, AppError> {
    let max_results = params.limit.unwrap_or(state.config.search.max_results);
    if max_results == 0 {
        return Err(bad_request("limit must be >= 1"));
    }
    let types: Vec<String> = params.types.into_iter().collect();
    let types = parse_types(&types).map_err(|e| bad_request(e.to_string()))?;

    let index = state.current_index();
    let results = search(&index, &params.q, &SearchOptions { max_results, types });

    let body = if params.grouped {
        json!({
            "query": params.q,
            "total": results.len(),
            "grouped": group_results(&results),
        })
    } else {
        json!({
            "query": params.q,
            "total": results.len(),
            "results": results,
        })
    };
    Ok(Json(body))
}

// ============ GET /notes ============

async fn handle_notes(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let mut notes = state.source.notes().await.map_err(source_error)?;
    state.apply_moves(&mut notes);
    Ok(Json(board_json(&notes, None)))
}

// ============ POST /notes/{id}/move ============

#[derive(Debug, Deserialize)]
struct MoveRequest {
    column: String,
}

async fn handle_move_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<Value>, AppError> {
    let column = Column::parse(&req.column).ok_or_else(|| {
        bad_request(format!(
            "unknown column: '{}'. Use inbox, review, action or done.",
            req.column
        ))
    })?;

    let mut notes = state.source.notes().await.map_err(source_error)?;
    state.apply_moves(&mut notes);
    if !move_note(&mut notes, &id, column) {
        return Err(not_found(format!("no note with id: {}", id)));
    }
    tracing::info!(note = %id, column = column.label(), "note moved");
    state.record_move(id, column);

    Ok(Json(board_json(&notes, None)))
}

// ============ GET /tasks ============

#[derive(Debug, Deserialize)]
struct TaskParams {
    status: Option<String>,
    agent: Option<String>,
    #[serde(default)]
    board: bool,
}

async fn handle_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskParams>,
) -> Result<Json<Value>, AppError> {
    let filter = TaskFilter::parse(params.status.as_deref(), params.agent.as_deref())
        .map_err(|e| bad_request(e.to_string()))?;
    let tasks = state.source.tasks().await.map_err(source_error)?;
    Ok(Json(tasks_json(&tasks, &filter, params.board)))
}

// ============ GET /agents ============

async fn handle_agents(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let overview = state.source.squad_overview().await.map_err(source_error)?;
    Ok(Json(json!({
        "agents": overview.agents,
        "lastUpdated": overview.last_updated,
        "counts": squad_counts(&overview.agents),
    })))
}

// ============ GET /agents/{id} ============

async fn handle_agent_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let detail = state
        .source
        .agent_detail(&id)
        .await
        .map_err(source_error)?
        .ok_or_else(|| not_found(format!("no agent with id: {}", id)))?;
    Ok(Json(detail_json(&detail)))
}

// ============ GET /activity ============

#[derive(Debug, Deserialize)]
struct ActivityParams {
    limit: Option<usize>,
}

async fn handle_activity(
    State(state): State<AppState>,
    Query(params): Query<ActivityParams>,
) -> Result<Json<Value>, AppError> {
    let mut activity = state.source.activity().await.map_err(source_error)?;
    if let Some(limit) = params.limit {
        activity.truncate(limit);
    }
    Ok(Json(json!({ "activity": activity })))
}

// ============ POST /reindex ============

async fn handle_reindex(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.source.invalidate();
    let index = index_from_source(state.source.as_ref())
        .await
        .map_err(source_error)?;
    let (items, last_updated) = (index.len(), index.last_updated);
    state.swap_index(index);
    tracing::info!(source = state.source.name(), items, "index rebuilt");

    Ok(Json(json!({ "items": items, "lastUpdated": last_updated })))
}
