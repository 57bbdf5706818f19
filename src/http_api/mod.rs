use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AllocationSummary, BonusLedger, BonusPool, ExchangeError, ImportMode, LedgerError, MemberId,
    MemberUpdate, NewMember, PoolSettings, TeamMember,
    exchange::{apply_import, parse_members_csv, screen_members, write_members_csv},
};

#[derive(Clone)]
pub struct AppState {
    ledger: Arc<RwLock<BonusLedger>>,
}

impl AppState {
    pub fn new(ledger: BonusLedger) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
        }
    }

    pub fn with_shared(ledger: Arc<RwLock<BonusLedger>>) -> Self {
        Self { ledger }
    }

    fn ledger(&self) -> Arc<RwLock<BonusLedger>> {
        self.ledger.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Empty(String),
    Internal(String),
}

#[derive(Debug, Deserialize)]
struct ImportParams {
    #[serde(default)]
    mode: Option<String>,
}

/// Invalid records in a bulk replace are dropped and counted, not fatal.
#[derive(Debug, Serialize)]
struct ReplaceResponse {
    members: Vec<TeamMember>,
    skipped: usize,
}

#[derive(Debug, Serialize)]
struct ImportResponse {
    mode: &'static str,
    imported: usize,
    skipped: usize,
    pool: BonusPool,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<LedgerError> for ApiError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::MemberNotFound(_) => ApiError::NotFound(value.to_string()),
            ref err if err.is_empty_state() => ApiError::Empty(value.to_string()),
            _ => ApiError::Invalid(value.to_string()),
        }
    }
}

impl From<ExchangeError> for ApiError {
    fn from(value: ExchangeError) -> Self {
        match value {
            ExchangeError::Ledger(err) => ApiError::from(err),
            ExchangeError::NoValidRecords => ApiError::Empty(value.to_string()),
            ExchangeError::MissingHeaders(_) | ExchangeError::Csv(_) => {
                ApiError::Invalid(value.to_string())
            }
            ExchangeError::Io(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Empty(message) => (StatusCode::UNPROCESSABLE_ENTITY, "nothing_to_do", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

fn parse_member_id(raw: &str) -> Result<MemberId, ApiError> {
    MemberId::from_str(raw).map_err(|_| ApiError::invalid(format!("invalid member id '{raw}'")))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/pool", get(get_pool))
        .route("/settings", get(get_settings).put(update_settings))
        .route(
            "/members",
            get(list_members).post(create_member).put(replace_members),
        )
        .route(
            "/members/:id",
            get(get_member).patch(update_member).delete(delete_member),
        )
        .route("/allocate", post(allocate))
        .route("/reset", post(reset))
        .route("/summary", get(summary))
        .route("/import", post(import_csv))
        .route("/export.csv", get(export_csv))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, ledger: BonusLedger) -> std::io::Result<()> {
    let state = AppState::new(ledger);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_pool(State(state): State<AppState>) -> Json<BonusPool> {
    let ledger = state.ledger();
    let pool = ledger.read().pool().clone();
    Json(pool)
}

async fn get_settings(State(state): State<AppState>) -> Json<PoolSettings> {
    let ledger = state.ledger();
    let settings = ledger.read().settings().clone();
    Json(settings)
}

async fn update_settings(
    State(state): State<AppState>,
    Json(settings): Json<PoolSettings>,
) -> Result<Json<BonusPool>, ApiError> {
    let ledger = state.ledger();
    let mut guard = ledger.write();
    guard.apply_settings(settings)?;
    Ok(Json(guard.pool().clone()))
}

async fn list_members(State(state): State<AppState>) -> Json<Vec<TeamMember>> {
    let ledger = state.ledger();
    let members = ledger.read().members().to_vec();
    Json(members)
}

async fn get_member(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<TeamMember>, ApiError> {
    let id = parse_member_id(&raw_id)?;
    let ledger = state.ledger();
    let guard = ledger.read();
    guard
        .find_member(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("team member {id} not found")))
}

async fn create_member(
    State(state): State<AppState>,
    Json(candidate): Json<NewMember>,
) -> Result<(StatusCode, Json<TeamMember>), ApiError> {
    let ledger = state.ledger();
    let mut guard = ledger.write();
    let id = guard.add_member(candidate)?;
    let created = guard
        .find_member(&id)
        .cloned()
        .ok_or_else(|| ApiError::internal("team member not found after creation"))?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn replace_members(
    State(state): State<AppState>,
    Json(candidates): Json<Vec<NewMember>>,
) -> Result<Json<ReplaceResponse>, ApiError> {
    let report = screen_members(candidates);
    let ledger = state.ledger();
    let mut guard = ledger.write();
    let outcome = apply_import(&mut guard, report, ImportMode::Replace)?;
    Ok(Json(ReplaceResponse {
        members: guard.members().to_vec(),
        skipped: outcome.skipped,
    }))
}

async fn update_member(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(update): Json<MemberUpdate>,
) -> Result<Json<TeamMember>, ApiError> {
    let id = parse_member_id(&raw_id)?;
    let ledger = state.ledger();
    let mut guard = ledger.write();
    guard.update_member(&id, update)?;
    guard
        .find_member(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::internal("team member not found after update"))
}

async fn delete_member(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_member_id(&raw_id)?;
    let ledger = state.ledger();
    let removed = ledger.write().remove_member(&id);
    if !removed {
        return Err(ApiError::not_found(format!("team member {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn allocate(State(state): State<AppState>) -> Result<Json<AllocationSummary>, ApiError> {
    let ledger = state.ledger();
    let summary = ledger.write().run_auto_allocate()?;
    Ok(Json(summary))
}

async fn reset(State(state): State<AppState>) -> Json<AllocationSummary> {
    let ledger = state.ledger();
    let mut guard = ledger.write();
    guard.reset_allocations();
    Json(guard.summary())
}

async fn summary(State(state): State<AppState>) -> Json<AllocationSummary> {
    let ledger = state.ledger();
    let summary = ledger.read().summary();
    Json(summary)
}

async fn import_csv(
    State(state): State<AppState>,
    Query(params): Query<ImportParams>,
    body: String,
) -> Result<Json<ImportResponse>, ApiError> {
    let mode = match params.mode.as_deref() {
        Some(raw) => ImportMode::from_str(raw).map_err(ApiError::invalid)?,
        None => ImportMode::default(),
    };
    let report = parse_members_csv(body.as_bytes())?;
    let ledger = state.ledger();
    let mut guard = ledger.write();
    let outcome = apply_import(&mut guard, report, mode)?;
    Ok(Json(ImportResponse {
        mode: outcome.mode.as_str(),
        imported: outcome.imported,
        skipped: outcome.skipped,
        pool: guard.pool().clone(),
    }))
}

async fn export_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let ledger = state.ledger();
    let mut buffer = Vec::new();
    {
        let guard = ledger.read();
        write_members_csv(guard.members(), &mut buffer)?;
    }
    let body = String::from_utf8(buffer).map_err(|err| ApiError::internal(err.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        body,
    )
        .into_response())
}
