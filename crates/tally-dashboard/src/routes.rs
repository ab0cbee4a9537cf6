use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tally_core::api::{DeviceStats, HealthStatus, SubmitVoteResponse, VoteStatus, VoteSubmission};
use tally_core::db::{LogFilter, VoteFilter};
use tally_core::models::{ActionType, LogLevel};
use tally_core::services::{DashboardStats, Store, SyncService};
use tally_core::util::normalize_text_option;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::actor::RequestActor;
use crate::error::AppError;
use crate::views::{
    action_choices, level_choices, team_choices, AdminActionsContext, DashboardContext,
    LogRow, LogsContext, Pagination, ResultsContext, VotesContext, LOGS_PER_PAGE,
    RECENT_LIMIT, VOTES_PER_PAGE,
};

#[derive(Clone)]
pub struct AppState {
    sync: Arc<SyncService>,
}

impl AppState {
    pub fn new(sync: SyncService) -> Self {
        Self {
            sync: Arc::new(sync),
        }
    }

    fn store(&self) -> &Store {
        self.sync.store()
    }
}

pub fn app_router(state: AppState) -> Router {
    let ajax_routes = Router::new()
        .route("/sync-votes", post(sync_votes))
        .route("/sync-results", post(sync_results))
        .route("/reset-votes", post(reset_votes))
        .route("/reset-devices", post(reset_devices))
        .route("/device-stats", get(device_stats))
        .route("/health-check", get(health_check))
        .route("/dashboard-stats", get(dashboard_stats))
        .route("/vote-status/{identifier}", get(vote_status))
        .route("/submit-vote", post(submit_vote));

    Router::new()
        .route("/", get(dashboard_page))
        .route("/votes", get(votes_page))
        .route("/results", get(results_page))
        .route("/logs", get(logs_page))
        .route("/admin-actions", get(admin_actions_page))
        .route("/healthz", get(healthz))
        .nest("/ajax", ajax_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct LivenessResponse {
    status: &'static str,
    timestamp: i64,
}

async fn healthz() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
    })
}

// Pages

async fn dashboard_page(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
) -> Json<DashboardContext> {
    let context = async {
        let stats = state.sync.dashboard_stats(&actor).await?;
        let recent_logs = state.store().recent_logs(RECENT_LIMIT).await?;
        Ok::<_, tally_core::Error>(DashboardContext::build(stats, recent_logs))
    }
    .await;

    Json(context.unwrap_or_else(|error| {
        tracing::error!("Dashboard error: {error}");
        DashboardContext::fallback(format!("Error loading dashboard: {error}"))
    }))
}

#[derive(Debug, Default, Deserialize)]
struct VotesQuery {
    search: Option<String>,
    team: Option<String>,
    page: Option<String>,
}

async fn votes_page(
    State(state): State<AppState>,
    Query(query): Query<VotesQuery>,
) -> Json<VotesContext> {
    let search = normalize_text_option(query.search);
    let team = normalize_text_option(query.team);
    let page = query.page;
    let filter = VoteFilter {
        search: search.clone(),
        team: team.clone(),
    };

    let context = async {
        let total = state.store().count_votes(&filter).await?;
        let pagination = Pagination::new(total, VOTES_PER_PAGE, page.as_deref());
        let votes = state
            .store()
            .list_votes(&filter, pagination.per_page, pagination.offset())
            .await?;
        Ok::<_, tally_core::Error>(VotesContext {
            page_title: "All Votes",
            votes,
            pagination,
            search: search.unwrap_or_default(),
            team_filter: team.unwrap_or_default(),
            team_choices: team_choices(),
            messages: Vec::new(),
        })
    }
    .await;

    Json(context.unwrap_or_else(|error| {
        tracing::error!("Votes list error: {error}");
        VotesContext::fallback(format!("Error loading votes: {error}"))
    }))
}

async fn results_page(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
) -> Json<ResultsContext> {
    let context = async {
        let stats = state.sync.dashboard_stats(&actor).await?;
        let results = state.store().list_results().await?;
        Ok::<_, tally_core::Error>(ResultsContext::build(results, &stats))
    }
    .await;

    Json(context.unwrap_or_else(|error| {
        tracing::error!("Results view error: {error}");
        ResultsContext::fallback(format!("Error loading results: {error}"))
    }))
}

#[derive(Debug, Default, Deserialize)]
struct LogsQuery {
    level: Option<String>,
    action: Option<String>,
    search: Option<String>,
    page: Option<String>,
}

async fn logs_page(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Json<LogsContext> {
    let level_filter = normalize_text_option(query.level);
    let action_filter = normalize_text_option(query.action);
    let search = normalize_text_option(query.search);
    let page = query.page;

    let context = async {
        let level = level_filter
            .as_deref()
            .map(str::parse::<LogLevel>)
            .transpose()
            .map_err(tally_core::Error::InvalidInput)?;
        let action_type = action_filter
            .as_deref()
            .map(str::parse::<ActionType>)
            .transpose()
            .map_err(tally_core::Error::InvalidInput)?;
        let filter = LogFilter {
            level,
            action_type,
            search: search.clone(),
        };

        let total = state.store().count_logs(&filter).await?;
        let pagination = Pagination::new(total, LOGS_PER_PAGE, page.as_deref());
        let logs = state
            .store()
            .list_logs(&filter, pagination.per_page, pagination.offset())
            .await?;
        Ok::<_, tally_core::Error>(LogsContext {
            page_title: "System Logs",
            logs: logs.into_iter().map(LogRow::from).collect(),
            pagination,
            level_filter: level_filter.clone().unwrap_or_default(),
            action_filter: action_filter.clone().unwrap_or_default(),
            search: search.clone().unwrap_or_default(),
            level_choices: level_choices(),
            action_choices: action_choices(),
            messages: Vec::new(),
        })
    }
    .await;

    Json(context.unwrap_or_else(|error| {
        tracing::error!("System logs error: {error}");
        LogsContext::fallback(format!("Error loading logs: {error}"))
    }))
}

async fn admin_actions_page(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
) -> Json<AdminActionsContext> {
    let (backend_status, backend_info) = match state.sync.health_check(&actor).await {
        Ok(health) => (
            "healthy",
            serde_json::to_value(health).unwrap_or(Value::Null),
        ),
        Err(error) => ("error", serde_json::json!({ "error": error.to_string() })),
    };

    Json(AdminActionsContext {
        page_title: "Admin Actions",
        backend_status,
        backend_info,
        messages: Vec::new(),
    })
}

// JSON actions

#[derive(Debug, Serialize)]
struct SyncResponse {
    success: bool,
    message: String,
    synced_count: usize,
}

async fn sync_votes(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
) -> Result<Json<SyncResponse>, AppError> {
    let synced_count = state.sync.sync_votes(&actor).await.map_err(|error| {
        tracing::error!("Sync votes request failed: {error}");
        AppError::from(error)
    })?;
    Ok(Json(SyncResponse {
        success: true,
        message: format!("Successfully synced {synced_count} votes from backend"),
        synced_count,
    }))
}

async fn sync_results(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
) -> Result<Json<SyncResponse>, AppError> {
    let synced_count = state.sync.sync_results(&actor).await.map_err(|error| {
        tracing::error!("Sync results request failed: {error}");
        AppError::from(error)
    })?;
    Ok(Json(SyncResponse {
        success: true,
        message: format!("Successfully synced results for {synced_count} teams"),
        synced_count,
    }))
}

#[derive(Debug, Deserialize)]
struct ConfirmRequest {
    #[serde(default)]
    confirm: Value,
}

/// Accept only bodies carrying a truthy `confirm` flag.
fn require_confirmation(body: &[u8]) -> Result<(), AppError> {
    let request: ConfirmRequest = serde_json::from_slice(body)
        .map_err(|error| AppError::bad_request(format!("Invalid JSON body: {error}")))?;
    if is_truthy(&request.confirm) {
        Ok(())
    } else {
        Err(AppError::bad_request("Confirmation required"))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_voter_count: Option<i64>,
}

async fn reset_votes(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    require_confirmation(&body)?;
    state.sync.reset_all_data(&actor).await.map_err(|error| {
        tracing::error!("Reset votes request failed: {error}");
        AppError::from(error)
    })?;
    Ok(Json(MessageResponse {
        success: true,
        message: "All voting data has been reset successfully".to_string(),
        previous_voter_count: None,
    }))
}

async fn reset_devices(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    require_confirmation(&body)?;
    let previous = state.sync.reset_device_ids(&actor).await.map_err(|error| {
        tracing::error!("Reset devices request failed: {error}");
        AppError::from(error)
    })?;
    Ok(Json(MessageResponse {
        success: true,
        message: format!("All device IDs have been reset. {previous} users can now vote again."),
        previous_voter_count: Some(previous),
    }))
}

#[derive(Debug, Serialize)]
struct StatsResponse<T> {
    success: bool,
    stats: T,
}

async fn device_stats(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
) -> Json<StatsResponse<DeviceStats>> {
    Json(StatsResponse {
        success: true,
        stats: state.sync.device_statistics(&actor).await,
    })
}

async fn dashboard_stats(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
) -> Result<Json<StatsResponse<DashboardStats>>, AppError> {
    let stats = state.sync.dashboard_stats(&actor).await?;
    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}

#[derive(Debug, Serialize)]
struct HealthCheckResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    health: Option<HealthStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    backend_connected: bool,
}

async fn health_check(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
) -> Response {
    match state.sync.health_check(&actor).await {
        Ok(health) => Json(HealthCheckResponse {
            success: true,
            health: Some(health),
            error: None,
            backend_connected: true,
        })
        .into_response(),
        Err(error) => {
            tracing::error!("Health check failed: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthCheckResponse {
                    success: false,
                    health: None,
                    error: Some(error.to_string()),
                    backend_connected: false,
                }),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Serialize)]
struct VoteStatusResponse {
    success: bool,
    status: VoteStatus,
}

async fn vote_status(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(identifier): Path<String>,
) -> Result<Json<VoteStatusResponse>, AppError> {
    let status = state.sync.vote_status(&identifier, &actor).await?;
    Ok(Json(VoteStatusResponse {
        success: true,
        status,
    }))
}

#[derive(Debug, Serialize)]
struct SubmitVoteResult {
    success: bool,
    vote: SubmitVoteResponse,
}

async fn submit_vote(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    body: Bytes,
) -> Result<Json<SubmitVoteResult>, AppError> {
    let submission: VoteSubmission = serde_json::from_slice(&body)
        .map_err(|error| AppError::bad_request(format!("Invalid vote submission: {error}")))?;
    let vote = state.sync.submit_vote(&submission, &actor).await?;
    Ok(Json(SubmitVoteResult {
        success: true,
        vote,
    }))
}
