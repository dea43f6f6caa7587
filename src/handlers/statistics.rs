use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::schemas::{ApiResponse, AppState, CachedData, ErrorResponse};
use axum::{extract::State, response::Json};
use chrono::NaiveDateTime;
use domain::stats::{self, ClientStats, TrainerStats};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrainerStatsResponse {
    pub total_plans: u64,
    pub active_plans: u64,
    /// Plans at 100% completion
    pub completed_plans: u64,
    pub total_clients: u64,
    pub avg_completion_rate: f64,
}

impl From<TrainerStats> for TrainerStatsResponse {
    fn from(stats: TrainerStats) -> Self {
        Self {
            total_plans: stats.total_plans,
            active_plans: stats.active_plans,
            completed_plans: stats.completed_plans,
            total_clients: stats.total_clients,
            avg_completion_rate: stats.avg_completion_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClientStatsResponse {
    pub total_plans: u64,
    pub active_plans: u64,
    pub total_workouts: u64,
    pub completed_workouts: u64,
    /// Percentage of logged workouts that were completed
    pub completion_rate: i32,
    /// Average workout duration in minutes
    pub avg_duration: f64,
    pub last_workout: Option<NaiveDateTime>,
}

impl From<ClientStats> for ClientStatsResponse {
    fn from(stats: ClientStats) -> Self {
        Self {
            total_plans: stats.total_plans,
            active_plans: stats.active_plans,
            total_workouts: stats.total_workouts,
            completed_workouts: stats.completed_workouts,
            completion_rate: stats.completion_rate,
            avg_duration: stats.avg_duration,
            last_workout: stats.last_workout,
        }
    }
}

fn trainer_key(trainer_id: i32) -> String {
    format!("trainer_stats_{trainer_id}")
}

fn client_key(client_id: i32) -> String {
    format!("client_stats_{client_id}")
}

/// Drops the cached statistics of both sides of a plan.
pub(crate) async fn invalidate_stats(state: &AppState, trainer_id: i32, client_id: i32) {
    state.cache.invalidate(&trainer_key(trainer_id)).await;
    state.cache.invalidate(&client_key(client_id)).await;
    debug!("Invalidated statistics of trainer {} and client {}", trainer_id, client_id);
}

/// Plan statistics of the authenticated trainer
#[utoipa::path(
    get,
    path = "/api/v1/workouts/stats",
    tag = "statistics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Statistics retrieved successfully", body = ApiResponse<TrainerStatsResponse>),
        (status = 403, description = "Not an approved trainer", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn trainer_stats(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<ApiResponse<TrainerStatsResponse>>, ApiError> {
    trace!("Entering trainer_stats function");
    let trainer = current.require_approved_trainer()?;
    let cache_key = trainer_key(trainer.id);

    if let Some(CachedData::TrainerStats(stats)) = state.cache.get(&cache_key).await {
        debug!("Trainer statistics served from cache");
        return Ok(Json(ApiResponse::ok(stats, "Statistics retrieved from cache")));
    }

    let stats = TrainerStatsResponse::from(stats::trainer_stats(&state.db, trainer.id).await?);
    state
        .cache
        .insert(cache_key, CachedData::TrainerStats(stats.clone()))
        .await;

    Ok(Json(ApiResponse::ok(stats, "Statistics retrieved successfully")))
}

/// Workout statistics of the authenticated client
#[utoipa::path(
    get,
    path = "/api/v1/client/stats",
    tag = "client",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Statistics retrieved successfully", body = ApiResponse<ClientStatsResponse>),
        (status = 403, description = "Not a client", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn client_stats(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<ApiResponse<ClientStatsResponse>>, ApiError> {
    trace!("Entering client_stats function");
    let client = current.require_client()?;
    let cache_key = client_key(client.id);

    if let Some(CachedData::ClientStats(stats)) = state.cache.get(&cache_key).await {
        debug!("Client statistics served from cache");
        return Ok(Json(ApiResponse::ok(stats, "Statistics retrieved from cache")));
    }

    let stats = ClientStatsResponse::from(stats::client_stats(&state.db, client.id).await?);
    state
        .cache
        .insert(cache_key, CachedData::ClientStats(stats.clone()))
        .await;

    Ok(Json(ApiResponse::ok(stats, "Statistics retrieved successfully")))
}
