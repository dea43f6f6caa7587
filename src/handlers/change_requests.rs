use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::users::{UserResponse, UserSummary};
use crate::handlers::{page_params, DEFAULT_PAGE_LIMIT};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::validation::{ValidatedJson, ValidatedQuery};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDateTime;
use common::Page;
use domain::assignment::{self, PendingChangeRequest};
use model::entities::trainer_change_request::{self, ChangeRequestStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChangeRequestResponse {
    pub id: i32,
    pub client_id: i32,
    pub requested_trainer_id: i32,
    pub reason: Option<String>,
    #[schema(value_type = String, example = "pending")]
    pub status: ChangeRequestStatus,
    pub requested_at: NaiveDateTime,
    pub processed_at: Option<NaiveDateTime>,
    pub processed_by: Option<i32>,
    pub decision_note: Option<String>,
}

impl From<trainer_change_request::Model> for ChangeRequestResponse {
    fn from(model: trainer_change_request::Model) -> Self {
        Self {
            id: model.id,
            client_id: model.client_id,
            requested_trainer_id: model.requested_trainer_id,
            reason: model.reason,
            status: model.status,
            requested_at: model.requested_at,
            processed_at: model.processed_at,
            processed_by: model.processed_by,
            decision_note: model.decision_note,
        }
    }
}

/// A pending request as listed for admins
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PendingChangeRequestResponse {
    pub request: ChangeRequestResponse,
    pub client: Option<UserResponse>,
    pub requested_trainer: Option<UserSummary>,
}

impl From<PendingChangeRequest> for PendingChangeRequestResponse {
    fn from(pending: PendingChangeRequest) -> Self {
        Self {
            request: ChangeRequestResponse::from(pending.request),
            client: pending.client.map(UserResponse::from),
            requested_trainer: pending.requested_trainer.map(UserSummary::from),
        }
    }
}

/// Outcome of an admin decision
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProcessedChangeResponse {
    pub request: ChangeRequestResponse,
    pub client: UserResponse,
}

/// Request body for a client asking to change trainer
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct TrainerChangeRequest {
    pub requested_trainer_id: i32,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Request body for approving or rejecting a change request
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct ProcessChangeRequest {
    pub approved: bool,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Query parameters for the pending change requests
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct ChangeRequestQuery {
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
}

/// Ask for a different trainer (clients only)
///
/// Only one request can be pending at a time.
#[utoipa::path(
    post,
    path = "/api/v1/users/client/request-trainer-change",
    tag = "change-requests",
    security(("bearer_auth" = [])),
    request_body = TrainerChangeRequest,
    responses(
        (status = 201, description = "Change request submitted", body = ApiResponse<ChangeRequestResponse>),
        (status = 400, description = "A request is already pending", body = ErrorResponse),
        (status = 404, description = "Trainer not found or not approved", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn request_trainer_change(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(request): ValidatedJson<TrainerChangeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ChangeRequestResponse>>), ApiError> {
    trace!("Entering request_trainer_change function");
    let client = current.require_client()?;

    let created = assignment::request_trainer_change(
        &state.db,
        client.id,
        request.requested_trainer_id,
        request.reason,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            ChangeRequestResponse::from(created),
            "Trainer change request submitted successfully",
        )),
    ))
}

/// List pending change requests (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/users/admin/trainer-change-requests",
    tag = "change-requests",
    security(("bearer_auth" = [])),
    params(ChangeRequestQuery),
    responses(
        (status = 200, description = "Pending requests retrieved", body = ApiResponse<Page<PendingChangeRequestResponse>>),
        (status = 403, description = "Not an admin", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn get_change_requests(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedQuery(query): ValidatedQuery<ChangeRequestQuery>,
) -> Result<Json<ApiResponse<Page<PendingChangeRequestResponse>>>, ApiError> {
    trace!("Entering get_change_requests function");
    current.require_admin()?;

    let (page, limit) = page_params(query.page, query.limit, DEFAULT_PAGE_LIMIT);
    let pending = assignment::pending_change_requests(&state.db, page, limit).await?;
    debug!("Returning {} pending change requests", pending.items.len());

    Ok(Json(ApiResponse::ok(
        pending.map(PendingChangeRequestResponse::from),
        "Change requests retrieved successfully",
    )))
}

/// Approve or reject a client's pending change request (admin only)
///
/// Approval reassigns the client to the requested trainer.
#[utoipa::path(
    put,
    path = "/api/v1/users/admin/trainer-change/{client_id}",
    tag = "change-requests",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = i32, Path, description = "Client ID"),
    ),
    request_body = ProcessChangeRequest,
    responses(
        (status = 200, description = "Change request processed", body = ApiResponse<ProcessedChangeResponse>),
        (status = 404, description = "No pending request", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn process_trainer_change(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(client_id): Path<i32>,
    ValidatedJson(request): ValidatedJson<ProcessChangeRequest>,
) -> Result<Json<ApiResponse<ProcessedChangeResponse>>, ApiError> {
    trace!("Entering process_trainer_change function");
    let admin = current.require_admin()?;

    let processed = assignment::process_trainer_change(
        &state.db,
        admin.id,
        client_id,
        request.approved,
        request.reason,
    )
    .await?;

    let verb = if request.approved { "approved" } else { "rejected" };
    info!("Change request of client {} {}", client_id, verb);
    Ok(Json(ApiResponse::ok(
        ProcessedChangeResponse {
            request: ChangeRequestResponse::from(processed.request),
            client: UserResponse::from(processed.client),
        },
        format!("Trainer change request {verb} successfully"),
    )))
}
