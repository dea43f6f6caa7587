use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::users::UserResponse;
use crate::handlers::{page_params, DEFAULT_PAGE_LIMIT};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::validation::{ValidatedJson, ValidatedQuery};
use axum::{
    extract::{Path, State},
    response::Json,
};
use common::{Page, Pagination};
use domain::assignment;
use model::entities::user::{self, Role};
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters for a trainer's client list
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct ClientListQuery {
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
    /// Matches first name, last name or username
    #[validate(length(max = 100))]
    pub search: Option<String>,
}

/// Request body for binding a client to a trainer
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct AssignClientRequest {
    pub client_id: i32,
    /// Required for admins; trainers may only assign to themselves
    pub trainer_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentResponse {
    pub client: UserResponse,
    pub trainer: UserResponse,
}

/// Request body for approving or revoking a trainer
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct ApproveTrainerRequest {
    pub is_approved: bool,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Clients assigned to the authenticated trainer
#[utoipa::path(
    get,
    path = "/api/v1/users/trainer/clients",
    tag = "trainers",
    security(("bearer_auth" = [])),
    params(ClientListQuery),
    responses(
        (status = 200, description = "Clients retrieved successfully", body = ApiResponse<Page<UserResponse>>),
        (status = 403, description = "Not a trainer", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn get_trainer_clients(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedQuery(query): ValidatedQuery<ClientListQuery>,
) -> Result<Json<ApiResponse<Page<UserResponse>>>, ApiError> {
    trace!("Entering get_trainer_clients function");
    let trainer = current.require_trainer()?;

    let (page, limit) = page_params(query.page, query.limit, DEFAULT_PAGE_LIMIT);

    let mut condition = Condition::all()
        .add(user::Column::Role.eq(Role::Client))
        .add(user::Column::AssignedTrainerId.eq(trainer.id));
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(user::Column::FirstName.contains(search))
                .add(user::Column::LastName.contains(search))
                .add(user::Column::Username.contains(search)),
        );
    }

    let paginator = user::Entity::find()
        .filter(condition)
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .paginate(&state.db, limit);
    let total = paginator.num_items().await?;
    let clients = paginator.fetch_page(page - 1).await?;
    debug!("Trainer {} has {} clients", trainer.id, total);

    let data = Page::new(
        clients.into_iter().map(UserResponse::from).collect(),
        Pagination::new(page, limit, total),
    );
    Ok(Json(ApiResponse::ok(data, "Clients retrieved successfully")))
}

/// Bind a client to an approved trainer
#[utoipa::path(
    post,
    path = "/api/v1/users/trainer/assign-client",
    tag = "trainers",
    security(("bearer_auth" = [])),
    request_body = AssignClientRequest,
    responses(
        (status = 200, description = "Client assigned", body = ApiResponse<AssignmentResponse>),
        (status = 403, description = "Trainer assigning to someone else", body = ErrorResponse),
        (status = 404, description = "Client not found, or trainer not found or not approved", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn assign_client(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(request): ValidatedJson<AssignClientRequest>,
) -> Result<Json<ApiResponse<AssignmentResponse>>, ApiError> {
    trace!("Entering assign_client function");
    let caller = current.require_trainer_or_admin()?;

    let trainer_id = match (caller.role, request.trainer_id) {
        (Role::Admin, Some(trainer_id)) => trainer_id,
        (Role::Admin, None) => return Err(ApiError::validation("trainer_id is required")),
        (_, Some(trainer_id)) if trainer_id != caller.id => {
            warn!("Trainer {} tried to assign a client to trainer {}", caller.id, trainer_id);
            return Err(ApiError::forbidden("Trainers can only assign clients to themselves"));
        }
        _ => caller.id,
    };

    let assigned = assignment::assign_client(&state.db, request.client_id, trainer_id).await?;
    info!("Client {} assigned to trainer {}", assigned.client.id, assigned.trainer.id);

    Ok(Json(ApiResponse::ok(
        AssignmentResponse {
            client: UserResponse::from(assigned.client),
            trainer: UserResponse::from(assigned.trainer),
        },
        "Client assigned to trainer successfully",
    )))
}

/// Approve or revoke a trainer account (admin only)
#[utoipa::path(
    put,
    path = "/api/v1/users/trainer/{trainer_id}/approve",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("trainer_id" = i32, Path, description = "Trainer ID"),
    ),
    request_body = ApproveTrainerRequest,
    responses(
        (status = 200, description = "Trainer approval changed", body = ApiResponse<UserResponse>),
        (status = 404, description = "Trainer not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn approve_trainer(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trainer_id): Path<i32>,
    ValidatedJson(request): ValidatedJson<ApproveTrainerRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    trace!("Entering approve_trainer function");
    let admin = current.require_admin()?;

    let trainer = assignment::approve_trainer(
        &state.db,
        admin.id,
        trainer_id,
        request.is_approved,
        request.reason,
    )
    .await?;

    let verb = if request.is_approved { "approved" } else { "rejected" };
    Ok(Json(ApiResponse::ok(
        UserResponse::from(trainer),
        format!("Trainer {verb} successfully"),
    )))
}
