use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::change_requests::ChangeRequestResponse;
use crate::handlers::{page_params, DEFAULT_PAGE_LIMIT};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::validation::{ValidatedJson, ValidatedQuery};
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use common::{Page, Pagination};
use model::entities::user::{self, Gender, Role};
use model::lists;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Public profile of an account. Security fields are never exposed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "female")]
    pub gender: Option<Gender>,
    #[schema(value_type = String, example = "client")]
    pub role: Role,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_approved: bool,
    pub approved_at: Option<NaiveDateTime>,
    pub assigned_trainer_id: Option<i32>,
    pub specialization: Vec<String>,
    pub certifications: Vec<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i32>,
    pub last_login: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            full_name: model.full_name(),
            specialization: lists::decode(&model.specialization),
            certifications: lists::decode(&model.certifications),
            id: model.id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            phone: model.phone,
            date_of_birth: model.date_of_birth,
            gender: model.gender,
            role: model.role,
            is_active: model.is_active,
            is_verified: model.is_verified,
            is_approved: model.is_approved,
            approved_at: model.approved_at,
            assigned_trainer_id: model.assigned_trainer_id,
            bio: model.bio,
            experience_years: model.experience_years,
            last_login: model.last_login,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Short form of an account, embedded in plans and change requests.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

impl From<user::Model> for UserSummary {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            phone: model.phone,
        }
    }
}

/// Own profile with the assignment context.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub assigned_trainer: Option<UserSummary>,
    /// Most recent trainer change request of a client, whatever its status
    pub trainer_change_request: Option<ChangeRequestResponse>,
}

/// Request body for updating the own profile
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 30))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub gender: Option<Gender>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
}

/// Request body for the trainer-only profile fields
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateTrainerProfileRequest {
    pub specialization: Option<Vec<String>>,
    pub certifications: Option<Vec<String>>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    #[validate(range(min = 0, max = 70))]
    pub experience_years: Option<i32>,
}

/// Request body for activating or deactivating an account
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct ToggleStatusRequest {
    pub is_active: bool,
}

/// Query parameters for listing accounts
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct UserListQuery {
    /// Page number (default: 1)
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    /// Page size (default: 10)
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
    #[param(value_type = Option<String>)]
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub is_approved: Option<bool>,
    /// Matches first name, last name, username or email
    #[validate(length(max = 100))]
    pub search: Option<String>,
}

/// Query parameters for listing trainers
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct TrainerListQuery {
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
    pub is_approved: Option<bool>,
    /// Matches names, username or a specialization
    #[validate(length(max = 100))]
    pub search: Option<String>,
}

pub(crate) async fn find_user(state: &AppState, user_id: i32) -> Result<user::Model, ApiError> {
    user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("User with ID {} not found", user_id);
            ApiError::not_found("User not found")
        })
}

/// Conflict when another account already uses `username` or `email`.
pub(crate) async fn ensure_unique_identity(
    state: &AppState,
    username: Option<&str>,
    email: Option<&str>,
    exclude_id: Option<i32>,
) -> Result<(), ApiError> {
    let mut any = Condition::any();
    if let Some(username) = username {
        any = any.add(user::Column::Username.eq(username));
    }
    if let Some(email) = email {
        any = any.add(user::Column::Email.eq(email));
    }
    if username.is_none() && email.is_none() {
        return Ok(());
    }

    let mut query = user::Entity::find().filter(any);
    if let Some(id) = exclude_id {
        query = query.filter(user::Column::Id.ne(id));
    }

    if let Some(existing) = query.one(&state.db).await? {
        let message = if email.is_some_and(|e| e == existing.email) {
            "Email already registered"
        } else {
            "Username already exists"
        };
        warn!("{}", message);
        return Err(ApiError::Conflict(message.to_string()));
    }
    Ok(())
}

/// Get the profile of the authenticated account
#[utoipa::path(
    get,
    path = "/api/v1/users/profile",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<ProfileResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(user_id = current.id()))]
pub async fn get_profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    trace!("Entering get_profile function");
    let account = current.0;

    let assigned_trainer = match account.assigned_trainer_id {
        Some(trainer_id) => user::Entity::find_by_id(trainer_id)
            .one(&state.db)
            .await?
            .map(UserSummary::from),
        None => None,
    };

    let trainer_change_request = if account.role == Role::Client {
        domain::assignment::latest_change_request(&state.db, account.id)
            .await?
            .map(ChangeRequestResponse::from)
    } else {
        None
    };

    Ok(Json(ApiResponse::ok(
        ProfileResponse {
            user: UserResponse::from(account),
            assigned_trainer,
            trainer_change_request,
        },
        "Profile retrieved successfully",
    )))
}

/// Update the profile of the authenticated account
///
/// Role, password and status flags cannot be changed through this endpoint.
#[utoipa::path(
    put,
    path = "/api/v1/users/profile",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 409, description = "Username or email already in use", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(user_id = current.id()))]
pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    trace!("Entering update_profile function");
    let account = current.0;

    ensure_unique_identity(
        &state,
        request.username.as_deref().filter(|u| *u != account.username),
        request.email.as_deref().filter(|e| *e != account.email),
        Some(account.id),
    )
    .await?;

    let mut active: user::ActiveModel = account.into();
    let mut updated_fields = Vec::new();

    if let Some(username) = request.username {
        active.username = Set(username);
        updated_fields.push("username");
    }
    if let Some(email) = request.email {
        active.email = Set(email);
        updated_fields.push("email");
    }
    if let Some(first_name) = request.first_name {
        active.first_name = Set(first_name);
        updated_fields.push("first_name");
    }
    if let Some(last_name) = request.last_name {
        active.last_name = Set(last_name);
        updated_fields.push("last_name");
    }
    if let Some(phone) = request.phone {
        active.phone = Set(Some(phone));
        updated_fields.push("phone");
    }
    if let Some(date_of_birth) = request.date_of_birth {
        active.date_of_birth = Set(Some(date_of_birth));
        updated_fields.push("date_of_birth");
    }
    if let Some(gender) = request.gender {
        active.gender = Set(Some(gender));
        updated_fields.push("gender");
    }
    if let Some(bio) = request.bio {
        active.bio = Set(Some(bio));
        updated_fields.push("bio");
    }
    active.updated_at = Set(domain::now());

    let updated = active.update(&state.db).await?;
    info!("Profile of user {} updated. Updated fields: {:?}", updated.id, updated_fields);

    Ok(Json(ApiResponse::ok(
        UserResponse::from(updated),
        "Profile updated successfully",
    )))
}

/// Update the trainer-specific profile fields
#[utoipa::path(
    put,
    path = "/api/v1/users/profile/trainer",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = UpdateTrainerProfileRequest,
    responses(
        (status = 200, description = "Trainer profile updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 403, description = "Not a trainer", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(user_id = current.id()))]
pub async fn update_trainer_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(request): ValidatedJson<UpdateTrainerProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    trace!("Entering update_trainer_profile function");
    current.require_trainer()?;

    let mut active: user::ActiveModel = current.0.into();
    if let Some(specialization) = request.specialization {
        active.specialization = Set(lists::encode(&specialization));
    }
    if let Some(certifications) = request.certifications {
        active.certifications = Set(lists::encode(&certifications));
    }
    if let Some(bio) = request.bio {
        active.bio = Set(Some(bio));
    }
    if let Some(experience_years) = request.experience_years {
        active.experience_years = Set(Some(experience_years));
    }
    active.updated_at = Set(domain::now());

    let updated = active.update(&state.db).await?;
    info!("Trainer profile of user {} updated", updated.id);

    Ok(Json(ApiResponse::ok(
        UserResponse::from(updated),
        "Trainer profile updated successfully",
    )))
}

/// List accounts (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserListQuery),
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Page<UserResponse>>),
        (status = 403, description = "Not an admin", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn get_users(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedQuery(query): ValidatedQuery<UserListQuery>,
) -> Result<Json<ApiResponse<Page<UserResponse>>>, ApiError> {
    trace!("Entering get_users function");
    current.require_admin()?;

    let (page, limit) = page_params(query.page, query.limit, DEFAULT_PAGE_LIMIT);
    debug!("Fetching users - page: {}, limit: {}", page, limit);

    let mut condition = Condition::all();
    if let Some(role) = query.role {
        condition = condition.add(user::Column::Role.eq(role));
    }
    if let Some(is_active) = query.is_active {
        condition = condition.add(user::Column::IsActive.eq(is_active));
    }
    if let Some(is_approved) = query.is_approved {
        condition = condition.add(user::Column::IsApproved.eq(is_approved));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(user::Column::FirstName.contains(search))
                .add(user::Column::LastName.contains(search))
                .add(user::Column::Username.contains(search))
                .add(user::Column::Email.contains(search)),
        );
    }

    let paginator = user::Entity::find()
        .filter(condition)
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .paginate(&state.db, limit);
    let total = paginator.num_items().await?;
    let users = paginator.fetch_page(page - 1).await?;
    info!("Successfully retrieved {} of {} users", users.len(), total);

    let data = Page::new(
        users.into_iter().map(UserResponse::from).collect(),
        Pagination::new(page, limit, total),
    );
    Ok(Json(ApiResponse::ok(data, "Users retrieved successfully")))
}

/// List trainers
#[utoipa::path(
    get,
    path = "/api/v1/users/trainers",
    tag = "users",
    security(("bearer_auth" = [])),
    params(TrainerListQuery),
    responses(
        (status = 200, description = "Trainers retrieved successfully", body = ApiResponse<Page<UserResponse>>)
    )
)]
#[instrument(skip(state, _current))]
pub async fn get_trainers(
    State(state): State<AppState>,
    _current: CurrentUser,
    ValidatedQuery(query): ValidatedQuery<TrainerListQuery>,
) -> Result<Json<ApiResponse<Page<UserResponse>>>, ApiError> {
    trace!("Entering get_trainers function");

    let (page, limit) = page_params(query.page, query.limit, DEFAULT_PAGE_LIMIT);

    let mut condition = Condition::all().add(user::Column::Role.eq(Role::Trainer));
    if let Some(is_approved) = query.is_approved {
        condition = condition.add(user::Column::IsApproved.eq(is_approved));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(user::Column::FirstName.contains(search))
                .add(user::Column::LastName.contains(search))
                .add(user::Column::Username.contains(search))
                .add(lists::contains_text(user::Column::Specialization, search)),
        );
    }

    let paginator = user::Entity::find()
        .filter(condition)
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .paginate(&state.db, limit);
    let total = paginator.num_items().await?;
    let trainers = paginator.fetch_page(page - 1).await?;
    debug!("Retrieved {} of {} trainers", trainers.len(), total);

    let data = Page::new(
        trainers.into_iter().map(UserResponse::from).collect(),
        Pagination::new(page, limit, total),
    );
    Ok(Json(ApiResponse::ok(data, "Trainers retrieved successfully")))
}

/// Get an account by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, _current))]
pub async fn get_user(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    trace!("Entering get_user function for user_id: {}", user_id);
    let account = find_user(&state, user_id).await?;
    Ok(Json(ApiResponse::ok(
        UserResponse::from(account),
        "User retrieved successfully",
    )))
}

/// Activate or deactivate an account (admin only)
#[utoipa::path(
    put,
    path = "/api/v1/users/admin/user/{user_id}/toggle-status",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = ToggleStatusRequest,
    responses(
        (status = 200, description = "User status changed", body = ApiResponse<UserResponse>),
        (status = 400, description = "Own account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn toggle_user_status(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(user_id): Path<i32>,
    ValidatedJson(request): ValidatedJson<ToggleStatusRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    trace!("Entering toggle_user_status function");
    let admin = current.require_admin()?;
    if admin.id == user_id {
        return Err(ApiError::validation("Cannot change the status of your own account"));
    }

    let account = find_user(&state, user_id).await?;
    let mut active: user::ActiveModel = account.into();
    active.is_active = Set(request.is_active);
    active.updated_at = Set(domain::now());
    let updated = active.update(&state.db).await?;

    let verb = if request.is_active { "activated" } else { "deactivated" };
    info!("User {} {} by admin {}", updated.id, verb, admin.id);
    Ok(Json(ApiResponse::ok(
        UserResponse::from(updated),
        format!("User {verb} successfully"),
    )))
}
