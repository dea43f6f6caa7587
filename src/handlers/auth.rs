use crate::auth::{hash_password, verify_password, CurrentUser};
use crate::error::ApiError;
use crate::handlers::users::{ensure_unique_identity, UserResponse};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::validation::ValidatedJson;
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use model::entities::user::{self, Gender, Role};
use model::lists;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating an account
#[derive(Deserialize, Serialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 30))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub gender: Option<Gender>,
    /// `client` (default) or `trainer`
    #[schema(value_type = Option<String>, example = "client")]
    pub role: Option<Role>,
    pub specialization: Option<Vec<String>>,
    pub certifications: Option<Vec<String>>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    #[validate(range(min = 0, max = 70))]
    pub experience_years: Option<i32>,
}

/// Request body for logging in
#[derive(Deserialize, Serialize, ToSchema, Validate)]
pub struct LoginRequest {
    /// Username or email
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub logged_out_at: NaiveDateTime,
}

fn auth_response(state: &AppState, account: user::Model) -> Result<AuthResponse, ApiError> {
    Ok(AuthResponse {
        token: state.jwt.issue(&account)?,
        expires_in: state.jwt.expires_in_seconds(),
        user: UserResponse::from(account),
    })
}

/// Register a client or trainer account
///
/// Trainers start unapproved and need an admin's approval before they can
/// receive clients or author plans.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 409, description = "Username or email already in use", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    trace!("Entering register function");

    let role = request.role.unwrap_or_default();
    if role == Role::Admin {
        warn!("Rejected self-registration as admin");
        return Err(ApiError::validation("Role must be client or trainer"));
    }

    ensure_unique_identity(&state, Some(&request.username), Some(&request.email), None).await?;

    let password_hash = hash_password(&request.password, state.settings.bcrypt_cost)?;
    let now = domain::now();

    let account = user::ActiveModel {
        username: Set(request.username),
        email: Set(request.email),
        password_hash: Set(password_hash),
        first_name: Set(request.first_name),
        last_name: Set(request.last_name),
        phone: Set(request.phone),
        date_of_birth: Set(request.date_of_birth),
        gender: Set(request.gender),
        role: Set(role),
        is_active: Set(true),
        is_verified: Set(false),
        is_approved: Set(role != Role::Trainer),
        specialization: Set(lists::encode(&request.specialization.unwrap_or_default())),
        certifications: Set(lists::encode(&request.certifications.unwrap_or_default())),
        bio: Set(request.bio),
        experience_years: Set(request.experience_years),
        login_attempts: Set(0),
        last_login: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!("User {} registered with role {}", account.id, account.role.as_str());
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            auth_response(&state, account)?,
            "User registered successfully",
        )),
    ))
}

/// Log in with username or email
///
/// Repeated failures lock the account for a while.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials or deactivated account", body = ErrorResponse),
        (status = 423, description = "Account temporarily locked", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(login = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    trace!("Entering login function");

    let account = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(&request.username))
                .add(user::Column::Email.eq(&request.username)),
        )
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("Login for unknown account");
            ApiError::unauthorized("Invalid credentials")
        })?;

    let now = domain::now();
    if account.is_locked(now) {
        warn!("Login attempt on locked account {}", account.id);
        return Err(ApiError::Locked(
            "Account temporarily locked due to too many failed login attempts".to_string(),
        ));
    }
    if !account.is_active {
        warn!("Login attempt on deactivated account {}", account.id);
        return Err(ApiError::unauthorized("Account is deactivated"));
    }

    if !verify_password(&request.password, &account.password_hash) {
        record_failed_login(&state, account, now).await?;
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let mut active: user::ActiveModel = account.into();
    active.login_attempts = Set(0);
    active.lock_until = Set(None);
    active.last_login = Set(Some(now));
    let account = active.update(&state.db).await?;

    info!("User {} logged in", account.id);
    Ok(Json(ApiResponse::ok(
        auth_response(&state, account)?,
        "Login successful",
    )))
}

/// Count a failed attempt; reaching the limit locks the account.
async fn record_failed_login(state: &AppState, account: user::Model, now: NaiveDateTime) -> Result<(), ApiError> {
    let lock_expired = account.lock_until.is_some_and(|until| until <= now);
    let attempts = if lock_expired { 1 } else { account.login_attempts + 1 };
    let lock_until = (attempts >= state.settings.max_login_attempts)
        .then(|| now + Duration::minutes(state.settings.lock_minutes));

    let user_id = account.id;
    let mut active: user::ActiveModel = account.into();
    active.login_attempts = Set(attempts);
    active.lock_until = Set(lock_until);
    active.update(&state.db).await?;

    match lock_until {
        Some(until) => warn!("Account {} locked until {} after {} failed attempts", user_id, until, attempts),
        None => debug!("Failed login {} for account {}", attempts, user_id),
    }
    Ok(())
}

/// Check a token and return its account
#[utoipa::path(
    get,
    path = "/api/v1/auth/verify",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token is valid", body = ApiResponse<VerifyResponse>),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse)
    )
)]
#[instrument(skip(current), fields(user_id = current.id()))]
pub async fn verify(current: CurrentUser) -> Json<ApiResponse<VerifyResponse>> {
    Json(ApiResponse::ok(
        VerifyResponse {
            valid: true,
            user: UserResponse::from(current.0),
        },
        "Token is valid",
    ))
}

/// Issue a fresh token for the authenticated account
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token refreshed", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(user_id = current.id()))]
pub async fn refresh(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    debug!("Refreshing token");
    Ok(Json(ApiResponse::ok(
        auth_response(&state, current.0)?,
        "Token refreshed successfully",
    )))
}

/// Log out
///
/// Tokens are stateless; the client discards its copy.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<LogoutResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[instrument(skip(current), fields(user_id = current.id()))]
pub async fn logout(current: CurrentUser) -> Json<ApiResponse<LogoutResponse>> {
    info!("User {} logged out", current.id());
    Json(ApiResponse::ok(
        LogoutResponse {
            logged_out_at: domain::now(),
        },
        "Logout successful",
    ))
}
