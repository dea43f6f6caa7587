use std::sync::Arc;

use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};

use crate::auth::JwtService;
use crate::config::Settings;
use crate::handlers::{
    auth::{AuthResponse, LoginRequest, LogoutResponse, RegisterRequest, VerifyResponse},
    change_requests::{
        ChangeRequestResponse, PendingChangeRequestResponse, ProcessChangeRequest,
        ProcessedChangeResponse, TrainerChangeRequest,
    },
    client_workouts::{
        CreateLogRequest, LoggedExercise, LoggedSet, RecordedLogResponse, TodayResponse,
        WorkoutLogResponse,
    },
    exercises::{CreateExerciseRequest, ExerciseResponse, ToggleExerciseRequest},
    plans::{
        CreatePlanRequest, PlanDetailResponse, PlanResponse, SessionExerciseInput, SessionInput,
        SessionResponse, SlotResponse, TogglePlanRequest, UpdatePlanRequest,
    },
    statistics::{ClientStatsResponse, TrainerStatsResponse},
    trainers::{ApproveTrainerRequest, AssignClientRequest, AssignmentResponse},
    users::{
        ProfileResponse, ToggleStatusRequest, UpdateProfileRequest, UpdateTrainerProfileRequest,
        UserResponse, UserSummary,
    },
};

pub use common::{ApiResponse, Page, Pagination};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Short-lived cache of statistics responses
    pub cache: Cache<String, CachedData>,
    pub jwt: JwtService,
    pub settings: Arc<Settings>,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    TrainerStats(TrainerStatsResponse),
    ClientStats(ClientStatsResponse),
}

/// One rejected request field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Success status (always false for errors)
    pub success: bool,
    /// Human readable message
    pub message: String,
    /// Error code, e.g. `NOT_FOUND`
    pub code: String,
    /// Field level validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    /// Internal detail, only in development
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::verify,
        crate::handlers::auth::refresh,
        crate::handlers::auth::logout,
        crate::handlers::users::get_profile,
        crate::handlers::users::update_profile,
        crate::handlers::users::update_trainer_profile,
        crate::handlers::users::get_users,
        crate::handlers::users::get_trainers,
        crate::handlers::users::get_user,
        crate::handlers::users::toggle_user_status,
        crate::handlers::trainers::get_trainer_clients,
        crate::handlers::trainers::assign_client,
        crate::handlers::trainers::approve_trainer,
        crate::handlers::change_requests::request_trainer_change,
        crate::handlers::change_requests::get_change_requests,
        crate::handlers::change_requests::process_trainer_change,
        crate::handlers::plans::create_plan,
        crate::handlers::plans::get_plans,
        crate::handlers::plans::get_plan,
        crate::handlers::plans::update_plan,
        crate::handlers::plans::toggle_plan,
        crate::handlers::exercises::get_exercises,
        crate::handlers::exercises::create_exercise,
        crate::handlers::exercises::toggle_exercise,
        crate::handlers::statistics::trainer_stats,
        crate::handlers::statistics::client_stats,
        crate::handlers::client_workouts::get_client_plans,
        crate::handlers::client_workouts::get_client_plan,
        crate::handlers::client_workouts::get_today,
        crate::handlers::client_workouts::create_log,
        crate::handlers::client_workouts::get_logs,
    ),
    components(
        schemas(
            ErrorResponse,
            FieldError,
            HealthResponse,
            Pagination,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            VerifyResponse,
            LogoutResponse,
            UserResponse,
            UserSummary,
            ProfileResponse,
            UpdateProfileRequest,
            UpdateTrainerProfileRequest,
            ToggleStatusRequest,
            AssignClientRequest,
            AssignmentResponse,
            ApproveTrainerRequest,
            TrainerChangeRequest,
            ProcessChangeRequest,
            ChangeRequestResponse,
            PendingChangeRequestResponse,
            ProcessedChangeResponse,
            CreatePlanRequest,
            UpdatePlanRequest,
            TogglePlanRequest,
            SessionInput,
            SessionExerciseInput,
            PlanResponse,
            PlanDetailResponse,
            SessionResponse,
            SlotResponse,
            CreateExerciseRequest,
            ToggleExerciseRequest,
            ExerciseResponse,
            CreateLogRequest,
            LoggedExercise,
            LoggedSet,
            WorkoutLogResponse,
            RecordedLogResponse,
            TodayResponse,
            TrainerStatsResponse,
            ClientStatsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login and tokens"),
        (name = "users", description = "Profiles and user directory"),
        (name = "trainers", description = "Trainer and client assignment"),
        (name = "admin", description = "Administrative actions"),
        (name = "change-requests", description = "Trainer change requests"),
        (name = "plans", description = "Workout plan authoring"),
        (name = "exercises", description = "Exercise catalog"),
        (name = "statistics", description = "Trainer statistics"),
        (name = "client", description = "Client workouts, logs and statistics"),
    ),
    info(
        title = "GymRust API",
        description = "Personal training backend: trainers, clients, workout plans and progress tracking",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
