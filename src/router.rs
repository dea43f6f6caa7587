use crate::handlers::{
    auth::{login, logout, refresh, register, verify},
    change_requests::{get_change_requests, process_trainer_change, request_trainer_change},
    client_workouts::{create_log, get_client_plan, get_client_plans, get_logs, get_today},
    exercises::{create_exercise, get_exercises, toggle_exercise},
    health::health_check,
    plans::{create_plan, get_plan, get_plans, toggle_plan, update_plan},
    statistics::{client_stats, trainer_stats},
    trainers::{approve_trainer, assign_client, get_trainer_clients},
    users::{
        get_profile, get_trainers, get_user, get_users, toggle_user_status, update_profile,
        update_trainer_profile,
    },
};
use crate::schemas::{ApiDoc, AppState};
use crate::error::render_error_details;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let error_details = middleware::from_fn_with_state(state.settings.clone(), render_error_details);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/verify", get(verify))
        .route("/api/v1/auth/refresh", post(refresh))
        .route("/api/v1/auth/logout", post(logout))
        // Profiles and user directory
        .route("/api/v1/users", get(get_users))
        .route("/api/v1/users/profile", get(get_profile).put(update_profile))
        .route("/api/v1/users/profile/trainer", put(update_trainer_profile))
        .route("/api/v1/users/trainers", get(get_trainers))
        .route("/api/v1/users/:user_id", get(get_user))
        // Trainer assignment and change requests
        .route("/api/v1/users/trainer/clients", get(get_trainer_clients))
        .route("/api/v1/users/trainer/assign-client", post(assign_client))
        .route("/api/v1/users/trainer/:trainer_id/approve", put(approve_trainer))
        .route("/api/v1/users/client/request-trainer-change", post(request_trainer_change))
        .route("/api/v1/users/admin/trainer-change-requests", get(get_change_requests))
        .route("/api/v1/users/admin/trainer-change/:client_id", put(process_trainer_change))
        .route("/api/v1/users/admin/user/:user_id/toggle-status", put(toggle_user_status))
        // Trainer workout authoring
        .route("/api/v1/workouts/plans", post(create_plan).get(get_plans))
        .route("/api/v1/workouts/plans/:plan_id", get(get_plan).put(update_plan))
        .route("/api/v1/workouts/plans/:plan_id/toggle", put(toggle_plan))
        .route("/api/v1/workouts/exercises", get(get_exercises).post(create_exercise))
        .route("/api/v1/workouts/exercises/:exercise_id/toggle", put(toggle_exercise))
        .route("/api/v1/workouts/stats", get(trainer_stats))
        // Client workouts
        .route("/api/v1/client/plans", get(get_client_plans))
        .route("/api/v1/client/plans/:plan_id", get(get_client_plan))
        .route("/api/v1/client/today", get(get_today))
        .route("/api/v1/client/logs", post(create_log).get(get_logs))
        .route("/api/v1/client/stats", get(client_stats))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(error_details)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
