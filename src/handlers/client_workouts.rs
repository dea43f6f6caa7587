use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::plans::{list_plans, PlanDetailResponse, PlanListQuery, PlanResponse, SessionResponse};
use crate::handlers::statistics::invalidate_stats;
use crate::handlers::{page_params, DEFAULT_PAGE_LIMIT};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::validation::{ValidatedJson, ValidatedQuery};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use common::{Page, Pagination};
use domain::plans;
use domain::progress::{self, LogEntry};
use model::entities::{workout_log, workout_plan, workout_session::DayOfWeek};
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// One performed set
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct LoggedSet {
    #[validate(range(min = 0, max = 1000))]
    pub reps: Option<i32>,
    /// Kilograms
    #[validate(range(min = 0.0, max = 1000.0))]
    pub weight: Option<f64>,
    /// Seconds
    #[validate(range(min = 0, max = 36000))]
    pub duration: Option<i32>,
    #[serde(default = "completed_by_default")]
    pub completed: bool,
}

fn completed_by_default() -> bool {
    true
}

/// What the client actually did for one exercise of the session
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct LoggedExercise {
    pub exercise_id: i32,
    #[serde(default)]
    #[validate(nested)]
    pub sets: Vec<LoggedSet>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Request body for logging a completed session
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateLogRequest {
    pub plan_id: i32,
    pub session_id: i32,
    #[validate(range(min = 1, max = 52))]
    pub week: i32,
    /// Defaults to now
    pub completed_at: Option<NaiveDateTime>,
    /// Minutes
    #[validate(range(min = 1, max = 600))]
    pub actual_duration: Option<i32>,
    #[validate(nested)]
    pub exercises: Option<Vec<LoggedExercise>>,
    #[validate(length(max = 1000))]
    pub overall_notes: Option<String>,
    /// 1 (easy) to 10 (exhausting)
    #[validate(range(min = 1, max = 10))]
    pub difficulty: Option<i32>,
    #[validate(range(min = 1, max = 10))]
    pub energy: Option<i32>,
    #[validate(range(min = 1, max = 10))]
    pub mood: Option<i32>,
    /// 0 (none) to 10
    #[validate(range(min = 0, max = 10))]
    pub pain_level: Option<i32>,
}

/// Query parameters for the workout history
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct LogListQuery {
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
    #[validate(range(min = 1, max = 52))]
    pub week: Option<i32>,
    #[param(value_type = Option<String>)]
    pub day_of_week: Option<DayOfWeek>,
    /// Only applied together with `end_date`
    pub start_date: Option<NaiveDate>,
    /// Inclusive; only applied together with `start_date`
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkoutLogResponse {
    pub id: i32,
    pub client_id: i32,
    pub trainer_id: i32,
    pub plan_id: i32,
    pub session_id: i32,
    pub week: i32,
    #[schema(value_type = String, example = "monday")]
    pub day_of_week: DayOfWeek,
    pub completed_at: NaiveDateTime,
    pub actual_duration: Option<i32>,
    #[schema(value_type = Option<Vec<LoggedExercise>>)]
    pub exercises: Option<serde_json::Value>,
    pub overall_notes: Option<String>,
    pub difficulty: Option<i32>,
    pub energy: Option<i32>,
    pub mood: Option<i32>,
    pub pain_level: Option<i32>,
    pub is_completed: bool,
}

impl From<workout_log::Model> for WorkoutLogResponse {
    fn from(model: workout_log::Model) -> Self {
        Self {
            id: model.id,
            client_id: model.client_id,
            trainer_id: model.trainer_id,
            plan_id: model.plan_id,
            session_id: model.session_id,
            week: model.week,
            day_of_week: model.day_of_week,
            completed_at: model.completed_at,
            actual_duration: model.actual_duration,
            exercises: model.exercises,
            overall_notes: model.overall_notes,
            difficulty: model.difficulty,
            energy: model.energy,
            mood: model.mood,
            pain_level: model.pain_level,
            is_completed: model.is_completed,
        }
    }
}

/// A stored log with the plan progress it produced
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordedLogResponse {
    pub log: WorkoutLogResponse,
    pub plan: PlanResponse,
}

/// The session scheduled for today, if any
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TodayResponse {
    #[schema(value_type = String, example = "monday")]
    pub day_of_week: DayOfWeek,
    pub plan: Option<PlanResponse>,
    pub workout: Option<SessionResponse>,
}

/// List the authenticated client's plans
#[utoipa::path(
    get,
    path = "/api/v1/client/plans",
    tag = "client",
    security(("bearer_auth" = [])),
    params(PlanListQuery),
    responses(
        (status = 200, description = "Workout plans retrieved successfully", body = ApiResponse<Page<PlanDetailResponse>>),
        (status = 403, description = "Not a client", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn get_client_plans(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedQuery(query): ValidatedQuery<PlanListQuery>,
) -> Result<Json<ApiResponse<Page<PlanDetailResponse>>>, ApiError> {
    trace!("Entering get_client_plans function");
    let client = current.require_client()?;

    let owner = Condition::all().add(workout_plan::Column::ClientId.eq(client.id));
    let data = list_plans(&state, owner, query).await?;
    Ok(Json(ApiResponse::ok(data, "Workout plans retrieved successfully")))
}

/// Get one of the authenticated client's plans
#[utoipa::path(
    get,
    path = "/api/v1/client/plans/{plan_id}",
    tag = "client",
    security(("bearer_auth" = [])),
    params(
        ("plan_id" = i32, Path, description = "Workout plan ID"),
    ),
    responses(
        (status = 200, description = "Workout plan retrieved successfully", body = ApiResponse<PlanDetailResponse>),
        (status = 404, description = "Workout plan not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn get_client_plan(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(plan_id): Path<i32>,
) -> Result<Json<ApiResponse<PlanDetailResponse>>, ApiError> {
    trace!("Entering get_client_plan function");
    let client = current.require_client()?;

    let plan = plans::find_client_plan(&state.db, client.id, plan_id).await?;
    let detail = plans::plan_detail(&state.db, plan).await?;
    Ok(Json(ApiResponse::ok(
        PlanDetailResponse::from(detail),
        "Workout plan retrieved successfully",
    )))
}

/// Today's session from the client's active plan
#[utoipa::path(
    get,
    path = "/api/v1/client/today",
    tag = "client",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Today's workout, or nothing scheduled", body = ApiResponse<TodayResponse>),
        (status = 403, description = "Not a client", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn get_today(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<ApiResponse<TodayResponse>>, ApiError> {
    trace!("Entering get_today function");
    let client = current.require_client()?;
    let day = DayOfWeek::from(Local::now().weekday());
    debug!("Looking up {:?} workout of client {}", day, client.id);

    let response = match plans::todays_workout(&state.db, client.id, day).await? {
        Some(today) => ApiResponse::ok(
            TodayResponse {
                day_of_week: day,
                plan: Some(PlanResponse::from(today.plan)),
                workout: Some(SessionResponse::from(today.session)),
            },
            "Today's workout retrieved successfully",
        ),
        None => ApiResponse::ok(
            TodayResponse {
                day_of_week: day,
                plan: None,
                workout: None,
            },
            "No workout scheduled for today",
        ),
    };
    Ok(Json(response))
}

/// Log a completed session and update the plan's progress
#[utoipa::path(
    post,
    path = "/api/v1/client/logs",
    tag = "client",
    security(("bearer_auth" = [])),
    request_body = CreateLogRequest,
    responses(
        (status = 201, description = "Workout logged successfully", body = ApiResponse<RecordedLogResponse>),
        (status = 400, description = "Invalid input data or week out of range", body = ErrorResponse),
        (status = 404, description = "Plan or session not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(plan_id = request.plan_id, week = request.week))]
pub async fn create_log(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateLogRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RecordedLogResponse>>), ApiError> {
    trace!("Entering create_log function");
    let client = current.require_client()?;

    let exercises = request
        .exercises
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| ApiError::internal(format!("Failed to encode logged exercises: {e}")))?;

    let entry = LogEntry {
        plan_id: request.plan_id,
        session_id: request.session_id,
        week: request.week,
        completed_at: request.completed_at,
        actual_duration: request.actual_duration,
        exercises,
        overall_notes: request.overall_notes,
        difficulty: request.difficulty,
        energy: request.energy,
        mood: request.mood,
        pain_level: request.pain_level,
    };

    let recorded = progress::record_log(&state.db, client.id, entry).await?;
    invalidate_stats(&state, recorded.plan.trainer_id, client.id).await;
    info!("Workout {} logged by client {}", recorded.log.id, client.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            RecordedLogResponse {
                log: WorkoutLogResponse::from(recorded.log),
                plan: PlanResponse::from(recorded.plan),
            },
            "Workout logged successfully",
        )),
    ))
}

/// `[start 00:00, end + 1 day 00:00)`, so `end` is inclusive.
fn day_range(start: NaiveDate, end: NaiveDate) -> Result<(NaiveDateTime, NaiveDateTime), ApiError> {
    let until = end
        .and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::days(1))
        .ok_or_else(|| ApiError::validation("end_date is out of range"))?;
    Ok((start.and_time(NaiveTime::MIN), until))
}

/// Workout history of the authenticated client, newest first
#[utoipa::path(
    get,
    path = "/api/v1/client/logs",
    tag = "client",
    security(("bearer_auth" = [])),
    params(LogListQuery),
    responses(
        (status = 200, description = "Workout history retrieved successfully", body = ApiResponse<Page<WorkoutLogResponse>>),
        (status = 403, description = "Not a client", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn get_logs(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedQuery(query): ValidatedQuery<LogListQuery>,
) -> Result<Json<ApiResponse<Page<WorkoutLogResponse>>>, ApiError> {
    trace!("Entering get_logs function");
    let client = current.require_client()?;

    let (page, limit) = page_params(query.page, query.limit, DEFAULT_PAGE_LIMIT);

    let mut condition = Condition::all().add(workout_log::Column::ClientId.eq(client.id));
    if let Some(week) = query.week {
        condition = condition.add(workout_log::Column::Week.eq(week));
    }
    if let Some(day) = query.day_of_week {
        condition = condition.add(workout_log::Column::DayOfWeek.eq(day));
    }
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        let (from, until) = day_range(start, end)?;
        condition = condition
            .add(workout_log::Column::CompletedAt.gte(from))
            .add(workout_log::Column::CompletedAt.lt(until));
    }

    let paginator = workout_log::Entity::find()
        .filter(condition)
        .order_by_desc(workout_log::Column::CompletedAt)
        .order_by_desc(workout_log::Column::Id)
        .paginate(&state.db, limit);
    let total = paginator.num_items().await?;
    let logs = paginator.fetch_page(page - 1).await?;
    debug!("Retrieved {} of {} workout logs", logs.len(), total);

    let data = Page::new(
        logs.into_iter().map(WorkoutLogResponse::from).collect(),
        Pagination::new(page, limit, total),
    );
    Ok(Json(ApiResponse::ok(data, "Workout history retrieved successfully")))
}
