use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::exercises::ExerciseResponse;
use crate::handlers::statistics::invalidate_stats;
use crate::handlers::users::UserSummary;
use crate::handlers::{page_params, split_csv, DEFAULT_PAGE_LIMIT};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::validation::{ValidatedJson, ValidatedQuery};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use common::{Page, Pagination};
use domain::plans::{
    self, NewPlan, NewSession, NewSessionExercise, PlanDetail, PlanUpdate, SessionDetail, SlotDetail,
};
use model::entities::{exercise::Difficulty, workout_plan, workout_session::DayOfWeek};
use model::lists;
use sea_orm::{ColumnTrait, Condition, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// One exercise slot of a session
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct SessionExerciseInput {
    pub exercise_id: i32,
    #[validate(range(min = 1, max = 50))]
    pub sets: i32,
    /// e.g. `"10"`, `"8-12"` or `"AMRAP"`
    #[validate(length(min = 1, max = 20))]
    pub reps: String,
    #[validate(length(max = 20))]
    pub weight: Option<String>,
    #[validate(range(min = 0, max = 900))]
    pub rest_seconds: Option<i32>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct SessionInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[schema(value_type = String, example = "monday")]
    pub day_of_week: DayOfWeek,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    /// Minutes
    #[validate(range(min = 1, max = 600))]
    pub estimated_duration: Option<i32>,
    #[serde(default)]
    #[validate(nested)]
    pub exercises: Vec<SessionExerciseInput>,
}

impl From<SessionInput> for NewSession {
    fn from(input: SessionInput) -> Self {
        NewSession {
            name: input.name,
            day_of_week: input.day_of_week,
            notes: input.notes,
            estimated_duration: input.estimated_duration,
            exercises: input
                .exercises
                .into_iter()
                .map(|slot| NewSessionExercise {
                    exercise_id: slot.exercise_id,
                    sets: slot.sets,
                    reps: slot.reps,
                    weight: slot.weight,
                    rest_seconds: slot.rest_seconds,
                    notes: slot.notes,
                })
                .collect(),
        }
    }
}

/// Request body for creating a plan for one of the trainer's clients
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreatePlanRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub client_id: i32,
    /// e.g. `3x_week`
    #[validate(length(min = 1, max = 20))]
    pub frequency: String,
    #[schema(value_type = Option<String>)]
    pub level: Option<Difficulty>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Defaults to 4
    #[validate(range(min = 1, max = 52))]
    pub total_weeks: Option<i32>,
    #[serde(default)]
    pub is_template: bool,
    pub template_name: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub sessions: Vec<SessionInput>,
}

/// Request body for updating a plan. `sessions` replaces every session and resets progress.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdatePlanRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub frequency: Option<String>,
    #[schema(value_type = Option<String>)]
    pub level: Option<Difficulty>,
    pub goals: Option<Vec<String>>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 1, max = 52))]
    pub total_weeks: Option<i32>,
    pub is_template: Option<bool>,
    pub template_name: Option<String>,
    pub is_active: Option<bool>,
    #[validate(nested)]
    pub sessions: Option<Vec<SessionInput>>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct TogglePlanRequest {
    pub is_active: bool,
}

/// Query parameters for plan lists
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
pub struct PlanListQuery {
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
    /// Trainer lists only
    pub client_id: Option<i32>,
    pub is_active: Option<bool>,
    pub frequency: Option<String>,
    #[param(value_type = Option<String>)]
    pub level: Option<Difficulty>,
    /// Comma separated; matches plans with any of them
    pub goals: Option<String>,
    /// Matches name or description
    #[validate(length(max = 100))]
    pub search: Option<String>,
    /// `created_at` (default), `name`, `start_date` or `completion_rate`
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default)
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlotResponse {
    pub id: i32,
    pub position: i32,
    pub exercise_id: i32,
    pub exercise: Option<ExerciseResponse>,
    pub sets: i32,
    pub reps: String,
    pub weight: Option<String>,
    pub rest_seconds: Option<i32>,
    pub notes: Option<String>,
}

impl From<SlotDetail> for SlotResponse {
    fn from(detail: SlotDetail) -> Self {
        let slot = detail.slot;
        Self {
            id: slot.id,
            position: slot.position,
            exercise_id: slot.exercise_id,
            exercise: detail.exercise.map(ExerciseResponse::from),
            sets: slot.sets,
            reps: slot.reps,
            weight: slot.weight,
            rest_seconds: slot.rest_seconds,
            notes: slot.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub id: i32,
    pub name: String,
    #[schema(value_type = String, example = "monday")]
    pub day_of_week: DayOfWeek,
    pub notes: Option<String>,
    pub estimated_duration: Option<i32>,
    pub exercises: Vec<SlotResponse>,
}

impl From<SessionDetail> for SessionResponse {
    fn from(detail: SessionDetail) -> Self {
        let session = detail.session;
        Self {
            id: session.id,
            name: session.name,
            day_of_week: session.day_of_week,
            notes: session.notes,
            estimated_duration: session.estimated_duration,
            exercises: detail.exercises.into_iter().map(SlotResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub client_id: i32,
    pub trainer_id: i32,
    pub frequency: String,
    #[schema(value_type = Option<String>)]
    pub level: Option<Difficulty>,
    pub goals: Vec<String>,
    pub notes: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_weeks: i32,
    pub current_week: i32,
    pub is_template: bool,
    pub template_name: Option<String>,
    pub is_active: bool,
    /// Percentage in 0..=100
    pub completion_rate: i32,
    pub completed_sessions: i32,
    pub last_completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<workout_plan::Model> for PlanResponse {
    fn from(model: workout_plan::Model) -> Self {
        Self {
            goals: lists::decode(&model.goals),
            id: model.id,
            name: model.name,
            description: model.description,
            client_id: model.client_id,
            trainer_id: model.trainer_id,
            frequency: model.frequency,
            level: model.level,
            notes: model.notes,
            start_date: model.start_date,
            end_date: model.end_date,
            total_weeks: model.total_weeks,
            current_week: model.current_week,
            is_template: model.is_template,
            template_name: model.template_name,
            is_active: model.is_active,
            completion_rate: model.completion_rate,
            completed_sessions: model.completed_sessions,
            last_completed_at: model.last_completed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A plan with its participants and ordered sessions
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanDetailResponse {
    #[serde(flatten)]
    pub plan: PlanResponse,
    pub client: Option<UserSummary>,
    pub trainer: Option<UserSummary>,
    pub sessions: Vec<SessionResponse>,
}

impl From<PlanDetail> for PlanDetailResponse {
    fn from(detail: PlanDetail) -> Self {
        Self {
            plan: PlanResponse::from(detail.plan),
            client: detail.client.map(UserSummary::from),
            trainer: detail.trainer.map(UserSummary::from),
            sessions: detail.sessions.into_iter().map(SessionResponse::from).collect(),
        }
    }
}

fn sort_column(sort_by: Option<&str>) -> Result<workout_plan::Column, ApiError> {
    match sort_by.unwrap_or("created_at") {
        "created_at" => Ok(workout_plan::Column::CreatedAt),
        "name" => Ok(workout_plan::Column::Name),
        "start_date" => Ok(workout_plan::Column::StartDate),
        "completion_rate" => Ok(workout_plan::Column::CompletionRate),
        other => Err(ApiError::validation(format!("Cannot sort plans by '{other}'"))),
    }
}

/// Filtered, sorted page of plans within `owner`.
pub(crate) async fn list_plans(
    state: &AppState,
    owner: Condition,
    query: PlanListQuery,
) -> Result<Page<PlanDetailResponse>, ApiError> {
    let (page, limit) = page_params(query.page, query.limit, DEFAULT_PAGE_LIMIT);
    let column = sort_column(query.sort_by.as_deref())?;
    let order = match query.sort_order.as_deref() {
        Some("asc") => Order::Asc,
        Some("desc") | None => Order::Desc,
        Some(other) => return Err(ApiError::validation(format!("Invalid sort order '{other}'"))),
    };

    let mut condition = owner;
    if let Some(client_id) = query.client_id {
        condition = condition.add(workout_plan::Column::ClientId.eq(client_id));
    }
    if let Some(is_active) = query.is_active {
        condition = condition.add(workout_plan::Column::IsActive.eq(is_active));
    }
    if let Some(frequency) = query.frequency.as_deref().filter(|f| !f.is_empty()) {
        condition = condition.add(workout_plan::Column::Frequency.eq(frequency));
    }
    if let Some(level) = query.level {
        condition = condition.add(workout_plan::Column::Level.eq(level));
    }
    if let Some(goals) = query.goals.as_deref().map(split_csv).filter(|g| !g.is_empty()) {
        condition = condition.add(goals.iter().fold(Condition::any(), |any, goal| {
            any.add(lists::contains_item(workout_plan::Column::Goals, goal))
        }));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(workout_plan::Column::Name.contains(search))
                .add(workout_plan::Column::Description.contains(search)),
        );
    }

    let paginator = workout_plan::Entity::find()
        .filter(condition)
        .order_by(column, order.clone())
        .order_by(workout_plan::Column::Id, order)
        .paginate(&state.db, limit);
    let total = paginator.num_items().await?;
    let found = paginator.fetch_page(page - 1).await?;
    debug!("Retrieved {} of {} plans", found.len(), total);

    let mut items = Vec::with_capacity(found.len());
    for plan in found {
        items.push(PlanDetailResponse::from(plans::plan_detail(&state.db, plan).await?));
    }
    Ok(Page::new(items, Pagination::new(page, limit, total)))
}

/// Create a plan for a client assigned to the authenticated trainer
///
/// Sessions are stored first, then the plan referencing them.
#[utoipa::path(
    post,
    path = "/api/v1/workouts/plans",
    tag = "plans",
    security(("bearer_auth" = [])),
    request_body = CreatePlanRequest,
    responses(
        (status = 201, description = "Workout plan created successfully", body = ApiResponse<PlanDetailResponse>),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 403, description = "Client not assigned to this trainer", body = ErrorResponse),
        (status = 404, description = "Client not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(client_id = request.client_id))]
pub async fn create_plan(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(request): ValidatedJson<CreatePlanRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PlanDetailResponse>>), ApiError> {
    trace!("Entering create_plan function");
    let trainer = current.require_approved_trainer()?;

    let new_plan = NewPlan {
        name: request.name,
        description: request.description,
        frequency: request.frequency,
        level: request.level,
        goals: request.goals,
        notes: request.notes,
        start_date: request.start_date,
        end_date: request.end_date,
        total_weeks: request.total_weeks,
        is_template: request.is_template,
        template_name: request.template_name,
        sessions: request.sessions.into_iter().map(NewSession::from).collect(),
    };

    let plan = plans::create_plan(&state.db, trainer.id, request.client_id, new_plan).await?;
    invalidate_stats(&state, plan.trainer_id, plan.client_id).await;
    let detail = plans::plan_detail(&state.db, plan).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            PlanDetailResponse::from(detail),
            "Workout plan created successfully",
        )),
    ))
}

/// List the authenticated trainer's plans
#[utoipa::path(
    get,
    path = "/api/v1/workouts/plans",
    tag = "plans",
    security(("bearer_auth" = [])),
    params(PlanListQuery),
    responses(
        (status = 200, description = "Workout plans retrieved successfully", body = ApiResponse<Page<PlanDetailResponse>>),
        (status = 400, description = "Invalid filter or sort", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn get_plans(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedQuery(query): ValidatedQuery<PlanListQuery>,
) -> Result<Json<ApiResponse<Page<PlanDetailResponse>>>, ApiError> {
    trace!("Entering get_plans function");
    let trainer = current.require_approved_trainer()?;

    let owner = Condition::all().add(workout_plan::Column::TrainerId.eq(trainer.id));
    let data = list_plans(&state, owner, query).await?;
    Ok(Json(ApiResponse::ok(data, "Workout plans retrieved successfully")))
}

/// Get one of the authenticated trainer's plans
#[utoipa::path(
    get,
    path = "/api/v1/workouts/plans/{plan_id}",
    tag = "plans",
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
pub async fn get_plan(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(plan_id): Path<i32>,
) -> Result<Json<ApiResponse<PlanDetailResponse>>, ApiError> {
    trace!("Entering get_plan function");
    let trainer = current.require_approved_trainer()?;

    let plan = plans::find_trainer_plan(&state.db, trainer.id, plan_id).await?;
    let detail = plans::plan_detail(&state.db, plan).await?;
    Ok(Json(ApiResponse::ok(
        PlanDetailResponse::from(detail),
        "Workout plan retrieved successfully",
    )))
}

/// Update one of the authenticated trainer's plans
#[utoipa::path(
    put,
    path = "/api/v1/workouts/plans/{plan_id}",
    tag = "plans",
    security(("bearer_auth" = [])),
    params(
        ("plan_id" = i32, Path, description = "Workout plan ID"),
    ),
    request_body = UpdatePlanRequest,
    responses(
        (status = 200, description = "Workout plan updated successfully", body = ApiResponse<PlanDetailResponse>),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 404, description = "Workout plan not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request))]
pub async fn update_plan(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(plan_id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdatePlanRequest>,
) -> Result<Json<ApiResponse<PlanDetailResponse>>, ApiError> {
    trace!("Entering update_plan function");
    let trainer = current.require_approved_trainer()?;

    let update = PlanUpdate {
        name: request.name,
        description: request.description,
        frequency: request.frequency,
        level: request.level,
        goals: request.goals,
        notes: request.notes,
        start_date: request.start_date,
        end_date: request.end_date,
        total_weeks: request.total_weeks,
        is_template: request.is_template,
        template_name: request.template_name,
        is_active: request.is_active,
        sessions: request
            .sessions
            .map(|sessions| sessions.into_iter().map(NewSession::from).collect()),
    };

    let plan = plans::update_plan(&state.db, trainer.id, plan_id, update).await?;
    invalidate_stats(&state, plan.trainer_id, plan.client_id).await;
    let detail = plans::plan_detail(&state.db, plan).await?;

    Ok(Json(ApiResponse::ok(
        PlanDetailResponse::from(detail),
        "Workout plan updated successfully",
    )))
}

/// Activate or deactivate one of the authenticated trainer's plans
#[utoipa::path(
    put,
    path = "/api/v1/workouts/plans/{plan_id}/toggle",
    tag = "plans",
    security(("bearer_auth" = [])),
    params(
        ("plan_id" = i32, Path, description = "Workout plan ID"),
    ),
    request_body = TogglePlanRequest,
    responses(
        (status = 200, description = "Workout plan status changed", body = ApiResponse<PlanResponse>),
        (status = 404, description = "Workout plan not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn toggle_plan(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(plan_id): Path<i32>,
    ValidatedJson(request): ValidatedJson<TogglePlanRequest>,
) -> Result<Json<ApiResponse<PlanResponse>>, ApiError> {
    trace!("Entering toggle_plan function");
    let trainer = current.require_approved_trainer()?;

    let plan = plans::set_plan_active(&state.db, trainer.id, plan_id, request.is_active).await?;
    invalidate_stats(&state, plan.trainer_id, plan.client_id).await;

    let verb = if request.is_active { "activated" } else { "deactivated" };
    info!("Plan {} {} by trainer {}", plan.id, verb, trainer.id);
    Ok(Json(ApiResponse::ok(
        PlanResponse::from(plan),
        format!("Workout plan {verb} successfully"),
    )))
}
