use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::{page_params, split_csv};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::validation::{ValidatedJson, ValidatedQuery};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDateTime;
use common::{Page, Pagination};
use model::entities::{exercise::{self, Difficulty}, user::Role};
use model::lists;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

const DEFAULT_EXERCISE_LIMIT: u64 = 20;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExerciseResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub muscle_groups: Vec<String>,
    pub equipment: Vec<String>,
    #[schema(value_type = String, example = "beginner")]
    pub difficulty: Difficulty,
    pub is_active: bool,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
}

impl From<exercise::Model> for ExerciseResponse {
    fn from(model: exercise::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            instructions: model.instructions,
            muscle_groups: lists::decode(&model.muscle_groups),
            equipment: lists::decode(&model.equipment),
            difficulty: model.difficulty,
            is_active: model.is_active,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

/// Request body for adding an exercise to the catalog
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateExerciseRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(max = 2000))]
    pub instructions: Option<String>,
    #[validate(length(min = 1))]
    pub muscle_groups: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[schema(value_type = String, example = "intermediate")]
    pub difficulty: Difficulty,
}

/// Query parameters for the exercise catalog
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct ExerciseQuery {
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    /// Page size (default: 20)
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
    /// Comma separated; matches exercises working any of them
    pub muscle_groups: Option<String>,
    /// Comma separated; matches exercises using any of them
    pub equipment: Option<String>,
    #[param(value_type = Option<String>)]
    pub difficulty: Option<Difficulty>,
    #[validate(length(max = 100))]
    pub search: Option<String>,
}

/// Request body for (de)activating an exercise
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct ToggleExerciseRequest {
    pub is_active: bool,
}

fn any_item(column: exercise::Column, items: &[String]) -> Condition {
    items
        .iter()
        .fold(Condition::any(), |cond, item| cond.add(lists::contains_item(column, item)))
}

/// List active exercises, sorted by name
#[utoipa::path(
    get,
    path = "/api/v1/workouts/exercises",
    tag = "exercises",
    security(("bearer_auth" = [])),
    params(ExerciseQuery),
    responses(
        (status = 200, description = "Exercises retrieved successfully", body = ApiResponse<Page<ExerciseResponse>>),
        (status = 403, description = "Not an approved trainer", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn get_exercises(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedQuery(query): ValidatedQuery<ExerciseQuery>,
) -> Result<Json<ApiResponse<Page<ExerciseResponse>>>, ApiError> {
    trace!("Entering get_exercises function");
    current.require_approved_trainer()?;

    let (page, limit) = page_params(query.page, query.limit, DEFAULT_EXERCISE_LIMIT);

    let mut condition = Condition::all().add(exercise::Column::IsActive.eq(true));
    if let Some(muscle_groups) = query.muscle_groups.as_deref().map(split_csv).filter(|v| !v.is_empty()) {
        condition = condition.add(any_item(exercise::Column::MuscleGroups, &muscle_groups));
    }
    if let Some(equipment) = query.equipment.as_deref().map(split_csv).filter(|v| !v.is_empty()) {
        condition = condition.add(any_item(exercise::Column::Equipment, &equipment));
    }
    if let Some(difficulty) = query.difficulty {
        condition = condition.add(exercise::Column::Difficulty.eq(difficulty));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(exercise::Column::Name.contains(search))
                .add(exercise::Column::Description.contains(search)),
        );
    }

    let paginator = exercise::Entity::find()
        .filter(condition)
        .order_by_asc(exercise::Column::Name)
        .order_by_asc(exercise::Column::Id)
        .paginate(&state.db, limit);
    let total = paginator.num_items().await?;
    let exercises = paginator.fetch_page(page - 1).await?;
    debug!("Retrieved {} of {} exercises", exercises.len(), total);

    let data = Page::new(
        exercises.into_iter().map(ExerciseResponse::from).collect(),
        Pagination::new(page, limit, total),
    );
    Ok(Json(ApiResponse::ok(data, "Exercises retrieved successfully")))
}

/// Add an exercise to the catalog
#[utoipa::path(
    post,
    path = "/api/v1/workouts/exercises",
    tag = "exercises",
    security(("bearer_auth" = [])),
    request_body = CreateExerciseRequest,
    responses(
        (status = 201, description = "Exercise created successfully", body = ApiResponse<ExerciseResponse>),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 403, description = "Not an approved trainer", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn create_exercise(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateExerciseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ExerciseResponse>>), ApiError> {
    trace!("Entering create_exercise function");
    let trainer = current.require_approved_trainer()?;

    let created = exercise::ActiveModel {
        name: Set(request.name),
        description: Set(request.description),
        instructions: Set(request.instructions),
        muscle_groups: Set(lists::encode(&request.muscle_groups)),
        equipment: Set(lists::encode(&request.equipment)),
        difficulty: Set(request.difficulty),
        is_active: Set(true),
        created_by: Set(Some(trainer.id)),
        created_at: Set(domain::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!("Exercise {} '{}' created by trainer {}", created.id, created.name, trainer.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            ExerciseResponse::from(created),
            "Exercise created successfully",
        )),
    ))
}

/// Activate or deactivate an exercise
///
/// Allowed for the trainer who created it and for admins.
#[utoipa::path(
    put,
    path = "/api/v1/workouts/exercises/{exercise_id}/toggle",
    tag = "exercises",
    security(("bearer_auth" = [])),
    params(
        ("exercise_id" = i32, Path, description = "Exercise ID"),
    ),
    request_body = ToggleExerciseRequest,
    responses(
        (status = 200, description = "Exercise status changed", body = ApiResponse<ExerciseResponse>),
        (status = 403, description = "Not the creator", body = ErrorResponse),
        (status = 404, description = "Exercise not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn toggle_exercise(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(exercise_id): Path<i32>,
    ValidatedJson(request): ValidatedJson<ToggleExerciseRequest>,
) -> Result<Json<ApiResponse<ExerciseResponse>>, ApiError> {
    trace!("Entering toggle_exercise function");
    if current.role() != Role::Admin {
        current.require_approved_trainer()?;
    }

    let found = exercise::Entity::find_by_id(exercise_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("Exercise {} not found", exercise_id);
            ApiError::not_found("Exercise not found")
        })?;

    if current.role() != Role::Admin && found.created_by != Some(current.id()) {
        warn!("User {} is not the creator of exercise {}", current.id(), exercise_id);
        return Err(ApiError::forbidden("Only the creator can change this exercise"));
    }

    let mut active: exercise::ActiveModel = found.into();
    active.is_active = Set(request.is_active);
    let updated = active.update(&state.db).await?;

    let verb = if request.is_active { "activated" } else { "deactivated" };
    info!("Exercise {} {}", updated.id, verb);
    Ok(Json(ApiResponse::ok(
        ExerciseResponse::from(updated),
        format!("Exercise {verb} successfully"),
    )))
}
