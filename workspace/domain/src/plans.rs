//! Plan authoring: composing sessions and exercises into a client plan.
//!
//! Sessions are stored entities referenced by the plan through `plan_sessions`;
//! they are written before the plan that references them. Replacing a plan's
//! sessions deletes the old rows and resets progress.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use model::entities::{
    exercise::{self, Difficulty},
    plan_completion, plan_session, session_exercise, user,
    workout_plan, workout_session::{self, DayOfWeek},
};
use model::lists;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace};

use crate::assignment::find_client;
use crate::error::{DomainError, Result};

pub const DEFAULT_TOTAL_WEEKS: i32 = 4;

#[derive(Debug, Clone)]
pub struct NewSessionExercise {
    pub exercise_id: i32,
    pub sets: i32,
    pub reps: String,
    pub weight: Option<String>,
    pub rest_seconds: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub name: String,
    pub day_of_week: DayOfWeek,
    pub notes: Option<String>,
    pub estimated_duration: Option<i32>,
    pub exercises: Vec<NewSessionExercise>,
}

#[derive(Debug, Clone)]
pub struct NewPlan {
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub level: Option<Difficulty>,
    pub goals: Vec<String>,
    pub notes: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_weeks: Option<i32>,
    pub is_template: bool,
    pub template_name: Option<String>,
    pub sessions: Vec<NewSession>,
}

/// Partial plan update. `sessions`, when present, replaces every session.
#[derive(Debug, Clone, Default)]
pub struct PlanUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<String>,
    pub level: Option<Difficulty>,
    pub goals: Option<Vec<String>>,
    pub notes: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_weeks: Option<i32>,
    pub is_template: Option<bool>,
    pub template_name: Option<String>,
    pub is_active: Option<bool>,
    pub sessions: Option<Vec<NewSession>>,
}

/// An exercise slot with the catalog entry it points at.
#[derive(Debug, Clone)]
pub struct SlotDetail {
    pub slot: session_exercise::Model,
    pub exercise: Option<exercise::Model>,
}

#[derive(Debug, Clone)]
pub struct SessionDetail {
    pub session: workout_session::Model,
    pub exercises: Vec<SlotDetail>,
}

#[derive(Debug, Clone)]
pub struct PlanDetail {
    pub plan: workout_plan::Model,
    pub client: Option<user::Model>,
    pub trainer: Option<user::Model>,
    pub sessions: Vec<SessionDetail>,
}

/// The session scheduled for today in the client's active plan.
#[derive(Debug, Clone)]
pub struct TodaysWorkout {
    pub plan: workout_plan::Model,
    pub session: SessionDetail,
}

fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(DomainError::validation("End date must not be before start date"));
        }
    }
    Ok(())
}

fn check_total_weeks(total_weeks: i32) -> Result<()> {
    if total_weeks < 1 {
        return Err(DomainError::validation("Total weeks must be at least 1"));
    }
    Ok(())
}

/// Every referenced exercise must exist in the catalog.
async fn check_exercises<C: ConnectionTrait>(db: &C, sessions: &[NewSession]) -> Result<()> {
    let ids: HashSet<i32> = sessions
        .iter()
        .flat_map(|s| s.exercises.iter().map(|e| e.exercise_id))
        .collect();
    if ids.is_empty() {
        return Ok(());
    }

    let found = exercise::Entity::find()
        .filter(exercise::Column::Id.is_in(ids.iter().copied()))
        .count(db)
        .await?;
    if found != ids.len() as u64 {
        return Err(DomainError::validation("One or more exercises do not exist"));
    }
    Ok(())
}

/// Inserts sessions with their exercise slots and returns the new session ids in order.
async fn insert_sessions<C: ConnectionTrait>(db: &C, sessions: Vec<NewSession>) -> Result<Vec<i32>> {
    let now = crate::now();
    let mut ids = Vec::with_capacity(sessions.len());

    for session in sessions {
        let stored = workout_session::ActiveModel {
            name: Set(session.name),
            day_of_week: Set(session.day_of_week),
            notes: Set(session.notes),
            estimated_duration: Set(session.estimated_duration),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        for (position, slot) in session.exercises.into_iter().enumerate() {
            session_exercise::ActiveModel {
                session_id: Set(stored.id),
                exercise_id: Set(slot.exercise_id),
                position: Set(position as i32),
                sets: Set(slot.sets),
                reps: Set(slot.reps),
                weight: Set(slot.weight),
                rest_seconds: Set(slot.rest_seconds),
                notes: Set(slot.notes),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }

        debug!("Stored session {} ({:?})", stored.id, stored.day_of_week);
        ids.push(stored.id);
    }

    Ok(ids)
}

async fn link_sessions<C: ConnectionTrait>(db: &C, plan_id: i32, session_ids: &[i32]) -> Result<()> {
    for (position, session_id) in session_ids.iter().enumerate() {
        plan_session::ActiveModel {
            plan_id: Set(plan_id),
            session_id: Set(*session_id),
            position: Set(position as i32),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Removes a plan's sessions, their slots and the completion records.
async fn remove_sessions<C: ConnectionTrait>(db: &C, plan_id: i32) -> Result<u64> {
    let session_ids = plan_session_ids(db, plan_id).await?;

    plan_session::Entity::delete_many()
        .filter(plan_session::Column::PlanId.eq(plan_id))
        .exec(db)
        .await?;
    plan_completion::Entity::delete_many()
        .filter(plan_completion::Column::PlanId.eq(plan_id))
        .exec(db)
        .await?;
    session_exercise::Entity::delete_many()
        .filter(session_exercise::Column::SessionId.is_in(session_ids.iter().copied()))
        .exec(db)
        .await?;
    let removed = workout_session::Entity::delete_many()
        .filter(workout_session::Column::Id.is_in(session_ids))
        .exec(db)
        .await?;

    Ok(removed.rows_affected)
}

pub(crate) async fn plan_session_ids<C: ConnectionTrait>(db: &C, plan_id: i32) -> Result<Vec<i32>> {
    Ok(plan_session::Entity::find()
        .filter(plan_session::Column::PlanId.eq(plan_id))
        .order_by_asc(plan_session::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.session_id)
        .collect())
}

/// Creates a plan for a client assigned to `trainer_id`.
#[instrument(skip(db, new_plan), fields(name = %new_plan.name, sessions = new_plan.sessions.len()))]
pub async fn create_plan(
    db: &DatabaseConnection,
    trainer_id: i32,
    client_id: i32,
    new_plan: NewPlan,
) -> Result<workout_plan::Model> {
    trace!("Entering create_plan");

    let client = find_client(db, client_id).await?;
    if client.assigned_trainer_id != Some(trainer_id) {
        return Err(DomainError::authorization(
            "Client is not assigned to this trainer",
        ));
    }

    let total_weeks = new_plan.total_weeks.unwrap_or(DEFAULT_TOTAL_WEEKS);
    check_total_weeks(total_weeks)?;
    check_dates(new_plan.start_date, new_plan.end_date)?;
    check_exercises(db, &new_plan.sessions).await?;

    let txn = db.begin().await?;

    let session_ids = insert_sessions(&txn, new_plan.sessions).await?;

    let now = crate::now();
    let plan = workout_plan::ActiveModel {
        name: Set(new_plan.name),
        description: Set(new_plan.description),
        client_id: Set(client.id),
        trainer_id: Set(trainer_id),
        frequency: Set(new_plan.frequency),
        level: Set(new_plan.level),
        goals: Set(lists::encode(&new_plan.goals)),
        notes: Set(new_plan.notes),
        start_date: Set(new_plan.start_date),
        end_date: Set(new_plan.end_date),
        total_weeks: Set(total_weeks),
        current_week: Set(1),
        is_template: Set(new_plan.is_template),
        template_name: Set(new_plan.template_name),
        is_active: Set(true),
        completion_rate: Set(0),
        completed_sessions: Set(0),
        last_completed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    link_sessions(&txn, plan.id, &session_ids).await?;
    txn.commit().await?;

    info!(
        "Plan {} created by trainer {} for client {} with {} sessions",
        plan.id,
        trainer_id,
        client.id,
        session_ids.len()
    );
    Ok(plan)
}

pub async fn find_trainer_plan(db: &DatabaseConnection, trainer_id: i32, plan_id: i32) -> Result<workout_plan::Model> {
    workout_plan::Entity::find_by_id(plan_id)
        .filter(workout_plan::Column::TrainerId.eq(trainer_id))
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Workout plan {plan_id} not found")))
}

pub async fn find_client_plan(db: &DatabaseConnection, client_id: i32, plan_id: i32) -> Result<workout_plan::Model> {
    workout_plan::Entity::find_by_id(plan_id)
        .filter(workout_plan::Column::ClientId.eq(client_id))
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Workout plan {plan_id} not found")))
}

/// Applies an update to one of the trainer's plans.
#[instrument(skip(db, update))]
pub async fn update_plan(
    db: &DatabaseConnection,
    trainer_id: i32,
    plan_id: i32,
    update: PlanUpdate,
) -> Result<workout_plan::Model> {
    trace!("Entering update_plan");

    let plan = find_trainer_plan(db, trainer_id, plan_id).await?;

    let total_weeks = update.total_weeks.unwrap_or(plan.total_weeks);
    check_total_weeks(total_weeks)?;
    check_dates(
        update.start_date.or(plan.start_date),
        update.end_date.or(plan.end_date),
    )?;
    if let Some(sessions) = &update.sessions {
        check_exercises(db, sessions).await?;
    }

    let txn = db.begin().await?;

    let current_week = plan.current_week.min(total_weeks);
    let mut active: workout_plan::ActiveModel = plan.into();
    let mut updated_fields = Vec::new();

    if let Some(name) = update.name {
        active.name = Set(name);
        updated_fields.push("name");
    }
    if let Some(description) = update.description {
        active.description = Set(Some(description));
        updated_fields.push("description");
    }
    if let Some(frequency) = update.frequency {
        active.frequency = Set(frequency);
        updated_fields.push("frequency");
    }
    if let Some(level) = update.level {
        active.level = Set(Some(level));
        updated_fields.push("level");
    }
    if let Some(goals) = update.goals {
        active.goals = Set(lists::encode(&goals));
        updated_fields.push("goals");
    }
    if let Some(notes) = update.notes {
        active.notes = Set(Some(notes));
        updated_fields.push("notes");
    }
    if let Some(start_date) = update.start_date {
        active.start_date = Set(Some(start_date));
        updated_fields.push("start_date");
    }
    if let Some(end_date) = update.end_date {
        active.end_date = Set(Some(end_date));
        updated_fields.push("end_date");
    }
    if update.total_weeks.is_some() {
        active.total_weeks = Set(total_weeks);
        active.current_week = Set(current_week);
        updated_fields.push("total_weeks");
    }
    if let Some(is_template) = update.is_template {
        active.is_template = Set(is_template);
        updated_fields.push("is_template");
    }
    if let Some(template_name) = update.template_name {
        active.template_name = Set(Some(template_name));
        updated_fields.push("template_name");
    }
    if let Some(is_active) = update.is_active {
        active.is_active = Set(is_active);
        updated_fields.push("is_active");
    }

    if let Some(sessions) = update.sessions {
        let removed = remove_sessions(&txn, plan_id).await?;
        let session_ids = insert_sessions(&txn, sessions).await?;
        link_sessions(&txn, plan_id, &session_ids).await?;
        debug!("Replaced {} sessions with {}", removed, session_ids.len());

        active.completion_rate = Set(0);
        active.completed_sessions = Set(0);
        active.current_week = Set(1);
        active.last_completed_at = Set(None);
        updated_fields.push("sessions");
    }

    active.updated_at = Set(crate::now());
    let plan = active.update(&txn).await?;
    txn.commit().await?;

    info!(
        "Plan {} updated. Updated fields: {}",
        plan.id,
        if updated_fields.is_empty() { "none".to_string() } else { updated_fields.join(", ") }
    );
    Ok(plan)
}

#[instrument(skip(db))]
pub async fn set_plan_active(
    db: &DatabaseConnection,
    trainer_id: i32,
    plan_id: i32,
    is_active: bool,
) -> Result<workout_plan::Model> {
    let plan = find_trainer_plan(db, trainer_id, plan_id).await?;

    let mut active: workout_plan::ActiveModel = plan.into();
    active.is_active = Set(is_active);
    active.updated_at = Set(crate::now());
    let plan = active.update(db).await?;

    info!("Plan {} is_active set to {}", plan.id, is_active);
    Ok(plan)
}

/// Sessions of a plan in order, each with its exercise slots.
pub async fn plan_sessions(db: &DatabaseConnection, plan: &workout_plan::Model) -> Result<Vec<SessionDetail>> {
    let sessions = plan
        .find_related(workout_session::Entity)
        .order_by_asc(plan_session::Column::Position)
        .all(db)
        .await?;
    let session_ids: Vec<i32> = sessions.iter().map(|s| s.id).collect();

    let slots = session_exercise::Entity::find()
        .filter(session_exercise::Column::SessionId.is_in(session_ids))
        .order_by_asc(session_exercise::Column::SessionId)
        .order_by_asc(session_exercise::Column::Position)
        .find_also_related(exercise::Entity)
        .all(db)
        .await?;

    let mut by_session: HashMap<i32, Vec<SlotDetail>> = HashMap::new();
    for (slot, exercise) in slots {
        by_session
            .entry(slot.session_id)
            .or_default()
            .push(SlotDetail { slot, exercise });
    }

    Ok(sessions
        .into_iter()
        .map(|session| SessionDetail {
            exercises: by_session.remove(&session.id).unwrap_or_default(),
            session,
        })
        .collect())
}

/// A plan with its participants and sessions populated.
pub async fn plan_detail(db: &DatabaseConnection, plan: workout_plan::Model) -> Result<PlanDetail> {
    let sessions = plan_sessions(db, &plan).await?;
    let client = user::Entity::find_by_id(plan.client_id).one(db).await?;
    let trainer = user::Entity::find_by_id(plan.trainer_id).one(db).await?;
    Ok(PlanDetail {
        plan,
        client,
        trainer,
        sessions,
    })
}

/// The session of the client's most recent active plan scheduled on `day`.
#[instrument(skip(db))]
pub async fn todays_workout(db: &DatabaseConnection, client_id: i32, day: DayOfWeek) -> Result<Option<TodaysWorkout>> {
    let Some(plan) = workout_plan::Entity::find()
        .filter(workout_plan::Column::ClientId.eq(client_id))
        .filter(workout_plan::Column::IsActive.eq(true))
        .order_by_desc(workout_plan::Column::CreatedAt)
        .order_by_desc(workout_plan::Column::Id)
        .one(db)
        .await?
    else {
        debug!("Client {} has no active plan", client_id);
        return Ok(None);
    };

    let session = plan_sessions(db, &plan)
        .await?
        .into_iter()
        .find(|detail| detail.session.day_of_week == day);

    Ok(session.map(|session| TodaysWorkout { plan, session }))
}
