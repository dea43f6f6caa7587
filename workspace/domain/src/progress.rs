//! Workout logging and plan progress.
//!
//! A plan expects every session once per week. Progress counts the distinct
//! `(session, week)` pairs that were logged:
//!
//! ```text
//! rate = min(100, round(completed * 100 / (sessions * total_weeks)))
//! ```
//!
//! The stored rate never decreases; only replacing the plan's sessions resets it.

use chrono::NaiveDateTime;
use model::entities::{plan_completion, plan_session, workout_log, workout_plan, workout_session};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace};

use crate::error::{DomainError, Result};
use crate::plans::{find_client_plan, plan_session_ids};

/// A finished session as reported by the client.
#[derive(Debug, Clone, Default)]
pub struct LogEntry {
    pub plan_id: i32,
    pub session_id: i32,
    pub week: i32,
    pub completed_at: Option<NaiveDateTime>,
    pub actual_duration: Option<i32>,
    pub exercises: Option<serde_json::Value>,
    pub overall_notes: Option<String>,
    pub difficulty: Option<i32>,
    pub energy: Option<i32>,
    pub mood: Option<i32>,
    pub pain_level: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct RecordedLog {
    pub log: workout_log::Model,
    pub plan: workout_plan::Model,
}

/// Completion percentage for `completed` distinct pairs.
pub fn completion_rate(completed: u64, sessions: u64, total_weeks: i32) -> i32 {
    let expected = sessions * total_weeks.max(0) as u64;
    if expected == 0 {
        return 0;
    }
    let rate = (completed as f64 * 100.0 / expected as f64).round() as i64;
    rate.clamp(0, 100) as i32
}

/// Records a completed session against one of the client's plans and updates progress.
#[instrument(skip(db, entry), fields(plan_id = entry.plan_id, session_id = entry.session_id, week = entry.week))]
pub async fn record_log(db: &DatabaseConnection, client_id: i32, entry: LogEntry) -> Result<RecordedLog> {
    trace!("Entering record_log");

    let plan = find_client_plan(db, client_id, entry.plan_id).await?;

    if entry.week < 1 || entry.week > plan.total_weeks {
        return Err(DomainError::validation(format!(
            "Week must be between 1 and {}",
            plan.total_weeks
        )));
    }

    let session = plan_session::Entity::find_by_id((plan.id, entry.session_id))
        .find_also_related(workout_session::Entity)
        .one(db)
        .await?
        .and_then(|(_, session)| session)
        .ok_or_else(|| DomainError::not_found(format!(
            "Session {} not found in plan {}",
            entry.session_id, plan.id
        )))?;

    let completed_at = entry.completed_at.unwrap_or_else(crate::now);

    let txn = db.begin().await?;

    let log = workout_log::ActiveModel {
        client_id: Set(client_id),
        trainer_id: Set(plan.trainer_id),
        plan_id: Set(plan.id),
        session_id: Set(session.id),
        week: Set(entry.week),
        day_of_week: Set(session.day_of_week),
        completed_at: Set(completed_at),
        actual_duration: Set(entry.actual_duration),
        exercises: Set(entry.exercises),
        overall_notes: Set(entry.overall_notes),
        difficulty: Set(entry.difficulty),
        energy: Set(entry.energy),
        mood: Set(entry.mood),
        pain_level: Set(entry.pain_level),
        is_completed: Set(true),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let plan = mark_session_completed(&txn, plan, session.id, entry.week, completed_at).await?;
    txn.commit().await?;

    info!(
        "Client {} logged session {} week {} of plan {} (completion {}%)",
        client_id, session.id, entry.week, plan.id, plan.completion_rate
    );
    Ok(RecordedLog { log, plan })
}

/// Records the `(session, week)` pair and recomputes the plan's progress fields.
#[instrument(skip(db, plan), fields(plan_id = plan.id))]
pub async fn mark_session_completed<C: ConnectionTrait>(
    db: &C,
    plan: workout_plan::Model,
    session_id: i32,
    week: i32,
    at: NaiveDateTime,
) -> Result<workout_plan::Model> {
    let already = plan_completion::Entity::find_by_id((plan.id, session_id, week))
        .one(db)
        .await?
        .is_some();
    if !already {
        plan_completion::ActiveModel {
            plan_id: Set(plan.id),
            session_id: Set(session_id),
            week: Set(week),
        }
        .insert(db)
        .await?;
    }

    let completed = plan_completion::Entity::find()
        .filter(plan_completion::Column::PlanId.eq(plan.id))
        .count(db)
        .await?;
    let sessions = plan_session_ids(db, plan.id).await?.len() as u64;
    let rate = completion_rate(completed, sessions, plan.total_weeks);
    debug!(
        "Plan {}: {} of {} sessions x {} weeks completed -> {}%",
        plan.id, completed, sessions, plan.total_weeks, rate
    );

    let completion_rate = plan.completion_rate.max(rate);
    let current_week = plan.current_week.max(week).min(plan.total_weeks);

    let mut active: workout_plan::ActiveModel = plan.into();
    active.completion_rate = Set(completion_rate);
    active.completed_sessions = Set(completed as i32);
    active.current_week = Set(current_week);
    active.last_completed_at = Set(Some(at));
    active.updated_at = Set(crate::now());
    Ok(active.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plans::{create_plan, update_plan, PlanUpdate};
    use crate::testing::{bind, new_client, new_trainer, plan, session, setup_db};
    use model::entities::workout_session::DayOfWeek;

    #[test]
    fn rate_is_bounded_and_rounded() {
        assert_eq!(completion_rate(0, 0, 4), 0);
        assert_eq!(completion_rate(3, 2, 0), 0);
        assert_eq!(completion_rate(1, 3, 1), 33);
        assert_eq!(completion_rate(2, 3, 1), 67);
        assert_eq!(completion_rate(8, 2, 4), 100);
        assert_eq!(completion_rate(20, 2, 4), 100);
    }

    async fn two_session_plan(db: &DatabaseConnection) -> (i32, workout_plan::Model, Vec<i32>) {
        let trainer = new_trainer(db).await.unwrap();
        let client = new_client(db).await.unwrap();
        bind(db, &client, &trainer).await.unwrap();
        let created = create_plan(
            db,
            trainer.id,
            client.id,
            plan(
                "Block",
                vec![
                    session("A", DayOfWeek::Monday, &[]),
                    session("B", DayOfWeek::Thursday, &[]),
                ],
            ),
        )
        .await
        .unwrap();
        let sessions = plan_session_ids(db, created.id).await.unwrap();
        (client.id, created, sessions)
    }

    fn entry(plan_id: i32, session_id: i32, week: i32) -> LogEntry {
        LogEntry {
            plan_id,
            session_id,
            week,
            actual_duration: Some(50),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn logging_raises_completion_monotonically() {
        let db = setup_db().await.unwrap();
        let (client_id, created, sessions) = two_session_plan(&db).await;

        // 2 sessions x 4 weeks = 8 expected
        let first = record_log(&db, client_id, entry(created.id, sessions[0], 1)).await.unwrap();
        assert_eq!(first.plan.completion_rate, 13);
        assert_eq!(first.log.day_of_week, DayOfWeek::Monday);
        assert_eq!(first.log.trainer_id, created.trainer_id);

        // Same pair again: new log, same rate
        let repeat = record_log(&db, client_id, entry(created.id, sessions[0], 1)).await.unwrap();
        assert_eq!(repeat.plan.completion_rate, 13);
        assert_eq!(repeat.plan.completed_sessions, 1);

        let mut last = 0;
        for week in 1..=4 {
            for session_id in &sessions {
                let recorded = record_log(&db, client_id, entry(created.id, *session_id, week))
                    .await
                    .unwrap();
                assert!(recorded.plan.completion_rate >= last);
                assert!(recorded.plan.completion_rate <= 100);
                last = recorded.plan.completion_rate;
            }
        }
        assert_eq!(last, 100);

        let logs = workout_log::Entity::find().count(&db).await.unwrap();
        assert_eq!(logs, 10);
    }

    #[tokio::test]
    async fn logging_advances_current_week() {
        let db = setup_db().await.unwrap();
        let (client_id, created, sessions) = two_session_plan(&db).await;

        let recorded = record_log(&db, client_id, entry(created.id, sessions[1], 3)).await.unwrap();
        assert_eq!(recorded.plan.current_week, 3);
        let earlier = record_log(&db, client_id, entry(created.id, sessions[0], 2)).await.unwrap();
        assert_eq!(earlier.plan.current_week, 3);
        assert!(earlier.plan.last_completed_at.is_some());
    }

    #[tokio::test]
    async fn log_against_foreign_plan_is_not_found() {
        let db = setup_db().await.unwrap();
        let (_, created, sessions) = two_session_plan(&db).await;
        let stranger = new_client(&db).await.unwrap();

        let err = record_log(&db, stranger.id, entry(created.id, sessions[0], 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(workout_log::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn log_validates_week_and_session() {
        let db = setup_db().await.unwrap();
        let (client_id, created, sessions) = two_session_plan(&db).await;

        let err = record_log(&db, client_id, entry(created.id, sessions[0], 5)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let err = record_log(&db, client_id, entry(created.id, sessions[0], 0)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let err = record_log(&db, client_id, entry(created.id, 9999, 1)).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn replacing_sessions_resets_progress_but_keeps_logs() {
        let db = setup_db().await.unwrap();
        let (client_id, created, sessions) = two_session_plan(&db).await;
        record_log(&db, client_id, entry(created.id, sessions[0], 1)).await.unwrap();

        let updated = update_plan(
            &db,
            created.trainer_id,
            created.id,
            PlanUpdate {
                sessions: Some(vec![session("C", DayOfWeek::Saturday, &[])]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.completion_rate, 0);
        assert_eq!(updated.completed_sessions, 0);
        assert_eq!(plan_completion::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(workout_log::Entity::find().count(&db).await.unwrap(), 1);
    }
}
