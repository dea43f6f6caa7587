use chrono::NaiveDateTime;
use model::entities::{workout_log, workout_plan};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use tracing::{debug, instrument};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainerStats {
    pub total_plans: u64,
    pub active_plans: u64,
    /// Plans with a completion rate of 100.
    pub completed_plans: u64,
    /// Distinct clients across the trainer's plans.
    pub total_clients: u64,
    pub avg_completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientStats {
    pub total_plans: u64,
    pub active_plans: u64,
    pub total_workouts: u64,
    pub completed_workouts: u64,
    /// Rounded percentage of logged workouts marked completed.
    pub completion_rate: i32,
    /// Minutes, over logs that reported a duration.
    pub avg_duration: f64,
    pub last_workout: Option<NaiveDateTime>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `SUM` and `COUNT` of one integer column.
#[derive(Debug, FromQueryResult)]
struct Totals {
    sum: Option<i64>,
    count: i64,
}

impl Totals {
    fn average(&self) -> f64 {
        match (self.sum, self.count) {
            (Some(sum), count) if count > 0 => round2(sum as f64 / count as f64),
            _ => 0.0,
        }
    }
}

#[instrument(skip(db))]
pub async fn trainer_stats(db: &DatabaseConnection, trainer_id: i32) -> Result<TrainerStats> {
    let plans = || workout_plan::Entity::find().filter(workout_plan::Column::TrainerId.eq(trainer_id));

    let total_plans = plans().count(db).await?;
    let active_plans = plans()
        .filter(workout_plan::Column::IsActive.eq(true))
        .count(db)
        .await?;
    let completed_plans = plans()
        .filter(workout_plan::Column::CompletionRate.gte(100))
        .count(db)
        .await?;
    let total_clients = plans()
        .select_only()
        .column(workout_plan::Column::ClientId)
        .distinct()
        .count(db)
        .await?;
    let rates = plans()
        .select_only()
        .column_as(workout_plan::Column::CompletionRate.sum(), "sum")
        .column_as(workout_plan::Column::CompletionRate.count(), "count")
        .into_model::<Totals>()
        .one(db)
        .await?;
    debug!("Computed trainer stats over {} plans", total_plans);

    Ok(TrainerStats {
        total_plans,
        active_plans,
        completed_plans,
        total_clients,
        avg_completion_rate: rates.map(|r| r.average()).unwrap_or(0.0),
    })
}

#[instrument(skip(db))]
pub async fn client_stats(db: &DatabaseConnection, client_id: i32) -> Result<ClientStats> {
    let plans = || workout_plan::Entity::find().filter(workout_plan::Column::ClientId.eq(client_id));
    let logs = || workout_log::Entity::find().filter(workout_log::Column::ClientId.eq(client_id));

    let total_plans = plans().count(db).await?;
    let active_plans = plans()
        .filter(workout_plan::Column::IsActive.eq(true))
        .count(db)
        .await?;
    let total_workouts = logs().count(db).await?;
    let completed_workouts = logs()
        .filter(workout_log::Column::IsCompleted.eq(true))
        .count(db)
        .await?;
    let durations = logs()
        .select_only()
        .column_as(workout_log::Column::ActualDuration.sum(), "sum")
        .column_as(workout_log::Column::ActualDuration.count(), "count")
        .into_model::<Totals>()
        .one(db)
        .await?;
    let last_workout = logs()
        .select_only()
        .column(workout_log::Column::CompletedAt)
        .order_by_desc(workout_log::Column::CompletedAt)
        .into_tuple::<NaiveDateTime>()
        .one(db)
        .await?;
    debug!("Computed client stats over {} plans and {} logs", total_plans, total_workouts);

    let completion_rate = if total_workouts == 0 {
        0
    } else {
        (completed_workouts as f64 * 100.0 / total_workouts as f64).round() as i32
    };

    Ok(ClientStats {
        total_plans,
        active_plans,
        total_workouts,
        completed_workouts,
        completion_rate,
        avg_duration: durations.map(|d| d.average()).unwrap_or(0.0),
        last_workout,
    })
}
