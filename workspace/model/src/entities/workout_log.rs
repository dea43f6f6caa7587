use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

use super::workout_session::DayOfWeek;

/// One completed session instance. Append-only.
///
/// `session_id` is kept as a plain value: sessions may be replaced after the
/// log was written and the log must survive that.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "workout_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client_id: i32,
    pub trainer_id: i32,
    pub plan_id: i32,
    pub session_id: i32,
    pub week: i32,
    pub day_of_week: DayOfWeek,
    pub completed_at: NaiveDateTime,
    /// Minutes.
    pub actual_duration: Option<i32>,
    /// Per-exercise performed sets.
    pub exercises: Option<Json>,
    pub overall_notes: Option<String>,
    pub difficulty: Option<i32>,
    pub energy: Option<i32>,
    pub mood: Option<i32>,
    pub pain_level: Option<i32>,
    #[sea_orm(default_value = "true")]
    pub is_completed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workout_plan::Entity",
        from = "Column::PlanId",
        to = "super::workout_plan::Column::Id",
        on_delete = "Cascade"
    )]
    Plan,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ClientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
}

impl Related<super::workout_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
