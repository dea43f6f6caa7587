use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::entity::prelude::*;

use super::exercise::Difficulty;

/// A multi-week training plan a trainer authors for one of their clients.
///
/// `client_id`'s assigned trainer equals `trainer_id` at creation time; this is
/// not re-checked when the client later changes trainer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "workout_plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub client_id: i32,
    pub trainer_id: i32,
    pub frequency: String,
    pub level: Option<Difficulty>,
    /// Encoded with [`crate::lists`].
    pub goals: String,
    pub notes: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[sea_orm(default_value = "4")]
    pub total_weeks: i32,
    #[sea_orm(default_value = "1")]
    pub current_week: i32,
    #[sea_orm(default_value = "false")]
    pub is_template: bool,
    pub template_name: Option<String>,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    /// Percentage in `0..=100`.
    #[sea_orm(default_value = "0")]
    pub completion_rate: i32,
    #[sea_orm(default_value = "0")]
    pub completed_sessions: i32,
    pub last_completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ClientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::TrainerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Trainer,
    #[sea_orm(has_many = "super::plan_session::Entity")]
    PlanSession,
    #[sea_orm(has_many = "super::plan_completion::Entity")]
    PlanCompletion,
    #[sea_orm(has_many = "super::workout_log::Entity")]
    WorkoutLog,
}

impl Related<super::workout_session::Entity> for Entity {
    fn to() -> RelationDef {
        super::plan_session::Relation::Session.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::plan_session::Relation::Plan.def().rev())
    }
}

impl Related<super::plan_completion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlanCompletion.def()
    }
}

impl Related<super::workout_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkoutLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
