use chrono::{NaiveDateTime, Weekday};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    #[sea_orm(string_value = "monday")]
    Monday,
    #[sea_orm(string_value = "tuesday")]
    Tuesday,
    #[sea_orm(string_value = "wednesday")]
    Wednesday,
    #[sea_orm(string_value = "thursday")]
    Thursday,
    #[sea_orm(string_value = "friday")]
    Friday,
    #[sea_orm(string_value = "saturday")]
    Saturday,
    #[sea_orm(string_value = "sunday")]
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// One training day of a plan. Owned by exactly one plan through `plan_sessions`.
///
/// Sessions are never edited in place: updating a plan's sessions deletes the
/// old rows and inserts fresh ones.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "workout_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub day_of_week: DayOfWeek,
    pub notes: Option<String>,
    /// Minutes.
    pub estimated_duration: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session_exercise::Entity")]
    SessionExercise,
    #[sea_orm(has_many = "super::plan_session::Entity")]
    PlanSession,
}

impl Related<super::session_exercise::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionExercise.def()
    }
}

impl Related<super::workout_plan::Entity> for Entity {
    fn to() -> RelationDef {
        super::plan_session::Relation::Plan.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::plan_session::Relation::Session.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
