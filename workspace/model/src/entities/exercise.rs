use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Difficulty grade, shared by exercises and plan levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[sea_orm(string_value = "beginner")]
    Beginner,
    #[sea_orm(string_value = "intermediate")]
    Intermediate,
    #[sea_orm(string_value = "advanced")]
    Advanced,
}

/// A catalog exercise. Immutable after creation apart from soft deactivation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "exercises")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    /// Encoded with [`crate::lists`].
    pub muscle_groups: String,
    /// Encoded with [`crate::lists`].
    pub equipment: String,
    pub difficulty: Difficulty,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Creator,
    #[sea_orm(has_many = "super::session_exercise::Entity")]
    SessionExercise,
}

impl Related<super::session_exercise::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionExercise.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
