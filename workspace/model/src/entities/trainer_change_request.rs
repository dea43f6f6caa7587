use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::user;

/// Lifecycle of a change request. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ChangeRequestStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl Default for ChangeRequestStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl ChangeRequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChangeRequestStatus::Pending)
    }
}

/// A client's request to be moved to another trainer.
/// At most one row per client is pending at any time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "trainer_change_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client_id: i32,
    pub requested_trainer_id: i32,
    pub reason: Option<String>,
    pub status: ChangeRequestStatus,
    pub requested_at: NaiveDateTime,
    pub processed_at: Option<NaiveDateTime>,
    pub processed_by: Option<i32>,
    pub decision_note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::ClientId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::RequestedTrainerId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    RequestedTrainer,
}

impl ActiveModelBehavior for ActiveModel {}
