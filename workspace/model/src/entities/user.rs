use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of an account. Decides which parts of the API the account may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "client")]
    Client,
    #[sea_orm(string_value = "trainer")]
    Trainer,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Self::Client
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Trainer => "trainer",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[sea_orm(string_value = "male")]
    Male,
    #[sea_orm(string_value = "female")]
    Female,
    #[sea_orm(string_value = "other")]
    Other,
}

/// An account of the platform: a client, a trainer or an admin.
///
/// Accounts are never hard-deleted, only deactivated through `is_active`.
/// `is_approved` is only meaningful for trainers; unapproved trainers can log in
/// but cannot author plans or receive clients.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub role: Role,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    #[sea_orm(default_value = "false")]
    pub is_verified: bool,
    #[sea_orm(default_value = "false")]
    pub is_approved: bool,
    /// Admin who last changed the approval flag.
    pub approved_by: Option<i32>,
    pub approved_at: Option<NaiveDateTime>,
    pub approval_note: Option<String>,
    /// Trainer this client is bound to.
    pub assigned_trainer_id: Option<i32>,
    /// Encoded with [`crate::lists`].
    pub specialization: String,
    /// Encoded with [`crate::lists`].
    pub certifications: String,
    pub bio: Option<String>,
    pub experience_years: Option<i32>,
    #[sea_orm(default_value = "0")]
    pub login_attempts: i32,
    pub lock_until: Option<NaiveDateTime>,
    pub last_login: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_locked(&self, now: NaiveDateTime) -> bool {
        self.lock_until.is_some_and(|until| until > now)
    }

    /// A trainer that may receive clients and author plans.
    pub fn is_approved_trainer(&self) -> bool {
        self.role == Role::Trainer && self.is_approved
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::AssignedTrainerId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    AssignedTrainer,
}

impl ActiveModelBehavior for ActiveModel {}
