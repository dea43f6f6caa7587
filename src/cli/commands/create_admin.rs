use anyhow::{bail, Context, Result};
use migration::{Migrator, MigratorTrait};
use model::entities::user::{self, Role};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, trace};

use super::initdb::connect;
use crate::auth::hash_password;
use crate::config::Settings;

pub struct AdminAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

pub async fn create_admin(settings: &Settings, account: AdminAccount) -> Result<()> {
    trace!("Entering create_admin function");
    let db = connect(&settings.database_url).await?;
    Migrator::up(&db, None).await.context("Failed to run database migrations")?;

    let admin = insert_admin(&db, account, settings.bcrypt_cost).await?;
    info!("Admin account {} '{}' created", admin.id, admin.username);
    Ok(())
}

pub(crate) async fn insert_admin(db: &DatabaseConnection, account: AdminAccount, bcrypt_cost: u32) -> Result<user::Model> {
    if account.password.len() < 6 {
        bail!("Password must be at least 6 characters");
    }

    let taken = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(&account.username))
                .add(user::Column::Email.eq(&account.email)),
        )
        .one(db)
        .await?;
    if taken.is_some() {
        bail!("Username or email already in use");
    }

    let password_hash = hash_password(&account.password, bcrypt_cost).context("Failed to hash password")?;
    let now = domain::now();

    let admin = user::ActiveModel {
        username: Set(account.username),
        email: Set(account.email),
        password_hash: Set(password_hash),
        first_name: Set(account.first_name),
        last_name: Set(account.last_name),
        role: Set(Role::Admin),
        is_active: Set(true),
        is_verified: Set(true),
        is_approved: Set(true),
        specialization: Set(String::new()),
        certifications: Set(String::new()),
        login_attempts: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(admin)
}
