use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use model::entities::{exercise, user, workout_session::DayOfWeek};
use model::lists;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, Set};

use crate::plans::{NewPlan, NewSession, NewSessionExercise};

pub type Result<T> = std::result::Result<T, DbErr>;

pub async fn setup_db() -> Result<DatabaseConnection> {
    // Connect to the SQLite database
    let db = Database::connect("sqlite::memory:").await?;

    // Enable foreign keys
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

pub async fn new_user(db: &DatabaseConnection, role: user::Role, approved: bool) -> Result<user::Model> {
    static USER_ID: AtomicU64 = AtomicU64::new(0);

    let current_id = USER_ID.fetch_add(1, Ordering::SeqCst);
    let now = Utc::now().naive_utc();
    user::ActiveModel {
        username: Set(format!("{}_{}", role.as_str(), current_id)),
        email: Set(format!("{}_{}@gym.test", role.as_str(), current_id)),
        password_hash: Set("not-a-hash".to_string()),
        first_name: Set("Test".to_string()),
        last_name: Set(format!("User {current_id}")),
        role: Set(role),
        is_active: Set(true),
        is_verified: Set(false),
        is_approved: Set(approved),
        specialization: Set(String::new()),
        certifications: Set(String::new()),
        login_attempts: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_client(db: &DatabaseConnection) -> Result<user::Model> {
    new_user(db, user::Role::Client, true).await
}

pub async fn new_trainer(db: &DatabaseConnection) -> Result<user::Model> {
    new_user(db, user::Role::Trainer, true).await
}

pub async fn new_exercise(db: &DatabaseConnection, name: &str) -> Result<exercise::Model> {
    exercise::ActiveModel {
        name: Set(name.to_string()),
        muscle_groups: Set(lists::encode(&["legs"])),
        equipment: Set(lists::encode(&["barbell"])),
        difficulty: Set(exercise::Difficulty::Beginner),
        is_active: Set(true),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Binds `client` to `trainer` without going through the workflow.
pub async fn bind(db: &DatabaseConnection, client: &user::Model, trainer: &user::Model) -> Result<user::Model> {
    let mut active: user::ActiveModel = client.clone().into();
    active.assigned_trainer_id = Set(Some(trainer.id));
    active.update(db).await
}

pub fn session(name: &str, day: DayOfWeek, exercise_ids: &[i32]) -> NewSession {
    NewSession {
        name: name.to_string(),
        day_of_week: day,
        notes: None,
        estimated_duration: Some(45),
        exercises: exercise_ids
            .iter()
            .map(|id| NewSessionExercise {
                exercise_id: *id,
                sets: 3,
                reps: "10".to_string(),
                weight: None,
                rest_seconds: Some(90),
                notes: None,
            })
            .collect(),
    }
}

pub fn plan(name: &str, sessions: Vec<NewSession>) -> NewPlan {
    NewPlan {
        name: name.to_string(),
        description: None,
        frequency: "3x_week".to_string(),
        level: None,
        goals: vec!["strength".to_string()],
        notes: None,
        start_date: None,
        end_date: None,
        total_weeks: None,
        is_template: false,
        template_name: None,
        sessions,
    }
}
