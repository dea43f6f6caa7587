//! SeaORM entities of the gym platform: accounts, the exercise catalog,
//! plans with their sessions, workout logs and trainer change requests.

pub mod exercise;
pub mod plan_completion;
pub mod plan_session;
pub mod session_exercise;
pub mod trainer_change_request;
pub mod user;
pub mod workout_log;
pub mod workout_plan;
pub mod workout_session;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::exercise::Entity as Exercise;
    pub use super::plan_completion::Entity as PlanCompletion;
    pub use super::plan_session::Entity as PlanSession;
    pub use super::session_exercise::Entity as SessionExercise;
    pub use super::trainer_change_request::Entity as TrainerChangeRequest;
    pub use super::user::Entity as User;
    pub use super::workout_log::Entity as WorkoutLog;
    pub use super::workout_plan::Entity as WorkoutPlan;
    pub use super::workout_session::Entity as WorkoutSession;
}
