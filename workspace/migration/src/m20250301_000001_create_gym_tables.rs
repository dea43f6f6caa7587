use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(string(Users::FirstName))
                    .col(string(Users::LastName))
                    .col(string_null(Users::Phone))
                    .col(date_null(Users::DateOfBirth))
                    .col(string_len_null(Users::Gender, 16))
                    .col(string_len(Users::Role, 16))
                    .col(boolean(Users::IsActive).default(true))
                    .col(boolean(Users::IsVerified).default(false))
                    .col(boolean(Users::IsApproved).default(false))
                    .col(integer_null(Users::ApprovedBy))
                    .col(date_time_null(Users::ApprovedAt))
                    .col(string_null(Users::ApprovalNote))
                    .col(integer_null(Users::AssignedTrainerId))
                    .col(string(Users::Specialization).default(""))
                    .col(string(Users::Certifications).default(""))
                    .col(text_null(Users::Bio))
                    .col(integer_null(Users::ExperienceYears))
                    .col(integer(Users::LoginAttempts).default(0))
                    .col(date_time_null(Users::LockUntil))
                    .col(date_time_null(Users::LastLogin))
                    .col(date_time(Users::CreatedAt))
                    .col(date_time(Users::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_assigned_trainer")
                            .from(Users::Table, Users::AssignedTrainerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create trainer_change_requests table
        manager
            .create_table(
                Table::create()
                    .table(TrainerChangeRequests::Table)
                    .if_not_exists()
                    .col(pk_auto(TrainerChangeRequests::Id))
                    .col(integer(TrainerChangeRequests::ClientId))
                    .col(integer(TrainerChangeRequests::RequestedTrainerId))
                    .col(text_null(TrainerChangeRequests::Reason))
                    .col(string_len(TrainerChangeRequests::Status, 16))
                    .col(date_time(TrainerChangeRequests::RequestedAt))
                    .col(date_time_null(TrainerChangeRequests::ProcessedAt))
                    .col(integer_null(TrainerChangeRequests::ProcessedBy))
                    .col(text_null(TrainerChangeRequests::DecisionNote))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_change_request_client")
                            .from(TrainerChangeRequests::Table, TrainerChangeRequests::ClientId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_change_request_trainer")
                            .from(TrainerChangeRequests::Table, TrainerChangeRequests::RequestedTrainerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_change_requests_client_status")
                    .table(TrainerChangeRequests::Table)
                    .col(TrainerChangeRequests::ClientId)
                    .col(TrainerChangeRequests::Status)
                    .to_owned(),
            )
            .await?;

        // Create exercises table
        manager
            .create_table(
                Table::create()
                    .table(Exercises::Table)
                    .if_not_exists()
                    .col(pk_auto(Exercises::Id))
                    .col(string(Exercises::Name))
                    .col(text_null(Exercises::Description))
                    .col(text_null(Exercises::Instructions))
                    .col(string(Exercises::MuscleGroups).default(""))
                    .col(string(Exercises::Equipment).default(""))
                    .col(string_len(Exercises::Difficulty, 16))
                    .col(boolean(Exercises::IsActive).default(true))
                    .col(integer_null(Exercises::CreatedBy))
                    .col(date_time(Exercises::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exercise_creator")
                            .from(Exercises::Table, Exercises::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create workout_sessions table
        manager
            .create_table(
                Table::create()
                    .table(WorkoutSessions::Table)
                    .if_not_exists()
                    .col(pk_auto(WorkoutSessions::Id))
                    .col(string(WorkoutSessions::Name))
                    .col(string_len(WorkoutSessions::DayOfWeek, 16))
                    .col(text_null(WorkoutSessions::Notes))
                    .col(integer_null(WorkoutSessions::EstimatedDuration))
                    .col(date_time(WorkoutSessions::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create session_exercises table
        manager
            .create_table(
                Table::create()
                    .table(SessionExercises::Table)
                    .if_not_exists()
                    .col(pk_auto(SessionExercises::Id))
                    .col(integer(SessionExercises::SessionId))
                    .col(integer(SessionExercises::ExerciseId))
                    .col(integer(SessionExercises::Position))
                    .col(integer(SessionExercises::Sets))
                    .col(string(SessionExercises::Reps))
                    .col(string_null(SessionExercises::Weight))
                    .col(integer_null(SessionExercises::RestSeconds))
                    .col(text_null(SessionExercises::Notes))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_exercise_session")
                            .from(SessionExercises::Table, SessionExercises::SessionId)
                            .to(WorkoutSessions::Table, WorkoutSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_exercise_exercise")
                            .from(SessionExercises::Table, SessionExercises::ExerciseId)
                            .to(Exercises::Table, Exercises::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create workout_plans table
        manager
            .create_table(
                Table::create()
                    .table(WorkoutPlans::Table)
                    .if_not_exists()
                    .col(pk_auto(WorkoutPlans::Id))
                    .col(string(WorkoutPlans::Name))
                    .col(text_null(WorkoutPlans::Description))
                    .col(integer(WorkoutPlans::ClientId))
                    .col(integer(WorkoutPlans::TrainerId))
                    .col(string(WorkoutPlans::Frequency))
                    .col(string_len_null(WorkoutPlans::Level, 16))
                    .col(string(WorkoutPlans::Goals).default(""))
                    .col(text_null(WorkoutPlans::Notes))
                    .col(date_null(WorkoutPlans::StartDate))
                    .col(date_null(WorkoutPlans::EndDate))
                    .col(integer(WorkoutPlans::TotalWeeks).default(4))
                    .col(integer(WorkoutPlans::CurrentWeek).default(1))
                    .col(boolean(WorkoutPlans::IsTemplate).default(false))
                    .col(string_null(WorkoutPlans::TemplateName))
                    .col(boolean(WorkoutPlans::IsActive).default(true))
                    .col(integer(WorkoutPlans::CompletionRate).default(0))
                    .col(integer(WorkoutPlans::CompletedSessions).default(0))
                    .col(date_time_null(WorkoutPlans::LastCompletedAt))
                    .col(date_time(WorkoutPlans::CreatedAt))
                    .col(date_time(WorkoutPlans::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plan_client")
                            .from(WorkoutPlans::Table, WorkoutPlans::ClientId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plan_trainer")
                            .from(WorkoutPlans::Table, WorkoutPlans::TrainerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create plan_sessions table (join table)
        manager
            .create_table(
                Table::create()
                    .table(PlanSessions::Table)
                    .if_not_exists()
                    .col(integer(PlanSessions::PlanId))
                    .col(integer(PlanSessions::SessionId))
                    .col(integer(PlanSessions::Position))
                    .primary_key(
                        Index::create()
                            .name("pk_plan_sessions")
                            .col(PlanSessions::PlanId)
                            .col(PlanSessions::SessionId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plan_sessions_plan")
                            .from(PlanSessions::Table, PlanSessions::PlanId)
                            .to(WorkoutPlans::Table, WorkoutPlans::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plan_sessions_session")
                            .from(PlanSessions::Table, PlanSessions::SessionId)
                            .to(WorkoutSessions::Table, WorkoutSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create plan_completions table
        manager
            .create_table(
                Table::create()
                    .table(PlanCompletions::Table)
                    .if_not_exists()
                    .col(integer(PlanCompletions::PlanId))
                    .col(integer(PlanCompletions::SessionId))
                    .col(integer(PlanCompletions::Week))
                    .primary_key(
                        Index::create()
                            .name("pk_plan_completions")
                            .col(PlanCompletions::PlanId)
                            .col(PlanCompletions::SessionId)
                            .col(PlanCompletions::Week),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plan_completions_plan")
                            .from(PlanCompletions::Table, PlanCompletions::PlanId)
                            .to(WorkoutPlans::Table, WorkoutPlans::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create workout_logs table
        manager
            .create_table(
                Table::create()
                    .table(WorkoutLogs::Table)
                    .if_not_exists()
                    .col(pk_auto(WorkoutLogs::Id))
                    .col(integer(WorkoutLogs::ClientId))
                    .col(integer(WorkoutLogs::TrainerId))
                    .col(integer(WorkoutLogs::PlanId))
                    .col(integer(WorkoutLogs::SessionId))
                    .col(integer(WorkoutLogs::Week))
                    .col(string_len(WorkoutLogs::DayOfWeek, 16))
                    .col(date_time(WorkoutLogs::CompletedAt))
                    .col(integer_null(WorkoutLogs::ActualDuration))
                    .col(json_null(WorkoutLogs::Exercises))
                    .col(text_null(WorkoutLogs::OverallNotes))
                    .col(integer_null(WorkoutLogs::Difficulty))
                    .col(integer_null(WorkoutLogs::Energy))
                    .col(integer_null(WorkoutLogs::Mood))
                    .col(integer_null(WorkoutLogs::PainLevel))
                    .col(boolean(WorkoutLogs::IsCompleted).default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workout_log_plan")
                            .from(WorkoutLogs::Table, WorkoutLogs::PlanId)
                            .to(WorkoutPlans::Table, WorkoutPlans::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workout_log_client")
                            .from(WorkoutLogs::Table, WorkoutLogs::ClientId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_workout_logs_client_completed_at")
                    .table(WorkoutLogs::Table)
                    .col(WorkoutLogs::ClientId)
                    .col(WorkoutLogs::CompletedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order of creation to respect foreign keys
        manager
            .drop_table(Table::drop().table(WorkoutLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlanCompletions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlanSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkoutPlans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SessionExercises::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkoutSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Exercises::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TrainerChangeRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    Phone,
    DateOfBirth,
    Gender,
    Role,
    IsActive,
    IsVerified,
    IsApproved,
    ApprovedBy,
    ApprovedAt,
    ApprovalNote,
    AssignedTrainerId,
    Specialization,
    Certifications,
    Bio,
    ExperienceYears,
    LoginAttempts,
    LockUntil,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TrainerChangeRequests {
    Table,
    Id,
    ClientId,
    RequestedTrainerId,
    Reason,
    Status,
    RequestedAt,
    ProcessedAt,
    ProcessedBy,
    DecisionNote,
}

#[derive(DeriveIden)]
enum Exercises {
    Table,
    Id,
    Name,
    Description,
    Instructions,
    MuscleGroups,
    Equipment,
    Difficulty,
    IsActive,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum WorkoutSessions {
    Table,
    Id,
    Name,
    DayOfWeek,
    Notes,
    EstimatedDuration,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SessionExercises {
    Table,
    Id,
    SessionId,
    ExerciseId,
    Position,
    Sets,
    Reps,
    Weight,
    RestSeconds,
    Notes,
}

#[derive(DeriveIden)]
enum WorkoutPlans {
    Table,
    Id,
    Name,
    Description,
    ClientId,
    TrainerId,
    Frequency,
    Level,
    Goals,
    Notes,
    StartDate,
    EndDate,
    TotalWeeks,
    CurrentWeek,
    IsTemplate,
    TemplateName,
    IsActive,
    CompletionRate,
    CompletedSessions,
    LastCompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PlanSessions {
    Table,
    PlanId,
    SessionId,
    Position,
}

#[derive(DeriveIden)]
enum PlanCompletions {
    Table,
    PlanId,
    SessionId,
    Week,
}

#[derive(DeriveIden)]
enum WorkoutLogs {
    Table,
    Id,
    ClientId,
    TrainerId,
    PlanId,
    SessionId,
    Week,
    DayOfWeek,
    CompletedAt,
    ActualDuration,
    Exercises,
    OverallNotes,
    Difficulty,
    Energy,
    Mood,
    PainLevel,
    IsCompleted,
}
