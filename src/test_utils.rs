#[cfg(test)]
pub mod test_utils {
    use crate::cli::commands::{create_admin::insert_admin, AdminAccount};
    use crate::config::{build_app_state, Settings};
    use crate::router::create_router;
    use crate::schemas::{ApiResponse, AppState};
    use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
    use axum::Router;
    use axum_test::TestServer;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
    use serde_json::{json, Value};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    pub const PASSWORD: &str = "secret123";

    /// `Authorization` header value for a token
    pub fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
    }

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");
        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        build_app_state(db, Settings::for_tests())
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level comes from `RUST_LOG`, defaulting to WARN.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let _ = init_test_tracing();
        create_router(setup_test_app_state().await)
    }

    /// Test server over a fresh app, plus its state for direct database access
    pub async fn setup_test_server() -> (TestServer, AppState) {
        let _ = init_test_tracing();
        let state = setup_test_app_state().await;
        let server = TestServer::new(create_router(state.clone())).unwrap();
        (server, state)
    }

    /// Registers an account and returns `(user id, token)`.
    pub async fn register(server: &TestServer, username: &str, role: &str) -> (i64, String) {
        let response = server
            .post("/api/v1/auth/register")
            .json(&json!({
                "username": username,
                "email": format!("{username}@gym.test"),
                "password": PASSWORD,
                "first_name": "Test",
                "last_name": username,
                "role": role,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: ApiResponse<Value> = response.json();
        (
            body.data["user"]["id"].as_i64().unwrap(),
            body.data["token"].as_str().unwrap().to_string(),
        )
    }

    /// Logs in and returns the token.
    pub async fn login(server: &TestServer, username: &str) -> String {
        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({ "username": username, "password": PASSWORD }))
            .await;
        response.assert_status_ok();

        let body: ApiResponse<Value> = response.json();
        body.data["token"].as_str().unwrap().to_string()
    }

    /// Inserts an admin directly, the way `create-admin` does, and logs in.
    pub async fn admin_token(server: &TestServer, state: &AppState) -> String {
        let account = AdminAccount {
            username: "admin".to_string(),
            email: "admin@gym.test".to_string(),
            password: PASSWORD.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Admin".to_string(),
        };
        insert_admin(&state.db, account, state.settings.bcrypt_cost)
            .await
            .expect("Failed to create admin");
        login(server, "admin").await
    }

    /// Registers a trainer and has the admin approve it. Returns `(trainer id, token)`.
    pub async fn approved_trainer(server: &TestServer, admin: &str, username: &str) -> (i64, String) {
        let (trainer_id, token) = register(server, username, "trainer").await;
        server
            .put(&format!("/api/v1/users/trainer/{trainer_id}/approve"))
            .add_header(AUTHORIZATION, bearer(admin))
            .json(&json!({ "is_approved": true }))
            .await
            .assert_status_ok();
        (trainer_id, token)
    }

    /// Creates an exercise as `trainer` and returns its id.
    pub async fn create_exercise(server: &TestServer, trainer: &str, name: &str) -> i64 {
        let response = server
            .post("/api/v1/workouts/exercises")
            .add_header(AUTHORIZATION, bearer(trainer))
            .json(&json!({
                "name": name,
                "muscle_groups": ["legs"],
                "equipment": ["barbell"],
                "difficulty": "intermediate",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        body.data["id"].as_i64().unwrap()
    }
}
