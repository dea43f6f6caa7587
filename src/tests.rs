#[cfg(test)]
mod integration_tests {
    use crate::schemas::{ApiResponse, ErrorResponse};
    use crate::test_utils::test_utils::{
        admin_token, approved_trainer, bearer, create_exercise, login, register, setup_test_app,
        setup_test_server, PASSWORD,
    };
    use axum::http::{header::AUTHORIZATION, StatusCode};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    /// Client `username` bound to `trainer`, returning `(client id, client token)`.
    async fn assigned_client(server: &TestServer, trainer: &str, username: &str) -> (i64, String) {
        let (client_id, client_token) = register(server, username, "client").await;
        server
            .post("/api/v1/users/trainer/assign-client")
            .add_header(AUTHORIZATION, bearer(trainer))
            .json(&json!({ "client_id": client_id }))
            .await
            .assert_status_ok();
        (client_id, client_token)
    }

    fn two_session_plan(client_id: i64, exercise_id: i64) -> Value {
        json!({
            "name": "Strength block",
            "client_id": client_id,
            "frequency": "3x_week",
            "level": "beginner",
            "goals": ["strength", "mobility"],
            "total_weeks": 4,
            "sessions": [
                {
                    "name": "Lower body",
                    "day_of_week": "monday",
                    "estimated_duration": 60,
                    "exercises": [
                        { "exercise_id": exercise_id, "sets": 5, "reps": "5", "weight": "80kg", "rest_seconds": 180 }
                    ]
                },
                {
                    "name": "Conditioning",
                    "day_of_week": "thursday",
                    "exercises": [
                        { "exercise_id": exercise_id, "sets": 3, "reps": "8-12" }
                    ]
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_register_login_and_verify() {
        let (server, _) = setup_test_server().await;

        let response = server
            .post("/api/v1/auth/register")
            .json(&json!({
                "username": "athlete",
                "email": "athlete@gym.test",
                "password": PASSWORD,
                "first_name": "Alex",
                "last_name": "Runner",
                "gender": "other",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        assert!(body.success);
        assert_eq!(body.message, "User registered successfully");
        assert_eq!(body.data["user"]["role"], "client");
        assert_eq!(body.data["user"]["full_name"], "Alex Runner");
        assert!(body.data["user"].get("password_hash").is_none());

        // Login by email works as well as by username
        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({ "username": "athlete@gym.test", "password": PASSWORD }))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.message, "Login successful");
        let token = body.data["token"].as_str().unwrap().to_string();
        assert!(body.data["expires_in"].as_i64().unwrap() > 0);

        let response = server
            .get("/api/v1/auth/verify")
            .add_header(AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["valid"], true);
        assert_eq!(body.data["user"]["username"], "athlete");

        let response = server
            .post("/api/v1/auth/refresh")
            .add_header(AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status_ok();

        server
            .post("/api/v1/auth/logout")
            .add_header(AUTHORIZATION, bearer(&token))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_admin_role() {
        let (server, _) = setup_test_server().await;
        register(&server, "taken", "client").await;

        let response = server
            .post("/api/v1/auth/register")
            .json(&json!({
                "username": "taken",
                "email": "other@gym.test",
                "password": PASSWORD,
                "first_name": "Dup",
                "last_name": "User",
            }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let body: ErrorResponse = response.json();
        assert!(!body.success);
        assert_eq!(body.code, "CONFLICT");
        assert_eq!(body.message, "Username already exists");

        let response = server
            .post("/api/v1/auth/register")
            .json(&json!({
                "username": "sneaky",
                "email": "sneaky@gym.test",
                "password": PASSWORD,
                "first_name": "Sneaky",
                "last_name": "Admin",
                "role": "admin",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_validation_errors_use_envelope() {
        let (server, _) = setup_test_server().await;

        let response = server
            .post("/api/v1/auth/register")
            .json(&json!({
                "username": "ok_name",
                "email": "not-an-email",
                "password": "123",
                "first_name": "A",
                "last_name": "B",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert!(!body.success);
        assert_eq!(body.code, "VALIDATION_ERROR");
        assert_eq!(body.message, "Invalid input data");
        let fields: Vec<String> = body.errors.unwrap().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["email".to_string(), "password".to_string()]);
        assert!(body.error.is_none());
    }

    #[tokio::test]
    async fn test_login_lockout_after_failed_attempts() {
        let (server, _) = setup_test_server().await;
        register(&server, "forgetful", "client").await;

        for _ in 0..5 {
            let response = server
                .post("/api/v1/auth/login")
                .json(&json!({ "username": "forgetful", "password": "wrong-password" }))
                .await;
            response.assert_status(StatusCode::UNAUTHORIZED);
            let body: ErrorResponse = response.json();
            assert_eq!(body.message, "Invalid credentials");
        }

        // Even the right password is refused while locked
        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({ "username": "forgetful", "password": PASSWORD }))
            .await;
        response.assert_status(StatusCode::LOCKED);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "ACCOUNT_LOCKED");
    }

    #[tokio::test]
    async fn test_authentication_and_role_gates() {
        let (server, _) = setup_test_server().await;
        let (_, client_token) = register(&server, "member", "client").await;

        let response = server.get("/api/v1/users/profile").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "UNAUTHORIZED");

        server
            .get("/api/v1/users/profile")
            .add_header(AUTHORIZATION, bearer("not-a-token"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .get("/api/v1/users")
            .add_header(AUTHORIZATION, bearer(&client_token))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "FORBIDDEN");

        server
            .get("/api/v1/workouts/plans")
            .add_header(AUTHORIZATION, bearer(&client_token))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_deactivated_account_token_is_rejected() {
        let (server, state) = setup_test_server().await;
        let admin = admin_token(&server, &state).await;
        let (client_id, client_token) = register(&server, "leaver", "client").await;

        server
            .put(&format!("/api/v1/users/admin/user/{client_id}/toggle-status"))
            .add_header(AUTHORIZATION, bearer(&admin))
            .json(&json!({ "is_active": false }))
            .await
            .assert_status_ok();

        let response = server
            .get("/api/v1/users/profile")
            .add_header(AUTHORIZATION, bearer(&client_token))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = response.json();
        assert_eq!(body.message, "Account is deactivated");
    }

    #[tokio::test]
    async fn test_assignment_requires_approved_trainer() {
        let (server, state) = setup_test_server().await;
        let admin = admin_token(&server, &state).await;
        let (client_id, client_token) = register(&server, "client_a", "client").await;
        let (trainer_id, trainer_token) = register(&server, "trainer_b", "trainer").await;

        let response = server
            .post("/api/v1/users/trainer/assign-client")
            .add_header(AUTHORIZATION, bearer(&trainer_token))
            .json(&json!({ "client_id": client_id }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert!(body.message.contains("not approved"));

        let response = server
            .put(&format!("/api/v1/users/trainer/{trainer_id}/approve"))
            .add_header(AUTHORIZATION, bearer(&admin))
            .json(&json!({ "is_approved": true }))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.message, "Trainer approved successfully");

        let response = server
            .post("/api/v1/users/trainer/assign-client")
            .add_header(AUTHORIZATION, bearer(&trainer_token))
            .json(&json!({ "client_id": client_id }))
            .await;
        response.assert_status_ok();

        let response = server
            .get("/api/v1/users/profile")
            .add_header(AUTHORIZATION, bearer(&client_token))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["user"]["assigned_trainer_id"], trainer_id);
        assert_eq!(body.data["assigned_trainer"]["username"], "trainer_b");

        // Trainers cannot assign clients to somebody else
        let response = server
            .post("/api/v1/users/trainer/assign-client")
            .add_header(AUTHORIZATION, bearer(&trainer_token))
            .json(&json!({ "client_id": client_id, "trainer_id": trainer_id + 100 }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_trainer_change_request_flow() {
        let (server, state) = setup_test_server().await;
        let admin = admin_token(&server, &state).await;
        let (_, first_token) = approved_trainer(&server, &admin, "coach_one").await;
        let (second_id, _) = approved_trainer(&server, &admin, "coach_two").await;
        let (third_id, _) = approved_trainer(&server, &admin, "coach_three").await;
        let (client_id, client_token) = assigned_client(&server, &first_token, "switcher").await;

        let response = server
            .post("/api/v1/users/client/request-trainer-change")
            .add_header(AUTHORIZATION, bearer(&client_token))
            .json(&json!({ "requested_trainer_id": second_id, "reason": "schedule" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["status"], "pending");

        // A second request while one is pending is rejected
        let response = server
            .post("/api/v1/users/client/request-trainer-change")
            .add_header(AUTHORIZATION, bearer(&client_token))
            .json(&json!({ "requested_trainer_id": third_id }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .get("/api/v1/users/admin/trainer-change-requests")
            .add_header(AUTHORIZATION, bearer(&admin))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["pagination"]["total"], 1);
        assert_eq!(body.data["items"][0]["client"]["username"], "switcher");

        let response = server
            .put(&format!("/api/v1/users/admin/trainer-change/{client_id}"))
            .add_header(AUTHORIZATION, bearer(&admin))
            .json(&json!({ "approved": true }))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["request"]["status"], "approved");
        assert_eq!(body.data["client"]["assigned_trainer_id"], second_id);

        // Nothing left to process
        server
            .put(&format!("/api/v1/users/admin/trainer-change/{client_id}"))
            .add_header(AUTHORIZATION, bearer(&admin))
            .json(&json!({ "approved": false }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_plan_log_and_statistics_flow() {
        let (server, state) = setup_test_server().await;
        let admin = admin_token(&server, &state).await;
        let (trainer_id, trainer) = approved_trainer(&server, &admin, "coach").await;
        let (client_id, client) = assigned_client(&server, &trainer, "lifter").await;
        let squat = create_exercise(&server, &trainer, "Back squat").await;

        let response = server
            .post("/api/v1/workouts/plans")
            .add_header(AUTHORIZATION, bearer(&trainer))
            .json(&two_session_plan(client_id, squat))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        let plan = &body.data;
        let plan_id = plan["id"].as_i64().unwrap();
        assert_eq!(plan["trainer_id"], trainer_id);
        assert_eq!(plan["goals"], json!(["strength", "mobility"]));
        assert_eq!(plan["sessions"].as_array().unwrap().len(), 2);
        assert_eq!(plan["sessions"][0]["exercises"][0]["exercise"]["name"], "Back squat");
        let session_id = plan["sessions"][0]["id"].as_i64().unwrap();

        // Prime the trainer statistics cache
        let response = server
            .get("/api/v1/workouts/stats")
            .add_header(AUTHORIZATION, bearer(&trainer))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["total_plans"], 1);
        assert_eq!(body.data["avg_completion_rate"], 0.0);

        let response = server
            .get("/api/v1/client/plans")
            .add_header(AUTHORIZATION, bearer(&client))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["pagination"]["total"], 1);
        assert_eq!(body.data["items"][0]["trainer"]["username"], "coach");

        let response = server
            .post("/api/v1/client/logs")
            .add_header(AUTHORIZATION, bearer(&client))
            .json(&json!({
                "plan_id": plan_id,
                "session_id": session_id,
                "week": 1,
                "actual_duration": 55,
                "exercises": [
                    { "exercise_id": squat, "sets": [{ "reps": 5, "weight": 80.0 }] }
                ],
                "difficulty": 7,
                "energy": 6,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        // one of 2 sessions x 4 weeks
        assert_eq!(body.data["plan"]["completion_rate"], 13);
        assert_eq!(body.data["plan"]["completed_sessions"], 1);
        assert_eq!(body.data["log"]["day_of_week"], "monday");

        // Week outside the plan
        let response = server
            .post("/api/v1/client/logs")
            .add_header(AUTHORIZATION, bearer(&client))
            .json(&json!({ "plan_id": plan_id, "session_id": session_id, "week": 9 }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // The log invalidated the cached statistics
        let response = server
            .get("/api/v1/workouts/stats")
            .add_header(AUTHORIZATION, bearer(&trainer))
            .await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["avg_completion_rate"], 13.0);
        assert_eq!(body.data["total_clients"], 1);

        let response = server
            .get("/api/v1/client/stats")
            .add_header(AUTHORIZATION, bearer(&client))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["total_workouts"], 1);
        assert_eq!(body.data["completed_workouts"], 1);
        assert_eq!(body.data["completion_rate"], 100);
        assert_eq!(body.data["avg_duration"], 55.0);

        let response = server
            .get("/api/v1/client/logs?week=1")
            .add_header(AUTHORIZATION, bearer(&client))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["items"].as_array().unwrap().len(), 1);
        assert_eq!(body.data["items"][0]["exercises"][0]["sets"][0]["reps"], 5);

        let response = server
            .get("/api/v1/client/today")
            .add_header(AUTHORIZATION, bearer(&client))
            .await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_plan_for_unassigned_client_is_forbidden() {
        let (server, state) = setup_test_server().await;
        let admin = admin_token(&server, &state).await;
        let (_, trainer) = approved_trainer(&server, &admin, "coach").await;
        let (stranger_id, _) = register(&server, "stranger", "client").await;
        let squat = create_exercise(&server, &trainer, "Back squat").await;

        let response = server
            .post("/api/v1/workouts/plans")
            .add_header(AUTHORIZATION, bearer(&trainer))
            .json(&two_session_plan(stranger_id, squat))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_plan_update_and_toggle() {
        let (server, state) = setup_test_server().await;
        let admin = admin_token(&server, &state).await;
        let (_, trainer) = approved_trainer(&server, &admin, "coach").await;
        let (client_id, client) = assigned_client(&server, &trainer, "lifter").await;
        let squat = create_exercise(&server, &trainer, "Back squat").await;

        let response = server
            .post("/api/v1/workouts/plans")
            .add_header(AUTHORIZATION, bearer(&trainer))
            .json(&two_session_plan(client_id, squat))
            .await;
        let body: ApiResponse<Value> = response.json();
        let plan_id = body.data["id"].as_i64().unwrap();

        let response = server
            .put(&format!("/api/v1/workouts/plans/{plan_id}"))
            .add_header(AUTHORIZATION, bearer(&trainer))
            .json(&json!({
                "name": "Hypertrophy block",
                "sessions": [
                    { "name": "Full body", "day_of_week": "friday", "exercises": [] }
                ]
            }))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["name"], "Hypertrophy block");
        assert_eq!(body.data["sessions"].as_array().unwrap().len(), 1);
        assert_eq!(body.data["completion_rate"], 0);

        let response = server
            .put(&format!("/api/v1/workouts/plans/{plan_id}/toggle"))
            .add_header(AUTHORIZATION, bearer(&trainer))
            .json(&json!({ "is_active": false }))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.message, "Workout plan deactivated successfully");

        let response = server
            .get("/api/v1/client/plans?is_active=true")
            .add_header(AUTHORIZATION, bearer(&client))
            .await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["pagination"]["total"], 0);

        // Another client's plan is invisible
        let (_, other) = assigned_client(&server, &trainer, "other").await;
        server
            .get(&format!("/api/v1/client/plans/{plan_id}"))
            .add_header(AUTHORIZATION, bearer(&other))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_plan_list_rejects_unknown_sort() {
        let (server, state) = setup_test_server().await;
        let admin = admin_token(&server, &state).await;
        let (_, trainer) = approved_trainer(&server, &admin, "coach").await;

        let response = server
            .get("/api/v1/workouts/plans?sort_by=password")
            .add_header(AUTHORIZATION, bearer(&trainer))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .get("/api/v1/workouts/plans?sort_by=name&sort_order=asc")
            .add_header(AUTHORIZATION, bearer(&trainer))
            .await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_client_list_pagination() {
        let (server, state) = setup_test_server().await;
        let admin = admin_token(&server, &state).await;
        let (_, trainer) = approved_trainer(&server, &admin, "coach").await;
        for name in ["c_one", "c_two", "c_three"] {
            assigned_client(&server, &trainer, name).await;
        }

        let response = server
            .get("/api/v1/users/trainer/clients?page=1&limit=2")
            .add_header(AUTHORIZATION, bearer(&trainer))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        let pagination = &body.data["pagination"];
        assert_eq!(pagination["total"], 3);
        assert_eq!(pagination["total_pages"], 2);
        assert_eq!(pagination["has_next"], true);
        assert_eq!(pagination["has_prev"], false);
        assert_eq!(body.data["items"].as_array().unwrap().len(), 2);

        let response = server
            .get("/api/v1/users/trainer/clients?page=2&limit=2")
            .add_header(AUTHORIZATION, bearer(&trainer))
            .await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["pagination"]["has_next"], false);
        assert_eq!(body.data["items"].as_array().unwrap().len(), 1);

        // limit above 100 is refused by the query validator
        let response = server
            .get("/api/v1/users/trainer/clients?limit=500")
            .add_header(AUTHORIZATION, bearer(&trainer))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_exercise_catalog_filters_and_toggle() {
        let (server, state) = setup_test_server().await;
        let admin = admin_token(&server, &state).await;
        let (_, trainer) = approved_trainer(&server, &admin, "coach").await;
        let (_, rival) = approved_trainer(&server, &admin, "rival").await;
        let squat = create_exercise(&server, &trainer, "Back squat").await;

        let response = server
            .post("/api/v1/workouts/exercises")
            .add_header(AUTHORIZATION, bearer(&trainer))
            .json(&json!({
                "name": "Push up",
                "muscle_groups": ["chest", "triceps"],
                "difficulty": "beginner",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .get("/api/v1/workouts/exercises?muscle_groups=chest,shoulders")
            .add_header(AUTHORIZATION, bearer(&trainer))
            .await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["pagination"]["total"], 1);
        assert_eq!(body.data["items"][0]["name"], "Push up");

        server
            .put(&format!("/api/v1/workouts/exercises/{squat}/toggle"))
            .add_header(AUTHORIZATION, bearer(&rival))
            .json(&json!({ "is_active": false }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server
            .put(&format!("/api/v1/workouts/exercises/{squat}/toggle"))
            .add_header(AUTHORIZATION, bearer(&trainer))
            .json(&json!({ "is_active": false }))
            .await
            .assert_status_ok();

        let response = server
            .get("/api/v1/workouts/exercises")
            .add_header(AUTHORIZATION, bearer(&trainer))
            .await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn test_trainer_profile_keeps_list_spelling() {
        let (server, _state) = setup_test_server().await;
        let (_, trainer) = register(&server, "coach_k", "trainer").await;

        let response = server
            .put("/api/v1/users/profile/trainer")
            .add_header(AUTHORIZATION, bearer(&trainer))
            .json(&json!({
                "specialization": ["Kettlebell Sport", "Rehab|Prehab"],
                "certifications": ["NASM-CPT", "CrossFit Level 1"],
            }))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["specialization"], json!(["Kettlebell Sport", "Rehab|Prehab"]));
        assert_eq!(body.data["certifications"], json!(["NASM-CPT", "CrossFit Level 1"]));

        // Search ignores case
        let response = server
            .get("/api/v1/users/trainers?search=kettlebell%20sport")
            .add_header(AUTHORIZATION, bearer(&trainer))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["items"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let (server, _) = setup_test_server().await;
        let token = {
            register(&server, "looker", "client").await;
            login(&server, "looker").await
        };

        let response = server
            .get("/api/v1/users/9999")
            .add_header(AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "NOT_FOUND");
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_prometheus_metrics_endpoint() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        // Metrics are only mounted by the serve command
        let response = server.get("/metrics").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
