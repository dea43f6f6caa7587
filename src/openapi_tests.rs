#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::openapi::{schema::Schema, PathItemType, RefOr};
    use utoipa::OpenApi;

    fn object_properties(name: &str) -> Vec<String> {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        match components.schemas.get(name) {
            Some(RefOr::T(Schema::Object(obj))) => obj.properties.keys().cloned().collect(),
            _ => panic!("{name} should be an object schema"),
        }
    }

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        assert!(openapi.components.is_some());
        let components = openapi.components.as_ref().unwrap();
        for schema in ["ErrorResponse", "HealthResponse", "PlanDetailResponse", "CreateLogRequest"] {
            assert!(components.schemas.contains_key(schema), "missing schema {schema}");
        }

        let json_result = serde_json::to_string(&openapi);
        assert!(json_result.is_ok());

        // The `openapi` command renders YAML
        let yaml = serde_yaml::to_string(&openapi).unwrap();
        assert!(yaml.contains("GymRust API"));
    }

    #[test]
    fn test_error_response_schema_structure() {
        let properties = object_properties("ErrorResponse");
        for key in ["success", "message", "code", "errors", "error"] {
            assert!(properties.iter().any(|p| p == key), "ErrorResponse lacks {key}");
        }
    }

    #[test]
    fn test_health_response_schema_structure() {
        let properties = object_properties("HealthResponse");
        for key in ["status", "version", "database"] {
            assert!(properties.iter().any(|p| p == key), "HealthResponse lacks {key}");
        }
    }

    #[test]
    fn test_openapi_paths_contain_health_endpoint() {
        let openapi = ApiDoc::openapi();

        let health_path = openapi.paths.paths.get("/health").unwrap();
        let health_get = health_path.operations.get(&PathItemType::Get).unwrap();
        assert!(health_get.responses.responses.contains_key("200"));
        assert!(health_get.security.is_none());
    }

    #[test]
    fn test_openapi_documents_every_resource() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        let expected = [
            ("/api/v1/auth/register", PathItemType::Post, "POST"),
            ("/api/v1/auth/login", PathItemType::Post, "POST"),
            ("/api/v1/users/profile", PathItemType::Put, "PUT"),
            ("/api/v1/users/trainer/assign-client", PathItemType::Post, "POST"),
            ("/api/v1/users/admin/trainer-change/{client_id}", PathItemType::Put, "PUT"),
            ("/api/v1/workouts/plans", PathItemType::Post, "POST"),
            ("/api/v1/workouts/plans/{plan_id}/toggle", PathItemType::Put, "PUT"),
            ("/api/v1/workouts/exercises", PathItemType::Get, "GET"),
            ("/api/v1/workouts/stats", PathItemType::Get, "GET"),
            ("/api/v1/client/logs", PathItemType::Post, "POST"),
            ("/api/v1/client/today", PathItemType::Get, "GET"),
        ];
        for (path, method, verb) in expected {
            let item = paths.get(path).unwrap_or_else(|| panic!("missing path {path}"));
            assert!(item.operations.contains_key(&method), "missing {verb} {path}");
        }
    }

    #[test]
    fn test_protected_endpoints_declare_bearer_auth() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));

        let plans = openapi.paths.paths.get("/api/v1/workouts/plans").unwrap();
        let create = plans.operations.get(&PathItemType::Post).unwrap();
        assert!(create.security.as_ref().is_some_and(|s| !s.is_empty()));
        assert!(create.responses.responses.contains_key("201"));
        assert!(create.responses.responses.contains_key("403"));
    }
}
