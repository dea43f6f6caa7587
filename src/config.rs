use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use moka::future::Cache;
use sea_orm::Database;
use serde::Deserialize;
use tracing::{debug, info, trace};

use crate::auth::JwtService;
use crate::schemas::AppState;

/// Runtime settings.
///
/// Sources, lowest precedence first: built-in defaults, an optional
/// `gymrust.toml` in the working directory, `GYMRUST_*` environment variables,
/// and finally command-line overrides.
#[derive(Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    /// `development` exposes error details in responses.
    pub environment: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub max_login_attempts: i32,
    pub lock_minutes: i64,
    pub stats_cache_ttl_secs: u64,
    pub bcrypt_cost: u32,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("database_url", &self.database_url)
            .field("bind_address", &self.bind_address)
            .field("environment", &self.environment)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("max_login_attempts", &self.max_login_attempts)
            .field("lock_minutes", &self.lock_minutes)
            .field("stats_cache_ttl_secs", &self.stats_cache_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl Settings {
    /// Load settings, applying the given overrides on top of every other source.
    pub fn load(database_url: Option<String>, bind_address: Option<String>) -> Result<Self> {
        trace!("Loading settings");
        dotenvy::dotenv().ok();

        let settings = Config::builder()
            .set_default("database_url", "sqlite://gymrust.db?mode=rwc")?
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("environment", "production")?
            .set_default("jwt_secret", "change-me")?
            .set_default("jwt_expiry_hours", 24 * 7)?
            .set_default("max_login_attempts", 5)?
            .set_default("lock_minutes", 120)?
            .set_default("stats_cache_ttl_secs", 60)?
            .set_default("bcrypt_cost", 12)?
            .add_source(File::with_name("gymrust").required(false))
            .add_source(Environment::with_prefix("GYMRUST").try_parsing(true))
            .set_override_option("database_url", database_url)?
            .set_override_option("bind_address", bind_address)?
            .build()
            .context("Failed to read configuration")?
            .try_deserialize::<Settings>()
            .context("Invalid configuration")?;

        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Settings for the in-memory test database.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            bind_address: "127.0.0.1:0".to_string(),
            environment: "test".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_hours: 24 * 7,
            max_login_attempts: 5,
            lock_minutes: 120,
            stats_cache_ttl_secs: 60,
            bcrypt_cost: 4,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

/// Connect to the database and assemble the shared application state.
pub async fn initialize_app_state(settings: Settings) -> Result<AppState> {
    info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url).await?;
    Ok(build_app_state(db, settings))
}

/// Assemble the application state around an existing connection.
pub fn build_app_state(db: sea_orm::DatabaseConnection, settings: Settings) -> AppState {
    let cache = Cache::builder()
        .max_capacity(1000)
        .time_to_live(Duration::from_secs(settings.stats_cache_ttl_secs))
        .build();

    let jwt = JwtService::new(
        &settings.jwt_secret,
        chrono::Duration::hours(settings.jwt_expiry_hours),
    );

    AppState {
        db,
        cache,
        jwt,
        settings: Arc::new(settings),
    }
}
