use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use model::entities::user::{self, Role};
use sea_orm::EntityTrait;
use tracing::{debug, warn};

use super::jwt::extract_bearer_token;
use crate::error::ApiError;
use crate::schemas::AppState;

/// The authenticated account of a request.
///
/// Resolved once from the bearer token; handlers receive it explicitly and
/// call one of the `require_*` gates.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user::Model);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Access denied. No token provided"))?;

        let token = extract_bearer_token(header)?;
        let claims = state.jwt.validate_token(token)?;
        let user_id: i32 = claims
            .sub
            .parse()
            .map_err(|_| ApiError::unauthorized("Invalid token"))?;

        let account = user::Entity::find_by_id(user_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| {
                warn!("Token refers to missing user {}", user_id);
                ApiError::unauthorized("Invalid token. User not found")
            })?;

        if !account.is_active {
            warn!("Rejected token of deactivated user {}", account.id);
            return Err(ApiError::unauthorized("Account is deactivated"));
        }

        debug!("Authenticated user {} ({})", account.id, account.role.as_str());
        Ok(CurrentUser(account))
    }
}

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    fn require_role(&self, roles: &[Role]) -> Result<&user::Model, ApiError> {
        if roles.contains(&self.0.role) {
            Ok(&self.0)
        } else {
            warn!("User {} with role {} denied", self.0.id, self.0.role.as_str());
            Err(ApiError::forbidden("Access denied. Insufficient permissions"))
        }
    }

    pub fn require_admin(&self) -> Result<&user::Model, ApiError> {
        self.require_role(&[Role::Admin])
    }

    pub fn require_trainer(&self) -> Result<&user::Model, ApiError> {
        self.require_role(&[Role::Trainer])
    }

    pub fn require_client(&self) -> Result<&user::Model, ApiError> {
        self.require_role(&[Role::Client])
    }

    pub fn require_trainer_or_admin(&self) -> Result<&user::Model, ApiError> {
        self.require_role(&[Role::Trainer, Role::Admin])
    }

    /// A trainer whose account an admin has approved.
    pub fn require_approved_trainer(&self) -> Result<&user::Model, ApiError> {
        let trainer = self.require_trainer()?;
        if !trainer.is_approved {
            warn!("Unapproved trainer {} denied", trainer.id);
            return Err(ApiError::forbidden("Trainer account pending approval"));
        }
        Ok(trainer)
    }
}
