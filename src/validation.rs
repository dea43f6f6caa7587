//! Extractors that validate input before a handler runs and reject with the
//! standard error envelope.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use axum_valid::{Valid, ValidationRejection};
use serde::de::DeserializeOwned;
use tracing::warn;
use validator::Validate;

use crate::error::ApiError;

/// JSON body checked with its `validator` rules.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                warn!("Rejected JSON body: {}", rejection.body_text());
                ApiError::validation(rejection.body_text())
            })?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string checked through `axum-valid`.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Valid::<Query<T>>::from_request_parts(parts, state).await {
            Ok(Valid(Query(value))) => Ok(Self(value)),
            Err(ValidationRejection::Valid(errors)) => Err(errors.into()),
            Err(ValidationRejection::Inner(rejection)) => {
                warn!("Rejected query string: {}", rejection.body_text());
                Err(ApiError::validation(rejection.body_text()))
            }
        }
    }
}
