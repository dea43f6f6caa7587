//! Common transport-layer types shared by the HTTP handlers and the domain crate.

mod pagination;

pub use pagination::{Page, Pagination};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope of every successful API response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}
