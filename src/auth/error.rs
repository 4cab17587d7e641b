use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{debug, error};

use crate::{api::types::ErrorResponse, users::UserStoreError};

/// Every way the login and bearer gates can refuse a request.
///
/// The first five variants are authentication failures and render as the same
/// `401`; the kind only shows up in logs. The rest are collaborator failures
/// and render as `500`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing bearer token")]
    MissingToken,
    #[error("malformed token")]
    MalformedToken,
    #[error("token expired")]
    ExpiredToken,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("user lookup failed: {0}")]
    Lookup(#[from] UserStoreError),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("auth state is not configured for this router")]
    Unconfigured,
}

impl AuthError {
    /// `true` for failures caused by the caller's credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::MissingToken
                | Self::MalformedToken
                | Self::ExpiredToken
                | Self::InvalidSignature
        )
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        if self.is_unauthorized() {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_unauthorized() {
            debug!(reason = %self, "request rejected");
        } else {
            error!("authentication failed unexpectedly: {self}");
        }
        (status, Json(ErrorResponse::from_status(status))).into_response()
    }
}
