//! Request and response bodies shared by the HTTP handlers.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::LoginCredentials,
    users::{Role, User},
};

/// Error body returned for every non-2xx answer.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[schema(example = 401)]
    pub status_code: u16,
    pub message: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
        }
    }

    /// Body with the canonical message for `status`.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error",
            other => other.canonical_reason().unwrap_or("Error"),
        };
        Self::new(status, message)
    }
}

/// Login request body, JSON or form encoded. Extra fields are ignored.
#[derive(ToSchema, Deserialize, Default)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "a@b.com")]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl LoginRequest {
    /// `None` when either field is blank. Values are passed through as sent.
    #[must_use]
    pub fn into_credentials(self) -> Option<LoginCredentials> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return None;
        }
        Some(LoginCredentials {
            email: self.email,
            password: self.password,
        })
    }
}

/// Returned by a successful login.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoggedUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub token: String,
}

impl LoggedUser {
    #[must_use]
    pub fn new(user: User, token: String) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            token,
        }
    }
}
