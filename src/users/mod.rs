//! User records and the lookup collaborator used by the login flow.
//!
//! The auth flow only ever reads users; creation and updates happen outside
//! this service (seed scripts, admin tooling).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            other => Err(UserStoreError::InvalidData(format!("unknown role: {other}"))),
        }
    }
}

/// A stored user. `password_hash` is a PHC string and never leaves the service.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"***")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid user data: {0}")]
    InvalidData(String),
}

/// Resolve users by email.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns `Ok(None)` when no user has this email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError>;

    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> Result<(), UserStoreError>;
}
