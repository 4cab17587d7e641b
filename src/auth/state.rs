//! Auth configuration and the shared, read-only auth state.

use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;

use super::{password::CredentialVerifier, token::TokenIssuer};
use crate::users::UserStore;

pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    jwt_secret: SecretString,
    token_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(jwt_secret: SecretString) -> Self {
        Self {
            jwt_secret,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }

    pub(super) fn jwt_secret(&self) -> &SecretString {
        &self.jwt_secret
    }
}

/// Everything the gates need, built once at startup and shared behind an `Arc`.
#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    verifier: CredentialVerifier,
    issuer: TokenIssuer,
}

impl AuthState {
    /// # Errors
    /// Returns an error if the signing configuration is unusable.
    pub fn new(config: AuthConfig, users: Arc<dyn UserStore>) -> Result<Self> {
        let issuer = TokenIssuer::new(config.jwt_secret(), config.token_ttl_seconds())
            .context("Invalid token signing configuration")?;

        Ok(Self {
            config,
            verifier: CredentialVerifier::new(users),
            issuer,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    #[must_use]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }
}
