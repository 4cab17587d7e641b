//! Request gating shared by the login and bearer-token paths.
//!
//! Every request starts unauthenticated. [`authorize`] runs exactly one
//! authenticator over whatever credentials the request carried and ends in
//! either an identity (the handler may run) or an [`AuthError`] (the request is
//! answered with `401` and the handler never runs).

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use tracing::debug;

use super::AuthError;

/// One way of turning request credentials into an identity.
#[async_trait]
pub trait Authenticator: Send + Sync {
    type Credentials: Send;
    type Identity: Send;

    /// Error reported when the request carries no credentials at all.
    fn missing(&self) -> AuthError;

    async fn authenticate(&self, credentials: Self::Credentials)
        -> Result<Self::Identity, AuthError>;
}

/// Resolve optional request credentials into an identity.
///
/// # Errors
/// Returns the authenticator's `missing` error when `credentials` is `None`,
/// otherwise whatever the authenticator rejects with.
pub async fn authorize<A>(
    authenticator: &A,
    credentials: Option<A::Credentials>,
) -> Result<A::Identity, AuthError>
where
    A: Authenticator + ?Sized,
{
    let Some(credentials) = credentials else {
        let err = authenticator.missing();
        debug!("no credentials presented: {err}");
        return Err(err);
    };
    authenticator.authenticate(credentials).await
}

/// Read the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively; an empty token counts as absent.
#[must_use]
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
