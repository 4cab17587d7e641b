//! HS256 token issuance and verification.

use anyhow::{ensure, Result};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{gate::Authenticator, AuthError};
use crate::users::{Role, User};

/// Identity carried inside a bearer token.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    /// Issued at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

impl Claims {
    fn for_user(user: &User, issued_at: i64, ttl_seconds: i64) -> Self {
        Self {
            sub: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_seconds),
        }
    }
}

/// Signs and verifies tokens with one process-wide secret.
///
/// Keys are derived once at construction and never change afterwards.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("keys", &"***")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenIssuer {
    /// # Errors
    /// Returns an error if the secret is empty or the lifetime is not positive.
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Result<Self> {
        let secret = secret.expose_secret();
        ensure!(!secret.trim().is_empty(), "JWT secret must not be empty");
        ensure!(ttl_seconds > 0, "token lifetime must be positive, got {ttl_seconds}");

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
        })
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token for `user`, valid from now.
    ///
    /// # Errors
    /// Returns [`AuthError::Signing`] if the claims cannot be encoded.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        self.issue_at(user, Utc::now().timestamp())
    }

    /// Issue a token as if it had been created at `issued_at` (unix seconds).
    ///
    /// # Errors
    /// Returns [`AuthError::Signing`] if the claims cannot be encoded.
    pub fn issue_at(&self, user: &User, issued_at: i64) -> Result<String, AuthError> {
        let claims = Claims::for_user(user, issued_at, self.ttl_seconds);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::Signing)
    }

    /// Check signature and expiry and return the embedded claims.
    ///
    /// # Errors
    /// [`AuthError::ExpiredToken`], [`AuthError::InvalidSignature`] or
    /// [`AuthError::MalformedToken`].
    #[instrument(skip_all)]
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })
    }
}

#[async_trait]
impl Authenticator for TokenIssuer {
    type Credentials = String;
    type Identity = Claims;

    fn missing(&self) -> AuthError {
        AuthError::MissingToken
    }

    async fn authenticate(&self, token: String) -> Result<Claims, AuthError> {
        self.verify(&token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    fn issuer() -> Result<TokenIssuer> {
        TokenIssuer::new(&secret("test-signing-secret"), 3600)
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            password_hash: "unused".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn rejects_empty_secret() {
        assert!(TokenIssuer::new(&secret(""), 3600).is_err());
        assert!(TokenIssuer::new(&secret("   "), 3600).is_err());
    }

    #[test]
    fn rejects_non_positive_ttl() {
        assert!(TokenIssuer::new(&secret("s"), 0).is_err());
        assert!(TokenIssuer::new(&secret("s"), -5).is_err());
    }

    #[test]
    fn issued_token_verifies_to_user_claims() -> Result<()> {
        let issuer = issuer()?;
        let user = user();
        let token = issuer.issue(&user)?;
        let claims = issuer.verify(&token)?;

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.first_name, user.first_name);
        assert_eq!(claims.last_name, user.last_name);
        assert_eq!(claims.role, user.role);
        assert_eq!(claims.exp - claims.iat, 3600);
        Ok(())
    }

    #[test]
    fn expired_token_is_rejected() -> Result<()> {
        let issuer = issuer()?;
        let long_ago = Utc::now().timestamp() - 2 * issuer.ttl_seconds();
        let token = issuer.issue_at(&user(), long_ago)?;

        assert!(matches!(issuer.verify(&token), Err(AuthError::ExpiredToken)));
        Ok(())
    }

    #[test]
    fn token_from_another_secret_is_rejected() -> Result<()> {
        let other = TokenIssuer::new(&secret("someone-else"), 3600)?;
        let token = other.issue(&user())?;

        assert!(matches!(
            issuer()?.verify(&token),
            Err(AuthError::InvalidSignature)
        ));
        Ok(())
    }

    #[test]
    fn tampered_payload_is_rejected() -> Result<()> {
        let issuer = issuer()?;
        let token = issuer.issue(&user())?;
        let forged = issuer.issue(&User {
            role: Role::Admin,
            email: "mallory@b.com".to_string(),
            ..user()
        })?;

        // Original header and signature around a different payload.
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(matches!(
            issuer.verify(&spliced),
            Err(AuthError::InvalidSignature)
        ));
        Ok(())
    }

    #[test]
    fn garbage_is_malformed() -> Result<()> {
        let issuer = issuer()?;
        for token in ["", "not-a-token", "a.b", "a.b.c"] {
            assert!(
                matches!(issuer.verify(token), Err(AuthError::MalformedToken)),
                "{token:?} should be malformed"
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn authenticator_reports_missing_token() -> Result<()> {
        let issuer = issuer()?;
        assert!(matches!(issuer.missing(), AuthError::MissingToken));
        let token = issuer.issue(&user())?;
        assert!(issuer.authenticate(token).await.is_ok());
        Ok(())
    }
}
