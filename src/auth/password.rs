//! Credential verification against Argon2id PHC hashes.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::{fmt, sync::Arc};
use tracing::{debug, instrument};

use super::{gate::Authenticator, AuthError};
use crate::users::{User, UserStore};

// Compared against when the email is unknown so both failure paths cost one hash.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"bookshelf-dummy-password", &salt)
        .ok()
        .map(|hash| hash.to_string())
});

/// Hash a plaintext password into an Argon2id PHC string.
///
/// # Errors
/// Returns [`AuthError::Hashing`] if hashing fails or the blocking task panics.
pub async fn hash_password(password: &str) -> Result<String, AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::Hashing(e.to_string()))?
}

/// Compare `password` with a stored PHC hash in constant time.
///
/// Returns `Ok(false)` on mismatch and an error only when the stored hash is
/// unreadable.
///
/// # Errors
/// Returns [`AuthError::Hashing`] if `hash` is not a valid PHC string.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(&hash).map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| AuthError::Hashing(e.to_string()))?
}

/// Login credentials as submitted by the client.
#[derive(Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Checks email/password pairs against the user store.
#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserStore>,
}

impl fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVerifier").finish_non_exhaustive()
    }
}

impl CredentialVerifier {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Return the user owning `email` if `password` matches its stored hash.
    ///
    /// Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredentials`].
    ///
    /// # Errors
    /// [`AuthError::InvalidCredentials`] on mismatch, [`AuthError::Lookup`] or
    /// [`AuthError::Hashing`] when a collaborator fails.
    #[instrument(skip_all)]
    pub async fn verify(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            debug!("no user for email");
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy).await;
            }
            return Err(AuthError::InvalidCredentials);
        };

        if verify_password(password, &user.password_hash).await? {
            Ok(user)
        } else {
            debug!(user_id = %user.id, "password mismatch");
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[async_trait]
impl Authenticator for CredentialVerifier {
    type Credentials = LoginCredentials;
    type Identity = User;

    fn missing(&self) -> AuthError {
        AuthError::InvalidCredentials
    }

    async fn authenticate(&self, credentials: LoginCredentials) -> Result<User, AuthError> {
        self.verify(&credentials.email, &credentials.password).await
    }
}
