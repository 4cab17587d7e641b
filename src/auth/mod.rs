//! Authentication: credential verification, token issuance and request gating.
//!
//! ## Flow
//!
//! 1. `POST /users/login` carries an email and password. The
//!    [`CredentialVerifier`] looks the user up and compares the password with
//!    the stored Argon2id hash.
//! 2. On success the [`TokenIssuer`] signs an HS256 token whose claims copy
//!    the user's id, email, names and role.
//! 3. Later requests send `Authorization: Bearer <token>`. The bearer gate
//!    verifies signature and expiry and hands the [`Claims`] to the handler.
//!
//! Both gates implement [`Authenticator`] and go through [`authorize`].
//!
//! ## Claim freshness
//!
//! Claims are trusted until `exp`; the user is not re-read per request and
//! tokens cannot be revoked. Role changes take effect on the next login.

mod error;
pub(crate) mod gate;
mod password;
mod state;
mod token;

pub use error::AuthError;
pub use gate::{authorize, extract_bearer_token, Authenticator};
pub use password::{hash_password, verify_password, CredentialVerifier, LoginCredentials};
pub use state::{AuthConfig, AuthState, DEFAULT_TOKEN_TTL_SECONDS};
pub use token::{Claims, TokenIssuer};
