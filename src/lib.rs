//! # Bookshelf (authentication core)
//!
//! HTTP backend for the library catalogue. This crate carries the part every
//! other endpoint depends on: logging users in and gating requests on the
//! bearer token they get back.
//!
//! ## Login
//!
//! `POST /users/login` takes `{ "email", "password" }`, checks the password
//! against the Argon2id hash stored in `users`, and answers `201` with the
//! user's public fields plus a signed token. Unknown emails and wrong passwords
//! both answer `401` with the same body.
//!
//! ## Bearer gate
//!
//! Protected handlers take an [`api::Principal`] argument. The extractor reads
//! `Authorization: Bearer <token>`, verifies signature and expiry, and passes
//! the token's [`auth::Claims`] to the handler. Missing, malformed, expired and
//! forged tokens are all answered with `401` before the handler runs.
//!
//! ## Tokens
//!
//! HS256, signed with a secret supplied at startup (`BOOKSHELF_JWT_SECRET`).
//! Tokens live for `BOOKSHELF_TOKEN_TTL_SECONDS` and cannot be revoked.

pub mod api;
pub mod auth;
pub mod cli;
pub mod users;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
