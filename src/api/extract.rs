//! Axum extractors that run the auth gates before a handler body executes.
//!
//! A handler that takes [`Principal`] or [`VerifiedUser`] is only called once
//! the corresponding gate has accepted the request; the identity arrives as an
//! ordinary argument.

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::CONTENT_TYPE, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use std::sync::Arc;

use super::types::{ErrorResponse, LoginRequest};
use crate::{
    auth::{authorize, extract_bearer_token, AuthError, AuthState, Claims},
    users::User,
};

/// Claims of a request that presented a valid bearer token.
#[derive(Debug, Clone)]
pub struct Principal(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = parts
            .extensions
            .get::<Arc<AuthState>>()
            .cloned()
            .ok_or(AuthError::Unconfigured)?;

        let token = extract_bearer_token(&parts.headers);
        authorize(auth_state.issuer(), token).await.map(Principal)
    }
}

/// User whose email and password in the request body matched a stored record.
///
/// The body is read as a form when sent as `application/x-www-form-urlencoded`
/// and as JSON otherwise.
#[derive(Debug, Clone)]
pub struct VerifiedUser(pub User);

#[async_trait]
impl<S> FromRequest<S> for VerifiedUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = req
            .extensions()
            .get::<Arc<AuthState>>()
            .cloned()
            .ok_or_else(|| AuthError::Unconfigured.into_response())?;

        let body = if is_form(req.headers()) {
            Form::<LoginRequest>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .map_err(|rejection| bad_request(rejection.body_text()))?
        } else {
            Json::<LoginRequest>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .map_err(|rejection| bad_request(rejection.body_text()))?
        };

        authorize(auth_state.verifier(), body.into_credentials())
            .await
            .map(VerifiedUser)
            .map_err(IntoResponse::into_response)
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(StatusCode::BAD_REQUEST, message)),
    )
        .into_response()
}
