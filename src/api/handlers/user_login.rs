use axum::{extract::Extension, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    api::{
        extract::VerifiedUser,
        types::{ErrorResponse, LoggedUser, LoginRequest},
    },
    auth::{AuthError, AuthState},
};

#[utoipa::path(
    post,
    path = "/users/login",
    request_body(
        content(
            (LoginRequest = "application/json"),
            (LoginRequest = "application/x-www-form-urlencoded")
        ),
        description = "The user credentials"
    ),
    responses(
        (status = 201, description = "Authentication succeeded", body = LoggedUser),
        (status = 400, description = "Body is not a valid login request", body = ErrorResponse),
        (status = 401, description = "Unknown email or wrong password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth-users"
)]
#[instrument(skip_all)]
pub async fn login(
    Extension(auth_state): Extension<Arc<AuthState>>,
    VerifiedUser(user): VerifiedUser,
) -> Result<(StatusCode, Json<LoggedUser>), AuthError> {
    let token = auth_state.issuer().issue(&user)?;

    info!(user_id = %user.id, role = %user.role, "login succeeded");

    Ok((StatusCode::CREATED, Json(LoggedUser::new(user, token))))
}
