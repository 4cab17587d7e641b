use axum::Json;

use crate::{
    api::{extract::Principal, types::ErrorResponse},
    auth::Claims,
};

#[utoipa::path(
    get,
    path = "/users/profile",
    responses(
        (status = 200, description = "Claims of the bearer token", body = Claims),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "auth-users"
)]
// The gate already ran; the claims are the profile.
pub async fn profile(Principal(claims): Principal) -> Json<Claims> {
    Json(claims)
}
