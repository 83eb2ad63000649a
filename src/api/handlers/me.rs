//! Identity echo for the authenticated caller.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::handlers::{auth_error_response, bearer_token};
use crate::auth::{AuthError, AuthSessionController};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MeResponse {
    pub username: String,
    pub full_name: String,
}

#[utoipa::path(
    get,
    path = "/users/me",
    responses (
        (status = 200, description = "Caller identity", body = MeResponse),
        (status = 401, description = "Missing or invalid access token", body = String),
    ),
    tag = "users"
)]
pub async fn me(
    headers: HeaderMap,
    controller: Extension<Arc<AuthSessionController>>,
) -> impl IntoResponse {
    let Some(token) = bearer_token(&headers) else {
        return auth_error_response(&AuthError::Unauthenticated);
    };
    match controller.resolve_identity(token).await {
        Ok(user) => (
            StatusCode::OK,
            Json(MeResponse {
                username: user.username,
                full_name: user.full_name,
            }),
        )
            .into_response(),
        Err(err) => auth_error_response(&err),
    }
}
