//! Refresh-token revocation for the authenticated caller.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::handlers::{auth_error_response, bearer_token};
use crate::auth::{AuthError, AuthSessionController};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RevokeRequest {
    pub jti: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RevokeResponse {
    pub status: String,
}

#[utoipa::path(
    post,
    path = "/revoke-refresh",
    request_body = RevokeRequest,
    responses (
        (status = 200, description = "Refresh token revoked", body = RevokeResponse),
        (status = 401, description = "Missing or invalid access token", body = String),
        (status = 404, description = "Refresh token identifier not found", body = String),
    ),
    tag = "auth"
)]
pub async fn revoke_refresh(
    headers: HeaderMap,
    controller: Extension<Arc<AuthSessionController>>,
    payload: Option<Json<RevokeRequest>>,
) -> impl IntoResponse {
    let Some(token) = bearer_token(&headers) else {
        return auth_error_response(&AuthError::Unauthenticated);
    };
    let user = match controller.resolve_identity(token).await {
        Ok(user) => user,
        Err(err) => return auth_error_response(&err),
    };

    let request: RevokeRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
        }
    };

    // A jti that does not even parse cannot be in the registry.
    let Ok(jti) = Uuid::parse_str(&request.jti) else {
        debug!("Refused revocation with malformed jti");
        return auth_error_response(&AuthError::TokenNotFound);
    };

    match controller.revoke_refresh(&user, jti).await {
        Ok(()) => (
            StatusCode::OK,
            Json(RevokeResponse {
                status: "revoked".to_string(),
            }),
        )
            .into_response(),
        Err(err) => auth_error_response(&err),
    }
}
