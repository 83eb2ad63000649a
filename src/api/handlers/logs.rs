//! Security event read-back, restricted to the admin account.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::debug;

use crate::api::handlers::{auth_error_response, bearer_token};
use crate::auth::{AuthError, AuthSessionController};

const ADMIN_USERNAME: &str = "admin";

#[utoipa::path(
    get,
    path = "/admin/logs",
    responses (
        (status = 200, description = "Recorded security events, oldest first"),
        (status = 401, description = "Missing or invalid access token", body = String),
        (status = 403, description = "Caller is not the admin account", body = String),
    ),
    tag = "admin"
)]
pub async fn logs(
    headers: HeaderMap,
    controller: Extension<Arc<AuthSessionController>>,
) -> impl IntoResponse {
    let Some(token) = bearer_token(&headers) else {
        return auth_error_response(&AuthError::Unauthenticated);
    };
    let user = match controller.resolve_identity(token).await {
        Ok(user) => user,
        Err(err) => return auth_error_response(&err),
    };

    if user.username != ADMIN_USERNAME {
        debug!("Refused log access for non-admin user");
        return (StatusCode::FORBIDDEN, "Forbidden".to_string()).into_response();
    }

    match controller.recorded_events() {
        Ok(events) => (StatusCode::OK, Json(events)).into_response(),
        Err(err) => auth_error_response(&err),
    }
}
