//! Login endpoint: credentials in, token pair out.

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

use crate::api::handlers::auth_error_response;
use crate::auth::{
    AuthError, AuthSessionController, TokenPair,
    utils::{extract_client_ip, sanitize_input, valid_username},
};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/token",
    request_body = LoginForm,
    responses (
        (status = 200, description = "Login successful", body = TokenPair, content_type = "application/json"),
        (status = 400, description = "Invalid credentials or missing payload", body = String),
        (status = 429, description = "Too many login attempts", body = String),
    ),
    tag = "auth"
)]
pub async fn token(
    headers: HeaderMap,
    controller: Extension<Arc<AuthSessionController>>,
    payload: Option<Json<LoginForm>>,
) -> impl IntoResponse {
    let form: LoginForm = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
        }
    };

    // Malformed usernames get the same generic refusal as bad credentials.
    if !valid_username(&sanitize_input(&form.username)) {
        debug!("Refused login with malformed username");
        return auth_error_response(&AuthError::InvalidCredentials);
    }

    let client_ip = extract_client_ip(&headers);
    match controller
        .login(&form.username, &form.password, client_ip.as_deref())
        .await
    {
        Ok(pair) => (StatusCode::OK, Json(pair)).into_response(),
        Err(err) => auth_error_response(&err),
    }
}
