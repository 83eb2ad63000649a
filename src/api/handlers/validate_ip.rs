//! Syntactic IP address validation.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ValidateIpRequest {
    pub ip: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ValidateIpResponse {
    pub ip: String,
    pub valid: bool,
}

#[utoipa::path(
    post,
    path = "/validate-ip",
    request_body = ValidateIpRequest,
    responses (
        (status = 200, description = "Validation result", body = ValidateIpResponse),
        (status = 400, description = "Missing payload", body = String),
    ),
    tag = "utils"
)]
pub async fn validate_ip(payload: Option<Json<ValidateIpRequest>>) -> impl IntoResponse {
    let request: ValidateIpRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
        }
    };

    let valid = request.ip.parse::<IpAddr>().is_ok();
    (
        StatusCode::OK,
        Json(ValidateIpResponse {
            ip: request.ip,
            valid,
        }),
    )
        .into_response()
}
