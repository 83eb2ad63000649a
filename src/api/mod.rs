use crate::auth::AuthSessionController;
use anyhow::Result;
use axum::{
    Extension, Router,
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue, Method, StatusCode, header::USER_AGENT},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, options, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, debug, debug_span, info};
use ulid::Ulid;
use utoipa::OpenApi;

pub mod handlers;

use crate::auth::utils::extract_client_ip;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::login::token,
        handlers::revoke::revoke_refresh,
        handlers::me::me,
        handlers::logs::logs,
        handlers::validate_ip::validate_ip,
    ),
    components(schemas(
        handlers::health::Health,
        handlers::login::LoginForm,
        crate::auth::TokenPair,
        handlers::me::MeResponse,
        handlers::revoke::RevokeRequest,
        handlers::revoke::RevokeResponse,
        handlers::validate_ip::ValidateIpRequest,
        handlers::validate_ip::ValidateIpResponse,
    )),
    tags(
        (name = "auth", description = "Credential verification and token issuance"),
        (name = "users", description = "Authenticated user operations"),
        (name = "admin", description = "Administrative endpoints"),
        (name = "utils", description = "Stateless helpers"),
        (name = "health", description = "Liveness probes"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the application router.
///
/// `/health` sits outside the layered stack so probes work without a
/// User-Agent header.
#[must_use]
pub fn router(controller: Arc<AuthSessionController>) -> Router {
    let cors = CorsLayer::new()
        // allow `GET` and `POST` when accessing the resource
        .allow_methods([Method::GET, Method::POST])
        // allow requests from any origin
        .allow_origin(Any);

    Router::new()
        .route("/token", post(handlers::token))
        .route("/revoke-refresh", post(handlers::revoke_refresh))
        .route("/users/me", get(handlers::me))
        .route("/admin/logs", get(handlers::logs))
        .route("/validate-ip", post(handlers::validate_ip))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(controller))
                .layer(middleware::from_fn(require_user_agent)),
        )
        .route("/health", get(handlers::health))
        .route("/health", options(handlers::health))
}

/// router
/// # Errors
/// Returns an error if the server fails to start
pub async fn new(port: u16, controller: Arc<AuthSessionController>) -> Result<()> {
    let app = router(controller);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                debug!("Failed to listen for shutdown signal: {}", err);
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

/// Automated clients that omit a User-Agent get refused before any
/// handler runs, and the refusal is recorded as a security event.
async fn require_user_agent(
    Extension(controller): Extension<Arc<AuthSessionController>>,
    request: Request,
    next: Next,
) -> Response {
    let present = request
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| !value.trim().is_empty());

    if present {
        return next.run(request).await;
    }

    let client_ip = extract_client_ip(request.headers());
    controller.record_missing_user_agent(client_ip.as_deref());

    (
        StatusCode::BAD_REQUEST,
        "User-Agent header is required".to_string(),
    )
        .into_response()
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, ?headers, request_id)
}
