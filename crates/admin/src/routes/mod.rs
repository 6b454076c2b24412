//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check (public)
//! GET  /health/ready                 - Readiness check, pings the store (public)
//! GET  /static/*                     - Stylesheet and assets (public)
//!
//! # Auth
//! GET  /login                        - Login page (public)
//! POST /login                        - Email + password login (public)
//! GET  /logout                       - Destroy session (public)
//!
//! # Dashboard
//! GET  /                             - Counts and quality summary
//!
//! # Admins
//! GET  /admins                       - Admin list (?error=<code>)
//! POST /admins/add                   - Create admin (alias: /add_admin)
//! GET  /admins/{admin_id}/delete     - Delete admin (alias: /delete_admin/{admin_id})
//! GET  /admins/{admin_id}/edit       - Edit form (alias: /edit_admin/{admin_id})
//! POST /admins/{admin_id}/edit       - Apply edit
//!
//! # Listings (?page=<n>)
//! GET  /devices
//! GET  /images
//! GET  /analysis
//! GET  /feedbacks
//!
//! # Anything else: 404 failure page
//! ```

pub mod admins;
pub mod auth;
pub mod dashboard;
pub mod records;

use axum::{
    Router,
    extract::State,
    http::{Request, Response, StatusCode, Uri},
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::session::SessionKeyError;
use crate::middleware::{apply_session_layer, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Directory served under `/static`.
const STATIC_DIR: &str = "crates/admin/static";

/// Build the application routes (without middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        // Dashboard
        .route("/", get(dashboard::dashboard))
        // Admins
        .route("/admins", get(admins::index))
        .route("/admins/add", post(admins::add))
        .route("/add_admin", post(admins::add))
        .route("/admins/{admin_id}/delete", get(admins::delete))
        .route("/delete_admin/{admin_id}", get(admins::delete))
        .route(
            "/admins/{admin_id}/edit",
            get(admins::edit_page).post(admins::edit),
        )
        .route(
            "/edit_admin/{admin_id}",
            get(admins::edit_page).post(admins::edit),
        )
        // Listings
        .route("/devices", get(records::devices))
        .route("/images", get(records::images))
        .route("/analysis", get(records::analysis))
        .route("/feedbacks", get(records::feedbacks))
}

/// Build the complete application: routes, health checks, static files,
/// sessions, timeout, security headers, request ids and tracing.
///
/// # Errors
///
/// Returns `SessionKeyError` if the session signing key cannot be built.
pub fn app(state: AppState) -> Result<Router, SessionKeyError> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(not_found);

    let router = apply_session_layer(router, state.store_handle(), state.config())?;

    Ok(router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config().request_timeout,
        ))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                        request_id = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: std::time::Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Unknown paths render the failure page with 404.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_owned())
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the document store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
