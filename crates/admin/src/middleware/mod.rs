//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (when a DSN is configured)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. Request timeout
//! 6. Session layer (tower-sessions over the document store)
//! 7. Auth extractors on protected handlers

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    LOGIN_PATH, OptionalAdminAuth, RequireAdminAuth, end_admin_session, refresh_current_admin,
    start_admin_session,
};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, apply_session_layer, session_key};
