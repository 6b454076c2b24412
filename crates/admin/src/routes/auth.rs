//! Authentication route handlers for admin.
//!
//! Email and password login, logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{LOGIN_PATH, OptionalAdminAuth, end_admin_session, start_admin_session};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Message shown for any failed login.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub email: String,
}

/// Render the login page.
///
/// GET /login
pub async fn login_page(OptionalAdminAuth(admin): OptionalAdminAuth) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
///
/// POST /login
#[instrument(skip(state, session, form), fields(email = %form.email.trim()))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let admin = match AuthService::new(state.store())
        .login(&form.email, &form.password)
        .await
    {
        Ok(admin) => admin,
        Err(AuthError::Repository(e)) => return Err(AppError::Database(e)),
        Err(e) => {
            tracing::info!(reason = %e, "Login rejected");
            return Ok((
                StatusCode::UNAUTHORIZED,
                LoginTemplate {
                    error: Some(INVALID_CREDENTIALS.to_string()),
                    email: form.email.trim().to_string(),
                },
            )
                .into_response());
        }
    };

    let current = start_admin_session(&session, &admin)
        .await
        .map_err(|e| AppError::Internal(format!("failed to start session: {e}")))?;

    set_sentry_user(&current.id, Some(&current.email));
    tracing::info!(admin_id = %current.id, "Admin logged in");

    Ok(Redirect::to("/").into_response())
}

/// Logout and destroy the session.
///
/// GET /logout
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = end_admin_session(&session).await {
        tracing::warn!(error = %e, "Failed to delete session on logout");
    }
    clear_sentry_user();

    Redirect::to(LOGIN_PATH)
}
