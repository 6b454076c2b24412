//! Authentication middleware and extractors for admin.
//!
//! Provides extractors for requiring admin authentication in route handlers,
//! and the helpers that bind or drop the admin identity on a session.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::db::{AdminRepository, RepositoryError};
use crate::error::AppError;
use crate::models::{Admin, CurrentAdmin, session_keys};
use crate::state::AppState;

/// Path unauthenticated requests are sent to.
pub const LOGIN_PATH: &str = "/login";

/// Extractor that requires admin authentication.
///
/// If the admin is not logged in, the request is redirected to the login
/// page before the handler (and therefore the store) is reached. A session
/// whose admin has since been deleted is flushed and redirected the same way.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Rejection for [`RequireAdminAuth`]: redirect to the login page.
pub struct RedirectToLogin;

impl IntoResponse for RedirectToLogin {
    fn into_response(self) -> Response {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

/// Outcome of checking a session identity against the admins collection.
enum SessionAdmin {
    Anonymous,
    Active(CurrentAdmin),
    Unverified(RepositoryError),
}

async fn session_admin(parts: &Parts, state: &AppState) -> SessionAdmin {
    let Some(session) = parts.extensions.get::<Session>() else {
        return SessionAdmin::Anonymous;
    };
    let current = session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to read admin session"))
        .ok()
        .flatten();
    let Some(current) = current else {
        return SessionAdmin::Anonymous;
    };

    match AdminRepository::new(state.store()).get_by_id(&current.id).await {
        Ok(Some(_)) => SessionAdmin::Active(current),
        Ok(None) => {
            tracing::info!(admin_id = %current.id, "Session admin no longer exists");
            if let Err(e) = session.flush().await {
                tracing::warn!(error = %e, "Failed to flush stale admin session");
            }
            SessionAdmin::Anonymous
        }
        Err(e) => SessionAdmin::Unverified(e),
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match session_admin(parts, state).await {
            SessionAdmin::Active(current) => Ok(Self(current)),
            SessionAdmin::Anonymous => Err(RedirectToLogin.into_response()),
            SessionAdmin::Unverified(e) => Err(AppError::from(e).into_response()),
        }
    }
}

/// Extractor that optionally gets the current admin.
///
/// Unlike `RequireAdminAuth`, this does not reject the request if the admin
/// is not logged in. An identity that cannot be checked counts as absent.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl FromRequestParts<AppState> for OptionalAdminAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match session_admin(parts, state).await {
            SessionAdmin::Active(current) => Ok(Self(Some(current))),
            SessionAdmin::Anonymous => Ok(Self(None)),
            SessionAdmin::Unverified(e) => {
                tracing::warn!(error = %e, "Failed to confirm session admin");
                Ok(Self(None))
            }
        }
    }
}

/// Bind `admin` to the session after a successful login.
///
/// Prior session state is discarded and the session id is cycled before the
/// identity is written, so a pre-login session id is never authenticated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn start_admin_session(
    session: &Session,
    admin: &Admin,
) -> Result<CurrentAdmin, tower_sessions::session::Error> {
    session.clear().await;
    session.cycle_id().await?;

    let current = CurrentAdmin {
        id: admin.id.clone(),
        email: admin.email.clone(),
    };
    session
        .insert(session_keys::CURRENT_ADMIN, &current)
        .await?;
    Ok(current)
}

/// Replace the session-stored identity (after the admin edits themself).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn refresh_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Destroy the session (logout).
///
/// # Errors
///
/// Returns an error if the session record cannot be deleted.
pub async fn end_admin_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
