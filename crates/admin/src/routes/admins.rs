//! Admin management route handlers.
//!
//! Mutations answer with redirects; failures carry a short error code in the
//! query string that the target page turns into a message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use marketmate_core::AdminId;

use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, refresh_current_admin};
use crate::models::{AdminSummary, CurrentAdmin};
use crate::services::{AdminService, AdminServiceError};
use crate::state::AppState;

const ADMINS_PATH: &str = "/admins";

// =============================================================================
// Form and Query Types
// =============================================================================

/// New admin form data.
#[derive(Deserialize)]
pub struct AddAdminForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Edit admin form data. An empty password keeps the current one.
#[derive(Deserialize)]
pub struct EditAdminForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// Error code carried back from a failed mutation.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

impl MessageQuery {
    fn message(&self) -> Option<String> {
        self.error
            .as_deref()
            .and_then(AdminServiceError::message_for_code)
            .map(String::from)
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Admin list template.
#[derive(Template, WebTemplate)]
#[template(path = "admins/index.html")]
pub struct AdminsTemplate {
    pub admin_email: String,
    pub current_path: &'static str,
    pub current_admin_id: String,
    pub admins: Vec<AdminSummary>,
    pub error: Option<String>,
}

/// Edit admin template.
#[derive(Template, WebTemplate)]
#[template(path = "admins/edit.html")]
pub struct EditAdminTemplate {
    pub admin_email: String,
    pub current_path: &'static str,
    pub admin: AdminSummary,
    pub error: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

fn admins_with_error(err: &AdminServiceError) -> Redirect {
    Redirect::to(&format!("{ADMINS_PATH}?error={}", err.code()))
}

/// Edit form path for redirects. Ids that would not survive a URL unescaped
/// fall back to the list page.
fn edit_path(id: &AdminId, err: &AdminServiceError) -> String {
    let safe = id
        .as_str()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if safe {
        format!("{ADMINS_PATH}/{id}/edit?error={}", err.code())
    } else {
        format!("{ADMINS_PATH}?error={}", err.code())
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// List admins.
///
/// GET /admins
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Result<AdminsTemplate, AppError> {
    let admins = AdminService::new(state.store())
        .list()
        .await
        .map_err(|e| match e {
            AdminServiceError::Repository(e) => AppError::Database(e),
            other => AppError::Internal(other.to_string()),
        })?;

    Ok(AdminsTemplate {
        error: query.message(),
        current_admin_id: admin.id.into_inner(),
        admin_email: admin.email,
        current_path: ADMINS_PATH,
        admins,
    })
}

/// Create an admin.
///
/// POST /admins/add, POST /add_admin
#[instrument(skip(admin, state, form), fields(admin_id = %admin.id))]
pub async fn add(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<AddAdminForm>,
) -> Redirect {
    match AdminService::new(state.store())
        .create(&form.email, &form.password)
        .await
    {
        Ok(_) => Redirect::to(ADMINS_PATH),
        Err(e) => {
            if matches!(e, AdminServiceError::Repository(_) | AdminServiceError::Auth(_)) {
                tracing::error!(error = %e, "Failed to create admin");
            } else {
                tracing::info!(reason = %e, "Admin creation rejected");
            }
            admins_with_error(&e)
        }
    }
}

/// Delete an admin other than the caller.
///
/// GET /admins/{admin_id}/delete, GET /delete_admin/{admin_id}
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(target): Path<String>,
) -> Redirect {
    let target = AdminId::from(target);
    match AdminService::new(state.store())
        .delete(&admin.id, &target)
        .await
    {
        Ok(()) => Redirect::to(ADMINS_PATH),
        Err(e) => {
            if matches!(e, AdminServiceError::SelfDelete) {
                tracing::info!("Refused self-delete");
            } else {
                tracing::error!(error = %e, target = %target, "Failed to delete admin");
            }
            admins_with_error(&e)
        }
    }
}

/// Render the edit form.
///
/// GET /admins/{admin_id}/edit, GET /edit_admin/{admin_id}
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn edit_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(target): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let target = AdminId::from(target);
    match AdminService::new(state.store()).get(&target).await {
        Ok(found) => Ok(EditAdminTemplate {
            admin_email: admin.email,
            current_path: ADMINS_PATH,
            admin: found.into(),
            error: query.message(),
        }
        .into_response()),
        Err(AdminServiceError::NotFound) => Ok(Redirect::to(ADMINS_PATH).into_response()),
        Err(AdminServiceError::Repository(e)) => Err(AppError::Database(e)),
        Err(other) => Err(AppError::Internal(other.to_string())),
    }
}

/// Apply the edit form.
///
/// POST /admins/{admin_id}/edit, POST /edit_admin/{admin_id}
#[instrument(skip(admin, state, session, form), fields(admin_id = %admin.id))]
pub async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(target): Path<String>,
    Form(form): Form<EditAdminForm>,
) -> Redirect {
    let target = AdminId::from(target);
    let result = AdminService::new(state.store())
        .update(&target, &form.email, form.password.as_deref())
        .await;

    match result {
        Ok(email) => {
            if target == admin.id {
                let refreshed = CurrentAdmin {
                    id: admin.id,
                    email,
                };
                if let Err(e) = refresh_current_admin(&session, &refreshed).await {
                    tracing::warn!(error = %e, "Failed to refresh session after self-edit");
                }
            }
            Redirect::to(ADMINS_PATH)
        }
        Err(AdminServiceError::NotFound) => Redirect::to(ADMINS_PATH),
        Err(e @ (AdminServiceError::InvalidEmail(_) | AdminServiceError::WeakPassword(_))) => {
            tracing::info!(reason = %e, "Admin update rejected");
            Redirect::to(&edit_path(&target, &e))
        }
        Err(e) => {
            tracing::error!(error = %e, target = %target, "Failed to update admin");
            admins_with_error(&e)
        }
    }
}
