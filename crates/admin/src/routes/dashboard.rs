//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::services::{DashboardService, DashboardStats};
use crate::state::AppState;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_email: String,
    pub current_path: &'static str,
    pub stats: DashboardStats,
    pub avg_quality_score: String,
}

/// Dashboard page handler.
///
/// GET /
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<DashboardTemplate, AppError> {
    let stats = DashboardService::new(state.store())
        .summarize()
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to load dashboard stats"))?;

    Ok(DashboardTemplate {
        admin_email: admin.email,
        current_path: "/",
        avg_quality_score: format!("{:.2}", stats.avg_quality_score),
        stats,
    })
}
