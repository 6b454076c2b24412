//! Read-only listings: devices, images, analysis results, feedbacks.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::db::{Collection, RecordRepository};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{CurrentAdmin, PageRequest, Pagination, RecordTable};
use crate::state::AppState;

/// `?page=` on listing pages. Kept as text so bad values fall back to page 1
/// instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Listing template shared by every record collection.
#[derive(Template, WebTemplate)]
#[template(path = "records/index.html")]
pub struct RecordsTemplate {
    pub admin_email: String,
    pub current_path: &'static str,
    pub title: &'static str,
    pub table: RecordTable,
    pub pagination: Pagination,
}

/// A listing page: which collection, under which path and heading.
struct Listing {
    collection: Collection,
    path: &'static str,
    title: &'static str,
}

const DEVICES: Listing = Listing {
    collection: Collection::Devices,
    path: "/devices",
    title: "Devices",
};

const IMAGES: Listing = Listing {
    collection: Collection::Images,
    path: "/images",
    title: "Images",
};

const ANALYSIS: Listing = Listing {
    collection: Collection::AnalysisResults,
    path: "/analysis",
    title: "Analysis Results",
};

const FEEDBACKS: Listing = Listing {
    collection: Collection::Feedbacks,
    path: "/feedbacks",
    title: "Feedbacks",
};

async fn render(
    listing: &Listing,
    admin: CurrentAdmin,
    state: &AppState,
    query: &PageQuery,
) -> Result<RecordsTemplate, AppError> {
    let page = PageRequest::parse(query.page.as_deref());
    let repo = RecordRepository::new(state.store(), listing.collection);

    let (documents, total) = tokio::join!(repo.page(page), repo.count());
    let documents = documents.inspect_err(|e| {
        tracing::error!(error = %e, collection = %listing.collection, "Failed to list records");
    })?;
    let total = total.inspect_err(|e| {
        tracing::error!(error = %e, collection = %listing.collection, "Failed to count records");
    })?;

    Ok(RecordsTemplate {
        admin_email: admin.email,
        current_path: listing.path,
        title: listing.title,
        table: RecordTable::from_documents(&documents),
        pagination: page.paginate(total),
    })
}

/// GET /devices
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn devices(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<RecordsTemplate, AppError> {
    render(&DEVICES, admin, &state, &query).await
}

/// GET /images
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn images(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<RecordsTemplate, AppError> {
    render(&IMAGES, admin, &state, &query).await
}

/// GET /analysis
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn analysis(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<RecordsTemplate, AppError> {
    render(&ANALYSIS, admin, &state, &query).await
}

/// GET /feedbacks
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn feedbacks(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<RecordsTemplate, AppError> {
    render(&FEEDBACKS, admin, &state, &query).await
}
