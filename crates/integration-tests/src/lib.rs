//! Integration tests for the MarketMate admin backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marketmate-integration-tests
//! ```
//!
//! The full router (sessions, security headers, tracing) is driven
//! in-process with `tower::ServiceExt::oneshot`. No MongoDB is needed: the
//! application runs on a [`CountingStore`], an in-memory document store that
//! counts every call and can be switched into a failing mode.
//!
//! # Test Categories
//!
//! - `auth` - Login, logout, session fixation, the login gate
//! - `admins` - Admin CRUD and its guard rails
//! - `listings` - Dashboard numbers and paginated listings

#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, header};
use mongodb::bson::Document;
use tower::ServiceExt;

use marketmate_admin::config::AdminConfig;
use marketmate_admin::db::{
    AdminRepository, Collection, DocumentStore, FindQuery, InMemoryStore, RepositoryError,
};
use marketmate_admin::middleware::SESSION_COOKIE_NAME;
use marketmate_admin::models::Admin;
use marketmate_admin::routes;
use marketmate_admin::services::auth::hash_password;
use marketmate_admin::state::AppState;
use marketmate_core::AdminId;

/// Largest response body the helpers will buffer.
const BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// Counting Store
// =============================================================================

/// In-memory document store that records how often it is used.
///
/// When broken, every call except those on the `sessions` collection fails,
/// so a logged-in client can still reach handlers whose data access errors.
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: InMemoryStore,
    calls: AtomicUsize,
    broken: AtomicBool,
}

impl CountingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapped store, for seeding and inspection.
    #[must_use]
    pub const fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    /// Number of store calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make data access fail from now on.
    pub fn break_data_access(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    fn enter(&self, collection: Option<Collection>) -> Result<(), RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let broken = self.broken.load(Ordering::SeqCst);
        if broken && collection != Some(Collection::Sessions) {
            return Err(RepositoryError::DataCorruption(
                "test store is unavailable".to_owned(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn count(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<u64, RepositoryError> {
        self.enter(Some(collection))?;
        self.inner.count(collection, filter).await
    }

    async fn find(
        &self,
        collection: Collection,
        query: FindQuery,
    ) -> Result<Vec<Document>, RepositoryError> {
        self.enter(Some(collection))?;
        self.inner.find(collection, query).await
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, RepositoryError> {
        self.enter(Some(collection))?;
        self.inner.find_one(collection, filter).await
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<(), RepositoryError> {
        self.enter(Some(collection))?;
        self.inner.insert_one(collection, document).await
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Document,
        changes: Document,
    ) -> Result<u64, RepositoryError> {
        self.enter(Some(collection))?;
        self.inner.update_one(collection, filter, changes).await
    }

    async fn upsert_one(
        &self,
        collection: Collection,
        filter: Document,
        replacement: Document,
    ) -> Result<(), RepositoryError> {
        self.enter(Some(collection))?;
        self.inner.upsert_one(collection, filter, replacement).await
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<u64, RepositoryError> {
        self.enter(Some(collection))?;
        self.inner.delete_one(collection, filter).await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.enter(None)?;
        self.inner.ping().await
    }
}

// =============================================================================
// Test Application
// =============================================================================

/// The admin application wired to a [`CountingStore`].
pub struct TestApp {
    router: Router,
    store: Arc<CountingStore>,
}

impl TestApp {
    /// Build the application with default configuration.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(CountingStore::new());
        let state = AppState::new(AdminConfig::default(), store.clone());
        let router = routes::app(state).expect("Failed to build application");
        Self { router, store }
    }

    #[must_use]
    pub fn store(&self) -> &CountingStore {
        &self.store
    }

    /// Insert an admin with a real password hash.
    pub async fn seed_admin(&self, email: &str, password: &str) -> AdminId {
        let admin = Admin {
            id: AdminId::generate(),
            email: email.to_owned(),
            password_hash: hash_password(password).expect("Failed to hash password"),
        };
        AdminRepository::new(self.store.inner())
            .create(&admin)
            .await
            .expect("Failed to seed admin");
        admin.id
    }

    /// Load an admin straight from the store.
    pub async fn admin(&self, id: &AdminId) -> Option<Admin> {
        AdminRepository::new(self.store.inner())
            .get_by_id(id)
            .await
            .expect("Failed to read admin")
    }

    /// Send a request through the full middleware stack.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    /// `GET path`, optionally with a session cookie.
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::get(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).expect("Invalid request"))
            .await
    }

    /// `POST path` with a urlencoded form body.
    pub async fn post_form(&self, path: &str, form: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_owned())).expect("Invalid request"))
            .await
    }

    /// Log in and return the `name=value` session cookie.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post_form("/login", &format!("email={email}&password={password}"), None)
            .await;
        assert_eq!(location(&response), Some("/"), "login should redirect home");
        session_cookie(&response).expect("login should set a session cookie")
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Response Helpers
// =============================================================================

/// The session cookie set by a response, as `name=value`.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    let prefix = format!("{SESSION_COOKIE_NAME}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter(|value| value.starts_with(&prefix))
        .filter_map(|value| value.split(';').next())
        .map(str::to_owned)
        .next()
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// Buffer the response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), BODY_LIMIT)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
