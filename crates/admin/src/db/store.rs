//! The document store seam.

use async_trait::async_trait;
use mongodb::bson::Document;

use super::{Collection, RepositoryError};

/// A `find` request: filter, optional projection and a skip/limit window.
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    /// Equality filter; an empty document matches everything.
    pub filter: Document,
    /// Inclusion (`1`) or exclusion (`0`) projection.
    pub projection: Option<Document>,
    /// Number of matching documents to skip.
    pub skip: u64,
    /// Maximum number of documents to return.
    pub limit: Option<u64>,
}

impl FindQuery {
    /// Match every document in the collection.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict the returned fields.
    #[must_use]
    pub fn with_projection(mut self, projection: Document) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Return at most `limit` documents after skipping `skip`.
    #[must_use]
    pub const fn window(mut self, skip: u64, limit: u64) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }
}

/// Collection-scoped document operations keyed by filter documents.
///
/// Filters are equality matches on top-level fields. Implementations own
/// their concurrency control; no operation spans more than one document.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Count the documents matching `filter`.
    async fn count(&self, collection: Collection, filter: Document)
    -> Result<u64, RepositoryError>;

    /// Return the documents selected by `query`, in natural order.
    async fn find(
        &self,
        collection: Collection,
        query: FindQuery,
    ) -> Result<Vec<Document>, RepositoryError>;

    /// Return the first document matching `filter`.
    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, RepositoryError>;

    /// Insert a document. A missing `_id` is generated by the store.
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<(), RepositoryError>;

    /// Set `changes` on the first document matching `filter`.
    ///
    /// Returns the number of matched documents (0 or 1).
    async fn update_one(
        &self,
        collection: Collection,
        filter: Document,
        changes: Document,
    ) -> Result<u64, RepositoryError>;

    /// Replace the first document matching `filter`, inserting it if absent.
    async fn upsert_one(
        &self,
        collection: Collection,
        filter: Document,
        replacement: Document,
    ) -> Result<(), RepositoryError>;

    /// Delete the first document matching `filter`.
    ///
    /// Returns the number of deleted documents (0 or 1).
    async fn delete_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<u64, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}
