//! Paged reads over the opaque record collections.

use mongodb::bson::Document;

use super::{Collection, DocumentStore, FindQuery, RepositoryError};
use crate::models::{PAGE_SIZE, PageRequest};

/// Read-only access to one of the listing collections.
pub struct RecordRepository<'a> {
    store: &'a dyn DocumentStore,
    collection: Collection,
}

impl<'a> RecordRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore, collection: Collection) -> Self {
        Self { store, collection }
    }

    /// Documents on the requested page, in natural order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn page(&self, page: PageRequest) -> Result<Vec<Document>, RepositoryError> {
        self.store
            .find(self.collection, FindQuery::all().window(page.skip(), PAGE_SIZE))
            .await
    }

    /// Number of documents in the collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the count fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        self.store.count(self.collection, Document::new()).await
    }
}
