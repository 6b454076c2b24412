//! MongoDB implementation of [`DocumentStore`].

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Document, doc};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};
use secrecy::ExposeSecret;

use super::sessions::{EXPIRES_AT_FIELD, SESSION_ID_FIELD};
use super::{Collection, DocumentStore, FindQuery, RepositoryError};
use crate::config::MongoConfig;

/// Application name reported to the server.
const APP_NAME: &str = "marketmate-admin";

/// Connections kept open when idle.
const MIN_POOL_SIZE: u32 = 2;

/// Time allowed to establish a single connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Time allowed to find a usable server before an operation fails.
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Document store backed by a MongoDB database.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Connect to MongoDB with bounded pool and timeouts, then ping.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the connection string is invalid
    /// or the server does not answer the ping.
    pub async fn connect(config: &MongoConfig) -> Result<Self, RepositoryError> {
        let mut options = ClientOptions::parse(config.uri.expose_secret()).await?;
        options.app_name = Some(APP_NAME.to_owned());
        options.max_pool_size = Some(config.max_pool_size);
        options.min_pool_size = Some(MIN_POOL_SIZE.min(config.max_pool_size));
        options.connect_timeout = Some(CONNECT_TIMEOUT);
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        let store = Self { client, database };

        store.ping().await?;
        Ok(store)
    }

    /// Create the indexes the application relies on.
    ///
    /// - `admins.admin_ID` for lookups by application id
    /// - `sessions.session_id` (unique) for session loads
    /// - `sessions.expires_at` TTL index so expired sessions are purged
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if an index cannot be created.
    pub async fn ensure_indexes(&self) -> Result<(), RepositoryError> {
        self.collection(Collection::Admins)
            .create_index(IndexModel::builder().keys(doc! { "admin_ID": 1 }).build())
            .await?;

        self.collection(Collection::Sessions)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { SESSION_ID_FIELD: 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        self.collection(Collection::Sessions)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { EXPIRES_AT_FIELD: 1 })
                    .options(IndexOptions::builder().expire_after(Duration::ZERO).build())
                    .build(),
            )
            .await?;

        Ok(())
    }

    /// The underlying driver client.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.database.collection(collection.name())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn count(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<u64, RepositoryError> {
        Ok(self.collection(collection).count_documents(filter).await?)
    }

    async fn find(
        &self,
        collection: Collection,
        query: FindQuery,
    ) -> Result<Vec<Document>, RepositoryError> {
        let coll = self.collection(collection);
        let mut find = coll.find(query.filter).skip(query.skip);
        if let Some(projection) = query.projection {
            find = find.projection(projection);
        }
        if let Some(limit) = query.limit {
            find = find.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let cursor = find.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, RepositoryError> {
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<(), RepositoryError> {
        self.collection(collection).insert_one(document).await?;
        Ok(())
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Document,
        changes: Document,
    ) -> Result<u64, RepositoryError> {
        let result = self
            .collection(collection)
            .update_one(filter, doc! { "$set": changes })
            .await?;
        Ok(result.matched_count)
    }

    async fn upsert_one(
        &self,
        collection: Collection,
        filter: Document,
        replacement: Document,
    ) -> Result<(), RepositoryError> {
        self.collection(collection)
            .replace_one(filter, replacement)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<u64, RepositoryError> {
        let result = self.collection(collection).delete_one(filter).await?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    //! These tests need a running MongoDB.
    //!
    //! ```bash
    //! MONGODB_TEST_URI=mongodb://localhost:27017/ cargo test -p marketmate-admin -- --ignored
    //! ```

    use secrecy::SecretString;

    use super::*;

    async fn test_store() -> MongoStore {
        let uri = std::env::var("MONGODB_TEST_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017/".to_owned());
        let config = MongoConfig {
            uri: SecretString::from(uri),
            database: format!("marketmate_test_{}", uuid::Uuid::new_v4().simple()),
            max_pool_size: 2,
        };
        MongoStore::connect(&config).await.unwrap()
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn test_find_applies_window_and_projection() {
        let store = test_store().await;
        for i in 0..5 {
            store
                .insert_one(Collection::Devices, doc! { "n": i, "secret": "x" })
                .await
                .unwrap();
        }

        let query = FindQuery::all()
            .with_projection(doc! { "secret": 0 })
            .window(1, 2);
        let found = store.find(Collection::Devices, query).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found.first().unwrap().get_i32("n").unwrap(), 1);
        assert!(found.iter().all(|d| !d.contains_key("secret")));

        store.database.drop().await.unwrap();
    }
}
