//! In-process implementation of [`DocumentStore`].
//!
//! Supports exactly what the application asks of MongoDB: top-level equality
//! filters, inclusion/exclusion projections and skip/limit windows. Used by
//! the test suites and handy for running the server without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document, oid::ObjectId};
use tokio::sync::RwLock;

use super::{Collection, DocumentStore, FindQuery, RepositoryError};

/// Document store held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append documents to a collection, assigning `_id`s where missing.
    pub async fn seed(&self, collection: Collection, documents: impl IntoIterator<Item = Document>) {
        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection).or_default();
        stored.extend(documents.into_iter().map(with_object_id));
    }

    /// Snapshot of every document in a collection.
    pub async fn documents(&self, collection: Collection) -> Vec<Document> {
        self.collections
            .read()
            .await
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }
}

fn with_object_id(mut document: Document) -> Document {
    if !document.contains_key("_id") {
        document.insert("_id", ObjectId::new());
    }
    document
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key) == Some(expected))
}

fn is_projection_flag_set(value: &Bson) -> bool {
    match value {
        Bson::Boolean(flag) => *flag,
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(n) => *n != 0.0,
        _ => true,
    }
}

/// Apply a MongoDB-style projection.
///
/// A projection whose fields are all `0` excludes those fields; otherwise
/// only the flagged fields (plus `_id`, unless excluded) are kept.
fn project(document: &Document, projection: &Document) -> Document {
    let exclusion = projection
        .iter()
        .all(|(_, flag)| !is_projection_flag_set(flag));

    if exclusion {
        let mut projected = document.clone();
        for (key, _) in projection {
            projected.remove(key);
        }
        return projected;
    }

    let keep_id = projection.get("_id").is_none_or(is_projection_flag_set);
    document
        .iter()
        .filter(|(key, _)| {
            if key.as_str() == "_id" {
                keep_id
            } else {
                projection.get(key.as_str()).is_some_and(is_projection_flag_set)
            }
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn count(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<u64, RepositoryError> {
        let collections = self.collections.read().await;
        let count = collections
            .get(&collection)
            .map_or(0, |docs| docs.iter().filter(|d| matches(d, &filter)).count());
        Ok(count as u64)
    }

    async fn find(
        &self,
        collection: Collection,
        query: FindQuery,
    ) -> Result<Vec<Document>, RepositoryError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(&collection) else {
            return Ok(Vec::new());
        };

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));

        Ok(docs
            .iter()
            .filter(|d| matches(d, &query.filter))
            .skip(skip)
            .take(limit)
            .map(|d| {
                query
                    .projection
                    .as_ref()
                    .map_or_else(|| d.clone(), |p| project(d, p))
            })
            .collect())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, RepositoryError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)).cloned()))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<(), RepositoryError> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .push(with_object_id(document));
        Ok(())
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Document,
        changes: Document,
    ) -> Result<u64, RepositoryError> {
        let mut collections = self.collections.write().await;
        let Some(target) = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| matches(d, &filter)))
        else {
            return Ok(0);
        };

        for (key, value) in changes {
            target.insert(key, value);
        }
        Ok(1)
    }

    async fn upsert_one(
        &self,
        collection: Collection,
        filter: Document,
        replacement: Document,
    ) -> Result<(), RepositoryError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        match docs.iter_mut().find(|d| matches(d, &filter)) {
            Some(existing) => {
                let id = existing.get("_id").cloned();
                *existing = replacement;
                if let Some(id) = id {
                    existing.insert("_id", id);
                }
            }
            None => docs.push(with_object_id(replacement)),
        }
        Ok(())
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<u64, RepositoryError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };

        match docs.iter().position(|d| matches(d, &filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mongodb::bson::doc;

    use super::*;

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .seed(
                Collection::Devices,
                (1..=25).map(|n| doc! { "device_ID": format!("DEV{n}"), "n": n }),
            )
            .await;
        store
    }

    #[tokio::test]
    async fn test_seed_assigns_object_ids() {
        let store = seeded().await;
        let docs = store.documents(Collection::Devices).await;
        assert_eq!(docs.len(), 25);
        assert!(docs.iter().all(|d| d.get_object_id("_id").is_ok()));
    }

    #[tokio::test]
    async fn test_find_window() {
        let store = seeded().await;
        let page = store
            .find(Collection::Devices, FindQuery::all().window(20, 10))
            .await
            .unwrap();
        assert_eq!(page.len(), 5);
        assert_eq!(page[0].get_i32("n").unwrap(), 21);
    }

    #[tokio::test]
    async fn test_equality_filter_and_count() {
        let store = seeded().await;
        let filter = doc! { "device_ID": "DEV7" };
        assert_eq!(store.count(Collection::Devices, filter.clone()).await.unwrap(), 1);
        let found = store.find_one(Collection::Devices, filter).await.unwrap();
        assert_eq!(found.unwrap().get_i32("n").unwrap(), 7);
        assert_eq!(store.count(Collection::Images, doc! {}).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_exclusion_projection() {
        let store = InMemoryStore::new();
        store
            .seed(
                Collection::Admins,
                [doc! { "admin_ID": "ADM1", "email": "a@b.c", "password": "hash" }],
            )
            .await;

        let docs = store
            .find(
                Collection::Admins,
                FindQuery::all().with_projection(doc! { "password": 0 }),
            )
            .await
            .unwrap();
        assert!(!docs[0].contains_key("password"));
        assert!(docs[0].contains_key("email"));
        assert!(docs[0].contains_key("_id"));
    }

    #[tokio::test]
    async fn test_inclusion_projection_keeps_id() {
        let store = InMemoryStore::new();
        store
            .seed(
                Collection::AnalysisResults,
                [doc! { "quality_score": 0.9, "error_flag": false, "image_ID": "IMG1" }],
            )
            .await;

        let docs = store
            .find(
                Collection::AnalysisResults,
                FindQuery::all().with_projection(doc! { "quality_score": 1, "error_flag": 1 }),
            )
            .await
            .unwrap();
        assert_eq!(docs[0].len(), 3);
        assert!(docs[0].contains_key("quality_score"));
        assert!(docs[0].contains_key("error_flag"));
        assert!(!docs[0].contains_key("image_ID"));
        assert!(docs[0].contains_key("_id"));
    }

    #[tokio::test]
    async fn test_update_sets_fields_on_first_match() {
        let store = seeded().await;
        let matched = store
            .update_one(
                Collection::Devices,
                doc! { "device_ID": "DEV3" },
                doc! { "status": "offline" },
            )
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let doc = store
            .find_one(Collection::Devices, doc! { "device_ID": "DEV3" })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.get_str("status").unwrap(), "offline");
        assert_eq!(doc.get_i32("n").unwrap(), 3);

        let missing = store
            .update_one(Collection::Devices, doc! { "device_ID": "nope" }, doc! { "x": 1 })
            .await
            .unwrap();
        assert_eq!(missing, 0);
    }

    #[tokio::test]
    async fn test_upsert_replaces_or_inserts() {
        let store = InMemoryStore::new();
        let filter = doc! { "session_id": "abc" };

        store
            .upsert_one(Collection::Sessions, filter.clone(), doc! { "session_id": "abc", "v": 1 })
            .await
            .unwrap();
        let first_id = store.documents(Collection::Sessions).await[0]
            .get_object_id("_id")
            .unwrap();

        store
            .upsert_one(Collection::Sessions, filter, doc! { "session_id": "abc", "v": 2 })
            .await
            .unwrap();

        let docs = store.documents(Collection::Sessions).await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].get_i32("v").unwrap(), 2);
        assert_eq!(docs[0].get_object_id("_id").unwrap(), first_id);
    }

    #[tokio::test]
    async fn test_delete_one() {
        let store = seeded().await;
        let filter = doc! { "device_ID": "DEV1" };
        assert_eq!(store.delete_one(Collection::Devices, filter.clone()).await.unwrap(), 1);
        assert_eq!(store.delete_one(Collection::Devices, filter).await.unwrap(), 0);
        assert_eq!(store.count(Collection::Devices, doc! {}).await.unwrap(), 24);
    }
}
