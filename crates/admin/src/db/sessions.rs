//! Session persistence for tower-sessions.
//!
//! Each session is one document in the `sessions` collection:
//!
//! ```text
//! { session_id: "<id>", data: "<json object>", expires_at: <datetime> }
//! ```
//!
//! `expires_at` carries a TTL index so MongoDB purges stale sessions; loads
//! also treat anything past its expiry as absent.

use core::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{self, Document, doc};
use time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};

use super::{Collection, DocumentStore, RepositoryError};

/// Field holding the session id.
pub const SESSION_ID_FIELD: &str = "session_id";

/// Field holding the serialized session data.
pub const DATA_FIELD: &str = "data";

/// Field holding the session expiry timestamp.
pub const EXPIRES_AT_FIELD: &str = "expires_at";

/// [`SessionStore`] backed by the `sessions` collection of a [`DocumentStore`].
#[derive(Clone)]
pub struct DocumentSessionStore {
    store: Arc<dyn DocumentStore>,
}

impl DocumentSessionStore {
    /// Create a session store on top of `store`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn id_filter(id: &Id) -> Document {
        doc! { SESSION_ID_FIELD: id.to_string() }
    }
}

impl fmt::Debug for DocumentSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSessionStore")
            .field("collection", &Collection::Sessions.name())
            .finish_non_exhaustive()
    }
}

fn backend(error: RepositoryError) -> session_store::Error {
    session_store::Error::Backend(error.to_string())
}

fn to_bson_datetime(at: OffsetDateTime) -> Result<bson::DateTime, session_store::Error> {
    let millis = i64::try_from(at.unix_timestamp_nanos() / 1_000_000)
        .map_err(|e| session_store::Error::Encode(format!("expiry out of range: {e}")))?;
    Ok(bson::DateTime::from_millis(millis))
}

fn from_bson_datetime(at: bson::DateTime) -> Result<OffsetDateTime, session_store::Error> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(at.timestamp_millis()) * 1_000_000)
        .map_err(|e| session_store::Error::Decode(format!("expiry out of range: {e}")))
}

fn encode(record: &Record) -> Result<Document, session_store::Error> {
    let data = serde_json::to_string(&record.data)
        .map_err(|e| session_store::Error::Encode(e.to_string()))?;

    Ok(doc! {
        SESSION_ID_FIELD: record.id.to_string(),
        DATA_FIELD: data,
        EXPIRES_AT_FIELD: to_bson_datetime(record.expiry_date)?,
    })
}

fn decode(id: Id, document: &Document) -> Result<Record, session_store::Error> {
    let data = document
        .get_str(DATA_FIELD)
        .map_err(|e| session_store::Error::Decode(e.to_string()))?;
    let data = serde_json::from_str(data).map_err(|e| session_store::Error::Decode(e.to_string()))?;

    let expires_at = document
        .get_datetime(EXPIRES_AT_FIELD)
        .map_err(|e| session_store::Error::Decode(e.to_string()))?;

    Ok(Record {
        id,
        data,
        expiry_date: from_bson_datetime(*expires_at)?,
    })
}

#[async_trait]
impl SessionStore for DocumentSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self
            .store
            .find_one(Collection::Sessions, Self::id_filter(&record.id))
            .await
            .map_err(backend)?
            .is_some()
        {
            record.id = Id::default();
        }
        self.save(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.store
            .upsert_one(
                Collection::Sessions,
                Self::id_filter(&record.id),
                encode(record)?,
            )
            .await
            .map_err(backend)
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let Some(document) = self
            .store
            .find_one(Collection::Sessions, Self::id_filter(session_id))
            .await
            .map_err(backend)?
        else {
            return Ok(None);
        };

        let record = decode(*session_id, &document)?;
        if record.expiry_date <= OffsetDateTime::now_utc() {
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.store
            .delete_one(Collection::Sessions, Self::id_filter(session_id))
            .await
            .map_err(backend)?;
        Ok(())
    }
}
