//! Database access for the admin backend.
//!
//! # Store: MongoDB (`MarketMateDB` by default)
//!
//! ## Collections
//!
//! - `admins` - Admin accounts, keyed logically by `admin_ID`
//! - `devices` - Devices registered by the ingestion pipeline
//! - `images` - Uploaded images
//! - `analysis_results` - Image analysis output (`quality_score`, `error_flag`)
//! - `feedbacks` - User feedback entries
//! - `sessions` - Admin sessions (TTL-indexed on `expires_at`)
//!
//! Everything above the [`DocumentStore`] trait is store-agnostic: the
//! server runs on [`MongoStore`] and tests run on [`InMemoryStore`].

pub mod admins;
pub mod analysis;
pub mod memory;
pub mod mongo;
pub mod records;
pub mod sessions;
pub mod store;

use core::fmt;

use thiserror::Error;

pub use admins::AdminRepository;
pub use analysis::AnalysisRepository;
pub use memory::InMemoryStore;
pub use mongo::MongoStore;
pub use records::RecordRepository;
pub use sessions::DocumentSessionStore;
pub use store::{DocumentStore, FindQuery};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Error reported by the MongoDB driver.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// A document could not be serialized for storage.
    #[error("serialization error: {0}")]
    Serialization(#[from] mongodb::bson::ser::Error),

    /// Data in the store is corrupted or has an unexpected shape.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// The collections this application reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Admins,
    Devices,
    Images,
    AnalysisResults,
    Feedbacks,
    Sessions,
}

impl Collection {
    /// Name of the collection in the store.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Admins => "admins",
            Self::Devices => "devices",
            Self::Images => "images",
            Self::AnalysisResults => "analysis_results",
            Self::Feedbacks => "feedbacks",
            Self::Sessions => "sessions",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
