//! Admin account repository.
//!
//! Documents keep the field names earlier deployments wrote
//! (`admin_ID`, `email`, `password`), so the serde shapes below rename
//! rather than the domain types.

use mongodb::bson::{self, Bson, Document, doc};
use serde::{Deserialize, Serialize};

use marketmate_core::AdminId;

use super::{Collection, DocumentStore, FindQuery, RepositoryError};
use crate::models::{Admin, AdminSummary};

const ID_FIELD: &str = "admin_ID";
const EMAIL_FIELD: &str = "email";
const PASSWORD_FIELD: &str = "password";

// =============================================================================
// Internal Document Types
// =============================================================================

/// Stored shape of an admin account.
#[derive(Debug, Serialize, Deserialize)]
struct AdminDocument {
    #[serde(rename = "admin_ID")]
    admin_id: String,
    email: String,
    #[serde(rename = "password")]
    password_hash: String,
}

impl From<AdminDocument> for Admin {
    fn from(document: AdminDocument) -> Self {
        Self {
            id: AdminId::from(document.admin_id),
            email: document.email,
            password_hash: document.password_hash,
        }
    }
}

/// Read a listing row, tolerating ids written as numbers or `ObjectId`s.
///
/// Returns `None` when the document has no usable `admin_ID`.
fn summary_from_document(document: &Document) -> Option<AdminSummary> {
    let id = match document.get(ID_FIELD)? {
        Bson::String(s) if !s.is_empty() => s.clone(),
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::ObjectId(oid) => oid.to_hex(),
        _ => return None,
    };
    let email = document.get_str(EMAIL_FIELD).unwrap_or_default().to_owned();

    Some(AdminSummary {
        id: AdminId::from(id),
        email,
    })
}

fn decode<T: serde::de::DeserializeOwned>(document: Document) -> Result<T, RepositoryError> {
    bson::from_document(document)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid admin document: {e}")))
}

fn id_filter(id: &AdminId) -> Document {
    doc! { ID_FIELD: id.as_str() }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin account operations.
pub struct AdminRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// List all admins without their password hashes.
    ///
    /// Documents without a usable `admin_ID` are skipped with a warning so one
    /// bad record does not hide the rest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<AdminSummary>, RepositoryError> {
        let documents = self
            .store
            .find(
                Collection::Admins,
                FindQuery::all().with_projection(doc! { PASSWORD_FIELD: 0 }),
            )
            .await?;

        Ok(documents
            .iter()
            .filter_map(|d| {
                let summary = summary_from_document(d);
                if summary.is_none() {
                    tracing::warn!(
                        document_id = ?d.get("_id"),
                        "Skipping admin document without a usable admin_ID"
                    );
                }
                summary
            })
            .collect())
    }

    /// Get an admin by application id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the document is malformed.
    pub async fn get_by_id(&self, id: &AdminId) -> Result<Option<Admin>, RepositoryError> {
        let document = self
            .store
            .find_one(Collection::Admins, id_filter(id))
            .await?;

        document
            .map(|d| decode::<AdminDocument>(d).map(Into::into))
            .transpose()
    }

    /// Get the first admin with the given email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the document is malformed.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Admin>, RepositoryError> {
        let document = self
            .store
            .find_one(Collection::Admins, doc! { EMAIL_FIELD: email })
            .await?;

        document
            .map(|d| decode::<AdminDocument>(d).map(Into::into))
            .transpose()
    }

    /// Insert a new admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Serialization` if the document cannot be built.
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, admin: &Admin) -> Result<(), RepositoryError> {
        let document = bson::to_document(&AdminDocument {
            admin_id: admin.id.as_str().to_owned(),
            email: admin.email.clone(),
            password_hash: admin.password_hash.clone(),
        })?;

        self.store.insert_one(Collection::Admins, document).await
    }

    /// Update an admin's email, and the password hash when one is given.
    ///
    /// Returns `false` if no admin has this id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: &AdminId,
        email: &str,
        password_hash: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        let mut changes = doc! { EMAIL_FIELD: email };
        if let Some(hash) = password_hash {
            changes.insert(PASSWORD_FIELD, hash);
        }

        let matched = self
            .store
            .update_one(Collection::Admins, id_filter(id), changes)
            .await?;
        Ok(matched > 0)
    }

    /// Delete an admin. Returns `false` if no admin has this id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: &AdminId) -> Result<bool, RepositoryError> {
        let deleted = self
            .store
            .delete_one(Collection::Admins, id_filter(id))
            .await?;
        Ok(deleted > 0)
    }

    /// Number of admin accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the count fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        self.store.count(Collection::Admins, Document::new()).await
    }
}
