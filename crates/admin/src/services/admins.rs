//! Admin account management.
//!
//! Every operation here is reached only through authenticated routes; the
//! service itself enforces the rules that do not depend on HTTP: validation,
//! hashing, and refusing to let an admin delete their own account.

use thiserror::Error;

use marketmate_core::{AdminId, Email};

use super::auth::{self, AuthError};
use crate::db::{AdminRepository, DocumentStore, RepositoryError};
use crate::models::{Admin, AdminSummary};

/// Errors from admin management operations.
#[derive(Debug, Error)]
pub enum AdminServiceError {
    /// Email failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] marketmate_core::EmailError),

    /// New password failed validation.
    #[error("{0}")]
    WeakPassword(String),

    /// The caller tried to delete their own account.
    #[error("cannot delete the account you are logged in with")]
    SelfDelete,

    /// No admin with the given id.
    #[error("admin not found")]
    NotFound,

    /// Password hashing failed.
    #[error("auth error: {0}")]
    Auth(AuthError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<AuthError> for AdminServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::WeakPassword(msg) => Self::WeakPassword(msg),
            AuthError::Repository(e) => Self::Repository(e),
            other => Self::Auth(other),
        }
    }
}

impl AdminServiceError {
    /// Stable code carried in redirect query strings.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) => "invalid_email",
            Self::WeakPassword(_) => "weak_password",
            Self::SelfDelete => "self_delete",
            Self::NotFound => "not_found",
            Self::Auth(_) | Self::Repository(_) => "failed",
        }
    }

    /// Message shown for a code read back from a query string.
    #[must_use]
    pub fn message_for_code(code: &str) -> Option<&'static str> {
        match code {
            "invalid_email" => Some("Please enter a valid email address."),
            "weak_password" => Some("Passwords must be at least 8 characters."),
            "self_delete" => Some("You cannot delete the account you are logged in with."),
            "not_found" => Some("That admin no longer exists."),
            "failed" => Some("The change could not be saved. Please try again."),
            _ => None,
        }
    }
}

/// Admin management service.
pub struct AdminService<'a> {
    admins: AdminRepository<'a>,
}

impl<'a> AdminService<'a> {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            admins: AdminRepository::new(store),
        }
    }

    /// All admins, without credential material.
    ///
    /// # Errors
    ///
    /// Returns `AdminServiceError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<AdminSummary>, AdminServiceError> {
        Ok(self.admins.list_all().await?)
    }

    /// Fetch one admin.
    ///
    /// # Errors
    ///
    /// Returns `AdminServiceError::NotFound` if no admin has this id.
    /// Returns `AdminServiceError::Repository` if the query fails.
    pub async fn get(&self, id: &AdminId) -> Result<Admin, AdminServiceError> {
        self.admins
            .get_by_id(id)
            .await?
            .ok_or(AdminServiceError::NotFound)
    }

    /// Create an admin with a fresh `ADM` id.
    ///
    /// # Errors
    ///
    /// Returns `AdminServiceError::InvalidEmail` or `WeakPassword` on bad input.
    /// Returns `AdminServiceError::Repository` if the insert fails.
    pub async fn create(&self, email: &str, password: &str) -> Result<Admin, AdminServiceError> {
        let email = Email::parse(email)?;
        auth::validate_password(password)?;

        let admin = Admin {
            id: AdminId::generate(),
            email: email.into_inner(),
            password_hash: auth::hash_password(password)?,
        };
        self.admins.create(&admin).await?;

        tracing::info!(admin_id = %admin.id, "Admin created");
        Ok(admin)
    }

    /// Update an admin's email, and the password when a non-empty one is given.
    ///
    /// Returns the email as stored.
    ///
    /// # Errors
    ///
    /// Returns `AdminServiceError::InvalidEmail` or `WeakPassword` on bad input.
    /// Returns `AdminServiceError::NotFound` if no admin has this id.
    /// Returns `AdminServiceError::Repository` if the update fails.
    pub async fn update(
        &self,
        id: &AdminId,
        email: &str,
        password: Option<&str>,
    ) -> Result<String, AdminServiceError> {
        let email = Email::parse(email)?;

        let password_hash = match password.filter(|p| !p.is_empty()) {
            Some(password) => {
                auth::validate_password(password)?;
                Some(auth::hash_password(password)?)
            }
            None => None,
        };

        let matched = self
            .admins
            .update(id, email.as_str(), password_hash.as_deref())
            .await?;
        if !matched {
            return Err(AdminServiceError::NotFound);
        }

        tracing::info!(
            admin_id = %id,
            password_changed = password_hash.is_some(),
            "Admin updated"
        );
        Ok(email.into_inner())
    }

    /// Delete an admin other than the caller.
    ///
    /// Deleting an id that does not exist is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AdminServiceError::SelfDelete` if `target` is `current`.
    /// Returns `AdminServiceError::Repository` if the delete fails.
    pub async fn delete(
        &self,
        current: &AdminId,
        target: &AdminId,
    ) -> Result<(), AdminServiceError> {
        if current == target {
            return Err(AdminServiceError::SelfDelete);
        }

        if self.admins.delete(target).await? {
            tracing::info!(admin_id = %target, deleted_by = %current, "Admin deleted");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{Collection, InMemoryStore};
    use crate::services::auth::verify_password;

    #[tokio::test]
    async fn test_create_hashes_and_verifies() {
        let store = InMemoryStore::new();
        let service = AdminService::new(&store);

        let admin = service
            .create(" new@marketmate.io ", "hunter22!")
            .await
            .unwrap();
        assert!(admin.id.as_str().starts_with("ADM"));
        assert_eq!(admin.id.as_str().len(), 11);
        assert_eq!(admin.email, "new@marketmate.io");

        let stored = service.get(&admin.id).await.unwrap();
        assert_ne!(stored.password_hash, "hunter22!");
        assert!(verify_password(&stored.password_hash, "hunter22!"));
        assert!(!verify_password(&stored.password_hash, "hunter23!"));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let store = InMemoryStore::new();
        let service = AdminService::new(&store);

        let err = service.create("not-an-email", "hunter22!").await.unwrap_err();
        assert_eq!(err.code(), "invalid_email");

        let err = service.create("a@b.c", "short").await.unwrap_err();
        assert_eq!(err.code(), "weak_password");

        assert!(store.documents(Collection::Admins).await.is_empty());
    }

    #[tokio::test]
    async fn test_list_has_no_credentials() {
        let store = InMemoryStore::new();
        let service = AdminService::new(&store);
        service.create("a@marketmate.io", "hunter22!").await.unwrap();

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].email, "a@marketmate.io");
    }

    #[tokio::test]
    async fn test_update_with_empty_password_keeps_hash() {
        let store = InMemoryStore::new();
        let service = AdminService::new(&store);
        let admin = service.create("a@marketmate.io", "hunter22!").await.unwrap();

        let email = service
            .update(&admin.id, "b@marketmate.io", Some(""))
            .await
            .unwrap();
        assert_eq!(email, "b@marketmate.io");

        let stored = service.get(&admin.id).await.unwrap();
        assert_eq!(stored.password_hash, admin.password_hash);
        assert_eq!(stored.email, "b@marketmate.io");
    }

    #[tokio::test]
    async fn test_update_with_new_password_replaces_hash() {
        let store = InMemoryStore::new();
        let service = AdminService::new(&store);
        let admin = service.create("a@marketmate.io", "hunter22!").await.unwrap();

        service
            .update(&admin.id, "a@marketmate.io", Some("brand-new-pass"))
            .await
            .unwrap();

        let stored = service.get(&admin.id).await.unwrap();
        assert_ne!(stored.password_hash, admin.password_hash);
        assert!(verify_password(&stored.password_hash, "brand-new-pass"));
        assert!(!verify_password(&stored.password_hash, "hunter22!"));
    }

    #[tokio::test]
    async fn test_update_missing_admin() {
        let store = InMemoryStore::new();
        let err = AdminService::new(&store)
            .update(&AdminId::from("ADMmissing"), "a@b.c", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminServiceError::NotFound));
    }

    #[tokio::test]
    async fn test_self_delete_is_refused() {
        let store = InMemoryStore::new();
        let service = AdminService::new(&store);
        let admin = service.create("a@marketmate.io", "hunter22!").await.unwrap();

        let err = service.delete(&admin.id, &admin.id).await.unwrap_err();
        assert!(matches!(err, AdminServiceError::SelfDelete));
        assert_eq!(store.documents(Collection::Admins).await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_other_and_missing() {
        let store = InMemoryStore::new();
        let service = AdminService::new(&store);
        let me = service.create("me@marketmate.io", "hunter22!").await.unwrap();
        let other = service.create("other@marketmate.io", "hunter22!").await.unwrap();

        service.delete(&me.id, &other.id).await.unwrap();
        service.delete(&me.id, &other.id).await.unwrap();

        let remaining = service.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, me.id);
    }

    #[test]
    fn test_codes_have_messages() {
        for err in [
            AdminServiceError::WeakPassword(String::new()),
            AdminServiceError::SelfDelete,
            AdminServiceError::NotFound,
            AdminServiceError::Auth(AuthError::PasswordHash),
        ] {
            assert!(AdminServiceError::message_for_code(err.code()).is_some());
        }
        assert!(AdminServiceError::message_for_code("<script>").is_none());
    }
}
