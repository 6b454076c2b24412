//! Admin account commands.
//!
//! # Environment Variables
//!
//! - `MONGODB_URI` - MongoDB connection string
//! - `MONGODB_DATABASE` - Database name (default `MarketMateDB`)
//! - `MM_ADMIN_PASSWORD` - Password, when `-p` is not given

use marketmate_admin::db::{AdminRepository, DocumentStore};
use marketmate_admin::services::{AdminService, AdminServiceError};
use marketmate_core::Email;
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Service(#[from] AdminServiceError),

    /// An admin with this email already exists.
    #[error("Admin already exists with email: {0}")]
    AdminExists(String),

    /// No admin has this email.
    #[error("No admin with email: {0}")]
    UnknownEmail(String),
}

/// Create a new admin.
pub async fn create(email: &str, password: &str) -> Result<(), AdminError> {
    let store = connect().await?;
    let admin = create_in(&store, email, password).await?;

    tracing::info!(
        "Admin created successfully! ID: {}, Email: {}",
        admin.id,
        admin.email
    );
    Ok(())
}

/// List admins as `id<TAB>email`, one per line.
pub async fn list() -> Result<(), AdminError> {
    let store = connect().await?;
    let admins = AdminService::new(&store).list().await?;

    if admins.is_empty() {
        tracing::warn!("No admins found. Create one with 'mm-cli admin create'.");
    }
    for admin in admins {
        tracing::info!("{}\t{}", admin.id, admin.email);
    }
    Ok(())
}

/// Replace the password of the admin with this email.
pub async fn set_password(email: &str, password: &str) -> Result<(), AdminError> {
    let store = connect().await?;
    let id = set_password_in(&store, email, password).await?;

    tracing::info!("Password updated for admin {id}");
    Ok(())
}

/// Email uniqueness is not enforced by the store, so bootstrap refuses
/// duplicates here.
async fn create_in(
    store: &dyn DocumentStore,
    email: &str,
    password: &str,
) -> Result<marketmate_admin::models::Admin, AdminError> {
    let normalized = Email::parse(email).map_err(AdminServiceError::from)?;
    if AdminRepository::new(store)
        .get_by_email(normalized.as_str())
        .await
        .map_err(AdminServiceError::from)?
        .is_some()
    {
        return Err(AdminError::AdminExists(normalized.into_inner()));
    }

    Ok(AdminService::new(store).create(email, password).await?)
}

async fn set_password_in(
    store: &dyn DocumentStore,
    email: &str,
    password: &str,
) -> Result<marketmate_core::AdminId, AdminError> {
    let normalized = Email::parse(email).map_err(AdminServiceError::from)?;
    let admin = AdminRepository::new(store)
        .get_by_email(normalized.as_str())
        .await
        .map_err(AdminServiceError::from)?
        .ok_or_else(|| AdminError::UnknownEmail(normalized.as_str().to_owned()))?;

    if password.is_empty() {
        return Err(AdminServiceError::WeakPassword("password is required".to_owned()).into());
    }

    AdminService::new(store)
        .update(&admin.id, &admin.email, Some(password))
        .await?;
    Ok(admin.id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use marketmate_admin::db::InMemoryStore;
    use marketmate_admin::services::auth::verify_password;

    #[tokio::test]
    async fn test_create_refuses_duplicate_email() {
        let store = InMemoryStore::new();
        create_in(&store, "ops@marketmate.io", "long enough").await.unwrap();

        let err = create_in(&store, " ops@marketmate.io ", "long enough")
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::AdminExists(_)));
    }

    #[tokio::test]
    async fn test_set_password_replaces_hash() {
        let store = InMemoryStore::new();
        let admin = create_in(&store, "ops@marketmate.io", "first password")
            .await
            .unwrap();

        let id = set_password_in(&store, "ops@marketmate.io", "second password")
            .await
            .unwrap();
        assert_eq!(id, admin.id);

        let stored = AdminRepository::new(&store)
            .get_by_id(&id)
            .await
            .unwrap()
            .unwrap();
        assert!(verify_password(&stored.password_hash, "second password"));
        assert!(!verify_password(&stored.password_hash, "first password"));
    }

    #[tokio::test]
    async fn test_set_password_unknown_email() {
        let store = InMemoryStore::new();
        let err = set_password_in(&store, "nobody@marketmate.io", "whatever123")
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::UnknownEmail(_)));
    }
}
