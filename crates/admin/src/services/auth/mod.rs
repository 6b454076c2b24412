//! Authentication service.
//!
//! Email and password login for admin accounts. New digests are Argon2id
//! PHC strings with a random salt per hash. Werkzeug PBKDF2-SHA256 digests
//! from earlier deployments still verify and are upgraded on login.

mod error;
mod legacy;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::db::{AdminRepository, DocumentStore};
use crate::models::Admin;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Digest verified when the email is unknown, so both paths cost one hash.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("marketmate-timing-equalizer").ok());

/// Authentication service.
pub struct AuthService<'a> {
    admins: AdminRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            admins: AdminRepository::new(store),
        }
    }

    /// Login with email and password.
    ///
    /// The email is trimmed before lookup. When several admins share an
    /// address, the first stored one is checked. A legacy digest that
    /// verifies is replaced with an Argon2id digest.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password does not match.
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<Admin, AuthError> {
        let Some(mut admin) = self.admins.get_by_email(email.trim()).await? else {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(dummy, password);
            }
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&admin.password_hash, password) {
            return Err(AuthError::InvalidCredentials);
        }

        if legacy::is_legacy_digest(&admin.password_hash) {
            self.upgrade_digest(&mut admin, password).await;
        }

        Ok(admin)
    }

    /// Rehash with Argon2id. Failure leaves the legacy digest in place.
    async fn upgrade_digest(&self, admin: &mut Admin, password: &str) {
        let upgraded = match hash_password(password) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(admin_id = %admin.id, error = %e, "Failed to rehash legacy digest");
                return;
            }
        };

        match self
            .admins
            .update(&admin.id, &admin.email, Some(&upgraded))
            .await
        {
            Ok(_) => {
                tracing::info!(admin_id = %admin.id, "Upgraded legacy password digest");
                admin.password_hash = upgraded;
            }
            Err(e) => {
                tracing::warn!(admin_id = %admin.id, error = %e, "Failed to store upgraded digest");
            }
        }
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored digest.
///
/// Accepts Argon2 PHC strings and Werkzeug `pbkdf2:sha256` digests.
/// Unparseable digests never verify.
#[must_use]
pub fn verify_password(hash: &str, password: &str) -> bool {
    if legacy::is_legacy_digest(hash) {
        return legacy::verify(hash, password);
    }
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
