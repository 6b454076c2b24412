//! Session middleware configuration for admin.
//!
//! Sessions live in the `sessions` collection of the document store and are
//! identified by a signed cookie with strict settings (`SameSite=Strict`,
//! `HttpOnly`, inactivity expiry).

use std::sync::Arc;

use argon2::Argon2;
use axum::Router;
use secrecy::ExposeSecret;
use tower_sessions::cookie::{Key, SameSite, time::Duration};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::AdminConfig;
use crate::db::{DocumentSessionStore, DocumentStore};

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "mm_admin_session";

/// Fixed salt for stretching `SECRET_KEY` into signing key material.
const KEY_DERIVATION_SALT: &[u8] = b"marketmate-admin-session-cookie";

/// Error building the cookie signing key.
#[derive(Debug, thiserror::Error)]
pub enum SessionKeyError {
    #[error("could not derive session key: {0}")]
    Derivation(String),
}

/// Build the cookie signing key.
///
/// `SECRET_KEY` is stretched to 64 bytes with Argon2 so any validated secret
/// yields a full-size key. Without a secret a random key is generated and
/// sessions do not survive a restart.
///
/// # Errors
///
/// Returns `SessionKeyError::Derivation` if key stretching fails.
pub fn session_key(config: &AdminConfig) -> Result<Key, SessionKeyError> {
    let Some(secret) = &config.secret_key else {
        tracing::warn!("SECRET_KEY not set; using a random session key for this process");
        return Ok(Key::generate());
    };

    let mut material = [0u8; 64];
    Argon2::default()
        .hash_password_into(
            secret.expose_secret().as_bytes(),
            KEY_DERIVATION_SALT,
            &mut material,
        )
        .map_err(|e| SessionKeyError::Derivation(e.to_string()))?;

    Ok(Key::from(&material[..]))
}

/// Wrap `router` in the session layer.
///
/// # Errors
///
/// Returns `SessionKeyError` if the signing key cannot be built.
pub fn apply_session_layer<S>(
    router: Router<S>,
    store: Arc<dyn DocumentStore>,
    config: &AdminConfig,
) -> Result<Router<S>, SessionKeyError>
where
    S: Clone + Send + Sync + 'static,
{
    let key = session_key(config)?;
    let expiry_secs = i64::try_from(config.session_expiry.as_secs()).unwrap_or(i64::MAX);

    let layer = SessionManagerLayer::new(DocumentSessionStore::new(store))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(expiry_secs)))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key);

    Ok(router.layer(layer))
}
