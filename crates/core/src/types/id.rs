//! Prefixed string identifiers.
//!
//! Application-level identifiers are a short category prefix followed by the
//! first characters of a random UUID, e.g. `ADM1f0c9a2e`. They are the logical
//! key of a record, independent of the store's own primary key.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of UUID characters appended after the prefix.
const SUFFIX_LENGTH: usize = 8;

/// Generate a new identifier with the given category prefix.
///
/// The suffix is a slice of a random v4 UUID. Collisions are accepted as
/// negligible; callers do not retry.
///
/// # Example
///
/// ```
/// use marketmate_core::generate_id;
///
/// let id = generate_id("DEV");
/// assert!(id.starts_with("DEV"));
/// assert_eq!(id.len(), 11);
/// ```
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    let suffix = token.get(..SUFFIX_LENGTH).unwrap_or(&token);
    format!("{prefix}{suffix}")
}

/// Identifier of an admin account (`admin_ID` in the store).
///
/// Immutable once assigned. Values read back from the store are taken as-is,
/// so ids created by earlier deployments keep working even if their shape
/// differs from [`AdminId::generate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminId(String);

impl AdminId {
    /// Category prefix for admin identifiers.
    pub const PREFIX: &'static str = "ADM";

    /// Generate a fresh admin identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(generate_id(Self::PREFIX))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for AdminId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AdminId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for AdminId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for AdminId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
