//! Admin account domain types.

use marketmate_core::AdminId;

/// An admin account (domain type).
///
/// Implements `Debug` manually so the password hash never reaches logs.
#[derive(Clone)]
pub struct Admin {
    /// Application-level identifier (`admin_ID`).
    pub id: AdminId,
    /// Email address used to log in. Not unique.
    pub email: String,
    /// PHC-format password digest.
    pub password_hash: String,
}

impl std::fmt::Debug for Admin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admin")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// An admin as shown in listings; carries no credential material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSummary {
    /// Application-level identifier (`admin_ID`).
    pub id: AdminId,
    /// Email address.
    pub email: String,
}

impl From<Admin> for AdminSummary {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email,
        }
    }
}
