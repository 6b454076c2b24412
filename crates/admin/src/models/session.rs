//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use marketmate_core::AdminId;

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the logged-in admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's application-level ID.
    pub id: AdminId,
    /// Admin's email address, shown in the navigation bar.
    pub email: String,
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
