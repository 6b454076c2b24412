//! Business logic services for admin.
//!
//! # Services
//!
//! - `admins` - Admin account management (create, update, delete)
//! - `auth` - Email and password login, Argon2id hashing
//! - `dashboard` - Collection counts and quality score summary

pub mod admins;
pub mod auth;
pub mod dashboard;

pub use admins::{AdminService, AdminServiceError};
pub use auth::{AuthError, AuthService};
pub use dashboard::{DashboardService, DashboardStats};
