//! MarketMate Core - Shared types library.
//!
//! This crate provides the domain types shared by the MarketMate components:
//! - `admin` - The administration web backend
//! - `cli` - Operator commands (bootstrap admins, create indexes)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Prefixed identifiers and validated email addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
