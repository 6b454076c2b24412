//! MarketMate Admin library.
//!
//! The administration backend as a library, so the binary, the CLI and the
//! integration tests share one implementation.
//!
//! # Security
//!
//! Every page except login, logout, health checks and static assets
//! requires an authenticated admin session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
