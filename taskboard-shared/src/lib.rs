//! # Taskboard Shared Library
//!
//! Domain types and business rules for the Taskboard task tracker, shared by
//! the API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: users and tasks
//! - `store`: repository traits with PostgreSQL and in-memory backends
//! - `credentials`: registration, login, profile and password rules
//! - `tasks`: task operations gated by the authorization policy
//! - `auth`: password hashing, session tokens, authorization policy
//! - `db`: connection pool and migrations
//! - `error`: the domain error taxonomy

pub mod auth;
pub mod credentials;
pub mod db;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use error::{Error, Result};

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
