//! # Taskboard API Server Library
//!
//! HTTP surface of the task tracker: session handling, pages served as
//! JSON view-models and form handlers that redirect with a flash notice.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `flash`: One-shot notices and redirect responses
//! - `middleware`: Session resolution, login requirement, security headers
//! - `page`: JSON page responses
//! - `redirect`: Same-origin checks for post-login targets
//! - `routes`: Request handlers

pub mod app;
pub mod config;
pub mod error;
pub mod flash;
pub mod middleware;
pub mod page;
pub mod redirect;
pub mod routes;
