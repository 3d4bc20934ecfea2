/// Request handlers, grouped by page
///
/// - `auth`: register, login, logout
/// - `pages`: index, dashboard, users, not found
/// - `tasks`: task mutations and the edit page
/// - `profile`: own account
/// - `health`: health check

pub mod auth;
pub mod health;
pub mod pages;
pub mod profile;
pub mod tasks;
