/// Middleware for the API server
///
/// - `session`: session cookie resolution and the login requirement
/// - `security`: security response headers

pub mod security;
pub mod session;
