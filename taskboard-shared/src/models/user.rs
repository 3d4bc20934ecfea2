/// User model
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username TEXT NOT NULL UNIQUE CHECK (username <> ''),
///     email TEXT NOT NULL UNIQUE CHECK (email <> ''),
///     password_hash TEXT NOT NULL,
///     is_admin BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Persistence lives behind [`crate::store::UserRepository`]; account rules
/// (hashing, duplicate checks, bootstrap) live in
/// [`crate::credentials::CredentialStore`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::policy::Identity;

/// A user account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name, unique across users
    pub username: String,

    /// Login key, unique across users
    pub email: String,

    /// Argon2id PHC hash, never sent to clients
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Grants cross-user visibility and reassignment
    pub is_admin: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The identity this user acts under
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            is_admin: self.is_admin,
        }
    }
}

/// Input for inserting a user
///
/// Carries a hash, never a plaintext password.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Public view of a user, safe to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }
}
