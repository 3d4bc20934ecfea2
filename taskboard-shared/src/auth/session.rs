/// Session tokens
///
/// A session is an HS256-signed JWT naming the user. The API layer stores it
/// in an HttpOnly cookie; this module only mints and checks tokens and
/// resolves them back to a live [`Identity`].
///
/// Resolution always reloads the user, so a token for an account that no
/// longer exists resolves to `None` and admin rights reflect the current
/// database row rather than the moment of login.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::session::SessionManager;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sessions = SessionManager::new("a-secret-of-at-least-thirty-two-bytes!", Duration::hours(24));
/// let token = sessions.issue(Uuid::new_v4())?;
/// let claims = sessions.validate(&token)?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::policy::Identity;
use crate::store::UserRepository;

/// Issuer stamped into every session token
pub const ISSUER: &str = "taskboard";

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to sign token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Signature, issuer or structure invalid
    #[error("Invalid session token: {0}")]
    Invalid(String),

    /// Token is past its expiry
    #[error("Session has expired")]
    Expired,
}

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: Uuid,

    /// Issuer, always [`ISSUER`]
    pub iss: String,

    /// Issued at (unix seconds)
    pub iat: i64,

    /// Expires at (unix seconds)
    pub exp: i64,

    /// Not valid before (unix seconds)
    pub nbf: i64,
}

impl SessionClaims {
    /// Claims for `user_id` valid for `ttl` from now
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
        }
    }
}

/// Mints, validates and resolves session tokens
#[derive(Clone)]
pub struct SessionManager {
    secret: Arc<str>,
    ttl: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a manager signing with `secret`
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            secret: Arc::from(secret),
            ttl,
        }
    }

    /// Session lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a fresh session token for `user_id`
    pub fn issue(&self, user_id: Uuid) -> Result<String, SessionError> {
        let claims = SessionClaims::new(user_id, self.ttl);
        let key = EncodingKey::from_secret(self.secret.as_bytes());

        encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|e| SessionError::CreateError(e.to_string()))
    }

    /// Checks signature, issuer and time bounds
    pub fn validate(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
            _ => SessionError::Invalid(e.to_string()),
        })?;

        Ok(data.claims)
    }

    /// Resolves a token to the identity of an existing user
    ///
    /// Invalid or expired tokens, and tokens naming a deleted user, resolve
    /// to `None`. Only storage failures are errors.
    pub async fn resolve(
        &self,
        token: &str,
        users: &dyn UserRepository,
    ) -> crate::error::Result<Option<Identity>> {
        let claims = match self.validate(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Rejected session token");
                return Ok(None);
            }
        };

        let user = users.find_by_id(claims.sub).await?;
        Ok(user.map(|u| u.identity()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;
    use crate::store::memory::MemoryStore;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_issue_and_validate() {
        let sessions = SessionManager::new(SECRET, Duration::hours(1));
        let user_id = Uuid::new_v4();

        let token = sessions.issue(user_id).unwrap();
        let claims = sessions.validate(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, ISSUER);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let sessions = SessionManager::new(SECRET, Duration::hours(1));
        let other = SessionManager::new("another-secret-key-at-least-32-bytes", Duration::hours(1));

        let token = sessions.issue(Uuid::new_v4()).unwrap();
        assert!(matches!(other.validate(&token), Err(SessionError::Invalid(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let sessions = SessionManager::new(SECRET, Duration::hours(-2));

        let token = sessions.issue(Uuid::new_v4()).unwrap();
        assert!(matches!(sessions.validate(&token), Err(SessionError::Expired)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let sessions = SessionManager::new(SECRET, Duration::hours(1));
        assert!(sessions.validate("not.a.token").is_err());
    }

    #[tokio::test]
    async fn test_resolve_loads_current_user() {
        let store = MemoryStore::new();
        let user = store
            .insert(NewUser {
                username: "alice".to_string(),
                email: "alice@x.com".to_string(),
                password_hash: "hash".to_string(),
                is_admin: false,
            })
            .await
            .unwrap();

        let sessions = SessionManager::new(SECRET, Duration::hours(1));
        let token = sessions.issue(user.id).unwrap();

        let identity = sessions.resolve(&token, &store).await.unwrap().unwrap();
        assert_eq!(identity.user_id, user.id);
        assert!(!identity.is_admin);

        let stranger = sessions.issue(Uuid::new_v4()).unwrap();
        assert!(sessions.resolve(&stranger, &store).await.unwrap().is_none());
        assert!(sessions.resolve("garbage", &store).await.unwrap().is_none());
    }
}
