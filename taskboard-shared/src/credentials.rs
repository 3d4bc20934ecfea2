/// Credential store
///
/// Account rules on top of a [`UserRepository`]: input validation, password
/// hashing, duplicate detection, password changes and the idempotent admin
/// bootstrap.
///
/// Duplicate checks run twice: a lookup first so the caller gets a precise
/// error, then the repository's own constraint, which is what actually
/// serializes two registrations racing for the same email.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_shared::credentials::CredentialStore;
/// use taskboard_shared::store::memory::MemoryStore;
///
/// # async fn example() -> taskboard_shared::error::Result<()> {
/// let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
///
/// let alice = credentials.register("alice", "alice@x.com", "pw123").await?;
/// let session_user = credentials.authenticate("alice@x.com", "pw123").await?;
/// assert_eq!(session_user.map(|u| u.id), Some(alice.id));
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_against_dummy, verify_password};
use crate::auth::policy::{decide, Action, Identity, Requester};
use crate::error::{Error, Result};
use crate::models::user::{NewUser, User};
use crate::store::UserRepository;

/// What `bootstrap_admin` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The admin account was created
    Created,

    /// An account with the bootstrap email already existed
    AlreadyPresent,
}

/// Account operations
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserRepository>,
}

fn required(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Underlying repository
    pub fn repository(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    /// Creates a regular account
    ///
    /// Username and email are trimmed. The password is stored only as an
    /// Argon2id hash.
    ///
    /// # Errors
    ///
    /// - `Validation` if any field is empty
    /// - `DuplicateEmail` / `DuplicateUsername` if taken
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<User> {
        self.create_account(username, email, password, false).await
    }

    async fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<User> {
        let username = required(username, "Username")?;
        let email = required(email, "Email")?;
        if password.trim().is_empty() {
            return Err(Error::validation("Password is required"));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(Error::DuplicateEmail);
        }
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(Error::DuplicateUsername);
        }

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .insert(NewUser {
                username,
                email,
                password_hash,
                is_admin,
            })
            .await?;

        info!(user_id = %user.id, is_admin, "Account created");
        Ok(user)
    }

    /// Checks credentials
    ///
    /// Returns the user only when `password` verifies against the stored
    /// hash. Unknown emails still pay for one hash verification.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.users.find_by_email(email.trim()).await? else {
            verify_against_dummy(password);
            debug!("Login attempt for unknown email");
            return Ok(None);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            debug!(user_id = %user.id, "Login attempt with wrong password");
            Ok(None)
        }
    }

    /// Replaces username and email of `user_id`
    ///
    /// # Errors
    ///
    /// - `Validation` if either field is empty
    /// - `DuplicateUsername` / `DuplicateEmail` if another user holds it
    /// - `NotFound("user")` if the account is gone
    /// - `Storage` if the write fails; nothing is changed in that case
    pub async fn update_profile(&self, user_id: Uuid, username: &str, email: &str) -> Result<User> {
        let username = required(username, "Username")?;
        let email = required(email, "Email")?;

        if let Some(other) = self.users.find_by_username(&username).await? {
            if other.id != user_id {
                return Err(Error::DuplicateUsername);
            }
        }
        if let Some(other) = self.users.find_by_email(&email).await? {
            if other.id != user_id {
                return Err(Error::DuplicateEmail);
            }
        }

        let user = self
            .users
            .update_profile(user_id, &username, &email)
            .await
            .map_err(|e| {
                warn!(user_id = %user_id, error = %e, "Profile update failed");
                e
            })?
            .ok_or(Error::NotFound("user"))?;

        info!(user_id = %user_id, "Profile updated");
        Ok(user)
    }

    /// Replaces the password of `user_id`
    ///
    /// The current password is always re-verified here, whatever the caller
    /// already checked.
    ///
    /// # Errors
    ///
    /// - `WrongCurrentPassword` if `current_password` does not verify
    /// - `PasswordMismatch` if `new_password != confirm_password`
    /// - `Validation` if the new password is empty
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(Error::NotFound("user"))?;

        if !verify_password(current_password, &user.password_hash)? {
            return Err(Error::WrongCurrentPassword);
        }
        if new_password != confirm_password {
            return Err(Error::PasswordMismatch);
        }
        if new_password.trim().is_empty() {
            return Err(Error::validation("New password is required"));
        }

        let password_hash = hash_password(new_password)?;
        if !self.users.update_password_hash(user_id, &password_hash).await? {
            return Err(Error::NotFound("user"));
        }

        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Ensures the well-known admin account exists
    ///
    /// A no-op when any account already uses `email`. Losing a race against a
    /// concurrent bootstrap also counts as already present.
    pub async fn bootstrap_admin(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<BootstrapOutcome> {
        if self.users.find_by_email(email.trim()).await?.is_some() {
            debug!(email, "Bootstrap admin already present");
            return Ok(BootstrapOutcome::AlreadyPresent);
        }

        match self.create_account(username, email, password, true).await {
            Ok(user) => {
                info!(user_id = %user.id, email = %user.email, "Bootstrap admin created");
                Ok(BootstrapOutcome::Created)
            }
            Err(Error::DuplicateEmail) => Ok(BootstrapOutcome::AlreadyPresent),
            Err(e) => Err(e),
        }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Option<User>> {
        self.users.find_by_id(user_id).await
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        self.users.list().await
    }

    /// Users the requester may see: everyone for admins, nobody otherwise
    pub async fn list_visible(&self, identity: &Identity) -> Result<Vec<User>> {
        if decide(&Requester::User(*identity), Action::ListAllUsers).is_allowed() {
            self.users.list().await
        } else {
            Ok(Vec::new())
        }
    }
}
