/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`session`]: signed session tokens and identity resolution
/// - [`policy`]: pure allow/deny decisions over users and tasks
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::password::{hash_password, verify_password};
/// use taskboard_shared::auth::policy::{require, Action, Identity};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let admin = Identity { user_id: Uuid::new_v4(), is_admin: true };
/// require(admin, Action::AssignTask)?;
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod policy;
pub mod session;
