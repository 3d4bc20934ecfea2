/// Repository abstractions
///
/// Each entity gets a repository trait. Business rules (validation, hashing,
/// authorization) sit above these traits in [`crate::credentials`] and
/// [`crate::tasks`], so they can be exercised against [`memory::MemoryStore`]
/// without a live database.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: sqlx over PostgreSQL, uniqueness and referential
///   integrity enforced by constraints
/// - [`memory::MemoryStore`]: a single write-locked map pair, same guarantees
///
/// Both types implement both traits, so one instance can back the whole
/// application.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::task::{NewTask, Task, TaskFilter};
use crate::models::user::{NewUser, User};

pub mod memory;
pub mod postgres;

/// Persistence for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateEmail`](crate::error::Error::DuplicateEmail) or
    /// [`Error::DuplicateUsername`](crate::error::Error::DuplicateUsername)
    /// when either is taken. Enforced atomically by the store.
    async fn insert(&self, user: NewUser) -> Result<User>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// All users, oldest first
    async fn list(&self) -> Result<Vec<User>>;

    async fn count(&self) -> Result<i64>;

    /// Replaces username and email
    ///
    /// Returns `None` if the user does not exist. Collisions with another
    /// user fail with the matching duplicate error and leave the row as is.
    async fn update_profile(&self, id: Uuid, username: &str, email: &str) -> Result<Option<User>>;

    /// Replaces the stored password hash; `false` if the user does not exist
    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool>;

    /// Cheap liveness probe
    async fn ping(&self) -> Result<()>;
}

/// Persistence for tasks
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a task
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::error::Error::NotFound)`("user")` if the
    /// owner does not exist.
    async fn create(&self, task: NewTask) -> Result<Task>;

    async fn get(&self, id: Uuid) -> Result<Option<Task>>;

    /// Tasks matching `filter`, oldest first
    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// Replaces title and description; `None` if the task does not exist
    async fn update_fields(&self, id: Uuid, title: &str, description: &str) -> Result<Option<Task>>;

    /// Flips `completed`; `None` if the task does not exist
    async fn toggle_completed(&self, id: Uuid) -> Result<Option<Task>>;

    /// Moves the task to `new_owner_id`
    ///
    /// Returns `None` if the task does not exist.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::error::Error::NotFound)`("user")` if the
    /// new owner does not exist; the task is left unchanged.
    async fn reassign(&self, id: Uuid, new_owner_id: Uuid) -> Result<Option<Task>>;

    /// Removes the task; `false` if it did not exist
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
