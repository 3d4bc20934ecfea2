/// Task store
///
/// Task operations on top of a [`TaskRepository`]. Every method that acts
/// for a user takes that user's [`Identity`] explicitly, loads the task,
/// asks [`crate::auth::policy`] and only then touches storage.
///
/// Denials come back as [`Error::Unauthorized`]; whether that is shown to the
/// user or swallowed is the caller's decision.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_shared::store::memory::MemoryStore;
/// use taskboard_shared::tasks::TaskStore;
/// # use taskboard_shared::auth::policy::Identity;
///
/// # async fn example(alice: Identity) -> taskboard_shared::error::Result<()> {
/// let store = Arc::new(MemoryStore::new());
/// let tasks = TaskStore::new(store.clone(), store);
///
/// let task = tasks.create(&alice, "Buy milk", "").await?;
/// let task = tasks.toggle(&alice, task.id).await?;
/// assert!(task.completed);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::policy::{decide, require, Action, Identity, Requester};
use crate::error::{Error, Result};
use crate::models::task::{NewTask, Task, TaskFilter};
use crate::models::user::User;
use crate::store::{TaskRepository, UserRepository};

/// Task operations
#[derive(Clone)]
pub struct TaskStore {
    tasks: Arc<dyn TaskRepository>,
    users: Arc<dyn UserRepository>,
}

/// Outcome of a reassignment, with the new owner for messaging
#[derive(Debug, Clone)]
pub struct Reassigned {
    pub task: Task,
    pub owner: User,
}

fn required_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::validation("Task title is required"));
    }
    Ok(title.to_string())
}

impl TaskStore {
    pub fn new(tasks: Arc<dyn TaskRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { tasks, users }
    }

    /// Creates a task owned by the requester
    ///
    /// # Errors
    ///
    /// `Validation` if the trimmed title is empty.
    pub async fn create(&self, identity: &Identity, title: &str, description: &str) -> Result<Task> {
        require(*identity, Action::CreateTask)?;
        let title = required_title(title)?;

        let task = self
            .tasks
            .create(NewTask {
                title,
                description: description.trim().to_string(),
                user_id: identity.user_id,
            })
            .await?;

        info!(task_id = %task.id, user_id = %identity.user_id, "Task created");
        Ok(task)
    }

    /// Tasks owned by `owner_id`
    pub async fn list_for(&self, owner_id: Uuid) -> Result<Vec<Task>> {
        self.tasks.list(&TaskFilter::owned_by(owner_id)).await
    }

    /// Every task
    pub async fn list_all(&self) -> Result<Vec<Task>> {
        self.tasks.list(&TaskFilter::all()).await
    }

    /// The requester's dashboard: all tasks for admins, own tasks otherwise,
    /// optionally narrowed by a search term
    pub async fn list_visible(&self, identity: &Identity, search: Option<&str>) -> Result<Vec<Task>> {
        let requester = Requester::User(*identity);
        let filter = if decide(&requester, Action::ViewAllTasks).is_allowed() {
            TaskFilter::all()
        } else {
            require(requester, Action::ViewOwnTasks)?;
            TaskFilter::owned_by(identity.user_id)
        };

        self.tasks.list(&filter.with_search(search)).await
    }

    /// Raw lookup without authorization
    pub async fn get(&self, id: Uuid) -> Result<Option<Task>> {
        self.tasks.get(id).await
    }

    async fn load(&self, id: Uuid) -> Result<Task> {
        self.tasks.get(id).await?.ok_or(Error::NotFound("task"))
    }

    /// Loads a task the requester may view
    ///
    /// # Errors
    ///
    /// `NotFound("task")` or `Unauthorized`.
    pub async fn get_for_edit(&self, identity: &Identity, id: Uuid) -> Result<Task> {
        let task = self.load(id).await?;
        require(*identity, Action::ViewTask { owner_id: task.user_id })?;
        Ok(task)
    }

    /// Replaces title and description
    ///
    /// # Errors
    ///
    /// `NotFound("task")`, `Unauthorized`, or `Validation` for an empty title.
    pub async fn update_fields(
        &self,
        identity: &Identity,
        id: Uuid,
        title: &str,
        description: &str,
    ) -> Result<Task> {
        let task = self.load(id).await?;
        self.deny_logged(identity, Action::EditTask { owner_id: task.user_id }, id)?;
        let title = required_title(title)?;

        let task = self
            .tasks
            .update_fields(id, &title, description.trim())
            .await?
            .ok_or(Error::NotFound("task"))?;

        info!(task_id = %id, user_id = %identity.user_id, "Task updated");
        Ok(task)
    }

    /// Flips the completed flag
    pub async fn toggle(&self, identity: &Identity, id: Uuid) -> Result<Task> {
        let task = self.load(id).await?;
        self.deny_logged(identity, Action::ToggleTask { owner_id: task.user_id }, id)?;

        let task = self
            .tasks
            .toggle_completed(id)
            .await?
            .ok_or(Error::NotFound("task"))?;

        info!(task_id = %id, completed = task.completed, "Task toggled");
        Ok(task)
    }

    /// Moves a task to another user (admins only)
    ///
    /// # Errors
    ///
    /// `Unauthorized` for non-admins, `NotFound("task")`, or
    /// `NotFound("user")` when the target user does not exist. The task is
    /// untouched on every error.
    pub async fn reassign(&self, identity: &Identity, id: Uuid, new_owner_id: Uuid) -> Result<Reassigned> {
        self.deny_logged(identity, Action::AssignTask, id)?;
        self.load(id).await?;

        let owner = self
            .users
            .find_by_id(new_owner_id)
            .await?
            .ok_or(Error::NotFound("user"))?;

        let task = self
            .tasks
            .reassign(id, owner.id)
            .await?
            .ok_or(Error::NotFound("task"))?;

        info!(task_id = %id, new_owner = %owner.id, "Task reassigned");
        Ok(Reassigned { task, owner })
    }

    /// Removes a task
    pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<()> {
        let task = self.load(id).await?;
        self.deny_logged(identity, Action::DeleteTask { owner_id: task.user_id }, id)?;

        if !self.tasks.delete(id).await? {
            return Err(Error::NotFound("task"));
        }

        info!(task_id = %id, user_id = %identity.user_id, "Task deleted");
        Ok(())
    }

    fn deny_logged(&self, identity: &Identity, action: Action, task_id: Uuid) -> Result<()> {
        require(*identity, action).map_err(|e| {
            warn!(user_id = %identity.user_id, task_id = %task_id, ?action, "Task action denied");
            e
        })
    }
}
