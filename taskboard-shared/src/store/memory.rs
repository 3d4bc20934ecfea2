/// In-memory repositories
///
/// Users and tasks live behind one `RwLock`, so every write observes and
/// updates both collections atomically. This gives the same guarantees the
/// PostgreSQL schema gives: unique username/email, and no task pointing at a
/// missing user.
///
/// Used by the test suites and for running the server without a database
/// (`DATABASE_URL=memory://`).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{TaskRepository, UserRepository};
use crate::error::{Error, Result};
use crate::models::task::{NewTask, Task, TaskFilter};
use crate::models::user::{NewUser, User};

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    tasks: Vec<Task>,
}

impl State {
    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    /// Uniqueness check against every user except `except`
    fn check_unique(&self, username: &str, email: &str, except: Option<Uuid>) -> Result<()> {
        let others = self.users.iter().filter(|u| Some(u.id) != except);

        for user in others {
            if user.email == email {
                return Err(Error::DuplicateEmail);
            }
            if user.username == username {
                return Err(Error::DuplicateUsername);
            }
        }

        Ok(())
    }

    fn task_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}

/// Shared in-memory store; clones share state
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User> {
        let mut state = self.state.write().await;
        state.check_unique(&user.username, &user.email, None)?;

        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.state.read().await.users.clone())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.state.read().await.users.len() as i64)
    }

    async fn update_profile(&self, id: Uuid, username: &str, email: &str) -> Result<Option<User>> {
        let mut state = self.state.write().await;
        if !state.user_exists(id) {
            return Ok(None);
        }
        state.check_unique(username, email, Some(id))?;

        let user = state.users.iter_mut().find(|u| u.id == id);
        Ok(user.map(|user| {
            user.username = username.to_string();
            user.email = email.to_string();
            user.clone()
        }))
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let mut state = self.state.write().await;

        match state.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn create(&self, task: NewTask) -> Result<Task> {
        let mut state = self.state.write().await;
        if !state.user_exists(task.user_id) {
            return Err(Error::NotFound("user"));
        }

        let task = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            completed: false,
            user_id: task.user_id,
            created_at: Utc::now(),
        };
        state.tasks.push(task.clone());

        Ok(task)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Task>> {
        let state = self.state.read().await;
        Ok(state.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .filter(|t| filter.accepts(t))
            .cloned()
            .collect())
    }

    async fn update_fields(&self, id: Uuid, title: &str, description: &str) -> Result<Option<Task>> {
        let mut state = self.state.write().await;

        Ok(state.task_mut(id).map(|task| {
            task.title = title.to_string();
            task.description = description.to_string();
            task.clone()
        }))
    }

    async fn toggle_completed(&self, id: Uuid) -> Result<Option<Task>> {
        let mut state = self.state.write().await;

        Ok(state.task_mut(id).map(|task| {
            task.completed = !task.completed;
            task.clone()
        }))
    }

    async fn reassign(&self, id: Uuid, new_owner_id: Uuid) -> Result<Option<Task>> {
        let mut state = self.state.write().await;
        if state.task_mut(id).is_none() {
            return Ok(None);
        }
        if !state.user_exists(new_owner_id) {
            return Err(Error::NotFound("user"));
        }

        Ok(state.task_mut(id).map(|task| {
            task.user_id = new_owner_id;
            task.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);

        Ok(state.tasks.len() < before)
    }
}
