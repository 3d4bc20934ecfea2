/// Task mutations and the edit page
///
/// # Endpoints
///
/// - `POST /add_task` - create a task owned by the requester
/// - `GET  /toggle_task/:id` - flip completed (owner or admin)
/// - `GET  /delete_task/:id` - delete (owner or admin)
/// - `POST /assign_task/:id` - move to another user (admin)
/// - `GET  /edit_task/:id` - edit page (owner or admin)
/// - `POST /edit_task/:id` - apply edits (owner or admin)
///
/// Every mutation ends on the dashboard. Toggle, delete and edit on a task
/// the requester may not touch, or that does not exist, change nothing and
/// redirect without a notice; the denial is logged by the task store.

use crate::{
    app::AppState,
    error::user_message,
    flash::{Flash, Notice, SeeOther},
    middleware::session::CurrentUser,
    page::Page,
    redirect::DEFAULT_TARGET,
};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Extension, Form,
};
use serde::Deserialize;
use serde_json::json;
use taskboard_shared::Error;
use tracing::debug;
use uuid::Uuid;

/// Title and description, for both create and edit
#[derive(Debug, Default, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,
}

/// Target of a reassignment
#[derive(Debug, Default, Deserialize)]
pub struct AssignForm {
    #[serde(default)]
    pub user_id: String,
}

fn dashboard() -> SeeOther {
    SeeOther::to(DEFAULT_TARGET)
}

/// Outcome of toggle, delete and edit
fn settle<T>(result: Result<T, Error>, task_id: &str, success: &str) -> SeeOther {
    match result {
        Ok(_) => dashboard().with_notice(Notice::success(success)),
        Err(Error::Unauthorized) | Err(Error::NotFound(_)) => {
            debug!(task_id, "Task mutation ignored");
            dashboard()
        }
        Err(e) => dashboard().with_notice(Notice::danger(user_message(&e))),
    }
}

fn parse_id(raw: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(raw).map_err(|_| Error::NotFound("task"))
}

pub async fn add_task(
    State(state): State<AppState>,
    Extension(CurrentUser(identity)): Extension<CurrentUser>,
    Form(form): Form<TaskForm>,
) -> SeeOther {
    match state
        .tasks
        .create(&identity, &form.title, &form.description)
        .await
    {
        Ok(_) => dashboard().with_notice(Notice::success("Task added")),
        Err(e) => dashboard().with_notice(Notice::danger(user_message(&e))),
    }
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Extension(CurrentUser(identity)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> SeeOther {
    let result = match parse_id(&id) {
        Ok(task_id) => state.tasks.toggle(&identity, task_id).await,
        Err(e) => Err(e),
    };

    settle(result, &id, "Task status updated")
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(CurrentUser(identity)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> SeeOther {
    let result = match parse_id(&id) {
        Ok(task_id) => state.tasks.delete(&identity, task_id).await,
        Err(e) => Err(e),
    };

    settle(result, &id, "Task deleted")
}

/// Reassigns a task (admins only)
pub async fn assign_task(
    State(state): State<AppState>,
    Extension(CurrentUser(identity)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Form(form): Form<AssignForm>,
) -> SeeOther {
    if !identity.is_admin {
        return dashboard()
            .with_notice(Notice::danger("You do not have permission to assign tasks"));
    }

    let task_id = match parse_id(&id) {
        Ok(task_id) => task_id,
        Err(_) => return dashboard().with_notice(Notice::danger("Task not found")),
    };
    let Ok(new_owner) = Uuid::parse_str(form.user_id.trim()) else {
        return dashboard().with_notice(Notice::danger("User not found"));
    };

    match state.tasks.reassign(&identity, task_id, new_owner).await {
        Ok(moved) => dashboard().with_notice(Notice::success(format!(
            "Task '{}' assigned to {}",
            moved.task.title, moved.owner.username
        ))),
        Err(Error::Unauthorized) => {
            dashboard().with_notice(Notice::danger("You do not have permission to assign tasks"))
        }
        Err(e) => dashboard().with_notice(Notice::danger(user_message(&e))),
    }
}

/// Edit page for a task the requester may view
pub async fn edit_task_page(
    State(state): State<AppState>,
    Extension(CurrentUser(identity)): Extension<CurrentUser>,
    Path(id): Path<String>,
    flash: Flash,
) -> Response {
    let result = match parse_id(&id) {
        Ok(task_id) => state.tasks.get_for_edit(&identity, task_id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(task) => Page::new("edit_task", flash)
            .with(json!({ "task": task }))
            .into_response(),
        Err(Error::Unauthorized) | Err(Error::NotFound(_)) => dashboard()
            .with_notice(Notice::danger("You do not have permission to edit this task"))
            .into_response(),
        Err(e) => dashboard()
            .with_notice(Notice::danger(user_message(&e)))
            .into_response(),
    }
}

pub async fn edit_task(
    State(state): State<AppState>,
    Extension(CurrentUser(identity)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Form(form): Form<TaskForm>,
) -> SeeOther {
    let result = match parse_id(&id) {
        Ok(task_id) => {
            state
                .tasks
                .update_fields(&identity, task_id, &form.title, &form.description)
                .await
        }
        Err(e) => Err(e),
    };

    settle(result, &id, "Task updated")
}
