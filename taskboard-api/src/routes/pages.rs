/// Read-only pages
///
/// - `GET /` - landing page, or the dashboard when signed in
/// - `GET /dashboard?search=` - visible tasks, plus every user for admins
/// - `GET /users` - every user for admins, an empty list otherwise
/// - fallback - 404 page

use crate::{
    app::AppState,
    error::ApiResult,
    flash::{Flash, SeeOther},
    middleware::session::CurrentUser,
    page::Page,
    redirect::DEFAULT_TARGET,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Deserialize;
use serde_json::json;
use taskboard_shared::{auth::policy::Requester, models::user::UserSummary};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub search: Option<String>,
}

pub async fn index(Extension(requester): Extension<Requester>, flash: Flash) -> Response {
    match requester {
        Requester::User(_) => SeeOther::to(DEFAULT_TARGET).into_response(),
        Requester::Anonymous => Page::new("index", flash).into_response(),
    }
}

/// Tasks visible to the requester
///
/// Admins see every task and get the user list for the assignment form.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(CurrentUser(identity)): Extension<CurrentUser>,
    Query(query): Query<DashboardQuery>,
    flash: Flash,
) -> ApiResult<Page> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty());

    let tasks = state.tasks.list_visible(&identity, search).await?;
    let users: Vec<UserSummary> = state
        .credentials
        .list_visible(&identity)
        .await?
        .iter()
        .map(UserSummary::from)
        .collect();

    Ok(Page::new("dashboard", flash).with(json!({
        "tasks": tasks,
        "users": users,
        "search": search.unwrap_or_default(),
        "is_admin": identity.is_admin,
    })))
}

pub async fn users(
    State(state): State<AppState>,
    Extension(CurrentUser(identity)): Extension<CurrentUser>,
    flash: Flash,
) -> ApiResult<Page> {
    let users: Vec<UserSummary> = state
        .credentials
        .list_visible(&identity)
        .await?
        .iter()
        .map(UserSummary::from)
        .collect();

    Ok(Page::new("users", flash).with(json!({ "users": users })))
}

pub async fn not_found(flash: Flash) -> Page {
    Page::new("not_found", flash).status(StatusCode::NOT_FOUND)
}
