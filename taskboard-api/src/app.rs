/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::in_memory(config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        security::security_headers,
        session::{require_login, resolve_session},
    },
};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use taskboard_shared::{
    auth::session::SessionManager,
    credentials::CredentialStore,
    store::{memory::MemoryStore, TaskRepository, UserRepository},
    tasks::TaskStore,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// Built once in `main` and cloned into each handler via `State`. Every
/// field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialStore,
    pub tasks: TaskStore,
    pub sessions: SessionManager,
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates state over a store that holds both users and tasks
    pub fn new<S>(store: Arc<S>, config: Config) -> Self
    where
        S: UserRepository + TaskRepository + 'static,
    {
        let sessions = SessionManager::new(
            &config.session.secret,
            chrono::Duration::hours(config.session.ttl_hours),
        );

        Self {
            credentials: CredentialStore::new(store.clone()),
            tasks: TaskStore::new(store.clone(), store),
            sessions,
            config: Arc::new(config),
        }
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory(config: Config) -> Self {
        Self::new(Arc::new(MemoryStore::new()), config)
    }

    /// Whether cookies should carry `Secure`
    pub fn secure_cookies(&self) -> bool {
        self.config.api.production
    }
}

/// Builds the complete router with all routes and middleware
///
/// # Routes
///
/// ```text
/// public
///   GET       /                     index, or redirect to /dashboard
///   GET, POST /register
///   GET, POST /login
///   GET       /health
/// authenticated (anonymous → 303 /login?next=...)
///   GET       /logout
///   GET       /dashboard?search=
///   POST      /add_task
///   GET       /toggle_task/:id
///   GET       /delete_task/:id
///   POST      /assign_task/:id
///   GET, POST /edit_task/:id
///   GET       /users
///   GET, POST /profile
///   POST      /change_password
/// anything else → 404 page
/// ```
///
/// # Middleware Stack
///
/// Outermost first: security headers, request tracing, session resolution,
/// then the login requirement on the authenticated routes only.
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{auth, health, pages, profile, tasks};

    let public_routes = Router::new()
        .route("/", get(pages::index))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/health", get(health::health_check));

    let authenticated_routes = Router::new()
        .route("/logout", get(auth::logout))
        .route("/dashboard", get(pages::dashboard))
        .route("/users", get(pages::users))
        .route("/add_task", post(tasks::add_task))
        .route("/toggle_task/:id", get(tasks::toggle_task))
        .route("/delete_task/:id", get(tasks::delete_task))
        .route("/assign_task/:id", post(tasks::assign_task))
        .route("/edit_task/:id", get(tasks::edit_task_page).post(tasks::edit_task))
        .route("/profile", get(profile::profile_page).post(profile::update_profile))
        .route("/change_password", post(profile::change_password))
        .route_layer(from_fn(require_login));

    let production = state.config.api.production;

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .fallback(pages::not_found)
        .layer(from_fn_with_state(state.clone(), resolve_session))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(from_fn_with_state(production, security_headers))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_shares_one_store() {
        let state = AppState::in_memory(Config::for_tests());
        let cloned = state.clone();

        assert!(Arc::ptr_eq(&state.config, &cloned.config));
        assert!(!state.secure_cookies());
    }
}
