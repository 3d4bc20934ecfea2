//! Common test utilities for router tests
//!
//! - An app over the in-memory store, no database needed
//! - A cookie-keeping client per simulated browser
//! - Helpers for registering, logging in and reading notices

#![allow(dead_code)]

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    async_trait,
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use cookie::Cookie;
use serde_json::Value;
use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskboard_shared::{
    models::{
        task::{NewTask, Task, TaskFilter},
        user::{NewUser, User},
    },
    store::{memory::MemoryStore, TaskRepository, UserRepository},
    Error, Result,
};
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "william.padilla@uniminuto.edu.co";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Router and the state behind it
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::in_memory(Config::for_tests());
        let app = build_router(state.clone());
        Self { app, state }
    }

    /// Router over a caller-supplied store
    pub fn with_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + TaskRepository + 'static,
    {
        let state = AppState::new(store, Config::for_tests());
        let app = build_router(state.clone());
        Self { app, state }
    }

    /// Same as `new`, with the bootstrap admin in place
    pub async fn with_admin() -> Self {
        let app = Self::new();
        app.state
            .credentials
            .bootstrap_admin(ADMIN_EMAIL, "admin", ADMIN_PASSWORD)
            .await
            .expect("Failed to bootstrap admin");
        app
    }

    /// A fresh browser with an empty cookie jar
    pub fn client(&self) -> Client {
        Client {
            app: self.app.clone(),
            jar: BTreeMap::new(),
        }
    }
}

/// In-memory store whose profile writes and liveness pings fail with a
/// storage error; everything else works
pub struct FailingStore {
    inner: MemoryStore,
    pub reason: String,
}

impl FailingStore {
    pub fn new(reason: &str) -> Self {
        Self {
            inner: MemoryStore::new(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl UserRepository for FailingStore {
    async fn insert(&self, user: NewUser) -> Result<User> {
        self.inner.insert(user).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.inner.find_by_username(username).await
    }

    async fn list(&self) -> Result<Vec<User>> {
        UserRepository::list(&self.inner).await
    }

    async fn count(&self) -> Result<i64> {
        self.inner.count().await
    }

    async fn update_profile(&self, _id: Uuid, _username: &str, _email: &str) -> Result<Option<User>> {
        Err(Error::Storage(self.reason.clone()))
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        self.inner.update_password_hash(id, password_hash).await
    }

    async fn ping(&self) -> Result<()> {
        Err(Error::Storage(self.reason.clone()))
    }
}

#[async_trait]
impl TaskRepository for FailingStore {
    async fn create(&self, task: NewTask) -> Result<Task> {
        self.inner.create(task).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Task>> {
        self.inner.get(id).await
    }

    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        TaskRepository::list(&self.inner, filter).await
    }

    async fn update_fields(&self, id: Uuid, title: &str, description: &str) -> Result<Option<Task>> {
        self.inner.update_fields(id, title, description).await
    }

    async fn toggle_completed(&self, id: Uuid) -> Result<Option<Task>> {
        self.inner.toggle_completed(id).await
    }

    async fn reassign(&self, id: Uuid, new_owner_id: Uuid) -> Result<Option<Task>> {
        self.inner.reassign(id, new_owner_id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        self.inner.delete(id).await
    }
}

/// Status, redirect target and JSON body of a response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookies: Vec<String>,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn assert_redirect(&self, to: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(to));
    }

    pub fn notice_message(&self) -> Option<&str> {
        self.body["notice"]["message"].as_str()
    }

    pub fn notice_level(&self) -> Option<&str> {
        self.body["notice"]["level"].as_str()
    }
}

/// A browser: sends requests through the router and keeps cookies
pub struct Client {
    app: Router,
    jar: BTreeMap<String, String>,
}

impl Client {
    pub fn has_cookie(&self, name: &str) -> bool {
        self.jar.contains_key(name)
    }

    fn cookie_header(&self) -> Option<String> {
        if self.jar.is_empty() {
            return None;
        }

        let pairs: Vec<String> = self
            .jar
            .iter()
            .map(|(name, value)| Cookie::new(name.clone(), value.clone()).encoded().to_string())
            .collect();
        Some(pairs.join("; "))
    }

    async fn send(&mut self, method: Method, uri: &str, form: Option<&[(&str, &str)]>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookies) = self.cookie_header() {
            builder = builder.header(header::COOKIE, cookies);
        }

        let body = match form {
            Some(fields) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(encode_form(fields))
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let location = headers
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let set_cookies: Vec<String> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();

        for raw in &set_cookies {
            let cookie = Cookie::parse_encoded(raw.clone()).unwrap();
            let expired = cookie.max_age() == Some(cookie::time::Duration::ZERO);
            if expired || cookie.value().is_empty() {
                self.jar.remove(cookie.name());
            } else {
                self.jar.insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            location,
            set_cookies,
            headers,
            body,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        self.send(Method::POST, uri, Some(form)).await
    }

    /// Follows a redirect with a GET
    pub async fn follow(&mut self, response: &TestResponse) -> TestResponse {
        let location = response
            .location
            .clone()
            .unwrap_or_else(|| panic!("Not a redirect: {:?}", response.status));
        self.get(&location).await
    }

    pub async fn register(&mut self, username: &str, email: &str, password: &str) -> TestResponse {
        self.post(
            "/register",
            &[("username", username), ("email", email), ("password", password)],
        )
        .await
    }

    /// Logs in and opens the dashboard, consuming any pending notice
    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        let response = self
            .post("/login", &[("email", email), ("password", password)])
            .await;
        response.assert_redirect("/dashboard");
        self.follow(&response).await
    }

    /// Registers, then logs in
    pub async fn sign_up(&mut self, username: &str) -> TestResponse {
        let email = format!("{}@example.com", username);
        let password = format!("{}-password", username);

        self.register(username, &email, &password)
            .await
            .assert_redirect("/login");
        self.login(&email, &password).await
    }

    /// Tasks on the dashboard
    pub async fn dashboard_tasks(&mut self) -> Vec<Value> {
        let page = self.get("/dashboard").await;
        assert_eq!(page.status, StatusCode::OK, "body: {}", page.body);
        page.body["tasks"].as_array().cloned().unwrap_or_default()
    }
}

pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
