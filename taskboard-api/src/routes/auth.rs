/// Registration, login and logout
///
/// # Endpoints
///
/// - `GET  /register` - registration page
/// - `POST /register` - create a regular account, then go to `/login`
/// - `GET  /login?next=` - login page
/// - `POST /login?next=` - start a session, then go to `next` or `/dashboard`
/// - `GET  /logout` - end the session, then go to `/`
///
/// Form submissions always answer `303 See Other`; failures carry a danger
/// notice back to the form page.

use crate::{
    app::AppState,
    error::{first_validation_message, user_message},
    flash::{Flash, Notice, SeeOther},
    middleware::session::{clear_session_cookie, session_cookie},
    page::Page,
    redirect::{safe_target, DEFAULT_TARGET},
};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension, Form,
};
use serde::Deserialize;
use serde_json::json;
use taskboard_shared::{auth::policy::Requester, Error};
use tracing::{info, warn};
use validator::Validate;

/// Registration form
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "All fields are required"))]
    pub username: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "All fields are required"))]
    pub password: String,
}

impl RegisterForm {
    fn trimmed(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
        }
    }
}

/// Login form
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// `?next=` on the login page and form
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

fn login_page_url(next: Option<&str>) -> String {
    match safe_target(next) {
        Some(target) => format!("/login?next={}", urlencoding::encode(&target)),
        None => "/login".to_string(),
    }
}

pub async fn register_page(Extension(requester): Extension<Requester>, flash: Flash) -> Response {
    if let Requester::User(_) = requester {
        return SeeOther::to(DEFAULT_TARGET).into_response();
    }

    Page::new("register", flash).into_response()
}

/// Creates a regular account
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> SeeOther {
    let form = form.trimmed();

    // Empty fields first, so a blank email reads "All fields are required"
    if form.username.is_empty() || form.email.is_empty() || form.password.is_empty() {
        return SeeOther::to("/register").with_notice(Notice::danger("All fields are required"));
    }
    if let Err(errors) = form.validate() {
        return SeeOther::to("/register")
            .with_notice(Notice::danger(first_validation_message(&errors)));
    }

    match state
        .credentials
        .register(&form.username, &form.email, &form.password)
        .await
    {
        Ok(_) => SeeOther::to("/login")
            .with_notice(Notice::success("Registration successful, you can now log in")),
        Err(e) => SeeOther::to("/register").with_notice(Notice::danger(user_message(&e))),
    }
}

pub async fn login_page(
    Extension(requester): Extension<Requester>,
    Query(query): Query<NextQuery>,
    flash: Flash,
) -> Response {
    if let Requester::User(_) = requester {
        return SeeOther::to(DEFAULT_TARGET).into_response();
    }

    Page::new("login", flash)
        .with(json!({ "next": safe_target(query.next.as_deref()) }))
        .into_response()
}

/// Starts a session
///
/// Redirects to `next` only when it is a same-origin path.
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> SeeOther {
    let retry = || SeeOther::to(login_page_url(query.next.as_deref()));

    if let Err(errors) = form.validate() {
        return retry().with_notice(Notice::danger(first_validation_message(&errors)));
    }

    let user = match state
        .credentials
        .authenticate(form.email.trim(), &form.password)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("Failed login attempt");
            return retry().with_notice(Notice::danger("Invalid credentials"));
        }
        Err(e) => return retry().with_notice(Notice::danger(user_message(&e))),
    };

    let token = match state.sessions.issue(user.id) {
        Ok(token) => token,
        Err(e) => return retry().with_notice(Notice::danger(user_message(&Error::from(e)))),
    };

    info!(user_id = %user.id, "User logged in");

    let target = safe_target(query.next.as_deref()).unwrap_or_else(|| DEFAULT_TARGET.to_string());
    SeeOther::to(target).with_cookie(session_cookie(
        token,
        state.sessions.ttl().num_seconds(),
        state.secure_cookies(),
    ))
}

/// Ends the session
pub async fn logout() -> SeeOther {
    SeeOther::to("/").with_cookie(clear_session_cookie())
}
