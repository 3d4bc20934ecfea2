/// Session resolution and the login requirement
///
/// [`resolve_session`] wraps the whole router: it reads the session cookie,
/// resolves it to an [`Identity`] and stores a [`Requester`] in the request
/// extensions. [`require_login`] is layered on the authenticated sub-router;
/// anonymous requests there are sent to the login page with a `next`
/// parameter, and authenticated ones get a [`CurrentUser`] extension.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use cookie::{Cookie, SameSite};
use taskboard_shared::auth::policy::{Identity, Requester};
use tracing::warn;

use crate::{
    app::AppState,
    error::ApiError,
    flash::{read_cookie, removal_cookie, SeeOther},
    redirect::login_url,
};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "taskboard_session";

/// The authenticated requester, present on every authenticated route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Identity);

/// Session cookie holding `token`
///
/// `Secure` is set when serving over HTTPS.
pub fn session_cookie(token: String, max_age_seconds: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(max_age_seconds))
        .build()
}

/// Cookie that ends the session on the client
pub fn clear_session_cookie() -> Cookie<'static> {
    removal_cookie(SESSION_COOKIE)
}

/// Resolves the session cookie into a [`Requester`] extension
///
/// A missing, invalid or expired token, or one naming a deleted user, makes
/// the request anonymous. A storage failure while loading the user aborts
/// the request with 500.
pub async fn resolve_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let requester = match read_cookie(req.headers(), SESSION_COOKIE) {
        Some(token) => match state
            .sessions
            .resolve(&token, state.credentials.repository())
            .await
        {
            Ok(identity) => Requester::from(identity),
            Err(e) => {
                warn!(error = %e, "Session lookup failed");
                return ApiError::from(e).into_response();
            }
        },
        None => Requester::Anonymous,
    };

    req.extensions_mut().insert(requester);
    next.run(req).await
}

/// Redirects anonymous requests to `/login?next=<path and query>`
pub async fn require_login(mut req: Request, next: Next) -> Response {
    match req.extensions().get::<Requester>().copied() {
        Some(Requester::User(identity)) => {
            req.extensions_mut().insert(CurrentUser(identity));
            next.run(req).await
        }
        _ => SeeOther::to(login_url(req.uri())).into_response(),
    }
}
