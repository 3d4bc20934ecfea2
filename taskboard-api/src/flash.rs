/// Flash notices and redirect responses
///
/// A form handler answers `303 See Other` and leaves a [`Notice`] in the
/// `taskboard_flash` cookie. The next page read takes it with the [`Flash`]
/// extractor and removes the cookie when rendering.
///
/// Cookie values are percent-encoded (`cookie` crate, `percent-encode`
/// feature) so the JSON payload survives header transport.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// Name of the notice cookie
pub const FLASH_COOKIE: &str = "taskboard_flash";

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Danger,
}

/// A one-shot message for the next page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: Level::Danger,
            message: message.into(),
        }
    }

    /// Cookie carrying this notice
    ///
    /// Returns `None` if the notice cannot be serialized.
    pub fn to_cookie(&self) -> Option<Cookie<'static>> {
        let payload = serde_json::to_string(self).ok()?;

        Some(
            Cookie::build((FLASH_COOKIE, payload))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .build(),
        )
    }
}

/// Reads a cookie value from the request headers, percent-decoded
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse_encoded)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// A cookie that deletes `name` on the client
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, "")).path("/").build();
    cookie.make_removal();
    cookie
}

/// Appends `Set-Cookie` headers to a response
pub fn append_cookies(response: &mut Response, cookies: &[Cookie<'static>]) {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.encoded().to_string()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(cookie = cookie.name(), error = %e, "Dropped unencodable cookie"),
        }
    }
}

/// The pending notice, if any
///
/// Malformed notice cookies are ignored.
#[derive(Debug, Clone, Default)]
pub struct Flash(pub Option<Notice>);

#[async_trait]
impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let notice = read_cookie(&parts.headers, FLASH_COOKIE)
            .and_then(|raw| serde_json::from_str::<Notice>(&raw).ok());

        Ok(Flash(notice))
    }
}

/// `303 See Other` with optional cookies
#[derive(Debug)]
pub struct SeeOther {
    location: String,
    cookies: Vec<Cookie<'static>>,
}

impl SeeOther {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            cookies: Vec::new(),
        }
    }

    /// Leaves `notice` for the next page
    pub fn with_notice(mut self, notice: Notice) -> Self {
        if let Some(cookie) = notice.to_cookie() {
            self.cookies.push(cookie);
        }
        self
    }

    pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookies.push(cookie);
        self
    }
}

impl IntoResponse for SeeOther {
    fn into_response(self) -> Response {
        let location = HeaderValue::from_str(&self.location).unwrap_or_else(|_| {
            tracing::warn!(location = %self.location, "Invalid redirect target, using /");
            HeaderValue::from_static("/")
        });

        let mut response = (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response();
        append_cookies(&mut response, &self.cookies);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn cookie_header(response: &Response) -> String {
        response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_see_other_sets_location_and_notice() {
        let response = SeeOther::to("/dashboard")
            .with_notice(Notice::success("Task added"))
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/dashboard");

        let set_cookie = cookie_header(&response);
        assert!(set_cookie.starts_with("taskboard_flash="));
        assert!(set_cookie.contains("HttpOnly"));
        // The JSON braces and quotes are percent-encoded
        assert!(!set_cookie.contains('{'));
    }

    #[tokio::test]
    async fn test_flash_round_trips_through_headers() {
        let response = SeeOther::to("/")
            .with_notice(Notice::danger("Invalid credentials; try again"))
            .into_response();
        let set_cookie = cookie_header(&response);
        let pair = set_cookie.split(';').next().unwrap().to_string();

        let request = Request::builder()
            .header(header::COOKIE, format!("other=1; {}", pair))
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let Flash(notice) = Flash::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(notice, Some(Notice::danger("Invalid credentials; try again")));
    }

    #[tokio::test]
    async fn test_malformed_flash_is_ignored() {
        let request = Request::builder()
            .header(header::COOKIE, "taskboard_flash=not-json")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let Flash(notice) = Flash::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(notice.is_none());
    }

    #[test]
    fn test_removal_cookie_expires() {
        let cookie = removal_cookie(FLASH_COOKIE);

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::ZERO));
    }

    #[test]
    fn test_invalid_location_falls_back_to_root() {
        let response = SeeOther::to("/bad\nheader").into_response();
        assert_eq!(response.headers()[header::LOCATION], "/");
    }
}
