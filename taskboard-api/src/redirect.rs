/// Post-login redirect targets
///
/// `next` comes from the query string, so only same-origin paths are
/// followed. Anything else falls back to the dashboard.

use axum::http::Uri;
use url::Url;

/// Where a successful login lands when `next` is absent or rejected
pub const DEFAULT_TARGET: &str = "/dashboard";

// Stand-in origin for resolving relative targets
const PROBE_ORIGIN: &str = "http://taskboard.invalid/";

/// Returns `next` if it stays on this origin
///
/// Accepts absolute paths only. Rejects absolute URLs, scheme-relative
/// `//host` forms, backslashes (browsers treat `/\host` as `//host`) and
/// control characters.
pub fn safe_target(next: Option<&str>) -> Option<String> {
    let next = next?.trim();

    if !next.starts_with('/') || next.starts_with("//") {
        return None;
    }
    if next.contains('\\') || next.chars().any(char::is_control) {
        return None;
    }

    let base = Url::parse(PROBE_ORIGIN).ok()?;
    let resolved = base.join(next).ok()?;
    if resolved.origin() != base.origin() {
        return None;
    }

    Some(next.to_string())
}

/// Login page URL that returns to `uri` afterwards
pub fn login_url(uri: &Uri) -> String {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    format!("/login?next={}", urlencoding::encode(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_local_paths() {
        assert_eq!(safe_target(Some("/dashboard")), Some("/dashboard".to_string()));
        assert_eq!(
            safe_target(Some("/dashboard?search=milk")),
            Some("/dashboard?search=milk".to_string())
        );
        assert_eq!(safe_target(Some("/edit_task/3")), Some("/edit_task/3".to_string()));
    }

    #[test]
    fn test_rejects_foreign_targets() {
        assert_eq!(safe_target(Some("http://evil.com")), None);
        assert_eq!(safe_target(Some("https://evil.com/dashboard")), None);
        assert_eq!(safe_target(Some("//evil.com")), None);
        assert_eq!(safe_target(Some("/\\evil.com")), None);
        assert_eq!(safe_target(Some("javascript:alert(1)")), None);
        assert_eq!(safe_target(Some("dashboard")), None);
        assert_eq!(safe_target(Some("/a\r\nSet-Cookie: x=1")), None);
    }

    #[test]
    fn test_missing_or_blank() {
        assert_eq!(safe_target(None), None);
        assert_eq!(safe_target(Some("")), None);
        assert_eq!(safe_target(Some("   ")), None);
    }

    #[test]
    fn test_login_url_encodes_path_and_query() {
        let uri: Uri = "/dashboard?search=milk".parse().unwrap();
        assert_eq!(login_url(&uri), "/login?next=%2Fdashboard%3Fsearch%3Dmilk");

        let uri: Uri = "/users".parse().unwrap();
        assert_eq!(login_url(&uri), "/login?next=%2Fusers");
    }
}
