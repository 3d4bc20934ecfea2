/// JSON view-models for page reads
///
/// Every page answers `{"page": <name>, "notice": <notice or null>, ...}`.
/// Rendering a page consumes the pending flash notice.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};

use crate::flash::{append_cookies, removal_cookie, Flash, Notice, FLASH_COOKIE};

/// A rendered page
#[derive(Debug)]
pub struct Page {
    name: &'static str,
    status: StatusCode,
    notice: Option<Notice>,
    data: Map<String, Value>,
}

impl Page {
    pub fn new(name: &'static str, flash: Flash) -> Self {
        Self {
            name,
            status: StatusCode::OK,
            notice: flash.0,
            data: Map::new(),
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Adds the fields of a JSON object to the page
    ///
    /// Non-object values are ignored; `page` and `notice` cannot be
    /// overridden.
    pub fn with(mut self, data: Value) -> Self {
        if let Value::Object(fields) = data {
            self.data.extend(fields);
        }
        self
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        let consumed = self.notice.is_some();

        let mut body = self.data;
        body.insert("page".to_string(), Value::from(self.name));
        body.insert(
            "notice".to_string(),
            serde_json::to_value(&self.notice).unwrap_or(Value::Null),
        );

        let mut response = (self.status, Json(Value::Object(body))).into_response();
        if consumed {
            append_cookies(&mut response, &[removal_cookie(FLASH_COOKIE)]);
        }
        response
    }
}
