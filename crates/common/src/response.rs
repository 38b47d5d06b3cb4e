//! Transport responses and the shared status/body mapping.

use bytes::Bytes;
use error_stack::{Report, ResultExt};
use http::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::ConnectError;

const SUCCESS_RANGE: std::ops::RangeInclusive<u16> = 200..=299;

#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    #[must_use]
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// True for statuses 200 through 299 inclusive.
    #[must_use]
    pub fn is_success(&self) -> bool {
        SUCCESS_RANGE.contains(&self.status)
    }

    /// Passes a 2xx response through and turns anything else into a server error.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::ServerError`] carrying the status and raw body.
    pub fn ensure_success(self) -> Result<Self, Report<ConnectError>> {
        if self.is_success() {
            return Ok(self);
        }

        log::warn!(
            "Request rejected with status {} ({} byte body)",
            self.status,
            self.body.len()
        );
        Err(Report::new(ConnectError::ServerError {
            status: self.status,
            body: self.body_text(),
        }))
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::MalformedResponse`] if the body is not the expected JSON shape.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Report<ConnectError>> {
        serde_json::from_slice(&self.body).change_context(ConnectError::MalformedResponse {
            message: format!(
                "Expected JSON body of type {}",
                std::any::type_name::<T>()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn response(status: u16, body: &'static str) -> Response {
        Response::new(status, HeaderMap::new(), body)
    }

    #[test]
    fn test_status_classification_boundaries() {
        assert!(!response(199, "").is_success());
        assert!(response(200, "").is_success());
        assert!(response(299, "").is_success());
        assert!(!response(300, "").is_success());
        assert!(!response(404, "").is_success());
    }

    #[test]
    fn test_ensure_success_carries_status_and_body() {
        let err = response(503, "{\"error\":\"down\"}")
            .ensure_success()
            .expect_err("should reject 503");

        match err.current_context() {
            ConnectError::ServerError { status, body } => {
                assert_eq!(*status, 503);
                assert_eq!(body, "{\"error\":\"down\"}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_ensure_success_passes_through() {
        let ok = response(204, "").ensure_success().expect("should accept 204");
        assert_eq!(ok.status(), 204);
    }

    #[test]
    fn test_json_parses_expected_shape() {
        #[derive(Deserialize)]
        struct Token {
            token: String,
        }

        let token: Token = response(200, "{\"token\":\"abc\"}")
            .json()
            .expect("should parse JSON");
        assert_eq!(token.token, "abc");
    }

    #[test]
    fn test_json_malformed_body() {
        let err = response(200, "<html>")
            .json::<serde_json::Value>()
            .expect_err("should reject non-JSON");
        assert!(matches!(
            err.current_context(),
            ConnectError::MalformedResponse { .. }
        ));
    }
}
