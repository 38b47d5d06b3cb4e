//! Outbound request model.
//!
//! A [`RequestBuilder`] collects the request intent and freezes it into an
//! [`AuthenticatedRequest`]. The authenticator turns that into a
//! [`SignedRequest`], a plain method/url/headers/body value that any
//! transport can send.

use std::collections::BTreeMap;

use bytes::Bytes;
use error_stack::{Report, ResultExt};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use url::form_urlencoded;
use url::Url;

use crate::constants::{QUERY_NONCE, QUERY_TIMESTAMP};
use crate::error::ConnectError;
use crate::payload::Payload;
use crate::request_signing::{Nonce, Timestamp};

#[derive(Debug, Default)]
pub struct RequestBuilder {
    base_url: Option<String>,
    endpoint: Option<String>,
    method: Option<Method>,
    query: BTreeMap<String, String>,
    headers: Vec<(String, String)>,
    payload: Option<Payload>,
    nonce: Option<Nonce>,
    timestamp: Option<Timestamp>,
    sdk_identifier: Option<String>,
    sdk_version: Option<String>,
}

impl RequestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Path relative to the base URL, e.g. `/profile/abc`.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    #[must_use]
    pub fn with_get(self) -> Self {
        self.with_method(Method::GET)
    }

    #[must_use]
    pub fn with_post(self) -> Self {
        self.with_method(Method::POST)
    }

    #[must_use]
    pub fn with_delete(self) -> Self {
        self.with_method(Method::DELETE)
    }

    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Adds a header. A later header with the same name replaces an earlier one.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Pins the nonce instead of generating one at signing time.
    #[must_use]
    pub fn with_nonce(mut self, nonce: impl Into<Nonce>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Pins the timestamp instead of reading the clock at signing time.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    #[must_use]
    pub fn with_sdk_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.sdk_identifier = Some(identifier.into());
        self
    }

    #[must_use]
    pub fn with_sdk_version(mut self, version: impl Into<String>) -> Self {
        self.sdk_version = Some(version.into());
        self
    }

    /// Validates and freezes the request.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::InvalidRequest`] if the base URL or endpoint is missing or
    /// malformed, a header is not valid HTTP, or a reserved query parameter was set.
    pub fn build(self) -> Result<AuthenticatedRequest, Report<ConnectError>> {
        let base_url = self.base_url.ok_or_else(|| {
            Report::new(ConnectError::InvalidRequest {
                message: "Base URL is required".into(),
            })
        })?;
        Url::parse(&base_url).change_context(ConnectError::InvalidRequest {
            message: format!("Invalid base URL: {base_url}"),
        })?;

        let endpoint = self.endpoint.ok_or_else(|| {
            Report::new(ConnectError::InvalidRequest {
                message: "Endpoint is required".into(),
            })
        })?;
        if !endpoint.starts_with('/') || endpoint.contains(['?', '#']) {
            return Err(Report::new(ConnectError::InvalidRequest {
                message: format!(
                    "Endpoint must be an absolute path without a query or fragment: {endpoint}"
                ),
            }));
        }
        if endpoint.split('/').any(is_dot_segment) {
            return Err(Report::new(ConnectError::InvalidRequest {
                message: format!("Endpoint must not contain dot segments: {endpoint}"),
            }));
        }

        for reserved in [QUERY_NONCE, QUERY_TIMESTAMP] {
            if self.query.contains_key(reserved) {
                return Err(Report::new(ConnectError::InvalidRequest {
                    message: format!("Query parameter '{reserved}' is set by the authenticator"),
                }));
            }
        }

        let mut headers = HeaderMap::new();
        for (name, value) in self.headers {
            let header_name =
                HeaderName::try_from(name.as_str()).change_context(ConnectError::InvalidRequest {
                    message: format!("Invalid header name: {name}"),
                })?;
            let header_value =
                HeaderValue::try_from(value.as_str()).change_context(
                    ConnectError::InvalidRequest {
                        message: format!("Invalid value for header {name}"),
                    },
                )?;
            headers.insert(header_name, header_value);
        }

        Ok(AuthenticatedRequest {
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoint,
            method: self.method.unwrap_or(Method::GET),
            query: self.query,
            headers,
            payload: self.payload,
            nonce: self.nonce,
            timestamp: self.timestamp,
            sdk_identifier: self.sdk_identifier,
            sdk_version: self.sdk_version,
        })
    }
}

/// True for segments a URL parser would collapse, including percent-encoded dots.
fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        "." | "%2e" | ".." | ".%2e" | "%2e." | "%2e%2e"
    )
}

/// A frozen request intent, ready to be signed.
///
/// Fields cannot change after [`RequestBuilder::build`], so the canonical string is
/// always reproducible from this value plus the nonce and timestamp used.
#[derive(Debug, Clone)]
pub struct AuthenticatedRequest {
    base_url: String,
    endpoint: String,
    method: Method,
    query: BTreeMap<String, String>,
    headers: HeaderMap,
    payload: Option<Payload>,
    nonce: Option<Nonce>,
    timestamp: Option<Timestamp>,
    sdk_identifier: Option<String>,
    sdk_version: Option<String>,
}

impl AuthenticatedRequest {
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    #[must_use]
    pub fn nonce(&self) -> Option<&Nonce> {
        self.nonce.as_ref()
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }

    #[must_use]
    pub fn sdk_identifier(&self) -> Option<&str> {
        self.sdk_identifier.as_deref()
    }

    #[must_use]
    pub fn sdk_version(&self) -> Option<&str> {
        self.sdk_version.as_deref()
    }

    /// Endpoint plus query string, with parameters in lexicographic key order.
    ///
    /// `nonce` and `timestamp` are merged into the query before sorting, so the
    /// result is independent of the order parameters were added in.
    #[must_use]
    pub fn path_with_query(&self, nonce: &Nonce, timestamp: Timestamp) -> String {
        let mut params = self.query.clone();
        params.insert(QUERY_NONCE.to_string(), nonce.to_string());
        params.insert(QUERY_TIMESTAMP.to_string(), timestamp.to_string());

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &params {
            serializer.append_pair(name, value);
        }

        format!("{}?{}", self.endpoint, serializer.finish())
    }
}

/// A signed request: the plain tuple handed to a transport.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) endpoint: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Bytes>,
    pub(crate) nonce: Nonce,
    pub(crate) timestamp: Timestamp,
    pub(crate) canonical: String,
}

impl SignedRequest {
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Endpoint path without query, safe to log.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
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
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    #[must_use]
    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The exact string that was signed.
    #[must_use]
    pub fn canonical_string(&self) -> &str {
        &self.canonical
    }

    #[must_use]
    pub fn into_parts(self) -> (Method, Url, HeaderMap, Option<Bytes>) {
        (self.method, self.url, self.headers, self.body)
    }
}
