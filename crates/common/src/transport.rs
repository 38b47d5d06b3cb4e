//! Transport adapters.
//!
//! The signing layer hands over a [`SignedRequest`] and gets a [`Response`]
//! back. Status codes are never treated as transport errors here; only a
//! failure to complete the exchange is.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use error_stack::{Report, ResultExt};
use http::header::HeaderMap;

use crate::error::ConnectError;
use crate::request::SignedRequest;
use crate::response::Response;

const MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;

/// Sends a signed request and blocks until the response arrives.
pub trait HttpTransport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ConnectError::TransportFailure`] if the exchange could not complete.
    fn send(&self, request: SignedRequest) -> Result<Response, Report<ConnectError>>;
}

/// Sends a signed request without blocking the calling task.
///
/// Dropping the returned future does not retry the request and does not
/// guarantee that an in-flight request is aborted.
#[async_trait]
pub trait AsyncHttpTransport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ConnectError::TransportFailure`] if the exchange could not complete.
    async fn send_async(&self, request: SignedRequest) -> Result<Response, Report<ConnectError>>;
}

/// Default blocking transport backed by a pooled `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self { agent }
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, request: SignedRequest) -> Result<Response, Report<ConnectError>> {
        let endpoint = request.endpoint().to_string();
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(method.clone())
            .uri(url.as_str());
        if let Some(request_headers) = builder.headers_mut() {
            request_headers.extend(headers);
        }

        let result = match body {
            Some(body) => {
                let http_request =
                    builder
                        .body(body.to_vec())
                        .change_context(ConnectError::TransportFailure {
                            message: format!("Failed to build request for {endpoint}"),
                        })?;
                self.agent.run(http_request)
            }
            None => {
                let http_request =
                    builder
                        .body(())
                        .change_context(ConnectError::TransportFailure {
                            message: format!("Failed to build request for {endpoint}"),
                        })?;
                self.agent.run(http_request)
            }
        };

        let response = result.change_context(ConnectError::TransportFailure {
            message: format!("{method} {endpoint} did not complete"),
        })?;

        let status = response.status().as_u16();
        let response_headers: HeaderMap = response.headers().clone();
        let body = response
            .into_body()
            .with_config()
            .limit(MAX_RESPONSE_BYTES)
            .read_to_vec()
            .change_context(ConnectError::TransportFailure {
                message: format!("Failed to read response body for {endpoint}"),
            })?;

        log::debug!(
            "{} {} -> {} ({} bytes)",
            method,
            endpoint,
            status,
            body.len()
        );

        Ok(Response::new(status, response_headers, body))
    }
}

/// Runs a blocking transport on tokio's blocking pool.
#[derive(Debug)]
pub struct BlockingAsyncTransport<T> {
    inner: Arc<T>,
}

impl<T> BlockingAsyncTransport<T> {
    #[must_use]
    pub fn new(inner: Arc<T>) -> Self {
        Self { inner }
    }
}

impl<T> Clone for BlockingAsyncTransport<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl<T> AsyncHttpTransport for BlockingAsyncTransport<T>
where
    T: HttpTransport + 'static,
{
    async fn send_async(&self, request: SignedRequest) -> Result<Response, Report<ConnectError>> {
        let handle = tokio::runtime::Handle::try_current().change_context(
            ConnectError::TransportFailure {
                message: "Blocking transport needs a Tokio runtime".into(),
            },
        )?;

        let inner = Arc::clone(&self.inner);
        handle
            .spawn_blocking(move || inner.send(request))
            .await
            .change_context(ConnectError::TransportFailure {
                message: "Blocking transport task did not finish".into(),
            })?
    }
}
