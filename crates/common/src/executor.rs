use std::sync::Arc;

use error_stack::Report;

use crate::error::ConnectError;
use crate::request::AuthenticatedRequest;
use crate::request_signing::RequestAuthenticator;
use crate::response::Response;
use crate::transport::{AsyncHttpTransport, BlockingAsyncTransport, HttpTransport};

/// Signs requests and hands them to a transport.
///
/// The executor does not interpret statuses: a non-2xx answer is returned as a
/// [`Response`] and mapped by the caller through [`Response::ensure_success`].
/// Nothing is retried. A retry must rebuild the request so it gets a fresh nonce.
#[derive(Clone)]
pub struct RequestExecutor {
    authenticator: RequestAuthenticator,
    transport: Arc<dyn HttpTransport>,
    async_transport: Arc<dyn AsyncHttpTransport>,
}

impl RequestExecutor {
    /// Uses `transport` for both blocking calls and, via the blocking pool, async calls.
    #[must_use]
    pub fn new<T>(authenticator: RequestAuthenticator, transport: Arc<T>) -> Self
    where
        T: HttpTransport + 'static,
    {
        let async_transport = Arc::new(BlockingAsyncTransport::new(Arc::clone(&transport)));
        Self {
            authenticator,
            transport,
            async_transport,
        }
    }

    /// Replaces the async transport, e.g. with a natively async client.
    #[must_use]
    pub fn with_async_transport(mut self, transport: Arc<dyn AsyncHttpTransport>) -> Self {
        self.async_transport = transport;
        self
    }

    #[must_use]
    pub fn authenticator(&self) -> &RequestAuthenticator {
        &self.authenticator
    }

    /// Signs and sends `request`, blocking until the response arrives.
    ///
    /// # Errors
    ///
    /// Returns a signing error if the request cannot be signed, or
    /// [`ConnectError::TransportFailure`] if the exchange does not complete.
    pub fn execute(
        &self,
        request: &AuthenticatedRequest,
    ) -> Result<Response, Report<ConnectError>> {
        let signed = self.authenticator.sign(request)?;
        self.transport.send(signed)
    }

    /// Async variant of [`RequestExecutor::execute`].
    ///
    /// The request is signed before the first await point, so the nonce and
    /// timestamp reflect when the call was made.
    ///
    /// # Errors
    ///
    /// Same as [`RequestExecutor::execute`].
    pub async fn execute_async(
        &self,
        request: &AuthenticatedRequest,
    ) -> Result<Response, Report<ConnectError>> {
        let signed = self.authenticator.sign(request)?;
        self.async_transport.send_async(signed).await
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}
