//! Document scan sessions and their media.
//!
//! Media fetches come in a blocking and an async flavour. Both hand the
//! response to [`media_from_response`], so validation lives in one place.

use base64::{engine::general_purpose, Engine};
use bytes::Bytes;
use error_stack::Report;
use futures::FutureExt;
use http::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::constants::QUERY_SDK_ID;
use crate::error::ConnectError;
use crate::payload::Payload;
use crate::request::{AuthenticatedRequest, RequestBuilder};
use crate::response::Response;

use super::{path_segment, ServiceContext};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreateSessionResult {
    pub session_id: String,
    pub client_session_token: String,
    pub client_session_token_ttl: u64,
}

/// A retrieved session. Fields the SDK does not model are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GetSessionResult {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub client_session_token_ttl: Option<u64>,
    #[serde(default)]
    pub user_tracking_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SupportedDocument {
    #[serde(rename = "type")]
    pub document_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SupportedCountry {
    pub code: String,
    #[serde(default)]
    pub supported_documents: Vec<SupportedDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SupportedDocumentsResponse {
    #[serde(default)]
    pub supported_countries: Vec<SupportedCountry>,
}

/// Binary media content with the MIME type the server declared for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    mime_type: String,
    content: Bytes,
}

impl Media {
    #[must_use]
    pub fn new(mime_type: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[must_use]
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    #[must_use]
    pub fn base64_content(&self) -> String {
        general_purpose::STANDARD.encode(&self.content)
    }

    /// `data:` URL suitable for embedding in HTML.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_content())
    }
}

/// Maps a media content response to [`Media`].
///
/// # Errors
///
/// Returns [`ConnectError::ServerError`] for a non-2xx response.
pub fn media_from_response(response: Response) -> Result<Media, Report<ConnectError>> {
    let response = response.ensure_success()?;
    let mime_type = response
        .header(CONTENT_TYPE.as_str())
        .unwrap_or_default()
        .to_string();

    Ok(Media::new(mime_type, response.into_body()))
}

#[derive(Debug, Clone)]
pub struct DocScanService {
    context: ServiceContext,
    base_url: String,
}

impl DocScanService {
    #[must_use]
    pub fn new(context: ServiceContext, base_url: impl Into<String>) -> Self {
        Self {
            context,
            base_url: base_url.into(),
        }
    }

    /// Creates a session from a session specification.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::ServerError`] for a non-2xx response and
    /// [`ConnectError::MalformedResponse`] if the result cannot be parsed.
    pub fn create_session<S>(
        &self,
        specification: &S,
    ) -> Result<CreateSessionResult, Report<ConnectError>>
    where
        S: Serialize + ?Sized,
    {
        let request = self
            .session_request("/sessions".to_string())
            .with_post()
            .with_payload(Payload::from_json(specification)?)
            .build()?;

        self.context
            .executor()
            .execute(&request)?
            .ensure_success()?
            .json()
    }

    /// # Errors
    ///
    /// Returns [`ConnectError::ServerError`] for a non-2xx response and
    /// [`ConnectError::MalformedResponse`] if the result cannot be parsed.
    pub fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Result<GetSessionResult, Report<ConnectError>> {
        let request = self
            .session_request(session_path(session_id))
            .with_get()
            .build()?;

        self.context
            .executor()
            .execute(&request)?
            .ensure_success()?
            .json()
    }

    /// # Errors
    ///
    /// Returns [`ConnectError::ServerError`] for a non-2xx response.
    pub fn delete_session(&self, session_id: &str) -> Result<(), Report<ConnectError>> {
        let request = self
            .session_request(session_path(session_id))
            .with_delete()
            .build()?;

        self.context
            .executor()
            .execute(&request)?
            .ensure_success()?;
        Ok(())
    }

    /// Downloads one media item, blocking until it arrives.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::ServerError`] for a non-2xx response.
    pub fn get_media_content(
        &self,
        session_id: &str,
        media_id: &str,
    ) -> Result<Media, Report<ConnectError>> {
        let request = self.media_content_request(session_id, media_id)?;
        self.context
            .executor()
            .execute(&request)
            .and_then(media_from_response)
    }

    /// Async variant of [`DocScanService::get_media_content`].
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::ServerError`] for a non-2xx response.
    pub async fn get_media_content_async(
        &self,
        session_id: &str,
        media_id: &str,
    ) -> Result<Media, Report<ConnectError>> {
        let request = self.media_content_request(session_id, media_id)?;
        self.context
            .executor()
            .execute_async(&request)
            .map(|result| result.and_then(media_from_response))
            .await
    }

    /// # Errors
    ///
    /// Returns [`ConnectError::ServerError`] for a non-2xx response.
    pub fn delete_media_content(
        &self,
        session_id: &str,
        media_id: &str,
    ) -> Result<(), Report<ConnectError>> {
        let request = self
            .session_request(media_path(session_id, media_id))
            .with_delete()
            .build()?;

        self.context
            .executor()
            .execute(&request)?
            .ensure_success()?;
        Ok(())
    }

    /// Lists the countries and document types the service accepts.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::ServerError`] for a non-2xx response and
    /// [`ConnectError::MalformedResponse`] if the result cannot be parsed.
    pub fn supported_documents(&self) -> Result<SupportedDocumentsResponse, Report<ConnectError>> {
        let request = self
            .context
            .request(&self.base_url, "/supported-documents")
            .with_get()
            .build()?;

        self.context
            .executor()
            .execute(&request)?
            .ensure_success()?
            .json()
    }

    fn session_request(&self, endpoint: String) -> RequestBuilder {
        self.context
            .request(&self.base_url, endpoint)
            .with_query_param(QUERY_SDK_ID, self.context.sdk_id())
    }

    fn media_content_request(
        &self,
        session_id: &str,
        media_id: &str,
    ) -> Result<AuthenticatedRequest, Report<ConnectError>> {
        self.session_request(media_path(session_id, media_id))
            .with_get()
            .build()
    }
}

fn session_path(session_id: &str) -> String {
    format!("/sessions/{}", path_segment(session_id))
}

fn media_path(session_id: &str, media_id: &str) -> String {
    format!(
        "/sessions/{}/media/{}/content",
        path_segment(session_id),
        path_segment(media_id)
    )
}
