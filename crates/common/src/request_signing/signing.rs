//! Request signing.
//!
//! Every outbound request is signed over a canonical string built from the
//! method, the endpoint path with its sorted query, and the base64 payload.
//! The signature and the key identifier travel as headers.

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine};
use error_stack::{Report, ResultExt};
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use http::Method;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    HEADER_X_YOTI_AUTH_DIGEST, HEADER_X_YOTI_AUTH_KEY, HEADER_X_YOTI_SDK,
    HEADER_X_YOTI_SDK_VERSION,
};
use crate::error::ConnectError;
use crate::payload::Payload;
use crate::request::{AuthenticatedRequest, SignedRequest};

use super::{KeyMaterial, Nonce, Timestamp};

const CANONICAL_DELIMITER: char = '&';

/// Selects the auth key identifier and canonical string layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureVersion {
    /// Legacy layout: full public key as identifier, payload segment only when present.
    V1,
    #[default]
    V2,
}

impl SignatureVersion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl fmt::Display for SignatureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the string that is hashed and signed.
///
/// `path_with_query` must already contain `nonce` and `timestamp` with the
/// query in lexicographic key order, see [`AuthenticatedRequest::path_with_query`].
#[must_use]
pub fn canonical_string(
    method: &Method,
    path_with_query: &str,
    payload: Option<&Payload>,
    version: SignatureVersion,
) -> String {
    let mut canonical = format!("{}{CANONICAL_DELIMITER}{path_with_query}", method.as_str());

    if payload.is_some() || version == SignatureVersion::V2 {
        canonical.push(CANONICAL_DELIMITER);
        if let Some(payload) = payload {
            canonical.push_str(&payload.to_base64());
        }
    }

    canonical
}

/// Signs [`AuthenticatedRequest`]s with one key pair.
///
/// Holds no mutable state, so one instance can sign from many threads.
#[derive(Debug, Clone)]
pub struct RequestAuthenticator {
    key: Arc<KeyMaterial>,
    version: SignatureVersion,
}

impl RequestAuthenticator {
    #[must_use]
    pub fn new(key: Arc<KeyMaterial>) -> Self {
        Self {
            key,
            version: SignatureVersion::default(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: SignatureVersion) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn version(&self) -> SignatureVersion {
        self.version
    }

    #[must_use]
    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    /// Produces the signed method/url/headers/body tuple for `request`.
    ///
    /// A nonce and timestamp are generated unless the request pinned them.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::SigningFailure`] if the private key operation fails, and
    /// [`ConnectError::InvalidRequest`] if the resulting URL or an SDK header is invalid.
    pub fn sign(
        &self,
        request: &AuthenticatedRequest,
    ) -> Result<SignedRequest, Report<ConnectError>> {
        let nonce = request.nonce().cloned().unwrap_or_else(Nonce::generate);
        let timestamp = request.timestamp().unwrap_or_else(Timestamp::now);

        let url_str = format!(
            "{}{}",
            request.base_url(),
            request.path_with_query(&nonce, timestamp)
        );
        let url = Url::parse(&url_str).change_context(ConnectError::InvalidRequest {
            message: format!("Invalid request URL for {}", request.endpoint()),
        })?;

        // Signed over the URL as it will be sent, not the string it was parsed from
        let signed_path = signed_path_and_query(&url, request.base_url())?;
        let canonical = canonical_string(
            request.method(),
            &signed_path,
            request.payload(),
            self.version,
        );

        let signature = self.key.sign(canonical.as_bytes())?;
        let signature_b64 = general_purpose::STANDARD.encode(signature);

        let headers = self.build_headers(request, &signature_b64)?;

        log::debug!(
            "Signed {} {} ({} signature)",
            request.method(),
            request.endpoint(),
            self.version
        );

        Ok(SignedRequest {
            method: request.method().clone(),
            url,
            endpoint: request.endpoint().to_string(),
            headers,
            body: request.payload().map(|payload| payload.clone().into_bytes()),
            nonce,
            timestamp,
            canonical,
        })
    }

    fn build_headers(
        &self,
        request: &AuthenticatedRequest,
        signature_b64: &str,
    ) -> Result<HeaderMap, Report<ConnectError>> {
        let mut headers = HeaderMap::new();

        if let Some(payload) = request.payload() {
            headers.insert(CONTENT_TYPE, header_value(payload.content_type())?);
        }

        for (name, value) in request.headers() {
            headers.insert(name.clone(), value.clone());
        }

        if let Some(identifier) = request.sdk_identifier() {
            headers.insert(HEADER_X_YOTI_SDK, header_value(identifier)?);
        }
        if let Some(version) = request.sdk_version() {
            let value = match request.sdk_identifier() {
                Some(identifier) => format!("{identifier}-{version}"),
                None => version.to_string(),
            };
            headers.insert(HEADER_X_YOTI_SDK_VERSION, header_value(&value)?);
        }

        // Written last so caller headers can never replace them
        headers.insert(
            HEADER_X_YOTI_AUTH_KEY,
            header_value(&self.key.auth_key_for(self.version))?,
        );
        headers.insert(
            HEADER_X_YOTI_AUTH_DIGEST,
            HeaderValue::try_from(signature_b64).change_context(
                ConnectError::SigningFailure {
                    message: "Signature is not a valid header value".into(),
                },
            )?,
        );

        Ok(headers)
    }
}

/// Path and query of `url` relative to the path prefix of `base_url`.
fn signed_path_and_query(url: &Url, base_url: &str) -> Result<String, Report<ConnectError>> {
    let invalid = || {
        Report::new(ConnectError::InvalidRequest {
            message: format!("Request URL {url} does not stay under {base_url}"),
        })
    };

    if url.fragment().is_some() {
        return Err(invalid());
    }

    let base = Url::parse(base_url).change_context(ConnectError::InvalidRequest {
        message: format!("Invalid base URL: {base_url}"),
    })?;
    let base_path = base.path().trim_end_matches('/');
    let relative = url.path().strip_prefix(base_path).ok_or_else(invalid)?;
    if !relative.starts_with('/') {
        return Err(invalid());
    }

    Ok(match url.query() {
        Some(query) => format!("{relative}?{query}"),
        None => relative.to_string(),
    })
}

fn header_value(value: &str) -> Result<HeaderValue, Report<ConnectError>> {
    HeaderValue::try_from(value).change_context(ConnectError::InvalidRequest {
        message: format!("Invalid header value: {value}"),
    })
}
