use base64::{engine::general_purpose, Engine};
use bytes::Bytes;
use error_stack::{Report, ResultExt};
use serde::Serialize;

use crate::constants::CONTENT_TYPE_JSON;
use crate::error::ConnectError;

/// Request body bytes plus their declared content type.
///
/// The bytes are exactly what gets signed and transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    bytes: Bytes,
    content_type: String,
}

impl Payload {
    /// Serializes a value to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::InvalidRequest`] if the value cannot be represented as JSON.
    pub fn from_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Report<ConnectError>> {
        let bytes = serde_json::to_vec(value).change_context(ConnectError::InvalidRequest {
            message: "Failed to serialize payload to JSON".into(),
        })?;

        Ok(Self {
            bytes: Bytes::from(bytes),
            content_type: CONTENT_TYPE_JSON.to_string(),
        })
    }

    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard base64 of the payload bytes, as used in the canonical signing string.
    #[must_use]
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }

    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}
