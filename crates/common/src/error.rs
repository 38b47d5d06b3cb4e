//! Error types for the connect SDK.
//!
//! Every fallible operation returns `Result<T, Report<ConnectError>>`. The
//! variants are grouped so callers can tell a credential problem apart from a
//! server rejection or an unreachable network.

use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConnectError {
    /// PEM text could not be parsed into an RSA key pair.
    #[display("Invalid key format: {message}")]
    InvalidKeyFormat { message: String },

    #[display("Key file not found: {path}")]
    KeyFileNotFound { path: String },

    /// Private-key decryption failed or produced an empty plaintext.
    #[display("Decryption failure: {message}")]
    DecryptionFailure { message: String },

    #[display("Token decryption failure: {message}")]
    TokenDecryptionFailure { message: String },

    #[display("Signing failure: {message}")]
    SigningFailure { message: String },

    /// The transport could not complete the exchange (connection, TLS, timeout).
    #[display("Transport failure: {message}")]
    TransportFailure { message: String },

    /// The remote service answered outside of the 2xx range.
    #[display("Server responded with {status}")]
    ServerError { status: u16, body: String },

    #[display("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[display("Receipt not found in response")]
    ReceiptMissing,

    #[display("Outcome was unsuccessful: {outcome}")]
    OutcomeUnsuccessful { outcome: String },

    #[display("AML check failed ({status}): {message}")]
    AmlCheckFailed { status: u16, message: String },

    #[display("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[display("Configuration error: {message}")]
    Configuration { message: String },
}

impl ConnectError {
    /// True when the failure points at the caller's own key material.
    #[must_use]
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidKeyFormat { .. }
                | Self::KeyFileNotFound { .. }
                | Self::DecryptionFailure { .. }
                | Self::TokenDecryptionFailure { .. }
                | Self::SigningFailure { .. }
        )
    }

    /// True when the remote service rejected or garbled this specific call.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::ServerError { .. }
                | Self::MalformedResponse { .. }
                | Self::ReceiptMissing
                | Self::OutcomeUnsuccessful { .. }
                | Self::AmlCheckFailed { .. }
        )
    }

    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::TransportFailure { .. })
    }

    /// HTTP status carried by the error, if the server produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError { status, .. } | Self::AmlCheckFailed { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
