use chrono::{DateTime, Utc};
use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::constants::{QUERY_APP_ID, SHARING_OUTCOME_SUCCESS};
use crate::error::ConnectError;
use crate::request_signing::{OpaqueToken, TokenCipher};

use super::{path_segment, ServiceContext};

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    receipt: Option<Receipt>,
}

#[derive(Debug, Deserialize)]
struct Receipt {
    receipt_id: String,
    #[serde(default)]
    remember_me_id: Option<String>,
    #[serde(default)]
    parent_remember_me_id: Option<String>,
    #[serde(default)]
    sharing_outcome: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

/// The non-attribute parts of a successful share receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDetails {
    pub receipt_id: String,
    pub remember_me_id: Option<String>,
    pub parent_remember_me_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ActivityDetails {
    fn from_receipt(receipt: Receipt) -> Result<Self, Report<ConnectError>> {
        let outcome = receipt.sharing_outcome.unwrap_or_default();
        if outcome != SHARING_OUTCOME_SUCCESS {
            return Err(Report::new(ConnectError::OutcomeUnsuccessful { outcome }));
        }

        let timestamp = receipt
            .timestamp
            .filter(|value| !value.is_empty())
            .map(|value| {
                DateTime::parse_from_rfc3339(&value)
                    .map(|parsed| parsed.with_timezone(&Utc))
                    .change_context(ConnectError::MalformedResponse {
                        message: format!("Invalid receipt timestamp: {value}"),
                    })
            })
            .transpose()?;

        Ok(Self {
            receipt_id: receipt.receipt_id,
            remember_me_id: receipt.remember_me_id.filter(|id| !id.is_empty()),
            parent_remember_me_id: receipt.parent_remember_me_id.filter(|id| !id.is_empty()),
            timestamp,
        })
    }
}

/// Exchanges a connect token for the share receipt.
#[derive(Debug, Clone)]
pub struct ProfileService {
    context: ServiceContext,
    base_url: String,
}

impl ProfileService {
    #[must_use]
    pub fn new(context: ServiceContext, base_url: impl Into<String>) -> Self {
        Self {
            context,
            base_url: base_url.into(),
        }
    }

    /// Decrypts `token` and fetches the receipt it refers to.
    ///
    /// # Errors
    ///
    /// - [`ConnectError::TokenDecryptionFailure`] if the token does not decrypt
    /// - [`ConnectError::ServerError`] for a non-2xx response
    /// - [`ConnectError::ReceiptMissing`] if the body has no receipt
    /// - [`ConnectError::OutcomeUnsuccessful`] if the share did not succeed
    pub fn activity_details(
        &self,
        token: &OpaqueToken,
    ) -> Result<ActivityDetails, Report<ConnectError>> {
        let receipt_token =
            TokenCipher::decrypt(token, self.context.executor().authenticator().key())?;

        let request = self
            .context
            .request(
                &self.base_url,
                format!("/profile/{}", path_segment(&receipt_token)),
            )
            .with_get()
            .with_query_param(QUERY_APP_ID, self.context.sdk_id())
            .build()?;

        let response = self.context.executor().execute(&request)?.ensure_success()?;
        let body: ProfileResponse = response.json()?;
        let receipt = body
            .receipt
            .ok_or_else(|| Report::new(ConnectError::ReceiptMissing))?;

        ActivityDetails::from_receipt(receipt)
    }
}
