use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::constants::QUERY_APP_ID;
use crate::error::ConnectError;
use crate::payload::Payload;

use super::{path_segment, ServiceContext};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ShareUrlResult {
    /// The share URL, rendered by callers as a QR code.
    pub qrcode: String,
    pub ref_id: String,
}

/// Creates dynamic share URLs for a scenario.
#[derive(Debug, Clone)]
pub struct ShareUrlService {
    context: ServiceContext,
    base_url: String,
}

impl ShareUrlService {
    #[must_use]
    pub fn new(context: ServiceContext, base_url: impl Into<String>) -> Self {
        Self {
            context,
            base_url: base_url.into(),
        }
    }

    /// Posts `scenario` as JSON and returns the share URL issued for it.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::ServerError`] for a non-2xx response and
    /// [`ConnectError::MalformedResponse`] if the body lacks the URL.
    pub fn create_share_url<S>(&self, scenario: &S) -> Result<ShareUrlResult, Report<ConnectError>>
    where
        S: Serialize + ?Sized,
    {
        let sdk_id = self.context.sdk_id();
        let request = self
            .context
            .request(
                &self.base_url,
                format!("/qrcodes/apps/{}", path_segment(sdk_id)),
            )
            .with_post()
            .with_query_param(QUERY_APP_ID, sdk_id)
            .with_payload(Payload::from_json(scenario)?)
            .build()?;

        self.context
            .executor()
            .execute(&request)?
            .ensure_success()?
            .json()
    }
}
