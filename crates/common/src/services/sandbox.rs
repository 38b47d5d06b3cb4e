use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::constants::QUERY_APP_ID;
use crate::error::ConnectError;
use crate::payload::Payload;
use crate::request_signing::OpaqueToken;

use super::{path_segment, ActivityDetails, ProfileService, ServiceContext};

/// One attribute the sandbox should place in the shared profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SandboxAttribute {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation: Option<String>,
    pub optional: bool,
}

/// Describes the profile a sandbox token should resolve to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remember_me_id: Option<String>,
    pub profile_attributes: Vec<SandboxAttribute>,
}

impl TokenRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_remember_me_id(mut self, remember_me_id: impl Into<String>) -> Self {
        self.remember_me_id = Some(remember_me_id.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.profile_attributes.push(SandboxAttribute {
            name: name.into(),
            value: value.into(),
            derivation: None,
            optional: false,
        });
        self
    }

    /// Adds a derived attribute such as `age_over:18` on `date_of_birth`.
    #[must_use]
    pub fn with_derived_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        derivation: impl Into<String>,
    ) -> Self {
        self.profile_attributes.push(SandboxAttribute {
            name: name.into(),
            value: value.into(),
            derivation: Some(derivation.into()),
            optional: false,
        });
        self
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Issues sandbox connect tokens and resolves them against the sandbox profile API.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    context: ServiceContext,
    base_url: String,
}

impl SandboxClient {
    #[must_use]
    pub fn new(context: ServiceContext, base_url: impl Into<String>) -> Self {
        Self {
            context,
            base_url: base_url.into(),
        }
    }

    /// Requests a connect token for the described profile.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::ServerError`] for a non-2xx response and
    /// [`ConnectError::MalformedResponse`] if the body has no token.
    pub fn token(&self, token_request: &TokenRequest) -> Result<OpaqueToken, Report<ConnectError>> {
        let sdk_id = self.context.sdk_id();
        let request = self
            .context
            .request(
                &self.base_url,
                format!("/apps/{}/tokens", path_segment(sdk_id)),
            )
            .with_post()
            .with_query_param(QUERY_APP_ID, sdk_id)
            .with_payload(Payload::from_json(token_request)?)
            .build()?;

        let response: TokenResponse = self
            .context
            .executor()
            .execute(&request)?
            .ensure_success()?
            .json()?;

        Ok(OpaqueToken::from(response.token))
    }

    /// The profile service pointed at the sandbox.
    #[must_use]
    pub fn profile(&self) -> ProfileService {
        ProfileService::new(self.context.clone(), self.base_url.clone())
    }

    /// # Errors
    ///
    /// See [`ProfileService::activity_details`].
    pub fn activity_details(
        &self,
        token: &OpaqueToken,
    ) -> Result<ActivityDetails, Report<ConnectError>> {
        self.profile().activity_details(token)
    }
}
