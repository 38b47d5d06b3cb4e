//! Thin service façades over the signed request pipeline.
//!
//! Each service builds its requests through a shared [`ServiceContext`] and
//! maps responses with [`crate::response::Response::ensure_success`].

use crate::executor::RequestExecutor;
use crate::request::RequestBuilder;
use crate::settings::Sdk;

pub mod aml;
pub mod doc_scan;
pub mod profile;
pub mod sandbox;
pub mod share_url;

pub use aml::{AmlAddress, AmlProfile, AmlResult, AmlService};
pub use doc_scan::{
    media_from_response, CreateSessionResult, DocScanService, GetSessionResult, Media,
    SupportedCountry, SupportedDocument, SupportedDocumentsResponse,
};
pub use profile::{ActivityDetails, ProfileService};
pub use sandbox::{SandboxAttribute, SandboxClient, TokenRequest};
pub use share_url::{ShareUrlResult, ShareUrlService};

/// What every service needs to issue a signed call.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    sdk_id: String,
    sdk: Sdk,
    executor: RequestExecutor,
}

impl ServiceContext {
    #[must_use]
    pub fn new(sdk_id: impl Into<String>, sdk: Sdk, executor: RequestExecutor) -> Self {
        Self {
            sdk_id: sdk_id.into(),
            sdk,
            executor,
        }
    }

    #[must_use]
    pub fn sdk_id(&self) -> &str {
        &self.sdk_id
    }

    #[must_use]
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Starts a request against `base_url` carrying the configured SDK identity.
    #[must_use]
    pub fn request(&self, base_url: &str, endpoint: impl Into<String>) -> RequestBuilder {
        let mut builder = RequestBuilder::new()
            .with_base_url(base_url)
            .with_endpoint(endpoint);

        if let Some(identifier) = &self.sdk.identifier {
            builder = builder.with_sdk_identifier(identifier.as_str());
        }
        if let Some(version) = &self.sdk.version {
            builder = builder.with_sdk_version(version.as_str());
        }

        builder
    }
}

/// Percent-encodes one path segment so the signed path and the sent path agree.
///
/// `.` and `..` survive encoding as dot segments, so
/// [`RequestBuilder::build`] rejects them.
pub(crate) fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
