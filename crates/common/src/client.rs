//! Entry point tying key material, settings and transport together.

use std::path::Path;
use std::sync::Arc;

use error_stack::Report;

use crate::error::ConnectError;
use crate::executor::RequestExecutor;
use crate::request_signing::{KeyMaterial, OpaqueToken, RequestAuthenticator};
use crate::services::{
    ActivityDetails, AmlProfile, AmlResult, AmlService, DocScanService, ProfileService,
    SandboxClient, ServiceContext, ShareUrlResult, ShareUrlService,
};
use crate::settings::Settings;
use crate::transport::{HttpTransport, UreqTransport};

const FILE_URL_PREFIX: &str = "file://";

/// A configured client for one application.
///
/// Cheap to clone. Clones share the key and transport but nothing mutable.
#[derive(Debug, Clone)]
pub struct ConnectClient {
    sdk_id: String,
    key: Arc<KeyMaterial>,
    settings: Settings,
    context: ServiceContext,
}

impl ConnectClient {
    /// Builds a client that talks to the configured endpoints over `ureq`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::InvalidRequest`] if `sdk_id` is empty.
    pub fn new(
        sdk_id: impl Into<String>,
        key: KeyMaterial,
        settings: Settings,
    ) -> Result<Self, Report<ConnectError>> {
        let sdk_id = sdk_id.into();
        if sdk_id.trim().is_empty() {
            return Err(Report::new(ConnectError::InvalidRequest {
                message: "SDK ID is required".into(),
            }));
        }

        let key = Arc::new(key);
        let transport = Arc::new(UreqTransport::new(settings.transport.timeout()));
        let context = Self::build_context(&sdk_id, &key, &settings, transport);

        log::debug!(
            "Created client for SDK ID {} with auth key {}",
            sdk_id,
            key.auth_key_identifier()
        );

        Ok(Self {
            sdk_id,
            key,
            settings,
            context,
        })
    }

    /// # Errors
    ///
    /// Returns [`ConnectError::InvalidKeyFormat`] for unparseable PEM text and
    /// [`ConnectError::InvalidRequest`] for an empty `sdk_id`.
    pub fn from_pem_text(
        sdk_id: impl Into<String>,
        pem: &str,
        settings: Settings,
    ) -> Result<Self, Report<ConnectError>> {
        Self::new(sdk_id, KeyMaterial::from_pem_text(pem)?, settings)
    }

    /// # Errors
    ///
    /// Returns [`ConnectError::KeyFileNotFound`] if the file cannot be read, plus the
    /// errors of [`ConnectClient::from_pem_text`].
    pub fn from_pem_file(
        sdk_id: impl Into<String>,
        path: impl AsRef<Path>,
        settings: Settings,
    ) -> Result<Self, Report<ConnectError>> {
        Self::new(sdk_id, KeyMaterial::from_file_path(path)?, settings)
    }

    /// Accepts a `file://` URL, a path to an existing file, or PEM text.
    ///
    /// # Errors
    ///
    /// See [`ConnectClient::from_pem_file`] and [`ConnectClient::from_pem_text`].
    pub fn from_pem_source(
        sdk_id: impl Into<String>,
        source: &str,
        settings: Settings,
    ) -> Result<Self, Report<ConnectError>> {
        if let Some(path) = source.strip_prefix(FILE_URL_PREFIX) {
            return Self::from_pem_file(sdk_id, path, settings);
        }

        let looks_like_path = !source.contains("-----BEGIN") && Path::new(source).is_file();
        if looks_like_path {
            Self::from_pem_file(sdk_id, source, settings)
        } else {
            Self::from_pem_text(sdk_id, source, settings)
        }
    }

    /// Replaces the transport, for example with a proxy-aware or mocked one.
    #[must_use]
    pub fn with_transport<T>(mut self, transport: Arc<T>) -> Self
    where
        T: HttpTransport + 'static,
    {
        self.context = Self::build_context(&self.sdk_id, &self.key, &self.settings, transport);
        self
    }

    fn build_context<T>(
        sdk_id: &str,
        key: &Arc<KeyMaterial>,
        settings: &Settings,
        transport: Arc<T>,
    ) -> ServiceContext
    where
        T: HttpTransport + 'static,
    {
        let authenticator =
            RequestAuthenticator::new(Arc::clone(key)).with_version(settings.signing.version);
        let executor = RequestExecutor::new(authenticator, transport);
        ServiceContext::new(sdk_id, settings.sdk.clone(), executor)
    }

    #[must_use]
    pub fn sdk_id(&self) -> &str {
        &self.sdk_id
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn auth_key_identifier(&self) -> &str {
        self.key.auth_key_identifier()
    }

    #[must_use]
    pub fn executor(&self) -> &RequestExecutor {
        self.context.executor()
    }

    #[must_use]
    pub fn profile(&self) -> ProfileService {
        ProfileService::new(self.context.clone(), self.settings.api.connect_url.clone())
    }

    #[must_use]
    pub fn aml(&self) -> AmlService {
        AmlService::new(self.context.clone(), self.settings.api.connect_url.clone())
    }

    #[must_use]
    pub fn share_url(&self) -> ShareUrlService {
        ShareUrlService::new(self.context.clone(), self.settings.api.connect_url.clone())
    }

    #[must_use]
    pub fn doc_scan(&self) -> DocScanService {
        DocScanService::new(self.context.clone(), self.settings.api.doc_scan_url.clone())
    }

    #[must_use]
    pub fn sandbox(&self) -> SandboxClient {
        SandboxClient::new(self.context.clone(), self.settings.api.sandbox_url.clone())
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

    /// # Errors
    ///
    /// See [`AmlService::perform_aml_check`].
    pub fn perform_aml_check(
        &self,
        profile: &AmlProfile,
    ) -> Result<AmlResult, Report<ConnectError>> {
        self.aml().perform_aml_check(profile)
    }

    /// # Errors
    ///
    /// See [`ShareUrlService::create_share_url`].
    pub fn create_share_url<S>(&self, scenario: &S) -> Result<ShareUrlResult, Report<ConnectError>>
    where
        S: serde::Serialize + ?Sized,
    {
        self.share_url().create_share_url(scenario)
    }

    /// URL that starts the connect flow for `app_id`.
    #[must_use]
    pub fn login_url(&self, app_id: &str) -> String {
        format!(
            "{}/{}",
            self.settings.api.connect_base_url.trim_end_matches('/'),
            app_id
        )
    }
}
