use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{
    DEFAULT_CONNECT_API_URL, DEFAULT_CONNECT_BASE_URL, DEFAULT_DOC_SCAN_API_URL,
    DEFAULT_SANDBOX_API_URL, DEFAULT_SDK_IDENTIFIER, DEFAULT_SDK_VERSION,
};
use crate::error::ConnectError;
use crate::request_signing::SignatureVersion;

pub const ENVIRONMENT_VARIABLE_PREFIX: &str = "IDCONNECT";
pub const ENVIRONMENT_VARIABLE_SEPARATOR: &str = "__";

const DEFAULT_SETTINGS_TOML: &str = include_str!("../../../idconnect.toml");

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Api {
    #[validate(url)]
    #[serde(default = "default_connect_url")]
    pub connect_url: String,
    #[validate(url)]
    #[serde(default = "default_doc_scan_url")]
    pub doc_scan_url: String,
    #[validate(url)]
    #[serde(default = "default_sandbox_url")]
    pub sandbox_url: String,
    #[validate(url)]
    #[serde(default = "default_connect_base_url")]
    pub connect_base_url: String,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            connect_url: default_connect_url(),
            doc_scan_url: default_doc_scan_url(),
            sandbox_url: default_sandbox_url(),
            connect_base_url: default_connect_base_url(),
        }
    }
}

/// Identity declared on every request. Defaults to this crate's own.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Sdk {
    #[validate(length(min = 1))]
    #[serde(default = "default_sdk_identifier")]
    pub identifier: Option<String>,
    #[validate(length(min = 1))]
    #[serde(default = "default_sdk_version")]
    pub version: Option<String>,
}

impl Default for Sdk {
    fn default() -> Self {
        Self {
            identifier: default_sdk_identifier(),
            version: default_sdk_version(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct Signing {
    #[serde(default)]
    pub version: SignatureVersion,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Transport {
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Transport {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    #[serde(default)]
    pub api: Api,
    #[validate(nested)]
    #[serde(default)]
    pub sdk: Sdk,
    #[validate(nested)]
    #[serde(default)]
    pub signing: Signing,
    #[validate(nested)]
    #[serde(default)]
    pub transport: Transport,
}

impl Settings {
    /// Loads the settings bundled with the crate, with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged configuration cannot be deserialized or fails validation.
    pub fn new() -> Result<Self, Report<ConnectError>> {
        Self::from_toml(DEFAULT_SETTINGS_TOML)
    }

    /// Parses settings from a TOML string and overlays `IDCONNECT__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid, a value has the wrong type, or validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, Report<ConnectError>> {
        let environment = Environment::default()
            .prefix(ENVIRONMENT_VARIABLE_PREFIX)
            .separator(ENVIRONMENT_VARIABLE_SEPARATOR);

        let toml = File::from_str(toml_str, FileFormat::Toml);
        let config = Config::builder()
            .add_source(toml)
            .add_source(environment)
            .build()
            .change_context(ConnectError::Configuration {
                message: "Failed to build configuration".into(),
            })?;

        let settings: Self =
            config
                .try_deserialize()
                .change_context(ConnectError::Configuration {
                    message: "Failed to deserialize configuration".into(),
                })?;

        settings
            .validate()
            .change_context(ConnectError::Configuration {
                message: "Settings validation failed".into(),
            })?;

        Ok(settings)
    }

    /// Reads a TOML file from disk and parses it like [`Settings::from_toml`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is not valid settings.
    pub fn from_file(path: &Path) -> Result<Self, Report<ConnectError>> {
        let content =
            std::fs::read_to_string(path).change_context(ConnectError::Configuration {
                message: format!("Failed to read settings file {}", path.display()),
            })?;
        Self::from_toml(&content)
    }
}

fn default_connect_url() -> String {
    DEFAULT_CONNECT_API_URL.to_string()
}

fn default_doc_scan_url() -> String {
    DEFAULT_DOC_SCAN_API_URL.to_string()
}

fn default_sandbox_url() -> String {
    DEFAULT_SANDBOX_API_URL.to_string()
}

fn default_connect_base_url() -> String {
    DEFAULT_CONNECT_BASE_URL.to_string()
}

fn default_sdk_identifier() -> Option<String> {
    Some(DEFAULT_SDK_IDENTIFIER.to_string())
}

fn default_sdk_version() -> Option<String> {
    Some(DEFAULT_SDK_VERSION.to_string())
}

fn default_timeout_secs() -> u64 {
    30
}
