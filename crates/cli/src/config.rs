//! Settings loading and the `config` commands.
//!
//! Settings come from the TOML file passed with `--config`, or the bundled
//! defaults, merged with environment variables prefixed with `IDCONNECT__`.
//! For example, `IDCONNECT__TRANSPORT__TIMEOUT_SECS=10` overrides
//! `transport.timeout_secs`.

use std::path::Path;

use idconnect_common::settings::Settings;

use crate::error::CliError;

/// Loads settings from `file`, or the bundled defaults when no file is given.
pub(crate) fn load_settings(file: Option<&Path>) -> Result<Settings, CliError> {
    let settings = match file {
        Some(path) => {
            log::debug!("Loading config from: {}", path.display());
            Settings::from_file(path)?
        }
        None => Settings::new()?,
    };

    Ok(settings)
}

/// Validates the settings and reports the endpoints they resolve to.
pub fn validate(file: Option<&Path>) -> Result<(), CliError> {
    let settings = load_settings(file)?;

    println!("Configuration is valid");
    println!("  Connect API:  {}", settings.api.connect_url);
    println!("  Doc scan API: {}", settings.api.doc_scan_url);
    println!("  Sandbox API:  {}", settings.api.sandbox_url);
    println!("  Signing:      {}", settings.signing.version);

    Ok(())
}

/// Prints the merged settings as TOML.
pub fn show(file: Option<&Path>) -> Result<(), CliError> {
    let settings = load_settings(file)?;
    println!("{}", merged_toml(&settings)?);
    Ok(())
}

pub(crate) fn merged_toml(settings: &Settings) -> Result<String, CliError> {
    Ok(toml::to_string_pretty(settings)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use idconnect_common::request_signing::SignatureVersion;
    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("should create temp file");
        file.write_all(content.as_bytes())
            .expect("should write config");
        file
    }

    #[test]
    fn test_load_settings_from_file() {
        let file = write_config(
            r#"
            [api]
            connect_url = "https://connect.example.com/api/v1"

            [signing]
            version = "v1"
            "#,
        );

        let settings = load_settings(Some(file.path())).expect("should load settings");
        assert_eq!(settings.api.connect_url, "https://connect.example.com/api/v1");
        assert_eq!(settings.signing.version, SignatureVersion::V1);
    }

    #[test]
    fn test_load_settings_defaults() {
        let settings = load_settings(None).expect("should load defaults");
        assert_eq!(settings.transport.timeout_secs, 30);
    }

    #[test]
    fn test_load_settings_missing_file() {
        let err = load_settings(Some(Path::new("/nonexistent/idconnect.toml")))
            .expect_err("should fail for missing file");
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("/nonexistent/idconnect.toml"));
    }

    #[test]
    fn test_load_settings_invalid_file() {
        let file = write_config("[transport]\ntimeout_secs = 0\n");
        let err = load_settings(Some(file.path())).expect_err("should reject timeout");
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_merged_toml_round_trips() {
        let settings = load_settings(None).expect("should load defaults");
        let toml_str = merged_toml(&settings).expect("should serialize settings");

        assert!(toml_str.contains("[api]"));
        let reparsed = Settings::from_toml(&toml_str).expect("should reparse settings");
        assert_eq!(reparsed.api.connect_url, settings.api.connect_url);
    }
}
