//! CLI error types.

use std::fmt;

use error_stack::Report;
use idconnect_common::ConnectError;

#[derive(Debug)]
pub enum CliError {
    /// Configuration file error
    Config(String),
    /// IO error
    Io(std::io::Error),
    /// TOML or JSON (de)serialization error
    Format(String),
    /// Error reported by the SDK
    Sdk(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Io(err) => write!(f, "IO error: {}", err),
            CliError::Format(msg) => write!(f, "Format error: {}", msg),
            CliError::Sdk(msg) => write!(f, "SDK error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        CliError::Format(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Format(err.to_string())
    }
}

impl From<Report<ConnectError>> for CliError {
    fn from(report: Report<ConnectError>) -> Self {
        match report.current_context() {
            ConnectError::Configuration { .. } => CliError::Config(format!("{report:?}")),
            _ => CliError::Sdk(format!("{report:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_cli_error_display() {
        assert_eq!(
            format!("{}", CliError::Config("test".into())),
            "Configuration error: test"
        );
        assert_eq!(
            format!("{}", CliError::Format("test".into())),
            "Format error: test"
        );
        assert_eq!(format!("{}", CliError::Sdk("test".into())), "SDK error: test");
    }

    #[test]
    fn test_cli_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        match cli_err {
            CliError::Io(_) => {}
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_cli_error_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.source().is_some());

        let config_err = CliError::Config("test".into());
        assert!(config_err.source().is_none());
    }

    #[test]
    fn test_cli_error_from_report() {
        let report = Report::new(ConnectError::TokenDecryptionFailure {
            message: "Token is empty".into(),
        });
        match CliError::from(report) {
            CliError::Sdk(msg) => assert!(msg.contains("Token is empty")),
            other => panic!("Expected Sdk variant, got {other:?}"),
        }

        let report = Report::new(ConnectError::Configuration {
            message: "bad timeout".into(),
        });
        assert!(matches!(CliError::from(report), CliError::Config(_)));
    }
}
