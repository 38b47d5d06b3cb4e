//! Identity connect CLI.
//!
//! This tool provides commands for:
//! - Inspecting a key pair's auth key identifier
//! - Decrypting connect tokens offline
//! - Calling the profile, AML, share URL, sandbox and doc scan APIs with signed requests
//! - Validating configuration files

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use idconnect_common::ConnectClient;

mod api;
mod config;
mod doc_scan;
mod error;
mod key;
mod logging;

use error::CliError;

#[derive(Parser)]
#[command(name = "idconnect")]
#[command(about = "Signed requests and token decryption for the identity connect API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML settings file (defaults to the bundled settings)
    #[arg(long, short, global = true, env = "IDCONNECT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct Credentials {
    /// Application SDK ID
    #[arg(long, env = "IDCONNECT_SDK_ID")]
    sdk_id: String,

    /// PEM key: a file path, a file:// URL, or the PEM text itself
    #[arg(long, env = "IDCONNECT_PEM")]
    pem: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Key inspection and offline token decryption
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Fetch the activity details behind a connect token
    Profile {
        #[command(flatten)]
        credentials: Credentials,

        /// Encrypted connect token from the redirect
        token: String,
    },

    /// Screen a person against PEP, fraud and watch lists
    Aml {
        #[command(flatten)]
        credentials: Credentials,

        #[arg(long)]
        given_names: String,

        #[arg(long)]
        family_name: String,

        /// ISO 3166-1 alpha-3 country code
        #[arg(long)]
        country: String,

        #[arg(long)]
        postcode: Option<String>,

        #[arg(long)]
        ssn: Option<String>,
    },

    /// Create a share URL from a JSON scenario file
    ShareUrl {
        #[command(flatten)]
        credentials: Credentials,

        /// Path to the dynamic scenario JSON
        #[arg(long, short)]
        scenario: PathBuf,
    },

    /// Issue a sandbox connect token
    SandboxToken {
        #[command(flatten)]
        credentials: Credentials,

        #[arg(long)]
        remember_me_id: Option<String>,

        /// Profile attribute as name=value (repeatable)
        #[arg(long = "attribute", short = 'a')]
        attributes: Vec<String>,
    },

    /// Doc scan sessions and media
    DocScan {
        #[command(flatten)]
        credentials: Credentials,

        #[command(subcommand)]
        action: DocScanAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate settings and show the resolved endpoints
    Validate,

    /// Print the merged settings as TOML
    Show,
}

#[derive(Subcommand)]
enum KeyAction {
    /// Compute the auth key identifier (SHA-256 of the public key)
    Fingerprint {
        /// Path to the PEM file
        #[arg(long, short)]
        file: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Decrypt a connect token with a local key
    DecryptToken {
        /// Path to the PEM file
        #[arg(long, short)]
        file: PathBuf,

        /// Encrypted connect token
        token: String,
    },
}

#[derive(Subcommand)]
enum DocScanAction {
    /// Create a session from a JSON session specification
    CreateSession {
        #[arg(long, short)]
        spec: PathBuf,
    },

    /// Retrieve a session
    GetSession { session_id: String },

    /// Delete a session
    DeleteSession { session_id: String },

    /// Download media content
    GetMedia {
        session_id: String,
        media_id: String,

        /// Write the media to this file instead of printing a data URL
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Delete media content
    DeleteMedia { session_id: String, media_id: String },

    /// List supported countries and documents
    SupportedDocuments,
}

#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logger(cli.verbose) {
        eprintln!("Warning: failed to initialize logger: {}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn connect_client(
    cli_config: Option<&PathBuf>,
    credentials: Credentials,
) -> Result<ConnectClient, CliError> {
    let settings = config::load_settings(cli_config.map(PathBuf::as_path))?;
    Ok(ConnectClient::from_pem_source(
        credentials.sdk_id,
        &credentials.pem,
        settings,
    )?)
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_file = cli.config.as_ref();

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Validate => config::validate(config_file.map(PathBuf::as_path)),
            ConfigAction::Show => config::show(config_file.map(PathBuf::as_path)),
        },
        Commands::Key { action } => match action {
            KeyAction::Fingerprint { file, format } => key::fingerprint(&file, format),
            KeyAction::DecryptToken { file, token } => key::decrypt_token(&file, &token),
        },
        Commands::Profile { credentials, token } => {
            let client = connect_client(config_file, credentials)?;
            api::profile(&client, &token)
        }
        Commands::Aml {
            credentials,
            given_names,
            family_name,
            country,
            postcode,
            ssn,
        } => {
            let client = connect_client(config_file, credentials)?;
            api::aml_check(
                &client,
                api::AmlArgs {
                    given_names,
                    family_name,
                    country,
                    postcode,
                    ssn,
                },
            )
        }
        Commands::ShareUrl {
            credentials,
            scenario,
        } => {
            let client = connect_client(config_file, credentials)?;
            api::share_url(&client, &scenario)
        }
        Commands::SandboxToken {
            credentials,
            remember_me_id,
            attributes,
        } => {
            let client = connect_client(config_file, credentials)?;
            api::sandbox_token(&client, remember_me_id, &attributes)
        }
        Commands::DocScan {
            credentials,
            action,
        } => {
            let client = connect_client(config_file, credentials)?;
            match action {
                DocScanAction::CreateSession { spec } => doc_scan::create_session(&client, &spec),
                DocScanAction::GetSession { session_id } => {
                    doc_scan::get_session(&client, &session_id)
                }
                DocScanAction::DeleteSession { session_id } => {
                    doc_scan::delete_session(&client, &session_id)
                }
                DocScanAction::GetMedia {
                    session_id,
                    media_id,
                    output,
                } => doc_scan::get_media(&client, &session_id, &media_id, output.as_deref()),
                DocScanAction::DeleteMedia {
                    session_id,
                    media_id,
                } => doc_scan::delete_media(&client, &session_id, &media_id),
                DocScanAction::SupportedDocuments => doc_scan::supported_documents(&client),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fingerprint_command() {
        let cli = Cli::try_parse_from([
            "idconnect",
            "key",
            "fingerprint",
            "--file",
            "key.pem",
            "--format",
            "json",
        ])
        .expect("should parse");

        match cli.command {
            Commands::Key {
                action: KeyAction::Fingerprint { file, format },
            } => {
                assert_eq!(file, PathBuf::from("key.pem"));
                assert!(matches!(format, OutputFormat::Json));
            }
            _ => panic!("Expected key fingerprint command"),
        }
    }

    #[test]
    fn test_parse_doc_scan_media_command() {
        let cli = Cli::try_parse_from([
            "idconnect",
            "--verbose",
            "doc-scan",
            "--sdk-id",
            "SDK_ID",
            "--pem",
            "key.pem",
            "get-media",
            "session-1",
            "media-1",
            "--output",
            "out.jpg",
        ])
        .expect("should parse");

        assert!(cli.verbose);
        match cli.command {
            Commands::DocScan {
                credentials,
                action:
                    DocScanAction::GetMedia {
                        session_id,
                        media_id,
                        output,
                    },
            } => {
                assert_eq!(credentials.sdk_id, "SDK_ID");
                assert_eq!(session_id, "session-1");
                assert_eq!(media_id, "media-1");
                assert_eq!(output, Some(PathBuf::from("out.jpg")));
            }
            _ => panic!("Expected doc-scan get-media command"),
        }
    }

    #[test]
    fn test_parse_sandbox_token_attributes() {
        let cli = Cli::try_parse_from([
            "idconnect",
            "sandbox-token",
            "--sdk-id",
            "SDK_ID",
            "--pem",
            "key.pem",
            "-a",
            "given_names=Edward",
            "-a",
            "family_name=Heath",
        ])
        .expect("should parse");

        match cli.command {
            Commands::SandboxToken { attributes, .. } => assert_eq!(attributes.len(), 2),
            _ => panic!("Expected sandbox-token command"),
        }
    }

    #[test]
    fn test_connect_client_rejects_empty_sdk_id() {
        let credentials = Credentials {
            sdk_id: String::new(),
            pem: include_str!("../../common/src/fixtures/test-key.pem").to_string(),
        };
        let err = connect_client(None, credentials).expect_err("should reject empty SDK ID");
        assert!(matches!(err, CliError::Sdk(_)));
    }
}
