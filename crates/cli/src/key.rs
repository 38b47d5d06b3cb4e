//! Key inspection and offline token decryption.

use std::path::Path;

use idconnect_common::request_signing::{KeyMaterial, OpaqueToken, TokenCipher};

use crate::error::CliError;
use crate::OutputFormat;

/// Prints the auth key identifiers the server uses to find this key.
pub fn fingerprint(pem_file: &Path, format: OutputFormat) -> Result<(), CliError> {
    let key = KeyMaterial::from_file_path(pem_file)?;
    println!("{}", fingerprint_output(&key, pem_file, format)?);
    Ok(())
}

pub(crate) fn fingerprint_output(
    key: &KeyMaterial,
    pem_file: &Path,
    format: OutputFormat,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Text => Ok(key.auth_key_identifier().to_string()),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "file": pem_file.display().to_string(),
                "fingerprint": key.auth_key_identifier(),
                "public_key": key.public_key_base64(),
                "algorithm": "sha256",
            });
            Ok(serde_json::to_string_pretty(&output)?)
        }
    }
}

/// Decrypts a connect token locally and prints the receipt reference.
pub fn decrypt_token(pem_file: &Path, token: &str) -> Result<(), CliError> {
    let key = KeyMaterial::from_file_path(pem_file)?;
    let plaintext = TokenCipher::decrypt(&OpaqueToken::from(token), &key)?;
    println!("{}", plaintext);
    Ok(())
}
