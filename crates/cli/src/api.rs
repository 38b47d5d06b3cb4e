//! Commands that call the connect, AML, share URL and sandbox APIs.

use std::fs;
use std::path::Path;

use idconnect_common::request_signing::OpaqueToken;
use idconnect_common::services::{AmlAddress, AmlProfile, TokenRequest};
use idconnect_common::ConnectClient;

use crate::error::CliError;

/// Fetches the activity details behind a connect token.
pub fn profile(client: &ConnectClient, token: &str) -> Result<(), CliError> {
    let details = client.activity_details(&OpaqueToken::from(token))?;

    let output = serde_json::json!({
        "receipt_id": details.receipt_id,
        "remember_me_id": details.remember_me_id,
        "parent_remember_me_id": details.parent_remember_me_id,
        "timestamp": details.timestamp.map(|ts| ts.to_rfc3339()),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub struct AmlArgs {
    pub given_names: String,
    pub family_name: String,
    pub country: String,
    pub postcode: Option<String>,
    pub ssn: Option<String>,
}

pub(crate) fn aml_profile(args: AmlArgs) -> AmlProfile {
    let mut address = AmlAddress::new(args.country);
    if let Some(postcode) = args.postcode {
        address = address.with_postcode(postcode);
    }

    let mut profile = AmlProfile::new(args.given_names, args.family_name, address);
    if let Some(ssn) = args.ssn {
        profile = profile.with_ssn(ssn);
    }
    profile
}

pub fn aml_check(client: &ConnectClient, args: AmlArgs) -> Result<(), CliError> {
    let result = client.perform_aml_check(&aml_profile(args))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Creates a share URL from a JSON scenario file.
pub fn share_url(client: &ConnectClient, scenario_file: &Path) -> Result<(), CliError> {
    let scenario = read_json(scenario_file)?;
    let result = client.create_share_url(&scenario)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Issues a sandbox token for the given `name=value` attributes.
pub fn sandbox_token(
    client: &ConnectClient,
    remember_me_id: Option<String>,
    attributes: &[String],
) -> Result<(), CliError> {
    let request = token_request(remember_me_id, attributes)?;
    let token = client.sandbox().token(&request)?;
    println!("{}", token.as_str());
    Ok(())
}

pub(crate) fn token_request(
    remember_me_id: Option<String>,
    attributes: &[String],
) -> Result<TokenRequest, CliError> {
    let mut request = TokenRequest::new();
    if let Some(id) = remember_me_id {
        request = request.with_remember_me_id(id);
    }

    for attribute in attributes {
        let (name, value) = attribute.split_once('=').ok_or_else(|| {
            CliError::Config(format!(
                "Attribute '{}' must be in name=value form",
                attribute
            ))
        })?;
        request = request.with_attribute(name.trim(), value.trim());
    }

    Ok(request)
}

pub(crate) fn read_json(path: &Path) -> Result<serde_json::Value, CliError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
