use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::constants::QUERY_APP_ID;
use crate::error::ConnectError;
use crate::payload::Payload;
use crate::response::Response;

use super::ServiceContext;

const AML_CHECK_ENDPOINT: &str = "/aml-check";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmlAddress {
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
}

impl AmlAddress {
    #[must_use]
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            postcode: None,
        }
    }

    #[must_use]
    pub fn with_postcode(mut self, postcode: impl Into<String>) -> Self {
        self.postcode = Some(postcode.into());
        self
    }
}

/// The person to screen against PEP, fraud and watch lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmlProfile {
    pub given_names: String,
    pub family_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    pub address: AmlAddress,
}

impl AmlProfile {
    #[must_use]
    pub fn new(
        given_names: impl Into<String>,
        family_name: impl Into<String>,
        address: AmlAddress,
    ) -> Self {
        Self {
            given_names: given_names.into(),
            family_name: family_name.into(),
            ssn: None,
            address,
        }
    }

    #[must_use]
    pub fn with_ssn(mut self, ssn: impl Into<String>) -> Self {
        self.ssn = Some(ssn.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct AmlResult {
    pub on_pep_list: bool,
    pub on_fraud_list: bool,
    pub on_watch_list: bool,
}

#[derive(Debug, Default, Deserialize)]
struct AmlErrorBody {
    code: Option<String>,
    #[serde(default)]
    errors: Vec<AmlFieldError>,
}

#[derive(Debug, Deserialize)]
struct AmlFieldError {
    property: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AmlService {
    context: ServiceContext,
    base_url: String,
}

impl AmlService {
    #[must_use]
    pub fn new(context: ServiceContext, base_url: impl Into<String>) -> Self {
        Self {
            context,
            base_url: base_url.into(),
        }
    }

    /// Screens `profile` and returns which lists it matched.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::AmlCheckFailed`] for a non-2xx response, with the
    /// server's first field error in the message when one is given.
    pub fn perform_aml_check(
        &self,
        profile: &AmlProfile,
    ) -> Result<AmlResult, Report<ConnectError>> {
        let request = self
            .context
            .request(&self.base_url, AML_CHECK_ENDPOINT)
            .with_post()
            .with_query_param(QUERY_APP_ID, self.context.sdk_id())
            .with_payload(Payload::from_json(profile)?)
            .build()?;

        let response = self.context.executor().execute(&request)?;
        if !response.is_success() {
            let message = aml_error_message(&response);
            log::warn!("AML check rejected with status {}", response.status());
            return Err(Report::new(ConnectError::AmlCheckFailed {
                status: response.status(),
                message,
            }));
        }

        response.json()
    }
}

/// Formats a rejected AML response as `"{code} - {property}: {message}"`.
fn aml_error_message(response: &Response) -> String {
    let body: AmlErrorBody = serde_json::from_slice(response.body()).unwrap_or_default();
    let code = body.code.unwrap_or_else(|| "Error".to_string());

    match body.errors.first() {
        Some(AmlFieldError {
            property: Some(property),
            message: Some(message),
        }) => format!("{code} - {property}: {message}"),
        _ => format!("{code} - Server responded with {}", response.status()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::tests::{
        create_test_client, MockTransport, AML_ERROR_JSON, AML_RESULT_JSON, TEST_SDK_ID,
    };

    fn profile() -> AmlProfile {
        AmlProfile::new("Edward Richard George", "Heath", AmlAddress::new("GBR"))
    }

    #[test]
    fn test_perform_aml_check() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(200, AML_RESULT_JSON);

        let result = create_test_client(&mock)
            .aml()
            .perform_aml_check(&profile())
            .expect("should perform AML check");

        assert!(result.on_pep_list);
        assert!(!result.on_fraud_list);
        assert!(!result.on_watch_list);

        let request = mock.last();
        assert_eq!(*request.method(), http::Method::POST);
        assert_eq!(request.url().path(), "/api/v1/aml-check");
        assert_eq!(request.query_param("appId").as_deref(), Some(TEST_SDK_ID));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(
            request.body().map(|body| body.to_vec()),
            Some(
                br#"{"given_names":"Edward Richard George","family_name":"Heath","address":{"country":"GBR"}}"#
                    .to_vec()
            )
        );
    }

    #[test]
    fn test_profile_serialization_with_optional_fields() {
        let profile = AmlProfile::new("Ed", "Heath", AmlAddress::new("USA").with_postcode("12345"))
            .with_ssn("123-45-6789");
        let json = serde_json::to_value(&profile).expect("should serialize");

        assert_eq!(json["ssn"], "123-45-6789");
        assert_eq!(json["address"]["postcode"], "12345");
    }

    #[test]
    fn test_aml_error_uses_first_field_error() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(400, AML_ERROR_JSON);

        let err = create_test_client(&mock)
            .aml()
            .perform_aml_check(&profile())
            .expect_err("should fail on 400");

        match err.current_context() {
            ConnectError::AmlCheckFailed { status, message } => {
                assert_eq!(*status, 400);
                assert_eq!(
                    message,
                    "PAYLOAD_VALIDATION - address.country: must not be null"
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_aml_error_without_details() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(500, "<html>Internal error</html>");

        let err = create_test_client(&mock)
            .aml()
            .perform_aml_check(&profile())
            .expect_err("should fail on 500");

        match err.current_context() {
            ConnectError::AmlCheckFailed { message, .. } => {
                assert_eq!(message, "Error - Server responded with 500");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.current_context().is_server_error());
    }

    #[test]
    fn test_aml_error_with_code_only() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(401, r#"{"code":"UNAUTHORIZED"}"#);

        let err = create_test_client(&mock)
            .aml()
            .perform_aml_check(&profile())
            .expect_err("should fail on 401");
        assert!(err
            .current_context()
            .to_string()
            .contains("UNAUTHORIZED - Server responded with 401"));
    }

    #[test]
    fn test_aml_success_with_bad_body() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(200, r#"{"on_pep_list":"maybe"}"#);

        let err = create_test_client(&mock)
            .aml()
            .perform_aml_check(&profile())
            .expect_err("should reject malformed result");
        assert!(matches!(
            err.current_context(),
            ConnectError::MalformedResponse { .. }
        ));
    }
}
