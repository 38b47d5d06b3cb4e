//! Inbound connect token decryption.
//!
//! Tokens arrive URL-safe encoded with `-`, `_` and `,` standing in for `+`,
//! `/` and `=`. The decoded bytes are an RSA PKCS#1 v1.5 ciphertext under the
//! application's public key.

use std::fmt;

use base64::{engine::general_purpose, Engine};
use error_stack::{Report, ResultExt};

use crate::error::ConnectError;

use super::KeyMaterial;

/// An encrypted, URL-safe encoded reference issued by the server.
#[derive(Clone, PartialEq, Eq)]
pub struct OpaqueToken(String);

impl OpaqueToken {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The token rewritten into the standard base64 alphabet.
    #[must_use]
    pub fn to_standard_base64(&self) -> String {
        self.0
            .trim()
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                ',' => '=',
                other => other,
            })
            .collect()
    }
}

impl From<&str> for OpaqueToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OpaqueToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// Tokens are bearer material, keep them out of logs
impl fmt::Debug for OpaqueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueToken({} chars)", self.0.len())
    }
}

pub struct TokenCipher;

impl TokenCipher {
    /// Decrypts a connect token to its plaintext reference.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::TokenDecryptionFailure`] if the token is empty or not
    /// valid base64, the key does not decrypt it, or the plaintext is empty or not UTF-8.
    pub fn decrypt(
        token: &OpaqueToken,
        key: &KeyMaterial,
    ) -> Result<String, Report<ConnectError>> {
        if token.is_empty() {
            return Err(Report::new(ConnectError::TokenDecryptionFailure {
                message: "Token is empty".into(),
            }));
        }

        let ciphertext = decode_token(token)?;

        let plaintext =
            key.decrypt(&ciphertext)
                .change_context(ConnectError::TokenDecryptionFailure {
                    message: "Token could not be decrypted with the configured key".into(),
                })?;

        if plaintext.is_empty() {
            return Err(Report::new(ConnectError::TokenDecryptionFailure {
                message: "Token decrypted to an empty value".into(),
            }));
        }

        let plaintext =
            String::from_utf8(plaintext).change_context(ConnectError::TokenDecryptionFailure {
                message: "Decrypted token is not valid UTF-8".into(),
            })?;

        log::debug!("Decrypted connect token ({} bytes)", plaintext.len());

        Ok(plaintext)
    }
}

fn decode_token(token: &OpaqueToken) -> Result<Vec<u8>, Report<ConnectError>> {
    let standard = token.to_standard_base64();

    general_purpose::STANDARD
        .decode(&standard)
        .or_else(|_| general_purpose::STANDARD_NO_PAD.decode(&standard))
        .change_context(ConnectError::TokenDecryptionFailure {
            message: "Token is not valid base64".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::tests::{
        OTHER_KEY_PEM, TEST_EMPTY_PLAINTEXT_TOKEN, TEST_ENCRYPTED_TOKEN, TEST_KEY_PEM,
        TEST_RECEIPT_TOKEN_PLAINTEXT,
    };

    fn test_key() -> KeyMaterial {
        KeyMaterial::from_pem_text(TEST_KEY_PEM).expect("should parse test key")
    }

    fn assert_token_failure(result: Result<String, Report<ConnectError>>) {
        let err = result.expect_err("should fail to decrypt");
        assert!(
            matches!(
                err.current_context(),
                ConnectError::TokenDecryptionFailure { .. }
            ),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_decrypt_round_trip() {
        let plaintext = TokenCipher::decrypt(&OpaqueToken::from(TEST_ENCRYPTED_TOKEN), &test_key())
            .expect("should decrypt token");
        assert_eq!(plaintext, TEST_RECEIPT_TOKEN_PLAINTEXT);
    }

    #[test]
    fn test_decrypt_without_padding() {
        let unpadded = TEST_ENCRYPTED_TOKEN.trim_end_matches(',');
        let plaintext = TokenCipher::decrypt(&OpaqueToken::from(unpadded), &test_key())
            .expect("should decrypt unpadded token");
        assert_eq!(plaintext, TEST_RECEIPT_TOKEN_PLAINTEXT);
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let other = KeyMaterial::from_pem_text(OTHER_KEY_PEM).expect("should parse other key");
        assert_token_failure(TokenCipher::decrypt(
            &OpaqueToken::from(TEST_ENCRYPTED_TOKEN),
            &other,
        ));
    }

    #[test]
    fn test_empty_plaintext_is_rejected() {
        assert_token_failure(TokenCipher::decrypt(
            &OpaqueToken::from(TEST_EMPTY_PLAINTEXT_TOKEN),
            &test_key(),
        ));
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        let key = test_key();
        for input in ["", "   ", "!!!not base64!!!", "AAAA", "YWJj"] {
            assert_token_failure(TokenCipher::decrypt(&OpaqueToken::from(input), &key));
        }
    }

    #[test]
    fn test_standard_alphabet_conversion() {
        let token = OpaqueToken::from("ab-_cd,,");
        assert_eq!(token.to_standard_base64(), "ab+/cd==");
    }

    #[test]
    fn test_debug_hides_token() {
        let token = OpaqueToken::from(TEST_ENCRYPTED_TOKEN);
        assert!(!format!("{token:?}").contains(TEST_ENCRYPTED_TOKEN));
    }
}
