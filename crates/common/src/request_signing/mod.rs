//! Request signing and token protection.
//!
//! This module loads the RSA key pair, signs outbound requests over a
//! canonical string, and decrypts inbound connect tokens.

pub mod key_material;
pub mod nonce;
pub mod signing;
pub mod token;

pub use key_material::*;
pub use nonce::*;
pub use signing::*;
pub use token::*;
