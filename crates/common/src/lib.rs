//! Authenticated requests and token protection for the identity connect API.
//!
//! This crate signs every outbound call with the application's RSA key,
//! decrypts the connect tokens handed back by the identity app, and wraps the
//! HTTP endpoints in small service façades.
//!
//! # Modules
//!
//! - [`client`]: The [`client::ConnectClient`] entry point
//! - [`constants`]: Header names, query keys and default URLs
//! - [`error`]: The [`error::ConnectError`] taxonomy
//! - [`executor`]: Signs and dispatches requests over a transport
//! - [`payload`]: Request bodies as signed bytes
//! - [`request`]: Request builder and the signed request tuple
//! - [`request_signing`]: Key material, canonical signing and token decryption
//! - [`response`]: Responses and the shared success/JSON mapping
//! - [`services`]: Profile, AML, share URL, doc scan and sandbox façades
//! - [`settings`]: Configuration loading and validation
//! - [`test_support`]: Fixtures and a recording mock transport
//! - [`transport`]: Blocking and async transport adapters

pub mod client;
pub mod constants;
pub mod error;
pub mod executor;
pub mod payload;
pub mod request;
pub mod request_signing;
pub mod response;
pub mod services;
pub mod settings;
pub mod transport;

pub use client::ConnectClient;
pub use error::ConnectError;
