#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![doc = include_str!("../README.md")]

/// Counter encoding and dynamic truncation
pub mod codec;

/// Configuration records and field validation
pub mod config;

/// Credential factory and the tagged union over credential kinds
pub mod credential;

/// Error type
pub mod error;

/// Keyed-hash providers
pub mod hmac;

/// HOTP (HMAC-based One-Time Password) generation and verification
pub mod hotp;

/// Shared secrets and their base32 form
pub mod secret;

/// TOTP (Time-based One-Time Password) generation and verification
pub mod totp;

pub use config::{KeyMaterial, OtpConfig, ValidationPolicy};
pub use credential::{Otp, OtpFactory, OtpKind, create_otp};
pub use error::OtpError;
pub use hmac::{HashAlgorithm, HmacProvider, RingHmac};
pub use hotp::{Hotp, Window};
pub use secret::OtpSecret;
pub use totp::Totp;
