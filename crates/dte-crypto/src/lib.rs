//! # dte-crypto — Signing Primitives
//!
//! Provides the cryptographic building blocks the stamp and signature
//! stages need:
//!
//! - **PKCS#12** credential loading with password verification.
//! - **RSA-SHA1** (PKCS#1 v1.5) signing over `CanonicalXml`, the only
//!   accepted input type, enforcing canonicalization correctness.
//! - **SHA-1** digests for signature references.
//!
//! ## Crate Policy
//!
//! - Depends only on `dte-core` internally.
//! - No mocking of cryptographic operations in tests: all tests use real
//!   keys, real SHA-1, real RSA.
//! - Private key material is never serialized, logged, or exposed through
//!   `Debug`.

pub mod credentials;
pub mod error;
pub mod signer;

pub use credentials::SigningCredentials;
pub use error::CryptoError;
pub use signer::{
    sha1_digest, sha1_digest_base64, verify, verify_base64, RsaSha1Signer,
    SIGNATURE_ALGORITHM,
};
