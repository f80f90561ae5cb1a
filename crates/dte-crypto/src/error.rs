//! Crypto-local error kinds, converted to [`DteError`] at the crate
//! boundary. All of these are non-retryable without caller intervention:
//! wrong credentials or broken input, not transient faults.

use thiserror::Error;

use dte_core::DteError;

/// Errors from credential loading and signing.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Certificate file absent or unreadable.
    #[error("certificate unavailable: {path}")]
    CertificateUnavailable {
        /// Path that was probed.
        path: String,
    },

    /// The PKCS#12 container rejected the configured password.
    #[error("PKCS#12 container rejected the password")]
    BadPassword,

    /// The container parsed structure is unusable (no key bag, bad DER).
    #[error("malformed PKCS#12 container: {0}")]
    Malformed(String),

    /// The low-level signing call failed.
    #[error("RSA-SHA1 signing failed: {0}")]
    Signing(String),

    /// Signature bytes did not verify against the given key.
    #[error("signature verification failed: {0}")]
    Verification(String),
}

impl From<CryptoError> for DteError {
    fn from(err: CryptoError) -> DteError {
        match err {
            CryptoError::CertificateUnavailable { path } => {
                DteError::MissingCertificate { path }
            }
            CryptoError::BadPassword => DteError::InvalidCertificatePassword,
            CryptoError::Malformed(detail) => DteError::MissingCertificate {
                path: format!("malformed container ({detail})"),
            },
            CryptoError::Signing(detail) => DteError::Signing(detail),
            CryptoError::Verification(detail) => DteError::Signing(detail),
        }
    }
}
