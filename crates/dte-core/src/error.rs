//! # Error Types — Structured Error Hierarchy
//!
//! Defines the top-level error type shared across the DTE stack. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every failure is an explicit `Result` value. There are no silent
//!   `false`/`None` failure paths, so callers can always distinguish
//!   "nothing to do" from "something is broken".
//! - No error here is retried internally. Each variant is either an operator
//!   configuration problem, a caller input problem, or a protocol-level
//!   cryptographic failure, and the retry policy belongs to the caller.
//! - Component crates define their own local error enums and convert into
//!   `DteError` at the crate boundary.

use thiserror::Error;

/// Top-level error type for the DTE stack.
#[derive(Error, Debug)]
pub enum DteError {
    /// No folio authorization file is configured, readable, or parseable
    /// for the requested document type. Requires a new CAF upload.
    #[error("missing or invalid CAF: {0}")]
    MissingOrInvalidCaf(String),

    /// The authorized folio range is fully consumed. The failed call
    /// performed no state mutation; a new authorization file is required.
    #[error(
        "folio range exhausted for document type {document_type} \
         (authorized {first}..={last}); load a new authorization file"
    )]
    FolioRangeExhausted {
        /// Numeric DTE code whose range ran out.
        document_type: u16,
        /// First authorized folio.
        first: i64,
        /// Last authorized folio.
        last: i64,
    },

    /// A high-value consumer receipt lacks full recipient identification.
    /// The caller must supply the recipient tax ID and contact email.
    #[error(
        "document total {grand_total} exceeds the nominative threshold \
         {threshold}; recipient tax ID and contact email are required"
    )]
    NominativeDocumentRequired {
        /// Grand total that tripped the guard.
        grand_total: i64,
        /// Configured threshold in pesos.
        threshold: i64,
    },

    /// Structurally invalid input: missing required party fields or
    /// malformed line data for the target document type.
    #[error("assembly error: {0}")]
    Assembly(String),

    /// The signing certificate file is absent or unreadable.
    #[error("signing certificate not found or unreadable: {path}")]
    MissingCertificate {
        /// Path that was probed.
        path: String,
    },

    /// The PKCS#12 container could not be unlocked with the configured
    /// password.
    #[error("signing certificate could not be unlocked; check the configured password")]
    InvalidCertificatePassword,

    /// A low-level cryptographic signing call failed. No state was mutated
    /// by the signing stage itself.
    #[error("signing failure: {0}")]
    Signing(String),

    /// Folio counter persistence failed.
    #[error("folio counter store error: {0}")]
    Store(String),

    /// Configuration file invalid or inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// XML parse or construction error.
    #[error("xml error: {0}")]
    Xml(String),

    /// IO error outside the more specific variants above.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustion_message_names_the_remedy() {
        let err = DteError::FolioRangeExhausted {
            document_type: 39,
            first: 100,
            last: 102,
        };
        let msg = err.to_string();
        assert!(msg.contains("document type 39"));
        assert!(msg.contains("load a new authorization file"));
    }

    #[test]
    fn nominative_message_carries_amounts() {
        let err = DteError::NominativeDocumentRequired {
            grand_total: 6_000_000,
            threshold: 5_000_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("6000000"));
        assert!(msg.contains("5000000"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DteError = io.into();
        assert!(matches!(err, DteError::Io(_)));
    }
}
