//! # dte-core — Foundational Types for the DTE Stack
//!
//! This crate is the bedrock of the stack. It defines the type-system
//! primitives that enforce correctness guarantees at compile time. Every
//! other crate in the workspace depends on `dte-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Rut`, `Pesos`,
//!    `SiiDate`, `SiiTimestamp`: validated constructors, no bare strings
//!    or floats for identifiers and amounts.
//!
//! 2. **`CanonicalXml` newtype.** All digest and signature computation
//!    flows through `XmlElement::canonical()`. There is no other way to
//!    produce the input type the signer accepts.
//!
//! 3. **Single `DteType` enum.** One definition with exhaustive `match`
//!    everywhere. Adding a document type forces every consumer to handle
//!    its totals shape and validation rules.
//!
//! 4. **One structured error hierarchy.** Every failure is a `DteError`
//!    variant a caller can match on; no boolean failure returns.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dte-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod document_type;
pub mod error;
pub mod money;
pub mod rut;
pub mod temporal;
pub mod xml;

// Re-export primary types for ergonomic imports.
pub use config::{
    CertificateConfig, EmitterConfig, Environment, IssuerInfo, ResolutionInfo,
    DEFAULT_NOMINATIVE_THRESHOLD, DEFAULT_TAX_RATE_PERCENT,
};
pub use document_type::{DteType, TotalsShape};
pub use error::DteError;
pub use money::{round_line_amount, Pesos};
pub use rut::Rut;
pub use temporal::{SiiDate, SiiTimestamp};
pub use xml::{CanonicalXml, XmlElement, XmlNode};
