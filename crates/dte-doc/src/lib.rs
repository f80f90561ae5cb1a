//! # dte-doc — Document Issuance Core
//!
//! Everything between a logical document request and signed XML bytes:
//!
//! - **Model** (`model.rs`): typed document structures, validated at
//!   construction. No loose key-value trees.
//! - **Totals** (`totals.rs`): exact-integer tax arithmetic with the
//!   last-line rounding reconciliation and the high-value nominative
//!   guard.
//! - **Assembler** (`assemble.rs`): per-type validation and the unsigned
//!   XML tree.
//! - **Timbre** (`timbre.rs`): the signed electronic stamp (TED) built
//!   from the CAF authorization block.
//! - **XML-DSig** (`xmldsig.rs`): the enveloped RSA-SHA1 document
//!   signature.
//! - **Issuer** (`issue.rs`): the pipeline facade.
//!
//! ## Invariants
//!
//! - `net + tax + exempt == grand_total` exactly, for every document that
//!   carries a tax breakdown.
//! - Stamp and signature cover canonical bytes only; any post-signing
//!   mutation is detectable.
//! - A document is immutable once signed; stamps are regenerated, never
//!   patched.

pub mod assemble;
pub mod issue;
pub mod model;
pub mod timbre;
pub mod totals;
pub mod xmldsig;

// ─── Model re-exports ───────────────────────────────────────────────

pub use model::{
    DispatchInfo, DocumentRequest, DocumentTotals, DteDocument, LineItem, LineItemInput,
    PartyInfo, PaymentForm, PaymentTerms, Reference, ReferenceCode,
};

// ─── Pipeline re-exports ────────────────────────────────────────────

pub use assemble::{document_element, Assembler};
pub use issue::{certificate_base64, DteIssuer, SignedDte};
pub use timbre::{embed_ted, TimbreGenerator};
pub use totals::TotalsError;
pub use xmldsig::{sign_enveloped, verify_enveloped, XMLDSIG_NS};
