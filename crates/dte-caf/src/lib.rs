//! # dte-caf — Folio Authorization Reader
//!
//! Parses authority-issued CAF files (Código de Autorización de Folios)
//! into typed ranges plus the verbatim authorization block, and resolves
//! them per document type through a cached repository.
//!
//! ## Crate Policy
//!
//! - Parsing is pure: no side effects beyond reading the given file.
//! - Node lookup is by local name only; authority files vary in namespace
//!   declarations and must all parse.
//! - The `<CAF>` block is opaque. It is captured as a raw byte slice and
//!   never re-serialized.

pub mod caf;
pub mod repository;

pub use caf::{Caf, CafError, FolioRange};
pub use repository::{CafRepository, CafSource};
