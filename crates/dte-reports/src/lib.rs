//! # dte-reports — Periodic Aggregate Reports
//!
//! Builds the authority's periodic reports from previously issued
//! documents: the daily sales summary (RVD), the folio consumption
//! report (Consumo de Folios), and the monthly receipts ledger (Libro de
//! Boletas).
//!
//! ## Shape
//!
//! Documents are scanned through the [`DocumentStore`] collaborator,
//! partitioned by type, and folio sets are compressed into minimal
//! `(start, end)` ranges. Credit-note amounts are accumulated with a
//! negating sign. Zero-activity periods still produce valid reports;
//! the schema requires the summary nodes either way. Every envelope is
//! signed with the emitter's certificate embedded in the key info.
//!
//! Transmission is out of scope: builders return signed UTF-8 XML bytes
//! and the transport collaborator takes it from there.

pub mod consumo;
pub mod libro;
pub mod ranges;
pub mod report;
pub mod rvd;
pub mod store;
pub mod summary;

#[cfg(test)]
pub(crate) mod testutil;

// ─── Store re-exports ───────────────────────────────────────────────

pub use store::{DocumentStore, IssuedDocument, MemoryDocumentStore};

// ─── Aggregation re-exports ─────────────────────────────────────────

pub use ranges::FolioRanges;
pub use summary::{summarize, PeriodSummary};

// ─── Builder re-exports ─────────────────────────────────────────────

pub use consumo::build_consumo_folios;
pub use libro::build_libro_boletas;
pub use report::ReportContext;
pub use rvd::build_rvd;
