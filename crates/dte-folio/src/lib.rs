//! # dte-folio — Sequential Folio Allocation
//!
//! Allocates folios from authority-issued ranges with single-writer
//! discipline per document type. The counter is an explicit store behind
//! the [`FolioCounterStore`] trait, mutated only through an atomic
//! compare-and-advance; the [`FolioAllocator`] layers range checks, the
//! lazy seed, and exhaustion detection on top.
//!
//! ## Invariants
//!
//! - Folios are strictly increasing and contiguous from `range.first`.
//! - A counter, once created, never decreases and never exceeds
//!   `range.last`.
//! - Errors mutate nothing; a counter advance that did happen is never
//!   rolled back by a later failure.

pub mod allocator;
pub mod store;

pub use allocator::FolioAllocator;
pub use store::{FolioCounterStore, JsonFolioStore, MemoryFolioStore, StoreError};
