//! # Folio Allocator
//!
//! Hands out the next unused folio per document type from the authorized
//! CAF range. Allocation is a single-writer critical section per type: a
//! `parking_lot` mutex serializes in-process callers, and the store's
//! compare-and-advance rejects any counter movement the lock holder did
//! not observe.
//!
//! ## Burned Folios
//!
//! A failed downstream stage (assembly, signing) never rolls the counter
//! back. Folios are authorizations, not reservations: once advanced, a
//! folio is consumed even if the document it was meant for is discarded.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use dte_caf::CafSource;
use dte_core::{DteError, DteType};

use crate::store::FolioCounterStore;

/// Remaining-capacity level at which allocation starts warning that a new
/// authorization file will be needed soon.
const EXHAUSTION_WARNING_THRESHOLD: i64 = 10;

/// Per-document-type folio allocator over a [`CafSource`] and a
/// [`FolioCounterStore`].
pub struct FolioAllocator<S: FolioCounterStore> {
    caf_source: Arc<dyn CafSource>,
    store: S,
    locks: Mutex<HashMap<u16, Arc<Mutex<()>>>>,
}

impl<S: FolioCounterStore> FolioAllocator<S> {
    /// New allocator.
    pub fn new(caf_source: Arc<dyn CafSource>, store: S) -> Self {
        Self {
            caf_source,
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Allocate the next folio for `document_type`, persisting the counter.
    ///
    /// Fails with [`DteError::MissingOrInvalidCaf`] before any counter is
    /// created, and with [`DteError::FolioRangeExhausted`] without mutation
    /// once the range is consumed.
    pub fn allocate(&self, document_type: DteType) -> Result<i64, DteError> {
        let lock = self.type_lock(document_type);
        let _guard = lock.lock();

        let caf = self.caf_source.caf_for(document_type)?;
        let range = caf.range();
        let last = self.store.last_issued(document_type)?;
        let next = next_folio(last, range.first);
        if next > range.last {
            return Err(DteError::FolioRangeExhausted {
                document_type: document_type.code(),
                first: range.first,
                last: range.last,
            });
        }
        let advanced = self.store.compare_and_advance(document_type, last, next)?;
        if !advanced {
            // Another writer (outside this process) moved the counter while
            // we held the in-process lock. Refuse rather than guess.
            return Err(DteError::Store(format!(
                "concurrent counter movement detected for document type {}",
                document_type.code()
            )));
        }

        let remaining = range.last - next;
        info!(
            document_type = document_type.code(),
            folio = next,
            remaining,
            "allocated folio"
        );
        if remaining < EXHAUSTION_WARNING_THRESHOLD {
            warn!(
                document_type = document_type.code(),
                remaining, "folio range nearly exhausted; request a new authorization file"
            );
        }
        Ok(next)
    }

    /// The folio the next `allocate` call would return, without consuming
    /// it. Never mutates the counter.
    pub fn peek(&self, document_type: DteType) -> Result<i64, DteError> {
        let lock = self.type_lock(document_type);
        let _guard = lock.lock();

        let caf = self.caf_source.caf_for(document_type)?;
        let range = caf.range();
        let next = next_folio(self.store.last_issued(document_type)?, range.first);
        if next > range.last {
            return Err(DteError::FolioRangeExhausted {
                document_type: document_type.code(),
                first: range.first,
                last: range.last,
            });
        }
        Ok(next)
    }

    /// Out-of-band reconciliation: record `folio` as issued only when it is
    /// exactly the next folio and lies inside the authorized range.
    ///
    /// Returns `Ok(false)` (no mutation) for gaps, replays, and
    /// out-of-range values; errors are reserved for missing CAFs and store
    /// failures.
    pub fn consume(&self, document_type: DteType, folio: i64) -> Result<bool, DteError> {
        let lock = self.type_lock(document_type);
        let _guard = lock.lock();

        let caf = self.caf_source.caf_for(document_type)?;
        let range = caf.range();
        let last = self.store.last_issued(document_type)?;
        if folio != next_folio(last, range.first) || !range.contains(folio) {
            return Ok(false);
        }
        let advanced = self.store.compare_and_advance(document_type, last, folio)?;
        Ok(advanced)
    }

    /// The underlying store (reports and tests).
    pub fn store(&self) -> &S {
        &self.store
    }

    fn type_lock(&self, document_type: DteType) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(
            locks
                .entry(document_type.code())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

/// Next folio given the persisted high-water mark. The counter never sits
/// below `first - 1`: a replacement range with a higher start clamps the
/// effective mark up to its own seed.
fn next_folio(last_issued: Option<i64>, first: i64) -> i64 {
    last_issued.unwrap_or(first - 1).max(first - 1) + 1
}
