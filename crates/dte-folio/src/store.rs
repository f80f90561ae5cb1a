//! # Folio Counter Stores
//!
//! Persistence for the per-document-type high-water mark. The interface is
//! an explicit compare-and-advance: a store only moves a counter forward
//! when the caller's view of the current value still holds, which makes a
//! lost-update between two allocators a detected conflict rather than a
//! duplicated folio.
//!
//! ## Audit Trail
//!
//! Counters are created lazily on first advance and never deleted, even
//! when a range is exhausted and replaced. The JSON store keeps every
//! type's last issued folio for the life of the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use thiserror::Error;

use dte_core::{DteError, DteType};

/// Errors from counter persistence.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing file could not be read or written.
    #[error("counter store io failure at {path}: {source}")]
    Io {
        /// Store file path.
        path: String,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// Backing file exists but does not parse.
    #[error("counter store at {path} is corrupt: {detail}")]
    Corrupt {
        /// Store file path.
        path: String,
        /// Parse failure detail.
        detail: String,
    },
}

impl From<StoreError> for DteError {
    fn from(err: StoreError) -> DteError {
        DteError::Store(err.to_string())
    }
}

/// Persistent high-water marks, one per document type.
///
/// `compare_and_advance` is the only mutation. `expected` is the caller's
/// view of the current counter (`None` = no counter exists yet); the store
/// returns `Ok(false)` without mutating when that view is stale.
pub trait FolioCounterStore: Send + Sync {
    /// Last issued folio for `document_type`, or `None` before the first
    /// allocation.
    fn last_issued(&self, document_type: DteType) -> Result<Option<i64>, StoreError>;

    /// Atomically set the counter to `next` if it still equals `expected`.
    fn compare_and_advance(
        &self,
        document_type: DteType,
        expected: Option<i64>,
        next: i64,
    ) -> Result<bool, StoreError>;
}

/// In-memory store for tests and single-process embedding.
#[derive(Default)]
pub struct MemoryFolioStore {
    counters: RwLock<HashMap<u16, i64>>,
}

impl MemoryFolioStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FolioCounterStore for MemoryFolioStore {
    fn last_issued(&self, document_type: DteType) -> Result<Option<i64>, StoreError> {
        Ok(self.counters.read().get(&document_type.code()).copied())
    }

    fn compare_and_advance(
        &self,
        document_type: DteType,
        expected: Option<i64>,
        next: i64,
    ) -> Result<bool, StoreError> {
        let mut counters = self.counters.write();
        let current = counters.get(&document_type.code()).copied();
        if current != expected {
            return Ok(false);
        }
        counters.insert(document_type.code(), next);
        Ok(true)
    }
}

/// JSON-file-backed store. The whole counter map is rewritten through a
/// temp file and an atomic rename on every advance, so a crash mid-write
/// leaves the previous consistent state on disk.
#[derive(Debug)]
pub struct JsonFolioStore {
    path: PathBuf,
    counters: RwLock<HashMap<u16, i64>>,
}

impl JsonFolioStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let counters = match std::fs::read_to_string(&path) {
            Ok(raw) => parse_counters(&raw).map_err(|detail| StoreError::Corrupt {
                path: path.display().to_string(),
                detail,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        Ok(Self {
            path,
            counters: RwLock::new(counters),
        })
    }

    fn persist(&self, counters: &HashMap<u16, i64>) -> Result<(), StoreError> {
        let as_strings: HashMap<String, i64> = counters
            .iter()
            .map(|(code, last)| (code.to_string(), *last))
            .collect();
        let json = serde_json::to_string_pretty(&as_strings).map_err(|e| StoreError::Corrupt {
            path: self.path.display().to_string(),
            detail: e.to_string(),
        })?;
        let tmp = self.path.with_extension("tmp");
        let io_err = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    /// Store file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FolioCounterStore for JsonFolioStore {
    fn last_issued(&self, document_type: DteType) -> Result<Option<i64>, StoreError> {
        Ok(self.counters.read().get(&document_type.code()).copied())
    }

    fn compare_and_advance(
        &self,
        document_type: DteType,
        expected: Option<i64>,
        next: i64,
    ) -> Result<bool, StoreError> {
        let mut counters = self.counters.write();
        let current = counters.get(&document_type.code()).copied();
        if current != expected {
            return Ok(false);
        }
        let mut updated = counters.clone();
        updated.insert(document_type.code(), next);
        // Disk first: if the rename fails the in-memory view stays at the
        // last persisted value.
        self.persist(&updated)?;
        *counters = updated;
        Ok(true)
    }
}

fn parse_counters(raw: &str) -> Result<HashMap<u16, i64>, String> {
    let as_strings: HashMap<String, i64> =
        serde_json::from_str(raw).map_err(|e| e.to_string())?;
    let mut counters = HashMap::with_capacity(as_strings.len());
    for (code, last) in as_strings {
        let code: u16 = code
            .parse()
            .map_err(|_| format!("non-numeric document type key {code:?}"))?;
        counters.insert(code, last);
    }
    Ok(counters)
}
