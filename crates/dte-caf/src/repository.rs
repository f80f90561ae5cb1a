//! # CAF Repository
//!
//! Resolves the authorization file for a document type from configured
//! paths and caches the parsed result. The cache is explicit: a newly
//! uploaded CAF takes effect through [`CafRepository::reload()`], not
//! through file-watching.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use dte_core::{DteError, DteType, EmitterConfig};

use crate::caf::{Caf, CafError};

/// Source of parsed authorizations, one per document type.
///
/// The allocator consumes the range; the stamp generator consumes the
/// verbatim block. Both come from the same parse.
pub trait CafSource: Send + Sync {
    /// The authorization for `document_type`, or
    /// [`DteError::MissingOrInvalidCaf`].
    fn caf_for(&self, document_type: DteType) -> Result<Arc<Caf>, DteError>;
}

/// File-backed [`CafSource`] with a per-type cache.
pub struct CafRepository {
    paths: HashMap<u16, PathBuf>,
    cache: RwLock<HashMap<u16, Arc<Caf>>>,
}

impl CafRepository {
    /// Repository over an explicit type→path map.
    pub fn new(paths: HashMap<u16, PathBuf>) -> Self {
        Self {
            paths,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Repository over the configured CAF file locations.
    pub fn from_config(config: &EmitterConfig) -> Self {
        Self::new(config.caf_files.clone())
    }

    /// Drop any cached parse for `document_type` and re-read the file.
    pub fn reload(&self, document_type: DteType) -> Result<Arc<Caf>, DteError> {
        self.cache.write().remove(&document_type.code());
        self.caf_for(document_type)
    }

    fn load(&self, document_type: DteType) -> Result<Arc<Caf>, CafError> {
        let code = document_type.code();
        let path = self
            .paths
            .get(&code)
            .ok_or(CafError::NotConfigured {
                document_type: code,
            })?;
        let caf = Caf::from_file(path)?;
        let granted = caf.range().document_type.code();
        if granted != code {
            return Err(CafError::TypeMismatch {
                found: granted,
                requested: code,
            });
        }
        info!(
            document_type = code,
            first = caf.range().first,
            last = caf.range().last,
            "loaded folio authorization"
        );
        Ok(Arc::new(caf))
    }
}

impl CafSource for CafRepository {
    fn caf_for(&self, document_type: DteType) -> Result<Arc<Caf>, DteError> {
        let code = document_type.code();
        if let Some(cached) = self.cache.read().get(&code) {
            return Ok(Arc::clone(cached));
        }
        let caf = self.load(document_type)?;
        self.cache.write().insert(code, Arc::clone(&caf));
        Ok(caf)
    }
}
