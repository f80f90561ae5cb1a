//! # Document Store Interface
//!
//! The report builders scan previously issued documents through this
//! trait. Persistence itself is an external collaborator; the in-memory
//! implementation here backs tests and embedded use.

use parking_lot::RwLock;

use dte_core::{DteError, DteType, SiiDate};
use dte_doc::DocumentTotals;

/// A stored, issued document as the report builders see it.
#[derive(Debug, Clone)]
pub struct IssuedDocument {
    /// Document type.
    pub document_type: DteType,
    /// Folio.
    pub folio: i64,
    /// Issue date.
    pub issue_date: SiiDate,
    /// Totals as issued.
    pub totals: DocumentTotals,
    /// Whether the document was explicitly voided.
    pub voided: bool,
}

/// Append-only store of issued documents, queryable by date range.
pub trait DocumentStore: Send + Sync {
    /// Documents whose issue date falls in `from..=to`.
    fn documents_in_range(
        &self,
        from: SiiDate,
        to: SiiDate,
    ) -> Result<Vec<IssuedDocument>, DteError>;
}

/// In-memory [`DocumentStore`].
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<Vec<IssuedDocument>>,
}

impl MemoryDocumentStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document record.
    pub fn append(&self, document: IssuedDocument) {
        self.documents.write().push(document);
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn documents_in_range(
        &self,
        from: SiiDate,
        to: SiiDate,
    ) -> Result<Vec<IssuedDocument>, DteError> {
        Ok(self
            .documents
            .read()
            .iter()
            .filter(|d| d.issue_date >= from && d.issue_date <= to)
            .cloned()
            .collect())
    }
}
