//! # Document Issuance Pipeline
//!
//! The facade wiring the whole flow: allocate a folio, compute totals and
//! assemble, stamp, sign, render. Each stage returns a structured error;
//! nothing is retried here.
//!
//! ## Folio Burn Semantics
//!
//! Allocation commits the counter before any later stage runs. A failure
//! in assembly, stamping, or signing leaves the folio consumed. That
//! mirrors the authority's model (folios are authorizations, not
//! reservations) and is accepted behavior, not a defect.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::info;

use dte_caf::{CafRepository, CafSource};
use dte_core::{DteError, DteType, EmitterConfig, SiiDate, SiiTimestamp};
use dte_crypto::{RsaSha1Signer, SigningCredentials};
use dte_folio::{FolioAllocator, FolioCounterStore, JsonFolioStore};

use crate::assemble::{document_element, Assembler};
use crate::model::{DocumentRequest, DocumentTotals};
use crate::timbre::{embed_ted, TimbreGenerator};
use crate::xmldsig;

/// A finished, signed document.
#[derive(Debug, Clone)]
pub struct SignedDte {
    /// Document type.
    pub document_type: DteType,
    /// Folio the document consumed.
    pub folio: i64,
    /// Issue date.
    pub issue_date: SiiDate,
    /// Document totals.
    pub totals: DocumentTotals,
    /// Signed document bytes (UTF-8 XML), ready for storage or transport.
    pub xml: Vec<u8>,
}

/// Issuer facade over an allocator, a CAF source, and signing credentials.
pub struct DteIssuer<S: FolioCounterStore> {
    config: EmitterConfig,
    caf_source: Arc<dyn CafSource>,
    allocator: FolioAllocator<S>,
    signer: RsaSha1Signer,
}

impl DteIssuer<JsonFolioStore> {
    /// Build an issuer entirely from configuration: file-backed counters,
    /// file-backed CAF repository, PKCS#12 credentials.
    pub fn from_config(config: EmitterConfig) -> Result<Self, DteError> {
        let credentials = SigningCredentials::from_pkcs12_file(
            &config.certificate.path,
            &config.certificate.password,
        )?;
        let store = JsonFolioStore::open(&config.counters_path)?;
        let caf_source: Arc<dyn CafSource> = Arc::new(CafRepository::from_config(&config));
        Ok(Self::new(config, caf_source, store, &credentials))
    }
}

impl<S: FolioCounterStore> DteIssuer<S> {
    /// Build an issuer from explicit parts.
    pub fn new(
        config: EmitterConfig,
        caf_source: Arc<dyn CafSource>,
        store: S,
        credentials: &SigningCredentials,
    ) -> Self {
        let allocator = FolioAllocator::new(Arc::clone(&caf_source), store);
        Self {
            config,
            caf_source,
            allocator,
            signer: RsaSha1Signer::new(credentials),
        }
    }

    /// Issue one document: allocate, assemble, stamp, sign.
    pub fn issue(&self, request: DocumentRequest) -> Result<SignedDte, DteError> {
        let document_type = request.document_type;
        let caf = self.caf_source.caf_for(document_type)?;
        let folio = self.allocator.allocate(document_type)?;

        // From here on the folio is burned even if a stage fails.
        let assembler = Assembler::new(
            &self.config.issuer,
            self.config.tax_rate_percent,
            self.config.nominative_threshold,
        );
        let doc = assembler.assemble(folio, request)?;

        let mut root = document_element(&doc);
        let stamped_at = SiiTimestamp::now();
        let ted = TimbreGenerator::new(&caf, &self.signer)
            .generate(&doc, stamped_at)
            .map_err(DteError::from)?;
        embed_ted(&mut root, ted, stamped_at)?;

        xmldsig::sign_enveloped(
            &mut root,
            "Documento",
            &format!("F{}T{}", folio, document_type.code()),
            &self.signer,
            None,
        )?;

        let xml = root.render_document();
        info!(
            document_type = document_type.code(),
            folio,
            total = doc.totals.grand_total.amount(),
            bytes = xml.len(),
            "issued signed document"
        );
        Ok(SignedDte {
            document_type,
            folio,
            issue_date: doc.issue_date,
            totals: doc.totals,
            xml,
        })
    }

    /// The folio the next issuance of `document_type` would consume,
    /// without consuming it.
    pub fn preview_folio(&self, document_type: DteType) -> Result<i64, DteError> {
        self.allocator.peek(document_type)
    }

    /// The folio allocator (reconciliation flows).
    pub fn allocator(&self) -> &FolioAllocator<S> {
        &self.allocator
    }

    /// The signer bound to the configured credentials (report builders).
    pub fn signer(&self) -> &RsaSha1Signer {
        &self.signer
    }

    /// The emitter configuration.
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }
}

/// Base64 of a DER certificate, as `X509Certificate` elements carry it.
pub fn certificate_base64(credentials: &SigningCredentials) -> Option<String> {
    credentials.certificate_der().map(|der| BASE64.encode(der))
}
