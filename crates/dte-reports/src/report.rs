//! # Shared Report Plumbing
//!
//! The signing context every builder uses, plus the per-type summary node
//! shared by the daily summary and the folio consumption report. Report
//! envelopes always embed the signer's certificate when one is available.

use dte_core::{DteError, EmitterConfig, XmlElement};
use dte_crypto::RsaSha1Signer;
use dte_doc::sign_enveloped;

use crate::ranges::FolioRanges;
use crate::summary::PeriodSummary;

/// Issuer configuration and signing material shared by all builders.
pub struct ReportContext<'a> {
    pub(crate) config: &'a EmitterConfig,
    pub(crate) signer: &'a RsaSha1Signer,
    pub(crate) certificate_b64: Option<String>,
}

impl<'a> ReportContext<'a> {
    /// New context. `certificate_b64` is embedded in every envelope's
    /// key info when present.
    pub fn new(
        config: &'a EmitterConfig,
        signer: &'a RsaSha1Signer,
        certificate_b64: Option<String>,
    ) -> Self {
        Self {
            config,
            signer,
            certificate_b64,
        }
    }

    pub(crate) fn sign_envelope(
        &self,
        root: &mut XmlElement,
        target_name: &str,
        default_id: &str,
    ) -> Result<(), DteError> {
        sign_enveloped(
            root,
            target_name,
            default_id,
            self.signer,
            self.certificate_b64.as_deref(),
        )
    }
}

/// One per-type summary node carrying totals, folio counts, and the three
/// compressed range lists.
pub(crate) fn summary_node(tag: &str, summary: &PeriodSummary) -> XmlElement {
    let mut node = XmlElement::new(tag)
        .text("TipoDocumento", summary.document_type.code())
        .text("MntNeto", summary.net)
        .text("MntIva", summary.tax)
        .opt_text("TasaIVA", summary.tax_rate_percent)
        .text("MntExento", summary.exempt)
        .text("MntTotal", summary.grand_total)
        .text("FoliosEmitidos", summary.emitted.count())
        .text("FoliosAnulados", summary.voided.count())
        .text(
            "FoliosUtilizados",
            summary.emitted.count() + summary.voided.count(),
        );
    node = append_range_list(node, "RangoUtilizados", &summary.emitted);
    node = append_range_list(node, "RangoAnulados", &summary.voided);
    append_range_list(node, "RangoNoUtilizados", &summary.unused)
}

fn append_range_list(mut node: XmlElement, tag: &str, ranges: &FolioRanges) -> XmlElement {
    for &(start, end) in ranges.pairs() {
        node.push_child(
            XmlElement::new(tag)
                .text("Inicial", start)
                .text("Final", end),
        );
    }
    node
}
