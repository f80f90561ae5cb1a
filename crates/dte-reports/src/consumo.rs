//! # Consumo de Folios
//!
//! The folio-consumption report: reconciles emitted, voided, and unused
//! folios per document type over a date range, inside a signed envelope.
//! A period with no activity still produces a valid report with
//! zero-count summaries for every requested type.

use tracing::info;

use dte_core::{DteError, DteType, SiiDate, SiiTimestamp, XmlElement};

use crate::report::{summary_node, ReportContext};
use crate::store::DocumentStore;
use crate::summary::summarize;

/// Build and sign a folio-consumption report over `from..=to`.
pub fn build_consumo_folios(
    ctx: &ReportContext<'_>,
    store: &dyn DocumentStore,
    from: SiiDate,
    to: SiiDate,
    types: &[DteType],
    sequence: u32,
) -> Result<Vec<u8>, DteError> {
    Ok(consumo_tree(ctx, store, from, to, types, sequence)?.render_document())
}

fn consumo_tree(
    ctx: &ReportContext<'_>,
    store: &dyn DocumentStore,
    from: SiiDate,
    to: SiiDate,
    types: &[DteType],
    sequence: u32,
) -> Result<XmlElement, DteError> {
    let documents = store.documents_in_range(from, to)?;
    let summaries = summarize(&documents, types);

    let caratula = XmlElement::new("Caratula")
        .attr("version", "1.0")
        .text("RutEmisor", ctx.config.issuer.rut)
        .text("RutEnvia", ctx.config.issuer.rut)
        .text("FchResol", ctx.config.resolution.date)
        .text("NroResol", ctx.config.resolution.number)
        .text("FchInicio", from)
        .text("FchFinal", to)
        .text("SecEnvio", sequence)
        .text("TmstFirmaEnv", SiiTimestamp::now());

    let envelope_id = format!("CF-{from}-{sequence}");
    let mut documento = XmlElement::new("DocumentoConsumoFolios")
        .attr("ID", envelope_id.clone())
        .child(caratula);
    for summary in &summaries {
        documento.push_child(summary_node("Resumen", summary));
    }

    let mut root = XmlElement::new("ConsumoFolios")
        .attr("xmlns", "http://www.sii.cl/SiiDte")
        .attr("version", "1.0")
        .child(documento);
    ctx.sign_envelope(&mut root, "DocumentoConsumoFolios", &envelope_id)?;
    info!(
        from = %from,
        to = %to,
        document_count = documents.len(),
        summary_count = summaries.len(),
        "built folio consumption report"
    );
    Ok(root)
}
