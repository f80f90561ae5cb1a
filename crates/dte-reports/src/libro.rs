//! # Libro de Boletas
//!
//! The monthly receipts ledger. Unlike the other reports, voided documents
//! are not folded into per-type summaries: they get their own top-level
//! `Anulados` block listing each voided document individually.

use tracing::info;

use dte_core::{DteError, DteType, SiiDate, SiiTimestamp, XmlElement};

use crate::report::ReportContext;
use crate::store::DocumentStore;
use crate::summary::summarize;

/// Build and sign the monthly ledger over `from..=to`. The tax period
/// (`PeriodoTributario`) is derived from `from`.
pub fn build_libro_boletas(
    ctx: &ReportContext<'_>,
    store: &dyn DocumentStore,
    from: SiiDate,
    to: SiiDate,
    types: &[DteType],
) -> Result<Vec<u8>, DteError> {
    Ok(libro_tree(ctx, store, from, to, types)?.render_document())
}

fn libro_tree(
    ctx: &ReportContext<'_>,
    store: &dyn DocumentStore,
    from: SiiDate,
    to: SiiDate,
    types: &[DteType],
) -> Result<XmlElement, DteError> {
    let documents = store.documents_in_range(from, to)?;
    let summaries = summarize(&documents, types);
    let period = from.period();

    let caratula = XmlElement::new("Caratula")
        .text("RutEmisor", ctx.config.issuer.rut)
        .text("RutEnvia", ctx.config.issuer.rut)
        .text("PeriodoTributario", &period)
        .text("FchResol", ctx.config.resolution.date)
        .text("NroResol", ctx.config.resolution.number)
        .text("TipoLibro", "MENSUAL")
        .text("TipoEnvio", "TOTAL");

    let mut resumen_periodo = XmlElement::new("ResumenPeriodo");
    for summary in &summaries {
        resumen_periodo.push_child(
            XmlElement::new("TotalesPeriodo")
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
                ),
        );
    }

    // Voided documents are a block of their own, one entry each.
    let mut anulados = XmlElement::new("Anulados");
    let mut voided_count = 0usize;
    for doc in documents.iter().filter(|d| d.voided) {
        voided_count += 1;
        anulados.push_child(
            XmlElement::new("DetalleAnulado")
                .text("TipoDocumento", doc.document_type.code())
                .text("Folio", doc.folio)
                .text("FchEmis", doc.issue_date),
        );
    }

    let envelope_id = format!("LB-{period}");
    let mut envio = XmlElement::new("EnvioLibro")
        .attr("ID", envelope_id.clone())
        .child(caratula)
        .child(resumen_periodo);
    if voided_count > 0 {
        envio.push_child(anulados);
    }
    envio.push_child(XmlElement::new("TmstFirma").content(SiiTimestamp::now().to_string()));

    let mut root = XmlElement::new("LibroBoleta")
        .attr("xmlns", "http://www.sii.cl/SiiDte")
        .attr("version", "1.0")
        .child(envio);
    ctx.sign_envelope(&mut root, "EnvioLibro", &envelope_id)?;
    info!(
        period = %period,
        document_count = documents.len(),
        voided_count,
        "built monthly receipts ledger"
    );
    Ok(root)
}
