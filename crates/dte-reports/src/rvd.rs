//! # Resumen de Ventas Diarias (RVD)
//!
//! The daily sales summary: one signed envelope per day, one summary node
//! per document type. A day with no sales still produces a valid report
//! with zero-count summaries for every requested type.

use tracing::info;

use dte_core::{DteError, DteType, SiiDate, SiiTimestamp, XmlElement};

use crate::report::{summary_node, ReportContext};
use crate::store::DocumentStore;
use crate::summary::summarize;

/// Build and sign the sales summary for a single `day`.
pub fn build_rvd(
    ctx: &ReportContext<'_>,
    store: &dyn DocumentStore,
    day: SiiDate,
    types: &[DteType],
    sequence: u32,
) -> Result<Vec<u8>, DteError> {
    Ok(rvd_tree(ctx, store, day, types, sequence)?.render_document())
}

fn rvd_tree(
    ctx: &ReportContext<'_>,
    store: &dyn DocumentStore,
    day: SiiDate,
    types: &[DteType],
    sequence: u32,
) -> Result<XmlElement, DteError> {
    let documents = store.documents_in_range(day, day)?;
    let summaries = summarize(&documents, types);

    let caratula = XmlElement::new("Caratula")
        .attr("version", "1.0")
        .text("RutEmisor", ctx.config.issuer.rut)
        .text("RutEnvia", ctx.config.issuer.rut)
        .text("FchResol", ctx.config.resolution.date)
        .text("NroResol", ctx.config.resolution.number)
        .text("FchInicio", day)
        .text("FchFinal", day)
        .text("SecEnvio", sequence)
        .text("TmstFirmaEnv", SiiTimestamp::now());

    let envelope_id = format!("RVD-{day}");
    let mut documento = XmlElement::new("DocumentoRvd")
        .attr("ID", envelope_id.clone())
        .child(caratula);
    for summary in &summaries {
        documento.push_child(summary_node("ResumenDia", summary));
    }

    let mut root = XmlElement::new("ResumenVentasDiarias")
        .attr("version", "1.0")
        .child(documento);
    ctx.sign_envelope(&mut root, "DocumentoRvd", &envelope_id)?;
    info!(
        day = %day,
        document_count = documents.len(),
        summary_count = summaries.len(),
        "built daily sales summary"
    );
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;
    use crate::testutil::{day, stored_doc, test_config, test_signer};
    use dte_doc::verify_enveloped;

    #[test]
    fn aggregates_one_day_only() {
        let config = test_config();
        let signer = test_signer();
        let ctx = ReportContext::new(&config, &signer, Some("Y2VydA==".into()));

        let store = MemoryDocumentStore::new();
        store.append(stored_doc(DteType::Boleta, 1, "2026-08-07", 119, false));
        store.append(stored_doc(DteType::Boleta, 2, "2026-08-07", 238, false));
        // Previous day: outside the report.
        store.append(stored_doc(DteType::Boleta, 3, "2026-08-06", 952, false));

        let tree = rvd_tree(
            &ctx,
            &store,
            day("2026-08-07"),
            &[DteType::Boleta],
            1,
        )
        .unwrap();

        let resumen = tree.find("ResumenDia").unwrap();
        assert_eq!(resumen.find("MntTotal").unwrap().text_content(), "357");
        assert_eq!(resumen.find("FoliosEmitidos").unwrap().text_content(), "2");
        verify_enveloped(&tree, signer.public_key()).unwrap();
    }

    #[test]
    fn credit_notes_reduce_the_day() {
        let config = test_config();
        let signer = test_signer();
        let ctx = ReportContext::new(&config, &signer, None);

        let store = MemoryDocumentStore::new();
        store.append(stored_doc(DteType::Boleta, 1, "2026-08-07", 1190, false));
        store.append(stored_doc(DteType::NotaCredito, 1, "2026-08-07", 119, false));

        let tree = rvd_tree(&ctx, &store, day("2026-08-07"), &[], 1).unwrap();
        let summaries: Vec<&XmlElement> = tree
            .find("DocumentoRvd")
            .unwrap()
            .child_elements()
            .filter(|e| e.name() == "ResumenDia")
            .collect();
        assert_eq!(summaries.len(), 2);
        let nota = summaries
            .iter()
            .find(|s| s.find("TipoDocumento").unwrap().text_content() == "61")
            .unwrap();
        assert_eq!(nota.find("MntTotal").unwrap().text_content(), "-119");
    }

    #[test]
    fn empty_day_still_produces_a_report() {
        let config = test_config();
        let signer = test_signer();
        let ctx = ReportContext::new(&config, &signer, None);
        let store = MemoryDocumentStore::new();

        let xml = build_rvd(&ctx, &store, day("2026-08-07"), &[DteType::Boleta], 4).unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains("<DocumentoRvd ID=\"RVD-2026-08-07\">"));
        assert!(xml.contains("<FoliosEmitidos>0</FoliosEmitidos>"));
        assert!(xml.contains("<SecEnvio>4</SecEnvio>"));
    }
}
