//! # Timbre — The Electronic Stamp (TED)
//!
//! Builds the fixed-field `DD` summary block for a document, embeds the
//! verbatim CAF authorization block, canonicalizes the whole `DD`, and
//! signs it RSA-SHA1. Any change to the document after stamping produces
//! different canonical bytes and a dead signature; a stamp is regenerated,
//! never patched.
//!
//! ## Field Order
//!
//! `RE, TD, F, FE, RR?, RSR?, MNT, IT1, CAF, TSTED`, fixed. `RR`/`RSR`
//! are omitted only on receipts stamped for the anonymous consumer.

use tracing::debug;

use dte_caf::Caf;
use dte_crypto::{CryptoError, RsaSha1Signer, SIGNATURE_ALGORITHM};
use dte_core::{SiiTimestamp, XmlElement};

use crate::model::DteDocument;

/// Upper-case and truncate to the stamp's 40-character field width.
fn stamp_field(value: &str) -> String {
    value.to_uppercase().chars().take(40).collect()
}

/// Stamp generator over one CAF and one signer.
pub struct TimbreGenerator<'a> {
    caf: &'a Caf,
    signer: &'a RsaSha1Signer,
}

impl<'a> TimbreGenerator<'a> {
    /// New generator.
    pub fn new(caf: &'a Caf, signer: &'a RsaSha1Signer) -> Self {
        Self { caf, signer }
    }

    /// Produce the `<TED>` element for an assembled document.
    pub fn generate(
        &self,
        doc: &DteDocument,
        stamped_at: SiiTimestamp,
    ) -> Result<XmlElement, CryptoError> {
        let mut dd = XmlElement::new("DD")
            .text("RE", doc.issuer.rut)
            .text("TD", doc.document_type.code())
            .text("F", doc.folio)
            .text("FE", doc.issue_date);

        let anonymous = doc.document_type.is_receipt()
            && doc
                .recipient
                .rut
                .is_some_and(|r| r.is_generic_consumer());
        if !anonymous {
            dd = dd
                .opt_text("RR", doc.recipient.rut)
                .opt_text(
                    "RSR",
                    doc.recipient.name.as_deref().map(stamp_field),
                );
        }

        let item_names = doc
            .lines
            .iter()
            .map(|l| l.description.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let dd = dd
            .text("MNT", doc.totals.grand_total)
            .text("IT1", stamp_field(&item_names))
            .verbatim(self.caf.verbatim_block())
            .text("TSTED", stamped_at);

        let canonical = dd.canonical();
        let signature = self.signer.sign_base64(&canonical)?;
        debug!(
            document_type = doc.document_type.code(),
            folio = doc.folio,
            dd_len = canonical.len(),
            "stamped document"
        );

        Ok(XmlElement::new("TED")
            .attr("version", "1.0")
            .child(dd)
            .child(
                XmlElement::new("FRMT")
                    .attr("algoritmo", SIGNATURE_ALGORITHM)
                    .content(signature),
            ))
    }
}

/// Embed a generated stamp into the document tree, after the detail and
/// reference blocks, followed by the signing timestamp.
pub fn embed_ted(
    document_root: &mut XmlElement,
    ted: XmlElement,
    signed_at: SiiTimestamp,
) -> Result<(), dte_core::DteError> {
    let documento = document_root
        .find_mut("Documento")
        .ok_or_else(|| dte_core::DteError::Xml("document tree has no Documento node".into()))?;
    documento.push_child(ted);
    documento.push_child(XmlElement::new("TmstFirma").content(signed_at.to_string()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::{document_element, Assembler};
    use crate::model::{DocumentRequest, LineItemInput, PartyInfo};
    use dte_caf::Caf;
    use dte_core::{DteType, IssuerInfo, Pesos, Rut};
    use dte_crypto::{verify_base64, SigningCredentials};
    use rsa::RsaPrivateKey;

    const CAF_XML: &str = r#"<AUTORIZACION><CAF version="1.0"><DA>
<RE>76354771-K</RE><RS>COMERCIAL LOS ANDES SPA</RS><TD>39</TD>
<RNG><D>100</D><H>200</H></RNG><FA>2024-03-01</FA>
<RSAPK><M>0a1b==</M><E>Aw==</E></RSAPK><IDK>300</IDK>
</DA><FRMA algoritmo="SHA1withRSA">c2ln</FRMA></CAF></AUTORIZACION>"#;

    fn issuer() -> IssuerInfo {
        IssuerInfo {
            rut: Rut::parse("76354771-K").unwrap(),
            name: "Comercial Los Andes SpA".into(),
            activity: "Venta al por menor".into(),
            address: "Av. Providencia 1234".into(),
            municipality: "Providencia".into(),
            city: None,
        }
    }

    fn signer() -> RsaSha1Signer {
        let mut rng = rand::thread_rng();
        let key = RsaPrivateKey::new(&mut rng, 1024).unwrap();
        RsaSha1Signer::new(&SigningCredentials::from_key(key, None))
    }

    fn boleta(folio: i64) -> DteDocument {
        let issuer = issuer();
        let assembler = Assembler::new(&issuer, 19, 5_000_000);
        assembler
            .assemble(
                folio,
                DocumentRequest::new(
                    DteType::Boleta,
                    vec![LineItemInput::taxed("Pan Amasado", 3.0, Pesos(1000))],
                ),
            )
            .unwrap()
    }

    #[test]
    fn stamp_carries_fixed_fields_and_verbatim_caf() {
        let caf = Caf::parse(CAF_XML).unwrap();
        let signer = signer();
        let doc = boleta(100);
        let stamped_at = SiiTimestamp::parse("2026-08-07T12:00:00").unwrap();
        let ted = TimbreGenerator::new(&caf, &signer)
            .generate(&doc, stamped_at)
            .unwrap();

        let dd = ted.find("DD").unwrap();
        assert_eq!(dd.find("RE").unwrap().text_content(), "76354771-K");
        assert_eq!(dd.find("TD").unwrap().text_content(), "39");
        assert_eq!(dd.find("F").unwrap().text_content(), "100");
        assert_eq!(dd.find("MNT").unwrap().text_content(), "3000");
        assert_eq!(dd.find("IT1").unwrap().text_content(), "PAN AMASADO");
        assert_eq!(
            dd.find("TSTED").unwrap().text_content(),
            "2026-08-07T12:00:00"
        );
        // Anonymous receipt: no recipient fields in the stamp.
        assert!(dd.find("RR").is_none());

        let rendered = String::from_utf8(ted.canonical().as_bytes().to_vec()).unwrap();
        assert!(rendered.contains(caf.verbatim_block()));
        assert_eq!(
            ted.find("FRMT").unwrap().get_attr("algoritmo"),
            Some(SIGNATURE_ALGORITHM)
        );
    }

    #[test]
    fn stamp_signature_verifies_over_canonical_dd() {
        let caf = Caf::parse(CAF_XML).unwrap();
        let signer = signer();
        let doc = boleta(101);
        let ted = TimbreGenerator::new(&caf, &signer)
            .generate(&doc, SiiTimestamp::parse("2026-08-07T12:00:00").unwrap())
            .unwrap();

        let dd = ted.find("DD").unwrap();
        let signature = ted.find("FRMT").unwrap().text_content();
        verify_base64(&dd.canonical(), &signature, signer.public_key()).unwrap();
    }

    #[test]
    fn stamp_is_tamper_sensitive() {
        let caf = Caf::parse(CAF_XML).unwrap();
        let signer = signer();
        let doc = boleta(102);
        let ted = TimbreGenerator::new(&caf, &signer)
            .generate(&doc, SiiTimestamp::parse("2026-08-07T12:00:00").unwrap())
            .unwrap();
        let signature = ted.find("FRMT").unwrap().text_content();

        // Same document, one peso more: canonical DD differs, dead stamp.
        let mut altered = ted.find("DD").unwrap().clone();
        altered.find_mut("MNT").unwrap().set_attr("x", "y");
        assert!(
            verify_base64(&altered.canonical(), &signature, signer.public_key()).is_err()
        );
    }

    #[test]
    fn identified_recipient_is_stamped() {
        let caf = Caf::parse(CAF_XML).unwrap();
        let signer = signer();
        let issuer = issuer();
        let assembler = Assembler::new(&issuer, 19, 5_000_000);
        let mut request = DocumentRequest::new(
            DteType::Boleta,
            vec![LineItemInput::taxed("Pan", 1.0, Pesos(1000))],
        );
        request.recipient = Some(PartyInfo {
            rut: Some(Rut::parse("77777777-7").unwrap()),
            name: Some("Cliente de nombre larguísimo que excede el ancho del campo".into()),
            email: Some("c@c.cl".into()),
            ..PartyInfo::default()
        });
        let doc = assembler.assemble(103, request).unwrap();
        let ted = TimbreGenerator::new(&caf, &signer)
            .generate(&doc, SiiTimestamp::parse("2026-08-07T12:00:00").unwrap())
            .unwrap();
        let dd = ted.find("DD").unwrap();
        assert_eq!(dd.find("RR").unwrap().text_content(), "77777777-7");
        let rsr = dd.find("RSR").unwrap().text_content();
        assert_eq!(rsr.chars().count(), 40);
        assert_eq!(rsr, rsr.to_uppercase());
    }

    #[test]
    fn embed_ted_places_stamp_inside_documento() {
        let caf = Caf::parse(CAF_XML).unwrap();
        let signer = signer();
        let doc = boleta(104);
        let stamped_at = SiiTimestamp::parse("2026-08-07T12:00:00").unwrap();
        let ted = TimbreGenerator::new(&caf, &signer)
            .generate(&doc, stamped_at)
            .unwrap();

        let mut root = document_element(&doc);
        embed_ted(&mut root, ted, stamped_at).unwrap();
        let documento = root.find("Documento").unwrap();
        let names: Vec<&str> = documento.child_elements().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["Encabezado", "Detalle", "TED", "TmstFirma"]
        );
    }
}
