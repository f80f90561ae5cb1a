//! # Document Assembler
//!
//! Validates a [`DocumentRequest`] against the target document type and
//! produces the typed [`DteDocument`] plus its unsigned XML tree.
//!
//! ## Per-Type Rules
//!
//! - Invoices, notes, guides and export documents require an identified
//!   recipient (tax ID, name, address, municipality).
//! - Receipts fall back to the anonymous consumer below the nominative
//!   threshold; the high-value guard rejects anonymous receipts above it.
//! - Credit and debit notes must cite at least one reference.
//! - Transport data is emitted only for dispatch guides that carry it;
//!   payment terms only for invoice-family documents that carry them.

use dte_core::{DteError, DteType, IssuerInfo, SiiDate, XmlElement};

use crate::model::{DocumentRequest, DteDocument, LineItem, PartyInfo, Reference};
use crate::totals;

/// Assembler bound to the issuer identity and calculation knobs.
pub struct Assembler<'a> {
    issuer: &'a IssuerInfo,
    tax_rate_percent: u32,
    nominative_threshold: i64,
}

impl<'a> Assembler<'a> {
    /// New assembler.
    pub fn new(issuer: &'a IssuerInfo, tax_rate_percent: u32, nominative_threshold: i64) -> Self {
        Self {
            issuer,
            tax_rate_percent,
            nominative_threshold,
        }
    }

    /// Validate the request and build the document for an already
    /// allocated folio.
    pub fn assemble(
        &self,
        folio: i64,
        request: DocumentRequest,
    ) -> Result<DteDocument, DteError> {
        let document_type = request.document_type;
        let (lines, totals) =
            totals::compute(document_type, &request.lines, self.tax_rate_percent)?;

        let recipient = resolve_recipient(document_type, request.recipient)?;
        totals::enforce_nominative(
            document_type,
            &totals,
            &recipient,
            self.nominative_threshold,
        )?;

        if document_type.requires_reference() && request.references.is_empty() {
            return Err(DteError::Assembly(format!(
                "document type {document_type} requires a reference to the document it modifies"
            )));
        }

        Ok(DteDocument {
            document_type,
            folio,
            issue_date: request.issue_date.unwrap_or_else(SiiDate::today),
            issuer: self.issuer.clone(),
            recipient,
            lines,
            totals,
            references: request.references,
            payment_terms: request.payment_terms,
            dispatch: request.dispatch,
        })
    }
}

fn resolve_recipient(
    document_type: DteType,
    recipient: Option<PartyInfo>,
) -> Result<PartyInfo, DteError> {
    let recipient = match recipient {
        Some(r) => r,
        None if document_type.is_receipt() => PartyInfo::anonymous_consumer(),
        None => {
            return Err(DteError::Assembly(format!(
                "document type {document_type} requires a recipient"
            )))
        }
    };
    if document_type.requires_full_recipient() {
        for (field, present) in [
            ("rut", recipient.rut.is_some()),
            ("name", recipient.name.is_some()),
            ("address", recipient.address.is_some()),
            ("municipality", recipient.municipality.is_some()),
        ] {
            if !present {
                return Err(DteError::Assembly(format!(
                    "document type {document_type} requires the recipient {field}"
                )));
            }
        }
    }
    Ok(recipient)
}

/// Render the unsigned document tree: `<DTE><Documento ID="F{folio}T{type}">…`.
pub fn document_element(doc: &DteDocument) -> XmlElement {
    let mut documento = XmlElement::new("Documento")
        .attr("ID", format!("F{}T{}", doc.folio, doc.document_type.code()))
        .child(header_element(doc));
    for line in &doc.lines {
        documento.push_child(detail_element(line));
    }
    for reference in &doc.references {
        documento.push_child(reference_element(reference));
    }
    XmlElement::new("DTE")
        .attr("version", "1.0")
        .child(documento)
}

fn header_element(doc: &DteDocument) -> XmlElement {
    let mut id_doc = XmlElement::new("IdDoc")
        .text("TipoDTE", doc.document_type.code())
        .text("Folio", doc.folio)
        .text("FchEmis", doc.issue_date);
    if doc.document_type.is_dispatch_guide() {
        if let Some(dispatch) = &doc.dispatch {
            id_doc = id_doc.text("IndTraslado", dispatch.transfer_kind);
        }
    }
    if let Some(terms) = &doc.payment_terms {
        id_doc = id_doc
            .text("FmaPago", terms.form.code())
            .opt_text("FchVenc", terms.due_date);
    }

    let emisor = XmlElement::new("Emisor")
        .text("RUTEmisor", doc.issuer.rut)
        .text("RznSoc", &doc.issuer.name)
        .text("GiroEmis", &doc.issuer.activity)
        .text("DirOrigen", &doc.issuer.address)
        .text("CmnaOrigen", &doc.issuer.municipality)
        .opt_text("CiudadOrigen", doc.issuer.city.as_ref());

    let receptor = XmlElement::new("Receptor")
        .opt_text("RUTRecep", doc.recipient.rut)
        .opt_text("RznSocRecep", doc.recipient.name.as_ref())
        .opt_text("GiroRecep", doc.recipient.activity.as_ref())
        .opt_text("DirRecep", doc.recipient.address.as_ref())
        .opt_text("CmnaRecep", doc.recipient.municipality.as_ref())
        .opt_text("CiudadRecep", doc.recipient.city.as_ref())
        .opt_text("CorreoRecep", doc.recipient.email.as_ref());

    let mut encabezado = XmlElement::new("Encabezado")
        .child(id_doc)
        .child(emisor)
        .child(receptor);

    if doc.document_type.is_dispatch_guide() {
        if let Some(dispatch) = &doc.dispatch {
            encabezado.push_child(
                XmlElement::new("Transporte")
                    .opt_text("Patente", dispatch.vehicle_plate.as_ref())
                    .opt_text("RUTTrans", dispatch.carrier_rut)
                    .opt_text("DirDest", dispatch.destination_address.as_ref())
                    .opt_text("CmnaDest", dispatch.destination_municipality.as_ref()),
            );
        }
    }

    encabezado.push_child(totals_element(doc));
    encabezado
}

fn totals_element(doc: &DteDocument) -> XmlElement {
    XmlElement::new("Totales")
        .opt_text("MntNeto", doc.totals.net)
        .opt_text("MntExe", doc.totals.exempt)
        .opt_text("TasaIVA", doc.totals.tax_rate_percent)
        .opt_text("IVA", doc.totals.tax)
        .text("MntTotal", doc.totals.grand_total)
}

fn detail_element(line: &LineItem) -> XmlElement {
    let mut detalle = XmlElement::new("Detalle").text("NroLinDet", line.line_number);
    if line.exempt {
        detalle = detalle.text("IndExe", 1);
    }
    detalle
        .text("NmbItem", &line.description)
        .text("QtyItem", format_quantity(line.quantity))
        .text("PrcItem", line.unit_price)
        .opt_text("DescuentoMonto", line.discount)
        .opt_text("RecargoMonto", line.surcharge)
        .text("MontoItem", line.line_amount)
}

fn reference_element(reference: &Reference) -> XmlElement {
    XmlElement::new("Referencia")
        .text("NroLinRef", reference.line_number)
        .text("TpoDocRef", reference.referenced_type)
        .text("FolioRef", reference.referenced_folio)
        .text("FchRef", reference.reference_date)
        .opt_text("CodRef", reference.code.map(|c| c.code()))
        .text("RazonRef", &reference.reason)
}

fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{quantity}")
    }
}
