//! # Document Model
//!
//! Typed structures for everything a document carries. The model is
//! validated at construction time by the assembler; downstream stages
//! (stamp, signature) consume it read-only. There are no loose key-value
//! trees anywhere: a missing field is a type error or an assembly error,
//! never an empty string in the output.

use dte_core::{DteType, Pesos, Rut, SiiDate};

/// Caller-supplied line data. Amounts are derived by the totals
/// calculator, never supplied.
#[derive(Debug, Clone)]
pub struct LineItemInput {
    /// Item description (`NmbItem`).
    pub description: String,
    /// Quantity, possibly fractional.
    pub quantity: f64,
    /// Unit price in whole pesos.
    pub unit_price: Pesos,
    /// Line discount in pesos.
    pub discount: Option<Pesos>,
    /// Line surcharge in pesos.
    pub surcharge: Option<Pesos>,
    /// Whether the line is tax-exempt.
    pub exempt: bool,
}

impl LineItemInput {
    /// Simple taxed line.
    pub fn taxed(description: impl Into<String>, quantity: f64, unit_price: Pesos) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            discount: None,
            surcharge: None,
            exempt: false,
        }
    }

    /// Simple exempt line.
    pub fn exempt(description: impl Into<String>, quantity: f64, unit_price: Pesos) -> Self {
        Self {
            exempt: true,
            ..Self::taxed(description, quantity, unit_price)
        }
    }
}

/// A resolved line with its derived amount.
#[derive(Debug, Clone)]
pub struct LineItem {
    /// 1-based line number (`NroLinDet`).
    pub line_number: u32,
    /// Item description.
    pub description: String,
    /// Quantity.
    pub quantity: f64,
    /// Unit price in whole pesos.
    pub unit_price: Pesos,
    /// Line discount.
    pub discount: Option<Pesos>,
    /// Line surcharge.
    pub surcharge: Option<Pesos>,
    /// Tax exemption flag (`IndExe`).
    pub exempt: bool,
    /// Derived line amount (`MontoItem`).
    pub line_amount: Pesos,
}

/// Recipient identity. Which fields are required depends on the document
/// type; the assembler enforces it.
#[derive(Debug, Clone, Default)]
pub struct PartyInfo {
    /// Tax ID.
    pub rut: Option<Rut>,
    /// Legal name (razón social).
    pub name: Option<String>,
    /// Line of business (giro).
    pub activity: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Municipality (comuna).
    pub municipality: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Contact email.
    pub email: Option<String>,
}

impl PartyInfo {
    /// The anonymous consumer stamped on sub-threshold receipts.
    pub fn anonymous_consumer() -> Self {
        Self {
            rut: Some(Rut::generic_consumer()),
            ..Self::default()
        }
    }

    /// Whether the party is identified well enough for a high-value
    /// receipt: a real tax ID plus a contact email.
    pub fn is_fully_identified(&self) -> bool {
        self.rut.is_some_and(|r| !r.is_generic_consumer()) && self.email.is_some()
    }
}

/// Reference code semantics (`CodRef`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReferenceCode {
    /// 1 — voids the referenced document.
    Anula = 1,
    /// 2 — corrects text fields.
    CorrigeTexto = 2,
    /// 3 — corrects amounts.
    CorrigeMonto = 3,
}

impl ReferenceCode {
    /// Numeric wire value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// A citation of another document (credit/debit notes, dispatch guides).
#[derive(Debug, Clone)]
pub struct Reference {
    /// 1-based reference line number (`NroLinRef`).
    pub line_number: u32,
    /// Document-type code of the referenced document (`TpoDocRef`). Not
    /// restricted to DTE codes: order and ticket references are allowed.
    pub referenced_type: u16,
    /// Folio of the referenced document.
    pub referenced_folio: i64,
    /// Issue date of the referenced document.
    pub reference_date: SiiDate,
    /// Reference semantics, when the target is a DTE being modified.
    pub code: Option<ReferenceCode>,
    /// Free-text reason (`RazonRef`).
    pub reason: String,
}

/// Payment terms for invoices (`FmaPago` / `FchVenc`).
#[derive(Debug, Clone)]
pub struct PaymentTerms {
    /// Payment form.
    pub form: PaymentForm,
    /// Due date for credit terms.
    pub due_date: Option<SiiDate>,
}

/// Payment form wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PaymentForm {
    /// 1 — cash.
    Cash = 1,
    /// 2 — credit.
    Credit = 2,
}

impl PaymentForm {
    /// Numeric wire value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// Transport data for dispatch guides.
#[derive(Debug, Clone, Default)]
pub struct DispatchInfo {
    /// Transfer kind (`IndTraslado`): 1 = sale, 2 = internal, etc.
    pub transfer_kind: u8,
    /// Carrier tax ID.
    pub carrier_rut: Option<Rut>,
    /// Vehicle plate.
    pub vehicle_plate: Option<String>,
    /// Destination street address.
    pub destination_address: Option<String>,
    /// Destination municipality.
    pub destination_municipality: Option<String>,
}

/// A logical document request, as the calling application supplies it.
#[derive(Debug, Clone)]
pub struct DocumentRequest {
    /// Target document type.
    pub document_type: DteType,
    /// Issue date; today when absent.
    pub issue_date: Option<SiiDate>,
    /// Recipient; receipts fall back to the anonymous consumer.
    pub recipient: Option<PartyInfo>,
    /// Line items.
    pub lines: Vec<LineItemInput>,
    /// References (required for credit/debit notes).
    pub references: Vec<Reference>,
    /// Invoice payment terms.
    pub payment_terms: Option<PaymentTerms>,
    /// Dispatch-guide transport data.
    pub dispatch: Option<DispatchInfo>,
}

impl DocumentRequest {
    /// Minimal request: type plus lines.
    pub fn new(document_type: DteType, lines: Vec<LineItemInput>) -> Self {
        Self {
            document_type,
            issue_date: None,
            recipient: None,
            lines,
            references: Vec::new(),
            payment_terms: None,
            dispatch: None,
        }
    }
}

/// Document-level totals. Presence of the optional fields follows the
/// document type's totals shape; the identity
/// `net + tax + exempt == grand_total` holds exactly whenever net/tax are
/// present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentTotals {
    /// Net (taxable base) amount.
    pub net: Option<Pesos>,
    /// Tax amount.
    pub tax: Option<Pesos>,
    /// Tax rate percentage applied.
    pub tax_rate_percent: Option<u32>,
    /// Exempt amount.
    pub exempt: Option<Pesos>,
    /// Grand total.
    pub grand_total: Pesos,
}

impl DocumentTotals {
    /// Net + tax + exempt, for identity checks.
    pub fn reconstructed_total(&self) -> Pesos {
        self.net.unwrap_or(Pesos::ZERO)
            + self.tax.unwrap_or(Pesos::ZERO)
            + self.exempt.unwrap_or(Pesos::ZERO)
    }
}

/// A fully assembled (not yet stamped or signed) document.
#[derive(Debug, Clone)]
pub struct DteDocument {
    /// Document type.
    pub document_type: DteType,
    /// Allocated folio.
    pub folio: i64,
    /// Issue date.
    pub issue_date: SiiDate,
    /// Issuer identity.
    pub issuer: dte_core::IssuerInfo,
    /// Recipient identity (resolved; anonymous consumer for receipts).
    pub recipient: PartyInfo,
    /// Resolved lines with derived amounts.
    pub lines: Vec<LineItem>,
    /// Document totals.
    pub totals: DocumentTotals,
    /// References.
    pub references: Vec<Reference>,
    /// Invoice payment terms.
    pub payment_terms: Option<PaymentTerms>,
    /// Dispatch transport data.
    pub dispatch: Option<DispatchInfo>,
}
