//! # Document Type Taxonomy
//!
//! One exhaustive enum over the DTE codes this stack issues. Behavior that
//! varies by document type (totals shape, recipient requirements, reference
//! requirements) lives here as methods, so adding a type forces every
//! consumer through an exhaustive `match`.

use serde::{Deserialize, Serialize};

/// Electronic tax document types, tagged with their SII numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum DteType {
    /// 33 — Factura electrónica (taxed invoice).
    Factura = 33,
    /// 34 — Factura no afecta o exenta (exempt invoice).
    FacturaExenta = 34,
    /// 39 — Boleta electrónica (consumer receipt).
    Boleta = 39,
    /// 41 — Boleta exenta (exempt consumer receipt).
    BoletaExenta = 41,
    /// 52 — Guía de despacho electrónica (dispatch guide).
    GuiaDespacho = 52,
    /// 56 — Nota de débito electrónica.
    NotaDebito = 56,
    /// 61 — Nota de crédito electrónica.
    NotaCredito = 61,
    /// 110 — Factura de exportación.
    FacturaExportacion = 110,
    /// 111 — Nota de débito de exportación.
    NotaDebitoExportacion = 111,
    /// 112 — Nota de crédito de exportación.
    NotaCreditoExportacion = 112,
}

/// Which totals block a document type emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsShape {
    /// Net, tax, and (when exempt lines exist) exempt amounts, plus total.
    TaxBreakdown,
    /// The whole amount is exempt; only `MntExe` and `MntTotal` appear.
    ExemptOnly,
    /// Only the grand total appears (export documents).
    GrandTotalOnly,
}

impl DteType {
    /// All document types this stack can issue.
    pub const ALL: [DteType; 10] = [
        DteType::Factura,
        DteType::FacturaExenta,
        DteType::Boleta,
        DteType::BoletaExenta,
        DteType::GuiaDespacho,
        DteType::NotaDebito,
        DteType::NotaCredito,
        DteType::FacturaExportacion,
        DteType::NotaDebitoExportacion,
        DteType::NotaCreditoExportacion,
    ];

    /// The SII numeric code.
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Look up a type by SII code.
    pub fn from_code(code: u16) -> Option<DteType> {
        match code {
            33 => Some(DteType::Factura),
            34 => Some(DteType::FacturaExenta),
            39 => Some(DteType::Boleta),
            41 => Some(DteType::BoletaExenta),
            52 => Some(DteType::GuiaDespacho),
            56 => Some(DteType::NotaDebito),
            61 => Some(DteType::NotaCredito),
            110 => Some(DteType::FacturaExportacion),
            111 => Some(DteType::NotaDebitoExportacion),
            112 => Some(DteType::NotaCreditoExportacion),
            _ => None,
        }
    }

    /// Totals block shape for this type.
    pub fn totals_shape(&self) -> TotalsShape {
        match self {
            DteType::Factura
            | DteType::Boleta
            | DteType::GuiaDespacho
            | DteType::NotaDebito
            | DteType::NotaCredito => TotalsShape::TaxBreakdown,
            DteType::FacturaExenta | DteType::BoletaExenta => TotalsShape::ExemptOnly,
            DteType::FacturaExportacion
            | DteType::NotaDebitoExportacion
            | DteType::NotaCreditoExportacion => TotalsShape::GrandTotalOnly,
        }
    }

    /// Consumer receipts (boletas), subject to the nominative threshold.
    pub fn is_receipt(&self) -> bool {
        matches!(self, DteType::Boleta | DteType::BoletaExenta)
    }

    /// Credit notes negate amounts in period aggregation.
    pub fn is_credit_note(&self) -> bool {
        matches!(self, DteType::NotaCredito | DteType::NotaCreditoExportacion)
    }

    /// Credit and debit notes must reference the document they modify.
    pub fn requires_reference(&self) -> bool {
        matches!(
            self,
            DteType::NotaDebito
                | DteType::NotaCredito
                | DteType::NotaDebitoExportacion
                | DteType::NotaCreditoExportacion
        )
    }

    /// Whether the recipient must be fully identified (tax ID, name,
    /// activity, address, municipality). Receipts accept the generic
    /// consumer below the nominative threshold.
    pub fn requires_full_recipient(&self) -> bool {
        !self.is_receipt()
    }

    /// Dispatch guides may carry a transport block.
    pub fn is_dispatch_guide(&self) -> bool {
        matches!(self, DteType::GuiaDespacho)
    }
}

impl std::fmt::Display for DteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
