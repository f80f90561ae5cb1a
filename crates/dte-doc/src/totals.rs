//! # Tax Totals Calculator
//!
//! Exact-integer totals with deterministic rounding and a last-line
//! reconciliation adjustment.
//!
//! ## Why Reconciliation Exists
//!
//! Each non-exempt line's net portion is floored independently, and the
//! document-level tax is rounded once over the accumulated net. The two
//! roundings can leave the identity `net + tax + exempt == grand_total`
//! off by a small integer. The difference is applied entirely to the last
//! non-exempt line's net contribution, so the document-level identity the
//! authority validates holds exactly. The adjust-last-eligible-line rule
//! is deliberate and must not be redistributed across lines.

use thiserror::Error;
use tracing::debug;

use dte_core::{round_line_amount, DteError, DteType, Pesos, TotalsShape};

use crate::model::{DocumentTotals, LineItem, LineItemInput, PartyInfo};

/// Errors from totals computation and the nominative guard.
#[derive(Error, Debug)]
pub enum TotalsError {
    /// A document needs at least one line.
    #[error("document has no line items")]
    NoLines,

    /// Line description must be non-empty.
    #[error("line {line}: empty description")]
    EmptyDescription {
        /// Offending 1-based line number.
        line: u32,
    },

    /// Line amount after discount/surcharge must be positive.
    #[error("line {line}: non-positive amount {amount}")]
    InvalidLineAmount {
        /// Offending 1-based line number.
        line: u32,
        /// Computed amount.
        amount: i64,
    },

    /// Exempt document types cannot carry taxed lines.
    #[error("line {line}: taxed line in an exempt document type")]
    TaxedLineInExemptDocument {
        /// Offending 1-based line number.
        line: u32,
    },

    /// High-value receipt without full recipient identification.
    #[error(
        "total {grand_total} exceeds the nominative threshold {threshold} \
         and the recipient is not fully identified"
    )]
    NominativeRequired {
        /// Document grand total.
        grand_total: i64,
        /// Configured threshold.
        threshold: i64,
    },
}

impl From<TotalsError> for DteError {
    fn from(err: TotalsError) -> DteError {
        match err {
            TotalsError::NominativeRequired {
                grand_total,
                threshold,
            } => DteError::NominativeDocumentRequired {
                grand_total,
                threshold,
            },
            other => DteError::Assembly(other.to_string()),
        }
    }
}

/// Compute resolved lines and document totals for `document_type`.
pub fn compute(
    document_type: DteType,
    lines: &[LineItemInput],
    tax_rate_percent: u32,
) -> Result<(Vec<LineItem>, DocumentTotals), TotalsError> {
    if lines.is_empty() {
        return Err(TotalsError::NoLines);
    }
    let shape = document_type.totals_shape();

    let mut resolved = Vec::with_capacity(lines.len());
    let mut grand_total = Pesos::ZERO;
    let mut net = Pesos::ZERO;
    let mut exempt = Pesos::ZERO;
    let mut last_taxed_line: Option<u32> = None;

    for (index, input) in lines.iter().enumerate() {
        let line_number = index as u32 + 1;
        if input.description.trim().is_empty() {
            return Err(TotalsError::EmptyDescription { line: line_number });
        }
        if shape == TotalsShape::ExemptOnly && !input.exempt {
            return Err(TotalsError::TaxedLineInExemptDocument { line: line_number });
        }
        let base = round_line_amount(input.quantity, input.unit_price);
        let amount = base - input.discount.unwrap_or(Pesos::ZERO)
            + input.surcharge.unwrap_or(Pesos::ZERO);
        if amount.amount() <= 0 {
            return Err(TotalsError::InvalidLineAmount {
                line: line_number,
                amount: amount.amount(),
            });
        }

        grand_total += amount;
        if input.exempt {
            exempt += amount;
        } else {
            net += amount.net_of_tax(tax_rate_percent);
            last_taxed_line = Some(line_number);
        }

        resolved.push(LineItem {
            line_number,
            description: input.description.clone(),
            quantity: input.quantity,
            unit_price: input.unit_price,
            discount: input.discount,
            surcharge: input.surcharge,
            exempt: input.exempt,
            line_amount: amount,
        });
    }

    let totals = match shape {
        TotalsShape::GrandTotalOnly => DocumentTotals {
            net: None,
            tax: None,
            tax_rate_percent: None,
            exempt: None,
            grand_total,
        },
        TotalsShape::ExemptOnly => DocumentTotals {
            net: None,
            tax: None,
            tax_rate_percent: None,
            exempt: Some(grand_total),
            grand_total,
        },
        TotalsShape::TaxBreakdown => match last_taxed_line {
            // Breakdown type whose lines are all exempt: exempt-only block.
            None => DocumentTotals {
                net: None,
                tax: None,
                tax_rate_percent: None,
                exempt: Some(grand_total),
                grand_total,
            },
            Some(line) => {
                let tax = net.tax_over_net(tax_rate_percent);
                let delta = grand_total - exempt - net - tax;
                if delta != Pesos::ZERO {
                    debug!(
                        document_type = document_type.code(),
                        delta = delta.amount(),
                        adjusted_line = line,
                        "applied rounding reconciliation to last taxed line"
                    );
                    net += delta;
                }
                DocumentTotals {
                    net: Some(net),
                    tax: Some(tax),
                    tax_rate_percent: Some(tax_rate_percent),
                    exempt: (exempt != Pesos::ZERO).then_some(exempt),
                    grand_total,
                }
            }
        },
    };

    Ok((resolved, totals))
}

/// High-value guard: consumer receipts over `threshold` must identify the
/// recipient (real tax ID and contact email).
pub fn enforce_nominative(
    document_type: DteType,
    totals: &DocumentTotals,
    recipient: &PartyInfo,
    threshold: i64,
) -> Result<(), TotalsError> {
    if document_type.is_receipt()
        && totals.grand_total.amount() > threshold
        && !recipient.is_fully_identified()
    {
        return Err(TotalsError::NominativeRequired {
            grand_total: totals.grand_total.amount(),
            threshold,
        });
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arbitrary_line() -> impl Strategy<Value = LineItemInput> {
        (1i64..100_000, 1u32..50, any::<bool>()).prop_map(|(price, qty, exempt)| {
            LineItemInput {
                description: "item".into(),
                quantity: qty as f64,
                unit_price: Pesos(price),
                discount: None,
                surcharge: None,
                exempt,
            }
        })
    }

    proptest! {
        /// The document-level identity holds exactly for any mix of
        /// exempt and taxed lines and any per-line rounding.
        #[test]
        fn identity_holds_exactly(
            lines in proptest::collection::vec(arbitrary_line(), 1..20)
        ) {
            let (resolved, totals) = compute(DteType::Factura, &lines, 19).unwrap();
            let line_sum: Pesos = resolved.iter().map(|l| l.line_amount).sum();
            prop_assert_eq!(line_sum, totals.grand_total);
            prop_assert_eq!(totals.reconstructed_total(), totals.grand_total);
        }

        /// Reconciliation keeps the net within one peso per line of the
        /// unadjusted floored sum.
        #[test]
        fn adjustment_stays_small(
            lines in proptest::collection::vec(arbitrary_line(), 1..20)
        ) {
            let (resolved, totals) = compute(DteType::Factura, &lines, 19).unwrap();
            if let Some(net) = totals.net {
                let floored: i64 = resolved
                    .iter()
                    .filter(|l| !l.exempt)
                    .map(|l| l.line_amount.net_of_tax(19).amount())
                    .sum();
                prop_assert!((net.amount() - floored).abs() <= resolved.len() as i64);
            }
        }
    }
}
