//! # Period Aggregation
//!
//! Partitions issued documents by type over a date range and produces one
//! [`PeriodSummary`] per type: totals, folio counts, and the three
//! compressed range lists (emitted, voided, unused).
//!
//! Credit-note amounts are accumulated with a negating sign, so aggregate
//! totals reflect net period effect. Voided documents contribute folios to
//! the voided set but nothing to the amounts.

use std::collections::BTreeMap;

use dte_core::{DteType, Pesos};

use crate::ranges::FolioRanges;
use crate::store::IssuedDocument;

/// Per-type aggregation over a report period.
#[derive(Debug, Clone)]
pub struct PeriodSummary {
    /// Document type.
    pub document_type: DteType,
    /// Net total (negated for credit-note types).
    pub net: Pesos,
    /// Tax total (negated for credit-note types).
    pub tax: Pesos,
    /// Exempt total (negated for credit-note types).
    pub exempt: Pesos,
    /// Grand total (negated for credit-note types).
    pub grand_total: Pesos,
    /// Tax rate seen on the documents, when any carried one.
    pub tax_rate_percent: Option<u32>,
    /// Folios of normally emitted documents.
    pub emitted: FolioRanges,
    /// Folios of explicitly voided documents.
    pub voided: FolioRanges,
    /// Folios inside the touched span that were never touched.
    pub unused: FolioRanges,
}

impl PeriodSummary {
    /// A valid zero-activity summary for `document_type`.
    pub fn empty(document_type: DteType) -> Self {
        Self {
            document_type,
            net: Pesos::ZERO,
            tax: Pesos::ZERO,
            exempt: Pesos::ZERO,
            grand_total: Pesos::ZERO,
            tax_rate_percent: None,
            emitted: FolioRanges::default(),
            voided: FolioRanges::default(),
            unused: FolioRanges::default(),
        }
    }
}

/// Aggregate `documents` into one summary per type.
///
/// Types listed in `always_include` get a zero-activity summary even when
/// no document of that type exists in the period; the authority's schema
/// requires the node either way.
pub fn summarize(
    documents: &[IssuedDocument],
    always_include: &[DteType],
) -> Vec<PeriodSummary> {
    let mut by_type: BTreeMap<u16, Vec<&IssuedDocument>> = BTreeMap::new();
    for doc in documents {
        by_type.entry(doc.document_type.code()).or_default().push(doc);
    }
    for doc_type in always_include {
        by_type.entry(doc_type.code()).or_default();
    }

    by_type
        .into_iter()
        .filter_map(|(code, docs)| DteType::from_code(code).map(|t| summarize_type(t, &docs)))
        .collect()
}

fn summarize_type(document_type: DteType, documents: &[&IssuedDocument]) -> PeriodSummary {
    let sign: i64 = if document_type.is_credit_note() { -1 } else { 1 };
    let signed = |amount: Pesos| Pesos(amount.amount() * sign);

    let mut summary = PeriodSummary::empty(document_type);
    let mut emitted_folios = Vec::new();
    let mut voided_folios = Vec::new();

    for doc in documents {
        if doc.voided {
            voided_folios.push(doc.folio);
            continue;
        }
        emitted_folios.push(doc.folio);
        summary.net += signed(doc.totals.net.unwrap_or(Pesos::ZERO));
        summary.tax += signed(doc.totals.tax.unwrap_or(Pesos::ZERO));
        summary.exempt += signed(doc.totals.exempt.unwrap_or(Pesos::ZERO));
        summary.grand_total += signed(doc.totals.grand_total);
        if summary.tax_rate_percent.is_none() {
            summary.tax_rate_percent = doc.totals.tax_rate_percent;
        }
    }

    let mut touched = emitted_folios.clone();
    touched.extend_from_slice(&voided_folios);
    let touched = FolioRanges::compress(&touched);
    summary.unused = gaps_between(&touched);
    summary.emitted = FolioRanges::compress(&emitted_folios);
    summary.voided = FolioRanges::compress(&voided_folios);
    summary
}

/// The untouched gaps strictly inside a compressed touched set.
fn gaps_between(touched: &FolioRanges) -> FolioRanges {
    let mut gaps = Vec::new();
    for window in touched.pairs().windows(2) {
        let (_, prev_end) = window[0];
        let (next_start, _) = window[1];
        gaps.push((prev_end + 1, next_start - 1));
    }
    FolioRanges::from_pairs(gaps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dte_core::SiiDate;
    use dte_doc::DocumentTotals;
    use crate::store::IssuedDocument;

    fn doc(document_type: DteType, folio: i64, total: i64, voided: bool) -> IssuedDocument {
        let net = Pesos(total * 100 / 119);
        IssuedDocument {
            document_type,
            folio,
            issue_date: SiiDate::parse("2026-08-07").unwrap(),
            totals: DocumentTotals {
                net: Some(net),
                tax: Some(Pesos(total) - net),
                tax_rate_percent: Some(19),
                exempt: None,
                grand_total: Pesos(total),
            },
            voided,
        }
    }

    #[test]
    fn partitions_emitted_and_voided_with_gap_accounting() {
        // Emitted {5,6,7,9}, voided {8}: the touched span 5..=9 is dense.
        let docs = vec![
            doc(DteType::Boleta, 5, 119, false),
            doc(DteType::Boleta, 6, 119, false),
            doc(DteType::Boleta, 7, 119, false),
            doc(DteType::Boleta, 8, 119, true),
            doc(DteType::Boleta, 9, 119, false),
        ];
        let summaries = summarize(&docs, &[]);
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.emitted.pairs(), &[(5, 7), (9, 9)]);
        assert_eq!(s.voided.pairs(), &[(8, 8)]);
        assert!(s.unused.is_empty());
        // Voided folio 8 contributes no amounts.
        assert_eq!(s.grand_total, Pesos(119 * 4));
    }

    #[test]
    fn unused_folios_are_the_untouched_gaps() {
        let docs = vec![
            doc(DteType::Boleta, 10, 119, false),
            doc(DteType::Boleta, 14, 119, false),
            doc(DteType::Boleta, 15, 119, false),
            doc(DteType::Boleta, 20, 119, true),
        ];
        let summaries = summarize(&docs, &[]);
        let s = &summaries[0];
        assert_eq!(s.unused.pairs(), &[(11, 13), (16, 19)]);
        assert_eq!(s.emitted.pairs(), &[(10, 10), (14, 15)]);
        assert_eq!(s.voided.pairs(), &[(20, 20)]);
    }

    #[test]
    fn credit_notes_negate_amounts() {
        let docs = vec![
            doc(DteType::Factura, 1, 1190, false),
            doc(DteType::NotaCredito, 1, 119, false),
        ];
        let summaries = summarize(&docs, &[]);
        let factura = summaries
            .iter()
            .find(|s| s.document_type == DteType::Factura)
            .unwrap();
        let nota = summaries
            .iter()
            .find(|s| s.document_type == DteType::NotaCredito)
            .unwrap();
        assert_eq!(factura.grand_total, Pesos(1190));
        assert_eq!(nota.grand_total, Pesos(-119));
        assert_eq!(nota.net, Pesos(-100));
        assert_eq!(nota.tax, Pesos(-19));
    }

    #[test]
    fn zero_activity_summary_is_emitted_for_requested_types() {
        let summaries = summarize(&[], &[DteType::Boleta]);
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.document_type, DteType::Boleta);
        assert_eq!(s.grand_total, Pesos::ZERO);
        assert!(s.emitted.is_empty());
        assert!(s.voided.is_empty());
        assert!(s.unused.is_empty());
    }

    #[test]
    fn types_partition_independently() {
        let docs = vec![
            doc(DteType::Boleta, 1, 119, false),
            doc(DteType::Factura, 1, 1190, false),
        ];
        let summaries = summarize(&docs, &[]);
        assert_eq!(summaries.len(), 2);
        // BTreeMap keying: type 33 before 39.
        assert_eq!(summaries[0].document_type, DteType::Factura);
        assert_eq!(summaries[1].document_type, DteType::Boleta);
    }
}
