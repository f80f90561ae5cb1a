//! Shared fixtures for the report builder tests.

use std::collections::HashMap;
use std::path::PathBuf;

use dte_core::{
    CertificateConfig, DteType, EmitterConfig, Environment, IssuerInfo, Pesos, ResolutionInfo,
    Rut, SiiDate,
};
use dte_crypto::{RsaSha1Signer, SigningCredentials};
use dte_doc::DocumentTotals;
use rsa::RsaPrivateKey;

use crate::store::IssuedDocument;

pub(crate) fn test_config() -> EmitterConfig {
    EmitterConfig {
        issuer: IssuerInfo {
            rut: Rut::parse("76354771-K").unwrap(),
            name: "Comercial Los Andes SpA".into(),
            activity: "Venta al por menor".into(),
            address: "Av. Providencia 1234".into(),
            municipality: "Providencia".into(),
            city: None,
        },
        certificate: CertificateConfig {
            path: PathBuf::from("unused.p12"),
            password: "unused".into(),
        },
        environment: Environment::Certification,
        caf_files: HashMap::new(),
        counters_path: PathBuf::from("unused.json"),
        nominative_threshold: 5_000_000,
        tax_rate_percent: 19,
        resolution: ResolutionInfo {
            date: SiiDate::parse("2024-03-01").unwrap(),
            number: 80,
        },
    }
}

pub(crate) fn test_signer() -> RsaSha1Signer {
    let mut rng = rand::thread_rng();
    let key = RsaPrivateKey::new(&mut rng, 1024).unwrap();
    RsaSha1Signer::new(&SigningCredentials::from_key(key, None))
}

pub(crate) fn stored_doc(
    document_type: DteType,
    folio: i64,
    date: &str,
    total: i64,
    voided: bool,
) -> IssuedDocument {
    let net = Pesos(total * 100 / 119);
    IssuedDocument {
        document_type,
        folio,
        issue_date: SiiDate::parse(date).unwrap(),
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

pub(crate) fn day(s: &str) -> SiiDate {
    SiiDate::parse(s).unwrap()
}
