//! # Emitter Configuration
//!
//! Serde-backed configuration for a document emitter: issuer identity,
//! signing credential location, per-document-type CAF files, operating
//! environment, and the few numeric knobs the calculator needs. Loaded
//! from YAML and validated before any component sees it.
//!
//! The environment flag selects certification vs production endpoints in
//! the transport collaborator; nothing in this core branches on it beyond
//! carrying it through.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document_type::DteType;
use crate::error::DteError;
use crate::rut::Rut;
use crate::temporal::SiiDate;

/// Default nominative threshold in pesos, approximating the statutory
/// UF-denominated ceiling for anonymous consumer receipts.
pub const DEFAULT_NOMINATIVE_THRESHOLD: i64 = 5_000_000;

/// Statutory IVA rate.
pub const DEFAULT_TAX_RATE_PERCENT: u32 = 19;

/// Operating environment. Affects only the transport collaborator's
/// endpoint selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// SII certification (maullin) environment.
    Certification,
    /// SII production (palena) environment.
    Production,
}

impl Environment {
    /// Whether this is the production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Issuer identity as stamped into every document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerInfo {
    /// Issuer RUT.
    pub rut: Rut,
    /// Legal name (razón social).
    pub name: String,
    /// Line of business (giro).
    pub activity: String,
    /// Origin street address.
    pub address: String,
    /// Origin municipality (comuna).
    pub municipality: String,
    /// Origin city, when distinct from the municipality.
    #[serde(default)]
    pub city: Option<String>,
}

/// Location and password of the PKCS#12 signing credential.
#[derive(Clone, Serialize, Deserialize)]
pub struct CertificateConfig {
    /// Path to the `.p12`/`.pfx` container.
    pub path: PathBuf,
    /// Container password.
    pub password: String,
}

impl std::fmt::Debug for CertificateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateConfig")
            .field("path", &self.path)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// SII resolution that authorized this emitter, echoed into report
/// caratulas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionInfo {
    /// Resolution date.
    pub date: SiiDate,
    /// Resolution number (0 in certification).
    pub number: u32,
}

/// Full emitter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Issuer identity.
    pub issuer: IssuerInfo,
    /// Signing credential.
    pub certificate: CertificateConfig,
    /// Operating environment.
    pub environment: Environment,
    /// CAF file per document-type code.
    pub caf_files: HashMap<u16, PathBuf>,
    /// JSON file holding the folio counters.
    pub counters_path: PathBuf,
    /// Receipts at or below this total may stay anonymous.
    #[serde(default = "default_threshold")]
    pub nominative_threshold: i64,
    /// IVA percentage.
    #[serde(default = "default_tax_rate")]
    pub tax_rate_percent: u32,
    /// Authorizing resolution, for report caratulas.
    pub resolution: ResolutionInfo,
}

fn default_threshold() -> i64 {
    DEFAULT_NOMINATIVE_THRESHOLD
}

fn default_tax_rate() -> u32 {
    DEFAULT_TAX_RATE_PERCENT
}

impl EmitterConfig {
    /// Load and validate a configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, DteError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DteError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: EmitterConfig = serde_yaml::from_str(&raw)
            .map_err(|e| DteError::Config(format!("invalid {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Structural validation beyond what serde enforces.
    pub fn validate(&self) -> Result<(), DteError> {
        for (field, value) in [
            ("issuer.name", &self.issuer.name),
            ("issuer.activity", &self.issuer.activity),
            ("issuer.address", &self.issuer.address),
            ("issuer.municipality", &self.issuer.municipality),
        ] {
            if value.trim().is_empty() {
                return Err(DteError::Config(format!("{field} must not be empty")));
            }
        }
        if self.certificate.password.is_empty() {
            return Err(DteError::Config(
                "certificate.password must not be empty".into(),
            ));
        }
        for code in self.caf_files.keys() {
            if DteType::from_code(*code).is_none() {
                return Err(DteError::Config(format!(
                    "caf_files references unknown document type code {code}"
                )));
            }
        }
        if self.nominative_threshold <= 0 {
            return Err(DteError::Config(
                "nominative_threshold must be positive".into(),
            ));
        }
        if self.tax_rate_percent == 0 || self.tax_rate_percent > 50 {
            return Err(DteError::Config(format!(
                "tax_rate_percent {} is outside the plausible range",
                self.tax_rate_percent
            )));
        }
        Ok(())
    }

    /// CAF path for a document type, if configured.
    pub fn caf_path(&self, document_type: DteType) -> Option<&Path> {
        self.caf_files
            .get(&document_type.code())
            .map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
issuer:
  rut: "76354771-K"
  name: "Comercial Los Andes SpA"
  activity: "Venta al por menor"
  address: "Av. Providencia 1234"
  municipality: "Providencia"
  city: "Santiago"
certificate:
  path: "secrets/cert.p12"
  password: "hunter2"
environment: certification
caf_files:
  39: "caf/folios-39.xml"
  33: "caf/folios-33.xml"
counters_path: "state/folios.json"
resolution:
  date: "2024-03-01"
  number: 80
"#;

    #[test]
    fn loads_and_validates_sample() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = EmitterConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.issuer.rut.to_string(), "76354771-K");
        assert_eq!(config.environment, Environment::Certification);
        assert!(!config.environment.is_production());
        assert_eq!(config.nominative_threshold, DEFAULT_NOMINATIVE_THRESHOLD);
        assert_eq!(config.tax_rate_percent, 19);
        assert!(config.caf_path(DteType::Boleta).is_some());
        assert!(config.caf_path(DteType::NotaCredito).is_none());
    }

    #[test]
    fn rejects_unknown_caf_type() {
        let broken = SAMPLE.replace("  39:", "  40:");
        let config: EmitterConfig = serde_yaml::from_str(&broken).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_issuer_rut() {
        let broken = SAMPLE.replace("76354771-K", "76354771-0");
        assert!(serde_yaml::from_str::<EmitterConfig>(&broken).is_err());
    }

    #[test]
    fn rejects_empty_activity() {
        let broken = SAMPLE.replace("\"Venta al por menor\"", "\"  \"");
        let config: EmitterConfig = serde_yaml::from_str(&broken).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = EmitterConfig::from_yaml_file(Path::new("/nonexistent/emitter.yaml"))
            .unwrap_err();
        assert!(matches!(err, DteError::Config(_)));
    }

    #[test]
    fn debug_redacts_certificate_password() {
        let config: EmitterConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let debug = format!("{:?}", config.certificate);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
