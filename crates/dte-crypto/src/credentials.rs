//! # Signing Credentials
//!
//! Loads the taxpayer's RSA key and certificate from a PKCS#12 container.
//! The container MAC is verified against the configured password before
//! any bag is opened, so a wrong password surfaces as
//! [`CryptoError::BadPassword`] rather than as garbage key bytes.
//!
//! Private key material is never serialized or logged: `SigningCredentials`
//! does not implement `Serialize`, and its `Debug` output redacts the key.

use std::path::Path;

use rsa::pkcs8::DecodePrivateKey;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::CryptoError;

/// The taxpayer's signing key plus the certificate it was issued with.
pub struct SigningCredentials {
    private_key: RsaPrivateKey,
    certificate_der: Option<Vec<u8>>,
}

impl SigningCredentials {
    /// Load credentials from a PKCS#12 file.
    pub fn from_pkcs12_file(path: &Path, password: &str) -> Result<Self, CryptoError> {
        let der = std::fs::read(path).map_err(|_| CryptoError::CertificateUnavailable {
            path: path.display().to_string(),
        })?;
        Self::from_pkcs12_der(&der, password).map_err(|err| match err {
            // A container that will not even parse is indistinguishable
            // from an unreadable file to the operator: same remedy.
            CryptoError::Malformed(detail) => CryptoError::CertificateUnavailable {
                path: format!("{} ({detail})", path.display()),
            },
            other => other,
        })
    }

    /// Load credentials from in-memory PKCS#12 bytes.
    pub fn from_pkcs12_der(der: &[u8], password: &str) -> Result<Self, CryptoError> {
        let pfx = p12::PFX::parse(der)
            .map_err(|e| CryptoError::Malformed(format!("container parse: {e:?}")))?;
        if !pfx.verify_mac(password) {
            return Err(CryptoError::BadPassword);
        }
        let key_der = pfx
            .key_bags(password)
            .map_err(|_| CryptoError::BadPassword)?
            .into_iter()
            .next()
            .ok_or_else(|| CryptoError::Malformed("no private key bag".into()))?;
        let private_key = RsaPrivateKey::from_pkcs8_der(&key_der)
            .map_err(|e| CryptoError::Malformed(format!("private key: {e}")))?;
        let certificate_der = pfx
            .cert_x509_bags(password)
            .map_err(|_| CryptoError::BadPassword)?
            .into_iter()
            .next();
        Ok(Self {
            private_key,
            certificate_der,
        })
    }

    /// Build credentials directly from key material (embedded deployments
    /// and test fixtures).
    pub fn from_key(private_key: RsaPrivateKey, certificate_der: Option<Vec<u8>>) -> Self {
        Self {
            private_key,
            certificate_der,
        }
    }

    /// The RSA private key.
    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// The corresponding public key.
    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey::from(&self.private_key)
    }

    /// DER bytes of the signer's certificate, when the container carried
    /// one.
    pub fn certificate_der(&self) -> Option<&[u8]> {
        self.certificate_der.as_deref()
    }
}

impl std::fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("private_key", &"<private>")
            .field(
                "certificate_der_len",
                &self.certificate_der.as_ref().map(|d| d.len()),
            )
            .finish()
    }
}
