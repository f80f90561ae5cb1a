//! # RSA-SHA1 Signing over Canonical XML
//!
//! PKCS#1 v1.5 RSA signatures with SHA-1 digests, exactly as the
//! authority's validators require. The combination is deprecated
//! everywhere else; protocol compatibility overrides that here.
//!
//! ## Canonical-Input Invariant
//!
//! Signing and digesting accept only `&CanonicalXml`. There is no API that
//! signs raw bytes, so every signature in the stack covers bytes produced
//! by the one canonicalization path in `dte-core`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer as _, Verifier as _};
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use sha1::{Digest, Sha1};
use tracing::debug;

use dte_core::CanonicalXml;

use crate::credentials::SigningCredentials;
use crate::error::CryptoError;

/// Algorithm label stamped next to every signature this signer produces.
pub const SIGNATURE_ALGORITHM: &str = "SHA1withRSA";

/// Signer bound to one credential set.
pub struct RsaSha1Signer {
    signing_key: SigningKey<Sha1>,
    public_key: RsaPublicKey,
}

impl RsaSha1Signer {
    /// Signer over the given credentials.
    pub fn new(credentials: &SigningCredentials) -> Self {
        Self {
            signing_key: SigningKey::<Sha1>::new(credentials.private_key().clone()),
            public_key: credentials.public_key(),
        }
    }

    /// Sign canonical XML bytes; raw signature bytes out.
    pub fn sign(&self, data: &CanonicalXml) -> Result<Vec<u8>, CryptoError> {
        let signature = self
            .signing_key
            .try_sign(data.as_bytes())
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        debug!(input_len = data.len(), "produced RSA-SHA1 signature");
        Ok(signature.to_vec())
    }

    /// Sign canonical XML bytes; base64 out, for embedding in an element.
    pub fn sign_base64(&self, data: &CanonicalXml) -> Result<String, CryptoError> {
        Ok(BASE64.encode(self.sign(data)?))
    }

    /// The signer's public key.
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Base64 big-endian modulus, for `RSAKeyValue` key info.
    pub fn modulus_base64(&self) -> String {
        BASE64.encode(self.public_key.n().to_bytes_be())
    }

    /// Base64 big-endian public exponent, for `RSAKeyValue` key info.
    pub fn exponent_base64(&self) -> String {
        BASE64.encode(self.public_key.e().to_bytes_be())
    }
}

impl std::fmt::Debug for RsaSha1Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RsaSha1Signer(<private>)")
    }
}

/// SHA-1 digest of canonical XML bytes.
pub fn sha1_digest(data: &CanonicalXml) -> [u8; 20] {
    Sha1::digest(data.as_bytes()).into()
}

/// SHA-1 digest of canonical XML bytes, base64-encoded for a
/// `DigestValue` element.
pub fn sha1_digest_base64(data: &CanonicalXml) -> String {
    BASE64.encode(sha1_digest(data))
}

/// Verify an RSA-SHA1 signature over canonical XML bytes.
pub fn verify(
    data: &CanonicalXml,
    signature: &[u8],
    public_key: &RsaPublicKey,
) -> Result<(), CryptoError> {
    let signature = Signature::try_from(signature)
        .map_err(|e| CryptoError::Verification(format!("signature encoding: {e}")))?;
    VerifyingKey::<Sha1>::new(public_key.clone())
        .verify(data.as_bytes(), &signature)
        .map_err(|e| CryptoError::Verification(e.to_string()))
}

/// Verify a base64 signature over canonical XML bytes.
pub fn verify_base64(
    data: &CanonicalXml,
    signature_b64: &str,
    public_key: &RsaPublicKey,
) -> Result<(), CryptoError> {
    let raw = BASE64
        .decode(signature_b64.trim())
        .map_err(|e| CryptoError::Verification(format!("base64: {e}")))?;
    verify(data, &raw, public_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dte_core::XmlElement;
    use rsa::RsaPrivateKey;

    fn signer() -> RsaSha1Signer {
        let mut rng = rand::thread_rng();
        let key = RsaPrivateKey::new(&mut rng, 1024).unwrap();
        RsaSha1Signer::new(&SigningCredentials::from_key(key, None))
    }

    fn sample_block() -> XmlElement {
        XmlElement::new("DD")
            .text("RE", "76354771-K")
            .text("TD", 39)
            .text("F", 100)
            .text("MNT", 3000)
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let signer = signer();
        let canonical = sample_block().canonical();
        let signature = signer.sign(&canonical).unwrap();
        verify(&canonical, &signature, signer.public_key()).unwrap();
    }

    #[test]
    fn base64_round_trip() {
        let signer = signer();
        let canonical = sample_block().canonical();
        let b64 = signer.sign_base64(&canonical).unwrap();
        verify_base64(&canonical, &b64, signer.public_key()).unwrap();
    }

    #[test]
    fn any_content_change_breaks_verification() {
        let signer = signer();
        let signature = signer.sign(&sample_block().canonical()).unwrap();
        // One peso more in MNT: different canonical bytes, dead signature.
        let tampered = XmlElement::new("DD")
            .text("RE", "76354771-K")
            .text("TD", 39)
            .text("F", 100)
            .text("MNT", 3001)
            .canonical();
        assert!(verify(&tampered, &signature, signer.public_key()).is_err());
    }

    #[test]
    fn wrong_key_fails_verification() {
        let signer_a = signer();
        let signer_b = signer();
        let canonical = sample_block().canonical();
        let signature = signer_a.sign(&canonical).unwrap();
        assert!(verify(&canonical, &signature, signer_b.public_key()).is_err());
    }

    #[test]
    fn digest_is_stable_and_twenty_bytes() {
        let canonical = sample_block().canonical();
        let a = sha1_digest(&canonical);
        let b = sha1_digest(&canonical);
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
        assert_eq!(sha1_digest_base64(&canonical), BASE64.encode(a));
    }

    #[test]
    fn key_info_parts_are_base64() {
        let signer = signer();
        assert!(BASE64.decode(signer.modulus_base64()).is_ok());
        assert!(BASE64.decode(signer.exponent_base64()).is_ok());
    }

    #[test]
    fn debug_does_not_leak() {
        assert_eq!(format!("{:?}", signer()), "RsaSha1Signer(<private>)");
    }
}
