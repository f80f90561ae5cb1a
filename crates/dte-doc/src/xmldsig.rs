//! # XML Digital Signature
//!
//! Wraps a document (or a report envelope) in an enveloped
//! `<Signature xmlns="http://www.w3.org/2000/09/xmldsig#">`: a detached
//! reference to the signed node by ID, a SHA-1 digest of that node's
//! canonical bytes, and an RSA-SHA1 signature over the canonical
//! `SignedInfo`.
//!
//! RSA/SHA1 is deprecated everywhere else; the authority's validators
//! require exactly this algorithm family, and protocol compatibility wins.
//!
//! Report envelopes embed the signer's certificate in `KeyInfo`;
//! individual documents carry only the RSA key value.

use rsa::RsaPublicKey;
use tracing::debug;

use dte_core::{DteError, XmlElement};
use dte_crypto::{sha1_digest_base64, verify_base64, RsaSha1Signer};

/// XML digital signature namespace.
pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

const C14N_METHOD: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";
const RSA_SHA1_METHOD: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
const SHA1_METHOD: &str = "http://www.w3.org/2000/09/xmldsig#sha1";

/// Sign the named node inside `root` and append the `Signature` element to
/// `root`'s children.
///
/// The target node is assigned `default_id` when it carries no `ID`
/// attribute. `certificate_b64`, when given, is embedded as
/// `X509Certificate` key info (report envelopes).
pub fn sign_enveloped(
    root: &mut XmlElement,
    target_name: &str,
    default_id: &str,
    signer: &RsaSha1Signer,
    certificate_b64: Option<&str>,
) -> Result<(), DteError> {
    let target = root.find_mut(target_name).ok_or_else(|| {
        DteError::Xml(format!("no {target_name} node to sign in the document tree"))
    })?;
    if target.get_attr("ID").is_none() {
        target.set_attr("ID", default_id);
    }
    let id = target
        .get_attr("ID")
        .unwrap_or(default_id)
        .to_string();
    let digest = sha1_digest_base64(&target.canonical());

    let signed_info = XmlElement::new("SignedInfo")
        .child(XmlElement::new("CanonicalizationMethod").attr("Algorithm", C14N_METHOD))
        .child(XmlElement::new("SignatureMethod").attr("Algorithm", RSA_SHA1_METHOD))
        .child(
            XmlElement::new("Reference")
                .attr("URI", format!("#{id}"))
                .child(XmlElement::new("DigestMethod").attr("Algorithm", SHA1_METHOD))
                .text("DigestValue", &digest),
        );

    let signature_value = signer
        .sign_base64(&signed_info.canonical())
        .map_err(DteError::from)?;

    let mut key_info = XmlElement::new("KeyInfo").child(
        XmlElement::new("KeyValue").child(
            XmlElement::new("RSAKeyValue")
                .text("Modulus", signer.modulus_base64())
                .text("Exponent", signer.exponent_base64()),
        ),
    );
    if let Some(cert) = certificate_b64 {
        key_info =
            key_info.child(XmlElement::new("X509Data").text("X509Certificate", cert));
    }

    root.push_child(
        XmlElement::new("Signature")
            .attr("xmlns", XMLDSIG_NS)
            .child(signed_info)
            .child(XmlElement::new("SignatureValue").content(signature_value))
            .child(key_info),
    );
    debug!(target = target_name, id = %id, "applied enveloped signature");
    Ok(())
}

/// Verify an enveloped signature produced by [`sign_enveloped`]: the
/// reference must resolve to a node whose canonical digest matches, and
/// the signature must verify over the canonical `SignedInfo`.
pub fn verify_enveloped(root: &XmlElement, public_key: &RsaPublicKey) -> Result<(), DteError> {
    let signature = root
        .find("Signature")
        .ok_or_else(|| DteError::Xml("no Signature element".into()))?;
    let signed_info = signature
        .find("SignedInfo")
        .ok_or_else(|| DteError::Xml("no SignedInfo element".into()))?;
    let reference = signed_info
        .find("Reference")
        .ok_or_else(|| DteError::Xml("no Reference element".into()))?;
    let uri = reference
        .get_attr("URI")
        .ok_or_else(|| DteError::Xml("Reference has no URI".into()))?;
    let id = uri
        .strip_prefix('#')
        .ok_or_else(|| DteError::Xml(format!("unsupported reference URI {uri:?}")))?;

    let target = find_by_id(root, id)
        .ok_or_else(|| DteError::Xml(format!("reference target {id:?} not found")))?;
    let expected_digest = reference
        .find("DigestValue")
        .map(|d| d.text_content())
        .ok_or_else(|| DteError::Xml("no DigestValue element".into()))?;
    let actual_digest = sha1_digest_base64(&target.canonical());
    if actual_digest != expected_digest {
        return Err(DteError::Signing(format!(
            "digest mismatch for node {id:?}: signed content was modified"
        )));
    }

    let signature_value = signature
        .find("SignatureValue")
        .map(|s| s.text_content())
        .ok_or_else(|| DteError::Xml("no SignatureValue element".into()))?;
    verify_base64(&signed_info.canonical(), &signature_value, public_key)
        .map_err(DteError::from)
}

/// First element (excluding the signature itself) carrying `ID == id`.
fn find_by_id<'a>(element: &'a XmlElement, id: &str) -> Option<&'a XmlElement> {
    if element.name() != "Signature" && element.get_attr("ID") == Some(id) {
        return Some(element);
    }
    element
        .child_elements()
        .filter(|el| el.name() != "Signature")
        .find_map(|el| find_by_id(el, id))
}
