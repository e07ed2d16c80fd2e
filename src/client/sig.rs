//! Enveloped XML signature verification for offline validation payloads.
//!
//! The payload carries a `ds:Signature` over the whole document. Every
//! failure surfaces as [`Error::BadSignature`] with the cause as its message.

use crate::{
    err::Error,
    wire::{
        c14n::{self, Algorithm},
        xml::Element,
    },
    Result,
};
use base64::Engine;
use rsa::{pkcs1::DecodeRsaPublicKey, pkcs8::DecodePublicKey, Pkcs1v15Sign, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha256};

pub const DSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HashAlgorithm {
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    fn from_digest_uri(uri: &str) -> Option<Self> {
        match uri {
            "http://www.w3.org/2000/09/xmldsig#sha1" => Some(Self::Sha1),
            "http://www.w3.org/2001/04/xmlenc#sha256" => Some(Self::Sha256),
            _ => None,
        }
    }

    fn from_signature_uri(uri: &str) -> Option<Self> {
        match uri {
            "http://www.w3.org/2000/09/xmldsig#rsa-sha1" => Some(Self::Sha1),
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256" => Some(Self::Sha256),
            _ => None,
        }
    }

    fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => Sha1::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
        }
    }

    fn padding(&self) -> Pkcs1v15Sign {
        match self {
            Self::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
            Self::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        }
    }
}

fn bad(message: impl Into<String>) -> Error {
    Error::BadSignature(message.into())
}

/// Reads an RSA public key from SPKI or PKCS#1 PEM. A bare base64 body
/// without armor is taken as SPKI.
pub fn parse_public_key(pem: &str) -> Result<RsaPublicKey> {
    let pem = pem.trim();
    let armored;
    let pem = if pem.contains("-----BEGIN") {
        pem
    } else {
        armored = armor(pem);
        armored.as_str()
    };

    RsaPublicKey::from_public_key_pem(pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
        .map_err(|e| bad(format!("Failed parsing public key: {e}")))
}

fn armor(body: &str) -> String {
    let body: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    let mut out = String::from("-----BEGIN PUBLIC KEY-----\n");
    // pem lines carry at most 64 characters
    for line in body.as_bytes().chunks(64) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push_str("-----END PUBLIC KEY-----\n");
    out
}

fn decode_base64(text: &str, what: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|_| bad(format!("Failed decoding {what}")))
}

fn algorithm_of<'a>(parent: &'a Element, child: &str) -> Result<&'a str> {
    parent
        .child(child)
        .and_then(|el| el.attr("Algorithm"))
        .ok_or_else(|| bad(format!("Missing {child}")))
}

/// Verifies the signature embedded in `doc` against `public_key`.
pub fn verify(doc: &Element, public_key: &RsaPublicKey) -> Result<()> {
    let signature = doc
        .find(&|el: &Element| {
            el.local_name() == "Signature" && el.namespace.as_deref() == Some(DSIG_NS)
        })
        .ok_or_else(|| bad("Missing Signature element"))?;

    let signed_info = signature
        .child("SignedInfo")
        .ok_or_else(|| bad("Missing SignedInfo"))?;

    let canonicalization = algorithm_of(signed_info, "CanonicalizationMethod")?;
    let canonicalization = Algorithm::from_uri(canonicalization)
        .ok_or_else(|| bad(format!("Unsupported canonicalization: {canonicalization}")))?;

    let signature_method = algorithm_of(signed_info, "SignatureMethod")?;
    let signature_method = HashAlgorithm::from_signature_uri(signature_method)
        .ok_or_else(|| bad(format!("Unsupported signature method: {signature_method}")))?;

    let mut references = signed_info.children_named("Reference").peekable();
    if references.peek().is_none() {
        return Err(bad("Missing Reference"));
    }
    // at least one reference must cover the document element
    let mut covers_document = false;
    for reference in references {
        let target = verify_reference(doc, signature, reference)?;
        covers_document |= std::ptr::eq(target, doc);
    }
    if !covers_document {
        return Err(bad("Signature does not cover the whole document"));
    }

    let canonical = c14n::canonicalize(doc, signed_info, None, canonicalization)
        .ok_or_else(|| bad("SignedInfo is not part of the document"))?;

    let signature_value = signature
        .child("SignatureValue")
        .ok_or_else(|| bad("Missing SignatureValue"))?;
    let signature_value = decode_base64(&signature_value.text(), "SignatureValue")?;

    let hashed = signature_method.digest(canonical.as_bytes());
    public_key
        .verify(signature_method.padding(), &hashed, &signature_value)
        .map_err(|_| bad("Invalid signature"))
}

/// Checks one Reference digest and returns the element it covers.
fn verify_reference<'a>(
    doc: &'a Element,
    signature: &Element,
    reference: &Element,
) -> Result<&'a Element> {
    let uri = reference.attr("URI").unwrap_or_default();

    let target = if uri.is_empty() {
        doc
    } else if let Some(id) = uri.strip_prefix('#') {
        doc.find(&|el: &Element| {
            ["Id", "ID", "id"]
                .iter()
                .any(|name| el.attr(name) == Some(id))
        })
        .ok_or_else(|| bad(format!("Reference target not found: {uri}")))?
    } else {
        return Err(bad(format!("Unsupported reference: {uri}")));
    };

    let mut enveloped = false;
    let mut canonicalization = Algorithm::Inclusive;
    if let Some(transforms) = reference.child("Transforms") {
        for transform in transforms.children_named("Transform") {
            let algorithm = transform.attr("Algorithm").unwrap_or_default();
            if algorithm == ENVELOPED_SIGNATURE {
                enveloped = true;
            } else if let Some(transform) = Algorithm::from_uri(algorithm) {
                canonicalization = transform;
            } else {
                return Err(bad(format!("Unsupported transform: {algorithm}")));
            }
        }
    }

    let excluded = enveloped.then_some(signature);
    let canonical = c14n::canonicalize(doc, target, excluded, canonicalization)
        .ok_or_else(|| bad("Reference target is not part of the document"))?;

    let digest_method = algorithm_of(reference, "DigestMethod")?;
    let digest_method = HashAlgorithm::from_digest_uri(digest_method)
        .ok_or_else(|| bad(format!("Unsupported digest method: {digest_method}")))?;

    let expected = reference
        .child("DigestValue")
        .ok_or_else(|| bad("Missing DigestValue"))?;
    let expected = decode_base64(&expected.text(), "DigestValue")?;

    if digest_method.digest(canonical.as_bytes()) != expected {
        return Err(bad("Digest mismatch"));
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::xml;

    const PUBLIC_KEY: &str = include_str!("../../tests/fixtures/test_public.pem");
    const SIGNED: &str = include_str!("../../tests/fixtures/validation_signed.xml");

    #[test]
    fn accepts_signed_fixture() {
        let key = parse_public_key(PUBLIC_KEY).unwrap();
        let doc = xml::parse(SIGNED).unwrap();
        verify(&doc, &key).unwrap();
    }

    #[test]
    fn bare_base64_key_is_armored() {
        let body: String = PUBLIC_KEY
            .lines()
            .filter(|line| !line.starts_with("-----"))
            .collect();
        let key = parse_public_key(&body).unwrap();
        assert_eq!(key, parse_public_key(PUBLIC_KEY).unwrap());
    }

    #[test]
    fn garbage_key_is_bad_signature() {
        let err = parse_public_key("not a key").unwrap_err();
        assert!(matches!(err, Error::BadSignature(_)));
    }

    #[test]
    fn unsigned_document_is_rejected() {
        let key = parse_public_key(PUBLIC_KEY).unwrap();
        let doc = xml::parse("<netlicensing><items/></netlicensing>").unwrap();
        let err = verify(&doc, &key).unwrap_err();
        assert_eq!(err.to_string(), "Bad signature: Missing Signature element");
    }

    #[test]
    fn changed_digest_value_is_mismatch() {
        let key = parse_public_key(PUBLIC_KEY).unwrap();
        let tampered = SIGNED.replace("vihm4NVbcvNeICCb1N+NTjFqwzQ=", "AAAAAAAAAAAAAAAAAAAAAAAAAAA=");
        let doc = xml::parse(&tampered).unwrap();
        let err = verify(&doc, &key).unwrap_err();
        assert_eq!(err.to_string(), "Bad signature: Digest mismatch");
    }
}
