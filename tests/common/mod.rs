//! Shared fixtures and a payload signer for the integration tests.

#![allow(dead_code)]

use base64::Engine;
use netlicensing_client::wire::{
    c14n::{self, Algorithm},
    xml::{self, Element},
};
use rsa::{pkcs8::DecodePrivateKey, Pkcs1v15Sign, RsaPrivateKey};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

const PLACEHOLDER: &str = "__SIGNATURE_VALUE__";

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

pub fn public_key() -> String {
    fixture("test_public.pem")
}

pub fn other_public_key() -> String {
    fixture("other_public.pem")
}

fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// How [`sign_with`] builds the signature.
#[derive(Debug, Clone)]
pub struct SignOptions<'a> {
    pub canonicalization: Algorithm,
    /// `""` for the whole document or `#id` for an element carrying `Id`.
    pub reference_uri: &'a str,
    /// rsa-sha256/sha256 instead of rsa-sha1/sha1.
    pub sha256: bool,
    /// Appended after the enveloped and canonicalization transforms.
    pub extra_transform: Option<&'a str>,
    /// Announced digest method. The digest itself is still computed with
    /// sha1 or sha256.
    pub digest_uri: Option<&'a str>,
}

impl Default for SignOptions<'_> {
    fn default() -> Self {
        Self {
            canonicalization: Algorithm::Inclusive,
            reference_uri: "",
            sha256: false,
            extra_transform: None,
            digest_uri: None,
        }
    }
}

/// Appends an enveloped rsa-sha1 signature over the whole of `document`,
/// signed with the test key.
pub fn sign(document: &str, algorithm: Algorithm) -> String {
    sign_with(
        document,
        &SignOptions {
            canonicalization: algorithm,
            ..SignOptions::default()
        },
    )
}

/// Appends an enveloped signature to the root of `document`.
pub fn sign_with(document: &str, options: &SignOptions<'_>) -> String {
    let close = document.rfind("</").expect("document has a closing root tag");
    let (head, tail) = document.split_at(close);
    let algorithm = options.canonicalization;

    let (signature_method, digest_method) = if options.sha256 {
        (
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256",
            "http://www.w3.org/2001/04/xmlenc#sha256",
        )
    } else {
        (
            "http://www.w3.org/2000/09/xmldsig#rsa-sha1",
            "http://www.w3.org/2000/09/xmldsig#sha1",
        )
    };
    let extra = options
        .extra_transform
        .map(|uri| format!(r#"<Transform Algorithm="{uri}"></Transform>"#))
        .unwrap_or_default();

    let with_digest = |digest: &str| {
        format!(
            concat!(
                r#"<Signature xmlns="http://www.w3.org/2000/09/xmldsig#"><SignedInfo>"#,
                r#"<CanonicalizationMethod Algorithm="{c14n}"></CanonicalizationMethod>"#,
                r#"<SignatureMethod Algorithm="{signature_method}"></SignatureMethod>"#,
                r#"<Reference URI="{uri}"><Transforms>"#,
                r#"<Transform Algorithm="http://www.w3.org/2000/09/xmldsig#enveloped-signature"></Transform>"#,
                r#"<Transform Algorithm="{c14n}"></Transform>{extra}</Transforms>"#,
                r#"<DigestMethod Algorithm="{digest_method}"></DigestMethod>"#,
                r#"<DigestValue>{digest}</DigestValue></Reference></SignedInfo>"#,
                r#"<SignatureValue>{placeholder}</SignatureValue></Signature>"#,
            ),
            c14n = algorithm.uri(),
            signature_method = signature_method,
            uri = options.reference_uri,
            extra = extra,
            digest_method = options.digest_uri.unwrap_or(digest_method),
            digest = digest,
            placeholder = PLACEHOLDER,
        )
    };
    let hash = |data: &[u8]| -> Vec<u8> {
        if options.sha256 {
            Sha256::digest(data).to_vec()
        } else {
            Sha1::digest(data).to_vec()
        }
    };

    // digest the referenced element with the signature excluded
    let draft = format!("{head}{}{tail}", with_digest(""));
    let root = xml::parse(&draft).expect("draft parses");
    let signature = root.child("Signature").expect("signature element");
    let target = match options.reference_uri.strip_prefix('#') {
        Some(id) => root
            .find(&|el: &Element| el.attr("Id") == Some(id))
            .expect("reference target"),
        None => &root,
    };
    let canonical = c14n::canonicalize(&root, target, Some(signature), algorithm).unwrap();
    let digest = b64(&hash(canonical.as_bytes()));

    let signed = format!("{head}{}{tail}", with_digest(&digest));
    let root = xml::parse(&signed).expect("signed draft parses");
    let signed_info = root
        .child("Signature")
        .and_then(|s| s.child("SignedInfo"))
        .expect("signed info");
    let canonical = c14n::canonicalize(&root, signed_info, None, algorithm).unwrap();

    let key = RsaPrivateKey::from_pkcs8_pem(&fixture("test_private.pem")).expect("private key");
    let padding = if options.sha256 {
        Pkcs1v15Sign::new::<Sha256>()
    } else {
        Pkcs1v15Sign::new::<Sha1>()
    };
    let value = key
        .sign(padding, &hash(canonical.as_bytes()))
        .expect("signing");

    signed.replace(PLACEHOLDER, &b64(&value))
}

/// A validation response for one module, unsigned.
pub fn validation_response(product_module_number: &str, valid: bool, ttl: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<netlicensing xmlns="http://netlicensing.labs64.com/schema/context" ttl="{ttl}">
  <infos/>
  <items>
    <item type="ProductModuleValidation">
      <property name="productModuleNumber">{product_module_number}</property>
      <property name="valid">{valid}</property>
      <property name="productModuleName">Module {product_module_number}</property>
      <property name="licensingModel">TryAndBuy</property>
    </item>
  </items>
</netlicensing>
"#
    )
}
