// pkgsign-rs: package code-signing primitives
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Certificate capability view for signing and trust decisions.
//!
//! The policy and chain layers never touch a full X.509 parser; they work
//! against this owned record carrying exactly the fields trust decisions
//! need: raw DER, subject/issuer name encodings, serial number, signature
//! algorithm, public key descriptor and the extended-key-usage purposes.
//! Parsing happens once, up front, against untrusted input.

use crate::pem;
use const_oid::ObjectIdentifier;
use x509_parser::public_key::PublicKey;

/// OID for the anyExtendedKeyUsage wildcard purpose (2.5.29.37.0).
pub const OID_ANY_EKU: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.37.0");

/// Result type used by certificate APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type used by certificate APIs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("X.509 parse error: {details}")]
    X509Parse { details: String },
    #[error("trailing data after DER certificate")]
    TrailingDerData,
    #[error("failed to parse extendedKeyUsage extension: {details}")]
    ExtendedKeyUsageParse { details: String },
    #[error("PEM block is not a CERTIFICATE")]
    InvalidPemLabel,
    #[error(transparent)]
    Pem(#[from] pem::Error),
    #[error(transparent)]
    Oid(#[from] const_oid::Error),
}

/// Public key descriptor: the key algorithm plus, for RSA keys, the
/// modulus size used by the key-strength policy gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKeyInfo {
    /// SubjectPublicKeyInfo algorithm OID.
    pub algorithm: ObjectIdentifier,
    /// RSA modulus size in bits; `None` for non-RSA keys.
    pub rsa_modulus_bits: Option<u32>,
}

/// An immutable certificate record parsed from DER.
///
/// Two certificates compare equal exactly when their raw DER encodings are
/// equal; every other field is derived from the DER.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    subject: Vec<u8>,
    issuer: Vec<u8>,
    subject_text: String,
    issuer_text: String,
    serial: Vec<u8>,
    signature_algorithm: ObjectIdentifier,
    public_key: PublicKeyInfo,
    ext_key_usage: Option<Vec<ObjectIdentifier>>,
}

impl Certificate {
    /// Parses a DER-encoded certificate into the capability view.
    /// Trailing bytes after the certificate are rejected.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let (rem, cert) =
            x509_parser::parse_x509_certificate(der).map_err(|e| Error::X509Parse {
                details: e.to_string(),
            })?;
        if !rem.is_empty() {
            return Err(Error::TrailingDerData);
        }

        let signature_algorithm = parse_oid(&cert.signature_algorithm.algorithm.to_id_string())?;

        let spki = &cert.tbs_certificate.subject_pki;
        let public_key = PublicKeyInfo {
            algorithm: parse_oid(&spki.algorithm.algorithm.to_id_string())?,
            rsa_modulus_bits: match spki.parsed() {
                Ok(PublicKey::RSA(rsa)) => Some(modulus_bits(rsa.modulus)),
                _ => None,
            },
        };

        let ext_key_usage = extract_ext_key_usage(&cert)?;

        Ok(Self {
            der: der.to_vec(),
            subject: cert.tbs_certificate.subject.as_raw().to_vec(),
            issuer: cert.tbs_certificate.issuer.as_raw().to_vec(),
            subject_text: cert.tbs_certificate.subject.to_string(),
            issuer_text: cert.tbs_certificate.issuer.to_string(),
            serial: cert.tbs_certificate.raw_serial().to_vec(),
            signature_algorithm,
            public_key,
            ext_key_usage,
        })
    }

    /// Parses a single PEM CERTIFICATE block.
    pub fn from_pem(pem_data: &str) -> Result<Self> {
        let (label, der) = pem::decode(pem_data.as_bytes())?;
        if label != "CERTIFICATE" {
            return Err(Error::InvalidPemLabel);
        }
        Self::from_der(&der)
    }

    /// Parses a PEM bundle of CERTIFICATE blocks, in file order. Used for
    /// trust-root and extra-store files shipped as one concatenated PEM.
    pub fn from_pem_bundle(pem_data: &str) -> Result<Vec<Self>> {
        let mut certificates = Vec::new();
        for (label, der) in pem::decode_all(pem_data.as_bytes())? {
            if label != "CERTIFICATE" {
                return Err(Error::InvalidPemLabel);
            }
            certificates.push(Self::from_der(&der)?);
        }
        Ok(certificates)
    }

    /// Raw DER encoding of the whole certificate.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// DER encoding of the subject Name.
    pub fn subject_der(&self) -> &[u8] {
        &self.subject
    }

    /// DER encoding of the issuer Name.
    pub fn issuer_der(&self) -> &[u8] {
        &self.issuer
    }

    /// Human-readable subject DN, for diagnostics.
    pub fn subject(&self) -> &str {
        &self.subject_text
    }

    /// Human-readable issuer DN, for diagnostics.
    pub fn issuer(&self) -> &str {
        &self.issuer_text
    }

    /// Serial number as the certificate's big-endian INTEGER octets.
    pub fn serial(&self) -> &[u8] {
        &self.serial
    }

    /// Signature algorithm OID of the certificate.
    pub fn signature_algorithm(&self) -> ObjectIdentifier {
        self.signature_algorithm
    }

    /// Public key descriptor.
    pub fn public_key(&self) -> &PublicKeyInfo {
        &self.public_key
    }

    /// Extended-key-usage purposes, or `None` when the certificate has no
    /// EKU extension. Absence is distinct from an empty purpose list: a
    /// certificate without the extension is unrestricted.
    pub fn ext_key_usage(&self) -> Option<&[ObjectIdentifier]> {
        self.ext_key_usage.as_deref()
    }

    /// Whether the certificate is self-issued (subject equals issuer).
    pub fn is_self_issued(&self) -> bool {
        self.subject == self.issuer
    }
}

// extract_ext_key_usage flattens the parsed EKU extension into a purpose
// OID list, keeping the anyExtendedKeyUsage wildcard as its own entry so
// policy checks can treat it explicitly.
fn extract_ext_key_usage(
    cert: &x509_parser::certificate::X509Certificate<'_>,
) -> Result<Option<Vec<ObjectIdentifier>>> {
    let Some(eku) =
        cert.tbs_certificate
            .extended_key_usage()
            .map_err(|e| Error::ExtendedKeyUsageParse {
                details: e.to_string(),
            })?
    else {
        return Ok(None);
    };

    let mut purposes = Vec::new();
    if eku.value.any {
        purposes.push(OID_ANY_EKU);
    }
    if eku.value.server_auth {
        purposes.push(ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.1"));
    }
    if eku.value.client_auth {
        purposes.push(ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.2"));
    }
    if eku.value.code_signing {
        purposes.push(ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.3"));
    }
    if eku.value.email_protection {
        purposes.push(ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.4"));
    }
    if eku.value.time_stamping {
        purposes.push(ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.8"));
    }
    if eku.value.ocsp_signing {
        purposes.push(ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.9"));
    }
    for oid in &eku.value.other {
        purposes.push(parse_oid(&oid.to_id_string())?);
    }
    Ok(Some(purposes))
}

// modulus_bits computes the bit size of an RSA modulus, ignoring the sign
// padding the DER INTEGER encoding may carry.
fn modulus_bits(modulus: &[u8]) -> u32 {
    match modulus.iter().position(|&b| b != 0) {
        Some(first) => {
            let stripped = &modulus[first..];
            stripped.len() as u32 * 8 - stripped[0].leading_zeros()
        }
        None => 0,
    }
}

fn parse_oid(dotted: &str) -> Result<ObjectIdentifier> {
    Ok(ObjectIdentifier::new(dotted)?)
}
