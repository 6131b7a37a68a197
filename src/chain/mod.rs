// pkgsign-rs: package code-signing primitives
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Signing policy checks and certificate chain construction.
//!
//! Policy checks are pure predicates: they report whether a certificate is
//! suitable for signing (algorithm allow-list, key strength, extended key
//! usage) and leave it to the caller to decide what an unsuitable
//! certificate aborts. Chain construction is strict: it either produces a
//! complete leaf-first path ending at a self-issued certificate from the
//! caller's trust store, or fails with an error naming what is missing.
//! There is no fallback to a weaker trust policy.

use crate::cert::Certificate;
use const_oid::ObjectIdentifier;
use log::{debug, warn};

/// OID for the code-signing extended key usage (1.3.6.1.5.5.7.3.3).
pub const OID_CODE_SIGNING_EKU: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.3");

/// OID for the Microsoft lifetime-signing extended key usage
/// (1.3.6.1.4.1.311.10.3.13). Certificates carrying it invalidate their
/// signatures at expiry, which defeats trusted timestamping.
pub const OID_LIFETIME_SIGNING_EKU: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.10.3.13");

/// OID for sha256WithRSAEncryption (1.2.840.113549.1.1.11).
pub const OID_SHA256_WITH_RSA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");

/// OID for sha384WithRSAEncryption (1.2.840.113549.1.1.12).
pub const OID_SHA384_WITH_RSA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");

/// OID for sha512WithRSAEncryption (1.2.840.113549.1.1.13).
pub const OID_SHA512_WITH_RSA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");

// Minimum RSA modulus size accepted for PKCS#1 v1.5 signing keys.
const MIN_RSA_KEY_BITS: u32 = 2048;

// Upper bound on chain depth. Also the guard that turns issuer cycles in a
// malicious store into an error instead of an endless walk.
const MAX_CHAIN_LENGTH: usize = 16;

/// Result type used by chain APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type used by chain APIs. An untrusted root is deliberately a
/// different kind than an incomplete path: the first is a trust decision
/// the user must act on, the second a missing certificate.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("certificate chain does not end in a trusted root: {subject}")]
    UntrustedRoot { subject: String },
    #[error("no issuer certificate found for: {subject}")]
    PartialChain { subject: String },
    #[error("certificate chain exceeds maximum depth {0}")]
    ChainTooLong(usize),
}

/// Reports whether the certificate's signature algorithm is on the signing
/// allow-list: RSA with SHA-256, SHA-384 or SHA-512. Everything else
/// (RSA-PSS, ECDSA, EdDSA, anything unrecognized) is rejected regardless
/// of what the underlying cryptography could verify.
pub fn is_signature_algorithm_supported(certificate: &Certificate) -> bool {
    let oid = certificate.signature_algorithm();
    oid == OID_SHA256_WITH_RSA || oid == OID_SHA384_WITH_RSA || oid == OID_SHA512_WITH_RSA
}

/// Reports whether the certificate's public key is strong enough for
/// signing: an RSA key used with a PKCS#1 v1.5 signature must be at least
/// 2048 bits. Other key/signature combinations pass this check; the
/// algorithm allow-list is their gate.
pub fn is_certificate_public_key_valid(certificate: &Certificate) -> bool {
    if !is_signature_algorithm_supported(certificate) {
        return true;
    }
    match certificate.public_key().rsa_modulus_bits {
        Some(bits) => bits >= MIN_RSA_KEY_BITS,
        None => true,
    }
}

/// Reports whether the certificate's extended-key-usage extension lists
/// the given purpose. A certificate without the extension reports false.
pub fn has_extended_key_usage(certificate: &Certificate, purpose: ObjectIdentifier) -> bool {
    matches!(certificate.ext_key_usage(), Some(purposes) if purposes.contains(&purpose))
}

/// Reports whether the certificate may be used for the given purpose.
///
/// A certificate with no extended-key-usage extension is unrestricted and
/// valid for any purpose. One that has the extension must list the purpose
/// explicitly: the anyExtendedKeyUsage wildcard does NOT satisfy a
/// specific-purpose check, so a wildcard cannot admit a mail certificate
/// into code signing.
pub fn is_valid_for_purpose_fast(certificate: &Certificate, purpose: ObjectIdentifier) -> bool {
    match certificate.ext_key_usage() {
        None => true,
        Some(purposes) => purposes.contains(&purpose),
    }
}

/// One reason a certificate is unsuitable for package signing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("signature algorithm is not RSA with SHA-256, SHA-384 or SHA-512")]
    UnsupportedSignatureAlgorithm,
    #[error("RSA public key is shorter than 2048 bits")]
    WeakPublicKey,
    #[error("certificate has the lifetime-signing extended key usage")]
    LifetimeSigningEku,
    #[error("certificate is not valid for code signing")]
    NotValidForCodeSigning,
}

/// Runs every signing-suitability policy check against a candidate
/// certificate and returns all violations, so a rejection can name each
/// specific reason instead of a generic failure. An empty list means the
/// certificate passes signing policy.
pub fn verify_signing_suitability(certificate: &Certificate) -> Vec<PolicyViolation> {
    let mut violations = Vec::new();

    if !is_signature_algorithm_supported(certificate) {
        violations.push(PolicyViolation::UnsupportedSignatureAlgorithm);
    }
    if !is_certificate_public_key_valid(certificate) {
        violations.push(PolicyViolation::WeakPublicKey);
    }
    if has_extended_key_usage(certificate, OID_LIFETIME_SIGNING_EKU) {
        violations.push(PolicyViolation::LifetimeSigningEku);
    }
    if !is_valid_for_purpose_fast(certificate, OID_CODE_SIGNING_EKU) {
        violations.push(PolicyViolation::NotValidForCodeSigning);
    }

    if !violations.is_empty() {
        warn!(
            "certificate {} fails signing policy: {} violation(s)",
            certificate.subject(),
            violations.len()
        );
    }
    violations
}

/// The caller-supplied set of trusted root certificates. Membership is by
/// exact DER equality; nothing is trusted by default.
#[derive(Clone, Debug, Default)]
pub struct TrustStore {
    roots: Vec<Certificate>,
}

impl TrustStore {
    /// Creates an empty trust store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a trust store from a set of root certificates.
    pub fn from_roots(roots: Vec<Certificate>) -> Self {
        Self { roots }
    }

    /// Adds a trusted root.
    pub fn add(&mut self, root: Certificate) {
        self.roots.push(root);
    }

    /// Reports whether the certificate is a trusted root.
    pub fn contains(&self, certificate: &Certificate) -> bool {
        self.roots.iter().any(|root| root.der() == certificate.der())
    }

    /// The trusted roots.
    pub fn roots(&self) -> &[Certificate] {
        &self.roots
    }
}

/// A validated certificate chain, ordered leaf first and ending at a
/// self-issued certificate from the trust store.
#[derive(Clone, Debug)]
pub struct CertificateChain {
    certificates: Vec<Certificate>,
}

impl CertificateChain {
    /// The chain certificates in leaf-to-root order. This is a projection
    /// of the already-built chain, not a re-validation.
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// Number of certificates in the chain.
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// A built chain always holds at least the leaf.
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Consumes the chain, returning the leaf-first certificate list.
    pub fn into_certificates(self) -> Vec<Certificate> {
        self.certificates
    }
}

/// Builds the certificate chain for a signing candidate.
///
/// Starting from `certificate`, each link is resolved by matching the
/// current issuer name against the subjects of the trust roots and the
/// caller's extra (untrusted, path-building only) certificates, until a
/// self-issued certificate terminates the path. The terminal certificate
/// must itself be in the trust store, or the build fails with
/// [`Error::UntrustedRoot`], distinct from [`Error::PartialChain`], which
/// reports a hole in the path.
pub fn build(
    certificate: &Certificate,
    extra_store: &[Certificate],
    trust_roots: &TrustStore,
) -> Result<CertificateChain> {
    let mut certificates = vec![certificate.clone()];

    while !certificates.last().unwrap().is_self_issued() {
        if certificates.len() >= MAX_CHAIN_LENGTH {
            return Err(Error::ChainTooLong(MAX_CHAIN_LENGTH));
        }

        // Candidate issuers come from the trust roots first, then from the
        // caller's extra certificates. Anything already in the chain is
        // not a candidate again, so issuer loops dead-end instead of
        // spinning.
        let issuer = {
            let current = certificates.last().unwrap();
            trust_roots
                .roots()
                .iter()
                .chain(extra_store.iter())
                .find(|candidate| {
                    candidate.subject_der() == current.issuer_der()
                        && !certificates.iter().any(|c| c.der() == candidate.der())
                })
                .cloned()
        };

        let Some(issuer) = issuer else {
            let current = certificates.last().unwrap();
            warn!("chain: no issuer certificate for {}", current.subject());
            return Err(Error::PartialChain {
                subject: current.subject().to_string(),
            });
        };
        debug!(
            "chain: {} issued by {}",
            certificates.last().unwrap().subject(),
            issuer.subject()
        );
        certificates.push(issuer);
    }

    let root = certificates.last().unwrap();
    if !trust_roots.contains(root) {
        warn!("chain: root {} is not trusted", root.subject());
        return Err(Error::UntrustedRoot {
            subject: root.subject().to_string(),
        });
    }
    debug!("chain: built {} certificate(s) to trusted root", certificates.len());

    Ok(CertificateChain { certificates })
}
