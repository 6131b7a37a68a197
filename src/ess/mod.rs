// pkgsign-rs: package code-signing primitives
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! RFC 5035 signing-certificate attribute.
//!
//! https://datatracker.ietf.org/doc/html/rfc5035
//!
//! The attribute binds a signature to the exact certificate chain that
//! produced it: one digest (plus optional issuer and serial) per chain
//! certificate, leaf first. A verifier recomputes the digests from the
//! chain actually presented and rejects any substitution. Wire shape:
//!
//!     SigningCertificateV2 ::= SEQUENCE {
//!         certs        SEQUENCE OF ESSCertIDv2,
//!         policies     SEQUENCE OF PolicyInformation OPTIONAL
//!     }
//!
//!     ESSCertIDv2 ::= SEQUENCE {
//!         hashAlgorithm  AlgorithmIdentifier DEFAULT {algorithm id-sha256},
//!         certHash       OCTET STRING,
//!         issuerSerial   IssuerSerial OPTIONAL
//!     }
//!
//! The `policies` field plays no part in trust decisions and is parsed and
//! discarded.

use crate::cert::Certificate;
use crate::der::{self, Decoder};
use const_oid::ObjectIdentifier;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// OID for the SHA-256 digest algorithm (2.16.840.1.101.3.4.2.1).
pub const OID_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1");

/// OID for the SHA-384 digest algorithm (2.16.840.1.101.3.4.2.2).
pub const OID_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.2");

/// OID for the SHA-512 digest algorithm (2.16.840.1.101.3.4.2.3).
pub const OID_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.3");

// GeneralName context tag for directoryName ([4], constructed, EXPLICIT).
const TAG_DIRECTORY_NAME: u8 = 0xa4;

/// Result type used by the attribute APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type used by the attribute APIs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("chain must contain at least one certificate")]
    EmptyChain,
    #[error("certificate hash length {length} does not match digest size {expected} of {algorithm}")]
    HashLengthMismatch {
        algorithm: ObjectIdentifier,
        length: usize,
        expected: usize,
    },
    #[error("unknown certificate hash algorithm: {0}")]
    UnknownHashAlgorithm(ObjectIdentifier),
    #[error("attribute lists {expected} certificates, presented chain has {actual}")]
    CertificateCountMismatch { expected: usize, actual: usize },
    #[error("certificate hash mismatch at chain position {0}")]
    CertificateHashMismatch(usize),
    #[error("issuer/serial mismatch at chain position {0}")]
    IssuerSerialMismatch(usize),
    #[error(transparent)]
    Der(#[from] der::Error),
    #[error(transparent)]
    Oid(#[from] const_oid::Error),
}

/// Digest algorithms accepted for certificate binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Returns the algorithm OID.
    pub fn oid(self) -> ObjectIdentifier {
        match self {
            Self::Sha256 => OID_SHA256,
            Self::Sha384 => OID_SHA384,
            Self::Sha512 => OID_SHA512,
        }
    }

    /// Maps an algorithm OID back to the digest algorithm.
    pub fn from_oid(oid: ObjectIdentifier) -> Option<Self> {
        if oid == OID_SHA256 {
            Some(Self::Sha256)
        } else if oid == OID_SHA384 {
            Some(Self::Sha384)
        } else if oid == OID_SHA512 {
            Some(Self::Sha512)
        } else {
            None
        }
    }

    /// Digest size in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Digests a byte buffer.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

/// RFC 5280 AlgorithmIdentifier: an OID plus opaque optional parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    /// Algorithm OID.
    pub oid: ObjectIdentifier,
    /// Raw DER of the optional parameters, carried without interpretation.
    pub parameters: Option<Vec<u8>>,
}

impl AlgorithmIdentifier {
    /// Creates an identifier without parameters.
    pub fn new(oid: ObjectIdentifier) -> Self {
        Self {
            oid,
            parameters: None,
        }
    }

    fn read(reader: &mut Decoder<'_>) -> Result<Self> {
        let mut inner = reader.read_sequence()?;
        let oid = ObjectIdentifier::from_bytes(inner.read_oid()?)?;
        let parameters = if inner.has_data() {
            Some(inner.read_any()?.to_vec())
        } else {
            None
        };
        inner.finish()?;

        Ok(Self { oid, parameters })
    }

    fn encode(&self) -> Vec<u8> {
        let mut segments = vec![der::encode_oid(self.oid.as_bytes())];
        if let Some(parameters) = &self.parameters {
            segments.push(parameters.clone());
        }
        der::construct_sequence(&segments)
    }
}

/// One name from the GeneralNames choice. Only directory names are created
/// by this crate; any other form encountered on decode is carried as its
/// raw TLV so a re-encode reproduces it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GeneralName {
    /// Raw DER of an X.501 Name (directoryName, tag [4]).
    DirectoryName(Vec<u8>),
    /// Raw TLV of an uninterpreted GeneralName form.
    Other(Vec<u8>),
}

/// RFC 5035 IssuerSerial: the issuer name(s) and serial number of one
/// certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuerSerial {
    /// Issuer names; a single directory name when created by this crate.
    pub general_names: Vec<GeneralName>,
    /// Serial number as big-endian INTEGER octets.
    pub serial_number: Vec<u8>,
}

impl IssuerSerial {
    fn read(reader: &mut Decoder<'_>) -> Result<Self> {
        let mut inner = reader.read_sequence()?;

        let mut names = inner.read_sequence()?;
        let mut general_names = Vec::new();
        while names.has_data() {
            if names.peek_tag() == Some(TAG_DIRECTORY_NAME) {
                let mut wrapper = names.read_constructed(TAG_DIRECTORY_NAME)?;
                let name = wrapper.read_any()?.to_vec();
                wrapper.finish()?;
                general_names.push(GeneralName::DirectoryName(name));
            } else {
                general_names.push(GeneralName::Other(names.read_any()?.to_vec()));
            }
        }

        let serial_number = inner.read_integer()?.to_vec();
        inner.finish()?;

        Ok(Self {
            general_names,
            serial_number,
        })
    }

    fn encode(&self) -> Vec<u8> {
        let names: Vec<Vec<u8>> = self
            .general_names
            .iter()
            .map(|name| match name {
                GeneralName::DirectoryName(raw) => {
                    der::construct_constructed(TAG_DIRECTORY_NAME, std::slice::from_ref(raw))
                }
                GeneralName::Other(raw) => raw.clone(),
            })
            .collect();

        der::construct_sequence(&[
            der::construct_sequence(&names),
            der::encode_integer(&self.serial_number),
        ])
    }
}

/// RFC 5035 ESSCertIDv2: the identity record of one chain certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EssCertIdV2 {
    /// Digest algorithm the certificate hash was computed with.
    pub hash_algorithm: AlgorithmIdentifier,
    /// Digest of the certificate's DER encoding.
    pub certificate_hash: Vec<u8>,
    /// Issuer and serial of the certificate, when bound.
    pub issuer_serial: Option<IssuerSerial>,
}

impl EssCertIdV2 {
    /// Creates the identity record for one certificate: the digest of its
    /// DER encoding plus its issuer directory name and serial number.
    pub fn create(certificate: &Certificate, algorithm: HashAlgorithm) -> Self {
        Self {
            hash_algorithm: AlgorithmIdentifier::new(algorithm.oid()),
            certificate_hash: algorithm.digest(certificate.der()),
            issuer_serial: Some(IssuerSerial {
                general_names: vec![GeneralName::DirectoryName(
                    certificate.issuer_der().to_vec(),
                )],
                serial_number: certificate.serial().to_vec(),
            }),
        }
    }

    pub(crate) fn read(reader: &mut Decoder<'_>) -> Result<Self> {
        let mut inner = reader.read_sequence()?;

        // hashAlgorithm is DEFAULT id-sha256: absent unless a SEQUENCE
        // precedes the certHash octets
        let hash_algorithm = if inner.peek_tag() == Some(der::TAG_SEQUENCE) {
            AlgorithmIdentifier::read(&mut inner)?
        } else {
            AlgorithmIdentifier::new(OID_SHA256)
        };

        let certificate_hash = inner.read_octet_string()?.to_vec();
        if let Some(algorithm) = HashAlgorithm::from_oid(hash_algorithm.oid)
            && certificate_hash.len() != algorithm.digest_len()
        {
            return Err(Error::HashLengthMismatch {
                algorithm: hash_algorithm.oid,
                length: certificate_hash.len(),
                expected: algorithm.digest_len(),
            });
        }

        // issuerSerial is OPTIONAL: present only when octets remain
        let issuer_serial = if inner.has_data() {
            Some(IssuerSerial::read(&mut inner)?)
        } else {
            None
        };
        inner.finish()?;

        Ok(Self {
            hash_algorithm,
            certificate_hash,
            issuer_serial,
        })
    }

    /// Encodes the record's fields as DER segments, one per field. An unset
    /// issuer/serial is omitted entirely, never written as a placeholder.
    pub fn encode(&self) -> Vec<Vec<u8>> {
        let mut segments = vec![
            self.hash_algorithm.encode(),
            der::encode_octet_string(&self.certificate_hash),
        ];
        if let Some(issuer_serial) = &self.issuer_serial {
            segments.push(issuer_serial.encode());
        }
        segments
    }
}

/// RFC 5035 SigningCertificateV2: the ordered certificate identity records
/// of a signing chain, leaf first. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningCertificateV2 {
    certificates: Vec<EssCertIdV2>,
}

impl SigningCertificateV2 {
    /// Builds the attribute from a leaf-first certificate chain, producing
    /// one identity record per certificate in chain order.
    pub fn create(chain: &[Certificate], algorithm: HashAlgorithm) -> Result<Self> {
        if chain.is_empty() {
            return Err(Error::EmptyChain);
        }
        Ok(Self {
            certificates: chain
                .iter()
                .map(|certificate| EssCertIdV2::create(certificate, algorithm))
                .collect(),
        })
    }

    /// Parses the attribute from its DER encoding. The optional `policies`
    /// field is consumed and discarded; it is not used for trust decisions.
    pub fn read(bytes: &[u8]) -> Result<Self> {
        let mut reader = Decoder::new(bytes);
        let mut outer = reader.read_sequence()?;

        let mut ids = outer.read_sequence()?;
        let mut certificates = Vec::new();
        while ids.has_data() {
            certificates.push(EssCertIdV2::read(&mut ids)?);
        }

        if outer.has_data() {
            outer.read_any()?;
        }
        outer.finish()?;
        reader.finish()?;

        Ok(Self { certificates })
    }

    /// The identity records, in chain order (leaf first).
    pub fn certificates(&self) -> &[EssCertIdV2] {
        &self.certificates
    }

    /// Encodes the attribute to DER.
    pub fn encode(&self) -> Vec<u8> {
        let entries: Vec<Vec<Vec<u8>>> = self
            .certificates
            .iter()
            .map(EssCertIdV2::encode)
            .collect();

        der::construct_sequence(&der::construct_segmented_sequence(&entries))
    }

    /// Checks the attribute against the chain actually presented with a
    /// signature: same certificate count and order, each digest recomputed
    /// from the presented certificate, and issuer/serial equal where the
    /// record bound them. Any mismatch is a hard failure naming the first
    /// position that diverged.
    pub fn verify_chain(&self, chain: &[Certificate]) -> Result<()> {
        if chain.is_empty() {
            return Err(Error::EmptyChain);
        }
        if self.certificates.len() != chain.len() {
            return Err(Error::CertificateCountMismatch {
                expected: self.certificates.len(),
                actual: chain.len(),
            });
        }
        for (index, (entry, certificate)) in
            self.certificates.iter().zip(chain.iter()).enumerate()
        {
            let algorithm = HashAlgorithm::from_oid(entry.hash_algorithm.oid)
                .ok_or(Error::UnknownHashAlgorithm(entry.hash_algorithm.oid))?;
            if entry.certificate_hash != algorithm.digest(certificate.der()) {
                return Err(Error::CertificateHashMismatch(index));
            }
            if let Some(issuer_serial) = &entry.issuer_serial {
                let expected_name = GeneralName::DirectoryName(certificate.issuer_der().to_vec());
                if issuer_serial.serial_number != certificate.serial()
                    || !issuer_serial.general_names.contains(&expected_name)
                {
                    return Err(Error::IssuerSerialMismatch(index));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn test_create_empty_chain() {
        assert_eq!(
            SigningCertificateV2::create(&[], HashAlgorithm::Sha256).unwrap_err(),
            Error::EmptyChain
        );
    }

    #[test]
    fn test_create_with_valid_chain() {
        let chain = testutil::chain();

        for algorithm in [
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha384,
            HashAlgorithm::Sha512,
        ] {
            let attribute = SigningCertificateV2::create(&chain, algorithm).unwrap();
            assert_eq!(attribute.certificates().len(), chain.len());

            for (entry, certificate) in attribute.certificates().iter().zip(chain.iter()) {
                assert_eq!(entry.hash_algorithm.oid, algorithm.oid());
                assert_eq!(entry.certificate_hash, algorithm.digest(certificate.der()));

                let issuer_serial = entry.issuer_serial.as_ref().unwrap();
                assert_eq!(issuer_serial.general_names.len(), 1);
                assert_eq!(
                    issuer_serial.general_names[0],
                    GeneralName::DirectoryName(certificate.issuer_der().to_vec())
                );
                assert_eq!(issuer_serial.serial_number, certificate.serial());
            }
        }
    }

    #[test]
    fn test_roundtrip() {
        let chain = testutil::chain();

        for algorithm in [
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha384,
            HashAlgorithm::Sha512,
        ] {
            let expected = SigningCertificateV2::create(&chain, algorithm).unwrap();
            let bytes = expected.encode();

            let actual = SigningCertificateV2::read(&bytes).unwrap();
            assert_eq!(actual, expected);

            // encode(read(bytes)) is byte-exact for codec-produced bytes
            assert_eq!(actual.encode(), bytes);
        }

        // A single-certificate chain round-trips the same way
        let single = SigningCertificateV2::create(&chain[..1], HashAlgorithm::Sha256).unwrap();
        let bytes = single.encode();
        assert_eq!(SigningCertificateV2::read(&bytes).unwrap(), single);
    }

    #[test]
    fn test_read_invalid_asn1() {
        assert!(matches!(
            SigningCertificateV2::read(&[0x30, 0x0b]),
            Err(Error::Der(der::Error::LengthOverrun(11, 0)))
        ));
        assert!(matches!(
            SigningCertificateV2::read(&[]),
            Err(Error::Der(der::Error::UnexpectedEof))
        ));
        assert!(matches!(
            SigningCertificateV2::read(&[0x04, 0x00]),
            Err(Error::Der(der::Error::UnexpectedTag(0x04, 0x30)))
        ));
    }

    #[test]
    fn test_read_rejects_trailing_bytes() {
        let mut bytes = SigningCertificateV2::create(&testutil::chain(), HashAlgorithm::Sha256)
            .unwrap()
            .encode();
        bytes.push(0x00);

        assert!(matches!(
            SigningCertificateV2::read(&bytes),
            Err(Error::Der(der::Error::TrailingBytes))
        ));
    }

    #[test]
    fn test_read_only_certificate_hash() {
        // One ESSCertIDv2 holding nothing but a certHash: the algorithm
        // defaults to SHA-256 and issuerSerial stays unset
        let hash = [0x5au8; 32];
        let entry = der::construct_sequence(&[der::encode_octet_string(&hash)]);
        let bytes = der::construct_sequence(&[der::construct_sequence(&[entry])]);

        // 3 two-byte headers + the octet string header precede the hash
        assert_eq!(&bytes[8..40], &hash);

        let attribute = SigningCertificateV2::read(&bytes).unwrap();
        assert_eq!(attribute.certificates().len(), 1);

        let entry = &attribute.certificates()[0];
        assert_eq!(entry.hash_algorithm.oid, OID_SHA256);
        assert_eq!(entry.hash_algorithm.parameters, None);
        assert_eq!(entry.certificate_hash, hash);
        assert_eq!(entry.issuer_serial, None);
    }

    #[test]
    fn test_unset_issuer_serial_survives_roundtrip() {
        let attribute = SigningCertificateV2 {
            certificates: vec![EssCertIdV2 {
                hash_algorithm: AlgorithmIdentifier::new(OID_SHA256),
                certificate_hash: vec![0x11; 32],
                issuer_serial: None,
            }],
        };
        let decoded = SigningCertificateV2::read(&attribute.encode()).unwrap();
        assert_eq!(decoded.certificates()[0].issuer_serial, None);
        assert_eq!(decoded, attribute);
    }

    #[test]
    fn test_read_rejects_wrong_hash_length() {
        // SHA-256 declared explicitly, but only 31 hash octets
        let algorithm = der::construct_sequence(&[der::encode_oid(OID_SHA256.as_bytes())]);
        let entry = der::construct_sequence(&[
            algorithm,
            der::encode_octet_string(&[0x22; 31]),
        ]);
        let bytes = der::construct_sequence(&[der::construct_sequence(&[entry])]);

        assert_eq!(
            SigningCertificateV2::read(&bytes).unwrap_err(),
            Error::HashLengthMismatch {
                algorithm: OID_SHA256,
                length: 31,
                expected: 32,
            }
        );
    }

    #[test]
    fn test_read_discards_policies() {
        let chain = testutil::chain();
        let attribute = SigningCertificateV2::create(&chain, HashAlgorithm::Sha256).unwrap();

        // Append a phony policies field after the certs sequence
        let encoded = attribute.encode();
        let mut reader = Decoder::new(&encoded);
        let mut outer = reader.read_sequence().unwrap();
        let certs_raw = outer.read_any().unwrap().to_vec();
        let with_policies = der::construct_sequence(&[
            certs_raw,
            der::construct_sequence(&[der::encode_oid(&[0x55, 0x1d, 0x20])]),
        ]);

        let decoded = SigningCertificateV2::read(&with_policies).unwrap();
        assert_eq!(decoded, attribute);
    }

    #[test]
    fn test_algorithm_parameters_survive_roundtrip() {
        let attribute = SigningCertificateV2 {
            certificates: vec![EssCertIdV2 {
                hash_algorithm: AlgorithmIdentifier {
                    oid: OID_SHA256,
                    parameters: Some(vec![0x05, 0x00]), // NULL
                },
                certificate_hash: vec![0x33; 32],
                issuer_serial: None,
            }],
        };
        let decoded = SigningCertificateV2::read(&attribute.encode()).unwrap();
        assert_eq!(decoded, attribute);
    }

    #[test]
    fn test_hash_algorithm_oid_mapping() {
        for algorithm in [
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha384,
            HashAlgorithm::Sha512,
        ] {
            assert_eq!(HashAlgorithm::from_oid(algorithm.oid()), Some(algorithm));
            assert_eq!(algorithm.digest(b"x").len(), algorithm.digest_len());
        }
        assert_eq!(
            HashAlgorithm::from_oid(ObjectIdentifier::new_unwrap("1.2.3.4")),
            None
        );
    }

    #[test]
    fn test_verify_chain() {
        let chain = testutil::chain();
        let attribute = SigningCertificateV2::create(&chain, HashAlgorithm::Sha384).unwrap();

        attribute.verify_chain(&chain).unwrap();
    }

    #[test]
    fn test_verify_chain_empty() {
        let attribute =
            SigningCertificateV2::create(&testutil::chain(), HashAlgorithm::Sha256).unwrap();
        assert_eq!(attribute.verify_chain(&[]).unwrap_err(), Error::EmptyChain);
    }

    #[test]
    fn test_verify_chain_count_mismatch() {
        let chain = testutil::chain();
        let attribute = SigningCertificateV2::create(&chain, HashAlgorithm::Sha256).unwrap();

        assert_eq!(
            attribute.verify_chain(&chain[..2]).unwrap_err(),
            Error::CertificateCountMismatch {
                expected: 3,
                actual: 2,
            }
        );
    }

    #[test]
    fn test_verify_chain_detects_substitution() {
        let chain = testutil::chain();
        let attribute = SigningCertificateV2::create(&chain, HashAlgorithm::Sha256).unwrap();

        // Swap in a different leaf
        let mut substituted = chain.clone();
        substituted[0] = testutil::eku_none();
        assert_eq!(
            attribute.verify_chain(&substituted).unwrap_err(),
            Error::CertificateHashMismatch(0)
        );

        // Reordering is a mismatch too, not a soft warning
        let mut reordered = chain.clone();
        reordered.swap(1, 2);
        assert_eq!(
            attribute.verify_chain(&reordered).unwrap_err(),
            Error::CertificateHashMismatch(1)
        );
    }

    #[test]
    fn test_verify_chain_detects_tampered_serial() {
        let chain = testutil::chain();
        let mut attribute = SigningCertificateV2::create(&chain, HashAlgorithm::Sha256).unwrap();

        let issuer_serial = attribute.certificates[0].issuer_serial.as_mut().unwrap();
        issuer_serial.serial_number[0] ^= 0xff;

        assert_eq!(
            attribute.verify_chain(&chain).unwrap_err(),
            Error::IssuerSerialMismatch(0)
        );
    }

    #[test]
    fn test_verify_chain_unknown_algorithm() {
        let chain = testutil::chain();
        let mut attribute = SigningCertificateV2::create(&chain, HashAlgorithm::Sha256).unwrap();

        let unknown = ObjectIdentifier::new_unwrap("1.2.840.113549.2.5"); // MD5
        attribute.certificates[0].hash_algorithm = AlgorithmIdentifier::new(unknown);

        assert_eq!(
            attribute.verify_chain(&chain).unwrap_err(),
            Error::UnknownHashAlgorithm(unknown)
        );
    }
}
