// pkgsign-rs: package code-signing primitives
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Demo: policy-check a signing certificate, build its trust chain, and
//! bind the chain into a signing-certificate attribute.
//!
//! This example demonstrates:
//! 1. Loading a leaf/intermediate/root certificate set from PEM
//! 2. Checking the leaf against the code-signing policy gates
//! 3. Building the leaf-first chain to a caller-trusted root
//! 4. Creating, encoding and re-reading the SigningCertificateV2 attribute
//! 5. Verifying the attribute against the presented chain

use darkbio_pkgsign::cert::Certificate;
use darkbio_pkgsign::chain::{self, TrustStore};
use darkbio_pkgsign::ess::{HashAlgorithm, SigningCertificateV2};

fn main() {
    // =========================================================================
    // Step 1: Load the publisher's certificate set
    // =========================================================================
    println!("1. Loading certificates...");
    let root = Certificate::from_pem(include_str!("../testdata/root.pem")).unwrap();
    let intermediate =
        Certificate::from_pem(include_str!("../testdata/intermediate.pem")).unwrap();
    let leaf = Certificate::from_pem(include_str!("../testdata/leaf.pem")).unwrap();
    println!("   Leaf:   {}", leaf.subject());
    println!("   Issuer: {}", leaf.issuer());

    // =========================================================================
    // Step 2: Policy-check the signing certificate
    // =========================================================================
    println!("\n2. Checking signing policy...");
    let violations = chain::verify_signing_suitability(&leaf);
    if violations.is_empty() {
        println!("   ✓ Certificate passes signing policy");
    } else {
        for violation in &violations {
            println!("   ✗ {violation}");
        }
        return;
    }

    // =========================================================================
    // Step 3: Build the chain to a trusted root
    // =========================================================================
    println!("\n3. Building certificate chain...");
    let trust_roots = TrustStore::from_roots(vec![root]);
    let chain = chain::build(&leaf, &[intermediate], &trust_roots)
        .expect("Failed to build chain to trusted root");
    for (i, certificate) in chain.certificates().iter().enumerate() {
        println!("   [{i}] {}", certificate.subject());
    }

    // =========================================================================
    // Step 4: Bind the chain into the signing-certificate attribute
    // =========================================================================
    println!("\n4. Creating SigningCertificateV2 attribute...");
    let attribute = SigningCertificateV2::create(chain.certificates(), HashAlgorithm::Sha256)
        .expect("Failed to create attribute");
    let encoded = attribute.encode();
    println!("   ✓ Attribute encoded ({} bytes DER)", encoded.len());
    println!(
        "   Leaf hash: {}",
        hex::encode(&attribute.certificates()[0].certificate_hash)
    );

    // =========================================================================
    // Step 5: Verify the attribute the way a consumer would
    // =========================================================================
    println!("\n5. Verifying attribute against the presented chain...");
    let decoded = SigningCertificateV2::read(&encoded).expect("Failed to parse attribute");
    decoded
        .verify_chain(chain.certificates())
        .expect("Attribute does not match the presented chain");
    println!("   ✓ Attribute binds the presented chain");
}
