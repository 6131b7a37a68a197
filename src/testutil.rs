// pkgsign-rs: package code-signing primitives
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Shared certificate fixtures for tests.
//!
//! The fixtures are openssl-generated and live in `testdata/`: a
//! root -> intermediate -> leaf code-signing chain plus standalone policy
//! variants (restricted EKUs, weak key, RSA-PSS signature, an unrelated
//! root for untrusted-chain cases).

use crate::cert::Certificate;

pub const ROOT_PEM: &str = include_str!("../testdata/root.pem");
pub const INTERMEDIATE_PEM: &str = include_str!("../testdata/intermediate.pem");
pub const LEAF_PEM: &str = include_str!("../testdata/leaf.pem");
pub const EKU_EMAIL_PEM: &str = include_str!("../testdata/eku-email.pem");
pub const EKU_EMAIL_ANY_PEM: &str = include_str!("../testdata/eku-email-any.pem");
pub const EKU_NONE_PEM: &str = include_str!("../testdata/eku-none.pem");
pub const EKU_LIFETIME_PEM: &str = include_str!("../testdata/eku-lifetime.pem");
pub const RSA_1024_PEM: &str = include_str!("../testdata/rsa-1024.pem");
pub const RSA_PSS_PEM: &str = include_str!("../testdata/rsa-pss.pem");
pub const OTHER_ROOT_PEM: &str = include_str!("../testdata/other-root.pem");

pub fn root() -> Certificate {
    Certificate::from_pem(ROOT_PEM).unwrap()
}

pub fn intermediate() -> Certificate {
    Certificate::from_pem(INTERMEDIATE_PEM).unwrap()
}

pub fn leaf() -> Certificate {
    Certificate::from_pem(LEAF_PEM).unwrap()
}

pub fn eku_email() -> Certificate {
    Certificate::from_pem(EKU_EMAIL_PEM).unwrap()
}

pub fn eku_email_any() -> Certificate {
    Certificate::from_pem(EKU_EMAIL_ANY_PEM).unwrap()
}

pub fn eku_none() -> Certificate {
    Certificate::from_pem(EKU_NONE_PEM).unwrap()
}

pub fn eku_lifetime() -> Certificate {
    Certificate::from_pem(EKU_LIFETIME_PEM).unwrap()
}

pub fn rsa_1024() -> Certificate {
    Certificate::from_pem(RSA_1024_PEM).unwrap()
}

pub fn rsa_pss() -> Certificate {
    Certificate::from_pem(RSA_PSS_PEM).unwrap()
}

pub fn other_root() -> Certificate {
    Certificate::from_pem(OTHER_ROOT_PEM).unwrap()
}

/// The standard leaf-first chain used across tests.
pub fn chain() -> Vec<Certificate> {
    vec![leaf(), intermediate(), root()]
}
