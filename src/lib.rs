// pkgsign-rs: package code-signing primitives
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Code-signing and signature-verification primitives for package
//! distribution: a strict DER codec, the RFC 5035 signing-certificate
//! attribute binding a signature to its certificate chain, and the trust
//! chain construction and policy checks applied to signing certificates.
//!
//! Producing and validating the full package signature (CMS assembly,
//! timestamping, revocation transport) is the caller's concern; this crate
//! covers the byte formats and trust decisions underneath.

pub mod cert;
pub mod chain;
pub mod der;
pub mod ess;
pub mod pem;

#[cfg(test)]
pub(crate) mod testutil;
