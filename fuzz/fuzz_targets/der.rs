// pkgsign-rs: package code-signing primitives
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![no_main]

use darkbio_pkgsign::ess::SigningCertificateV2;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Whatever bytes parse must re-encode into an equivalent attribute;
    // everything else must fail with an error, never a panic.
    if let Ok(decoded) = SigningCertificateV2::read(data) {
        let encoded = decoded.encode();
        let decoded2 =
            SigningCertificateV2::read(&encoded).expect("failed to decode re-encoded attribute");
        assert_eq!(decoded, decoded2);
    }
});
