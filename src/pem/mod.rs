// pkgsign-rs: package code-signing primitives
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Strict PEM encoding and decoding for certificate material.
//!
//! Certificates and trust bundles arrive as PEM files, often with several
//! CERTIFICATE blocks concatenated. Decoding is strict: a block must start
//! at its line, keep one line-ending style throughout, carry strictly valid
//! base64, and nothing but further blocks may follow it.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const PEM_HEADER: &[u8] = b"-----BEGIN ";
const PEM_FOOTER: &[u8] = b"-----END ";
const PEM_ENDING: &[u8] = b"-----";

/// Error is the failures that can occur while decoding PEM data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing PEM header")]
    MissingHeader,
    #[error("incomplete PEM header")]
    IncompleteHeader,
    #[error("malformed PEM header")]
    MalformedHeader,
    #[error("empty PEM block type")]
    EmptyBlockType,
    #[error("PEM block type is not valid UTF-8")]
    InvalidBlockType,
    #[error("missing PEM footer")]
    MissingFooter,
    #[error("empty PEM body")]
    EmptyBody,
    #[error("body must end with newline before footer")]
    UnterminatedBody,
    #[error("trailing data after PEM block")]
    TrailingData,
    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Decodes a single PEM block with strict validation, rejecting any
/// trailing data after the block. Returns the (kind, data) tuple.
pub fn decode(data: &[u8]) -> Result<(String, Vec<u8>), Error> {
    let (kind, der, consumed) = decode_block(data)?;
    if consumed != data.len() {
        return Err(Error::TrailingData);
    }
    Ok((kind, der))
}

/// Decodes a concatenation of PEM blocks, as found in trust bundle files.
/// Blocks may be separated by blank lines; anything else between or after
/// them is an error, and at least one block must be present.
pub fn decode_all(data: &[u8]) -> Result<Vec<(String, Vec<u8>)>, Error> {
    let mut blocks = Vec::new();
    let mut rest = data;

    loop {
        // Skip blank separator lines between blocks
        while rest.first() == Some(&b'\n') || rest.starts_with(b"\r\n") {
            let skip = if rest[0] == b'\n' { 1 } else { 2 };
            rest = &rest[skip..];
        }
        if rest.is_empty() {
            break;
        }
        let (kind, der, consumed) = decode_block(rest)?;
        blocks.push((kind, der));
        rest = &rest[consumed..];
    }
    if blocks.is_empty() {
        return Err(Error::MissingHeader);
    }
    Ok(blocks)
}

/// Encodes data as a PEM block with the given type.
/// Lines are 64 characters, using \n line endings.
pub fn encode(kind: &str, data: &[u8]) -> String {
    let b64 = STANDARD.encode(data);

    let mut buf = String::new();
    buf.push_str("-----BEGIN ");
    buf.push_str(kind);
    buf.push_str("-----\n");

    for chunk in b64.as_bytes().chunks(64) {
        buf.push_str(std::str::from_utf8(chunk).unwrap());
        buf.push('\n');
    }

    buf.push_str("-----END ");
    buf.push_str(kind);
    buf.push_str("-----\n");

    buf
}

// decode_block parses one PEM block starting at byte 0 and returns the
// block type, the decoded payload and how many input bytes it consumed
// (including the footer's line ending, when present).
fn decode_block(data: &[u8]) -> Result<(String, Vec<u8>, usize), Error> {
    // Must start with the header immediately (no leading whitespace)
    if !data.starts_with(PEM_HEADER) {
        return Err(Error::MissingHeader);
    }
    // Find the end of the header line (first \n)
    let header_end = data
        .iter()
        .position(|&b| b == b'\n')
        .ok_or(Error::IncompleteHeader)?;

    // Detect line ending style from the first line
    let line_ending: &[u8] = if header_end > 0 && data[header_end - 1] == b'\r' {
        b"\r\n"
    } else {
        b"\n"
    };

    // Extract the header (without line ending)
    let header = &data[..header_end + 1 - line_ending.len()];

    // Parse the block type from the header
    if !header.starts_with(PEM_HEADER) || !header.ends_with(PEM_ENDING) {
        return Err(Error::MalformedHeader);
    }
    let block_type = &header[PEM_HEADER.len()..header.len() - PEM_ENDING.len()];
    if block_type.is_empty() {
        return Err(Error::EmptyBlockType);
    }
    let kind = String::from_utf8(block_type.to_vec()).map_err(|_| Error::InvalidBlockType)?;

    // Build the expected footer
    let mut footer = Vec::with_capacity(PEM_FOOTER.len() + block_type.len() + PEM_ENDING.len());
    footer.extend_from_slice(PEM_FOOTER);
    footer.extend_from_slice(block_type);
    footer.extend_from_slice(PEM_ENDING);

    // Find the footer
    let search_area = &data[header_end + 1..];
    let footer_idx = search_area
        .windows(footer.len())
        .position(|w| w == footer.as_slice())
        .ok_or(Error::MissingFooter)?;
    let footer_start = header_end + 1 + footer_idx;
    let footer_end = footer_start + footer.len();

    // The block consumes through the footer's own line ending, if any
    let mut consumed = footer_end;
    if data[consumed..].starts_with(line_ending) {
        consumed += line_ending.len();
    }

    // Extract the body (between header and footer)
    let body = &data[header_end + 1..footer_start];
    if body.is_empty() {
        return Err(Error::EmptyBody);
    }
    // The body must end with the line ending (the line before the footer)
    if !body.ends_with(line_ending) {
        return Err(Error::UnterminatedBody);
    }
    let body = &body[..body.len() - line_ending.len()];

    // Strip line endings and decode
    let b64: Vec<u8> = body
        .split(|&b| b == b'\n')
        .flat_map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .copied()
        .collect();

    let decoded = STANDARD.decode(&b64)?;

    Ok((kind, decoded, consumed))
}
