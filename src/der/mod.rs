// pkgsign-rs: package code-signing primitives
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Tiny ASN.1 DER reader and encoder.
//!
//! https://www.itu.int/rec/T-REC-X.690
//!
//! This is an implementation of the DER subset needed by the signing
//! certificate structures, focusing on security rather than flexibility or
//! completeness. Only definite-length encodings are accepted, long-form
//! lengths must be minimal, and a cursor can never read past the length its
//! enclosing structure declared. The supported constructs are:
//! - SEQUENCE and other constructed values (as bounded sub-cursors)
//! - INTEGER, OCTET STRING and OBJECT IDENTIFIER value octets
//! - opaque tag/length/value triplets, for fields read but not interpreted

// Universal tags handled by this module
pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_OID: u8 = 0x06;
pub const TAG_SEQUENCE: u8 = 0x30;

// Lengths of 128 and up switch to the long form, where the first byte
// carries the count of big-endian length bytes that follow.
const LONG_FORM: u8 = 0x80;

// Upper bound on long-form length bytes. Four bytes already describe
// structures far beyond anything a signature attribute may contain.
const MAX_LENGTH_BYTES: usize = 4;

/// Error is the failures that can occur while reading or encoding DER data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unexpected tag: {0:#04x}, want {1:#04x}")]
    UnexpectedTag(u8, u8),
    #[error("unexpected end of data")]
    UnexpectedEof,
    #[error("invalid length encoding")]
    InvalidLength,
    #[error("non-minimal length encoding")]
    NonMinimalLength,
    #[error("declared length {0} exceeds remaining input {1}")]
    LengthOverrun(usize, usize),
    #[error("unexpected trailing bytes")]
    TrailingBytes,
}

// Decoder is a bounded cursor over a DER buffer. A cursor created by
// `read_sequence` covers exactly the content octets the sequence declared,
// so a malformed inner structure can never escape into its neighbours.
#[derive(Clone, Debug)]
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    // new creates a decoder around a data blob.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    // has_data reports whether unconsumed bytes remain within the bound.
    pub fn has_data(&self) -> bool {
        self.pos < self.data.len()
    }

    // finish terminates decoding and returns an error if trailing bytes remain.
    pub fn finish(self) -> Result<(), Error> {
        if self.pos != self.data.len() {
            return Err(Error::TrailingBytes);
        }
        Ok(())
    }

    // peek_tag returns the next tag byte without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    // read_sequence consumes a SEQUENCE header and returns a sub-cursor
    // bounded to exactly the declared content octets.
    pub fn read_sequence(&mut self) -> Result<Decoder<'a>, Error> {
        self.read_constructed(TAG_SEQUENCE)
    }

    // read_constructed consumes a header with the given tag and returns a
    // sub-cursor over the declared content octets.
    pub fn read_constructed(&mut self, tag: u8) -> Result<Decoder<'a>, Error> {
        let content = self.read_value(tag)?;
        Ok(Decoder::new(content))
    }

    // read_integer reads an INTEGER and returns its content octets.
    pub fn read_integer(&mut self) -> Result<&'a [u8], Error> {
        self.read_value(TAG_INTEGER)
    }

    // read_octet_string reads an OCTET STRING and returns its content octets.
    pub fn read_octet_string(&mut self) -> Result<&'a [u8], Error> {
        self.read_value(TAG_OCTET_STRING)
    }

    // read_oid reads an OBJECT IDENTIFIER and returns its content octets.
    pub fn read_oid(&mut self) -> Result<&'a [u8], Error> {
        self.read_value(TAG_OID)
    }

    // read_value reads one tag/length/value triplet with the expected tag
    // and returns the raw value octets, advancing the cursor past it.
    pub fn read_value(&mut self, tag: u8) -> Result<&'a [u8], Error> {
        let actual = self.peek_tag().ok_or(Error::UnexpectedEof)?;
        if actual != tag {
            return Err(Error::UnexpectedTag(actual, tag));
        }
        self.pos += 1;

        let length = self.read_length()?;
        self.read_bytes(length)
    }

    // read_any reads one tag/length/value triplet of any tag and returns it
    // whole, header included. Used for optional fields that are carried or
    // skipped without interpretation.
    pub fn read_any(&mut self) -> Result<&'a [u8], Error> {
        let start = self.pos;
        if !self.has_data() {
            return Err(Error::UnexpectedEof);
        }
        self.pos += 1;

        let length = self.read_length()?;
        self.read_bytes(length)?;

        Ok(&self.data[start..self.pos])
    }

    // read_length decodes a definite DER length, short or long form,
    // rejecting indefinite and non-minimal encodings.
    fn read_length(&mut self) -> Result<usize, Error> {
        let first = *self.data.get(self.pos).ok_or(Error::UnexpectedEof)?;
        self.pos += 1;

        if first < LONG_FORM {
            return Ok(first as usize);
        }
        // 0x80 is the BER indefinite-length marker, which DER forbids
        let count = (first & 0x7f) as usize;
        if count == 0 || count > MAX_LENGTH_BYTES {
            return Err(Error::InvalidLength);
        }
        if self.data.len() - self.pos < count {
            return Err(Error::UnexpectedEof);
        }
        let bytes = self.read_bytes(count)?;

        let mut length = 0usize;
        for &byte in bytes {
            length = length << 8 | byte as usize;
        }
        // Minimal form: no leading zero length bytes, and values below 128
        // must have used the short form
        if bytes[0] == 0 || length < LONG_FORM as usize {
            return Err(Error::NonMinimalLength);
        }
        Ok(length)
    }

    // read_bytes retrieves the next handful of bytes from the buffer.
    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        let remaining = self.data.len() - self.pos;
        if len > remaining {
            return Err(Error::LengthOverrun(len, remaining));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;

        Ok(bytes)
    }
}

// encode_length appends the DER encoding of a length: one byte for values
// up to 127, otherwise a count byte with the high bit set followed by the
// big-endian length bytes.
pub fn encode_length(out: &mut Vec<u8>, length: usize) {
    if length < LONG_FORM as usize {
        out.push(length as u8);
        return;
    }
    let needed = (usize::BITS as usize - length.leading_zeros() as usize).div_ceil(8);
    out.push(LONG_FORM | needed as u8);
    for i in (0..needed).rev() {
        out.push((length >> (i * 8)) as u8);
    }
}

// encode_value encodes one tag/length/value triplet around raw value octets.
pub fn encode_value(tag: u8, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len() + 6);
    out.push(tag);
    encode_length(&mut out, value.len());
    out.extend_from_slice(value);
    out
}

// encode_octet_string encodes an OCTET STRING.
pub fn encode_octet_string(value: &[u8]) -> Vec<u8> {
    encode_value(TAG_OCTET_STRING, value)
}

// encode_oid encodes an OBJECT IDENTIFIER from its content octets.
pub fn encode_oid(body: &[u8]) -> Vec<u8> {
    encode_value(TAG_OID, body)
}

// encode_integer encodes an unsigned big-endian magnitude as an INTEGER:
// redundant leading zeros are stripped and a zero octet is prepended when
// the top bit is set, so the value stays positive in two's complement.
pub fn encode_integer(magnitude: &[u8]) -> Vec<u8> {
    let stripped: &[u8] = match magnitude.iter().position(|&b| b != 0) {
        Some(first) => &magnitude[first..],
        None => &[0],
    };
    let mut content = Vec::with_capacity(stripped.len() + 1);
    if stripped[0] & 0x80 != 0 {
        content.push(0);
    }
    content.extend_from_slice(stripped);
    encode_value(TAG_INTEGER, &content)
}

// construct_sequence concatenates pre-encoded child segments and wraps them
// in a SEQUENCE header.
pub fn construct_sequence(segments: &[Vec<u8>]) -> Vec<u8> {
    construct_constructed(TAG_SEQUENCE, segments)
}

// construct_constructed wraps pre-encoded child segments in a constructed
// value with the given tag.
pub fn construct_constructed(tag: u8, segments: &[Vec<u8>]) -> Vec<u8> {
    let total: usize = segments.iter().map(Vec::len).sum();

    let mut out = Vec::with_capacity(total + 6);
    out.push(tag);
    encode_length(&mut out, total);
    for segment in segments {
        out.extend_from_slice(segment);
    }
    out
}

// construct_segmented_sequence encodes each inner segment list as its own
// nested SEQUENCE, preserving the SEQUENCE-of-SEQUENCE shape used by the
// certificate identifier structures.
pub fn construct_segmented_sequence(entries: &[Vec<Vec<u8>>]) -> Vec<Vec<u8>> {
    entries
        .iter()
        .map(|segments| construct_sequence(segments))
        .collect()
}
