//! Primitive encoding/decoding for the operation wire format
//!
//! Big-endian fixed integers, `0x00`/`0xff` booleans, `u32` length-prefixed
//! byte strings and Zarith variable-length integers:
//!
//! - `N` (natural): little-endian groups of 7 bits, high bit set on every
//!   byte except the last
//! - `Z` (integer): like `N`, but the first byte holds a sign bit (`0x40`)
//!   and only 6 value bits
//!
//! Non-canonical Zarith forms (a trailing zero group, negative zero) are
//! rejected so that decoding and re-encoding reproduce the input exactly.

use crate::error::{CodecError, Result};
use tzforge_crypto::{Address, KeyKind, PublicKey, PublicKeyHash, Signature};

// =============================================================================
// DECODING
// =============================================================================

/// Bounds-checked reader over a byte slice
///
/// Every read names the field it belongs to so decode failures can be traced
/// back to the offending part of an operation.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader from a byte slice
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current position in the data
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Unread bytes
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Number of unread bytes
    #[must_use]
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once all data has been consumed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Next byte without consuming it
    #[must_use]
    pub fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Reads a single byte
    #[inline]
    pub fn read_byte(&mut self, field: &'static str) -> Result<u8> {
        let byte = self
            .data
            .get(self.pos)
            .copied()
            .ok_or(CodecError::UnexpectedEof { field })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly `n` bytes
    #[inline]
    pub fn read_bytes(&mut self, n: usize, field: &'static str) -> Result<&'a [u8]> {
        if n > self.remaining_len() {
            return Err(CodecError::UnexpectedEof { field });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads a fixed-size array
    #[inline]
    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N, field)?);
        Ok(out)
    }

    /// Reads a big-endian `u16`
    pub fn read_u16(&mut self, field: &'static str) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array(field)?))
    }

    /// Reads a big-endian `i16`
    pub fn read_i16(&mut self, field: &'static str) -> Result<i16> {
        Ok(i16::from_be_bytes(self.read_array(field)?))
    }

    /// Reads a big-endian `u32`
    pub fn read_u32(&mut self, field: &'static str) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array(field)?))
    }

    /// Reads a big-endian `i32`
    pub fn read_i32(&mut self, field: &'static str) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array(field)?))
    }

    /// Reads a big-endian `i64`
    pub fn read_i64(&mut self, field: &'static str) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array(field)?))
    }

    /// Reads a boolean (`0x00` or `0xff`)
    pub fn read_bool(&mut self, field: &'static str) -> Result<bool> {
        match self.read_byte(field)? {
            0x00 => Ok(false),
            0xff => Ok(true),
            other => Err(CodecError::InvalidValue {
                field,
                value: u64::from(other),
            }),
        }
    }

    /// Reads a Zarith natural
    pub fn read_n(&mut self, field: &'static str) -> Result<u64> {
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.read_byte(field)?;
            let group = u64::from(byte & 0x7f);
            if shift >= 64 || (shift > 0 && group >> (64 - shift) != 0) {
                return Err(overflow(field));
            }
            value |= group << shift;
            if byte & 0x80 == 0 {
                if group == 0 && shift > 0 {
                    return Err(non_canonical(field));
                }
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// Reads a Zarith integer
    pub fn read_z(&mut self, field: &'static str) -> Result<i64> {
        let first = self.read_byte(field)?;
        let negative = first & 0x40 != 0;
        let mut magnitude = u64::from(first & 0x3f);
        let mut more = first & 0x80 != 0;
        let mut shift = 6u32;
        while more {
            let byte = self.read_byte(field)?;
            let group = u64::from(byte & 0x7f);
            if shift >= 64 || group >> (64 - shift) != 0 {
                return Err(overflow(field));
            }
            magnitude |= group << shift;
            more = byte & 0x80 != 0;
            if !more && group == 0 {
                return Err(non_canonical(field));
            }
            shift += 7;
        }
        if negative {
            if magnitude == 0 {
                return Err(non_canonical(field));
            }
            0i64.checked_sub_unsigned(magnitude).ok_or_else(|| overflow(field))
        } else {
            i64::try_from(magnitude).map_err(|_| overflow(field))
        }
    }

    /// Reads a `u32` length prefix and checks it against the unread input
    pub fn read_length(&mut self, field: &'static str) -> Result<usize> {
        let len = self.read_u32(field)? as usize;
        if len > self.remaining_len() {
            return Err(CodecError::LengthExceedsLimit {
                field,
                len,
                max: self.remaining_len(),
            });
        }
        Ok(len)
    }

    /// Reads a `u32` length-prefixed byte string
    pub fn read_bytes_prefixed(&mut self, field: &'static str) -> Result<Vec<u8>> {
        let len = self.read_length(field)?;
        Ok(self.read_bytes(len, field)?.to_vec())
    }

    /// Reads a `u32` length-prefixed UTF-8 string
    pub fn read_string_prefixed(&mut self, field: &'static str) -> Result<String> {
        let len = self.read_length(field)?;
        let bytes = self.read_bytes(len, field)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| CodecError::Malformed {
                field,
                reason: e.to_string(),
            })
    }

    /// Reads a `u32` length prefix and returns a reader over exactly that many
    /// bytes, advancing past them
    pub fn read_sub(&mut self, field: &'static str) -> Result<Reader<'a>> {
        let len = self.read_length(field)?;
        Ok(Reader::new(self.read_bytes(len, field)?))
    }

    /// Reads a 21-byte implicit account
    pub fn read_pkh(&mut self, field: &'static str) -> Result<PublicKeyHash> {
        let bytes = self.read_bytes(PublicKeyHash::SIZE, field)?;
        PublicKeyHash::from_bytes(bytes).map_err(|source| CodecError::Primitive { field, source })
    }

    /// Reads a 22-byte padded address
    pub fn read_address(&mut self, field: &'static str) -> Result<Address> {
        let bytes = self.read_bytes(Address::SIZE, field)?;
        Address::from_bytes(bytes).map_err(|source| CodecError::Primitive { field, source })
    }

    /// Reads a tagged public key
    pub fn read_public_key(&mut self, field: &'static str) -> Result<PublicKey> {
        let tag = self.read_byte(field)?;
        let kind =
            KeyKind::from_tag(tag).map_err(|source| CodecError::Primitive { field, source })?;
        let bytes = self.read_bytes(kind.public_key_size(), field)?;
        PublicKey::new(kind, bytes).map_err(|source| CodecError::Primitive { field, source })
    }

    /// Reads an untagged signature of `len` bytes
    pub fn read_signature(&mut self, len: usize, field: &'static str) -> Result<Signature> {
        let bytes = self.read_bytes(len, field)?;
        Signature::from_bytes(bytes).map_err(|source| CodecError::Primitive { field, source })
    }

    /// Reads a boolean presence flag followed by the value when set
    pub fn read_option<T>(
        &mut self,
        field: &'static str,
        read: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Option<T>> {
        if self.read_bool(field)? {
            read(self).map(Some)
        } else {
            Ok(None)
        }
    }
}

fn overflow(field: &'static str) -> CodecError {
    CodecError::Malformed {
        field,
        reason: "zarith number overflows 64 bits".to_string(),
    }
}

fn non_canonical(field: &'static str) -> CodecError {
    CodecError::Malformed {
        field,
        reason: "non-canonical zarith encoding".to_string(),
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Append-only writer for the wire format
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer
    #[must_use]
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Borrow the written bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of bytes written
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single byte
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a big-endian `u16`
    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Writes a big-endian `i16`
    pub fn write_i16(&mut self, value: i16) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Writes a big-endian `u32`
    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Writes a big-endian `i32`
    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Writes a big-endian `i64`
    pub fn write_i64(&mut self, value: i64) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Writes a boolean as `0x00`/`0xff`
    pub fn write_bool(&mut self, value: bool) {
        self.write_byte(if value { 0xff } else { 0x00 });
    }

    /// Writes a Zarith natural
    pub fn write_n(&mut self, mut value: u64) {
        loop {
            #[allow(clippy::cast_possible_truncation)]
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            self.buf.push(byte);
            if value == 0 {
                break;
            }
        }
    }

    /// Writes a Zarith integer
    pub fn write_z(&mut self, value: i64) {
        let mut magnitude = value.unsigned_abs();
        #[allow(clippy::cast_possible_truncation)]
        let mut first = (magnitude & 0x3f) as u8;
        if value < 0 {
            first |= 0x40;
        }
        magnitude >>= 6;
        if magnitude != 0 {
            first |= 0x80;
        }
        self.buf.push(first);
        if magnitude != 0 {
            self.write_n(magnitude);
        }
    }

    /// Writes a `u32` length prefix
    pub fn write_length(&mut self, len: usize, field: &'static str) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| CodecError::LengthExceedsLimit {
            field,
            len,
            max: u32::MAX as usize,
        })?;
        self.write_u32(len);
        Ok(())
    }

    /// Writes a `u32` length-prefixed byte string
    pub fn write_bytes_prefixed(&mut self, bytes: &[u8], field: &'static str) -> Result<()> {
        self.write_length(bytes.len(), field)?;
        self.write_bytes(bytes);
        Ok(())
    }

    /// Runs `encode` into a scratch writer and appends its output with a
    /// `u32` length prefix
    pub fn write_sub(
        &mut self,
        field: &'static str,
        encode: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let mut sub = Self::new();
        encode(&mut sub)?;
        self.write_bytes_prefixed(sub.as_bytes(), field)
    }

    /// Writes a 21-byte implicit account
    pub fn write_pkh(&mut self, pkh: &PublicKeyHash) {
        self.write_bytes(&pkh.to_bytes());
    }

    /// Writes a 22-byte padded address
    pub fn write_address(&mut self, address: &Address) {
        self.write_bytes(&address.to_bytes());
    }

    /// Writes a tagged public key
    pub fn write_public_key(&mut self, key: &PublicKey) {
        self.write_bytes(&key.to_bytes());
    }

    /// Writes a presence flag followed by the value when set
    pub fn write_option<T>(&mut self, value: Option<&T>, write: impl FnOnce(&mut Self, &T)) {
        match value {
            Some(v) => {
                self.write_bool(true);
                write(self, v);
            }
            None => self.write_bool(false),
        }
    }
}

/// Encoded length of a Zarith natural
#[must_use]
pub fn n_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_n(v: u64) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_n(v);
        w.into_bytes()
    }

    fn encode_z(v: i64) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_z(v);
        w.into_bytes()
    }

    #[test]
    fn test_n_known_vectors() {
        assert_eq!(encode_n(0), vec![0x00]);
        assert_eq!(encode_n(127), vec![0x7f]);
        assert_eq!(encode_n(128), vec![0x80, 0x01]);
        assert_eq!(encode_n(10_000), vec![0x90, 0x4e]);
        assert_eq!(encode_n(1_000_000), vec![0xc0, 0x84, 0x3d]);
    }

    #[test]
    fn test_z_known_vectors() {
        assert_eq!(encode_z(0), vec![0x00]);
        assert_eq!(encode_z(-1), vec![0x41]);
        assert_eq!(encode_z(63), vec![0x3f]);
        assert_eq!(encode_z(64), vec![0x80, 0x01]);
        assert_eq!(encode_z(-64), vec![0xc0, 0x01]);
        assert_eq!(encode_z(1000), vec![0xa8, 0x0f]);
    }

    #[test]
    fn test_n_extremes_roundtrip() {
        for v in [0, 1, 127, 128, u64::from(u32::MAX), u64::MAX] {
            let bytes = encode_n(v);
            assert_eq!(bytes.len(), n_len(v));
            let mut r = Reader::new(&bytes);
            assert_eq!(r.read_n("n").unwrap(), v);
            assert!(r.is_empty());
        }
    }

    #[test]
    fn test_z_extremes_roundtrip() {
        for v in [0, 1, -1, 63, -63, 64, -64, i64::MAX, i64::MIN] {
            let bytes = encode_z(v);
            let mut r = Reader::new(&bytes);
            assert_eq!(r.read_z("z").unwrap(), v, "value {v}");
            assert!(r.is_empty());
        }
    }

    #[test]
    fn test_non_canonical_rejected() {
        let mut r = Reader::new(&[0x80, 0x00]);
        assert!(matches!(r.read_n("fee"), Err(CodecError::Malformed { field: "fee", .. })));

        // negative zero
        let mut r = Reader::new(&[0x40]);
        assert!(matches!(r.read_z("amount"), Err(CodecError::Malformed { .. })));

        let mut r = Reader::new(&[0x81, 0x00]);
        assert!(matches!(r.read_z("amount"), Err(CodecError::Malformed { .. })));
    }

    #[test]
    fn test_n_overflow_rejected() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        let mut r = Reader::new(&bytes);
        assert!(matches!(r.read_n("gas_limit"), Err(CodecError::Malformed { .. })));
    }

    #[test]
    fn test_unexpected_eof_names_field() {
        let mut r = Reader::new(&[0x80]);
        assert!(matches!(
            r.read_n("counter"),
            Err(CodecError::UnexpectedEof { field: "counter" })
        ));
        let mut r = Reader::new(&[0x00, 0x01]);
        assert!(matches!(
            r.read_i32("level"),
            Err(CodecError::UnexpectedEof { field: "level" })
        ));
    }

    #[test]
    fn test_bool_strict() {
        let mut r = Reader::new(&[0xff, 0x00, 0x01]);
        assert!(r.read_bool("a").unwrap());
        assert!(!r.read_bool("b").unwrap());
        assert!(matches!(
            r.read_bool("c"),
            Err(CodecError::InvalidValue { field: "c", value: 1 })
        ));
    }

    #[test]
    fn test_prefixed_bytes_length_checked() {
        let mut w = Writer::new();
        w.write_bytes_prefixed(b"hello", "data").unwrap();
        assert_eq!(w.as_bytes(), &[0, 0, 0, 5, b'h', b'e', b'l', b'l', b'o']);

        let mut r = Reader::new(w.as_bytes());
        assert_eq!(r.read_bytes_prefixed("data").unwrap(), b"hello");

        let mut r = Reader::new(&[0, 0, 0, 9, 1, 2]);
        assert!(matches!(
            r.read_bytes_prefixed("data"),
            Err(CodecError::LengthExceedsLimit { len: 9, max: 2, .. })
        ));
    }

    #[test]
    fn test_sub_reader_is_bounded() {
        let mut w = Writer::new();
        w.write_sub("inner", |w| {
            w.write_i32(7);
            Ok(())
        })
        .unwrap();
        w.write_byte(0xaa);

        let mut r = Reader::new(w.as_bytes());
        let mut sub = r.read_sub("inner").unwrap();
        assert_eq!(sub.read_i32("level").unwrap(), 7);
        assert!(sub.is_empty());
        assert_eq!(r.read_byte("tail").unwrap(), 0xaa);
    }

    #[test]
    fn test_public_key_and_address_fields() {
        let pk = PublicKey::new(KeyKind::Secp256k1, &[2u8; 33]).unwrap();
        let addr = Address::from(pk.hash());
        let mut w = Writer::new();
        w.write_public_key(&pk);
        w.write_address(&addr);
        assert_eq!(w.len(), 34 + 22);

        let mut r = Reader::new(w.as_bytes());
        assert_eq!(r.read_public_key("public_key").unwrap(), pk);
        assert_eq!(r.read_address("destination").unwrap(), addr);

        let mut r = Reader::new(&[9u8; 40]);
        assert!(matches!(
            r.read_public_key("public_key"),
            Err(CodecError::Primitive { field: "public_key", .. })
        ));
    }
}
