// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    fmt,
    io::{self, Read, Write},
};

use crate::ext::{ReadExt, WriteExt};

/// Capacity of a string field, including the terminating null
pub const FRU_STR_MAX: usize = 32;

/// Length prefixed string stored in the board and product areas
///
/// At most `FRU_STR_MAX - 1` bytes are kept. The bytes are not required
/// to be valid UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FruString(Vec<u8>);

impl FruString {
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        let bytes = bytes.as_ref();
        let len = bytes.len().min(FRU_STR_MAX - 1);
        Self(bytes[..len].to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode a length prefixed string, consuming `1 + declared` bytes
    ///
    /// A declared length above the capacity still consumes every declared
    /// byte so the following field is found at the right offset, only the
    /// stored copy is truncated.
    pub(crate) fn decode<R: Read>(reader: &mut R) -> io::Result<Self> {
        let declared = reader.read_u8()?;
        let bytes = reader.read_vec(declared as usize)?;
        Ok(Self::new(bytes))
    }

    pub(crate) fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(self.0.len() as u8)?;
        writer.write_all(&self.0)
    }
}

impl From<&str> for FruString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for FruString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_advances_past_string() {
        let buf = [5, b'h', b'e', b'l', b'l', b'o', 3, b'f', b'o', b'o'];
        let mut reader = &buf[..];

        let first = FruString::decode(&mut reader).unwrap();
        let second = FruString::decode(&mut reader).unwrap();

        assert_eq!(first.to_string(), "hello");
        assert_eq!(second.as_bytes(), b"foo");
        assert!(reader.is_empty());
    }

    #[test]
    fn overlong_string_is_truncated_but_fully_skipped() {
        let mut buf = vec![40];
        buf.extend((0..40).map(|i| b'a' + (i % 26) as u8));
        buf.extend([1, b'z']);
        let mut reader = &buf[..];

        let long = FruString::decode(&mut reader).unwrap();
        let next = FruString::decode(&mut reader).unwrap();

        assert_eq!(long.len(), FRU_STR_MAX - 1);
        assert_eq!(next.as_bytes(), b"z");
    }

    #[test]
    fn declared_length_past_end_is_short_buffer() {
        let buf = [4, b'a', b'b'];
        let error = FruString::decode(&mut &buf[..]).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn encode_writes_length_prefix() {
        let mut out = vec![];
        FruString::from("TF307").encode(&mut out).unwrap();
        assert_eq!(out, b"\x05TF307");
    }
}
