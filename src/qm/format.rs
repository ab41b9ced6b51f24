//! Wire constants of compiled catalogs and big-endian helpers.

use super::error::QmError;

/// Leading bytes of every compiled catalog.
pub const MAGIC: [u8; 16] = [
    0x3c, 0xb8, 0x64, 0x18, 0xca, 0xef, 0x9c, 0x95, 0xcd, 0x21, 0x1c, 0xbf, 0x60, 0xa1, 0xbd, 0xdd,
];

/// Length value of a null string.
pub const NULL_STRING_LEN: u32 = u32::MAX;

/// Top-level block tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BlockTag {
    Contexts = 0x2f,
    Hashes = 0x42,
    Messages = 0x69,
    NumerusRules = 0x88,
    Dependencies = 0x96,
    Language = 0xa7,
}

impl BlockTag {
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x2f => Some(Self::Contexts),
            0x42 => Some(Self::Hashes),
            0x69 => Some(Self::Messages),
            0x88 => Some(Self::NumerusRules),
            0x96 => Some(Self::Dependencies),
            0xa7 => Some(Self::Language),
            _ => None,
        }
    }
}

/// Field tags inside a message record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordTag {
    End = 1,
    /// Legacy UTF-16 source text, skipped.
    SourceText16 = 2,
    Translation = 3,
    /// Legacy UTF-16 context, skipped.
    Context16 = 4,
    Obsolete1 = 5,
    SourceText = 6,
    Context = 7,
    Comment = 8,
    Obsolete2 = 9,
}

impl RecordTag {
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::End),
            2 => Some(Self::SourceText16),
            3 => Some(Self::Translation),
            4 => Some(Self::Context16),
            5 => Some(Self::Obsolete1),
            6 => Some(Self::SourceText),
            7 => Some(Self::Context),
            8 => Some(Self::Comment),
            9 => Some(Self::Obsolete2),
            _ => None,
        }
    }
}

/// Converts a length or offset to its 32-bit wire form.
pub(crate) fn wire_u32(value: usize) -> Result<u32, QmError> {
    u32::try_from(value).map_err(|_| QmError::OffsetOutOfRange { offset: value })
}

/// Appends `tag`, a 32-bit length and `bytes`.
pub(crate) fn put_field(out: &mut Vec<u8>, tag: u8, bytes: &[u8]) -> Result<(), QmError> {
    out.push(tag);
    out.extend_from_slice(&wire_u32(bytes.len())?.to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

/// UTF-16BE encoding of `text`.
pub(crate) fn utf16_be(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_be_bytes).collect()
}

/// Decodes UTF-16BE. The flag is `false` when unpaired surrogates were
/// replaced.
pub(crate) fn from_utf16_be(bytes: &[u8]) -> (String, bool) {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .filter_map(|pair| <[u8; 2]>::try_from(pair).ok())
        .map(u16::from_be_bytes)
        .collect();
    match String::from_utf16(&units) {
        Ok(text) => (text, true),
        Err(_) => (String::from_utf16_lossy(&units), false),
    }
}

/// Forward-only reader over a byte slice.
#[derive(Debug, Clone)]
pub(crate) struct ByteReader<'a> {
    /// Whole input.
    bytes: &'a [u8],
    /// Offset of the next unread byte.
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Reader positioned at `position`, if it lies inside `bytes`.
    pub(crate) fn at(bytes: &'a [u8], position: usize) -> Option<Self> {
        (position < bytes.len()).then_some(Self { bytes, position })
    }

    pub(crate) const fn position(&self) -> usize {
        self.position
    }

    pub(crate) const fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.position)
    }

    pub(crate) fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.position.checked_add(len)?;
        let slice = self.bytes.get(self.position..end)?;
        self.position = end;
        Some(slice)
    }

    pub(crate) fn read_u8(&mut self) -> Option<u8> {
        self.take(1).and_then(|bytes| bytes.first().copied())
    }

    pub(crate) fn read_u32(&mut self) -> Option<u32> {
        self.take(4).and_then(|bytes| <[u8; 4]>::try_from(bytes).ok()).map(u32::from_be_bytes)
    }
}
