//! NDR 2.0 conformant varying strings, and a bounds-checked read cursor
//! over NDR stub data.

use std::{
    fmt::Display,
    io::{Cursor, Seek, Write},
};

use binrw::{prelude::*, Endian};

use crate::{guid, packets::rpc::pdu::DceRpcSyntaxId, Error};

/// NDR transfer syntax, version 2.0.
pub const NDR_TRANSFER_SYNTAX: DceRpcSyntaxId = DceRpcSyntaxId {
    uuid: guid!("8a885d04-1ceb-11c9-9fe8-08002b104860"),
    version: 2,
    version_minor: 0,
};

/// Max count, offset and actual count preceding a conformant varying array.
#[binrw::binrw]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[brw(little)]
pub struct NdrVaryingHeader {
    pub max_count: u32,
    pub offset: u32,
    pub actual_count: u32,
}

impl NdrVaryingHeader {
    pub const SIZE: usize = 12;
}

/// A conformant varying UTF-16 string.
///
/// `data` holds the code units including the null terminator, so the NDR
/// counts are simply `data.len()`. Writing pads the string to a 4-byte
/// boundary.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NdrWideString {
    data: Vec<u16>,
}

impl NdrWideString {
    /// Number of code units on the wire, terminator included.
    pub fn count(&self) -> u32 {
        self.data.len() as u32
    }

    /// Pad bytes written after the units to restore 4-byte alignment.
    pub fn pad_size(&self) -> usize {
        if self.data.len() % 2 == 1 {
            2
        } else {
            0
        }
    }
}

impl From<&str> for NdrWideString {
    fn from(s: &str) -> Self {
        Self {
            data: s.encode_utf16().chain(std::iter::once(0)).collect(),
        }
    }
}

impl Display for NdrWideString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let units = self.data.strip_suffix(&[0u16]).unwrap_or(&self.data);
        write!(f, "{}", String::from_utf16_lossy(units))
    }
}

impl BinWrite for NdrWideString {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        NdrVaryingHeader {
            max_count: self.count(),
            offset: 0,
            actual_count: self.count(),
        }
        .write_options(writer, endian, ())?;
        self.data.write_options(writer, endian, ())?;
        vec![0u8; self.pad_size()].write_options(writer, endian, ())?;
        Ok(())
    }
}

/// Read cursor over NDR-encoded data.
///
/// Every read is bounds checked against the buffer. The position itself may
/// end up past the end of the buffer, but only by a trailing alignment pad;
/// [`NdrReader::is_past_end`] reports that.
#[derive(Debug)]
pub struct NdrReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> NdrReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_position(data, 0)
    }

    pub fn with_position(data: &'a [u8], position: usize) -> Self {
        Self { data, position }
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub fn is_past_end(&self) -> bool {
        self.position > self.data.len()
    }

    /// Reads a little-endian u32 at an absolute offset, without moving the cursor.
    pub fn peek_u32(&self, offset: usize) -> Option<u32> {
        let bytes = self.data.get(offset..offset.checked_add(4)?)?;
        u32::read_le(&mut Cursor::new(bytes)).ok()
    }

    fn advance(&mut self, by: usize) -> crate::Result<()> {
        self.position = self.position.checked_add(by).ok_or_else(|| {
            Error::MalformedResponse(format!("Offset overflow at {}", self.position))
        })?;
        Ok(())
    }

    /// Reads the three count fields of a conformant varying array.
    pub fn read_varying_header(&mut self) -> crate::Result<NdrVaryingHeader> {
        let bytes = self
            .position
            .checked_add(NdrVaryingHeader::SIZE)
            .and_then(|end| self.data.get(self.position..end))
            .ok_or_else(|| {
                Error::MalformedResponse(format!(
                    "Array header at offset {} exceeds buffer of {} bytes",
                    self.position,
                    self.data.len()
                ))
            })?;
        let header = NdrVaryingHeader::read(&mut Cursor::new(bytes))?;
        if header.offset != 0 {
            log::debug!(
                "Ignoring non-zero varying offset {} at {}",
                header.offset,
                self.position
            );
        }
        self.advance(NdrVaryingHeader::SIZE)?;
        Ok(header)
    }

    /// Reads a conformant varying UTF-16LE string and skips its alignment pad.
    ///
    /// The null terminator is not part of the result. Undecodable units yield
    /// an empty string rather than an error.
    pub fn read_wide_string(&mut self) -> crate::Result<String> {
        let header = self.read_varying_header()?;
        let actual_count = header.actual_count as usize;
        let end = actual_count
            .checked_mul(2)
            .and_then(|size| self.position.checked_add(size))
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                Error::MalformedResponse(format!(
                    "String of {} units at offset {} exceeds buffer of {} bytes",
                    actual_count,
                    self.position,
                    self.data.len()
                ))
            })?;

        let value = if actual_count > 1 {
            // Last unit is the terminator.
            decode_utf16le(&self.data[self.position..end - 2])
        } else {
            String::new()
        };

        self.position = end;
        if actual_count % 2 == 1 {
            self.advance(2)?;
        }
        Ok(value)
    }
}

fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16(&units).unwrap_or_else(|e| {
        log::warn!("Undecodable UTF-16 string data ({e}), using an empty string");
        String::new()
    })
}
