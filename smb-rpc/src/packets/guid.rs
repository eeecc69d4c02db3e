use std::{fmt::Display, io::Cursor, str::FromStr};

use binrw::prelude::*;

/// Represents a standard, 16-byte DCE UUID.
///
/// Serialized in the DCE field order: the first three fields little-endian,
/// the trailing eight bytes as-is.
#[derive(BinRead, BinWrite, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[brw(little)]
pub struct Guid(u32, u16, u16, [u8; 8]);

macro_rules! hex_byte {
    ($b:expr, $i:expr) => {
        match super::util::parse_byte($b, $i) {
            Ok(v) => v,
            Err(e) => return Err(e),
        }
    };
}

impl Guid {
    /// The size of a GUID, in Bytes
    pub const GUID_SIZE: usize = 16;

    /// Parses `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`, optionally wrapped in braces.
    pub const fn parse_uuid(s: &str) -> Result<Guid, &'static str> {
        let b = s.as_bytes();
        let so = if b.len() == 38 && b[0] == b'{' && b[37] == b'}' {
            1
        } else if b.len() == 36 {
            0
        } else {
            return Err("Invalid UUID format");
        };
        if b[so + 8] != b'-' || b[so + 13] != b'-' || b[so + 18] != b'-' || b[so + 23] != b'-' {
            return Err("Invalid UUID format");
        }
        Ok(Guid(
            u32::from_be_bytes([
                hex_byte!(b, so),
                hex_byte!(b, so + 2),
                hex_byte!(b, so + 4),
                hex_byte!(b, so + 6),
            ]),
            u16::from_be_bytes([hex_byte!(b, so + 9), hex_byte!(b, so + 11)]),
            u16::from_be_bytes([hex_byte!(b, so + 14), hex_byte!(b, so + 16)]),
            [
                hex_byte!(b, so + 19),
                hex_byte!(b, so + 21),
                hex_byte!(b, so + 24),
                hex_byte!(b, so + 26),
                hex_byte!(b, so + 28),
                hex_byte!(b, so + 30),
                hex_byte!(b, so + 32),
                hex_byte!(b, so + 34),
            ],
        ))
    }
}

/// A macro to create a `Guid` from a string literal at compile time.
#[macro_export]
macro_rules! guid {
    ($s:literal) => {{
        match $crate::packets::guid::Guid::parse_uuid($s) {
            Ok(guid) => guid,
            Err(_) => panic!("Invalid GUID format"),
        }
    }};
}

impl TryFrom<&[u8; Guid::GUID_SIZE]> for Guid {
    type Error = binrw::Error;

    fn try_from(value: &[u8; Guid::GUID_SIZE]) -> Result<Self, Self::Error> {
        let mut cursor = Cursor::new(value);
        Guid::read(&mut cursor)
    }
}

impl FromStr for Guid {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Guid::parse_uuid(s)
    }
}

impl Display for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-",
            self.0, self.1, self.2, self.3[0], self.3[1],
        )?;
        for b in &self.3[2..] {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}
