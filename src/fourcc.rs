//! QuickTime atom and codec FourCC.
//! See <https://developer.apple.com/documentation/quicktime-file-format/atoms>.
//!
//! Some FourCC use single-byte characters above the ASCII range,
//! so the tag is kept as raw bytes and only mapped to
//! ISO8859-1 characters for display.

use std::fmt::Display;

use crate::support::string_from_bytes;

/// QuickTime Four CC. Used both for atom types
/// and for codec tags in sample descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    // Containers
    pub const MOOV: Self = Self(*b"moov");
    pub const TRAK: Self = Self(*b"trak");
    pub const MDIA: Self = Self(*b"mdia");
    pub const MINF: Self = Self(*b"minf");
    pub const STBL: Self = Self(*b"stbl");
    pub const EDTS: Self = Self(*b"edts");
    pub const DINF: Self = Self(*b"dinf");
    pub const TREF: Self = Self(*b"tref");
    pub const UDTA: Self = Self(*b"udta");
    pub const GMHD: Self = Self(*b"gmhd");
    pub const CMOV: Self = Self(*b"cmov");
    pub const WAVE: Self = Self(*b"wave");

    // Leaf atoms
    pub const FTYP: Self = Self(*b"ftyp");
    pub const MDAT: Self = Self(*b"mdat");
    pub const FREE: Self = Self(*b"free");
    pub const SKIP: Self = Self(*b"skip");
    pub const WIDE: Self = Self(*b"wide");
    pub const MVHD: Self = Self(*b"mvhd");
    pub const TKHD: Self = Self(*b"tkhd");
    pub const MDHD: Self = Self(*b"mdhd");
    pub const HDLR: Self = Self(*b"hdlr");
    pub const ELST: Self = Self(*b"elst");
    pub const STSD: Self = Self(*b"stsd");
    pub const STTS: Self = Self(*b"stts");
    pub const STSS: Self = Self(*b"stss");
    pub const STSC: Self = Self(*b"stsc");
    pub const STSZ: Self = Self(*b"stsz");
    pub const STCO: Self = Self(*b"stco");
    pub const CO64: Self = Self(*b"co64");
    pub const DCOM: Self = Self(*b"dcom");
    pub const CMVD: Self = Self(*b"cmvd");
    pub const ESDS: Self = Self(*b"esds");

    // Handler sub types
    pub const SOUN: Self = Self(*b"soun");
    pub const VIDE: Self = Self(*b"vide");

    // Compressors (`dcom`)
    pub const ZLIB: Self = Self(*b"zlib");

    pub fn from_slice(fourcc: &[u8]) -> Option<Self> {
        let bytes: [u8; 4] = fourcc.get(..4)?.try_into().ok()?;
        Some(Self(bytes))
    }

    pub fn from_u32(value: u32) -> Self {
        Self(value.to_be_bytes())
    }

    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Returns `true` for `[0, 0, 0, 0]`,
    /// e.g. padding at the end of a container.
    pub fn is_null(&self) -> bool {
        self.0 == [0; 4]
    }
}

impl Display for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", string_from_bytes(&self.0, false))
    }
}

impl From<[u8; 4]> for FourCC {
    fn from(value: [u8; 4]) -> Self {
        Self(value)
    }
}

impl From<&[u8; 4]> for FourCC {
    fn from(value: &[u8; 4]) -> Self {
        Self(*value)
    }
}
