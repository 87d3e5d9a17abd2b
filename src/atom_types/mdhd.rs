//! Media header atom (`mdhd`).
//!
//! Similar to `mvhd`,
//! but only describes a single track (`trak`).
//!
//! Location: `moov/trak/mdia/mdhd`
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/media_header_atom>

use binrw::BinRead;

use time::PrimitiveDateTime;

use crate::{atom::AtomPayload, consts::qt_time, QtError};

use super::versioned_u64;

/// Media header atom ('mdhd'). One per track (`trak`).
/// Specifies the time scale and duration of the media.
///
/// Path: `moov/trak/mdia/mdhd`
#[derive(Debug, Default, BinRead)]
#[br(big)]
pub struct Mdhd {
    pub(crate) version: u8,
    _flags: [u8; 3],
    #[br(parse_with = versioned_u64, args(version))]
    pub(crate) creation_time: u64,
    #[br(parse_with = versioned_u64, args(version))]
    pub(crate) modification_time: u64,
    pub(crate) time_scale: u32,
    /// Unscaled duration. I.e. "ticks"
    /// that require dividing by time scale
    /// to derive a value in seconds.
    #[br(parse_with = versioned_u64, args(version))]
    pub(crate) duration: u64,
    #[br(map = |data: u16| language_code(data))]
    pub(crate) language: String,
    pub(crate) quality: u16,
}

impl Mdhd {
    pub(crate) fn read(payload: &mut AtomPayload) -> Result<Self, QtError> {
        payload.read_be::<Self>()
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Creation time as UTC datetime, if representable.
    pub fn creation_time(&self) -> Option<PrimitiveDateTime> {
        qt_time(self.creation_time)
    }

    /// Modification time as UTC datetime, if representable.
    pub fn modification_time(&self) -> Option<PrimitiveDateTime> {
        qt_time(self.modification_time)
    }

    /// Playback quality, usually 0.
    pub fn quality(&self) -> u16 {
        self.quality
    }

    pub fn time_scale(&self) -> u32 {
        self.time_scale
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// ISO-639-2/T language code, empty for
    /// Macintosh language codes (values below `0x400`).
    pub fn language(&self) -> &str {
        &self.language
    }
}

/// Three letter ISO639-2/T language code,
/// packed in 16 bits as `X u5 u5 u5`, each `u5` offset by `0x60`.
fn language_code(data: u16) -> String {
    if data < 0x400 {
        return String::new()
    }
    [10_u16, 5, 0].iter()
        .map(|shift| (((data >> shift) & 0x1f) as u8 + 0x60) as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::language_code;

    #[test]
    fn packed_language() {
        // 'u' 'n' 'd'
        let und = ((b'u' - 0x60) as u16) << 10 | ((b'n' - 0x60) as u16) << 5 | (b'd' - 0x60) as u16;
        assert_eq!(language_code(und), "und");
        assert_eq!(language_code(0), "");
    }
}
