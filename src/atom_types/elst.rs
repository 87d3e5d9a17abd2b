//! Edit list atom (`elst`).
//!
//! Location: `moov/trak[multiple]/edts/elst`
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/edit_list_atom>

use binrw::BinRead;

use crate::{atom::AtomPayload, QtError, Rational};

/// Single edit. Version 0 entries are widened on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[br(big, import(version: u8))]
pub struct EditListEntry {
    /// Duration of this edit in the movie time scale.
    #[br(parse_with = super::versioned_u64, args(version))]
    pub track_duration: u64,
    /// Start time within the media (track time scale).
    /// `-1` marks an empty edit.
    #[br(parse_with = super::versioned_i64, args(version))]
    pub media_time: i64,
    /// 16.16 fixed point play rate.
    /// `0` holds the media at `media_time` for the edit's duration.
    pub media_rate: i32,
}

impl EditListEntry {
    pub fn is_empty_edit(&self) -> bool {
        self.media_time < 0
    }

    pub fn rate(&self) -> Rational {
        Rational::from_fixed(self.media_rate)
    }
}

/// Edit list atom (`elst`).
///
/// Location: `moov/trak[multiple]/edts/elst`
#[derive(Debug, Default)]
pub struct Elst {
    pub(crate) entries: Vec<EditListEntry>,
}

impl Elst {
    pub(crate) fn read(payload: &mut AtomPayload) -> Result<Self, QtError> {
        let (version, _) = payload.version_flags()?;
        let count = payload.read_be::<u32>()?;
        let width = match version {
            1 => 20,
            _ => 12,
        };
        payload.check_table(count, width)?;
        let entries = (0..count)
            .map(|_| payload.read_args::<EditListEntry>((version,)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[EditListEntry] {
        &self.entries
    }
}
