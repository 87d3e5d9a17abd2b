//! Track header atom (`tkhd`).
//!
//! Location: `moov/trak[multiple]/tkhd`
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/track_header_atom>

use binrw::BinRead;

use time::PrimitiveDateTime;

use crate::{atom::AtomPayload, consts::qt_time, support::fixed_16_16, QtError};

use super::{versioned_u64, Matrix};

/// Track header atom (`tkhd`).
///
/// Location: `moov/trak[multiple]/tkhd`
///
/// See: <https://developer.apple.com/documentation/quicktime-file-format/track_header_atom>
#[derive(Debug, BinRead)]
#[br(big)]
pub struct Tkhd {
    pub(crate) version: u8,
    _flags: [u8; 3],
    #[br(parse_with = versioned_u64, args(version))]
    pub(crate) creation_time: u64,
    #[br(parse_with = versioned_u64, args(version))]
    pub(crate) modification_time: u64,
    /// Uniquely identifies the track.
    /// Value 0 cannot be used.
    pub(crate) track_id: u32,
    _reserved1: [u8; 4],
    /// Duration of this track in the movie time scale.
    /// Equals the sum of the durations of all of the track's edits.
    #[br(parse_with = versioned_u64, args(version))]
    pub(crate) duration: u64,
    _reserved2: [u8; 8],
    pub(crate) layer: i16,
    pub(crate) alternate_group: i16,
    /// 8.8 fixed point.
    pub(crate) volume: i16,
    _reserved3: [u8; 2],
    pub(crate) matrix: Matrix,
    /// 16.16 fixed point.
    pub(crate) track_width: u32,
    /// 16.16 fixed point.
    pub(crate) track_height: u32,
}

impl Tkhd {
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

    /// Stacking order for video tracks, lower is closer to the viewer.
    pub fn layer(&self) -> i16 {
        self.layer
    }

    /// Group of tracks that are alternatives to each other, 0 for none.
    pub fn alternate_group(&self) -> i16 {
        self.alternate_group
    }

    pub fn track_id(&self) -> u32 {
        self.track_id
    }

    /// Track width in pixels (video tracks only).
    pub fn width(&self) -> f64 {
        fixed_16_16(self.track_width as i32)
    }

    /// Track height in pixels (video tracks only).
    pub fn height(&self) -> f64 {
        fixed_16_16(self.track_height as i32)
    }

    /// 1.0 is normal volume.
    pub fn volume(&self) -> f64 {
        self.volume as f64 / 256.0
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }
}
