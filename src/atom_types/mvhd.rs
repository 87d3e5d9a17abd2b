//! Movie header atom (`mvhd`).
//!
//! Location: `moov/mvhd`
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/movie_header_atom>

use binrw::BinRead;
use time::{ext::NumericalDuration, Duration, PrimitiveDateTime};

use crate::{atom::AtomPayload, consts::qt_time, QtError, Rational};

use super::{versioned_u64, Matrix};

/// Movie header atom (`mvhd`).
///
/// Location: `moov/mvhd`
///
/// Version 1 headers use 64-bit times and duration.
/// Both are read into `u64`.
///
/// See: <https://developer.apple.com/documentation/quicktime-file-format/movie_header_atom>
#[derive(Debug, BinRead)]
#[br(big)]
pub struct Mvhd {
    pub(crate) version: u8,
    _flags: [u8; 3],
    /// Seconds since midnight, 1904-01-01 UTC
    #[br(parse_with = versioned_u64, args(version))]
    pub creation_time: u64,
    /// Seconds since midnight, 1904-01-01 UTC
    #[br(parse_with = versioned_u64, args(version))]
    pub modification_time: u64,
    /// Number of time units that pass in one second
    pub time_scale: u32,
    /// Unscaled duration of the longest track.
    #[br(parse_with = versioned_u64, args(version))]
    pub duration: u64,
    /// 16.16 fixed point preferred play rate
    /// (1.0 = normal playback).
    pub preferred_rate: i32,
    /// 8.8 fixed point preferred volume
    /// (1.0 = full volume).
    pub preferred_volume: i16,
    _reserved: [u8; 10],
    pub matrix: Matrix,
    pub preview_time: u32,
    pub preview_duration: u32,
    pub poster_time: u32,
    pub selection_time: u32,
    pub selection_duration: u32,
    pub current_time: u32,
    pub next_track_id: u32,
}

impl Mvhd {
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

    /// Duration of the longest track.
    pub fn duration(&self) -> Duration {
        match self.time_scale {
            0 => Duration::ZERO,
            ts => (self.duration as f64 / ts as f64).seconds(),
        }
    }

    pub fn preferred_rate(&self) -> Rational {
        Rational::from_fixed(self.preferred_rate)
    }
}
