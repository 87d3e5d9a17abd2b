use time::{self, Duration, Month, PrimitiveDateTime};

use crate::FourCC;

/// FourCC:s for known "container" atoms.
/// These are nested and contain more atoms,
/// within their specified, total size.
///
/// - `moov`: movie, tracks and timing
/// - `trak`: moov.trak (multiple)
/// - `edts`: moov.trak.edts, holds the edit list
/// - `mdia`: moov.trak.mdia
/// - `minf`: moov.trak.mdia.minf
/// - `stbl`: moov.trak.mdia.minf.stbl, sample tables
/// - `dinf`: moov.trak.mdia.minf.dinf
/// - `tref`: moov.trak.tref
/// - `udta`: user data
/// - `gmhd`: base media info for non-audio/video tracks
pub const CONTAINER: [FourCC; 10] = [
    FourCC::MOOV,
    FourCC::TRAK,
    FourCC::EDTS,
    FourCC::MDIA,
    FourCC::MINF,
    FourCC::STBL,
    FourCC::DINF,
    FourCC::TREF,
    FourCC::UDTA,
    FourCC::GMHD,
];

/// Default upper bound on the number of tracks in a movie.
pub const MAX_TRACKS: usize = 256;

/// Default max nesting depth for container atoms.
pub const MAX_DEPTH: usize = 32;

/// Default max leaf atom payload (64 MiB) buffered in memory.
pub const MAX_LEAF_SIZE: u64 = 64 * 1024 * 1024;

/// 16.16 fixed point one.
pub const FIXED_ONE: i32 = 0x10000;

/// Time zero for QuickTime containers. Midnight January 1, 1904.
pub fn qt_time_zero() -> PrimitiveDateTime {
    time::Date::from_calendar_date(1904, Month::January, 1)
        .map(|d| d.midnight())
        .unwrap_or(PrimitiveDateTime::MIN)
}

/// Datetime `seconds` after `qt_time_zero()`.
/// `None` if outside the range `PrimitiveDateTime` can represent.
pub fn qt_time(seconds: u64) -> Option<PrimitiveDateTime> {
    let seconds = i64::try_from(seconds).ok()?;
    qt_time_zero().checked_add(Duration::seconds(seconds))
}
