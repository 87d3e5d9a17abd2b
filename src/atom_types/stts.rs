//! Time-to-sample atom (`stts`).
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/stts`
//!
//! See <https://developer.apple.com/documentation/quicktime-file-format/time-to-sample_atom>

use binrw::BinRead;

use crate::{atom::AtomPayload, QtError};

/// Run of `count` consecutive samples with the same duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[br(big)]
pub struct TimeToSample {
    pub count: u32,
    /// Duration in the track's time scale.
    pub duration: u32,
}

impl TimeToSample {
    pub const WIDTH: u64 = 8;

    /// Total duration of this run, in ticks.
    pub fn span(&self) -> u64 {
        self.count as u64 * self.duration as u64
    }
}

/// Time to sample atom (`stts`).
///
/// Path: `moov/trak[multiple]/mdia/minf/stbl/stts`
#[derive(Debug, Default)]
pub struct Stts {
    pub(crate) table: Vec<TimeToSample>,
}

impl Stts {
    pub(crate) fn read(payload: &mut AtomPayload) -> Result<Self, QtError> {
        payload.version_flags()?;
        let count = payload.read_be::<u32>()?;
        let table = payload.read_table(count, TimeToSample::WIDTH)?;
        Ok(Self { table })
    }

    /// Total number of samples.
    pub fn sample_sum(&self) -> u64 {
        self.table.iter()
            .map(|t| t.count as u64)
            .sum()
    }

    /// Total duration in ticks.
    pub fn duration_sum(&self) -> u64 {
        self.table.iter()
            .map(TimeToSample::span)
            .sum()
    }
}
