//! Sync sample atom (`stss`).
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/stss`
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/sync_sample_atom>

use crate::{atom::AtomPayload, QtError};

/// Sync sample atom (`stss`). Lists keyframes as
/// 1-based sample numbers. A track without `stss`
/// treats every sample as a sync sample.
#[derive(Debug, Default)]
pub struct Stss {
    pub(crate) samples: Vec<u32>,
}

impl Stss {
    pub(crate) fn read(payload: &mut AtomPayload) -> Result<Self, QtError> {
        payload.version_flags()?;
        let count = payload.read_be::<u32>()?;
        let samples = payload.read_table(count, 4)?;
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[u32] {
        &self.samples
    }
}
