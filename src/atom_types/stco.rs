//! Chunk offset atom for file sizes below the 32bit limit (`stco`).
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/stco`
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/chunk_offset_atom>

use crate::{atom::AtomPayload, QtError};

/// Chunk offset atom for file sizes below the 32bit limit (`stco`).
#[derive(Debug, Default, Clone)]
pub struct Stco {
    pub(crate) offsets: Vec<u32>,
}

impl Stco {
    pub(crate) fn read(payload: &mut AtomPayload) -> Result<Self, QtError> {
        payload.version_flags()?;
        let count = payload.read_be::<u32>()?;
        let offsets = payload.read_table(count, 4)?;
        Ok(Self { offsets })
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Absolute offsets, shifted by `begin_offset`.
    pub fn absolute(&self, begin_offset: u64) -> Vec<u64> {
        self.offsets.iter()
            .map(|o| *o as u64 + begin_offset)
            .collect()
    }
}
