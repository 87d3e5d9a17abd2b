//! Chunk offset atom for file sizes above the 32bit limit (`co64`).
//! The 64-bit equivalent of the `stco` atom.
//!
//! Path: `moov/trak[multiple]/mdia/minf/stbl/co64`

use crate::{atom::AtomPayload, QtError};

/// Chunk offset atom for file sizes above the 32bit limit (`co64`).
#[derive(Debug, Default, Clone)]
pub struct Co64 {
    pub(crate) offsets: Vec<u64>,
}

impl Co64 {
    pub(crate) fn read(payload: &mut AtomPayload) -> Result<Self, QtError> {
        payload.version_flags()?;
        let count = payload.read_be::<u32>()?;
        let offsets = payload.read_table(count, 8)?;
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
            .map(|o| o.saturating_add(begin_offset))
            .collect()
    }
}
