//! Sample size atom (`stsz`).
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/stsz`
//!
//! Note that `stsz` lists sample size not chunk size.
//! `stco` or `co64` list chunk offsets, not offsets to individual samples.
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/sample_size_atom>

use crate::{atom::AtomPayload, QtError};

/// Per-track sample sizes in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleSize {
    /// All samples share one size.
    Constant(u32),
    /// Explicit size per sample.
    PerSample(Vec<u32>),
}

impl Default for SampleSize {
    fn default() -> Self {
        Self::PerSample(Vec::new())
    }
}

impl SampleSize {
    /// Size of `sample` in bytes.
    pub fn get(&self, sample: u32) -> Option<u32> {
        match self {
            Self::Constant(size) => Some(*size),
            Self::PerSample(sizes) => sizes.get(sample as usize).copied(),
        }
    }

    /// Byte size of `count` samples starting at `first`.
    pub fn range_sum(&self, first: u32, count: u32) -> Option<u64> {
        match self {
            Self::Constant(size) => Some(*size as u64 * count as u64),
            Self::PerSample(sizes) => {
                let start = first as usize;
                let end = start.checked_add(count as usize)?;
                Some(sizes.get(start..end)?
                    .iter()
                    .map(|s| *s as u64)
                    .sum())
            },
        }
    }
}

/// Sample size atom (`stsz`).
///
/// Location: `moov/trak[multiple]/mdia/minf/stbl/stsz`
#[derive(Debug, Default)]
pub struct Stsz {
    pub(crate) sizes: SampleSize,
    /// Declared number of samples.
    pub(crate) count: u32,
}

impl Stsz {
    pub(crate) fn read(payload: &mut AtomPayload) -> Result<Self, QtError> {
        payload.version_flags()?;
        let sample_size = payload.read_be::<u32>()?;
        let count = payload.read_be::<u32>()?;
        let sizes = match sample_size {
            0 => SampleSize::PerSample(payload.read_table(count, 4)?),
            size => SampleSize::Constant(size),
        };
        Ok(Self { sizes, count })
    }
}
