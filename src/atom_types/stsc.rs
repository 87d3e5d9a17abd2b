//! Sample to chunk atom (`stsc`)
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/stsc`
//!
//! See:
//! - Sample to chunk atom: <https://developer.apple.com/documentation/quicktime-file-format/sample-to-chunk_atom>
//! - <https://github.com/essential61/mp4analyser/wiki/Understanding-The-Sample-Tables:-An-Example>

use binrw::BinRead;

use crate::{atom::AtomPayload, QtError};

/// Sample to chunk atom (`stsc`)
#[derive(Debug, Default)]
pub struct Stsc {
    pub(crate) table: Vec<SampleToChunk>,
}

impl Stsc {
    pub(crate) fn read(payload: &mut AtomPayload) -> Result<Self, QtError> {
        payload.version_flags()?;
        let count = payload.read_be::<u32>()?;
        let table = payload.read_table(count, SampleToChunk::WIDTH)?;
        Ok(Self { table })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[br(big)]
pub struct SampleToChunk {
    /// 1-based index of first chunk
    /// that contains the number of
    /// samples specified in `samples_per_chunk`.
    /// The following chunks will all contain the
    /// same number of samples until the next
    /// sample to chunk entry.
    pub first_chunk: u32,
    pub samples_per_chunk: u32,
    /// 1-based index into the track's sample descriptions.
    pub sample_description_id: u32,
}

impl SampleToChunk {
    pub const WIDTH: u64 = 12;
}
