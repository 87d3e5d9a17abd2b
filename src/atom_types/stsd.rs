//! Sample description atom (`stsd`).
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/stsd`
//!
//! Only the common entry header is read here. The format-specific
//! body is interpreted by a `SampleDescriptionRegistry`.
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/sample_description_atom>

use crate::{atom::AtomPayload, FourCC, QtError};

/// Raw `stsd` entry.
#[derive(Debug, Clone)]
pub struct StsdEntry {
    /// Data format, e.g. `twos`, `ima4`, `mp4a`, `avc1`.
    pub(crate) codec_tag: FourCC,
    pub(crate) data_reference_index: u16,
    /// Entry payload after the 16 byte common header.
    pub(crate) body: Vec<u8>,
}

impl StsdEntry {
    /// Size of the common header:
    /// size (4), format (4), reserved (6), data reference index (2).
    pub const HEADER_SIZE: u64 = 16;

    pub fn codec_tag(&self) -> FourCC {
        self.codec_tag
    }

    /// 1-based index into the data references (`dref`).
    pub fn data_reference_index(&self) -> u16 {
        self.data_reference_index
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Sample description atom (`stsd`).
#[derive(Debug, Default)]
pub struct Stsd {
    pub(crate) entries: Vec<StsdEntry>,
}

impl Stsd {
    pub(crate) fn read(payload: &mut AtomPayload) -> Result<Self, QtError> {
        payload.version_flags()?;
        let count = payload.read_be::<u32>()?;
        // each entry holds at least its common header
        payload.check_table(count, StsdEntry::HEADER_SIZE)?;

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let size = payload.read_be::<u32>()? as u64;
            if size < StsdEntry::HEADER_SIZE || size - 4 > payload.remaining() {
                return Err(payload.header().malformed())
            }
            let codec_tag = FourCC(payload.read_be::<[u8; 4]>()?);
            payload.skip(6)?;
            let data_reference_index = payload.read_be::<u16>()?;
            let body = payload.read_bytes(size - StsdEntry::HEADER_SIZE)?;
            entries.push(StsdEntry { codec_tag, data_reference_index, body });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[StsdEntry] {
        &self.entries
    }
}
