use std::ops::Range;

use binrw::BinReaderExt;

use crate::{stream::ByteStream, FourCC, QtError, CONTAINER};

/// Atom header.
/// 8 or 16 bytes, depending on whether
/// 32 or 64-bit sized.
///
/// ```ignore
/// | [X X X X] [Y Y Y Y] [Z Z Z Z Z Z Z Z] |
///    |         |         |
///    |         |         64bit size (optional, only if 32 bit size == 1)
///    |         FourCC
///    32bit size (0 = extends to end of parent)
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomHeader {
    /// Total atom size in bytes including 8/16 byte header.
    pub(crate) atom_size: u64,
    /// FourCC
    pub(crate) name: FourCC,
    /// Absolute byte offset for start of atom,
    /// i.e. byte offset for its header,
    /// starting with 32-bit size.
    pub(crate) offset: u64,
    /// Set to `true` if atom size is specified
    /// in the 64 bit field (32 bit size set to `1`).
    /// Some writers do this regardless of actual
    /// atom size, so header size can not be derived
    /// from the size itself.
    pub(crate) size_64bit: bool,
}

impl AtomHeader {
    /// Reads the atom header at the current stream position.
    ///
    /// `end` is the absolute end of the parent atom (or of the stream
    /// for top-level atoms). Returns `Ok(None)` when fewer than 8 bytes
    /// remain before `end`, or for a zero-sized atom with nothing left to
    /// extend over, which terminates the container.
    ///
    /// Leaves the stream positioned at the atom payload.
    pub fn next_atom<S: ByteStream>(stream: &mut S, end: u64) -> Result<Option<Self>, QtError> {
        let offset = stream.tell()?;
        let available = end.saturating_sub(offset);
        if available < 8 {
            return Ok(None)
        }

        let size = stream.read_be::<u32>()?;
        let name = FourCC(stream.read_be::<[u8; 4]>()?);

        let mut hdr = Self {
            atom_size: size as u64,
            name,
            offset,
            size_64bit: false,
        };

        match size {
            1 => {
                if available < 16 {
                    return Err(hdr.malformed())
                }
                hdr.atom_size = stream.read_be::<u64>()?;
                hdr.size_64bit = true;
            },
            0 => {
                // extends to the end of the parent
                hdr.atom_size = available;
                if hdr.atom_size <= hdr.header_size() {
                    return Ok(None)
                }
            },
            _ => (),
        }

        if hdr.atom_size < hdr.header_size() || hdr.atom_size > available {
            return Err(hdr.malformed())
        }

        Ok(Some(hdr))
    }

    pub(crate) fn malformed(&self) -> QtError {
        QtError::MalformedAtom {
            name: self.name.to_string(),
            offset: self.offset,
            size: self.atom_size,
        }
    }

    /// Convenience method to check whether atom is
    /// one of the standard containers.
    pub fn is_container(&self) -> bool {
        CONTAINER.contains(&self.name)
    }

    pub fn name(&self) -> &FourCC {
        &self.name
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn atom_size(&self) -> u64 {
        self.atom_size
    }

    /// Header size in bytes, 8 or 16.
    pub fn header_size(&self) -> u64 {
        match self.size_64bit {
            true => 16,
            false => 8,
        }
    }

    /// Payload absolute offset,
    /// i.e. position after header.
    pub fn data_offset(&self) -> u64 {
        self.offset + self.header_size()
    }

    /// Size of payload (excludes header size).
    pub fn data_size(&self) -> u64 {
        self.atom_size.saturating_sub(self.header_size())
    }

    /// Absolute offset to next sibling atom.
    pub fn end(&self) -> u64 {
        self.offset + self.atom_size
    }

    /// Payload range `[data_offset, end)`.
    pub fn payload_range(&self) -> Range<u64> {
        self.data_offset() .. self.end()
    }

    /// Returns `true` if absolute offset `pos`
    /// is contained within atom span.
    pub fn contains(&self, pos: u64) -> bool {
        self.offset <= pos && self.end() > pos
    }
}
