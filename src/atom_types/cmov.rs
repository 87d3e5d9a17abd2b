//! Compressed movie atom (`cmov`).
//!
//! Location: `moov/cmov`
//!
//! Contains a compression atom (`dcom`) naming the compressor
//! and the compressed movie data (`cmvd`), which inflates
//! to a complete `moov` atom. Only `zlib` is supported.

use std::io::{Cursor, Read};

use binrw::BinReaderExt;
use flate2::read::ZlibDecoder;

use crate::{atom::{AtomHeader, AtomPayload}, FourCC, QtError};

#[derive(Debug, Default)]
pub struct Cmov {
    pub(crate) compressor: FourCC,
    /// Declared size after decompression.
    pub(crate) uncompressed_size: u32,
    pub(crate) compressed: Vec<u8>,
}

impl Cmov {
    pub(crate) fn read(payload: &mut AtomPayload) -> Result<Self, QtError> {
        let data = payload.rest();
        let end = data.len() as u64;
        let mut cursor = Cursor::new(data);
        let mut cmov = Self::default();

        while let Some(header) = AtomHeader::next_atom(&mut cursor, end)? {
            match header.name {
                FourCC::DCOM => {
                    cmov.compressor = FourCC(cursor.read_be::<[u8; 4]>()?);
                },
                FourCC::CMVD => {
                    cmov.uncompressed_size = cursor.read_be::<u32>()?;
                    let start = cursor.position() as usize;
                    cmov.compressed = data.get(start .. header.end() as usize)
                        .map(|d| d.to_vec())
                        .unwrap_or_default();
                },
                _ => (),
            }
            cursor.set_position(header.end());
        }

        Ok(cmov)
    }

    /// Inflates the movie data. Output is capped at `max` bytes.
    pub(crate) fn expand(&self, max: u64) -> Result<Vec<u8>, QtError> {
        if self.compressor != FourCC::ZLIB {
            return Err(QtError::Decompress(format!("unsupported compressor '{}'", self.compressor)))
        }
        let size = self.uncompressed_size as u64;
        if size > max {
            return Err(QtError::AtomTooLarge { name: FourCC::CMVD.to_string(), size, max })
        }

        let mut out = Vec::with_capacity(size as usize);
        ZlibDecoder::new(self.compressed.as_slice())
            .take(size)
            .read_to_end(&mut out)
            .map_err(|e| QtError::Decompress(e.to_string()))?;

        if out.len() as u64 != size {
            log::warn!("cmvd: expected {size} bytes after decompression, got {}", out.len());
        }

        Ok(out)
    }
}
