//! Elementary stream descriptor atom (`esds`).
//!
//! Found among the extensions of an MPEG-4 audio or video sample description,
//! either directly or nested in a `wave` atom.
//! Holds the MPEG-4 object type and the decoder specific info
//! (e.g. the AAC `AudioSpecificConfig`).
//!
//! See ISO/IEC 14496-1, 7.2.6.5 `ES_Descriptor`.

use std::io::Cursor;

use binrw::BinReaderExt;

use crate::{atom::AtomHeader, FourCC, QtError};

const ES_DESCRIPTOR: u8 = 0x03;
const DECODER_CONFIG_DESCRIPTOR: u8 = 0x04;
const DECODER_SPECIFIC_INFO: u8 = 0x05;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Esds {
    /// MPEG-4 object type, e.g. `0x40` for MPEG-4 audio.
    pub object_type_id: u8,
    pub stream_type: u8,
    pub max_bitrate: u32,
    pub avg_bitrate: u32,
    pub decoder_specific_info: Vec<u8>,
}

impl Esds {
    /// Parses the `esds` payload, including its version and flags.
    pub fn parse(data: &[u8]) -> Result<Self, QtError> {
        let mut cursor = Cursor::new(data);
        let _version_flags = cursor.read_be::<u32>()?;
        let mut esds = Self::default();

        let (tag, _) = read_descriptor(&mut cursor)?;
        if tag == ES_DESCRIPTOR {
            let _es_id = cursor.read_be::<u16>()?;
            let flags = cursor.read_be::<u8>()?;
            if flags & 0x80 != 0 {
                let _depends_on = cursor.read_be::<u16>()?;
            }
            if flags & 0x40 != 0 {
                let url_len = cursor.read_be::<u8>()?;
                cursor.set_position(cursor.position() + url_len as u64);
            }
            if flags & 0x20 != 0 {
                let _ocr_es_id = cursor.read_be::<u16>()?;
            }
        } else {
            // some writers omit the ES descriptor wrapper
            cursor.set_position(4);
        }

        let (tag, _) = read_descriptor(&mut cursor)?;
        if tag != DECODER_CONFIG_DESCRIPTOR {
            return Err(QtError::MalformedIndex(format!("esds: expected decoder config descriptor, found tag {tag:#04x}")))
        }
        esds.object_type_id = cursor.read_be::<u8>()?;
        esds.stream_type = cursor.read_be::<u8>()? >> 2;
        let _buffer_size = cursor.read_be::<[u8; 3]>()?;
        esds.max_bitrate = cursor.read_be::<u32>()?;
        esds.avg_bitrate = cursor.read_be::<u32>()?;

        if let Ok((DECODER_SPECIFIC_INFO, len)) = read_descriptor(&mut cursor) {
            let start = cursor.position() as usize;
            let end = start.saturating_add(len as usize).min(data.len());
            esds.decoder_specific_info = data.get(start..end)
                .map(|d| d.to_vec())
                .unwrap_or_default();
        }

        Ok(esds)
    }

    /// Searches sample description extensions for an `esds` atom,
    /// descending into `wave` if present.
    pub fn find(extensions: &[u8]) -> Option<Self> {
        let mut cursor = Cursor::new(extensions);
        let end = extensions.len() as u64;
        loop {
            // trailing garbage or a terminator ends the search
            let header = AtomHeader::next_atom(&mut cursor, end).ok()??;
            let range = header.payload_range();
            let payload = extensions.get(range.start as usize .. range.end as usize)?;
            match header.name {
                FourCC::ESDS => return Self::parse(payload).ok(),
                FourCC::WAVE => {
                    if let Some(esds) = Self::find(payload) {
                        return Some(esds)
                    }
                },
                _ => (),
            }
            cursor.set_position(header.end());
        }
    }
}

/// Reads descriptor tag and its variable length size
/// (up to four 7-bit groups).
fn read_descriptor(cursor: &mut Cursor<&[u8]>) -> Result<(u8, u32), QtError> {
    let tag = cursor.read_be::<u8>()?;
    let mut len = 0_u32;
    for _ in 0..4 {
        let b = cursor.read_be::<u8>()?;
        len = (len << 7) | (b & 0x7f) as u32;
        if b & 0x80 == 0 {
            break
        }
    }
    Ok((tag, len))
}
