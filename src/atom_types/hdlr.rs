//! Handler reference atom (`hdlr`).
//!
//! > Note: Distinguish from 'Metadata handler atom' with the same FourCC.
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/handler_reference_atom>

use binrw::BinRead;

use crate::{atom::AtomPayload, support::component_name, FourCC, QtError};

/// Handler reference atom (`hdlr`)
///
/// See: <https://developer.apple.com/documentation/quicktime-file-format/handler_reference_atom>
#[derive(Debug, Default, BinRead)]
#[br(big)]
pub struct Hdlr {
    _version: u8,
    _flags: [u8; 3],
    /// Possible values:
    /// - `mhlr`: media handler
    /// - `dhlr`: data handler
    /// - `[0, 0, 0, 0]` (MPEG-4)
    #[br(map = |data: [u8; 4]| FourCC(data))]
    pub(crate) component_type: FourCC,
    /// Type of media or data handler,
    /// e.g. `soun`, `vide`, `alis`.
    #[br(map = |data: [u8; 4]| FourCC(data))]
    pub(crate) component_sub_type: FourCC,
    /// Reserved, should be set to 0.
    _component_manufacturer: u32,
    /// Reserved, should be set to 0.
    _component_flags: u32,
    /// Reserved, should be set to 0.
    _component_flags_mask: u32,
    /// May be a counted string (first byte specifies size),
    /// null terminated string, or neither. Parsed separately
    /// from the remaining payload.
    #[br(ignore)]
    pub(crate) component_name: String,
}

impl Hdlr {
    pub(crate) fn read(payload: &mut AtomPayload) -> Result<Self, QtError> {
        let mut hdlr = payload.read_be::<Self>()?;
        hdlr.component_name = component_name(payload.rest());
        Ok(hdlr)
    }

    /// Returns `true` for data handlers (`dhlr`),
    /// which describe data references rather than the media type.
    pub fn is_data_handler(&self) -> bool {
        self.component_type == FourCC(*b"dhlr")
    }

    pub fn component_sub_type(&self) -> FourCC {
        self.component_sub_type
    }

    pub fn component_name(&self) -> &str {
        self.component_name.as_str()
    }
}
