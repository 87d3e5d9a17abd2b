//! Known audio and video data formats (codec tags) in sample descriptions.
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/sound_sample_descriptions>

use std::fmt::Display;

use crate::FourCC;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AudioFormat {
    /// `NONE` kSoundNotCompressed. Should not be used,
    /// but may be found in some files. Same as `twos`.
    None,
    /// `raw ` k8BitOffsetBinaryFormat
    Raw,
    /// `twos` k16BitBigEndianFormat, or signed 8-bit
    Twos,
    /// `sowt` k16BitLittleEndianFormat
    Sowt,
    /// `in24` k24BitFormat, 24-bit big endian integer
    In24,
    /// `in32` k32BitFormat, 32-bit big endian integer
    In32,
    /// `fl32` kFloat32Format
    Fl32,
    /// `fl64` kFloat64Format
    Fl64,
    /// `ulaw` kULawCompression, uLaw 2:1
    Ulaw,
    /// `alaw` kALawCompression, aLaw 2:1
    Alaw,
    /// `ima4` kIMACompression, IMA 4:1
    Ima4,
    /// `MAC3` kMACE3Compression, MACE 3:1 (Obsolete)
    Mac3,
    /// `MAC6` kMACE6Compression, MACE 6:1 (Obsolete)
    Mac6,
    /// `QDMC` kQDesignCompression, QDesign music
    Qdmc,
    /// `QDM2` kQDesign2Compression, QDesign music version 2
    Qdm2,
    /// `.mp3` MPEG-1 layer 3
    Mp3,
    /// `mp4a` MPEG-4 audio, e.g. AAC
    Mp4a,
    /// `ac-3` AC-3
    Ac3,
}

impl Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fourcc())
    }
}

impl AudioFormat {
    pub fn from_fourcc(tag: FourCC) -> Option<Self> {
        let format = match tag.as_bytes() {
            b"NONE" => Self::None,
            b"raw " => Self::Raw,
            b"twos" => Self::Twos,
            b"sowt" => Self::Sowt,
            b"in24" => Self::In24,
            b"in32" => Self::In32,
            b"fl32" => Self::Fl32,
            b"fl64" => Self::Fl64,
            b"ulaw" => Self::Ulaw,
            b"alaw" => Self::Alaw,
            b"ima4" => Self::Ima4,
            b"MAC3" => Self::Mac3,
            b"MAC6" => Self::Mac6,
            b"QDMC" => Self::Qdmc,
            b"QDM2" => Self::Qdm2,
            b".mp3" => Self::Mp3,
            b"mp4a" => Self::Mp4a,
            b"ac-3" => Self::Ac3,
            _ => return None,
        };
        Some(format)
    }

    /// Returns the codec tag in the form it is stored,
    /// e.g. with a trailing space for three character tags.
    pub fn fourcc(&self) -> FourCC {
        let tag = match self {
            Self::None => b"NONE",
            Self::Raw => b"raw ",
            Self::Twos => b"twos",
            Self::Sowt => b"sowt",
            Self::In24 => b"in24",
            Self::In32 => b"in32",
            Self::Fl32 => b"fl32",
            Self::Fl64 => b"fl64",
            Self::Ulaw => b"ulaw",
            Self::Alaw => b"alaw",
            Self::Ima4 => b"ima4",
            Self::Mac3 => b"MAC3",
            Self::Mac6 => b"MAC6",
            Self::Qdmc => b"QDMC",
            Self::Qdm2 => b"QDM2",
            Self::Mp3 => b".mp3",
            Self::Mp4a => b"mp4a",
            Self::Ac3 => b"ac-3",
        };
        FourCC(*tag)
    }

    /// Uncompressed integer PCM.
    pub fn is_pcm(&self) -> bool {
        matches!(self, Self::None | Self::Raw | Self::Twos | Self::Sowt | Self::In24 | Self::In32)
    }

    /// Fixed packet layout for version 0 sound descriptions,
    /// as `(samples_per_frame, bytes_per_frame_per_channel)`.
    /// `None` for formats whose layout follows from the sample size.
    pub(crate) fn packet_layout(&self) -> Option<(u32, u32)> {
        match self {
            Self::Ima4 => Some((64, 34)),
            Self::Mac3 => Some((6, 2)),
            Self::Mac6 => Some((6, 1)),
            Self::Ulaw | Self::Alaw => Some((1, 1)),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum VideoFormat {
    /// `avc1` H.264 video
    Avc1,
    /// `cvid` Cinepak
    Cvid,
    /// `h263` H.263 video
    H263,
    /// `hvc1` H.265 video
    Hvc1,
    /// `jpeg` JPEG
    Jpeg,
    /// `mjpa` Motion-JPEG (format A)
    Mjpa,
    /// `mp4v` MPEG-4 video
    Mp4v,
    /// `png ` Portable Network Graphics
    Png,
    /// `raw ` Uncompressed RGB
    Raw,
    /// `rle ` Animation
    Rle,
    /// `rpza` Apple video
    Rpza,
    /// `smc ` Graphics
    Smc,
    /// `SVQ1` Sorenson video, version 1
    Svq1,
    /// `SVQ3` Sorenson video 3
    Svq3,
}

impl Display for VideoFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fourcc())
    }
}

impl VideoFormat {
    pub fn from_fourcc(tag: FourCC) -> Option<Self> {
        let format = match tag.as_bytes() {
            b"avc1" => Self::Avc1,
            b"cvid" => Self::Cvid,
            b"h263" => Self::H263,
            b"hvc1" => Self::Hvc1,
            b"jpeg" => Self::Jpeg,
            b"mjpa" => Self::Mjpa,
            b"mp4v" => Self::Mp4v,
            b"png " => Self::Png,
            b"raw " => Self::Raw,
            b"rle " => Self::Rle,
            b"rpza" => Self::Rpza,
            b"smc " => Self::Smc,
            b"SVQ1" => Self::Svq1,
            b"SVQ3" => Self::Svq3,
            _ => return None,
        };
        Some(format)
    }

    pub fn fourcc(&self) -> FourCC {
        let tag = match self {
            Self::Avc1 => b"avc1",
            Self::Cvid => b"cvid",
            Self::H263 => b"h263",
            Self::Hvc1 => b"hvc1",
            Self::Jpeg => b"jpeg",
            Self::Mjpa => b"mjpa",
            Self::Mp4v => b"mp4v",
            Self::Png => b"png ",
            Self::Raw => b"raw ",
            Self::Rle => b"rle ",
            Self::Rpza => b"rpza",
            Self::Smc => b"smc ",
            Self::Svq1 => b"SVQ1",
            Self::Svq3 => b"SVQ3",
        };
        FourCC(*tag)
    }
}
