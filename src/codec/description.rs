//! Standard sound and video sample descriptions.
//!
//! The body of an `stsd` entry, after the 16 byte common header.
//!
//! See:
//! - <https://developer.apple.com/documentation/quicktime-file-format/sound_sample_description>
//! - <https://developer.apple.com/documentation/quicktime-file-format/video_sample_description>

use std::io::Cursor;

use binrw::{BinRead, BinReaderExt};

use crate::{support::counted_string, CodecType, Esds, FourCC, QtError};

use super::AudioFormat;

/// Interpreted `stsd` entry.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleDescription {
    Audio(AudioDescription),
    Video(VideoDescription),
    /// Kept as raw bytes, e.g. for codecs without a registered handler.
    Other(RawDescription),
}

impl SampleDescription {
    pub fn codec_tag(&self) -> FourCC {
        match self {
            Self::Audio(a) => a.codec_tag,
            Self::Video(v) => v.codec_tag,
            Self::Other(r) => r.codec_tag,
        }
    }

    /// Bits per sample for audio, pixel depth for video.
    pub fn bits_per_sample(&self) -> u16 {
        match self {
            Self::Audio(a) => a.bits_per_sample,
            Self::Video(v) => v.depth.max(0) as u16,
            Self::Other(_) => 0,
        }
    }

    pub fn audio(&self) -> Option<&AudioDescription> {
        match self {
            Self::Audio(a) => Some(a),
            _ => None,
        }
    }

    pub fn video(&self) -> Option<&VideoDescription> {
        match self {
            Self::Video(v) => Some(v),
            _ => None,
        }
    }

    /// Interprets the entry body according to `codec_type`.
    pub fn standard(codec_type: CodecType, codec_tag: FourCC, raw: &[u8]) -> Result<Self, QtError> {
        let desc = match codec_type {
            CodecType::Audio => Self::Audio(parse_audio_description(codec_tag, raw)?),
            CodecType::Video => Self::Video(parse_video_description(codec_tag, raw)?),
            CodecType::Other => Self::Other(RawDescription { codec_tag, data: raw.to_vec() }),
        };
        Ok(desc)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawDescription {
    pub codec_tag: FourCC,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioDescription {
    pub codec_tag: FourCC,
    /// Sound description version, 0, 1 or 2.
    pub version: u16,
    pub channels: u16,
    pub bits_per_sample: u16,
    /// Sample rate in Hz. 0 if not set by the file.
    pub sample_rate: f64,
    /// Samples per compressed packet (1 for PCM).
    pub samples_per_frame: u32,
    /// Bytes per packet, all channels.
    pub bytes_per_frame: u32,
    /// Present for MPEG-4 codecs.
    pub esds: Option<Esds>,
    /// Atoms following the description, e.g. `wave` or `esds`.
    pub extensions: Vec<u8>,
}

impl AudioDescription {
    pub fn format(&self) -> Option<AudioFormat> {
        AudioFormat::from_fourcc(self.codec_tag)
    }

    /// Sample rate rounded to whole Hz.
    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate.round().clamp(0.0, u32::MAX as f64) as u32
    }

    /// MPEG-4 object type, if there is an `esds`.
    pub fn object_type_id(&self) -> Option<u8> {
        self.esds.as_ref().map(|e| e.object_type_id)
    }

    /// Decoder specific info from `esds`, e.g. the AAC `AudioSpecificConfig`.
    pub fn decoder_specific_info(&self) -> Option<&[u8]> {
        self.esds.as_ref().map(|e| e.decoder_specific_info.as_slice())
    }

    /// Byte size of `samples` samples of frame-addressed audio.
    pub fn frame_bytes(&self, samples: u32) -> u64 {
        match (self.samples_per_frame, self.bytes_per_frame) {
            (spf, bpf) if spf > 0 && bpf > 0 => (samples / spf) as u64 * bpf as u64,
            _ => samples as u64 * self.channels as u64 * (self.bits_per_sample as u64 / 8),
        }
    }
}

#[derive(Debug, BinRead)]
#[br(big)]
struct SoundDescription {
    version: u16,
    _revision_level: u16,
    _vendor: u32,
    channels: u16,
    sample_size: u16,
    _compression_id: i16,
    _packet_size: u16,
    /// 16.16 unsigned fixed point.
    sample_rate: u32,
    #[br(if(version == 1))]
    v1: Option<SoundDescriptionV1>,
    #[br(if(version == 2))]
    v2: Option<SoundDescriptionV2>,
}

#[derive(Debug, BinRead)]
#[br(big)]
struct SoundDescriptionV1 {
    samples_per_packet: u32,
    _bytes_per_packet: u32,
    bytes_per_frame: u32,
    _bytes_per_sample: u32,
}

#[derive(Debug, BinRead)]
#[br(big)]
struct SoundDescriptionV2 {
    _size_of_struct_only: u32,
    audio_sample_rate: f64,
    num_audio_channels: u32,
    _always_7f000000: u32,
    const_bits_per_channel: u32,
    _format_specific_flags: u32,
    const_bytes_per_audio_packet: u32,
    const_lpcm_frames_per_audio_packet: u32,
}

/// Parses a version 0, 1 or 2 sound sample description.
pub fn parse_audio_description(codec_tag: FourCC, raw: &[u8]) -> Result<AudioDescription, QtError> {
    let mut cursor = Cursor::new(raw);
    let sound = cursor.read_be::<SoundDescription>()?;
    let extensions = raw.get(cursor.position() as usize ..)
        .map(|e| e.to_vec())
        .unwrap_or_default();

    let mut desc = AudioDescription {
        codec_tag,
        version: sound.version,
        channels: sound.channels,
        bits_per_sample: sound.sample_size,
        sample_rate: (sound.sample_rate >> 16) as f64,
        samples_per_frame: 0,
        bytes_per_frame: 0,
        esds: None,
        extensions,
    };

    match (&sound.v1, &sound.v2) {
        (Some(v1), _) => {
            desc.samples_per_frame = v1.samples_per_packet;
            desc.bytes_per_frame = v1.bytes_per_frame;
        },
        (_, Some(v2)) => {
            desc.sample_rate = v2.audio_sample_rate;
            desc.channels = u16::try_from(v2.num_audio_channels).unwrap_or(u16::MAX);
            desc.bits_per_sample = u16::try_from(v2.const_bits_per_channel).unwrap_or(0);
            desc.samples_per_frame = v2.const_lpcm_frames_per_audio_packet;
            desc.bytes_per_frame = v2.const_bytes_per_audio_packet;
        },
        _ => {
            let channels = desc.channels as u32;
            match AudioFormat::from_fourcc(codec_tag).and_then(|f| f.packet_layout()) {
                Some((spf, bytes)) => {
                    desc.samples_per_frame = spf;
                    desc.bytes_per_frame = bytes * channels;
                },
                None => {
                    desc.samples_per_frame = 1;
                    desc.bytes_per_frame = channels * (desc.bits_per_sample as u32 / 8);
                },
            }
        },
    }

    desc.esds = Esds::find(&desc.extensions);

    Ok(desc)
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoDescription {
    pub codec_tag: FourCC,
    pub vendor: u32,
    pub temporal_quality: u32,
    pub spatial_quality: u32,
    /// Width of the source image in pixels.
    pub width: u16,
    /// Height of the source image in pixels.
    pub height: u16,
    /// Pixels per inch.
    pub horizontal_resolution: f64,
    /// Pixels per inch.
    pub vertical_resolution: f64,
    /// Frames of compressed data per sample. Usually 1.
    pub frame_count: u16,
    pub compressor_name: String,
    pub depth: i16,
    /// -1 for the default color table.
    pub color_table_id: i16,
    pub esds: Option<Esds>,
    /// Atoms following the description, e.g. `avcC` or `esds`.
    pub extensions: Vec<u8>,
}

#[derive(Debug, BinRead)]
#[br(big)]
struct VideoSampleDescription {
    _version: u16,
    _revision_level: u16,
    vendor: u32,
    temporal_quality: u32,
    spatial_quality: u32,
    width: u16,
    height: u16,
    /// 16.16 fixed point.
    horizontal_resolution: u32,
    /// 16.16 fixed point.
    vertical_resolution: u32,
    _data_size: u32,
    frame_count: u16,
    /// 32-byte Pascal string.
    #[br(map = |data: [u8; 32]| counted_string(&data, true))]
    compressor_name: String,
    depth: i16,
    color_table_id: i16,
}

/// Parses a video sample description.
pub fn parse_video_description(codec_tag: FourCC, raw: &[u8]) -> Result<VideoDescription, QtError> {
    let mut cursor = Cursor::new(raw);
    let video = cursor.read_be::<VideoSampleDescription>()?;
    let extensions = raw.get(cursor.position() as usize ..)
        .map(|e| e.to_vec())
        .unwrap_or_default();

    Ok(VideoDescription {
        codec_tag,
        vendor: video.vendor,
        temporal_quality: video.temporal_quality,
        spatial_quality: video.spatial_quality,
        width: video.width,
        height: video.height,
        horizontal_resolution: video.horizontal_resolution as f64 / 65536.0,
        vertical_resolution: video.vertical_resolution as f64 / 65536.0,
        frame_count: video.frame_count,
        compressor_name: video.compressor_name,
        depth: video.depth,
        color_table_id: video.color_table_id,
        esds: Esds::find(&extensions),
        extensions,
    })
}
