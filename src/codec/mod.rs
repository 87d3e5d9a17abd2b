//! Codec seam.
//!
//! The demuxer does not decode. A `SampleDescriptionRegistry` interprets
//! `stsd` entries and builds a `DecodableStream` per audio track, which turns
//! raw chunk bytes into PCM blocks pushed onto an `OutputQueue`.

mod description;
mod format;
pub mod pcm;

use std::collections::VecDeque;

use crate::{CodecType, FourCC, QtError};

pub use description::{
    parse_audio_description,
    parse_video_description,
    AudioDescription,
    RawDescription,
    SampleDescription,
    VideoDescription,
};
pub use format::{AudioFormat, VideoFormat};

/// Interleaved signed 16-bit PCM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PcmBlock {
    pub samples: Vec<i16>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl PcmBlock {
    /// Number of frames, i.e. samples per channel.
    pub fn frames(&self) -> usize {
        match self.channels {
            0 => 0,
            ch => self.samples.len() / ch as usize,
        }
    }
}

/// Destination for decoded audio.
pub trait OutputQueue {
    fn push(&mut self, block: PcmBlock);

    /// `true` when the consumer should stop filling.
    fn is_full(&self) -> bool {
        false
    }
}

impl OutputQueue for VecDeque<PcmBlock> {
    fn push(&mut self, block: PcmBlock) {
        self.push_back(block)
    }
}

impl OutputQueue for Vec<PcmBlock> {
    fn push(&mut self, block: PcmBlock) {
        Vec::push(self, block)
    }
}

/// Decoder state for one audio track.
pub trait DecodableStream {
    /// Decodes one chunk holding `sample_count` samples and pushes the output.
    /// Returns the number of blocks pushed.
    fn queue_chunk(
        &mut self,
        data: &[u8],
        sample_count: u32,
        queue: &mut dyn OutputQueue,
    ) -> Result<usize, QtError>;

    /// Drop the first `samples` samples of the next chunk.
    /// Set after a seek that landed inside a chunk. Replaces any earlier value.
    fn discard_leading(&mut self, _samples: u32) {}
}

/// Stream parameters, taken from the audio sample description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamParams {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Each table sample is a single PCM frame.
    pub frame_addressed: bool,
}

impl StreamParams {
    pub fn from_audio(desc: &AudioDescription, frame_addressed: bool) -> Self {
        Self {
            channels: desc.channels,
            sample_rate: desc.sample_rate_hz(),
            bits_per_sample: desc.bits_per_sample,
            frame_addressed,
        }
    }
}

/// Interprets sample descriptions and builds decoders.
pub trait SampleDescriptionRegistry {
    fn supports_codec(&self, codec_tag: FourCC) -> bool;

    /// Interprets the body of an `stsd` entry.
    /// `None` means the codec is not handled and the track is unsupported.
    fn interpret(&self, codec_type: CodecType, codec_tag: FourCC, raw: &[u8]) -> Option<SampleDescription> {
        if !self.supports_codec(codec_tag) {
            return None
        }
        match SampleDescription::standard(codec_type, codec_tag, raw) {
            Ok(desc) => Some(desc),
            Err(err) => {
                log::warn!("Failed to read '{codec_tag}' sample description: {err}");
                None
            },
        }
    }

    fn make_stream(
        &self,
        description: &SampleDescription,
        params: &StreamParams,
    ) -> Result<Box<dyn DecodableStream>, QtError>;
}
