//! A QuickTime "track", compiled from a `trak` atom: time scale,
//! codec type, sample tables and sample descriptions.
//!
//! Tracks are immutable once the movie has been parsed.
//! Use `Track::index()` for time/sample/chunk/byte lookups.

use std::fmt::Display;

use time::{ext::NumericalDuration, Duration};

use crate::{
    codec::SampleDescription,
    EditListEntry,
    FourCC,
    QtError,
    Rational,
    SampleSize,
    SampleToChunk,
    TimeToSample,
};

use super::SampleIndex;

/// Media type, from the `hdlr` component sub type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecType {
    /// `soun`
    Audio,
    /// `vide`
    Video,
    #[default]
    Other,
}

impl From<FourCC> for CodecType {
    fn from(value: FourCC) -> Self {
        match value {
            FourCC::SOUN => Self::Audio,
            FourCC::VIDE => Self::Video,
            _ => Self::Other,
        }
    }
}

/// Whether a track can be played back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrackStatus {
    #[default]
    Ready,
    /// Sample tables are missing or malformed.
    Partial(String),
    /// No registered handler for the codec.
    Unsupported(FourCC),
}

impl Display for TrackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Partial(reason) => write!(f, "partial ({reason})"),
            Self::Unsupported(tag) => write!(f, "unsupported codec '{tag}'"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Track {
    /// Position of the track in the movie.
    pub(crate) index: usize,
    /// Track ID from `tkhd`.
    pub(crate) id: u32,
    pub(crate) codec_type: CodecType,
    /// Handler name from `hdlr`.
    pub(crate) name: String,
    pub(crate) language: String,
    /// Media time scale from `mdhd`.
    pub(crate) time_scale: u32,
    /// Media duration in `time_scale` units.
    pub(crate) duration: u64,
    /// Track duration in movie time scale units (`tkhd`).
    pub(crate) track_duration: u64,
    /// Leading empty edits, in movie time scale units.
    pub(crate) start_time: u64,
    /// Sum of `stts` sample counts.
    pub(crate) nb_frames: u64,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) volume: f64,
    pub(crate) x_scale: Rational,
    pub(crate) y_scale: Rational,

    /// Absolute chunk offsets (`stco`/`co64` + begin offset).
    pub(crate) chunk_offsets: Vec<u64>,
    pub(crate) sample_to_chunk: Vec<SampleToChunk>,
    pub(crate) sample_size: SampleSize,
    /// Declared sample count in `stsz`.
    pub(crate) stsz_count: u32,
    pub(crate) time_to_sample: Vec<TimeToSample>,
    /// 1-based sync sample numbers, sorted.
    pub(crate) keyframes: Vec<u32>,
    pub(crate) edit_list: Vec<EditListEntry>,
    pub(crate) sample_descriptions: Vec<SampleDescription>,

    pub(crate) chunk_count: u32,
    pub(crate) sample_count: u32,
    pub(crate) status: TrackStatus,
}

impl Track {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Marks the track as unusable. The first reason is kept.
    pub(crate) fn poison(&mut self, err: &QtError) {
        log::warn!("Track {} (id {}): {err}", self.index, self.id);
        if !matches!(self.status, TrackStatus::Partial(_)) {
            self.status = TrackStatus::Partial(err.to_string());
        }
    }

    /// Derives counts and validates the sample tables
    /// once the `trak` atom has been fully read.
    pub(crate) fn finalize(&mut self) {
        self.keyframes.sort_unstable();
        self.keyframes.dedup();

        self.chunk_count = u32::try_from(self.chunk_offsets.len()).unwrap_or(u32::MAX);
        self.nb_frames = self.time_to_sample.iter()
            .map(|t| t.count as u64)
            .sum();
        self.sample_count = match &self.sample_size {
            SampleSize::PerSample(sizes) => u32::try_from(sizes.len()).unwrap_or(u32::MAX),
            SampleSize::Constant(_) => match self.stsz_count {
                0 => u32::try_from(self.nb_frames).unwrap_or(u32::MAX),
                n => n,
            },
        };
        self.start_time = self.edit_list.iter()
            .take_while(|e| e.is_empty_edit())
            .map(|e| e.track_duration)
            .sum();

        if self.status != TrackStatus::Ready {
            return
        }

        let missing = [
            (self.chunk_offsets.is_empty(), "chunk offsets"),
            (self.sample_to_chunk.is_empty(), "sample to chunk table"),
            (self.sample_count == 0, "samples"),
            (self.sample_descriptions.is_empty(), "sample descriptions"),
            (self.time_scale == 0, "media time scale"),
        ];
        if let Some((_, what)) = missing.iter().find(|(m, _)| *m) {
            log::debug!("Track {} (id {}): no {what}", self.index, self.id);
            self.status = TrackStatus::Partial(format!("no {what}"));
            return
        }

        if self.sample_to_chunk.first().map(|s| s.first_chunk) != Some(1) {
            self.status = TrackStatus::Partial("sample to chunk table does not start at chunk 1".to_owned());
        }
    }

    /// Lookup helper over this track's sample tables.
    pub fn index(&self) -> SampleIndex<'_> {
        SampleIndex::new(self)
    }

    /// Position of the track in the movie, starting at 0.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn codec_type(&self) -> CodecType {
        self.codec_type
    }

    pub fn is_audio(&self) -> bool {
        self.codec_type == CodecType::Audio
    }

    pub fn is_video(&self) -> bool {
        self.codec_type == CodecType::Video
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn status(&self) -> &TrackStatus {
        &self.status
    }

    /// `true` if the track can be played back.
    pub fn is_usable(&self) -> bool {
        self.status == TrackStatus::Ready
    }

    pub fn time_scale(&self) -> u32 {
        self.time_scale
    }

    /// Media duration in track time scale units.
    pub fn duration_ticks(&self) -> u64 {
        self.duration
    }

    /// Media duration.
    pub fn duration(&self) -> Duration {
        match self.time_scale {
            0 => Duration::ZERO,
            ts => (self.duration as f64 / ts as f64).seconds(),
        }
    }

    /// Track duration from `tkhd`, in movie time scale units.
    pub fn track_duration(&self) -> u64 {
        self.track_duration
    }

    /// Presentation start, in movie time scale units.
    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    pub fn nb_frames(&self) -> u64 {
        self.nb_frames
    }

    pub fn chunk_count(&self) -> u32 {
        self.chunk_count
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Width and height in pixels from `tkhd`.
    pub fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Horizontal display scale from the track matrix.
    pub fn x_scale(&self) -> Rational {
        self.x_scale
    }

    /// Vertical display scale from the track matrix.
    pub fn y_scale(&self) -> Rational {
        self.y_scale
    }

    pub fn chunk_offsets(&self) -> &[u64] {
        &self.chunk_offsets
    }

    pub fn sample_to_chunk(&self) -> &[SampleToChunk] {
        &self.sample_to_chunk
    }

    pub fn sample_size(&self) -> &SampleSize {
        &self.sample_size
    }

    pub fn time_to_sample(&self) -> &[TimeToSample] {
        &self.time_to_sample
    }

    /// 1-based sync sample numbers. Empty if every sample is a sync sample.
    pub fn keyframes(&self) -> &[u32] {
        &self.keyframes
    }

    pub fn edit_list(&self) -> &[EditListEntry] {
        &self.edit_list
    }

    pub fn sample_descriptions(&self) -> &[SampleDescription] {
        &self.sample_descriptions
    }

    /// Sample description for a 1-based `sample_description_id`.
    pub fn sample_description(&self, id: u32) -> Option<&SampleDescription> {
        self.sample_descriptions.get(id.checked_sub(1)? as usize)
    }

    /// Old-style audio, where each `stsz`/`stts` sample is a
    /// single PCM frame rather than a compressed packet.
    /// Chunk sizes are then derived from the sound description.
    pub fn is_frame_addressed(&self) -> bool {
        self.codec_type == CodecType::Audio
            && self.time_to_sample.len() == 1
            && self.time_to_sample.first().map(|t| t.duration) == Some(1)
    }

    /// Shift chunk offsets by `delta` bytes.
    pub(crate) fn rebase(&mut self, delta: i64) {
        self.chunk_offsets.iter_mut()
            .for_each(|o| *o = o.saturating_add_signed(delta));
    }
}
