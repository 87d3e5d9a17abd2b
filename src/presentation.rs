//! Parsed movie: global timing and the list of tracks.
//!
//! ```rs
//! use qtdemux::{PcmRegistry, ParseOptions, Presentation};
//!
//! fn main() -> Result<(), qtdemux::QtError> {
//!     let (movie, _reader) = Presentation::open("SOUND.MOV", &PcmRegistry, &ParseOptions::default())?;
//!     for track in movie.audio_tracks() {
//!         println!("{} {:?}", track.id(), track.duration());
//!     }
//!     Ok(())
//! }
//! ```

use std::{fs::File, io::BufReader, path::Path};

use time::{ext::NumericalDuration, Duration, PrimitiveDateTime};

use crate::{
    atom::{AtomDispatcher, AtomHeader, ParseEnv, Scope},
    codec::SampleDescriptionRegistry,
    consts::{qt_time, MAX_DEPTH, MAX_LEAF_SIZE, MAX_TRACKS},
    stream::ByteStream,
    QtError,
    Rational,
    Track,
};

/// Parse limits and layout options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Added to every chunk offset. Used when the movie is embedded
    /// at an offset within a larger stream.
    pub begin_offset: u64,
    pub max_tracks: usize,
    /// Max container nesting depth.
    pub max_depth: usize,
    /// Max leaf atom payload buffered in memory.
    pub max_leaf_size: u64,
    /// `BufReader` capacity for `Presentation::open`.
    pub buffer_capacity: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            begin_offset: 0,
            max_tracks: MAX_TRACKS,
            max_depth: MAX_DEPTH,
            max_leaf_size: MAX_LEAF_SIZE,
            buffer_capacity: None,
        }
    }
}

impl ParseOptions {
    pub fn with_begin_offset(self, begin_offset: u64) -> Self {
        Self { begin_offset, ..self }
    }

    pub fn with_max_tracks(self, max_tracks: usize) -> Self {
        Self { max_tracks, ..self }
    }

    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }

    pub fn with_max_leaf_size(self, max_leaf_size: u64) -> Self {
        Self { max_leaf_size, ..self }
    }

    pub fn with_buffer_capacity(self, capacity: usize) -> Self {
        Self { buffer_capacity: Some(capacity), ..self }
    }
}

/// Parsed movie.
#[derive(Debug, Clone, Default)]
pub struct Presentation {
    pub(crate) time_scale: u32,
    /// Duration of the longest track, in `time_scale` units.
    pub(crate) duration: u64,
    /// Seconds since 1904-01-01.
    pub(crate) creation_time: u64,
    /// Seconds since 1904-01-01.
    pub(crate) modification_time: u64,
    pub(crate) preferred_rate: Rational,
    pub(crate) x_scale: Rational,
    pub(crate) y_scale: Rational,
    pub(crate) begin_offset: u64,
    pub(crate) has_movie_header: bool,
    pub(crate) tracks: Vec<Track>,
}

impl Presentation {
    /// Parses the atom tree of `stream`.
    ///
    /// Fails with `NotAContainer` if the stream does not start with a valid atom,
    /// and with `MissingMovieHeader` if no `moov`/`mvhd` was found.
    /// Tracks with unsupported codecs or broken sample tables are kept,
    /// but are not usable (see `Track::status()`).
    pub fn parse<S: ByteStream>(
        stream: &mut S,
        registry: &dyn SampleDescriptionRegistry,
        options: &ParseOptions,
    ) -> Result<Self, QtError> {
        let len = stream.byte_len()?;
        stream.seek_to(0)?;

        match AtomHeader::next_atom(stream, len) {
            Ok(Some(header)) if !header.name().is_null() => (),
            Ok(_) => return Err(QtError::NotAContainer("no atom at start of stream".to_owned())),
            Err(QtError::Io(err)) => return Err(QtError::Io(err)),
            Err(err) => return Err(QtError::NotAContainer(err.to_string())),
        }

        let mut presentation = Self {
            begin_offset: options.begin_offset,
            ..Self::default()
        };

        let mut env = ParseEnv {
            presentation: &mut presentation,
            registry,
            options,
        };
        AtomDispatcher::default().descend(stream, &mut env, &mut Scope::Movie, 0, len, 0)?;

        if !presentation.has_movie_header {
            return Err(QtError::MissingMovieHeader)
        }

        log::debug!(
            "Parsed movie: time scale {}, duration {}, {} tracks ({} usable)",
            presentation.time_scale,
            presentation.duration,
            presentation.tracks.len(),
            presentation.usable_tracks().count()
        );

        Ok(presentation)
    }

    /// Opens and parses a file, returning the movie together
    /// with the buffered reader for streaming.
    pub fn open(
        path: impl AsRef<Path>,
        registry: &dyn SampleDescriptionRegistry,
        options: &ParseOptions,
    ) -> Result<(Self, BufReader<File>), QtError> {
        let file = File::open(path.as_ref())?;
        let mut reader = match options.buffer_capacity {
            Some(capacity) => BufReader::with_capacity(capacity, file),
            None => BufReader::new(file),
        };
        let presentation = Self::parse(&mut reader, registry, options)?;
        Ok((presentation, reader))
    }

    /// Movie time scale, ticks per second.
    pub fn time_scale(&self) -> u32 {
        self.time_scale
    }

    /// Duration in movie time scale units.
    pub fn duration_ticks(&self) -> u64 {
        self.duration
    }

    /// Duration of the longest track.
    pub fn duration(&self) -> Duration {
        match self.time_scale {
            0 => Duration::ZERO,
            ts => (self.duration as f64 / ts as f64).seconds(),
        }
    }

    /// Creation time as UTC datetime.
    /// `None` if the stored value is out of range.
    pub fn creation_time(&self) -> Option<PrimitiveDateTime> {
        qt_time(self.creation_time)
    }

    /// Modification time as UTC datetime.
    /// `None` if the stored value is out of range.
    pub fn modification_time(&self) -> Option<PrimitiveDateTime> {
        qt_time(self.modification_time)
    }

    pub fn preferred_rate(&self) -> Rational {
        self.preferred_rate
    }

    /// Horizontal display scale from the movie matrix.
    pub fn x_scale(&self) -> Rational {
        self.x_scale
    }

    /// Vertical display scale from the movie matrix.
    pub fn y_scale(&self) -> Rational {
        self.y_scale
    }

    pub fn begin_offset(&self) -> u64 {
        self.begin_offset
    }

    /// All tracks in file order, including unusable ones.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Tracks that can be played back.
    pub fn usable_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(|t| t.is_usable())
    }

    /// Usable sound tracks.
    pub fn audio_tracks(&self) -> impl Iterator<Item = &Track> {
        self.usable_tracks().filter(|t| t.is_audio())
    }

    /// Usable video tracks.
    pub fn video_tracks(&self) -> impl Iterator<Item = &Track> {
        self.usable_tracks().filter(|t| t.is_video())
    }

    /// Track at `position` in file order.
    pub fn track(&self, position: usize) -> Option<&Track> {
        self.tracks.get(position)
    }

    /// Track with `tkhd` track ID `id`.
    pub fn track_by_id(&self, id: u32) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id() == id)
    }

    /// Moves the movie to a new base offset, shifting all chunk offsets.
    /// E.g. after copying an embedded movie out of a container.
    pub fn rebase(&mut self, begin_offset: u64) {
        let delta = begin_offset as i128 - self.begin_offset as i128;
        let delta = i64::try_from(delta).unwrap_or(if delta < 0 { i64::MIN } else { i64::MAX });
        self.tracks.iter_mut().for_each(|t| t.rebase(delta));
        self.begin_offset = begin_offset;
    }
}
