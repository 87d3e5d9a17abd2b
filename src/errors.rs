//! Various QuickTime demuxing errors.

use thiserror::Error;

/// Demux, index and streaming errors.
#[derive(Debug, Error)]
pub enum QtError {
    /// IO error from the underlying byte stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Converted `BinResult` error.
    #[error("{0}")]
    BinRead(#[from] binrw::Error),
    /// Atom size smaller than its header,
    /// or extending past its parent.
    #[error("Malformed atom '{name}' @ offset {offset} with size {size}.")]
    MalformedAtom {
        name: String,
        offset: u64,
        size: u64,
    },
    /// Declared table entry count exceeds the bytes left in the atom.
    #[error("Truncated table in '{name}': {entries} entries of {width} bytes, {available} bytes available.")]
    TruncatedTable {
        name: String,
        entries: u64,
        width: u64,
        available: u64,
    },
    /// Codec tag not handled by the sample description registry.
    #[error("Unsupported codec '{0}'")]
    UnsupportedCodec(String),
    /// Invalid lookup or division by zero in the sample tables.
    #[error("Malformed sample index: {0}")]
    MalformedIndex(String),
    /// Stream does not start with a valid atom.
    #[error("Not a QuickTime container: {0}")]
    NotAContainer(String),
    /// No movie atom or movie header found.
    #[error("Missing movie header ('moov'/'mvhd')")]
    MissingMovieHeader,
    /// Exceeded max nesting depth while descending into containers.
    #[error("Recurse depth {depth} exceeds max recurse depth {max}")]
    RecurseDepthExceeded { depth: usize, max: usize },
    /// More tracks than the configured limit.
    #[error("Track count exceeds max {max}")]
    TooManyTracks { max: usize },
    /// Leaf atom too large to buffer.
    #[error("Atom '{name}' payload of {size} bytes exceeds max {max} bytes.")]
    AtomTooLarge { name: String, size: u64, max: u64 },
    /// Compressed movie atom could not be expanded.
    #[error("Failed to decompress movie atom: {0}")]
    Decompress(String),
    /// Track selected for audio streaming is not a sound track.
    #[error("Track {0} is not an audio track")]
    NotAudio(u32),
    /// Track was excluded from playback during parsing.
    #[error("Track {id} is not usable: {reason}")]
    TrackUnusable { id: u32, reason: String },
    /// Consumer operation requires a started track.
    #[error("No track started")]
    ConsumerIdle,
}

impl QtError {
    /// Returns `true` if the error only affects the atom
    /// or track it was raised for, meaning parsing may continue
    /// with the next sibling atom.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedAtom { .. }
                | Self::TruncatedTable { .. }
                | Self::UnsupportedCodec(_)
                | Self::MalformedIndex(_)
                | Self::BinRead(_)
                | Self::AtomTooLarge { .. }
        )
    }

    pub(crate) fn malformed_index(msg: impl Into<String>) -> Self {
        Self::MalformedIndex(msg.into())
    }
}

/// Converts QtError to std::io::Error
impl From<QtError> for std::io::Error {
    fn from(err: QtError) -> Self {
        match err {
            QtError::Io(e) => e,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}
