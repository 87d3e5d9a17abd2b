//! Demuxer for QuickTime/MPEG-4 containers.
//! Parses the atom tree into a movie with per-track sample tables,
//! maps between time, samples, chunks and byte offsets,
//! and streams audio chunk by chunk to a pluggable codec.
//! Does not and will not decode anything itself.
//!
//! The implementation was mostly done with help from
//! <https://developer.apple.com/documentation/quicktime-file-format>.
//!
//! ```rs
//! use std::collections::VecDeque;
//! use qtdemux::{AudioTrackStream, ParseOptions, PcmRegistry, Presentation};
//!
//! fn main() -> Result<(), qtdemux::QtError> {
//!     let (movie, reader) = Presentation::open("SOUND.MOV", &PcmRegistry, &ParseOptions::default())?;
//!     let track = movie.audio_tracks().next().expect("no audio");
//!
//!     let mut consumer = AudioTrackStream::for_presentation(reader, &PcmRegistry, &movie);
//!     consumer.start(track)?;
//!     // start one second in
//!     consumer.seek(movie.time_scale() as u64)?;
//!
//!     let mut queue = VecDeque::new();
//!     consumer.fill(&mut queue)?;
//!     println!("{} blocks", queue.len());
//!
//!     Ok(())
//! }
//! ```

pub mod atom;
pub mod atom_types;
pub mod codec;
pub mod consts;
pub mod consumer;
pub mod errors;
pub mod fourcc;
pub mod presentation;
pub mod rational;
pub mod stream;
pub mod track;

pub(crate) mod support;

#[cfg(test)]
mod tests;

pub use atom::{AtomHeader, AtomPayload};
pub use atom_types::{
    Cmov,
    Co64,
    EditListEntry,
    Elst,
    Esds,
    Hdlr,
    Matrix,
    Mdhd,
    Mvhd,
    SampleSize,
    SampleToChunk,
    Stco,
    Stsc,
    Stsd,
    StsdEntry,
    Stss,
    Stsz,
    Stts,
    TimeToSample,
    Tkhd,
};
pub use codec::{
    pcm::PcmRegistry,
    AudioDescription,
    AudioFormat,
    DecodableStream,
    OutputQueue,
    PcmBlock,
    SampleDescription,
    SampleDescriptionRegistry,
    StreamParams,
    VideoDescription,
    VideoFormat,
};
pub use consts::{qt_time, qt_time_zero, CONTAINER};
pub use consumer::{AudioTrackStream, ChunkCursor, ChunkOutcome};
pub use errors::QtError;
pub use fourcc::FourCC;
pub use presentation::{ParseOptions, Presentation};
pub use rational::Rational;
pub use stream::{ByteStream, SubStream};
pub use track::{ChunkSamples, CodecType, SampleIndex, SampleOffset, Track, TrackStatus};
