mod track;
mod index;
mod edit;
mod offset;

pub use track::{Track, TrackStatus, CodecType};
pub use index::{SampleIndex, ChunkSamples};
pub use offset::SampleOffset;
