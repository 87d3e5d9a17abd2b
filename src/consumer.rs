//! Chunk-at-a-time audio streaming from a parsed track.
//!
//! A consumer is either idle or streaming one track. While streaming it
//! keeps a cursor `(chunk, first sample of chunk)`, reads one chunk per
//! `queue_next_chunk` call and hands it to the codec's `DecodableStream`.
//! Seeks land on chunk boundaries. The offset into the chunk is passed
//! to the codec as a discard hint.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use time::Duration;

use crate::{
    codec::{DecodableStream, OutputQueue, SampleDescription, SampleDescriptionRegistry, StreamParams},
    stream::ByteStream,
    ChunkSamples,
    Presentation,
    QtError,
    Track,
};

/// Position of the next chunk to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkCursor {
    pub chunk: u32,
    /// First sample of `chunk`.
    pub sample: u32,
}

/// Result of a single `queue_next_chunk` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    Queued {
        chunk: u32,
        samples: u32,
        /// Output units pushed by the codec.
        units: usize,
    },
    /// Cursor is past the last chunk.
    Exhausted,
    /// Stop was requested through the stop handle.
    Stopped,
}

struct Session<'a> {
    track: &'a Track,
    codec: Box<dyn DecodableStream>,
    cursor: ChunkCursor,
    description_id: u32,
    frame_addressed: bool,
}

enum State<'a> {
    Idle,
    Streaming(Session<'a>),
}

/// Streams audio chunks from one track at a time.
pub struct AudioTrackStream<'a, S> {
    stream: S,
    registry: &'a dyn SampleDescriptionRegistry,
    /// Movie time scale, for seeks.
    time_scale: u32,
    state: State<'a>,
    stop: Arc<AtomicBool>,
}

impl<'a, S: ByteStream> AudioTrackStream<'a, S> {
    pub fn new(stream: S, registry: &'a dyn SampleDescriptionRegistry, movie_time_scale: u32) -> Self {
        Self {
            stream,
            registry,
            time_scale: movie_time_scale,
            state: State::Idle,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn for_presentation(
        stream: S,
        registry: &'a dyn SampleDescriptionRegistry,
        presentation: &Presentation,
    ) -> Self {
        Self::new(stream, registry, presentation.time_scale())
    }

    /// Starts streaming `track` from its first chunk.
    /// Replaces any track currently streaming.
    pub fn start(&mut self, track: &'a Track) -> Result<(), QtError> {
        if !track.is_audio() {
            return Err(QtError::NotAudio(track.id()))
        }
        if !track.is_usable() {
            return Err(QtError::TrackUnusable { id: track.id(), reason: track.status().to_string() })
        }

        let first = track.index().chunk_samples(0)?;
        let (codec, description_id) = self.open_codec(track, &first)?;

        log::debug!("Streaming track {} (id {}), {} chunks", track.position(), track.id(), track.chunk_count());
        self.stop.store(false, Ordering::Relaxed);
        self.state = State::Streaming(Session {
            track,
            codec,
            cursor: ChunkCursor::default(),
            description_id,
            frame_addressed: track.is_frame_addressed(),
        });

        Ok(())
    }

    fn open_codec(
        &self,
        track: &Track,
        first: &ChunkSamples,
    ) -> Result<(Box<dyn DecodableStream>, u32), QtError> {
        let description = description(track, first.description_id)?;
        let SampleDescription::Audio(audio) = description else {
            return Err(QtError::UnsupportedCodec(description.codec_tag().to_string()))
        };
        if !self.registry.supports_codec(audio.codec_tag) {
            return Err(QtError::UnsupportedCodec(audio.codec_tag.to_string()))
        }
        let params = StreamParams::from_audio(audio, track.is_frame_addressed());
        let codec = self.registry.make_stream(description, &params)?;
        Ok((codec, first.description_id))
    }

    /// Returns to idle, dropping the codec.
    pub fn stop(&mut self) {
        self.state = State::Idle;
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.state, State::Streaming(_))
    }

    /// Handle that makes `queue_next_chunk` return `Stopped`,
    /// e.g. from another thread. Reset by `start`.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Cursor of the next chunk, if streaming.
    pub fn position(&self) -> Option<ChunkCursor> {
        match &self.state {
            State::Streaming(session) => Some(session.cursor),
            State::Idle => None,
        }
    }

    /// Time of the next chunk in track time scale units.
    pub fn position_ticks(&self) -> Option<u64> {
        match &self.state {
            State::Streaming(session) => Some(session.track.index().sample_time(session.cursor.sample)),
            State::Idle => None,
        }
    }

    /// `true` once every chunk has been queued. Idle consumers are not exhausted.
    pub fn is_exhausted(&self) -> bool {
        match &self.state {
            State::Streaming(session) => session.cursor.chunk >= session.track.chunk_count(),
            State::Idle => false,
        }
    }

    /// Reads the chunk at the cursor, decodes it into `queue`
    /// and advances the cursor by one chunk.
    ///
    /// I/O errors return the consumer to idle. Other errors skip the chunk,
    /// so the next call continues with the following one.
    pub fn queue_next_chunk(&mut self, queue: &mut dyn OutputQueue) -> Result<ChunkOutcome, QtError> {
        let State::Streaming(session) = &mut self.state else {
            return Err(QtError::ConsumerIdle)
        };
        if self.stop.load(Ordering::Relaxed) {
            return Ok(ChunkOutcome::Stopped)
        }
        if session.cursor.chunk >= session.track.chunk_count() {
            return Ok(ChunkOutcome::Exhausted)
        }

        match read_chunk(&mut self.stream, self.registry, session, queue) {
            Ok(outcome) => Ok(outcome),
            Err(err @ QtError::Io(_)) => {
                log::warn!("Track {}: {err}, stopping", session.track.id());
                self.state = State::Idle;
                Err(err)
            },
            Err(err) => {
                log::warn!("Track {}: skipping chunk {}: {err}", session.track.id(), session.cursor.chunk);
                session.cursor.chunk += 1;
                if let Ok(first) = session.track.index().first_sample_of_chunk(session.cursor.chunk) {
                    session.cursor.sample = first;
                }
                Err(err)
            },
        }
    }

    /// Queues chunks until the queue is full, the track is exhausted
    /// or a stop is requested. Returns the number of chunks queued.
    pub fn fill(&mut self, queue: &mut dyn OutputQueue) -> Result<usize, QtError> {
        let mut queued = 0;
        while !queue.is_full() {
            match self.queue_next_chunk(queue)? {
                ChunkOutcome::Queued { .. } => queued += 1,
                ChunkOutcome::Exhausted | ChunkOutcome::Stopped => break,
            }
        }
        Ok(queued)
    }

    /// Seeks to `timestamp`, in movie time scale units.
    ///
    /// The cursor moves to the start of the chunk containing the target
    /// sample (after applying the edit list), and the codec is told to discard
    /// the samples before the target. Seeking past the end exhausts the stream.
    pub fn seek(&mut self, timestamp: u64) -> Result<ChunkCursor, QtError> {
        let State::Streaming(session) = &mut self.state else {
            return Err(QtError::ConsumerIdle)
        };
        let track = session.track;
        let index = track.index();

        let target = match track.media_time_at(timestamp, self.time_scale)? {
            Some(media_time) => index.sample_at_media_time(media_time)?,
            None => track.sample_count(),
        };

        if target >= track.sample_count() {
            session.cursor = ChunkCursor { chunk: track.chunk_count(), sample: track.sample_count() };
            session.codec.discard_leading(0);
            return Ok(session.cursor)
        }

        let (chunk, offset) = index.chunk_for_sample(target)?;
        session.cursor = ChunkCursor { chunk, sample: target - offset };
        session.codec.discard_leading(offset);

        log::trace!("Seek to {timestamp}: sample {target}, chunk {chunk} (+{offset})");

        Ok(session.cursor)
    }

    /// Seeks to a time offset from the start of the movie.
    pub fn seek_time(&mut self, time: Duration) -> Result<ChunkCursor, QtError> {
        let nanos = time.whole_nanoseconds().max(0);
        let ticks = nanos * self.time_scale as i128 / 1_000_000_000;
        self.seek(u64::try_from(ticks).unwrap_or(u64::MAX))
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

fn description(track: &Track, id: u32) -> Result<&SampleDescription, QtError> {
    track.sample_description(id)
        .ok_or_else(|| QtError::malformed_index(format!("no sample description {id}")))
}

fn read_chunk<S: ByteStream>(
    stream: &mut S,
    registry: &dyn SampleDescriptionRegistry,
    session: &mut Session<'_>,
    queue: &mut dyn OutputQueue,
) -> Result<ChunkOutcome, QtError> {
    let track = session.track;
    let index = track.index();
    let chunk = session.cursor.chunk;
    let samples = index.chunk_samples(chunk)?;

    if samples.description_id != session.description_id {
        log::warn!(
            "Track {}: chunk {chunk} switches sample description {} -> {}",
            track.id(), session.description_id, samples.description_id
        );
        let desc = description(track, samples.description_id)?;
        if let SampleDescription::Audio(audio) = desc {
            let params = StreamParams::from_audio(audio, session.frame_addressed);
            session.codec = registry.make_stream(desc, &params)?;
        }
        session.description_id = samples.description_id;
    }

    let (offset, size) = match session.frame_addressed {
        true => {
            let audio = description(track, samples.description_id)?
                .audio()
                .ok_or_else(|| QtError::malformed_index("no sound description"))?;
            let (offset, _) = index.chunk_byte_range(chunk)?;
            (offset, audio.frame_bytes(samples.count))
        },
        false => index.chunk_byte_range(chunk)?,
    };

    let size = usize::try_from(size)
        .map_err(|_| QtError::malformed_index(format!("chunk {chunk} size {size} overflows")))?;
    let mut data = vec![0_u8; size];
    stream.seek_to(offset)?;
    stream.read_exact(&mut data)?;

    log::trace!("Chunk {chunk} @ {offset}: {size} bytes, {} samples", samples.count);

    let units = session.codec.queue_chunk(&data, samples.count, queue)?;

    session.cursor = ChunkCursor {
        chunk: chunk + 1,
        sample: samples.first_sample.saturating_add(samples.count),
    };

    Ok(ChunkOutcome::Queued { chunk, samples: samples.count, units })
}
