//! Sample index. Maps between time, sample, chunk and byte positions
//! using a track's `stts`, `stsc`, `stsz`, `stco`/`co64` and `stss` tables.
//!
//! Sample and chunk indices are 0-based throughout. The `stsc`
//! `first_chunk` field and the `stss` sample numbers are 1-based
//! in the file and converted here.
//!
//! If several `stsc` entries share the same `first_chunk`,
//! the earlier one wins. Entries that do not increase `first_chunk`
//! are ignored.

use crate::{QtError, SampleSize};

use super::Track;

/// Samples held by a single chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSamples {
    /// Index of the first sample in the chunk.
    pub first_sample: u32,
    /// Number of samples in the chunk.
    pub count: u32,
    /// 1-based sample description ID.
    pub description_id: u32,
}

/// Run of chunks sharing the same samples per chunk.
#[derive(Debug, Clone, Copy)]
struct ChunkRun {
    /// 0-based.
    first_chunk: u32,
    chunks: u32,
    samples_per_chunk: u32,
    description_id: u32,
    first_sample: u64,
}

impl ChunkRun {
    fn samples(&self) -> u64 {
        self.chunks as u64 * self.samples_per_chunk as u64
    }

    fn contains_chunk(&self, chunk: u32) -> bool {
        chunk >= self.first_chunk && (chunk - self.first_chunk) < self.chunks
    }
}

/// Iterates effective `stsc` runs, clamped to the chunk count.
struct ChunkRuns<'a> {
    table: &'a [crate::SampleToChunk],
    chunk_count: u32,
    pos: usize,
    last_first: Option<u32>,
    first_sample: u64,
}

impl Iterator for ChunkRuns<'_> {
    type Item = Result<ChunkRun, QtError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = self.table.get(self.pos)?;
            self.pos += 1;

            let Some(first) = entry.first_chunk.checked_sub(1) else {
                return Some(Err(QtError::malformed_index("stsc first chunk is 0")))
            };
            if self.last_first.is_some_and(|last| first <= last) {
                continue
            }
            if first >= self.chunk_count {
                return None
            }
            self.last_first = Some(first);

            let next_first = self.table[self.pos..].iter()
                .map(|e| e.first_chunk.saturating_sub(1))
                .find(|f| *f > first)
                .unwrap_or(self.chunk_count)
                .min(self.chunk_count);

            let run = ChunkRun {
                first_chunk: first,
                chunks: next_first - first,
                samples_per_chunk: entry.samples_per_chunk,
                description_id: entry.sample_description_id,
                first_sample: self.first_sample,
            };
            if run.samples_per_chunk == 0 {
                return Some(Err(QtError::malformed_index(format!(
                    "stsc run at chunk {} has zero samples per chunk", first
                ))))
            }
            self.first_sample += run.samples();

            return Some(Ok(run))
        }
    }
}

/// Lookups over a single track's sample tables.
#[derive(Debug, Clone, Copy)]
pub struct SampleIndex<'t> {
    track: &'t Track,
}

impl<'t> SampleIndex<'t> {
    pub fn new(track: &'t Track) -> Self {
        Self { track }
    }

    fn runs(&self) -> ChunkRuns<'t> {
        ChunkRuns {
            table: &self.track.sample_to_chunk,
            chunk_count: self.track.chunk_count,
            pos: 0,
            last_first: None,
            first_sample: 0,
        }
    }

    /// Returns `(chunk, offset_in_chunk)` for a sample.
    ///
    /// E.g. with 5 samples per chunk, sample 7 is sample 2 in chunk 1.
    pub fn chunk_for_sample(&self, sample: u32) -> Result<(u32, u32), QtError> {
        let sample = sample as u64;
        for run in self.runs() {
            let run = run?;
            if sample < run.first_sample + run.samples() {
                let rel = sample - run.first_sample;
                let spc = run.samples_per_chunk as u64;
                // both fit in u32: rel / spc < chunks, rel % spc < spc
                return Ok((run.first_chunk + (rel / spc) as u32, (rel % spc) as u32))
            }
        }
        Err(QtError::malformed_index(format!("sample {sample} is beyond the chunk table")))
    }

    /// Sample range and description ID for a chunk.
    pub fn chunk_samples(&self, chunk: u32) -> Result<ChunkSamples, QtError> {
        for run in self.runs() {
            let run = run?;
            if run.contains_chunk(chunk) {
                let first = run.first_sample
                    + (chunk - run.first_chunk) as u64 * run.samples_per_chunk as u64;
                let first_sample = u32::try_from(first)
                    .map_err(|_| QtError::malformed_index(format!("first sample of chunk {chunk} overflows")))?;
                return Ok(ChunkSamples {
                    first_sample,
                    count: run.samples_per_chunk,
                    description_id: run.description_id,
                })
            }
        }
        Err(QtError::malformed_index(format!("chunk {chunk} is not mapped by the sample to chunk table")))
    }

    /// Index of the first sample in `chunk`.
    pub fn first_sample_of_chunk(&self, chunk: u32) -> Result<u32, QtError> {
        self.chunk_samples(chunk).map(|c| c.first_sample)
    }

    fn chunk_offset(&self, chunk: u32) -> Result<u64, QtError> {
        self.track.chunk_offsets
            .get(chunk as usize)
            .copied()
            .ok_or_else(|| QtError::malformed_index(format!("no offset for chunk {chunk}")))
    }

    /// Absolute byte offset and size of a sample.
    pub fn byte_offset_and_size(&self, sample: u32) -> Result<(u64, u32), QtError> {
        let (chunk, offset_in_chunk) = self.chunk_for_sample(sample)?;
        let base = self.chunk_offset(chunk)?;
        let sizes = &self.track.sample_size;
        let size = sizes.get(sample)
            .ok_or_else(|| QtError::malformed_index(format!("no size for sample {sample}")))?;
        let intra = sizes.range_sum(sample - offset_in_chunk, offset_in_chunk)
            .ok_or_else(|| QtError::malformed_index(format!("no sizes for chunk {chunk}")))?;

        Ok((base + intra, size))
    }

    /// Absolute byte offset and total sample byte size of a chunk.
    pub fn chunk_byte_range(&self, chunk: u32) -> Result<(u64, u64), QtError> {
        let samples = self.chunk_samples(chunk)?;
        let offset = self.chunk_offset(chunk)?;
        let size = self.track.sample_size
            .range_sum(samples.first_sample, samples.count)
            .ok_or_else(|| QtError::malformed_index(format!("no sizes for chunk {chunk}")))?;
        Ok((offset, size))
    }

    /// Sample that contains `timestamp`, given in `time_scale` units
    /// (typically the movie time scale).
    ///
    /// Returns the total `stts` sample count if `timestamp` is past the end.
    pub fn sample_at_time(&self, timestamp: u64, time_scale: u32) -> Result<u32, QtError> {
        if time_scale == 0 {
            return Err(QtError::malformed_index("time scale is 0"))
        }
        let media_time = timestamp as u128 * self.track.time_scale as u128 / time_scale as u128;
        let media_time = u64::try_from(media_time)
            .map_err(|_| QtError::malformed_index(format!("timestamp {timestamp} overflows")))?;
        self.sample_at_media_time(media_time)
    }

    /// Sample that contains `media_time`, in track time scale units.
    pub fn sample_at_media_time(&self, media_time: u64) -> Result<u32, QtError> {
        let mut start = 0_u64;
        let mut samples = 0_u64;
        for run in self.track.time_to_sample.iter() {
            if run.count > 0 && run.duration == 0 {
                return Err(QtError::malformed_index(format!(
                    "stts run of {} samples after sample {samples} has zero duration", run.count
                )))
            }
            let span = run.span();
            if media_time < start + span {
                samples += (media_time - start) / run.duration as u64;
                break
            }
            start += span;
            samples += run.count as u64;
        }
        u32::try_from(samples)
            .map_err(|_| QtError::malformed_index(format!("sample number for {media_time} overflows")))
    }

    /// Start time of `sample` in track time scale units.
    /// Samples past the end map to the total duration.
    pub fn sample_time(&self, sample: u32) -> u64 {
        let mut remaining = sample as u64;
        let mut time = 0_u64;
        for run in self.track.time_to_sample.iter() {
            let count = (run.count as u64).min(remaining);
            time += count * run.duration as u64;
            remaining -= count;
            if remaining == 0 {
                break
            }
        }
        time
    }

    /// Nearest sync sample at or before `sample`.
    ///
    /// Returns `sample` unchanged if the track has no sync sample table
    /// (every sample is a keyframe). If no keyframe precedes `sample`,
    /// the first keyframe is returned.
    pub fn nearest_keyframe_at_or_before(&self, sample: u32) -> u32 {
        let keyframes = &self.track.keyframes;
        if keyframes.is_empty() {
            return sample
        }
        // 1-based in table
        let idx = keyframes.partition_point(|k| k.saturating_sub(1) <= sample);
        match idx {
            0 => keyframes[0].saturating_sub(1),
            i => keyframes[i - 1].saturating_sub(1),
        }
    }

    /// Whether `sample` is a sync sample.
    pub fn is_keyframe(&self, sample: u32) -> bool {
        let keyframes = &self.track.keyframes;
        keyframes.is_empty()
            || sample.checked_add(1).is_some_and(|s| keyframes.binary_search(&s).is_ok())
    }

    pub(crate) fn sample_sizes(&self) -> &SampleSize {
        &self.track.sample_size
    }
}
