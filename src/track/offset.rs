//! Per-sample byte offsets, sizes and durations, derived from
//! `stco`/`co64` (chunk offsets), `stsc` (samples per chunk),
//! `stsz` (sample sizes) and `stts` (sample durations).

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use time::Duration;

use crate::{QtError, Track};

/// Sample offset consisting of byte offset,
/// size in bytes, and duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleOffset {
    /// Absolute offset in bytes.
    pub position: u64,
    /// Size of sample in bytes.
    pub size: u32,
    /// The sample's duration, scaled according
    /// to the track's time scale.
    pub duration: Duration,
}

impl SampleOffset {
    /// Create new offset with the corresponding sample's
    /// position, size, and duration in ticks.
    ///
    /// A zero `time_scale` is treated as 1.
    pub fn new(position: u64, size: u32, duration_ticks: u32, time_scale: u32) -> Self {
        let time_scale = time_scale.max(1);
        let duration = Duration::seconds_f64(duration_ticks as f64 / time_scale as f64);
        Self { position, size, duration }
    }
}

impl Track {
    /// Returns offsets for all samples in the track.
    ///
    /// Chunks are expanded in parallel.
    pub fn sample_offsets(&self) -> Result<Vec<SampleOffset>, QtError> {
        let index = self.index();

        let positions: Vec<(u64, u32)> = (0..self.chunk_count)
            .into_par_iter()
            .map(|chunk| {
                let samples = index.chunk_samples(chunk)?;
                let (mut position, _) = index.chunk_byte_range(chunk)?;
                (samples.first_sample .. samples.first_sample.saturating_add(samples.count))
                    .map(|sample| {
                        let size = index.sample_sizes().get(sample)
                            .ok_or_else(|| QtError::malformed_index(format!("no size for sample {sample}")))?;
                        let offset = (position, size);
                        position += size as u64;
                        Ok(offset)
                    })
                    .collect::<Result<Vec<_>, QtError>>()
            })
            .collect::<Result<Vec<Vec<_>>, QtError>>()?
            .into_iter()
            .flatten()
            .take(self.sample_count as usize)
            .collect();

        let durations = self.time_to_sample.iter()
            .flat_map(|t| std::iter::repeat(t.duration).take(t.count as usize));

        Ok(positions.into_iter()
            .zip(durations)
            .map(|((position, size), ticks)| SampleOffset::new(position, size, ticks, self.time_scale))
            .collect())
    }
}
