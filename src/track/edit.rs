//! Edit list mapping from presentation (movie) time to media time.

use crate::{QtError, Track};

impl Track {
    /// Maps `time`, in `movie_time_scale` units, to media time
    /// in the track's time scale.
    ///
    /// Returns `None` if `time` is past the last edit.
    /// Inside an empty edit the media time of the next non-empty
    /// edit is returned, i.e. playback starts there once the gap ends.
    /// A zero rate edit holds its media time for the whole edit.
    ///
    /// Tracks without an edit list (or whose edits have no duration)
    /// map time directly.
    pub fn media_time_at(&self, time: u64, movie_time_scale: u32) -> Result<Option<u64>, QtError> {
        if movie_time_scale == 0 {
            return Err(QtError::malformed_index("movie time scale is 0"))
        }
        let to_media = |ticks: u64| -> Result<u64, QtError> {
            u64::try_from(ticks as u128 * self.time_scale as u128 / movie_time_scale as u128)
                .map_err(|_| QtError::malformed_index(format!("time {time} overflows")))
        };

        let total: u64 = self.edit_list.iter()
            .map(|e| e.track_duration)
            .sum();
        if total == 0 {
            return to_media(time).map(Some)
        }

        let mut edit_start = 0_u64;
        for (i, edit) in self.edit_list.iter().enumerate() {
            let edit_end = edit_start.saturating_add(edit.track_duration);
            if time < edit_end {
                if edit.is_empty_edit() {
                    let next = self.edit_list[i + 1..].iter()
                        .find(|e| !e.is_empty_edit())
                        .map(|e| e.media_time as u64);
                    return Ok(next)
                }
                let rel = to_media(time - edit_start)?;
                let rate = edit.rate();
                let advanced = match rate.is_positive() {
                    true => rate.scale(rel).unwrap_or(u64::MAX),
                    false => 0,
                };
                return Ok(Some((edit.media_time as u64).saturating_add(advanced)))
            }
            edit_start = edit_end;
        }

        Ok(None)
    }
}
