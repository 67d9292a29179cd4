use serde::{Deserialize, Serialize};

use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationMode {
    #[default]
    Linear,
    /// Holds the left sample of the bracket.
    Step,
}

/// Intervals shorter than this blend with `delta = 0`.
const MIN_INTERVAL: f32 = 1e-6;

const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last bracket so monotonic playback finds the next one in O(1).
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Time-stamped samples of one channel, in ticks.
///
/// Times are non-decreasing. A track with a single sample is constant.
///
/// Past the last sample the bracket wraps to the first sample: the tail
/// `[times[last], loop_end)` blends from the last value back towards the first,
/// which is what makes looping clips seamless.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub(crate) times: Vec<f32>,
    pub(crate) values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Unpaired trailing times or values are dropped.
    #[must_use]
    pub fn new(mut times: Vec<f32>, mut values: Vec<T>, interpolation: InterpolationMode) -> Self {
        if times.len() != values.len() {
            log::warn!(
                "Keyframe track has {} times but {} values, truncating",
                times.len(),
                values.len()
            );
            let len = times.len().min(values.len());
            times.truncate(len);
            values.truncate(len);
        }
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// A track that yields `value` at every time.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self::new(vec![0.0], vec![value], InterpolationMode::Linear)
    }

    #[must_use]
    pub fn from_keys(
        keys: impl IntoIterator<Item = (f32, T)>,
        interpolation: InterpolationMode,
    ) -> Self {
        let (times, values) = keys.into_iter().unzip();
        Self::new(times, values, interpolation)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the last sample, 0 for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Index of the first sample whose time precedes its predecessor's.
    #[must_use]
    pub fn first_unsorted_index(&self) -> Option<usize> {
        self.times
            .windows(2)
            .position(|w| w[1] < w[0])
            .map(|i| i + 1)
    }

    /// Samples the track at `time`.
    ///
    /// `loop_end` closes the wrap bracket after the last sample; pass the clip
    /// duration.
    #[must_use]
    pub fn sample(&self, time: f32, loop_end: f32) -> T {
        match self.times.len() {
            0 => T::NEUTRAL,
            1 => self.values[0],
            _ => self.sample_at_frame(self.locate(time), time, loop_end),
        }
    }

    /// Same result as [`sample`](Self::sample), using `cursor` to skip the
    /// search when playback moves forward a few samples at a time.
    pub fn sample_with_cursor(&self, time: f32, loop_end: f32, cursor: &mut KeyframeCursor) -> T {
        match self.times.len() {
            0 => T::NEUTRAL,
            1 => self.values[0],
            _ => {
                let index = self.locate_with_cursor(time, cursor);
                self.sample_at_frame(index, time, loop_end)
            }
        }
    }

    /// First `i` with `time < times[i + 1]`, or the last index when there is
    /// none (the wrap bracket).
    fn locate(&self, time: f32) -> usize {
        let next_idx = self.times.partition_point(|&t| t <= time);
        if next_idx >= self.times.len() {
            self.times.len() - 1
        } else {
            next_idx.max(1) - 1
        }
    }

    fn locate_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> usize {
        let last = self.times.len() - 1;
        let start = cursor.last_index.min(last);

        // Every bracket before `start` ends at or before `times[start]`, so a
        // forward scan from `start` finds the same first bracket as `locate`.
        if start == 0 || time >= self.times[start] {
            let end = (start + MAX_SCAN_OFFSET).min(last);
            for idx in start..=end {
                if idx == last || time < self.times[idx + 1] {
                    cursor.last_index = idx;
                    return idx;
                }
            }
        }

        // Large jump (scrubbing or loop reset)
        let idx = self.locate(time);
        cursor.last_index = idx;
        idx
    }

    fn sample_at_frame(&self, index: usize, time: f32, loop_end: f32) -> T {
        let last = self.times.len() - 1;

        let (next_idx, t0, span) = if index >= last {
            let t0 = self.times[last];
            (0, t0, loop_end - t0)
        } else {
            let t0 = self.times[index];
            (index + 1, t0, self.times[index + 1] - t0)
        };

        let delta = if span > MIN_INTERVAL {
            ((time - t0) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        match self.interpolation {
            InterpolationMode::Step => self.values[index],
            InterpolationMode::Linear => {
                T::interpolate(self.values[index], self.values[next_idx], delta)
            }
        }
    }
}
