use serde::{Deserialize, Serialize};

use crate::animation::clip::{AnimationClip, ChannelCursors};
use crate::animation::evaluator::ClipTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopMode {
    Once,
    #[default]
    Loop,
    PingPong,
}

/// Playback state of one clip.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: AnimationClip,

    /// Playback position in seconds.
    pub time: f32,
    pub time_scale: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub enabled: bool,

    pub(crate) cursors: Vec<ChannelCursors>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            loop_mode: LoopMode::Loop,
            paused: false,
            enabled: true,
            cursors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    #[must_use]
    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    /// Core logic: advance time.
    pub fn update(&mut self, dt: f32) {
        if self.paused || !self.enabled {
            return;
        }

        let duration = self.clip.duration_seconds();
        if duration <= 0.0 {
            return;
        }

        // 1. Accumulate time
        self.time += dt * self.time_scale;

        // 2. Handle loop mode
        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    self.paused = true;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.paused = true;
                }
            }
            LoopMode::Loop => {
                if self.time >= duration {
                    self.time %= duration;
                } else if self.time < 0.0 {
                    // Reverse playback
                    self.time = duration + (self.time % duration);
                }
            }
            LoopMode::PingPong => {
                let double_duration = duration * 2.0;
                let mut t = self.time % double_duration;
                if t < 0.0 {
                    t += double_duration;
                }
                // Second half of the cycle runs backwards
                if t > duration {
                    t = double_duration - t;
                }
                self.time = t;
            }
        }
    }

    /// Current position in ticks, wrapped into the clip.
    #[must_use]
    pub fn ticks(&self) -> f32 {
        let duration = self.clip.duration;
        let ticks = self.clip.seconds_to_ticks(self.time);
        if duration <= 0.0 {
            return 0.0;
        }
        match self.loop_mode {
            LoopMode::Loop => ticks.rem_euclid(duration),
            LoopMode::Once | LoopMode::PingPong => ticks.clamp(0.0, duration),
        }
    }

    /// The clip time to evaluate plus one cursor per bone.
    pub(crate) fn sample_point(&mut self, bone_count: usize) -> (ClipTime<'_>, &mut [ChannelCursors]) {
        if self.cursors.len() != bone_count {
            self.cursors.resize_with(bone_count, ChannelCursors::default);
        }
        let ticks = self.ticks();
        (
            ClipTime {
                clip: &self.clip.name,
                ticks,
                duration: self.clip.duration,
            },
            &mut self.cursors,
        )
    }
}
