use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::animation::tracks::{KeyframeCursor, KeyframeTrack};
use crate::animation::values::UniformScale;
use crate::math::Vqs;

/// Importers that leave ticks-per-second unset conventionally mean 25.
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// The transform component a channel drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
}

/// The three independently keyed channels of one node in one clip.
#[derive(Debug, Clone)]
pub struct NodeChannels {
    pub position: KeyframeTrack<Vec3>,
    pub rotation: KeyframeTrack<Quat>,
    pub scale: KeyframeTrack<UniformScale>,
}

/// One cursor per channel, see [`KeyframeCursor`].
#[derive(Debug, Clone, Default)]
pub struct ChannelCursors {
    pub position: KeyframeCursor,
    pub rotation: KeyframeCursor,
    pub scale: KeyframeCursor,
}

impl NodeChannels {
    #[must_use]
    pub fn new(
        position: KeyframeTrack<Vec3>,
        rotation: KeyframeTrack<Quat>,
        scale: KeyframeTrack<UniformScale>,
    ) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Channels that hold `pose` forever.
    #[must_use]
    pub fn constant(pose: Vqs) -> Self {
        Self::new(
            KeyframeTrack::constant(pose.v),
            KeyframeTrack::constant(pose.q),
            KeyframeTrack::constant(UniformScale(pose.s)),
        )
    }

    /// Local transform at `ticks`; each channel is sampled on its own keys.
    #[must_use]
    pub fn sample(&self, ticks: f32, loop_end: f32) -> Vqs {
        Vqs::new(
            self.position.sample(ticks, loop_end),
            self.rotation.sample(ticks, loop_end),
            self.scale.sample(ticks, loop_end).0,
        )
    }

    pub fn sample_with_cursors(
        &self,
        ticks: f32,
        loop_end: f32,
        cursors: &mut ChannelCursors,
    ) -> Vqs {
        Vqs::new(
            self.position
                .sample_with_cursor(ticks, loop_end, &mut cursors.position),
            self.rotation
                .sample_with_cursor(ticks, loop_end, &mut cursors.rotation),
            self.scale
                .sample_with_cursor(ticks, loop_end, &mut cursors.scale)
                .0,
        )
    }

    /// Latest sample time over the three channels.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.position
            .end_time()
            .max(self.rotation.end_time())
            .max(self.scale.end_time())
    }
}

/// Clip metadata. The keyframes themselves live on the bones, keyed by the
/// clip's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub ticks_per_second: f32,
    /// Length in ticks.
    pub duration: f32,
}

impl AnimationClip {
    /// A non-positive `ticks_per_second` falls back to
    /// [`DEFAULT_TICKS_PER_SECOND`].
    #[must_use]
    pub fn new(name: impl Into<String>, ticks_per_second: f32, duration: f32) -> Self {
        let ticks_per_second = if ticks_per_second > 0.0 {
            ticks_per_second
        } else {
            DEFAULT_TICKS_PER_SECOND
        };
        Self {
            name: name.into(),
            ticks_per_second,
            duration: duration.max(0.0),
        }
    }

    #[inline]
    #[must_use]
    pub fn seconds_to_ticks(&self, seconds: f32) -> f32 {
        seconds * self.ticks_per_second
    }

    #[must_use]
    pub fn duration_seconds(&self) -> f32 {
        self.duration / self.ticks_per_second
    }
}
