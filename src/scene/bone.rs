use rustc_hash::FxHashMap;

use crate::animation::NodeChannels;
use crate::math::Vqs;

/// A skinning bone.
///
/// `offset` is the bind-pose inverse: it maps mesh-space vertices into the
/// bone's own space. Keyframes are stored per clip name; a bone that is not
/// animated by a clip simply has no entry for it.
#[derive(Debug, Clone)]
pub struct Bone {
    pub index: usize,
    pub name: String,
    pub offset: Vqs,
    channels: FxHashMap<String, NodeChannels>,
}

impl Bone {
    #[must_use]
    pub fn new(index: usize, name: impl Into<String>, offset: Vqs) -> Self {
        Self {
            index,
            name: name.into(),
            offset,
            channels: FxHashMap::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn has_animation(&self, clip: &str) -> bool {
        self.channels.contains_key(clip)
    }

    #[inline]
    #[must_use]
    pub fn channels(&self, clip: &str) -> Option<&NodeChannels> {
        self.channels.get(clip)
    }

    /// Replaces and returns any channels already stored for `clip`.
    pub fn insert_channels(
        &mut self,
        clip: impl Into<String>,
        channels: NodeChannels,
    ) -> Option<NodeChannels> {
        self.channels.insert(clip.into(), channels)
    }

    /// Local transform driven by `clip`, or `None` when the bone has no
    /// channels for it.
    #[must_use]
    pub fn try_sample_local(&self, clip: &str, ticks: f32, loop_end: f32) -> Option<Vqs> {
        self.channels
            .get(clip)
            .map(|channels| channels.sample(ticks, loop_end))
    }

    /// Like [`try_sample_local`](Self::try_sample_local) but silently yields
    /// the identity for a missing clip. Check
    /// [`has_animation`](Self::has_animation) first when the difference
    /// matters.
    #[must_use]
    pub fn sample_local(&self, clip: &str, ticks: f32, loop_end: f32) -> Vqs {
        self.try_sample_local(clip, ticks, loop_end)
            .unwrap_or(Vqs::IDENTITY)
    }
}
