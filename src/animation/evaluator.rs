use crate::animation::clip::ChannelCursors;
use crate::math::Vqs;
use crate::scene::{Joint, JointGraph, Skeleton};

/// A clip and the time to sample it at.
///
/// `ticks` is already scaled by playback speed and ticks-per-second and
/// wrapped into `[0, duration]`.
#[derive(Debug, Clone, Copy)]
pub struct ClipTime<'a> {
    pub clip: &'a str,
    pub ticks: f32,
    pub duration: f32,
}

/// Walks a joint hierarchy and produces the per-bone skinning matrices.
///
/// The walk is split in two so inverse kinematics can adjust joint poses
/// between computing the globals and writing the bone matrices; see
/// [`AnimationMixer::update`](crate::animation::AnimationMixer::update).
pub struct PoseEvaluator;

impl PoseEvaluator {
    /// Full evaluation without cursors or IK.
    pub fn evaluate(graph: &mut JointGraph, skeleton: &mut Skeleton, clip: Option<ClipTime<'_>>) {
        Self::compute_globals(graph, skeleton, clip, &mut []);
        Self::finalize_bones(graph, skeleton);
    }

    /// Depth-first walk computing every joint's local and global transform.
    ///
    /// Local pose precedence: IK override, then the bone's channels for the
    /// clip, then the bind pose. `cursors` is indexed by bone; bones without
    /// a cursor fall back to a binary search.
    pub fn compute_globals(
        graph: &mut JointGraph,
        skeleton: &Skeleton,
        clip: Option<ClipTime<'_>>,
        cursors: &mut [ChannelCursors],
    ) {
        let roots = graph.roots().to_vec();
        for root in roots {
            graph.propagate(root, Vqs::IDENTITY, |_, joint| {
                local_pose(joint, skeleton, clip, &mut *cursors)
            });
        }
    }

    /// `final = globalInverseRoot ∘ global ∘ offset` for every joint with a bone.
    pub fn finalize_bones(graph: &JointGraph, skeleton: &mut Skeleton) {
        let inverse_root = graph.global_inverse_root;

        for (_, joint) in graph.iter() {
            let Some(index) = joint.bone else {
                continue;
            };
            let Some(offset) = skeleton.bone(index).map(|bone| bone.offset) else {
                continue;
            };

            let skinning = inverse_root * *joint.global() * offset;
            if skinning.is_finite() {
                skeleton.set_final_transform(index, skinning);
            } else {
                log::warn!(
                    "Non-finite skinning transform for joint '{}', using identity",
                    joint.name
                );
                skeleton.set_final_transform(index, Vqs::IDENTITY);
            }
        }
    }
}

fn local_pose(
    joint: &Joint,
    skeleton: &Skeleton,
    clip: Option<ClipTime<'_>>,
    cursors: &mut [ChannelCursors],
) -> Vqs {
    if let Some(ik) = joint.ik_local {
        return ik;
    }

    if let Some(clip) = clip
        && let Some(index) = joint.bone
        && let Some(channels) = skeleton.bone(index).and_then(|b| b.channels(clip.clip))
    {
        return match cursors.get_mut(index) {
            Some(cursor) => channels.sample_with_cursors(clip.ticks, clip.duration, cursor),
            None => channels.sample(clip.ticks, clip.duration),
        };
    }

    joint.bind_local
}
