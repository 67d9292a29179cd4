use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat};
use rustc_hash::FxHashSet;

use crate::animation::{
    AnimationClip, ClipTime, Interpolatable, KeyframeTrack, NodeChannels, PoseEvaluator,
    TargetPath, UniformScale,
};
use crate::assets::import::{ImportedAnimation, ImportedChannel, ImportedScene, VectorKey};
use crate::errors::{Result, SinewError};
use crate::math::{Vqs, uniform_scale};
use crate::scene::{Joint, JointGraph, JointKey, Skeleton};
use crate::settings::AnimationSettings;

/// Bone influences a vertex can carry; matches the shader's vertex layout.
pub const MAX_BONE_INFLUENCES: usize = 4;

/// Per-vertex skinning data, laid out for a vertex buffer.
///
/// Weights are uploaded as imported. They are not renormalised, so a vertex
/// whose weights do not sum to one is skinned exactly as authored.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexInfluences {
    pub bone_ids: [u32; MAX_BONE_INFLUENCES],
    pub weights: [f32; MAX_BONE_INFLUENCES],
}

impl VertexInfluences {
    /// Stores the pair in the first free slot. Returns `false` when all
    /// slots are taken. Zero weights occupy no slot.
    pub fn push(&mut self, bone: u32, weight: f32) -> bool {
        if weight == 0.0 {
            return true;
        }
        match self.weights.iter().position(|&w| w == 0.0) {
            Some(slot) => {
                self.bone_ids[slot] = bone;
                self.weights[slot] = weight;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.weights.iter().filter(|&&w| w != 0.0).count()
    }

    #[must_use]
    pub fn weight_sum(&self) -> f32 {
        self.weights.iter().sum()
    }
}

/// A skinned mesh's animation state: joint hierarchy, bone table, clips and
/// vertex bindings.
#[derive(Debug, Clone, Default)]
pub struct SkinnedModel {
    pub graph: JointGraph,
    pub skeleton: Skeleton,
    clips: Vec<AnimationClip>,
    influences: Vec<VertexInfluences>,
    mesh_ranges: Vec<Range<usize>>,
}

impl SkinnedModel {
    pub fn from_import(scene: &ImportedScene) -> Result<Self> {
        Self::from_import_with_settings(scene, &AnimationSettings::default())
    }

    /// Builds the model once at load time.
    ///
    /// 1. Bones are indexed in order of first appearance across all meshes.
    /// 2. The node tree is mirrored into the joint graph; joints named after a
    ///    bone bind to it.
    /// 3. Keyframe channels attach to their bones, per clip. Channels that
    ///    target a node without a bone are dropped with a warning.
    /// 4. Vertex weights are packed into [`VertexInfluences`].
    /// 5. One bind-pose evaluation fills the bone matrices.
    pub fn from_import_with_settings(
        scene: &ImportedScene,
        settings: &AnimationSettings,
    ) -> Result<Self> {
        let mut skeleton = Skeleton::new(&scene.root.name);

        for mesh in &scene.meshes {
            for bone in &mesh.bones {
                let offset = decompose(&bone.offset, &bone.name)?;
                skeleton.get_or_insert(&bone.name, offset);
            }
        }

        let graph = mirror_hierarchy(scene, &skeleton)?;

        for bone in skeleton.bones() {
            if graph.find_by_name(&bone.name).is_none() {
                log::warn!("Bone '{}' has no matching node in the hierarchy", bone.name);
            }
        }

        let clips = attach_clips(scene, settings, &mut skeleton)?;
        let (influences, mesh_ranges) = pack_influences(scene, &skeleton);

        let mut model = Self {
            graph,
            skeleton,
            clips,
            influences,
            mesh_ranges,
        };
        model.evaluate_bind_pose();

        log::debug!(
            "Imported '{}': {} joints, {} bones, {} clips, {} skinned vertices",
            scene.root.name,
            model.graph.len(),
            model.skeleton.len(),
            model.clips.len(),
            model.influences.len()
        );

        Ok(model)
    }

    #[inline]
    #[must_use]
    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    #[must_use]
    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|clip| clip.name == name)
    }

    #[inline]
    #[must_use]
    pub fn has_clip(&self, name: &str) -> bool {
        self.clip(name).is_some()
    }

    #[inline]
    #[must_use]
    pub fn joint(&self, name: &str) -> Option<JointKey> {
        self.graph.find_by_name(name)
    }

    /// Influences of every mesh, concatenated in import order.
    #[inline]
    #[must_use]
    pub fn vertex_influences(&self) -> &[VertexInfluences] {
        &self.influences
    }

    /// Slice of [`vertex_influences`](Self::vertex_influences) owned by mesh `index`.
    #[must_use]
    pub fn mesh_vertex_range(&self, index: usize) -> Option<Range<usize>> {
        self.mesh_ranges.get(index).cloned()
    }

    #[inline]
    #[must_use]
    pub fn bone_matrices(&self) -> &[Mat4] {
        self.skeleton.final_transforms()
    }

    /// Poses the model with `clip` at `ticks`. Returns `false` (and leaves
    /// the pose untouched) when the clip does not exist.
    pub fn evaluate(&mut self, clip: &str, ticks: f32) -> bool {
        let Some(duration) = self.clip(clip).map(|c| c.duration) else {
            return false;
        };
        let time = ClipTime {
            clip,
            ticks,
            duration,
        };
        PoseEvaluator::evaluate(&mut self.graph, &mut self.skeleton, Some(time));
        true
    }

    pub fn evaluate_bind_pose(&mut self) {
        PoseEvaluator::evaluate(&mut self.graph, &mut self.skeleton, None);
    }
}

fn decompose(matrix: &Mat4, context: &str) -> Result<Vqs> {
    if !matrix.is_finite() {
        return Err(SinewError::NonFiniteTransform(context.to_string()));
    }
    let vqs = Vqs::from_matrix(matrix);
    if !vqs.is_finite() {
        return Err(SinewError::NonFiniteTransform(context.to_string()));
    }
    if vqs.s <= 0.0 {
        return Err(SinewError::InvalidScale {
            context: context.to_string(),
            scale: vqs.s,
        });
    }
    Ok(vqs)
}

fn mirror_hierarchy(scene: &ImportedScene, skeleton: &Skeleton) -> Result<JointGraph> {
    let mut graph = JointGraph::new();
    let root_bind = decompose(&scene.root.transform, &scene.root.name)?;
    graph.global_inverse_root = root_bind.inverse();

    let mut stack = vec![(&scene.root, None::<JointKey>)];
    while let Some((node, parent)) = stack.pop() {
        let mut joint = Joint::new(node.name.clone(), decompose(&node.transform, &node.name)?);
        if let Some(bone) = skeleton.index_of(&node.name) {
            joint = joint.with_bone(bone);
        }

        let key = match parent {
            None => graph.add_root(joint),
            Some(parent) => graph
                .add_child(parent, joint)
                .ok_or_else(|| SinewError::JointNotFound(node.name.clone()))?,
        };

        for child in node.children.iter().rev() {
            stack.push((child, Some(key)));
        }
    }

    Ok(graph)
}

fn attach_clips(
    scene: &ImportedScene,
    settings: &AnimationSettings,
    skeleton: &mut Skeleton,
) -> Result<Vec<AnimationClip>> {
    let mut names = FxHashSet::default();
    let mut clips = Vec::with_capacity(scene.animations.len());

    for animation in &scene.animations {
        if !names.insert(animation.name.as_str()) {
            return Err(SinewError::DuplicateClip(animation.name.clone()));
        }

        let mut latest_key = 0.0_f32;
        for channel in &animation.channels {
            let channels = build_channels(animation, channel)?;
            latest_key = latest_key.max(channels.end_time());

            match skeleton.bone_by_name_mut(&channel.node_name) {
                Some(bone) => {
                    bone.insert_channels(animation.name.clone(), channels);
                }
                None => log::warn!(
                    "Clip '{}' animates '{}', which has no bone; channel ignored",
                    animation.name,
                    channel.node_name
                ),
            }
        }

        let ticks_per_second = if animation.ticks_per_second > 0.0 {
            animation.ticks_per_second
        } else {
            settings.default_ticks_per_second
        };
        let duration = if animation.duration > 0.0 {
            animation.duration
        } else {
            latest_key
        };
        clips.push(AnimationClip::new(
            animation.name.clone(),
            ticks_per_second,
            duration,
        ));
    }

    Ok(clips)
}

fn build_channels(animation: &ImportedAnimation, channel: &ImportedChannel) -> Result<NodeChannels> {
    let mode = channel.interpolation;
    let context = |target| (animation.name.clone(), channel.node_name.clone(), target);

    let position = KeyframeTrack::from_keys(
        channel.position_keys.iter().map(|k| (k.time, k.value)),
        mode,
    );
    let rotation = KeyframeTrack::from_keys(
        channel
            .rotation_keys
            .iter()
            .map(|k| (k.time, normalize_rotation(k.value))),
        mode,
    );
    let scale = KeyframeTrack::from_keys(
        channel
            .scale_keys
            .iter()
            .map(|k| (k.time, UniformScale(uniform_scale(k.value)))),
        mode,
    );

    check_track(&position, context(TargetPath::Translation))?;
    check_track(&rotation, context(TargetPath::Rotation))?;
    check_track(&scale, context(TargetPath::Scale))?;
    check_vectors(&channel.position_keys, &animation.name, &channel.node_name)?;
    check_vectors(&channel.scale_keys, &animation.name, &channel.node_name)?;

    if let Some(bad) = scale.values.iter().find(|s| s.0 <= 0.0) {
        return Err(SinewError::InvalidScale {
            context: format!("{} / {}", animation.name, channel.node_name),
            scale: bad.0,
        });
    }

    Ok(NodeChannels::new(position, rotation, scale))
}

fn normalize_rotation(q: Quat) -> Quat {
    if q.length_squared() > f32::EPSILON {
        q.normalize()
    } else {
        Quat::IDENTITY
    }
}

fn check_track<T: Interpolatable>(
    track: &KeyframeTrack<T>,
    (clip, node, target): (String, String, TargetPath),
) -> Result<()> {
    if track.is_empty() {
        return Err(SinewError::EmptyTrack { clip, node, target });
    }
    if let Some(index) = track.first_unsorted_index() {
        return Err(SinewError::UnsortedKeyframes {
            clip,
            node,
            target,
            index,
        });
    }
    if !track.times.iter().all(|t| t.is_finite()) {
        return Err(SinewError::NonFiniteTransform(format!("{clip} / {node}")));
    }
    Ok(())
}

fn check_vectors(keys: &[VectorKey], clip: &str, node: &str) -> Result<()> {
    if keys.iter().all(|k| k.value.is_finite()) {
        Ok(())
    } else {
        Err(SinewError::NonFiniteTransform(format!("{clip} / {node}")))
    }
}

fn pack_influences(
    scene: &ImportedScene,
    skeleton: &Skeleton,
) -> (Vec<VertexInfluences>, Vec<Range<usize>>) {
    let total = scene.meshes.iter().map(|m| m.vertex_count).sum();
    let mut influences = vec![VertexInfluences::default(); total];
    let mut ranges = Vec::with_capacity(scene.meshes.len());
    let mut base = 0;

    for mesh in &scene.meshes {
        let range = base..base + mesh.vertex_count;
        let vertices = &mut influences[range.clone()];
        let mut dropped = 0_usize;

        for bone in &mesh.bones {
            let Some(index) = skeleton.index_of(&bone.name) else {
                continue;
            };
            for w in &bone.weights {
                let Some(slot) = vertices.get_mut(w.vertex as usize) else {
                    log::warn!(
                        "Mesh '{}': bone '{}' weights vertex {} out of {}",
                        mesh.name,
                        bone.name,
                        w.vertex,
                        mesh.vertex_count
                    );
                    continue;
                };
                if !slot.push(index as u32, w.weight) {
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            log::warn!(
                "Mesh '{}': dropped {dropped} influences beyond {MAX_BONE_INFLUENCES} per vertex",
                mesh.name
            );
        }

        base = range.end;
        ranges.push(range);
    }

    (influences, ranges)
}
