//! Joint hierarchy (arena)
//!
//! Joints live in a [`SlotMap`] and refer to each other by [`JointKey`], so the
//! graph's lifetime owns every joint and no traversal ever chases a dangling
//! pointer. Walks use an explicit stack, visiting parents before children.

use glam::{Mat4, Vec3};
use slotmap::SlotMap;

use crate::math::Vqs;
use crate::scene::JointKey;
use crate::scene::joint::Joint;

#[derive(Debug, Clone, Default)]
pub struct JointGraph {
    joints: SlotMap<JointKey, Joint>,
    roots: Vec<JointKey>,
    /// Inverse of the root's bind transform; cancels the model's own
    /// placement so skinning matrices stay in mesh space.
    pub global_inverse_root: Vqs,
}

impl JointGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, mut joint: Joint) -> JointKey {
        joint.parent = None;
        let key = self.joints.insert(joint);
        self.roots.push(key);
        key
    }

    /// Inserts `joint` under `parent`. Returns `None` (and asserts in debug
    /// builds) when `parent` is not in the graph.
    pub fn add_child(&mut self, parent: JointKey, mut joint: Joint) -> Option<JointKey> {
        if !self.joints.contains_key(parent) {
            debug_assert!(false, "add_child on a joint that is not in the graph");
            log::error!("Parent joint not found while adding '{}'", joint.name);
            return None;
        }

        joint.parent = Some(parent);
        let key = self.joints.insert(joint);
        if let Some(p) = self.joints.get_mut(parent) {
            p.children.push(key);
        }
        Some(key)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: JointKey) -> Option<&Joint> {
        self.joints.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: JointKey) -> Option<&mut Joint> {
        self.joints.get_mut(key)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[JointKey] {
        &self.roots
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<JointKey> {
        self.roots.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (JointKey, &Joint)> {
        self.joints.iter()
    }

    /// Every joint reachable from the roots, parents before children and
    /// siblings in insertion order.
    #[must_use]
    pub fn depth_first(&self) -> Vec<JointKey> {
        let mut order = Vec::with_capacity(self.joints.len());
        let mut stack: Vec<JointKey> = self.roots.iter().rev().copied().collect();

        while let Some(key) = stack.pop() {
            let Some(joint) = self.joints.get(key) else {
                continue;
            };
            order.push(key);
            stack.extend(joint.children.iter().rev().copied());
        }
        order
    }

    /// First joint named `name` in depth-first order.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<JointKey> {
        self.depth_first()
            .into_iter()
            .find(|&key| self.joints[key].name == name)
    }

    /// Parent chain of `key`, nearest first, excluding `key` itself.
    pub fn ancestors(&self, key: JointKey) -> impl Iterator<Item = JointKey> + '_ {
        let mut current = self.joints.get(key).and_then(Joint::parent);
        std::iter::from_fn(move || {
            let key = current?;
            current = self.joints.get(key).and_then(Joint::parent);
            Some(key)
        })
    }

    /// Number of ancestors; 0 for a root.
    #[must_use]
    pub fn depth(&self, key: JointKey) -> usize {
        self.ancestors(key).count()
    }

    /// Leaves that carry a bone, i.e. the candidates for IK end-effectors.
    #[must_use]
    pub fn end_effectors(&self) -> Vec<JointKey> {
        self.depth_first()
            .into_iter()
            .filter(|&key| {
                let joint = &self.joints[key];
                joint.is_leaf() && joint.bone.is_some()
            })
            .collect()
    }

    /// Global transform in model space (root placement cancelled).
    #[must_use]
    pub fn model_space(&self, key: JointKey) -> Option<Vqs> {
        self.joints
            .get(key)
            .map(|joint| self.global_inverse_root * joint.global)
    }

    /// World position of a joint's origin under `model`, in the same frame
    /// the skinned mesh is drawn in (`model ∘ globalInverseRoot ∘ global`).
    #[must_use]
    pub fn world_position(&self, key: JointKey, model: &Mat4) -> Option<Vec3> {
        self.model_space(key)
            .map(|pose| model.transform_point3(pose.v))
    }

    /// Recomputes every global transform from the joints' current local pose
    /// (IK overrides included), without sampling any clip.
    pub fn update_globals(&mut self) {
        for i in 0..self.roots.len() {
            let root = self.roots[i];
            self.propagate(root, Vqs::IDENTITY, |_, joint| {
                joint.ik_local.unwrap_or(joint.local)
            });
        }
    }

    /// Recomputes the globals of `key` and all of its descendants.
    pub fn update_subtree(&mut self, key: JointKey) {
        let parent_global = self
            .joints
            .get(key)
            .and_then(Joint::parent)
            .and_then(|p| self.joints.get(p))
            .map_or(Vqs::IDENTITY, |p| p.global);

        self.propagate(key, parent_global, |_, joint| {
            joint.ik_local.unwrap_or(joint.local)
        });
    }

    /// Poses every joint at its bind transform and drops IK overrides.
    pub fn reset_to_bind_pose(&mut self) {
        self.clear_ik_overrides();
        self.update_globals();
    }

    /// Drops IK overrides and puts every local back at its bind transform.
    /// Globals are stale until the next walk.
    pub fn clear_ik_overrides(&mut self) {
        for (_, joint) in &mut self.joints {
            joint.ik_local = None;
            joint.local = joint.bind_local;
        }
    }

    /// Depth-first walk from `start`: `pose` picks each joint's local
    /// transform, which is then composed onto the parent's global.
    pub(crate) fn propagate<F>(&mut self, start: JointKey, parent_global: Vqs, mut pose: F)
    where
        F: FnMut(JointKey, &Joint) -> Vqs,
    {
        let mut stack: Vec<(JointKey, Vqs)> = Vec::with_capacity(64);
        stack.push((start, parent_global));

        while let Some((key, parent_global)) = stack.pop() {
            let Some(joint) = self.joints.get_mut(key) else {
                continue;
            };

            let local = pose(key, &*joint);
            joint.local = local;
            joint.global = parent_global * local;

            let global = joint.global;
            for &child in joint.children.iter().rev() {
                stack.push((child, global));
            }
        }
    }
}
