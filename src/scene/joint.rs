use smallvec::SmallVec;

use crate::math::Vqs;
use crate::scene::JointKey;

/// A node of the joint hierarchy.
///
/// # Hierarchy
///
/// - `parent`: key of the parent joint (None for roots)
/// - `children`: keys of the child joints, in import order
///
/// # Pose
///
/// - `bind_local`: authored rest pose relative to the parent
/// - `local`: pose used by the last evaluation (animated, bind, or IK)
/// - `global`: `parent.global ∘ local`, recomputed by every walk
/// - `ik_local`: set by the IK solver; while present it replaces the animated
///   pose until [`JointGraph::clear_ik_overrides`](crate::scene::JointGraph::clear_ik_overrides),
///   which the mixer calls at the start of every frame
///
/// Only some joints carry a bone. Intermediate joints still contribute
/// their transform to every descendant.
#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    pub bind_local: Vqs,
    pub bone: Option<usize>,
    pub ik_local: Option<Vqs>,

    pub(crate) local: Vqs,
    pub(crate) global: Vqs,

    pub(crate) parent: Option<JointKey>,
    pub(crate) children: SmallVec<[JointKey; 4]>,
}

impl Joint {
    /// Creates an unparented joint posed at its bind transform.
    #[must_use]
    pub fn new(name: impl Into<String>, bind_local: Vqs) -> Self {
        Self {
            name: name.into(),
            bind_local,
            bone: None,
            ik_local: None,
            local: bind_local,
            global: bind_local,
            parent: None,
            children: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_bone(mut self, bone: usize) -> Self {
        self.bone = Some(bone);
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<JointKey> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[JointKey] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn local(&self) -> &Vqs {
        &self.local
    }

    #[inline]
    #[must_use]
    pub fn global(&self) -> &Vqs {
        &self.global
    }
}
