//! Decoded scene description.
//!
//! These types mirror what an asset importer hands over: a node tree with
//! local bind matrices, meshes with bone bindings, and named clips with
//! per-node keyframe arrays. Any decoder can fill them in; they also
//! round-trip through serde so scenes can be stored as JSON fixtures.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::animation::InterpolationMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportedScene {
    pub root: ImportedNode,
    #[serde(default)]
    pub meshes: Vec<ImportedMesh>,
    #[serde(default)]
    pub animations: Vec<ImportedAnimation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportedNode {
    pub name: String,
    /// Local bind transform relative to the parent.
    #[serde(default)]
    pub transform: Mat4,
    #[serde(default)]
    pub children: Vec<ImportedNode>,
}

impl ImportedNode {
    #[must_use]
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: ImportedNode) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportedMesh {
    pub name: String,
    pub vertex_count: usize,
    #[serde(default)]
    pub bones: Vec<ImportedBone>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedBone {
    /// Matches the name of the hierarchy node the bone follows.
    pub name: String,
    /// Bind-pose inverse: mesh space to bone space.
    pub offset: Mat4,
    #[serde(default)]
    pub weights: Vec<VertexWeight>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexWeight {
    pub vertex: u32,
    pub weight: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportedAnimation {
    pub name: String,
    /// 0 means unspecified.
    #[serde(default)]
    pub ticks_per_second: f32,
    /// Length in ticks; 0 derives it from the latest key.
    #[serde(default)]
    pub duration: f32,
    #[serde(default)]
    pub channels: Vec<ImportedChannel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportedChannel {
    pub node_name: String,
    pub position_keys: Vec<VectorKey>,
    pub rotation_keys: Vec<QuatKey>,
    /// Per-axis scale; collapsed to a uniform scale on import.
    pub scale_keys: Vec<VectorKey>,
    #[serde(default)]
    pub interpolation: InterpolationMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorKey {
    pub time: f32,
    pub value: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuatKey {
    pub time: f32,
    pub value: Quat,
}
