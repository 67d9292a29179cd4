//! Asset boundary
//!
//! - [`import`]: the decoded scene description an importer produces
//! - [`SkinnedModel`]: the runtime model built from it once at load time

pub mod import;
pub mod model;

pub use import::{
    ImportedAnimation, ImportedBone, ImportedChannel, ImportedMesh, ImportedNode, ImportedScene,
    QuatKey, VectorKey, VertexWeight,
};
pub use model::{MAX_BONE_INFLUENCES, SkinnedModel, VertexInfluences};
