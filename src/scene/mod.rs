//! Skeletal scene data
//!
//! - [`JointGraph`]: the joint hierarchy, stored as an arena
//! - [`Joint`]: one hierarchy node (bind pose, current pose, optional bone)
//! - [`Skeleton`]: the dense bone table and its per-frame skinning matrices
//! - [`Bone`]: bind offset plus per-clip keyframe channels
//! - [`BonePalette`]: per-frame-in-flight snapshots of the skinning matrices

pub mod bone;
pub mod hierarchy;
pub mod joint;
pub mod palette;
pub mod skeleton;

pub use bone::Bone;
pub use hierarchy::JointGraph;
pub use joint::Joint;
pub use palette::BonePalette;
pub use skeleton::Skeleton;

use slotmap::new_key_type;

new_key_type! {
    pub struct JointKey;
}
