use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::math::Vqs;
use crate::scene::bone::Bone;

/// The bone table of a skinned model.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    pub name: String,

    // === Core Data ===
    // bones[i] corresponds to joint index i in the shader
    bones: Vec<Bone>,
    by_name: FxHashMap<String, usize>,

    // === Runtime Data ===
    // Written once per frame by the evaluator, read by the upload step
    pub(crate) joint_matrices: Vec<Mat4>,
    // Bone pose in model space, for skeleton visualisation only
    pub(crate) debug_matrices: Vec<Mat4>,
}

impl Skeleton {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Returns the index of `name`, registering it with `offset` on first
    /// encounter. Later offsets for an existing bone are ignored.
    pub fn get_or_insert(&mut self, name: &str, offset: Vqs) -> usize {
        if let Some(&index) = self.by_name.get(name) {
            if !self.bones[index].offset.approx_eq(&offset, 1e-4) {
                log::debug!(
                    "Bone '{name}' registered again with a different offset; keeping the first"
                );
            }
            return index;
        }

        let index = self.bones.len();
        self.bones.push(Bone::new(index, name, offset));
        self.by_name.insert(name.to_string(), index);
        self.joint_matrices.push(Mat4::IDENTITY);
        self.debug_matrices.push(Mat4::IDENTITY);
        index
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[inline]
    #[must_use]
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    #[inline]
    pub fn bone_mut(&mut self, index: usize) -> Option<&mut Bone> {
        self.bones.get_mut(index)
    }

    #[inline]
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn bone_by_name(&self, name: &str) -> Option<&Bone> {
        self.index_of(name).and_then(|i| self.bones.get(i))
    }

    pub fn bone_by_name_mut(&mut self, name: &str) -> Option<&mut Bone> {
        let index = self.index_of(name)?;
        self.bones.get_mut(index)
    }

    /// Stores the skinning transform of bone `index` for this frame.
    ///
    /// The debug matrix is `final ∘ offset⁻¹`, i.e. where the bone itself
    /// sits in model space.
    pub fn set_final_transform(&mut self, index: usize, skinning: Vqs) {
        let Some(bone) = self.bones.get(index) else {
            return;
        };
        let debug = skinning * bone.offset.inverse();
        self.joint_matrices[index] = skinning.to_matrix();
        self.debug_matrices[index] = debug.to_matrix();
    }

    #[inline]
    #[must_use]
    pub fn final_transform(&self, index: usize) -> Option<&Mat4> {
        self.joint_matrices.get(index)
    }

    /// Dense skinning matrices, indexed by bone index.
    #[inline]
    #[must_use]
    pub fn final_transforms(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    #[inline]
    #[must_use]
    pub fn debug_transforms(&self) -> &[Mat4] {
        &self.debug_matrices
    }

    /// The skinning matrices as raw bytes, ready for a buffer write.
    #[must_use]
    pub fn final_transforms_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.joint_matrices)
    }
}
