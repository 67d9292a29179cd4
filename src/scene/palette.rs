//! Per-frame snapshots of the skinning matrices.
//!
//! The evaluator rewrites [`Skeleton`]'s matrices every frame. When several
//! frames are in flight on the GPU, each one needs the matrices it was
//! recorded with, so the upload step copies them into a ring of slots and
//! reads only from the slot belonging to its frame.

use glam::Mat4;

use crate::scene::skeleton::Skeleton;

#[derive(Debug, Clone)]
pub struct BonePalette {
    slots: Vec<Vec<Mat4>>,
    next: usize,
}

impl BonePalette {
    /// `frames_in_flight` is clamped to at least one slot.
    #[must_use]
    pub fn new(frames_in_flight: usize) -> Self {
        Self {
            slots: vec![Vec::new(); frames_in_flight.max(1)],
            next: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn frames_in_flight(&self) -> usize {
        self.slots.len()
    }

    /// Copies the current matrices into the next slot and returns its index.
    pub fn publish(&mut self, skeleton: &Skeleton) -> usize {
        let slot = self.next;
        let target = &mut self.slots[slot];
        target.clear();
        target.extend_from_slice(skeleton.final_transforms());
        self.next = (self.next + 1) % self.slots.len();
        slot
    }

    #[inline]
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&[Mat4]> {
        self.slots.get(index).map(Vec::as_slice)
    }

    #[must_use]
    pub fn slot_bytes(&self, index: usize) -> Option<&[u8]> {
        self.slot(index).map(bytemuck::cast_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vqs;
    use glam::Vec3;

    #[test]
    fn published_slots_are_independent() {
        let mut skeleton = Skeleton::new("test");
        let bone = skeleton.get_or_insert("bone", Vqs::IDENTITY);
        let mut palette = BonePalette::new(2);

        skeleton.set_final_transform(bone, Vqs::from_translation(Vec3::X));
        let first = palette.publish(&skeleton);

        skeleton.set_final_transform(bone, Vqs::from_translation(Vec3::Y));
        let second = palette.publish(&skeleton);

        assert_ne!(first, second);
        assert_eq!(palette.slot(first).unwrap()[0].w_axis.truncate(), Vec3::X);
        assert_eq!(palette.slot(second).unwrap()[0].w_axis.truncate(), Vec3::Y);
        assert_eq!(palette.slot_bytes(first).unwrap().len(), 64);

        // Ring wraps around to the first slot.
        assert_eq!(palette.publish(&skeleton), first);
    }
}
