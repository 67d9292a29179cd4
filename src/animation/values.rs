use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::{exp_interpolate, slerp_shortest};

/// A sample type a [`KeyframeTrack`](crate::animation::KeyframeTrack) can blend.
pub trait Interpolatable: Copy + Clone + Sized {
    /// The value a channel yields when it has no data.
    const NEUTRAL: Self;

    fn interpolate(start: Self, end: Self, t: f32) -> Self;
}

/// Uniform scale sample.
///
/// Kept distinct from a bare `f32` so scale channels blend exponentially
/// rather than linearly.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniformScale(pub f32);

impl Default for UniformScale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl Interpolatable for UniformScale {
    const NEUTRAL: Self = UniformScale(1.0);

    fn interpolate(start: Self, end: Self, t: f32) -> Self {
        UniformScale(exp_interpolate(start.0, end.0, t))
    }
}

impl Interpolatable for Vec3 {
    const NEUTRAL: Self = Vec3::ZERO;

    fn interpolate(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl Interpolatable for Quat {
    const NEUTRAL: Self = Quat::IDENTITY;

    fn interpolate(start: Self, end: Self, t: f32) -> Self {
        slerp_shortest(start, end, t)
    }
}
