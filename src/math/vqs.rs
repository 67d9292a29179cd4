use std::ops::Mul;

use glam::{Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Below this `1 - |dot|` the two rotations are treated as parallel and
/// blended linearly instead of through `sin(theta)`.
const NEAR_PARALLEL_EPSILON: f32 = 1e-6;

/// Translation + rotation + uniform scale.
///
/// `a * b` (or [`Vqs::compose`]) yields the transform that applies `b` first,
/// then `a`:
///
/// ```text
/// v' = a.v + a.q * (a.s * b.v)
/// q' = a.q * b.q
/// s' = a.s * b.s
/// ```
///
/// The rotation is expected to be unit length and the scale strictly positive.
/// Both are upheld by every constructor in this crate that takes imported data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vqs {
    pub v: Vec3,
    pub q: Quat,
    pub s: f32,
}

impl Vqs {
    pub const IDENTITY: Self = Self {
        v: Vec3::ZERO,
        q: Quat::IDENTITY,
        s: 1.0,
    };

    #[inline]
    #[must_use]
    pub const fn new(v: Vec3, q: Quat, s: f32) -> Self {
        Self { v, q, s }
    }

    #[inline]
    #[must_use]
    pub const fn from_translation(v: Vec3) -> Self {
        Self {
            v,
            q: Quat::IDENTITY,
            s: 1.0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn from_rotation(q: Quat) -> Self {
        Self {
            v: Vec3::ZERO,
            q,
            s: 1.0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn from_scale(s: f32) -> Self {
        Self {
            v: Vec3::ZERO,
            q: Quat::IDENTITY,
            s,
        }
    }

    /// Decomposes an affine matrix.
    ///
    /// Non-uniform scale collapses to the mean of the three axis scales and any
    /// shear is lost. A mirrored basis shows up as a negative scale, which the
    /// importer rejects.
    #[must_use]
    pub fn from_matrix(m: &Mat4) -> Self {
        let (scale, rotation, translation) = m.to_scale_rotation_translation();
        Self {
            v: translation,
            q: rotation.normalize(),
            s: uniform_scale(scale),
        }
    }

    /// `self ∘ other`: applies `other`, then `self`.
    #[inline]
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            v: self.v + self.q * (self.s * other.v),
            q: (self.q * other.q).normalize(),
            s: self.s * other.s,
        }
    }

    /// Transforms a point: scale, then rotate, then translate.
    #[inline]
    #[must_use]
    pub fn apply(&self, point: Vec3) -> Vec3 {
        self.q * (self.s * point) + self.v
    }

    /// Transforms a direction (no translation).
    #[inline]
    #[must_use]
    pub fn apply_vector(&self, vector: Vec3) -> Vec3 {
        self.q * (self.s * vector)
    }

    /// Exact inverse; valid because the scale is uniform.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let q = self.q.conjugate();
        let s = if self.s.abs() > f32::EPSILON {
            1.0 / self.s
        } else {
            0.0
        };
        Self {
            v: q * (-self.v * s),
            q,
            s,
        }
    }

    /// Column-major `T * R * S`, the layout the shaders consume.
    #[inline]
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.s), self.q, self.v)
    }

    /// Blends two transforms.
    ///
    /// Translation is linear, rotation is a shortest-arc slerp and the scale is
    /// interpolated exponentially (`s0 * (s1 / s0)^t`).
    #[must_use]
    pub fn interpolate(a: &Self, b: &Self, t: f32) -> Self {
        Self {
            v: a.v.lerp(b.v, t),
            q: slerp_shortest(a.q, b.q, t),
            s: exp_interpolate(a.s, b.s, t),
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.v.is_finite() && self.q.is_finite() && self.s.is_finite()
    }

    /// Component-wise comparison, rotations compared up to sign.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.v.abs_diff_eq(other.v, epsilon)
            && (self.s - other.s).abs() <= epsilon
            && self.q.dot(other.q).abs() >= 1.0 - epsilon
    }
}

impl Default for Vqs {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Vqs {
    type Output = Vqs;

    #[inline]
    fn mul(self, rhs: Vqs) -> Vqs {
        self.compose(&rhs)
    }
}

impl Mul<Vec3> for Vqs {
    type Output = Vec3;

    #[inline]
    fn mul(self, rhs: Vec3) -> Vec3 {
        self.apply(rhs)
    }
}

impl From<Vqs> for Mat4 {
    fn from(value: Vqs) -> Self {
        value.to_matrix()
    }
}

/// Spherical interpolation along the shorter arc.
///
/// `b` is negated when the two rotations lie in opposite hemispheres. Nearly
/// parallel inputs fall back to a normalised linear blend.
#[must_use]
pub fn slerp_shortest(a: Quat, b: Quat, t: f32) -> Quat {
    let mut dot = a.dot(b);
    let b = if dot < 0.0 {
        dot = -dot;
        -b
    } else {
        b
    };

    let va = Vec4::from(a);
    let vb = Vec4::from(b);

    if dot > 1.0 - NEAR_PARALLEL_EPSILON {
        return Quat::from_vec4(va.lerp(vb, t)).normalize();
    }

    let theta = dot.clamp(-1.0, 1.0).acos();
    let sin_theta = theta.sin();
    let wa = ((1.0 - t) * theta).sin() / sin_theta;
    let wb = (t * theta).sin() / sin_theta;

    Quat::from_vec4(va * wa + vb * wb).normalize()
}

/// `s0 * (s1 / s0)^t`.
///
/// Both scales must be positive. In release builds a violation degrades to a
/// linear blend so no NaN reaches the bone matrices.
#[must_use]
pub fn exp_interpolate(s0: f32, s1: f32, t: f32) -> f32 {
    debug_assert!(
        s0 > 0.0 && s1 > 0.0,
        "exponential scale interpolation needs positive scales ({s0}, {s1})"
    );
    if s0 <= 0.0 || s1 <= 0.0 {
        return s0 + (s1 - s0) * t;
    }
    s0 * (s1 / s0).powf(t)
}

/// Collapses a per-axis scale into the uniform scale a [`Vqs`] can carry.
#[inline]
#[must_use]
pub fn uniform_scale(scale: Vec3) -> f32 {
    (scale.x + scale.y + scale.z) / 3.0
}
