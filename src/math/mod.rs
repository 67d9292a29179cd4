//! Transform primitives.
//!
//! - [`Vqs`]: translation + rotation + uniform scale, the transform every
//!   joint, bone offset and keyframe sample is expressed in.

pub mod vqs;

pub use vqs::{Vqs, exp_interpolate, slerp_shortest, uniform_scale};
