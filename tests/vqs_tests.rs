//! VQS Transform Tests
//!
//! Tests for:
//! - Composition associativity and identity
//! - Point transform vs. matrix conversion
//! - Interpolation boundaries, slerp monotonicity, exponential scale
//! - Matrix decomposition

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Quat, Vec3};
use sinew::math::{Vqs, exp_interpolate, slerp_shortest, uniform_scale};

const EPSILON: f32 = 1e-4;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

fn samples() -> Vec<Vqs> {
    vec![
        Vqs::IDENTITY,
        Vqs::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_x(0.3), 1.5),
        Vqs::new(Vec3::new(-4.0, 0.5, 0.0), Quat::from_rotation_y(2.0), 0.5),
        Vqs::new(
            Vec3::new(0.0, -1.0, 7.0),
            Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), 1.1),
            2.0,
        ),
    ]
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn compose_is_associative_on_points() {
    let p = Vec3::new(0.25, -3.0, 1.0);
    let items = samples();
    for a in &items {
        for b in &items {
            for c in &items {
                let left = (*a * *b) * *c;
                let right = *a * (*b * *c);
                assert!(
                    vec3_approx(left.apply(p), right.apply(p)),
                    "associativity failed: {left:?} vs {right:?}"
                );
            }
        }
    }
}

#[test]
fn compose_applies_right_operand_first() {
    let p = Vec3::new(1.0, 0.0, 0.0);
    for a in samples() {
        for b in samples() {
            assert!(vec3_approx((a * b).apply(p), a.apply(b.apply(p))));
        }
    }
}

#[test]
fn compose_is_not_commutative() {
    let a = Vqs::from_translation(Vec3::X);
    let b = Vqs::from_rotation(Quat::from_rotation_z(FRAC_PI_2));
    let p = Vec3::X;
    assert!(!vec3_approx((a * b).apply(p), (b * a).apply(p)));
}

#[test]
fn identity_is_neutral() {
    let p = Vec3::new(3.0, -2.0, 5.0);
    assert_eq!(Vqs::IDENTITY.apply(p), p);
    for a in samples() {
        assert!((a * Vqs::IDENTITY).approx_eq(&a, EPSILON));
        assert!((Vqs::IDENTITY * a).approx_eq(&a, EPSILON));
    }
}

#[test]
fn apply_scales_then_rotates_then_translates() {
    let a = Vqs::new(Vec3::new(10.0, 0.0, 0.0), Quat::from_rotation_z(FRAC_PI_2), 2.0);
    // (1,0,0) * 2 -> (2,0,0), rotate 90° about Z -> (0,2,0), +translation
    assert!(vec3_approx(a.apply(Vec3::X), Vec3::new(10.0, 2.0, 0.0)));
}

#[test]
fn to_matrix_matches_apply() {
    let p = Vec3::new(-1.0, 4.0, 2.0);
    for a in samples() {
        let m = a.to_matrix();
        assert!(vec3_approx(m.transform_point3(p), a.apply(p)));
    }
}

#[test]
fn to_matrix_puts_translation_in_last_column() {
    let a = Vqs::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.4), 3.0);
    let m = a.to_matrix();
    assert!(vec3_approx(m.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0)));
}

#[test]
fn from_matrix_recovers_components() {
    let a = Vqs::new(Vec3::new(5.0, -1.0, 0.5), Quat::from_rotation_x(0.9), 1.25);
    let back = Vqs::from_matrix(&a.to_matrix());
    assert!(back.approx_eq(&a, EPSILON));
}

#[test]
fn from_matrix_averages_non_uniform_scale() {
    let m = Mat4::from_scale(Vec3::new(1.0, 2.0, 3.0));
    let vqs = Vqs::from_matrix(&m);
    assert!((vqs.s - 2.0).abs() < EPSILON);
    assert!((uniform_scale(Vec3::new(1.0, 2.0, 3.0)) - 2.0).abs() < EPSILON);
}

// ============================================================================
// Interpolation
// ============================================================================

#[test]
fn interpolate_hits_endpoints() {
    let items = samples();
    for a in &items {
        for b in &items {
            assert!(Vqs::interpolate(a, b, 0.0).approx_eq(a, EPSILON));
            assert!(Vqs::interpolate(a, b, 1.0).approx_eq(b, EPSILON));
        }
    }
}

#[test]
fn interpolate_midpoint_components() {
    let a = Vqs::new(Vec3::ZERO, Quat::IDENTITY, 1.0);
    let b = Vqs::new(Vec3::new(2.0, 4.0, 6.0), Quat::from_rotation_y(FRAC_PI_2), 4.0);
    let mid = Vqs::interpolate(&a, &b, 0.5);

    assert!(vec3_approx(mid.v, Vec3::new(1.0, 2.0, 3.0)));
    assert!((mid.q.angle_between(Quat::from_rotation_y(FRAC_PI_2 / 2.0))).abs() < EPSILON);
    // Exponential: 1 * (4/1)^0.5
    assert!((mid.s - 2.0).abs() < EPSILON);
}

#[test]
fn slerp_angle_grows_monotonically() {
    let a = Quat::from_rotation_x(0.2);
    let b = Quat::from_axis_angle(Vec3::new(0.0, 1.0, 1.0).normalize(), 2.5);

    let mut previous = -1.0;
    for step in 0..=20 {
        let t = step as f32 / 20.0;
        let angle = slerp_shortest(a, b, t).angle_between(a);
        assert!(angle >= previous - 1e-5, "angle decreased at t={t}");
        previous = angle;
    }
    assert!((previous - b.angle_between(a)).abs() < 1e-3);
}

#[test]
fn slerp_constant_angular_speed() {
    let a = Quat::IDENTITY;
    let b = Quat::from_rotation_z(2.0);
    for step in 0..=10 {
        let t = step as f32 / 10.0;
        let angle = slerp_shortest(a, b, t).angle_between(a);
        assert!((angle - 2.0 * t).abs() < 1e-3);
    }
}

#[test]
fn slerp_negates_opposite_hemisphere() {
    let a = Quat::from_rotation_y(0.1);
    let b = -Quat::from_rotation_y(0.3);
    let mid = slerp_shortest(a, b, 0.5);
    assert!(mid.angle_between(Quat::from_rotation_y(0.2)) < EPSILON);
}

#[test]
fn slerp_nearly_identical_stays_finite() {
    let a = Quat::from_rotation_x(1.0);
    let b = Quat::from_rotation_x(1.0 + 1e-7);
    let q = slerp_shortest(a, b, 0.5);
    assert!(q.is_finite());
    assert!((q.length() - 1.0).abs() < EPSILON);
}

#[test]
fn slerp_half_turn_is_unit_length() {
    let q = slerp_shortest(Quat::IDENTITY, Quat::from_rotation_y(PI), 0.5);
    assert!((q.length() - 1.0).abs() < EPSILON);
    assert!((q.angle_between(Quat::IDENTITY) - FRAC_PI_2).abs() < 1e-3);
}

#[test]
fn exp_interpolate_boundaries() {
    assert!((exp_interpolate(0.5, 8.0, 0.0) - 0.5).abs() < EPSILON);
    assert!((exp_interpolate(0.5, 8.0, 1.0) - 8.0).abs() < EPSILON);
    assert!((exp_interpolate(2.0, 2.0, 0.3) - 2.0).abs() < EPSILON);
}
