//! Joint Hierarchy Tests
//!
//! Tests for:
//! - Global transform propagation through intermediate (bone-less) joints
//! - Traversal order and sibling independence
//! - Skinning matrix composition and debug transforms
//! - Evaluation determinism
//! - End-effector discovery, bind-pose reset and the frame palette

use glam::{Mat4, Quat, Vec3};

use sinew::animation::{ClipTime, KeyframeTrack, InterpolationMode, NodeChannels, PoseEvaluator};
use sinew::math::Vqs;
use sinew::scene::{BonePalette, Joint, JointGraph, Skeleton};

const EPSILON: f32 = 1e-4;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

fn mat4_approx(a: &Mat4, b: &Mat4) -> bool {
    a.abs_diff_eq(*b, EPSILON)
}

// ============================================================================
// Propagation
// ============================================================================

#[test]
fn grandchild_global_composes_parent_chain() {
    let mut graph = JointGraph::new();
    let root = graph.add_root(Joint::new("root", Vqs::IDENTITY));
    let child = graph
        .add_child(root, Joint::new("child", Vqs::from_translation(Vec3::X)))
        .unwrap();
    let grandchild = graph
        .add_child(child, Joint::new("grandchild", Vqs::from_translation(Vec3::Y)))
        .unwrap();

    let mut skeleton = Skeleton::new("rig");
    PoseEvaluator::evaluate(&mut graph, &mut skeleton, None);

    let global = graph.get(grandchild).unwrap().global();
    assert!(vec3_approx(global.v, Vec3::new(1.0, 1.0, 0.0)));
}

#[test]
fn parent_rotation_and_scale_carry_to_children() {
    let mut graph = JointGraph::new();
    let root = graph.add_root(Joint::new(
        "root",
        Vqs::new(Vec3::ZERO, Quat::from_rotation_z(std::f32::consts::FRAC_PI_2), 2.0),
    ));
    let child = graph
        .add_child(root, Joint::new("child", Vqs::from_translation(Vec3::X)))
        .unwrap();

    graph.update_globals();

    // Scaled to 2, then X turns into Y.
    assert!(vec3_approx(graph.get(child).unwrap().global().v, Vec3::new(0.0, 2.0, 0.0)));
}

#[test]
fn bone_less_joints_still_contribute() {
    let mut skeleton = Skeleton::new("rig");
    let hand = skeleton.get_or_insert("hand", Vqs::IDENTITY);

    let mut graph = JointGraph::new();
    let root = graph.add_root(Joint::new("root", Vqs::IDENTITY));
    let helper = graph
        .add_child(root, Joint::new("helper", Vqs::from_translation(Vec3::Z * 3.0)))
        .unwrap();
    graph
        .add_child(helper, Joint::new("hand", Vqs::from_translation(Vec3::X)).with_bone(hand))
        .unwrap();

    PoseEvaluator::evaluate(&mut graph, &mut skeleton, None);
    let m = skeleton.final_transform(hand).unwrap();
    assert!(vec3_approx(m.w_axis.truncate(), Vec3::new(1.0, 0.0, 3.0)));
}

#[test]
fn depth_first_visits_parents_before_children() {
    let mut graph = JointGraph::new();
    let root = graph.add_root(Joint::new("root", Vqs::IDENTITY));
    let a = graph.add_child(root, Joint::new("a", Vqs::IDENTITY)).unwrap();
    let a1 = graph.add_child(a, Joint::new("a1", Vqs::IDENTITY)).unwrap();
    let b = graph.add_child(root, Joint::new("b", Vqs::IDENTITY)).unwrap();

    assert_eq!(graph.depth_first(), vec![root, a, a1, b]);
    assert_eq!(graph.find_by_name("a1"), Some(a1));
    assert_eq!(graph.find_by_name("missing"), None);
}

#[test]
fn sibling_order_does_not_change_results() {
    fn build(swap: bool) -> JointGraph {
        let mut graph = JointGraph::new();
        let root = graph.add_root(Joint::new("root", Vqs::from_translation(Vec3::Y)));
        let left = Joint::new("left", Vqs::from_rotation(Quat::from_rotation_x(0.4)));
        let right = Joint::new("right", Vqs::from_translation(Vec3::new(2.0, 0.0, 0.0)));
        if swap {
            graph.add_child(root, right).unwrap();
            graph.add_child(root, left).unwrap();
        } else {
            graph.add_child(root, left).unwrap();
            graph.add_child(root, right).unwrap();
        }
        graph.update_globals();
        graph
    }

    let first = build(false);
    let second = build(true);
    for name in ["root", "left", "right"] {
        let a = first.get(first.find_by_name(name).unwrap()).unwrap().global();
        let b = second.get(second.find_by_name(name).unwrap()).unwrap().global();
        assert!(a.approx_eq(b, EPSILON), "'{name}' differs between sibling orders");
    }
}

#[test]
fn multiple_roots_are_all_updated() {
    let mut graph = JointGraph::new();
    let first = graph.add_root(Joint::new("first", Vqs::from_translation(Vec3::X)));
    let second = graph.add_root(Joint::new("second", Vqs::from_translation(Vec3::Y)));
    let leaf = graph
        .add_child(second, Joint::new("leaf", Vqs::from_translation(Vec3::Y)))
        .unwrap();

    graph.update_globals();

    assert_eq!(graph.roots(), &[first, second]);
    assert!(vec3_approx(graph.get(leaf).unwrap().global().v, Vec3::new(0.0, 2.0, 0.0)));
}

// ============================================================================
// Skinning
// ============================================================================

#[test]
fn skinning_matrix_is_inverse_root_global_offset() {
    let root_bind = Vqs::new(Vec3::new(0.0, 0.0, 5.0), Quat::from_rotation_y(0.3), 1.0);
    let elbow_bind = Vqs::new(Vec3::X, Quat::from_rotation_z(0.7), 1.0);
    let offset = Vqs::new(Vec3::new(-1.0, 0.5, 0.0), Quat::from_rotation_x(-0.2), 1.0);

    let mut skeleton = Skeleton::new("rig");
    let bone = skeleton.get_or_insert("elbow", offset);

    let mut graph = JointGraph::new();
    let root = graph.add_root(Joint::new("root", root_bind));
    let elbow = graph
        .add_child(root, Joint::new("elbow", elbow_bind).with_bone(bone))
        .unwrap();
    graph.global_inverse_root = root_bind.inverse();

    PoseEvaluator::evaluate(&mut graph, &mut skeleton, None);

    let global = *graph.get(elbow).unwrap().global();
    let expected = (root_bind.inverse() * global * offset).to_matrix();
    assert!(mat4_approx(skeleton.final_transform(bone).unwrap(), &expected));

    // Cancelling the root placement makes the skinning matrix root-independent.
    let model_space = graph.model_space(elbow).unwrap();
    assert!(model_space.approx_eq(&elbow_bind, EPSILON));
}

#[test]
fn bind_pose_with_matching_offset_is_identity() {
    let bind = Vqs::new(Vec3::new(0.0, 1.0, 0.0), Quat::from_rotation_z(0.5), 1.0);

    let mut skeleton = Skeleton::new("rig");
    let bone = skeleton.get_or_insert("spine", Vqs::IDENTITY);

    let mut graph = JointGraph::new();
    let root = graph.add_root(Joint::new("root", Vqs::IDENTITY));
    let spine = graph
        .add_child(root, Joint::new("spine", bind).with_bone(bone))
        .unwrap();
    graph.update_globals();

    // Offset is the inverse of the bone's bind global.
    let inverse = graph.get(spine).unwrap().global().inverse();
    skeleton.bone_mut(bone).unwrap().offset = inverse;

    PoseEvaluator::evaluate(&mut graph, &mut skeleton, None);
    assert!(mat4_approx(skeleton.final_transform(bone).unwrap(), &Mat4::IDENTITY));
}

#[test]
fn debug_transform_places_bone_in_model_space() {
    let bind = Vqs::new(Vec3::new(2.0, 0.0, 0.0), Quat::from_rotation_y(0.9), 1.0);
    let offset = Vqs::new(Vec3::new(0.3, -0.2, 0.1), Quat::from_rotation_x(0.1), 1.0);

    let mut skeleton = Skeleton::new("rig");
    let bone = skeleton.get_or_insert("arm", offset);

    let mut graph = JointGraph::new();
    graph.add_root(Joint::new("arm", bind).with_bone(bone));

    PoseEvaluator::evaluate(&mut graph, &mut skeleton, None);

    // final ∘ offset⁻¹ cancels the offset and leaves the bone's global.
    assert!(mat4_approx(&skeleton.debug_transforms()[bone], &bind.to_matrix()));
    assert_eq!(skeleton.final_transforms().len(), skeleton.debug_transforms().len());
}

#[test]
fn bone_matrices_are_dense_and_upload_ready() {
    let mut skeleton = Skeleton::new("rig");
    for name in ["a", "b", "c"] {
        skeleton.get_or_insert(name, Vqs::IDENTITY);
    }
    assert_eq!(skeleton.get_or_insert("b", Vqs::from_translation(Vec3::X)), 1);
    assert_eq!(skeleton.len(), 3);
    assert_eq!(skeleton.final_transforms().len(), 3);
    assert_eq!(skeleton.final_transforms_bytes().len(), 3 * 64);
    // First registration wins.
    assert!(skeleton.bone(1).unwrap().offset.approx_eq(&Vqs::IDENTITY, EPSILON));
}

// ============================================================================
// Determinism
// ============================================================================

fn animated_rig() -> (JointGraph, Skeleton) {
    let mut skeleton = Skeleton::new("rig");
    let hip = skeleton.get_or_insert("hip", Vqs::IDENTITY);
    let knee = skeleton.get_or_insert("knee", Vqs::from_translation(-Vec3::Y));

    let channels = NodeChannels::new(
        KeyframeTrack::new(
            vec![0.0, 10.0],
            vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)],
            InterpolationMode::Linear,
        ),
        KeyframeTrack::new(
            vec![0.0, 5.0, 10.0],
            vec![
                Quat::IDENTITY,
                Quat::from_rotation_x(0.8),
                Quat::from_rotation_x(-0.3),
            ],
            InterpolationMode::Linear,
        ),
        KeyframeTrack::constant(sinew::animation::UniformScale(1.0)),
    );
    skeleton
        .bone_mut(hip)
        .unwrap()
        .insert_channels("walk", channels);

    let mut graph = JointGraph::new();
    let root = graph.add_root(Joint::new("root", Vqs::IDENTITY));
    let hip_joint = graph
        .add_child(root, Joint::new("hip", Vqs::IDENTITY).with_bone(hip))
        .unwrap();
    graph
        .add_child(hip_joint, Joint::new("knee", Vqs::from_translation(Vec3::Y)).with_bone(knee))
        .unwrap();

    (graph, skeleton)
}

#[test]
fn evaluation_is_deterministic() {
    let time = ClipTime {
        clip: "walk",
        ticks: 3.7,
        duration: 10.0,
    };

    let (mut graph_a, mut skeleton_a) = animated_rig();
    let (mut graph_b, mut skeleton_b) = animated_rig();
    PoseEvaluator::evaluate(&mut graph_a, &mut skeleton_a, Some(time));
    PoseEvaluator::evaluate(&mut graph_b, &mut skeleton_b, Some(time));
    // Re-evaluating the same graph must not drift either.
    PoseEvaluator::evaluate(&mut graph_a, &mut skeleton_a, Some(time));

    assert_eq!(skeleton_a.final_transforms(), skeleton_b.final_transforms());
}

#[test]
fn unknown_clip_falls_back_to_bind_pose() {
    let (mut graph, mut skeleton) = animated_rig();
    PoseEvaluator::evaluate(&mut graph, &mut skeleton, None);
    let bind = skeleton.final_transforms().to_vec();

    let time = ClipTime {
        clip: "run",
        ticks: 4.0,
        duration: 10.0,
    };
    PoseEvaluator::evaluate(&mut graph, &mut skeleton, Some(time));
    assert_eq!(skeleton.final_transforms(), bind.as_slice());
}

#[test]
fn animated_pose_differs_from_bind_pose() {
    let (mut graph, mut skeleton) = animated_rig();
    PoseEvaluator::evaluate(&mut graph, &mut skeleton, None);
    let bind = skeleton.final_transforms().to_vec();

    let time = ClipTime {
        clip: "walk",
        ticks: 5.0,
        duration: 10.0,
    };
    PoseEvaluator::evaluate(&mut graph, &mut skeleton, Some(time));
    assert!(!mat4_approx(&skeleton.final_transforms()[0], &bind[0]));
}

// ============================================================================
// Queries & Reset
// ============================================================================

#[test]
fn end_effectors_are_leaves_with_bones() {
    let mut skeleton = Skeleton::new("rig");
    let hand = skeleton.get_or_insert("hand", Vqs::IDENTITY);

    let mut graph = JointGraph::new();
    let root = graph.add_root(Joint::new("root", Vqs::IDENTITY));
    let hand_joint = graph
        .add_child(root, Joint::new("hand", Vqs::IDENTITY).with_bone(hand))
        .unwrap();
    // Leaf without a bone: not a candidate.
    graph.add_child(root, Joint::new("marker", Vqs::IDENTITY)).unwrap();

    assert_eq!(graph.end_effectors(), vec![hand_joint]);
}

#[test]
fn world_position_applies_model_matrix() {
    let mut graph = JointGraph::new();
    let root = graph.add_root(Joint::new("root", Vqs::IDENTITY));
    let tip = graph
        .add_child(root, Joint::new("tip", Vqs::from_translation(Vec3::X)))
        .unwrap();
    graph.update_globals();

    let model = Mat4::from_translation(Vec3::new(0.0, 10.0, 0.0));
    assert!(vec3_approx(
        graph.world_position(tip, &model).unwrap(),
        Vec3::new(1.0, 10.0, 0.0)
    ));
}

#[test]
fn reset_to_bind_pose_drops_ik_overrides() {
    let mut graph = JointGraph::new();
    let root = graph.add_root(Joint::new("root", Vqs::IDENTITY));
    let tip = graph
        .add_child(root, Joint::new("tip", Vqs::from_translation(Vec3::X)))
        .unwrap();

    graph.get_mut(root).unwrap().ik_local =
        Some(Vqs::from_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)));
    graph.update_globals();
    assert!(vec3_approx(graph.get(tip).unwrap().global().v, Vec3::Y));

    graph.reset_to_bind_pose();
    assert!(graph.get(root).unwrap().ik_local.is_none());
    assert!(vec3_approx(graph.get(tip).unwrap().global().v, Vec3::X));
}

#[test]
fn palette_keeps_frames_apart() {
    let (mut graph, mut skeleton) = animated_rig();
    let mut palette = BonePalette::new(3);

    PoseEvaluator::evaluate(&mut graph, &mut skeleton, None);
    let bind_slot = palette.publish(&skeleton);

    let time = ClipTime {
        clip: "walk",
        ticks: 5.0,
        duration: 10.0,
    };
    PoseEvaluator::evaluate(&mut graph, &mut skeleton, Some(time));
    let walk_slot = palette.publish(&skeleton);

    assert_eq!(palette.frames_in_flight(), 3);
    assert_ne!(
        palette.slot(bind_slot).unwrap(),
        palette.slot(walk_slot).unwrap()
    );
    assert_eq!(palette.slot(walk_slot).unwrap(), skeleton.final_transforms());
}
