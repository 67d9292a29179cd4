//! Cyclic Coordinate Descent
//!
//! Each pass walks from the end-effector's parent up to `max_depth`
//! ancestors. For every joint, the effector and the target are brought into
//! the joint's bone space and the joint is turned by the angle between them.
//! The new rotation is written as the joint's IK override, so it replaces the
//! animated pose in subsequent walks until the overrides are cleared.
//! [`AnimationMixer`](crate::animation::AnimationMixer) clears them at the start
//! of every frame.
//!
//! Joints are measured in the skinned frame, `model ∘ globalInverseRoot ∘ global`,
//! so a reached target is where the rendered mesh puts the effector.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::math::Vqs;
use crate::scene::{JointGraph, JointKey};

/// Rotation axes shorter than this (squared) are treated as undefined.
const AXIS_EPSILON: f32 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkSettings {
    /// Number of ancestors above the end-effector that may rotate.
    pub max_depth: usize,
    /// Hard cap on corrective passes.
    pub max_iterations: u32,
    /// Effector-to-target distance counted as reached.
    pub reach_threshold: f32,
    /// A pass that moves the effector less than this ends the solve.
    pub movement_threshold: f32,
    /// Joints already within this angle (radians) end the current pass.
    pub angle_threshold: f32,
}

impl Default for IkSettings {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_iterations: 32,
            reach_threshold: 0.1,
            movement_threshold: 1e-4,
            angle_threshold: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IkState {
    #[default]
    Idle,
    Iterating,
    Converged,
    Failed,
}

/// Drive `effector` towards the world-space `target`.
///
/// `model` places the skinned mesh in the world; the root's own bind
/// placement is cancelled first, as it is for the bone matrices.
#[derive(Debug, Clone, Copy)]
pub struct IkRequest {
    pub effector: JointKey,
    pub target: Vec3,
    pub model: Mat4,
}

impl IkRequest {
    #[must_use]
    pub fn new(effector: JointKey, target: Vec3) -> Self {
        Self {
            effector,
            target,
            model: Mat4::IDENTITY,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: Mat4) -> Self {
        self.model = model;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkOutcome {
    /// Always terminal: `Converged` or `Failed`.
    pub state: IkState,
    /// Corrective passes that rotated at least one joint.
    pub iterations: u32,
    /// Final effector-to-target distance; infinite when nothing was solved.
    pub distance: f32,
}

impl IkOutcome {
    #[inline]
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.state == IkState::Converged
    }

    fn failed() -> Self {
        Self {
            state: IkState::Failed,
            iterations: 0,
            distance: f32::INFINITY,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CcdSolver {
    pub settings: IkSettings,
    state: IkState,
}

impl CcdSolver {
    #[must_use]
    pub fn new(settings: IkSettings) -> Self {
        Self {
            settings,
            state: IkState::Idle,
        }
    }

    /// State left by the last solve.
    #[inline]
    #[must_use]
    pub fn state(&self) -> IkState {
        self.state
    }

    /// Runs CCD until the effector is within reach, stops moving, or the
    /// iteration cap is hit.
    ///
    /// An effector without a parent (or not in `graph`) fails immediately
    /// and nothing is modified. A failed solve after corrective passes keeps
    /// the partial corrections.
    pub fn solve(&mut self, graph: &mut JointGraph, request: &IkRequest) -> IkOutcome {
        let s = self.settings;
        self.state = IkState::Idle;

        let chain: SmallVec<[JointKey; 8]> = graph
            .ancestors(request.effector)
            .take(s.max_depth)
            .collect();
        if chain.is_empty() {
            log::debug!("IK effector has no parent chain; nothing to solve");
            return self.finish(IkOutcome::failed());
        }

        let Some(mut effector) = graph.world_position(request.effector, &request.model) else {
            return self.finish(IkOutcome::failed());
        };
        let target = request.target;

        let mut distance = effector.distance(target);
        if !distance.is_finite() {
            return self.finish(IkOutcome::failed());
        }
        if distance < s.reach_threshold {
            return self.finish(IkOutcome {
                state: IkState::Converged,
                iterations: 0,
                distance,
            });
        }

        self.state = IkState::Iterating;
        let mut iterations = 0;

        while iterations < s.max_iterations {
            let previous = effector;
            let mut corrected = false;

            for &joint_key in &chain {
                let rotation = match correction(graph, joint_key, effector, target, request, s) {
                    Correction::Rotate(rotation) => rotation,
                    Correction::Skip => continue,
                    // This joint already points at the target.
                    Correction::Aligned => break,
                };

                if let Some(joint) = graph.get_mut(joint_key) {
                    let base = joint.ik_local.unwrap_or(joint.local);
                    joint.ik_local = Some(base * Vqs::from_rotation(rotation));
                }
                graph.update_subtree(joint_key);
                corrected = true;

                if let Some(p) = graph.world_position(request.effector, &request.model) {
                    effector = p;
                }
            }

            if !corrected {
                break;
            }
            iterations += 1;

            distance = effector.distance(target);
            log::trace!("IK pass {iterations}: distance {distance}");

            if distance < s.reach_threshold {
                break;
            }
            if effector.distance(previous) < s.movement_threshold {
                break;
            }
        }

        let state = if distance < s.reach_threshold {
            IkState::Converged
        } else {
            IkState::Failed
        };
        if state == IkState::Failed {
            log::debug!("IK did not converge after {iterations} passes (distance {distance})");
        }

        self.finish(IkOutcome {
            state,
            iterations,
            distance,
        })
    }

    fn finish(&mut self, outcome: IkOutcome) -> IkOutcome {
        self.state = outcome.state;
        outcome
    }
}

enum Correction {
    Rotate(Quat),
    Aligned,
    /// Missing joint, effector or target at the joint's origin, or an
    /// undefined axis (anti-parallel vectors).
    Skip,
}

/// Bone-space rotation turning `effector` towards `target` around `joint_key`.
fn correction(
    graph: &JointGraph,
    joint_key: JointKey,
    effector: Vec3,
    target: Vec3,
    request: &IkRequest,
    s: IkSettings,
) -> Correction {
    let Some(pose) = graph.model_space(joint_key) else {
        return Correction::Skip;
    };
    let to_bone_space = (request.model * pose.to_matrix()).inverse();

    let from = to_bone_space.transform_point3(effector).normalize_or_zero();
    let to = to_bone_space.transform_point3(target).normalize_or_zero();
    if from == Vec3::ZERO || to == Vec3::ZERO {
        return Correction::Skip;
    }

    let angle = from.dot(to).clamp(-1.0, 1.0).acos();
    if !angle.is_finite() {
        return Correction::Skip;
    }
    if angle < s.angle_threshold {
        return Correction::Aligned;
    }

    let axis = from.cross(to);
    if axis.length_squared() < AXIS_EPSILON {
        return Correction::Skip;
    }

    Correction::Rotate(Quat::from_axis_angle(axis.normalize(), angle))
}
