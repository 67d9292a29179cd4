use crate::animation::action::{AnimationAction, LoopMode};
use crate::animation::evaluator::PoseEvaluator;
use crate::assets::SkinnedModel;
use crate::ik::{CcdSolver, IkOutcome, IkRequest};
use crate::settings::AnimationSettings;

/// Drives one [`SkinnedModel`] per frame: advances the active clip, walks the
/// hierarchy, optionally runs IK, then writes the bone matrices.
#[derive(Debug, Clone, Default)]
pub struct AnimationMixer {
    action: Option<AnimationAction>,
    solver: CcdSolver,
    default_loop_mode: LoopMode,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(&AnimationSettings::default())
    }

    #[must_use]
    pub fn with_settings(settings: &AnimationSettings) -> Self {
        Self {
            action: None,
            solver: CcdSolver::new(settings.ik),
            default_loop_mode: settings.default_loop_mode,
        }
    }

    /// Starts `clip` from the beginning. Returns `false` when the model has no
    /// such clip; the current action keeps playing in that case.
    pub fn play(&mut self, model: &SkinnedModel, clip: &str) -> bool {
        let Some(clip) = model.clip(clip) else {
            log::warn!("Animation clip '{clip}' not found");
            return false;
        };
        self.action =
            Some(AnimationAction::new(clip.clone()).with_loop_mode(self.default_loop_mode));
        true
    }

    /// Stops playback; subsequent updates hold the bind pose.
    pub fn stop(&mut self) {
        self.action = None;
    }

    #[inline]
    #[must_use]
    pub fn action(&self) -> Option<&AnimationAction> {
        self.action.as_ref()
    }

    #[inline]
    pub fn action_mut(&mut self) -> Option<&mut AnimationAction> {
        self.action.as_mut()
    }

    #[inline]
    #[must_use]
    pub fn solver(&self) -> &CcdSolver {
        &self.solver
    }

    #[inline]
    pub fn solver_mut(&mut self) -> &mut CcdSolver {
        &mut self.solver
    }

    /// One frame. `dt` is in seconds.
    ///
    /// The IK request, when given, runs after the joints' globals are known
    /// and before the bone matrices are written, so its corrections show up
    /// in this frame's output. Overrides from the previous frame are dropped
    /// first; every solve starts from this frame's animated pose.
    pub fn update(
        &mut self,
        dt: f32,
        model: &mut SkinnedModel,
        ik: Option<&IkRequest>,
    ) -> Option<IkOutcome> {
        let bone_count = model.skeleton.len();
        model.graph.clear_ik_overrides();

        match self.action.as_mut() {
            Some(action) if action.enabled => {
                action.update(dt);
                let (time, cursors) = action.sample_point(bone_count);
                PoseEvaluator::compute_globals(&mut model.graph, &model.skeleton, Some(time), cursors);
            }
            _ => {
                PoseEvaluator::compute_globals(&mut model.graph, &model.skeleton, None, &mut []);
            }
        }

        let outcome = ik.map(|request| self.solver.solve(&mut model.graph, request));

        PoseEvaluator::finalize_bones(&model.graph, &mut model.skeleton);
        outcome
    }
}
