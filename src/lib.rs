#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod assets;
pub mod errors;
pub mod ik;
pub mod math;
pub mod scene;
pub mod settings;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, LoopMode, PoseEvaluator};
pub use assets::{ImportedScene, SkinnedModel, VertexInfluences};
pub use errors::{Result, SinewError};
pub use ik::{CcdSolver, IkOutcome, IkRequest, IkSettings, IkState};
pub use math::Vqs;
pub use scene::{BonePalette, Joint, JointGraph, JointKey, Skeleton};
pub use settings::AnimationSettings;
