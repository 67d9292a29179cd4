pub mod action;
pub mod clip;
pub mod evaluator;
pub mod mixer;
pub mod tracks;
pub mod values;

pub use action::{AnimationAction, LoopMode};
pub use clip::{AnimationClip, ChannelCursors, DEFAULT_TICKS_PER_SECOND, NodeChannels, TargetPath};
pub use evaluator::{ClipTime, PoseEvaluator};
pub use mixer::AnimationMixer;
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::{Interpolatable, UniformScale};
