//! Animation Settings
//!
//! Tunables for playback and inverse kinematics.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sinew::settings::AnimationSettings;
//! use sinew::ik::IkSettings;
//!
//! // Defaults: looping playback, 3-joint CCD chains
//! let settings = AnimationSettings::default();
//!
//! // Longer IK chains with a tighter reach tolerance
//! let settings = AnimationSettings {
//!     ik: IkSettings { max_depth: 5, reach_threshold: 0.01, ..Default::default() },
//!     ..Default::default()
//! };
//!
//! // Or from a JSON document; missing fields keep their defaults
//! let settings = AnimationSettings::from_json_str(r#"{ "ik": { "max_iterations": 8 } }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::animation::{DEFAULT_TICKS_PER_SECOND, LoopMode};
use crate::errors::Result;
use crate::ik::IkSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub ik: IkSettings,
    /// Loop mode given to clips started through the mixer.
    pub default_loop_mode: LoopMode,
    /// Used for imported clips that declare no ticks-per-second.
    pub default_ticks_per_second: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            ik: IkSettings::default(),
            default_loop_mode: LoopMode::Loop,
            default_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
        }
    }
}

impl AnimationSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
