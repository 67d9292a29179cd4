//! Inverse kinematics over the joint hierarchy.

pub mod ccd;

pub use ccd::{CcdSolver, IkOutcome, IkRequest, IkSettings, IkState};
