//! Mathematical utilities
//!
//! Elementary rotations, the body-from-world matrix, and the
//! Euler-angle rate kinematics shared by the filter and the simulator.

pub mod rotation;
pub mod kinematics;

pub use rotation::*;
pub use kinematics::*;
