//! # Incline Core
//!
//! Roll/pitch estimation for a rigid body from noisy, biased inertial
//! sensors.
//!
//! An Extended Kalman Filter propagates roll and pitch with bias-corrected
//! gyro rates through the nonlinear Euler-angle kinematics, and corrects
//! them with the tilt implied by a single accelerometer sample. Gyro bias
//! is estimated online as part of the state.
//!
//! ## Modules
//!
//! - [`math`]: Rotations and Euler-angle rate kinematics with gimbal guard
//! - [`estimation`]: Inclinometer EKF and innovation log
//! - [`simulation`]: Motion profiles, IMU simulator, run loop
//! - [`error`]: Error type shared by all of the above

pub mod error;
pub mod math;
pub mod estimation;
pub mod simulation;

pub use error::{InclineError, Result};
pub use estimation::{FilterConfig, InclinometerEkf};
pub use simulation::{InclinometerSim, MotionProfile, Runner, SensorConfig};

/// Gravity constant [m/s²]
pub const GRAVITY: f64 = 9.81;
