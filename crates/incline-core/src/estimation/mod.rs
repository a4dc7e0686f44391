//! State estimation
//!
//! - EKF for roll, pitch and gyro bias
//! - Bounded innovation log for offline noise tuning

pub mod ekf;
pub mod innovation;

pub use ekf::*;
pub use innovation::*;
