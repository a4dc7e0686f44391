//! Simulation configuration
//!
//! Defines the sensor model parameters and the run-loop schedule.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, InclineError, Result};
use crate::GRAVITY;

/// Inclinometer / IMU sensor model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Gravity magnitude [m/s²]
    pub gravity: f64,
    /// Accelerometer white noise std dev per axis [m/s²]
    pub accel_noise_std: Vector3<f64>,
    /// Gyroscope white noise std dev per axis [rad/s]
    pub gyro_noise_std: Vector3<f64>,
    /// True (simulated) gyroscope bias per axis [rad/s]
    pub gyro_bias: Vector3<f64>,
    /// Initial orientation (roll, pitch, yaw) [rad]
    pub orientation: Vector3<f64>,
    /// Initial linear acceleration, body frame [m/s²]
    pub linear_accel_body: Vector3<f64>,
    /// Initial angular velocity, body frame [rad/s]
    pub angular_velocity_body: Vector3<f64>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            accel_noise_std: Vector3::repeat(0.0981),
            gyro_noise_std: Vector3::repeat(0.01),
            gyro_bias: Vector3::repeat(0.04),
            orientation: Vector3::zeros(),
            linear_accel_body: Vector3::zeros(),
            angular_velocity_body: Vector3::zeros(),
        }
    }
}

impl SensorConfig {
    /// Noise-free sensor with no gyro bias
    pub fn ideal() -> Self {
        Self {
            accel_noise_std: Vector3::zeros(),
            gyro_noise_std: Vector3::zeros(),
            gyro_bias: Vector3::zeros(),
            ..Default::default()
        }
    }

    /// Check gravity, noise levels and initial kinematics
    pub fn validate(&self) -> Result<()> {
        require_positive("gravity", self.gravity)?;
        for (axis, (&a, &g)) in ["x", "y", "z"]
            .iter()
            .zip(self.accel_noise_std.iter().zip(self.gyro_noise_std.iter()))
        {
            require_non_negative(&format!("accel_noise_std.{axis}"), a)?;
            require_non_negative(&format!("gyro_noise_std.{axis}"), g)?;
        }

        let mut kinematics = self
            .gyro_bias
            .iter()
            .chain(self.orientation.iter())
            .chain(self.linear_accel_body.iter())
            .chain(self.angular_velocity_body.iter());
        if !kinematics.all(|v| v.is_finite()) {
            return Err(InclineError::InvalidConfig(
                "sensor bias and initial kinematics must be finite".into(),
            ));
        }
        Ok(())
    }

    /// World-frame gravity vector [0, 0, -g] (z up)
    pub fn gravity_world(&self) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, -self.gravity)
    }
}

/// Run-loop schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Tick period [s]
    pub dt: f64,
    /// Total simulated duration [s]
    pub duration: f64,
    /// Apply an accelerometer update every N ticks (predict runs every tick)
    pub update_every: usize,
    /// Seed for the sensor noise generator
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dt: 0.01, // 100 Hz
            duration: 10.0,
            update_every: 1,
            seed: 42,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        require_positive("dt", self.dt)?;
        require_non_negative("duration", self.duration)?;
        if self.update_every == 0 {
            return Err(InclineError::InvalidConfig(
                "update_every must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Number of ticks needed to cover `duration`
    pub fn num_steps(&self) -> usize {
        (self.duration / self.dt).round() as usize
    }
}
