//! Inclinometer / IMU sensor model
//!
//! Simulates raw 3-axis accelerometer and gyroscope readings from a known
//! orientation (roll, pitch, yaw), body-frame linear acceleration and
//! body-frame angular velocity, with per-axis white noise and a fixed
//! gyro bias.
//!
//! Axes: x forward, y right, z up, so world gravity is `[0, 0, -g]`.

use nalgebra::{Matrix3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use super::config::SensorConfig;
use super::profiles::MotionSample;
use crate::error::{InclineError, Result};
use crate::math::{body_from_world, euler_rates};

/// Below this √(ay² + az²) the pitch formula is treated as degenerate
const MIN_TILT_NORM: f64 = 1e-9;

/// Roll and pitch from a single accelerometer sample
///
/// Assumes gravity dominates the specific force:
///
/// ```text
/// pitch = atan2(-ax, √(ay² + az²))     (0 if the root is ~0)
/// roll  = -atan2(-ay, -az)
/// ```
///
/// Memoryless: no noise rejection beyond what the EKF later provides.
pub fn roll_pitch_from_accel(accel: &Vector3<f64>) -> (f64, f64) {
    let (ax, ay, az) = (accel.x, accel.y, accel.z);

    let denom = (ay * ay + az * az).sqrt();
    let pitch = if denom < MIN_TILT_NORM {
        0.0
    } else {
        (-ax).atan2(denom)
    };
    let roll = -(-ay).atan2(-az);

    (roll, pitch)
}

/// Zero-mean Gaussian vector with per-axis std dev
fn gaussian_vec3<R: Rng>(rng: &mut R, std_dev: &Vector3<f64>) -> Vector3<f64> {
    let nx: f64 = rng.sample(StandardNormal);
    let ny: f64 = rng.sample(StandardNormal);
    let nz: f64 = rng.sample(StandardNormal);
    Vector3::new(nx * std_dev.x, ny * std_dev.y, nz * std_dev.z)
}

/// Inclinometer simulator
///
/// Holds the current true orientation and kinematics; set them directly
/// or integrate them with [`step`](Self::step), then call
/// [`read_accel`](Self::read_accel) / [`read_gyro`](Self::read_gyro).
/// All randomness comes from the injected `rng`, so the same seed and the
/// same call sequence reproduce identical readings.
#[derive(Debug, Clone)]
pub struct InclinometerSim<R = StdRng> {
    config: SensorConfig,
    /// World-frame gravity [0, 0, -g]
    gravity_world: Vector3<f64>,
    /// Orientation (roll, pitch, yaw) [rad]
    orientation: Vector3<f64>,
    /// Linear acceleration, body frame [m/s²]
    linear_accel_body: Vector3<f64>,
    /// Angular velocity, body frame [rad/s]
    angular_velocity_body: Vector3<f64>,
    rng: R,
}

impl InclinometerSim<StdRng> {
    /// Simulator driven by a `StdRng` seeded with `seed`
    pub fn seeded(config: SensorConfig, seed: u64) -> Result<Self> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> InclinometerSim<R> {
    pub fn new(config: SensorConfig, rng: R) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            gravity_world: config.gravity_world(),
            orientation: config.orientation,
            linear_accel_body: config.linear_accel_body,
            angular_velocity_body: config.angular_velocity_body,
            config,
            rng,
        })
    }

    /// Set orientation [rad]
    pub fn set_orientation(&mut self, roll: f64, pitch: f64, yaw: f64) {
        self.orientation = Vector3::new(roll, pitch, yaw);
    }

    /// Set body-frame linear acceleration [m/s²]
    pub fn set_linear_accel_body(&mut self, accel: Vector3<f64>) {
        self.linear_accel_body = accel;
    }

    /// Set body-frame angular velocity [rad/s]
    pub fn set_angular_velocity_body(&mut self, omega: Vector3<f64>) {
        self.angular_velocity_body = omega;
    }

    /// Load the truth from a motion profile sample
    ///
    /// World-frame accelerations are rotated into the body frame here.
    pub fn apply_motion(&mut self, sample: &MotionSample) {
        self.orientation = sample.orientation;
        self.linear_accel_body = sample.linear_accel_body();
        self.angular_velocity_body = sample.angular_velocity;
    }

    /// Simulated accelerometer reading, body frame
    ///
    /// a_meas = a_body + R_bw · g_world + noise
    pub fn read_accel(&mut self) -> Vector3<f64> {
        let gravity_body = self.body_from_world() * self.gravity_world;
        let noise = gaussian_vec3(&mut self.rng, &self.config.accel_noise_std);

        self.linear_accel_body + gravity_body + noise
    }

    /// Simulated gyroscope reading, body frame
    ///
    /// ω_meas = ω_body + bias + noise
    pub fn read_gyro(&mut self) -> Vector3<f64> {
        let noise = gaussian_vec3(&mut self.rng, &self.config.gyro_noise_std);

        self.angular_velocity_body + self.config.gyro_bias + noise
    }

    /// Read the accelerometer once and convert it to (roll, pitch)
    pub fn read_roll_pitch_from_accel(&mut self) -> (f64, f64) {
        let accel = self.read_accel();
        roll_pitch_from_accel(&accel)
    }

    /// Advance the true orientation by integrating the current body rates
    ///
    /// Explicit Euler step through the nonlinear Euler-angle kinematics.
    /// Near gimbal lock only the rate evaluation uses a clamped pitch.
    pub fn step(&mut self, dt: f64) -> Result<()> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(InclineError::InvalidInput(format!(
                "dt must be positive and finite, got {dt}"
            )));
        }

        let rates = euler_rates(&self.orientation, &self.angular_velocity_body);
        self.orientation += rates * dt;
        Ok(())
    }

    /// Current orientation (roll, pitch, yaw) [rad]
    pub fn orientation(&self) -> Vector3<f64> {
        self.orientation
    }

    /// Current body-frame linear acceleration [m/s²]
    pub fn linear_accel_body(&self) -> Vector3<f64> {
        self.linear_accel_body
    }

    /// Current body-frame angular velocity [rad/s]
    pub fn angular_velocity_body(&self) -> Vector3<f64> {
        self.angular_velocity_body
    }

    /// R_bw for the current orientation
    pub fn body_from_world(&self) -> Matrix3<f64> {
        body_from_world(self.orientation.x, self.orientation.y, self.orientation.z)
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn ideal_sim() -> InclinometerSim {
        InclinometerSim::seeded(SensorConfig::ideal(), 1).unwrap()
    }

    #[test]
    fn test_level_accel_gives_zero_tilt() {
        let (roll, pitch) = roll_pitch_from_accel(&Vector3::new(0.0, 0.0, -9.81));

        assert_relative_eq!(roll, 0.0, epsilon = 1e-6);
        assert_relative_eq!(pitch, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_accel_along_y_is_quarter_roll() {
        // -atan2(-9.81, -0.0) = +π/2 with this sign convention
        let (roll, pitch) = roll_pitch_from_accel(&Vector3::new(0.0, 9.81, 0.0));

        assert_relative_eq!(roll, FRAC_PI_2, epsilon = 1e-6);
        assert_relative_eq!(pitch, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_pitch_is_zero() {
        let (_, pitch) = roll_pitch_from_accel(&Vector3::new(9.81, 0.0, 0.0));
        assert_eq!(pitch, 0.0);
    }

    #[test]
    fn test_accel_tilt_recovers_orientation() {
        let mut sim = ideal_sim();

        for &roll in &[-2.5, -0.7, 0.0, 0.3, 1.4, 3.0] {
            for &pitch in &[-1.5, -0.4, 0.0, 0.2, 1.2] {
                sim.set_orientation(roll, pitch, 0.8);
                let (r, p) = sim.read_roll_pitch_from_accel();

                assert_relative_eq!(r, roll, epsilon = 1e-9);
                assert_relative_eq!(p, pitch, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_ideal_accel_includes_linear_acceleration() {
        let mut sim = ideal_sim();
        sim.set_linear_accel_body(Vector3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(sim.read_accel(), Vector3::new(1.0, 0.0, -9.81), epsilon = 1e-12);
    }

    #[test]
    fn test_gyro_bias() {
        let config = SensorConfig {
            gyro_noise_std: Vector3::zeros(),
            gyro_bias: Vector3::new(0.1, 0.0, -0.2),
            ..SensorConfig::ideal()
        };
        let mut sim = InclinometerSim::seeded(config, 7).unwrap();
        sim.set_angular_velocity_body(Vector3::new(0.5, 0.5, 0.5));

        assert_relative_eq!(sim.read_gyro(), Vector3::new(0.6, 0.5, 0.3), epsilon = 1e-12);
    }

    #[test]
    fn test_noise_statistics() {
        let mut sim = InclinometerSim::seeded(SensorConfig::default(), 54321).unwrap();
        let n = 20000;

        let samples: Vec<Vector3<f64>> = (0..n).map(|_| sim.read_accel()).collect();
        let mean: Vector3<f64> = samples.iter().sum::<Vector3<f64>>() / n as f64;
        let var: Vector3<f64> = samples
            .iter()
            .map(|s| (s - mean).component_mul(&(s - mean)))
            .sum::<Vector3<f64>>()
            / n as f64;

        assert_relative_eq!(mean, Vector3::new(0.0, 0.0, -9.81), epsilon = 0.005);
        for std in var.iter().map(|v| v.sqrt()) {
            assert_relative_eq!(std, 0.0981, epsilon = 0.005);
        }
    }

    #[test]
    fn test_seeded_readings_reproducible() {
        let mut a = InclinometerSim::seeded(SensorConfig::default(), 42).unwrap();
        let mut b = InclinometerSim::seeded(SensorConfig::default(), 42).unwrap();
        let mut c = InclinometerSim::seeded(SensorConfig::default(), 43).unwrap();

        for _ in 0..10 {
            let accel = a.read_accel();
            assert_eq!(accel, b.read_accel());
            assert_eq!(a.read_gyro(), b.read_gyro());
            assert_ne!(accel, c.read_accel());
            c.read_gyro();
        }
    }

    #[test]
    fn test_step_integrates_level_roll() {
        let mut sim = ideal_sim();
        sim.set_angular_velocity_body(Vector3::new(0.1, 0.0, 0.0));

        for _ in 0..10 {
            sim.step(0.1).unwrap();
        }

        assert_relative_eq!(sim.orientation(), Vector3::new(0.1, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_step_yaw_rate() {
        let mut sim = ideal_sim();
        sim.set_angular_velocity_body(Vector3::new(0.0, 0.0, PI));
        sim.step(0.5).unwrap();

        assert_relative_eq!(sim.orientation().z, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_step_rejects_bad_dt() {
        let mut sim = ideal_sim();
        sim.set_angular_velocity_body(Vector3::new(1.0, 1.0, 1.0));

        assert!(matches!(sim.step(0.0), Err(InclineError::InvalidInput(_))));
        assert!(matches!(sim.step(-1.0), Err(InclineError::InvalidInput(_))));
        assert_eq!(sim.orientation(), Vector3::zeros());
    }

    #[test]
    fn test_step_near_gimbal_lock_stays_finite() {
        let mut sim = ideal_sim();
        sim.set_orientation(0.2, FRAC_PI_2 - 1e-9, 0.0);
        sim.set_angular_velocity_body(Vector3::new(0.1, 0.2, 0.3));

        sim.step(0.01).unwrap();

        assert!(sim.orientation().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SensorConfig { gravity: -9.81, ..Default::default() };
        assert!(InclinometerSim::seeded(config, 0).is_err());
    }
}
