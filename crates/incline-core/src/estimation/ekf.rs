//! Extended Kalman Filter for roll, pitch and gyro bias
//!
//! State vector (5D):
//!
//! ```text
//! x = [φ, θ, bx, by, bz]ᵀ
//! ```
//!
//! Roll and pitch are propagated by integrating bias-corrected gyro rates
//! through the nonlinear Euler-angle kinematics. Biases are modeled as
//! constant and only move through process noise and measurement updates.
//! The measurement is the roll/pitch pair derived from one accelerometer
//! sample, so the measurement model is linear.

use nalgebra::{Matrix2, Matrix2x5, Matrix5, Matrix5x2, Vector2, Vector3, Vector5};
use serde::{Deserialize, Serialize};

use super::innovation::{InnovationLog, InnovationRecord};
use crate::error::{require_positive, InclineError, Result};
use crate::math::{guard_pitch, roll_pitch_rates};

/// Filter state vector [roll, pitch, bias_x, bias_y, bias_z]
pub type StateVector = Vector5<f64>;

/// Filter covariance
pub type Covariance = Matrix5<f64>;

const ROLL: usize = 0;
const PITCH: usize = 1;
const BIAS: usize = 2;

/// Maximum |P − Pᵀ| accepted for an initial covariance
const SYMMETRY_TOL: f64 = 1e-9;

/// Process and measurement noise configuration
///
/// Process noise entries are spectral densities; the discrete Q is
/// `diag(q_roll, q_pitch, q_bias, q_bias, q_bias)·dt`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Roll process noise [rad²/s]
    pub q_roll: f64,
    /// Pitch process noise [rad²/s]
    pub q_pitch: f64,
    /// Gyro bias random walk, per axis [rad²/s³]
    pub q_bias: f64,
    /// Accelerometer roll measurement variance [rad²]
    pub r_roll: f64,
    /// Accelerometer pitch measurement variance [rad²]
    pub r_pitch: f64,
    /// Smallest det(S) accepted before an update is refused
    pub singular_threshold: f64,
    /// Number of innovation records retained (0 disables recording)
    pub innovation_capacity: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            q_roll: 1e-5,
            q_pitch: 1e-5,
            q_bias: 1e-8,
            r_roll: 0.01 * 0.01,
            r_pitch: 0.01 * 0.01,
            singular_threshold: 1e-18,
            innovation_capacity: 1024,
        }
    }
}

impl FilterConfig {
    /// Check that every noise value is strictly positive and finite
    pub fn validate(&self) -> Result<()> {
        require_positive("q_roll", self.q_roll)?;
        require_positive("q_pitch", self.q_pitch)?;
        require_positive("q_bias", self.q_bias)?;
        require_positive("r_roll", self.r_roll)?;
        require_positive("r_pitch", self.r_pitch)?;
        require_positive("singular_threshold", self.singular_threshold)
    }

    /// Discrete process noise for a step of `dt` seconds
    pub fn process_noise(&self, dt: f64) -> Covariance {
        Matrix5::from_diagonal(&Vector5::new(
            self.q_roll,
            self.q_pitch,
            self.q_bias,
            self.q_bias,
            self.q_bias,
        )) * dt
    }

    /// Measurement noise R = diag(r_roll, r_pitch)
    pub fn measurement_noise(&self) -> Matrix2<f64> {
        Matrix2::new(
            self.r_roll, 0.0,
            0.0, self.r_pitch,
        )
    }
}

/// Estimate and covariance, always replaced together
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EkfState {
    /// State estimate
    pub x: StateVector,
    /// Covariance matrix
    pub p: Covariance,
}

impl EkfState {
    /// Zero state with identity covariance
    pub fn new() -> Self {
        Self {
            x: StateVector::zeros(),
            p: Covariance::identity(),
        }
    }
}

impl Default for EkfState {
    fn default() -> Self {
        Self::new()
    }
}

/// Roll/pitch inclinometer EKF with online gyro bias estimation
///
/// `predict` and `update` may be called in any order and at any cadence.
/// The filter assumes exclusive access during each call; share it across
/// threads behind a `Mutex`.
#[derive(Debug, Clone)]
pub struct InclinometerEkf {
    config: FilterConfig,
    state: EkfState,
    innovations: InnovationLog,
}

impl InclinometerEkf {
    /// Create a filter at x = 0, P = I
    pub fn new(config: FilterConfig) -> Result<Self> {
        Self::with_initial(config, StateVector::zeros(), Covariance::identity())
    }

    /// Create a filter from an explicit initial estimate
    ///
    /// `p` must be finite, symmetric and have a non-negative diagonal.
    pub fn with_initial(config: FilterConfig, x: StateVector, p: Covariance) -> Result<Self> {
        config.validate()?;

        if !x.iter().chain(p.iter()).all(|v| v.is_finite()) {
            return Err(InclineError::InvalidConfig(
                "initial state and covariance must be finite".into(),
            ));
        }
        if (p - p.transpose()).amax() > SYMMETRY_TOL {
            return Err(InclineError::InvalidConfig(
                "initial covariance must be symmetric".into(),
            ));
        }
        if p.diagonal().iter().any(|&v| v < 0.0) {
            return Err(InclineError::InvalidConfig(
                "initial covariance must have a non-negative diagonal".into(),
            ));
        }

        log::debug!("inclinometer EKF created with {config:?}");

        Ok(Self {
            config,
            state: EkfState { x, p },
            innovations: InnovationLog::with_capacity(config.innovation_capacity),
        })
    }

    /// Propagate the estimate with one gyro sample over `dt` seconds
    ///
    /// Fails with [`InclineError::InvalidInput`] for `dt <= 0` or
    /// non-finite inputs, leaving the filter untouched.
    pub fn predict(&mut self, gyro: &Vector3<f64>, dt: f64) -> Result<()> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(InclineError::InvalidInput(format!(
                "dt must be positive and finite, got {dt}"
            )));
        }
        if !gyro.iter().all(|w| w.is_finite()) {
            return Err(InclineError::InvalidInput(format!(
                "gyro sample must be finite, got {gyro:?}"
            )));
        }

        let omega = gyro - self.bias();
        let roll = self.state.x[ROLL];
        let pitch = guard_pitch(self.state.x[PITCH]);

        let x = propagate(&self.state.x, gyro, dt);

        // Covariance prediction: P = F * P * F' + Q
        let f = transition_jacobian(roll, pitch, &omega, dt);
        let p = symmetrize(f * self.state.p * f.transpose() + self.config.process_noise(dt));

        self.state = EkfState { x, p };
        Ok(())
    }

    /// Correct the estimate with an accelerometer-derived (roll, pitch)
    ///
    /// Fails with [`InclineError::NumericalError`] when the innovation
    /// covariance is numerically singular; in that case nothing is
    /// recorded and the filter is untouched.
    pub fn update(&mut self, z: (f64, f64)) -> Result<()> {
        let z = Vector2::new(z.0, z.1);
        if !z.iter().all(|v| v.is_finite()) {
            return Err(InclineError::InvalidInput(format!(
                "measurement must be finite, got {z:?}"
            )));
        }

        let h = measurement_matrix();
        let r = self.config.measurement_noise();

        // Innovation and its covariance: S = H * P * H' + R
        let y = z - h * self.state.x;
        let s = h * self.state.p * h.transpose() + r;

        let det = s.determinant();
        if !(det.is_finite() && det >= self.config.singular_threshold) {
            log::debug!("update refused, det(S) = {det:e}");
            return Err(InclineError::NumericalError(format!(
                "innovation covariance is singular (det = {det:e})"
            )));
        }
        let s_inv = s.try_inverse().ok_or_else(|| {
            InclineError::NumericalError("innovation covariance is not invertible".into())
        })?;

        self.innovations.push(InnovationRecord { y, s });

        // Kalman gain: K = P * H' * S^(-1)
        let k: Matrix5x2<f64> = self.state.p * h.transpose() * s_inv;
        let x = self.state.x + k * y;

        // Joseph form of P = (I - K H) P
        let i_kh = Covariance::identity() - k * h;
        let p = symmetrize(i_kh * self.state.p * i_kh.transpose() + k * r * k.transpose());

        self.state = EkfState { x, p };
        Ok(())
    }

    /// (roll, pitch, bias_x, bias_y, bias_z) in rad and rad/s
    pub fn get_state(&self) -> (f64, f64, f64, f64, f64) {
        let x = &self.state.x;
        (x[0], x[1], x[2], x[3], x[4])
    }

    /// Estimate and covariance
    pub fn estimate(&self) -> &EkfState {
        &self.state
    }

    /// State vector
    pub fn state_vector(&self) -> &StateVector {
        &self.state.x
    }

    /// Covariance matrix
    pub fn covariance(&self) -> &Covariance {
        &self.state.p
    }

    /// Estimated roll [rad]
    pub fn roll(&self) -> f64 {
        self.state.x[ROLL]
    }

    /// Estimated pitch [rad]
    pub fn pitch(&self) -> f64 {
        self.state.x[PITCH]
    }

    /// Estimated gyro bias [rad/s]
    pub fn bias(&self) -> Vector3<f64> {
        Vector3::new(
            self.state.x[BIAS],
            self.state.x[BIAS + 1],
            self.state.x[BIAS + 2],
        )
    }

    /// One-sigma roll and pitch uncertainty [rad]
    pub fn angle_std(&self) -> Vector2<f64> {
        let p = &self.state.p;
        Vector2::new(p[(ROLL, ROLL)].max(0.0).sqrt(), p[(PITCH, PITCH)].max(0.0).sqrt())
    }

    /// Filter configuration
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Innovation records from recent updates
    pub fn innovations(&self) -> &InnovationLog {
        &self.innovations
    }

    /// Mutable access to the innovation log, e.g. to drain it
    pub fn innovations_mut(&mut self) -> &mut InnovationLog {
        &mut self.innovations
    }

    /// Back to x = 0, P = I with an empty innovation log
    pub fn reset(&mut self) {
        self.state = EkfState::new();
        self.innovations.clear();
    }
}

/// Nonlinear state transition: Euler step of the bias-corrected kinematics
fn propagate(x: &StateVector, gyro: &Vector3<f64>, dt: f64) -> StateVector {
    let omega = gyro - Vector3::new(x[BIAS], x[BIAS + 1], x[BIAS + 2]);
    let (roll_dot, pitch_dot) = roll_pitch_rates(x[ROLL], guard_pitch(x[PITCH]), &omega);

    let mut next = *x;
    next[ROLL] += roll_dot * dt;
    next[PITCH] += pitch_dot * dt;
    next
}

/// F = I + ∂f/∂x · dt for the Euler step in [`propagate`]
///
/// Only the roll and pitch rows differ from identity. Bias columns follow
/// from ∂w_i/∂b_i = −1.
fn transition_jacobian(roll: f64, pitch: f64, omega: &Vector3<f64>, dt: f64) -> Covariance {
    let (sr, cr) = roll.sin_cos();
    let tp = pitch.tan();
    let cp = pitch.cos();
    let sec2 = 1.0 / (cp * cp);
    let (wy, wz) = (omega.y, omega.z);

    let mut f = Covariance::identity();

    // ∂φ̇/∂(φ, θ, bx, by, bz)
    f[(0, 0)] += (wy * cr - wz * sr) * tp * dt;
    f[(0, 1)] += (wy * sr + wz * cr) * sec2 * dt;
    f[(0, 2)] -= dt;
    f[(0, 3)] -= sr * tp * dt;
    f[(0, 4)] -= cr * tp * dt;

    // ∂θ̇/∂(φ, θ, bx, by, bz); θ̇ does not depend on θ or bx
    f[(1, 0)] -= (wy * sr + wz * cr) * dt;
    f[(1, 3)] -= cr * dt;
    f[(1, 4)] += sr * dt;

    f
}

/// H selects roll and pitch from the state
fn measurement_matrix() -> Matrix2x5<f64> {
    Matrix2x5::new(
        1.0, 0.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0, 0.0,
    )
}

fn symmetrize(p: Covariance) -> Covariance {
    (p + p.transpose()) * 0.5
}
