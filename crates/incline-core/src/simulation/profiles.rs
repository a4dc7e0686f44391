//! Motion profiles
//!
//! Closed-form ground truth for driving the simulator. Each profile maps a
//! time `t` to an orientation, a linear acceleration and a body angular
//! velocity, with no hidden state: the same `t` always gives the same
//! sample, bit for bit.

use std::f64::consts::PI;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::math::world_to_body;

/// Frame in which a sample's linear acceleration is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccelFrame {
    #[default]
    Body,
    World,
}

/// Ground truth at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    /// Orientation (roll, pitch, yaw) [rad]
    pub orientation: Vector3<f64>,
    /// Linear acceleration [m/s²], in `accel_frame`
    pub linear_accel: Vector3<f64>,
    /// Frame of `linear_accel`
    pub accel_frame: AccelFrame,
    /// Angular velocity, body frame [rad/s]
    pub angular_velocity: Vector3<f64>,
}

impl MotionSample {
    /// Motionless sample at a fixed orientation
    pub fn at_rest(orientation: Vector3<f64>) -> Self {
        Self {
            orientation,
            linear_accel: Vector3::zeros(),
            accel_frame: AccelFrame::Body,
            angular_velocity: Vector3::zeros(),
        }
    }

    /// Linear acceleration rotated into the body frame if needed
    pub fn linear_accel_body(&self) -> Vector3<f64> {
        match self.accel_frame {
            AccelFrame::Body => self.linear_accel,
            AccelFrame::World => world_to_body(&self.orientation, &self.linear_accel),
        }
    }

    pub fn roll(&self) -> f64 {
        self.orientation.x
    }

    pub fn pitch(&self) -> f64 {
        self.orientation.y
    }

    pub fn yaw(&self) -> f64 {
        self.orientation.z
    }
}

/// Deterministic motion generators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionProfile {
    /// Fixed orientation, no motion
    Static {
        orientation: Vector3<f64>,
    },
    /// Small roll/pitch oscillation about level with constant yaw rate
    ///
    /// ```text
    /// roll(t)  = A_r · sin(2π f_r t)
    /// pitch(t) = A_p · sin(2π f_p t)
    /// yaw(t)   = ψ̇ · t
    /// ```
    ///
    /// Body rates are taken equal to the Euler-angle rates (small angles).
    Sinusoidal {
        roll_amp: f64,
        roll_freq: f64,
        pitch_amp: f64,
        pitch_freq: f64,
        yaw_rate: f64,
    },
    /// Fixed orientation with a constant world-frame linear acceleration
    ///
    /// The sample is tagged [`AccelFrame::World`]; conversion to the body
    /// frame is left to the consumer.
    LinearAccelWorld {
        accel_world: Vector3<f64>,
        orientation: Vector3<f64>,
    },
    /// Body rates `base + osc · sin(2π f t)` from a level start
    ///
    /// Angles are the closed-form integral
    /// `base·t + (osc/ω)(1 − cos ωt)` with ω = 2π f.
    AngularMotion {
        base_rates: Vector3<f64>,
        oscillatory_rates: Vector3<f64>,
        osc_freq: f64,
    },
    /// Slow yaw, small roll oscillation and fore/aft acceleration
    MixedDemo,
    /// High-frequency x vibration over a slow pitch oscillation
    HighFreqVibration {
        lin_accel_amp: f64,
        vib_freq: f64,
        pitch_rate: f64,
    },
}

impl MotionProfile {
    /// Motionless at the given orientation
    pub fn static_orientation(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self::Static {
            orientation: Vector3::new(roll, pitch, yaw),
        }
    }

    /// 0.1 rad roll and pitch oscillation at 1 Hz, no yaw
    pub fn sinusoidal() -> Self {
        Self::Sinusoidal {
            roll_amp: 0.1,
            roll_freq: 1.0,
            pitch_amp: 0.1,
            pitch_freq: 1.0,
            yaw_rate: 0.0,
        }
    }

    /// Constant world-frame acceleration at a fixed orientation
    pub fn linear_accel_world(accel_world: Vector3<f64>, orientation: Vector3<f64>) -> Self {
        Self::LinearAccelWorld {
            accel_world,
            orientation,
        }
    }

    /// Constant 0.5 rad/s yaw rate
    pub fn angular_motion() -> Self {
        Self::AngularMotion {
            base_rates: Vector3::new(0.0, 0.0, 0.5),
            oscillatory_rates: Vector3::zeros(),
            osc_freq: 1.0,
        }
    }

    /// 0.1 m/s² vibration at 10 Hz, 0.005 rad pitch oscillation
    pub fn high_freq_vibration() -> Self {
        Self::HighFreqVibration {
            lin_accel_amp: 0.1,
            vib_freq: 10.0,
            pitch_rate: 0.005,
        }
    }

    /// Short identifier for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Static { .. } => "static",
            Self::Sinusoidal { .. } => "sinusoidal",
            Self::LinearAccelWorld { .. } => "linear_accel_world",
            Self::AngularMotion { .. } => "angular_motion",
            Self::MixedDemo => "mixed_demo",
            Self::HighFreqVibration { .. } => "high_freq_vibration",
        }
    }

    /// Ground truth at time `t` [s]
    pub fn sample(&self, t: f64) -> MotionSample {
        match *self {
            Self::Static { orientation } => MotionSample::at_rest(orientation),

            Self::Sinusoidal {
                roll_amp,
                roll_freq,
                pitch_amp,
                pitch_freq,
                yaw_rate,
            } => {
                let w_r = 2.0 * PI * roll_freq;
                let w_p = 2.0 * PI * pitch_freq;

                MotionSample {
                    orientation: Vector3::new(
                        roll_amp * (w_r * t).sin(),
                        pitch_amp * (w_p * t).sin(),
                        yaw_rate * t,
                    ),
                    linear_accel: Vector3::zeros(),
                    accel_frame: AccelFrame::Body,
                    angular_velocity: Vector3::new(
                        roll_amp * w_r * (w_r * t).cos(),
                        pitch_amp * w_p * (w_p * t).cos(),
                        yaw_rate,
                    ),
                }
            }

            Self::LinearAccelWorld {
                accel_world,
                orientation,
            } => MotionSample {
                orientation,
                linear_accel: accel_world,
                accel_frame: AccelFrame::World,
                angular_velocity: Vector3::zeros(),
            },

            Self::AngularMotion {
                base_rates,
                oscillatory_rates,
                osc_freq,
            } => {
                let w = 2.0 * PI * osc_freq;
                let angle = |b: f64, o: f64| {
                    if w == 0.0 || o == 0.0 {
                        b * t
                    } else {
                        b * t + (o / w) * (1.0 - (w * t).cos())
                    }
                };

                MotionSample {
                    orientation: base_rates.zip_map(&oscillatory_rates, angle),
                    linear_accel: Vector3::zeros(),
                    accel_frame: AccelFrame::Body,
                    angular_velocity: base_rates + oscillatory_rates * (w * t).sin(),
                }
            }

            Self::MixedDemo => {
                let yaw_rate = 0.2;
                let w = 2.0 * PI * 0.5;

                MotionSample {
                    orientation: Vector3::new(0.05 * (w * t).sin(), 0.0, yaw_rate * t),
                    linear_accel: Vector3::new(0.5 * (w * t).sin(), 0.0, 0.0),
                    accel_frame: AccelFrame::Body,
                    angular_velocity: Vector3::new(0.05 * w * (w * t).cos(), 0.0, yaw_rate),
                }
            }

            Self::HighFreqVibration {
                lin_accel_amp,
                vib_freq,
                pitch_rate,
            } => {
                // Slow pitch oscillation at 0.1 Hz
                let w_p = 2.0 * PI * 0.1;
                let w_v = 2.0 * PI * vib_freq;

                MotionSample {
                    orientation: Vector3::new(0.0, pitch_rate * (w_p * t).sin(), 0.0),
                    linear_accel: Vector3::new(lin_accel_amp * (w_v * t).sin(), 0.0, 0.0),
                    accel_frame: AccelFrame::Body,
                    angular_velocity: Vector3::new(0.0, pitch_rate * w_p * (w_p * t).cos(), 0.0),
                }
            }
        }
    }
}
