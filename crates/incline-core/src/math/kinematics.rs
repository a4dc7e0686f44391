//! Euler-angle rate kinematics
//!
//! Maps body angular velocity ω = [wx, wy, wz] to roll/pitch/yaw rates:
//!
//! ```text
//! φ̇ = wx + wy·sφ·tθ + wz·cφ·tθ
//! θ̇ = wy·cφ − wz·sφ
//! ψ̇ = (wy·sφ + wz·cφ) / cθ
//! ```
//!
//! The map is singular at θ = ±π/2, so the pitch fed to the trig terms
//! goes through [`guard_pitch`] first.

use std::f64::consts::FRAC_PI_2;

use nalgebra::Vector3;

/// Distance from ±π/2 inside which pitch is clamped for trig evaluation [rad]
pub const GIMBAL_EPS: f64 = 1e-6;

/// Floor on cos(pitch) in the yaw rate denominator
const MIN_COS_PITCH: f64 = 1e-6;

/// Clamp pitch away from gimbal lock
///
/// Within [`GIMBAL_EPS`] of ±π/2 returns `sign(pitch)·(π/2 − GIMBAL_EPS)`,
/// otherwise returns `pitch` unchanged. Only ever applied to a working copy.
pub fn guard_pitch(pitch: f64) -> f64 {
    if (pitch.abs() - FRAC_PI_2).abs() <= GIMBAL_EPS {
        let clamped = pitch.signum() * (FRAC_PI_2 - GIMBAL_EPS);
        log::trace!("pitch {pitch} within gimbal guard, using {clamped}");
        clamped
    } else {
        pitch
    }
}

/// Roll and pitch rates for the given attitude and body rates
///
/// `pitch` is used as given; callers pass a guarded copy.
pub fn roll_pitch_rates(roll: f64, pitch: f64, omega: &Vector3<f64>) -> (f64, f64) {
    let (sr, cr) = roll.sin_cos();
    let tp = pitch.tan();

    let roll_dot = omega.x + omega.y * sr * tp + omega.z * cr * tp;
    let pitch_dot = omega.y * cr - omega.z * sr;

    (roll_dot, pitch_dot)
}

/// Full Euler-angle rates [φ̇, θ̇, ψ̇] with the gimbal guard applied
pub fn euler_rates(orientation: &Vector3<f64>, omega: &Vector3<f64>) -> Vector3<f64> {
    let roll = orientation.x;
    let pitch = guard_pitch(orientation.y);

    let (roll_dot, pitch_dot) = roll_pitch_rates(roll, pitch, omega);

    let (sr, cr) = roll.sin_cos();
    let yaw_dot = (omega.y * sr + omega.z * cr) / pitch.cos().max(MIN_COS_PITCH);

    Vector3::new(roll_dot, pitch_dot, yaw_dot)
}
