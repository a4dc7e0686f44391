//! Elementary rotations and the body-from-world matrix
//!
//! Axes: x forward, y right, z up, so gravity in the world frame is
//! `[0, 0, -g]`. Orientation is parameterised by roll (φ), pitch (θ) and
//! yaw (ψ) with explicit rotation matrices rather than quaternions.

use nalgebra::{Matrix3, Vector3};

/// Rotation about the x-axis
///
/// ```text
/// Rx(φ) = [1   0    0 ]
///         [0  cφ  -sφ ]
///         [0  sφ   cφ ]
/// ```
pub fn rotation_x(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, c, -s,
        0.0, s, c,
    )
}

/// Rotation about the y-axis
///
/// ```text
/// Ry(θ) = [ cθ  0  sθ ]
///         [  0  1   0 ]
///         [-sθ  0  cθ ]
/// ```
pub fn rotation_y(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, 0.0, s,
        0.0, 1.0, 0.0,
        -s, 0.0, c,
    )
}

/// Rotation about the z-axis
pub fn rotation_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, -s, 0.0,
        s, c, 0.0,
        0.0, 0.0, 1.0,
    )
}

/// Body-from-world rotation R_bw = Rx(roll) · Ry(pitch) · Rz(yaw)
///
/// A world-frame vector v_w maps to body coordinates as v_b = R_bw · v_w.
pub fn body_from_world(roll: f64, pitch: f64, yaw: f64) -> Matrix3<f64> {
    rotation_x(roll) * rotation_y(pitch) * rotation_z(yaw)
}

/// Express a world-frame vector in the body frame
pub fn world_to_body(orientation: &Vector3<f64>, v_world: &Vector3<f64>) -> Vector3<f64> {
    body_from_world(orientation.x, orientation.y, orientation.z) * v_world
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity_at_zero() {
        assert_relative_eq!(body_from_world(0.0, 0.0, 0.0), Matrix3::identity(), epsilon = 1e-15);
    }

    #[test]
    fn test_rotation_orthogonal() {
        let r = body_from_world(0.3, -0.7, 1.9);

        // R * R^T = I
        assert_relative_eq!(r * r.transpose(), Matrix3::identity(), epsilon = 1e-12);

        // det(R) = 1
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_composition_order() {
        let (roll, pitch, yaw) = (0.2, -0.4, 0.9);
        let r = body_from_world(roll, pitch, yaw);
        let expected = rotation_x(roll) * rotation_y(pitch) * rotation_z(yaw);
        assert_relative_eq!(r, expected, epsilon = 1e-15);

        // Not commutative: reversed order differs
        let reversed = rotation_z(yaw) * rotation_y(pitch) * rotation_x(roll);
        assert!((r - reversed).norm() > 1e-3);
    }

    #[test]
    fn test_gravity_in_body_frame_under_roll() {
        let g = Vector3::new(0.0, 0.0, -9.81);
        let orientation = Vector3::new(FRAC_PI_2, 0.0, 0.0);

        let g_body = world_to_body(&orientation, &g);

        // Rolled 90 degrees: gravity appears along +y
        assert_relative_eq!(g_body, Vector3::new(0.0, 9.81, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_yaw_does_not_change_gravity() {
        let g = Vector3::new(0.0, 0.0, -9.81);
        let a = world_to_body(&Vector3::new(0.1, 0.2, 0.0), &g);
        let b = world_to_body(&Vector3::new(0.1, 0.2, 2.5), &g);
        assert_relative_eq!(a, b, epsilon = 1e-12);
    }
}
