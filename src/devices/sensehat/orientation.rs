//! Orientation from gravity and the magnetic field
//!
//! Pitch and roll come from the accelerometer; yaw is the tilt-compensated
//! compass heading. All angles in degrees, normalised to [0, 360).

use crate::core::types::{Orientation, Vector3};

pub fn orientation(accel: Vector3, mag: Vector3) -> Orientation {
    let roll = accel.y.atan2(accel.z);
    let pitch = (-accel.x).atan2((accel.y * accel.y + accel.z * accel.z).sqrt());

    let (sin_r, cos_r) = roll.sin_cos();
    let (sin_p, cos_p) = pitch.sin_cos();
    let mx = mag.x * cos_p + mag.z * sin_p;
    let my = mag.x * sin_r * sin_p + mag.y * cos_r - mag.z * sin_r * cos_p;
    let yaw = (-my).atan2(mx);

    Orientation {
        pitch: normalize_degrees(pitch.to_degrees()),
        roll: normalize_degrees(roll.to_degrees()),
        yaw: normalize_degrees(yaw.to_degrees()),
    }
}

/// Map any angle into [0, 360)
pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    // Tiny negatives round up to exactly 360; -0.0 stays negative
    if d >= 360.0 { 0.0 } else { d + 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: Vector3 = Vector3::new(0.0, 0.0, 1.0);

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_level_facing_north() {
        let o = orientation(LEVEL, Vector3::new(22.0, 0.0, -42.0));
        assert!(close(o.pitch, 0.0));
        assert!(close(o.roll, 0.0));
        assert!(close(o.yaw, 0.0));
        assert!(o.yaw.is_sign_positive());
    }

    #[test]
    fn test_level_heading() {
        let o = orientation(LEVEL, Vector3::new(0.0, -22.0, -42.0));
        assert!(close(o.yaw, 90.0));
        let o = orientation(LEVEL, Vector3::new(0.0, 22.0, -42.0));
        assert!(close(o.yaw, 270.0));
    }

    #[test]
    fn test_roll_and_pitch() {
        // Rolled 90 degrees onto its side
        let o = orientation(Vector3::new(0.0, 1.0, 0.0), Vector3::new(22.0, 0.0, 0.0));
        assert!(close(o.roll, 90.0));
        // Nose down: -x sees gravity
        let o = orientation(Vector3::new(-1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 22.0));
        assert!(close(o.pitch, 90.0));
        // Nose up wraps to the top of the range
        let o = orientation(Vector3::new(0.5, 0.0, 0.866), Vector3::new(22.0, 0.0, 0.0));
        assert!((o.pitch - 330.0).abs() < 0.01);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert_eq!(normalize_degrees(-1e-20), 0.0);
        assert!(normalize_degrees(-0.0).is_sign_positive());
    }
}
