//! Gravity compensation for the camera tilt.
//!
//! Position-derived accelerations carry no gravity, device accelerations do.
//! Adding the gravity vector seen by a camera tilted by `angle` degrees about
//! its horizontal axis makes the two comparable.

use nalgebra::{Matrix3, Vector3};

use crate::conversion::{AccelerationWindow, SkeletonAcceleration};
use crate::series::Samples;

/// Standard gravity (m/s^2).
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Rotation matrix for a counterclockwise rotation of `theta` radians about `axis`.
///
/// The axis does not need to be normalized.
pub fn rotation_matrix(axis: &Vector3<f64>, theta: f64) -> Matrix3<f64> {
    let axis = axis.normalize();
    let a = (theta / 2.0).cos();
    let s = (theta / 2.0).sin();
    let (b, c, d) = (-axis.x * s, -axis.y * s, -axis.z * s);
    let (aa, bb, cc, dd) = (a * a, b * b, c * c, d * d);
    let (bc, ad, ac, ab, bd, cd) = (b * c, a * d, a * c, a * b, b * d, c * d);
    Matrix3::new(
        aa + bb - cc - dd, 2.0 * (bc + ad), 2.0 * (bd - ac),
        2.0 * (bc - ad), aa + cc - bb - dd, 2.0 * (cd + ab),
        2.0 * (bd + ac), 2.0 * (cd - ab), aa + dd - bb - cc,
    )
}

/// Gravity in camera coordinates for a tilt of `angle` degrees.
pub fn gravity_vector(angle: f64) -> Vector3<f64> {
    let g = Vector3::new(0.0, -STANDARD_GRAVITY, 0.0);
    rotation_matrix(&Vector3::x(), angle.to_radians()) * g
}

fn shifted(samples: &Samples, offset: f64) -> Samples {
    samples.iter().map(|s| s.map(|v| v + offset)).collect()
}

/// Add the tilted gravity vector to every skeleton acceleration sample.
pub fn add_gravity(accelerations: &AccelerationWindow, angle: f64) -> AccelerationWindow {
    let g = gravity_vector(angle);
    tracing::debug!(
        angle,
        gx = g.x,
        gy = g.y,
        gz = g.z,
        "adding gravity to skeleton accelerations"
    );
    AccelerationWindow {
        timestamps: accelerations.timestamps.clone(),
        skeletons: accelerations
            .skeletons
            .iter()
            .map(|s| SkeletonAcceleration {
                id: s.id.clone(),
                ax: shifted(&s.ax, g.x),
                ay: shifted(&s.ay, g.y),
                az: shifted(&s.az, g.z),
            })
            .collect(),
    }
}
