//! Rotation of skeleton accelerations into the forearm frame.
//!
//! For every frame the camera x axis is rotated onto the forearm direction,
//! giving a local basis (u, v, w) with u along the forearm. Projecting the
//! global acceleration on that basis makes "forward" acceleration comparable
//! with the device's own x axis, whatever the body's orientation.

use nalgebra::{Matrix3, Vector3};

use crate::conversion::AccelerationWindow;
use crate::series::Samples;
use crate::skeleton::SkeletonDirections;

/// Local axes of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFrame {
    pub u: Vector3<f64>,
    pub v: Vector3<f64>,
    pub w: Vector3<f64>,
}

/// Accelerations of one skeleton expressed in its local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RotatedSkeleton {
    pub id: String,
    /// Local basis for every direction frame.
    pub basis: Vec<Option<BodyFrame>>,
    pub au: Samples,
    pub av: Samples,
    pub aw: Samples,
}

/// Rotated accelerations of every skeleton, on the acceleration timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RotatedWindow {
    pub timestamps: Vec<f64>,
    pub skeletons: Vec<RotatedSkeleton>,
}

impl RotatedWindow {
    pub fn get(&self, id: &str) -> Option<&RotatedSkeleton> {
        self.skeletons.iter().find(|s| s.id == id)
    }
}

/// Rotation matrix of the unit quaternion `(q0, q1, q2, q3)`, scalar first.
pub fn quaternion_matrix(q0: f64, q1: f64, q2: f64, q3: f64) -> Matrix3<f64> {
    Matrix3::new(
        q0 * q0 + q1 * q1 - q2 * q2 - q3 * q3,
        2.0 * (q1 * q2 - q0 * q3),
        2.0 * (q1 * q3 + q0 * q2),
        2.0 * (q2 * q1 + q0 * q3),
        q0 * q0 - q1 * q1 + q2 * q2 - q3 * q3,
        2.0 * (q2 * q3 - q0 * q1),
        2.0 * (q3 * q1 - q0 * q2),
        2.0 * (q3 * q2 + q0 * q1),
        q0 * q0 - q1 * q1 - q2 * q2 + q3 * q3,
    )
}

/// Local basis whose u axis points along `direction`.
///
/// Returns `None` for a (near) zero direction. When the direction is parallel
/// to the camera x axis the rotation axis is taken as z.
pub fn body_frame(direction: &Vector3<f64>) -> Option<BodyFrame> {
    let magnitude = direction.norm();
    if !magnitude.is_finite() || magnitude < f64::EPSILON {
        return None;
    }
    let d = direction / magnitude;
    let reference = Vector3::x();

    let angle = reference.dot(&d).clamp(-1.0, 1.0).acos();
    let b = reference.cross(&d);
    let b_magnitude = b.norm();
    let axis = if b_magnitude < f64::EPSILON {
        Vector3::z()
    } else {
        b / b_magnitude
    };

    let (s, c) = (angle / 2.0).sin_cos();
    let r = quaternion_matrix(c, s * axis.x, s * axis.y, s * axis.z);
    Some(BodyFrame {
        u: r.column(0).into_owned(),
        v: r.column(1).into_owned(),
        w: r.column(2).into_owned(),
    })
}

/// Project every skeleton's acceleration onto its local frame.
///
/// The basis covers every direction frame while the acceleration is two frames
/// shorter; acceleration frame `i` uses basis frame `i`. Skeletons with a
/// direction but no acceleration are dropped.
pub fn rotate_accelerations(
    accelerations: &AccelerationWindow,
    directions: &[SkeletonDirections],
) -> RotatedWindow {
    let mut skeletons = Vec::with_capacity(directions.len());

    for skeleton_dirs in directions {
        let Some(acc) = accelerations.get(&skeleton_dirs.id) else {
            tracing::debug!(
                skeleton_id = %skeleton_dirs.id,
                "no acceleration for skeleton, dropped from rotation"
            );
            continue;
        };

        let basis: Vec<Option<BodyFrame>> = skeleton_dirs
            .frames
            .iter()
            .map(|d| d.as_ref().and_then(body_frame))
            .collect();

        let n = acc.len();
        let mut au = vec![None; n];
        let mut av = vec![None; n];
        let mut aw = vec![None; n];
        for i in 0..n {
            let (Some(a), Some(Some(frame))) = (acc.frame(i), basis.get(i)) else {
                continue;
            };
            au[i] = Some(a.dot(&frame.u));
            av[i] = Some(a.dot(&frame.v));
            aw[i] = Some(a.dot(&frame.w));
        }

        skeletons.push(RotatedSkeleton {
            id: skeleton_dirs.id.clone(),
            basis,
            au,
            av,
            aw,
        });
    }

    tracing::debug!(skeletons = skeletons.len(), "skeleton accelerations rotated");
    RotatedWindow {
        timestamps: accelerations.timestamps.clone(),
        skeletons,
    }
}
