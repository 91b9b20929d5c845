//! Position to acceleration conversion.
//!
//! Positions are differentiated twice, smoothing the valid samples after each
//! step. Every differentiation costs one sample, so accelerations live on the
//! window's timestamps without the last two.

use nalgebra::Vector3;

use crate::series::{Samples, SkeletonTrack, SkeletonWindow};
use crate::smoothing::Smoother;
use crate::{Error, Result};

/// Global-frame acceleration of one skeleton's primary landmark.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonAcceleration {
    pub id: String,
    pub ax: Samples,
    pub ay: Samples,
    pub az: Samples,
}

impl SkeletonAcceleration {
    pub fn len(&self) -> usize {
        self.ax.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ax.is_empty()
    }

    /// Acceleration at frame `i`, if all three components are present.
    pub fn frame(&self, i: usize) -> Option<Vector3<f64>> {
        let x = (*self.ax.get(i)?)?;
        let y = (*self.ay.get(i)?)?;
        let z = (*self.az.get(i)?)?;
        Some(Vector3::new(x, y, z))
    }
}

/// Accelerations of every skeleton in a window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccelerationWindow {
    /// Window timestamps without the last two.
    pub timestamps: Vec<f64>,
    pub skeletons: Vec<SkeletonAcceleration>,
}

impl AccelerationWindow {
    pub fn get(&self, id: &str) -> Option<&SkeletonAcceleration> {
        self.skeletons.iter().find(|s| s.id == id)
    }
}

/// Finite difference quotient over consecutive samples, missing where either end is.
fn difference_quotient(t: &[f64], values: &[Option<f64>]) -> Samples {
    values
        .windows(2)
        .zip(t.windows(2))
        .map(|(v, dt)| {
            let q = (v[1]? - v[0]?) / (dt[1] - dt[0]);
            q.is_finite().then_some(q)
        })
        .collect()
}

/// Smoothed velocity of one position channel, one sample shorter than the input.
///
/// # Errors
/// `Error::InvalidSeries` on a length mismatch, or the smoother's error if there
/// are too few valid velocity samples for its window.
pub fn velocity_from_position<S: Smoother + ?Sized>(
    t: &[f64],
    pos: &[Option<f64>],
    smoother: &S,
) -> Result<Samples> {
    if t.len() != pos.len() {
        return Err(Error::InvalidSeries {
            expected: format!("{} positions", t.len()),
            got: format!("{} positions", pos.len()),
        });
    }
    smoother.smooth_valid(&difference_quotient(t, pos))
}

/// Smoothed acceleration of one position channel, two samples shorter than the input.
pub fn acceleration_from_position<S: Smoother + ?Sized>(
    t: &[f64],
    pos: &[Option<f64>],
    smoother: &S,
) -> Result<Samples> {
    let vel = velocity_from_position(t, pos, smoother)?;
    // Velocity sample i spans t[i]..t[i + 1], so the second quotient uses dt[:-1]
    smoother.smooth_valid(&difference_quotient(t, &vel))
}

fn convert_skeleton<S: Smoother + ?Sized>(
    t: &[f64],
    skeleton: &SkeletonTrack,
    smoother: &S,
) -> Result<SkeletonAcceleration> {
    let primary = &skeleton.primary;
    Ok(SkeletonAcceleration {
        id: skeleton.id.clone(),
        ax: acceleration_from_position(t, &primary.x, smoother)?,
        ay: acceleration_from_position(t, &primary.y, smoother)?,
        az: acceleration_from_position(t, &primary.z, smoother)?,
    })
}

/// Acceleration of the primary landmark of every skeleton.
///
/// A skeleton needs more samples than the smoothing window; shorter ones, and
/// ones whose smoothing fails, contribute no acceleration.
pub fn point_accelerations<S: Smoother + ?Sized>(
    window: &SkeletonWindow,
    smoother: &S,
) -> AccelerationWindow {
    let t = &window.timestamps;
    let mut skeletons = Vec::with_capacity(window.skeletons.len());

    for skeleton in &window.skeletons {
        if skeleton.primary.len() <= smoother.window() {
            tracing::debug!(
                skeleton_id = %skeleton.id,
                samples = skeleton.primary.len(),
                window = smoother.window(),
                "too few samples for conversion, skeleton has no acceleration"
            );
            continue;
        }
        match convert_skeleton(t, skeleton, smoother) {
            Ok(acceleration) => skeletons.push(acceleration),
            Err(e) => {
                tracing::warn!(
                    skeleton_id = %skeleton.id,
                    error = %e,
                    "acceleration conversion failed, skeleton dropped"
                );
            }
        }
    }

    AccelerationWindow {
        timestamps: t[..t.len().saturating_sub(2)].to_vec(),
        skeletons,
    }
}
