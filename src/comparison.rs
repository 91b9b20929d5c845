//! Scoring of rotated skeleton accelerations against device accelerations.
//!
//! Two passes share one scoring core. The raw pass compares the forward (u)
//! acceleration of each skeleton with each device's x acceleration. The
//! derivative pass compares their time derivatives. `combine_scores` blends
//! the two, falling back to raw scores for a whole skeleton row whenever the
//! derivative pass could not score the same devices.

use std::collections::HashSet;

use crate::internal::numpy::diff;
use crate::rotation::RotatedWindow;
use crate::series::{valid_indices, DeviceStream, Samples};
use crate::similarity::{curve, curve_from_samples, Curve, SimilarityMeasure};

/// Scores of one skeleton against the devices of a pass, in device order.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonScores {
    pub skeleton_id: String,
    pub scores: Vec<(String, f64)>,
}

impl SkeletonScores {
    /// Score against a device, if that device was scored.
    pub fn get(&self, device_id: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|(id, _)| id == device_id)
            .map(|(_, score)| *score)
    }
}

struct DeviceCurve<'a> {
    id: &'a str,
    curve: Curve,
}

/// Score every skeleton curve against every device curve.
///
/// Skeletons without any valid sample are not scored. An empty device curve
/// scores NaN.
fn score<M: SimilarityMeasure + ?Sized>(
    timestamps: &[f64],
    skeletons: &[(&str, &Samples)],
    devices: &[DeviceCurve<'_>],
    measure: &M,
) -> Vec<SkeletonScores> {
    skeletons
        .iter()
        .filter_map(|(skeleton_id, samples)| {
            let skeleton_curve = curve_from_samples(timestamps, samples);
            if skeleton_curve.is_empty() {
                tracing::debug!(
                    skeleton_id = %skeleton_id,
                    "no valid forward acceleration, skeleton not scored"
                );
                return None;
            }
            let scores = devices
                .iter()
                .map(|device| {
                    let d = if device.curve.is_empty() {
                        f64::NAN
                    } else {
                        measure.distance(&skeleton_curve, &device.curve)
                    };
                    (device.id.to_string(), d)
                })
                .collect();
            Some(SkeletonScores {
                skeleton_id: skeleton_id.to_string(),
                scores,
            })
        })
        .collect()
}

/// Compare forward skeleton accelerations with device x accelerations.
pub fn compare_accel<M: SimilarityMeasure + ?Sized>(
    rotated: &RotatedWindow,
    devices: &[DeviceStream],
    measure: &M,
) -> Vec<SkeletonScores> {
    let skeletons: Vec<(&str, &Samples)> = rotated
        .skeletons
        .iter()
        .map(|s| (s.id.as_str(), &s.au))
        .collect();
    let device_curves: Vec<DeviceCurve<'_>> = devices
        .iter()
        .map(|d| DeviceCurve {
            id: &d.id,
            curve: curve(&d.timestamps, &d.ax),
        })
        .collect();
    score(&rotated.timestamps, &skeletons, &device_curves, measure)
}

/// Time derivative of a channel over its valid samples.
///
/// The quotient between consecutive valid samples `k` and `k + 1` is stored at
/// the position of `k`. The result is one sample shorter than the input.
pub fn samples_derivative(timestamps: &[f64], samples: &[Option<f64>]) -> Samples {
    let mut out = vec![None; samples.len().saturating_sub(1)];
    let valid = valid_indices(samples);
    for pair in valid.windows(2) {
        let (k, next) = (pair[0], pair[1]);
        if let (Some(a), Some(b), Some(t0), Some(t1)) =
            (samples[k], samples[next], timestamps.get(k), timestamps.get(next))
        {
            let q = (b - a) / (t1 - t0);
            if q.is_finite() {
                out[k] = Some(q);
            }
        }
    }
    out
}

/// Compare the time derivatives of forward skeleton accelerations and device x accelerations.
///
/// Devices with a repeated timestamp cannot be differentiated and are left out
/// of this pass entirely.
pub fn compare_accel_der<M: SimilarityMeasure + ?Sized>(
    rotated: &RotatedWindow,
    devices: &[DeviceStream],
    measure: &M,
) -> Vec<SkeletonScores> {
    let derivatives: Vec<(&str, Samples)> = rotated
        .skeletons
        .iter()
        .map(|s| (s.id.as_str(), samples_derivative(&rotated.timestamps, &s.au)))
        .collect();
    let skeletons: Vec<(&str, &Samples)> = derivatives.iter().map(|(id, d)| (*id, d)).collect();

    let mut device_curves = Vec::with_capacity(devices.len());
    for device in devices {
        if device.has_duplicate_timestamps() {
            tracing::warn!(
                device_id = %device.id,
                "device stream contains equal timestamps, removed from derivative comparison"
            );
            continue;
        }
        let dt = diff(&device.timestamps);
        let derivative: Vec<f64> = diff(&device.ax)
            .iter()
            .zip(&dt)
            .map(|(da, dt)| da / dt)
            .collect();
        let t = &device.timestamps[..device.timestamps.len().saturating_sub(1)];
        device_curves.push(DeviceCurve {
            id: &device.id,
            curve: curve(t, &derivative),
        });
    }

    let timestamps = &rotated.timestamps[..rotated.timestamps.len().saturating_sub(1)];
    score(timestamps, &skeletons, &device_curves, measure)
}

/// Blend raw and derivative scores, row by row.
///
/// A row is blended as `weight * raw + (1 - weight) * derivative` when the
/// derivative pass scored the same devices as the raw pass and every finite
/// raw score has a finite derivative score. Otherwise the row keeps its raw
/// scores for every device.
pub fn combine_scores(
    raw: &[SkeletonScores],
    derivative: &[SkeletonScores],
    weight: f64,
) -> Vec<SkeletonScores> {
    raw.iter()
        .map(|raw_row| {
            let der_row = derivative
                .iter()
                .find(|d| d.skeleton_id == raw_row.skeleton_id);
            let blendable = der_row.is_some_and(|der_row| {
                let ids = |row: &SkeletonScores| -> HashSet<String> {
                    row.scores.iter().map(|(id, _)| id.clone()).collect()
                };
                let (raw_ids, der_ids) = (ids(raw_row), ids(der_row));
                raw_ids == der_ids
                    && raw_row.scores.iter().all(|(id, r)| {
                        !r.is_finite() || der_row.get(id).is_some_and(f64::is_finite)
                    })
            });

            match der_row {
                Some(der_row) if blendable => SkeletonScores {
                    skeleton_id: raw_row.skeleton_id.clone(),
                    scores: raw_row
                        .scores
                        .iter()
                        .map(|(id, r)| {
                            let d = der_row.get(id).unwrap_or(f64::NAN);
                            (id.clone(), weight * r + (1.0 - weight) * d)
                        })
                        .collect(),
                },
                _ => {
                    tracing::debug!(
                        skeleton_id = %raw_row.skeleton_id,
                        "derivative scores incomplete, using raw scores only"
                    );
                    raw_row.clone()
                }
            }
        })
        .collect()
}
