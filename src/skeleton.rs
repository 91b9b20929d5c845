//! Skeleton preprocessing and forearm direction estimation.
//!
//! Skeletons are filtered on duration, their two landmarks are reconciled
//! onto one valid span, and the landmark offset gives a per-frame direction.
//! A skeleton that cannot go through a step is dropped; the rest of the
//! window carries on without it.

use nalgebra::Vector3;

use crate::series::{
    interpolate_gaps, valid_span, PointSeries, Samples, SkeletonTrack, SkeletonWindow,
};
use crate::smoothing::{smooth_points, Smoother};
use crate::{Error, Result};

/// Which landmark of a skeleton to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landmark {
    Primary,
    Secondary,
}

impl Landmark {
    fn of<'a>(&self, skeleton: &'a SkeletonTrack) -> &'a PointSeries {
        match self {
            Landmark::Primary => &skeleton.primary,
            Landmark::Secondary => &skeleton.secondary,
        }
    }
}

/// Per-frame forearm direction of one skeleton.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonDirections {
    pub id: String,
    /// One entry per window frame, `None` where either landmark is missing.
    pub frames: Vec<Option<Vector3<f64>>>,
}

/// Remove skeletons that are never seen, or seen for less than `min_duration` seconds.
///
/// Duration is measured on the x channel of the given landmark.
pub fn filter_skeletons(
    window: &SkeletonWindow,
    landmark: Landmark,
    min_duration: f64,
) -> SkeletonWindow {
    let (kept, removed): (Vec<&SkeletonTrack>, Vec<&SkeletonTrack>) =
        window.skeletons.iter().partition(|skeleton| {
            let series = landmark.of(skeleton);
            let span = valid_span(&series.x).and_then(|(first, last)| {
                Some(*window.timestamps.get(last)? - *window.timestamps.get(first)?)
            });
            matches!(span, Some(duration) if duration >= min_duration)
        });

    for skeleton in &removed {
        tracing::debug!(skeleton_id = %skeleton.id, ?landmark, "skeleton removed, too short");
    }
    tracing::info!(
        removed = removed.len(),
        kept = kept.len(),
        min_duration,
        "filtered skeletons on duration"
    );

    SkeletonWindow {
        timestamps: window.timestamps.clone(),
        skeletons: kept.into_iter().cloned().collect(),
    }
}

/// Bring primary and secondary landmarks onto the primary's valid span.
///
/// Inside the span every channel is gap-filled and smoothed; outside it every
/// sample is missing. Skeletons that cannot be reconciled are dropped.
pub fn post_process_pair<S: Smoother + ?Sized>(
    window: &SkeletonWindow,
    smoother: &S,
) -> SkeletonWindow {
    let mut skeletons = Vec::with_capacity(window.skeletons.len());
    let mut removed = 0usize;
    for skeleton in &window.skeletons {
        match reconcile(skeleton, smoother) {
            Ok(reconciled) => skeletons.push(reconciled),
            Err(e) => {
                removed += 1;
                tracing::debug!(
                    skeleton_id = %skeleton.id,
                    error = %e,
                    "skeleton removed, landmarks not reconcilable"
                );
            }
        }
    }
    tracing::info!(removed, kept = skeletons.len(), "reconciled landmark pairs");

    SkeletonWindow {
        timestamps: window.timestamps.clone(),
        skeletons,
    }
}

fn reconcile<S: Smoother + ?Sized>(
    skeleton: &SkeletonTrack,
    smoother: &S,
) -> Result<SkeletonTrack> {
    let (first, last) = valid_span(&skeleton.primary.x)
        .ok_or_else(|| Error::Interpolation("primary landmark has no valid sample".to_string()))?;
    Ok(SkeletonTrack {
        id: skeleton.id.clone(),
        primary: reconcile_series(&skeleton.primary, first, last, smoother)?,
        secondary: reconcile_series(&skeleton.secondary, first, last, smoother)?,
    })
}

fn reconcile_series<S: Smoother + ?Sized>(
    series: &PointSeries,
    first: usize,
    last: usize,
    smoother: &S,
) -> Result<PointSeries> {
    let channel = |samples: &Samples| -> Result<Samples> {
        let filled = interpolate_gaps(&samples[first..=last])?;
        let smoothed = smoother.smooth(&filled)?;
        let mut out = vec![None; samples.len()];
        for (k, v) in smoothed.into_iter().enumerate() {
            out[first + k] = Some(v);
        }
        Ok(out)
    };
    Ok(PointSeries {
        x: channel(&series.x)?,
        y: channel(&series.y)?,
        z: channel(&series.z)?,
    })
}

/// Smoothed secondary-minus-primary offset of one skeleton, frame by frame.
pub fn direction_frames<S: Smoother + ?Sized>(
    skeleton: &SkeletonTrack,
    smoother: &S,
) -> Result<Vec<Option<Vector3<f64>>>> {
    // Elbow minus wrist: u points from the wrist up the forearm. Do not flip.
    let offset = |secondary: &Samples, primary: &Samples| -> Samples {
        secondary
            .iter()
            .zip(primary)
            .map(|(s, p)| Some((*s)? - (*p)?))
            .collect()
    };
    let (primary, secondary) = (&skeleton.primary, &skeleton.secondary);
    let offsets = PointSeries {
        x: offset(&secondary.x, &primary.x),
        y: offset(&secondary.y, &primary.y),
        z: offset(&secondary.z, &primary.z),
    };
    let smoothed = smooth_points(&offsets, smoother)?;

    Ok((0..smoothed.len()).map(|i| smoothed.point(i)).collect())
}

/// Compute directions for every skeleton of a window.
///
/// Returns the window without the skeletons whose direction could not be
/// computed, together with the directions of the ones kept.
pub fn directions<S: Smoother + ?Sized>(
    window: &SkeletonWindow,
    smoother: &S,
) -> (SkeletonWindow, Vec<SkeletonDirections>) {
    let mut skeletons = Vec::with_capacity(window.skeletons.len());
    let mut all_directions = Vec::with_capacity(window.skeletons.len());
    for skeleton in &window.skeletons {
        match direction_frames(skeleton, smoother) {
            Ok(frames) => {
                all_directions.push(SkeletonDirections {
                    id: skeleton.id.clone(),
                    frames,
                });
                skeletons.push(skeleton.clone());
            }
            Err(e) => {
                tracing::debug!(
                    skeleton_id = %skeleton.id,
                    error = %e,
                    "skeleton removed, direction not computable"
                );
            }
        }
    }
    tracing::info!(
        removed = window.skeletons.len() - skeletons.len(),
        kept = skeletons.len(),
        "directions computed"
    );

    (
        SkeletonWindow {
            timestamps: window.timestamps.clone(),
            skeletons,
        },
        all_directions,
    )
}
