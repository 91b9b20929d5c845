//! Per-window time series: skeleton landmarks and device accelerations.
//!
//! Missing samples are explicit `None` values. Every channel of a skeleton
//! shares the timestamp axis of its `SkeletonWindow`; devices carry their own.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::internal::numpy::interp;
use crate::{Error, Result};

/// One channel of samples, `None` where the sample is missing.
pub type Samples = Vec<Option<f64>>;

/// Indices of the non-missing samples.
pub fn valid_indices(samples: &[Option<f64>]) -> Vec<usize> {
    samples
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.map(|_| i))
        .collect()
}

/// First and last index holding a valid sample.
pub fn valid_span(samples: &[Option<f64>]) -> Option<(usize, usize)> {
    let first = samples.iter().position(Option::is_some)?;
    let last = samples.iter().rposition(Option::is_some)?;
    Some((first, last))
}

/// Values of the non-missing samples, in order.
pub fn valid_values(samples: &[Option<f64>]) -> Vec<f64> {
    samples.iter().flatten().copied().collect()
}

/// Wrap dense values as a channel with no missing samples.
pub fn dense(values: &[f64]) -> Samples {
    values.iter().copied().map(Some).collect()
}

/// Fill every gap by linear interpolation over the sample index.
///
/// Leading and trailing gaps take the nearest valid value.
///
/// # Errors
/// `Error::Interpolation` if the channel has no valid sample at all.
pub fn interpolate_gaps(samples: &[Option<f64>]) -> Result<Vec<f64>> {
    let valid = valid_indices(samples);
    let xp: Vec<f64> = valid.iter().map(|&i| i as f64).collect();
    let fp: Vec<f64> = valid_values(samples);
    let x: Vec<f64> = (0..samples.len()).map(|i| i as f64).collect();
    interp(&x, &xp, &fp)
}

/// 3D positions of one landmark over a window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSeries {
    pub x: Samples,
    pub y: Samples,
    pub z: Samples,
}

impl PointSeries {
    /// Create a point series, checking that the three channels have one length.
    pub fn new(x: Samples, y: Samples, z: Samples) -> Result<Self> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(Error::InvalidSeries {
                expected: "three channels of equal length".to_string(),
                got: format!("lengths ({}, {}, {})", x.len(), y.len(), z.len()),
            });
        }
        Ok(Self { x, y, z })
    }

    /// A series of `len` missing points.
    pub fn missing(len: usize) -> Self {
        Self {
            x: vec![None; len],
            y: vec![None; len],
            z: vec![None; len],
        }
    }

    /// Build a series with no missing sample from a list of points.
    pub fn from_points(points: &[[f64; 3]]) -> Self {
        Self {
            x: points.iter().map(|p| Some(p[0])).collect(),
            y: points.iter().map(|p| Some(p[1])).collect(),
            z: points.iter().map(|p| Some(p[2])).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// The x, y and z channels in order.
    pub fn channels(&self) -> [&Samples; 3] {
        [&self.x, &self.y, &self.z]
    }

    /// The point at frame `i`, if all three coordinates are present.
    pub fn point(&self, i: usize) -> Option<Vector3<f64>> {
        let x = (*self.x.get(i)?)?;
        let y = (*self.y.get(i)?)?;
        let z = (*self.z.get(i)?)?;
        Some(Vector3::new(x, y, z))
    }
}

/// A tracked body with its two forearm landmarks.
///
/// The primary landmark defines the skeleton's valid span and is the one whose
/// acceleration is compared with the devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonTrack {
    pub id: String,
    pub primary: PointSeries,
    pub secondary: PointSeries,
}

impl SkeletonTrack {
    pub fn new(id: impl Into<String>, primary: PointSeries, secondary: PointSeries) -> Self {
        Self {
            id: id.into(),
            primary,
            secondary,
        }
    }

    /// First and last timestamp with a valid primary sample.
    pub fn valid_span(&self, timestamps: &[f64]) -> Option<(f64, f64)> {
        let (first, last) = valid_span(&self.primary.x)?;
        Some((*timestamps.get(first)?, *timestamps.get(last)?))
    }

    /// Length in seconds of the valid span.
    pub fn duration(&self, timestamps: &[f64]) -> Option<f64> {
        self.valid_span(timestamps).map(|(first, last)| last - first)
    }
}

/// All skeletons seen in one window, on a shared timestamp axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonWindow {
    pub timestamps: Vec<f64>,
    pub skeletons: Vec<SkeletonTrack>,
}

impl SkeletonWindow {
    /// Create a window, checking every landmark series against the timestamp axis.
    pub fn new(timestamps: Vec<f64>, skeletons: Vec<SkeletonTrack>) -> Result<Self> {
        for skeleton in &skeletons {
            for series in [&skeleton.primary, &skeleton.secondary] {
                if series.len() != timestamps.len()
                    || series.y.len() != timestamps.len()
                    || series.z.len() != timestamps.len()
                {
                    return Err(Error::InvalidSeries {
                        expected: format!(
                            "{} samples for skeleton {}",
                            timestamps.len(),
                            skeleton.id
                        ),
                        got: format!(
                            "({}, {}, {})",
                            series.x.len(),
                            series.y.len(),
                            series.z.len()
                        ),
                    });
                }
            }
        }
        Ok(Self {
            timestamps,
            skeletons,
        })
    }

    /// Look up a skeleton by id.
    pub fn get(&self, id: &str) -> Option<&SkeletonTrack> {
        self.skeletons.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.skeletons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skeletons.is_empty()
    }
}

/// Acceleration stream of one wearable device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceStream {
    pub id: String,
    pub timestamps: Vec<f64>,
    pub ax: Vec<f64>,
    pub ay: Vec<f64>,
    pub az: Vec<f64>,
}

impl DeviceStream {
    /// Create a device stream, checking that every channel matches the timestamps.
    pub fn new(
        id: impl Into<String>,
        timestamps: Vec<f64>,
        ax: Vec<f64>,
        ay: Vec<f64>,
        az: Vec<f64>,
    ) -> Result<Self> {
        let id = id.into();
        let n = timestamps.len();
        if ax.len() != n || ay.len() != n || az.len() != n {
            return Err(Error::InvalidSeries {
                expected: format!("{} samples for device {}", n, id),
                got: format!("({}, {}, {})", ax.len(), ay.len(), az.len()),
            });
        }
        Ok(Self {
            id,
            timestamps,
            ax,
            ay,
            az,
        })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// True if two consecutive samples share a timestamp.
    pub fn has_duplicate_timestamps(&self) -> bool {
        self.timestamps.windows(2).any(|w| w[1] == w[0])
    }
}
