//! Boundary extraction from raw skeleton frames and accelerometer samples.
//!
//! Raw records are what the camera and the wearables emit. They are turned
//! here into the `SkeletonWindow` and `DeviceStream` values the engine works on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::camera::CameraModel;
use crate::series::{DeviceStream, PointSeries, SkeletonTrack, SkeletonWindow};
use crate::{Error, Result};

/// Depth value marking a joint the camera could not locate.
pub const INVALID_POINT: f64 = -1.0;

/// One tracked body in one camera frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonRecord {
    #[serde(rename = "joints3D")]
    pub joints_3d: Vec<[f64; 3]>,
    #[serde(default)]
    pub confidences: Vec<f64>,
    #[serde(default)]
    pub joints: Vec<Vec<f64>>,
}

/// One camera frame with every body seen in it, keyed by skeleton id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonFrame {
    pub timestamp: f64,
    pub skeletons: BTreeMap<String, SkeletonRecord>,
}

/// One reading of a wearable accelerometer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccelerationSample {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub timestamp: f64,
}

/// Positions of a single joint for every skeleton across a run of frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointWindow {
    pub timestamps: Vec<f64>,
    /// Skeleton ids in order of first appearance, with their positions.
    pub skeletons: Vec<(String, PointSeries)>,
}

impl PointWindow {
    pub fn get(&self, id: &str) -> Option<&PointSeries> {
        self.skeletons
            .iter()
            .find(|(sk_id, _)| sk_id == id)
            .map(|(_, series)| series)
    }
}

/// Extract one joint from every skeleton of every frame.
///
/// A skeleton is missing in every frame it does not appear in. A record with a
/// joint count other than `total` is corrupted and counts as missing, and a
/// joint whose depth is `INVALID_POINT` is missing on all three coordinates.
pub fn positions_one_point(frames: &[SkeletonFrame], point: usize, total: usize) -> PointWindow {
    let n = frames.len();
    let timestamps: Vec<f64> = frames.iter().map(|f| f.timestamp).collect();
    let mut order: Vec<String> = Vec::new();
    let mut series: BTreeMap<String, PointSeries> = BTreeMap::new();

    for (id_fr, frame) in frames.iter().enumerate() {
        for (id_sk, record) in &frame.skeletons {
            let entry = series.entry(id_sk.clone()).or_insert_with(|| {
                order.push(id_sk.clone());
                PointSeries::missing(n)
            });
            if record.joints_3d.len() != total {
                continue;
            }
            let Some(p) = record.joints_3d.get(point) else {
                continue;
            };
            if p[2] == INVALID_POINT {
                continue;
            }
            entry.x[id_fr] = Some(p[0]);
            entry.y[id_fr] = Some(p[1]);
            entry.z[id_fr] = Some(p[2]);
        }
    }

    tracing::debug!(
        point,
        skeletons = order.len(),
        frames = n,
        "extracted skeleton point positions"
    );

    let skeletons = order
        .into_iter()
        .filter_map(|id| series.remove(&id).map(|s| (id, s)))
        .collect();
    PointWindow {
        timestamps,
        skeletons,
    }
}

/// Build the engine's skeleton window from raw frames.
///
/// The wrist is the primary landmark and the elbow the secondary one.
///
/// # Errors
/// `Error::EmptyWindow` if there are no frames.
pub fn skeleton_window(frames: &[SkeletonFrame], camera: CameraModel) -> Result<SkeletonWindow> {
    if frames.is_empty() {
        return Err(Error::EmptyWindow("no skeleton frames".to_string()));
    }
    let total = camera.total_joints();
    let primary = positions_one_point(frames, camera.primary(), total);
    let mut secondary = positions_one_point(frames, camera.secondary(), total);

    let skeletons = primary
        .skeletons
        .into_iter()
        .map(|(id, primary_series)| {
            let secondary_series = secondary
                .skeletons
                .iter()
                .position(|(sk_id, _)| *sk_id == id)
                .map(|pos| secondary.skeletons.swap_remove(pos).1)
                .unwrap_or_else(|| PointSeries::missing(frames.len()));
            SkeletonTrack::new(id, primary_series, secondary_series)
        })
        .collect();

    SkeletonWindow::new(primary.timestamps, skeletons)
}

/// Group accelerometer samples by device id, in order of first appearance.
pub fn device_streams(samples: &[AccelerationSample]) -> Vec<DeviceStream> {
    let mut devices: Vec<DeviceStream> = Vec::new();
    for sample in samples {
        let device = match devices.iter().position(|d| d.id == sample.id) {
            Some(pos) => &mut devices[pos],
            None => {
                devices.push(DeviceStream {
                    id: sample.id.clone(),
                    ..DeviceStream::default()
                });
                let last = devices.len() - 1;
                &mut devices[last]
            }
        };
        device.timestamps.push(sample.timestamp);
        device.ax.push(sample.x);
        device.ay.push(sample.y);
        device.az.push(sample.z);
    }
    tracing::debug!(devices = devices.len(), "extracted device accelerations");
    devices
}
