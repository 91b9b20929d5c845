//! Signal smoothing for landmark and acceleration series.
//!
//! This module provides the smoothers used throughout the pipeline:
//! - `SavgolSmoother` - Savitzky-Golay polynomial fit
//! - `WienerSmoother` - Local-statistics Wiener filter
//!
//! `SmoothFilter` names a kind and builds a `SmootherEnum` for static dispatch.

mod traits;
mod savgol;
mod wiener;
mod dispatch;

pub use traits::Smoother;
pub use savgol::SavgolSmoother;
pub use wiener::WienerSmoother;
pub use dispatch::{SmoothFilter, SmootherEnum};

use crate::series::{DeviceStream, PointSeries};
use crate::Result;

/// Smooth the three channels of a point series over their valid samples.
pub fn smooth_points<S: Smoother + ?Sized>(
    series: &PointSeries,
    smoother: &S,
) -> Result<PointSeries> {
    Ok(PointSeries {
        x: smoother.smooth_valid(&series.x)?,
        y: smoother.smooth_valid(&series.y)?,
        z: smoother.smooth_valid(&series.z)?,
    })
}

/// Smooth the acceleration channels of every device.
///
/// A device with fewer samples than the smoothing window, or whose smoothing
/// fails, is kept unsmoothed.
pub fn smooth_device_accelerations<S: Smoother + ?Sized>(
    devices: &[DeviceStream],
    smoother: &S,
) -> Vec<DeviceStream> {
    devices
        .iter()
        .map(|device| {
            if device.len() < smoother.window() {
                tracing::debug!(
                    device_id = %device.id,
                    samples = device.len(),
                    window = smoother.window(),
                    "device stream shorter than smoothing window, keeping raw accelerations"
                );
                return device.clone();
            }
            match smooth_device(device, smoother) {
                Ok(smoothed) => smoothed,
                Err(e) => {
                    tracing::warn!(
                        device_id = %device.id,
                        error = %e,
                        "device smoothing failed, keeping raw accelerations"
                    );
                    device.clone()
                }
            }
        })
        .collect()
}

fn smooth_device<S: Smoother + ?Sized>(
    device: &DeviceStream,
    smoother: &S,
) -> Result<DeviceStream> {
    Ok(DeviceStream {
        id: device.id.clone(),
        timestamps: device.timestamps.clone(),
        ax: smoother.smooth(&device.ax)?,
        ay: smoother.smooth(&device.ay)?,
        az: smoother.smooth(&device.az)?,
    })
}
