//! Fixed-length windowing of recorded streams.
//!
//! Each window is identified on its own; nothing carries over from one window
//! to the next, and a window that fails is reported empty.

use serde::{Deserialize, Serialize};

use crate::association::Association;
use crate::pipeline::Identifier;
use crate::preprocessing::{AccelerationSample, SkeletonFrame};
use crate::{Error, Result};

/// A record with a timestamp in seconds.
pub trait Timestamped {
    fn timestamp(&self) -> f64;
}

impl Timestamped for SkeletonFrame {
    fn timestamp(&self) -> f64 {
        self.timestamp
    }
}

impl Timestamped for AccelerationSample {
    fn timestamp(&self) -> f64 {
        self.timestamp
    }
}

/// Associations found in one window `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowAssociations {
    pub start: f64,
    pub end: f64,
    pub associations: Vec<Association>,
}

/// Items of a timestamp-sorted slice with `start <= timestamp < end`.
///
/// `items` must be sorted by timestamp; the bounds are found by binary search.
pub fn window_bounds<T: Timestamped>(items: &[T], start: f64, end: f64) -> &[T] {
    debug_assert!(
        items.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()),
        "items must be sorted by timestamp"
    );
    let lo = items.partition_point(|item| item.timestamp() < start);
    let hi = lo + items[lo..].partition_point(|item| item.timestamp() < end);
    &items[lo..hi]
}

/// Identify every `window_seconds` window of a recording.
///
/// Windows start at the whole second before the first frame and run until the
/// window containing the last frame, which is included even when it is only
/// partly covered. Frames and samples must be sorted by timestamp.
///
/// # Errors
/// `Error::InvalidConfig` if `window_seconds` is not a positive finite length,
/// or is too small to advance past a window start at the magnitude of the
/// timestamps.
pub fn try_identify_windows(
    identifier: &Identifier,
    frames: &[SkeletonFrame],
    samples: &[AccelerationSample],
    window_seconds: f64,
) -> Result<Vec<WindowAssociations>> {
    if !window_seconds.is_finite() || window_seconds <= 0.0 {
        return Err(Error::InvalidConfig(format!(
            "window length must be positive, got {}",
            window_seconds
        )));
    }
    let (Some(first), Some(last)) = (frames.first(), frames.last()) else {
        return Ok(Vec::new());
    };
    let last_start = last.timestamp.floor();

    let mut results = Vec::new();
    let mut start = first.timestamp.floor();
    while start <= last_start {
        let end = start + window_seconds;
        if end <= start {
            return Err(Error::InvalidConfig(format!(
                "window length {} does not advance past timestamp {}",
                window_seconds, start
            )));
        }
        let window_frames = window_bounds(frames, start, end);
        let window_samples = window_bounds(samples, start, end);

        let associations = match identifier.try_identify_frames(window_frames, window_samples) {
            Ok(associations) => associations,
            Err(e) => {
                tracing::error!(start, end, error = %e, "window failed");
                Vec::new()
            }
        };
        results.push(WindowAssociations {
            start,
            end,
            associations,
        });
        start = end;
    }
    Ok(results)
}

/// Identify every `window_seconds` window of a recording, logging a bad window length.
pub fn identify_windows(
    identifier: &Identifier,
    frames: &[SkeletonFrame],
    samples: &[AccelerationSample],
    window_seconds: f64,
) -> Vec<WindowAssociations> {
    match try_identify_windows(identifier, frames, samples, window_seconds) {
        Ok(results) => results,
        Err(e) => {
            tracing::error!(window_seconds, error = %e, "windowing failed");
            Vec::new()
        }
    }
}
