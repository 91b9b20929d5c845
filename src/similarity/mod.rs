//! Curve similarity measures used to score skeletons against devices.
//!
//! - `SimilarityMeasure` trait for all measures
//! - `Dtw` - dynamic time warping with a Euclidean ground metric

mod traits;
mod dtw;

pub use traits::SimilarityMeasure;
pub use dtw::Dtw;

/// A curve of `(timestamp, value)` points.
pub type Curve = Vec<[f64; 2]>;

/// Build a curve from parallel timestamp and value slices.
pub fn curve(timestamps: &[f64], values: &[f64]) -> Curve {
    timestamps
        .iter()
        .zip(values)
        .map(|(&t, &v)| [t, v])
        .collect()
}

/// Build a curve from the valid samples of a channel.
pub fn curve_from_samples(timestamps: &[f64], samples: &[Option<f64>]) -> Curve {
    timestamps
        .iter()
        .zip(samples)
        .filter_map(|(&t, s)| s.map(|v| [t, v]))
        .collect()
}
