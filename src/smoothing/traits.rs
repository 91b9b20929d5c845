//! Smoother trait shared by every filter kind.

use crate::series::{valid_indices, Samples};
use crate::Result;

/// A one-dimensional smoothing filter.
pub trait Smoother: Send + Sync {
    /// Smooth a dense signal, returning a signal of the same length.
    fn smooth(&self, x: &[f64]) -> Result<Vec<f64>>;

    /// Smoothing window in samples.
    fn window(&self) -> usize;

    /// Smooth only the valid samples of a channel.
    ///
    /// The valid samples are treated as one contiguous sequence and written back
    /// at their original positions; missing samples stay missing.
    fn smooth_valid(&self, samples: &[Option<f64>]) -> Result<Samples> {
        let valid = valid_indices(samples);
        let values: Vec<f64> = samples.iter().flatten().copied().collect();
        let smoothed = self.smooth(&values)?;

        let mut out = vec![None; samples.len()];
        for (&i, v) in valid.iter().zip(smoothed) {
            out[i] = Some(v);
        }
        Ok(out)
    }
}
