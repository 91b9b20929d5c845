//! Savitzky-Golay smoother.

use super::traits::Smoother;
use crate::internal::scipy::savgol_filter;
use crate::{Error, Result};

/// Least-squares polynomial smoothing over a sliding odd window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavgolSmoother {
    window: usize,
    poly: usize,
}

impl SavgolSmoother {
    /// Create a smoother, checking that the window is odd and larger than the order.
    pub fn new(window: usize, poly: usize) -> Result<Self> {
        if window == 0 || window % 2 == 0 {
            return Err(Error::Smoothing(format!(
                "savgol window must be a positive odd integer, got {}",
                window
            )));
        }
        if poly >= window {
            return Err(Error::Smoothing(format!(
                "savgol polyorder {} must be less than window {}",
                poly, window
            )));
        }
        Ok(Self { window, poly })
    }
}

impl Smoother for SavgolSmoother {
    fn smooth(&self, x: &[f64]) -> Result<Vec<f64>> {
        savgol_filter(x, self.window, self.poly)
    }

    fn window(&self) -> usize {
        self.window
    }
}
