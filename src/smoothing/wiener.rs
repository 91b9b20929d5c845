//! Wiener smoother.

use super::traits::Smoother;
use crate::internal::scipy::wiener;
use crate::{Error, Result};

/// Adaptive smoothing based on local mean and variance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WienerSmoother {
    window: usize,
}

impl WienerSmoother {
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(Error::Smoothing("wiener window must be positive".to_string()));
        }
        Ok(Self { window })
    }
}

impl Smoother for WienerSmoother {
    fn smooth(&self, x: &[f64]) -> Result<Vec<f64>> {
        wiener(x, self.window)
    }

    fn window(&self) -> usize {
        self.window
    }
}
