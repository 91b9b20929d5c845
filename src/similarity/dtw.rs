//! Dynamic time warping measure.

use super::traits::SimilarityMeasure;
use crate::internal::similaritymeasures::dtw;

/// Dynamic time warping with a Euclidean ground metric between 2D points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dtw;

impl SimilarityMeasure for Dtw {
    #[inline]
    fn distance(&self, a: &[[f64; 2]], b: &[[f64; 2]]) -> f64 {
        dtw(a, b)
    }
}
