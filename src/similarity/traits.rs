//! Similarity measure trait definition.

/// Distance between two curves of `(timestamp, value)` points.
///
/// Lower is more similar. Implementations return a non-finite value when the
/// distance is undefined, e.g. for an empty curve.
pub trait SimilarityMeasure: Send + Sync {
    fn distance(&self, a: &[[f64; 2]], b: &[[f64; 2]]) -> f64;
}
