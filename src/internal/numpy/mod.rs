//! NumPy-like array operations.

use crate::{Error, Result};

/// First discrete difference, `out[i] = x[i + 1] - x[i]`.
pub fn diff(x: &[f64]) -> Vec<f64> {
    x.windows(2).map(|w| w[1] - w[0]).collect()
}

/// One-dimensional linear interpolation (`numpy.interp`).
///
/// `xp` must be increasing. Points left of `xp[0]` take `fp[0]`, points right
/// of the last support take the last value.
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> Result<Vec<f64>> {
    if xp.is_empty() {
        return Err(Error::Interpolation(
            "array of sample points is empty".to_string(),
        ));
    }
    if xp.len() != fp.len() {
        return Err(Error::InvalidSeries {
            expected: format!("{} values", xp.len()),
            got: format!("{} values", fp.len()),
        });
    }

    let last = xp.len() - 1;
    Ok(x
        .iter()
        .map(|&xi| {
            if xi <= xp[0] {
                return fp[0];
            }
            if xi >= xp[last] {
                return fp[last];
            }
            // First support strictly greater than xi
            let hi = xp.partition_point(|&p| p <= xi);
            let lo = hi - 1;
            let slope = (fp[hi] - fp[lo]) / (xp[hi] - xp[lo]);
            fp[lo] + slope * (xi - xp[lo])
        })
        .collect())
}
