//! Smoothing filters ported from scipy.signal.
//!
//! - `savgol_filter` with `mode='interp'` (scipy's default)
//! - `wiener` with a scalar window and estimated noise

use nalgebra::DMatrix;
use crate::{Error, Result};

/// Savitzky-Golay projection matrix for a window.
///
/// Row `k` holds the weights that evaluate, at sample `k` of the window, the
/// least-squares polynomial of order `polyorder` fitted to the whole window.
fn savgol_projection(window_length: usize, polyorder: usize) -> Result<DMatrix<f64>> {
    let half = (window_length / 2) as f64;
    // Offsets centred on the window keep the Vandermonde matrix well conditioned
    let vander = DMatrix::from_fn(window_length, polyorder + 1, |k, j| {
        (k as f64 - half).powi(j as i32)
    });
    let pinv = vander
        .clone()
        .pseudo_inverse(1e-12)
        .map_err(|e| Error::Smoothing(format!("savgol coefficients: {}", e)))?;
    Ok(vander * pinv)
}

/// Apply a Savitzky-Golay filter to a 1D signal.
///
/// Interior samples are the value at the window centre of the local
/// least-squares polynomial. The first and last `window_length / 2` samples
/// are evaluated on the polynomial fitted to the first and last full window
/// (scipy's `mode='interp'`).
///
/// # Errors
/// `Error::Smoothing` if the window is zero or even, if `polyorder >= window_length`,
/// or if the signal is shorter than the window.
pub fn savgol_filter(x: &[f64], window_length: usize, polyorder: usize) -> Result<Vec<f64>> {
    if window_length == 0 || window_length % 2 == 0 {
        return Err(Error::Smoothing(format!(
            "window_length must be a positive odd integer, got {}",
            window_length
        )));
    }
    if polyorder >= window_length {
        return Err(Error::Smoothing(format!(
            "polyorder must be less than window_length, got polyorder={} window_length={}",
            polyorder, window_length
        )));
    }
    let n = x.len();
    if window_length > n {
        return Err(Error::Smoothing(format!(
            "window_length={} exceeds the size of x ({})",
            window_length, n
        )));
    }

    let proj = savgol_projection(window_length, polyorder)?;
    let half = window_length / 2;
    let mut y = vec![0.0; n];

    // Interior: centre row of the projection
    for i in half..(n - half) {
        let start = i - half;
        y[i] = (0..window_length).map(|k| proj[(half, k)] * x[start + k]).sum();
    }

    // Leading edge: polynomial fitted on the first window
    for i in 0..half {
        y[i] = (0..window_length).map(|k| proj[(i, k)] * x[k]).sum();
    }

    // Trailing edge: polynomial fitted on the last window
    let tail_start = n - window_length;
    for i in (n - half)..n {
        let row = i - tail_start;
        y[i] = (0..window_length)
            .map(|k| proj[(row, k)] * x[tail_start + k])
            .sum();
    }

    Ok(y)
}

/// Apply a Wiener filter to a 1D signal.
///
/// Uses the local mean and variance over a centred window of `window` samples
/// (zero padded at the borders) and estimates the noise power as the mean of
/// the local variances. Where the local variance does not exceed the noise the
/// output is the local mean.
///
/// # Errors
/// `Error::Smoothing` if the window is zero.
pub fn wiener(x: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(Error::Smoothing("wiener window must be positive".to_string()));
    }
    let n = x.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    // 'same' correlation with a box kernel
    let lead = (window - 1) / 2;
    let mut local_mean = vec![0.0; n];
    let mut local_var = vec![0.0; n];
    for i in 0..n {
        let hi = i + lead;
        let lo = hi as isize - (window as isize - 1);
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for k in lo.max(0) as usize..=hi.min(n - 1) {
            sum += x[k];
            sum_sq += x[k] * x[k];
        }
        let mean = sum / window as f64;
        local_mean[i] = mean;
        local_var[i] = sum_sq / window as f64 - mean * mean;
    }

    let noise = local_var.iter().sum::<f64>() / n as f64;

    Ok((0..n)
        .map(|i| {
            if local_var[i] <= noise {
                local_mean[i]
            } else {
                (x[i] - local_mean[i]) * (1.0 - noise / local_var[i]) + local_mean[i]
            }
        })
        .collect())
}
