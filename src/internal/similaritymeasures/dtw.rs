//! Dynamic time warping between two curves of 2D points.

/// Euclidean distance between two 2D points.
#[inline]
fn euclidean(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

/// Dynamic time warping distance between two curves.
///
/// Accumulates the Euclidean point-to-point cost along the cheapest monotone
/// alignment path:
///
/// `d[i][j] = c[i][j] + min(d[i-1][j], d[i][j-1], d[i-1][j-1])`
///
/// and returns `d[n-1][m-1]`. Only two rows of the accumulated cost matrix are
/// kept in memory. Returns NaN if either curve is empty.
pub fn dtw(exp_data: &[[f64; 2]], num_data: &[[f64; 2]]) -> f64 {
    let n = exp_data.len();
    let m = num_data.len();
    if n == 0 || m == 0 {
        return f64::NAN;
    }

    let mut prev = vec![0.0; m];
    let mut curr = vec![0.0; m];

    // First row: only horizontal moves
    prev[0] = euclidean(&exp_data[0], &num_data[0]);
    for j in 1..m {
        prev[j] = prev[j - 1] + euclidean(&exp_data[0], &num_data[j]);
    }

    for i in 1..n {
        curr[0] = prev[0] + euclidean(&exp_data[i], &num_data[0]);
        for j in 1..m {
            let best = prev[j].min(curr[j - 1]).min(prev[j - 1]);
            curr[j] = best + euclidean(&exp_data[i], &num_data[j]);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[m - 1]
}
