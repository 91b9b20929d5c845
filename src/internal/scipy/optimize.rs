//! SciPy optimization functions port.
//!
//! Ported from scipy.optimize.linear_sum_assignment (shortest augmenting path
//! variant of the Jonker-Volgenant algorithm, as in scipy's `rectangular_lsap`).
//! License: BSD 3-Clause (SciPy Developers)
#![allow(clippy::needless_range_loop)]

use nalgebra::DMatrix;
use crate::{Error, Result};

/// Represents a match between a row index and column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub row_idx: usize,
    pub col_idx: usize,
}

/// Result of linear sum assignment.
#[derive(Debug, Clone)]
pub struct AssignmentResult {
    /// Matched (row, col) pairs, sorted by row
    pub assignments: Vec<Assignment>,
    /// Indices of rows that were not matched
    pub unmatched_rows: Vec<usize>,
    /// Indices of columns that were not matched
    pub unmatched_cols: Vec<usize>,
}

/// Solve the linear sum assignment problem.
///
/// Finds the matching of `min(rows, cols)` pairs with minimum total cost.
/// This is a port of scipy.optimize.linear_sum_assignment and returns the
/// same pairs in the same order (sorted by row).
///
/// # Arguments
/// * `cost_matrix` - Cost matrix where cost[(i, j)] is the cost of assigning row i to column j
///
/// # Errors
/// `Error::Assignment` if the matrix contains NaN or -inf, or if no complete
/// matching of the smaller side with finite cost exists.
pub fn linear_sum_assignment(cost_matrix: &DMatrix<f64>) -> Result<AssignmentResult> {
    let (num_rows, num_cols) = cost_matrix.shape();
    if num_rows == 0 || num_cols == 0 {
        return Ok(AssignmentResult {
            assignments: Vec::new(),
            unmatched_rows: (0..num_rows).collect(),
            unmatched_cols: (0..num_cols).collect(),
        });
    }

    if cost_matrix.iter().any(|c| c.is_nan() || *c == f64::NEG_INFINITY) {
        return Err(Error::Assignment(
            "cost matrix contains NaN or -inf entries".to_string(),
        ));
    }

    // The solver needs rows <= cols
    let transpose = num_cols < num_rows;
    let cost = if transpose {
        cost_matrix.transpose()
    } else {
        cost_matrix.clone()
    };

    let col4row = shortest_augmenting_path(&cost)?;

    let mut assignments: Vec<Assignment> = if transpose {
        col4row
            .iter()
            .enumerate()
            .map(|(col_idx, &row_idx)| Assignment { row_idx, col_idx })
            .collect()
    } else {
        col4row
            .iter()
            .enumerate()
            .map(|(row_idx, &col_idx)| Assignment { row_idx, col_idx })
            .collect()
    };
    assignments.sort_by_key(|a| a.row_idx);

    let mut matched_rows = vec![false; num_rows];
    let mut matched_cols = vec![false; num_cols];
    for a in &assignments {
        matched_rows[a.row_idx] = true;
        matched_cols[a.col_idx] = true;
    }

    let unmatched_rows: Vec<usize> = (0..num_rows).filter(|&i| !matched_rows[i]).collect();
    let unmatched_cols: Vec<usize> = (0..num_cols).filter(|&j| !matched_cols[j]).collect();

    Ok(AssignmentResult {
        assignments,
        unmatched_rows,
        unmatched_cols,
    })
}

/// Assign every row of a (rows <= cols) matrix, returning the column of each row.
fn shortest_augmenting_path(cost: &DMatrix<f64>) -> Result<Vec<usize>> {
    let (nr, nc) = cost.shape();

    // Dual variables
    let mut u = vec![0.0; nr];
    let mut v = vec![0.0; nc];

    let mut shortest_path_costs = vec![f64::INFINITY; nc];
    let mut path = vec![0usize; nc];
    let mut col4row: Vec<Option<usize>> = vec![None; nr];
    let mut row4col: Vec<Option<usize>> = vec![None; nc];
    let mut sr = vec![false; nr];
    let mut sc = vec![false; nc];
    let mut remaining = vec![0usize; nc];

    for cur_row in 0..nr {
        let mut state = SearchState {
            path: &mut path,
            shortest_path_costs: &mut shortest_path_costs,
            sr: &mut sr,
            sc: &mut sc,
            remaining: &mut remaining,
        };
        let (sink, min_val) = augmenting_path(cost, &u, &v, &row4col, cur_row, &mut state)
            .ok_or_else(|| Error::Assignment("cost matrix is infeasible".to_string()))?;

        // Update dual variables
        u[cur_row] += min_val;
        for i in 0..nr {
            if sr[i] && i != cur_row {
                if let Some(j) = col4row[i] {
                    u[i] += min_val - shortest_path_costs[j];
                }
            }
        }
        for j in 0..nc {
            if sc[j] {
                v[j] -= min_val - shortest_path_costs[j];
            }
        }

        // Augment previous solution along the path
        let mut j = sink;
        loop {
            let i = path[j];
            row4col[j] = Some(i);
            let previous = col4row[i].replace(j);
            if i == cur_row {
                break;
            }
            match previous {
                Some(prev_col) => j = prev_col,
                None => break,
            }
        }
    }

    col4row
        .into_iter()
        .map(|c| c.ok_or_else(|| Error::Assignment("row left unassigned".to_string())))
        .collect()
}

/// Scratch buffers reused across augmenting path searches.
struct SearchState<'a> {
    path: &'a mut [usize],
    shortest_path_costs: &'a mut [f64],
    sr: &'a mut [bool],
    sc: &'a mut [bool],
    remaining: &'a mut [usize],
}

/// Dijkstra-like search for the shortest augmenting path from `start_row`.
///
/// Returns the sink column and the length of the path, or None when every
/// remaining column is unreachable (infeasible).
fn augmenting_path(
    cost: &DMatrix<f64>,
    u: &[f64],
    v: &[f64],
    row4col: &[Option<usize>],
    start_row: usize,
    state: &mut SearchState<'_>,
) -> Option<(usize, f64)> {
    let nc = cost.ncols();
    let mut min_val = 0.0;

    // Columns are scanned in reverse order to match scipy's tie-breaking
    let mut num_remaining = nc;
    for it in 0..nc {
        state.remaining[it] = nc - it - 1;
    }

    state.sr.fill(false);
    state.sc.fill(false);
    state.shortest_path_costs.fill(f64::INFINITY);

    let mut i = start_row;
    loop {
        let mut index = None;
        let mut lowest = f64::INFINITY;
        state.sr[i] = true;

        for it in 0..num_remaining {
            let j = state.remaining[it];

            let r = min_val + cost[(i, j)] - u[i] - v[j];
            if r < state.shortest_path_costs[j] {
                state.path[j] = i;
                state.shortest_path_costs[j] = r;
            }

            // Prefer unassigned columns on ties, so augmentation stops early
            let spc = state.shortest_path_costs[j];
            if spc < lowest || (spc == lowest && row4col[j].is_none()) {
                lowest = spc;
                index = Some(it);
            }
        }

        min_val = lowest;
        if min_val == f64::INFINITY {
            return None;
        }

        let index = index?;
        let j = state.remaining[index];
        state.sc[j] = true;
        num_remaining -= 1;
        state.remaining[index] = state.remaining[num_remaining];

        match row4col[j] {
            None => return Some((j, min_val)),
            Some(row) => i = row,
        }
    }
}
