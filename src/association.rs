//! Skeleton-to-device assignment.
//!
//! Combined scores are laid out as a skeleton x device cost matrix. Devices
//! that failed to score against any skeleton are not eligible; the remaining
//! columns go through a minimum-cost assignment.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::comparison::SkeletonScores;
use crate::internal::scipy::linear_sum_assignment;
use crate::rotation::RotatedWindow;
use crate::series::{valid_span, DeviceStream};
use crate::Result;

/// One skeleton matched with one device over a time span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub ts_start: f64,
    pub ts_end: f64,
    pub skeleton_id: String,
    pub device_id: String,
}

/// Solver of the rectangular assignment problem.
pub trait AssignmentSolver: Send + Sync {
    /// Match rows to columns.
    ///
    /// Returns `(row, col)` pairs sorted by row, with no row or column used
    /// twice.
    fn solve(&self, cost: &DMatrix<f64>) -> Result<Vec<(usize, usize)>>;
}

/// Globally optimal assignment (shortest augmenting path).
#[derive(Debug, Clone, Copy, Default)]
pub struct HungarianSolver;

impl AssignmentSolver for HungarianSolver {
    fn solve(&self, cost: &DMatrix<f64>) -> Result<Vec<(usize, usize)>> {
        let result = linear_sum_assignment(cost)?;
        Ok(result
            .assignments
            .into_iter()
            .map(|a| (a.row_idx, a.col_idx))
            .collect())
    }
}

/// Skeleton x device cost matrix with its labels.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    pub skeleton_ids: Vec<String>,
    pub device_ids: Vec<String>,
    /// Rows follow `skeleton_ids`, columns follow `device_ids`. Unscored pairs are NaN.
    pub costs: DMatrix<f64>,
}

/// Lay out combined scores as a matrix, one row per scored skeleton.
pub fn cost_matrix(scores: &[SkeletonScores], devices: &[DeviceStream]) -> CostMatrix {
    let device_ids: Vec<String> = devices.iter().map(|d| d.id.clone()).collect();
    let costs = DMatrix::from_fn(scores.len(), device_ids.len(), |i, j| {
        scores[i].get(&device_ids[j]).unwrap_or(f64::NAN)
    });
    CostMatrix {
        skeleton_ids: scores.iter().map(|s| s.skeleton_id.clone()).collect(),
        device_ids,
        costs,
    }
}

/// Columns whose every entry is finite.
pub fn eligible_columns(costs: &DMatrix<f64>) -> Vec<usize> {
    (0..costs.ncols())
        .filter(|&j| costs.column(j).iter().all(|c| c.is_finite()))
        .collect()
}

/// Assign devices to skeletons from their combined scores.
///
/// Every emitted association spans the valid forward acceleration of its
/// skeleton. An empty list is returned when no device is eligible.
pub fn do_association<S: AssignmentSolver + ?Sized>(
    rotated: &RotatedWindow,
    scores: &[SkeletonScores],
    devices: &[DeviceStream],
    solver: &S,
) -> Vec<Association> {
    let matrix = cost_matrix(scores, devices);
    let columns = eligible_columns(&matrix.costs);
    let (n_rows, _) = matrix.costs.shape();
    if n_rows == 0 || columns.is_empty() {
        tracing::info!(
            skeletons = n_rows,
            eligible_devices = columns.len(),
            "nothing to associate"
        );
        return Vec::new();
    }
    if columns.len() < matrix.device_ids.len() {
        tracing::debug!(
            dropped = matrix.device_ids.len() - columns.len(),
            "devices with non-finite scores are not eligible"
        );
    }

    let eligible = matrix.costs.select_columns(&columns);
    let pairs = match solver.solve(&eligible) {
        Ok(pairs) => pairs,
        Err(e) => {
            tracing::error!(error = %e, "assignment failed");
            return Vec::new();
        }
    };

    let mut associations = Vec::with_capacity(pairs.len());
    for (row, col) in pairs {
        let skeleton_id = &matrix.skeleton_ids[row];
        let span = rotated.get(skeleton_id).and_then(|s| {
            let (first, last) = valid_span(&s.au)?;
            Some((*rotated.timestamps.get(first)?, *rotated.timestamps.get(last)?))
        });
        let Some((ts_start, ts_end)) = span else {
            tracing::debug!(
                skeleton_id = %skeleton_id,
                "matched skeleton has no valid span, skipped"
            );
            continue;
        };
        let device_id = &matrix.device_ids[columns[col]];
        tracing::debug!(
            skeleton_id = %skeleton_id,
            device_id = %device_id,
            cost = eligible[(row, col)],
            "associated"
        );
        associations.push(Association {
            ts_start,
            ts_end,
            skeleton_id: skeleton_id.clone(),
            device_id: device_id.clone(),
        });
    }
    associations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::RotatedSkeleton;
    use approx::assert_relative_eq;

    fn rotated(ids: &[&str], au: Vec<Option<f64>>) -> RotatedWindow {
        let n = au.len();
        RotatedWindow {
            timestamps: (0..n).map(|i| i as f64 * 0.5).collect(),
            skeletons: ids
                .iter()
                .map(|id| RotatedSkeleton {
                    id: id.to_string(),
                    basis: Vec::new(),
                    au: au.clone(),
                    av: au.clone(),
                    aw: au.clone(),
                })
                .collect(),
        }
    }

    fn devices(ids: &[&str]) -> Vec<DeviceStream> {
        ids.iter()
            .map(|id| DeviceStream::new(*id, vec![0.0], vec![0.0], vec![0.0], vec![0.0]).unwrap())
            .collect()
    }

    fn row(id: &str, scores: &[(&str, f64)]) -> SkeletonScores {
        SkeletonScores {
            skeleton_id: id.to_string(),
            scores: scores.iter().map(|(d, s)| (d.to_string(), *s)).collect(),
        }
    }

    // ===== Cost Matrix Tests =====

    #[test]
    fn test_cost_matrix_layout_and_eligibility() {
        let scores = vec![
            row("a", &[("d1", 1.0), ("d2", 2.0), ("d3", f64::NAN)]),
            row("b", &[("d1", 3.0), ("d2", f64::INFINITY), ("d3", 1.0)]),
        ];
        let matrix = cost_matrix(&scores, &devices(&["d1", "d2", "d3"]));
        assert_eq!(matrix.costs.shape(), (2, 3));
        assert_eq!(matrix.costs[(1, 0)], 3.0);
        assert_eq!(eligible_columns(&matrix.costs), vec![0]);
    }

    #[test]
    fn test_cost_matrix_unscored_device_is_nan() {
        let scores = vec![row("a", &[("d1", 1.0)])];
        let matrix = cost_matrix(&scores, &devices(&["d1", "d2"]));
        assert!(matrix.costs[(0, 1)].is_nan());
    }

    // ===== Association Tests =====

    #[test]
    fn test_association_maps_back_through_retained_columns() {
        // d1 is ineligible, so solver column 0 is d2 and column 1 is d3
        let scores = vec![
            row("A", &[("d1", f64::NAN), ("d2", 0.0), ("d3", 5.0)]),
            row("B", &[("d1", 1.0), ("d2", 4.0), ("d3", 0.5)]),
        ];
        let window = rotated(&["A", "B"], vec![None, Some(1.0), Some(2.0), None]);
        let devices = devices(&["d1", "d2", "d3"]);
        let result = do_association(&window, &scores, &devices, &HungarianSolver);

        assert_eq!(result.len(), 2);
        assert_eq!((result[0].skeleton_id.as_str(), result[0].device_id.as_str()), ("A", "d2"));
        assert_eq!((result[1].skeleton_id.as_str(), result[1].device_id.as_str()), ("B", "d3"));
        assert_eq!((result[0].ts_start, result[0].ts_end), (0.5, 1.0));
    }

    #[test]
    fn test_no_eligible_devices_yields_empty() {
        let scores = vec![row("A", &[("d1", f64::NAN)])];
        let window = rotated(&["A"], vec![Some(1.0)]);
        assert!(do_association(&window, &scores, &devices(&["d1"]), &HungarianSolver).is_empty());
        assert!(do_association(&window, &[], &devices(&["d1"]), &HungarianSolver).is_empty());
    }

    #[test]
    fn test_single_pair() {
        let scores = vec![row("A", &[("d1", 3.5)])];
        let window = rotated(&["A"], vec![Some(1.0), Some(1.0)]);
        let result = do_association(&window, &scores, &devices(&["d1"]), &HungarianSolver);
        assert_eq!(
            result,
            vec![Association {
                ts_start: 0.0,
                ts_end: 0.5,
                skeleton_id: "A".to_string(),
                device_id: "d1".to_string(),
            }]
        );
    }

    #[test]
    fn test_fewer_devices_than_skeletons() {
        let scores = vec![
            row("A", &[("d1", 2.0)]),
            row("B", &[("d1", 1.0)]),
            row("C", &[("d1", 3.0)]),
        ];
        let window = rotated(&["A", "B", "C"], vec![Some(1.0)]);
        let result = do_association(&window, &scores, &devices(&["d1"]), &HungarianSolver);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].skeleton_id, "B");
    }

    #[test]
    fn test_no_device_assigned_twice() {
        let scores = vec![
            row("A", &[("d1", 0.0), ("d2", 9.0), ("d3", 9.0)]),
            row("B", &[("d1", 0.0), ("d2", 1.0), ("d3", 9.0)]),
            row("C", &[("d1", 0.0), ("d2", 0.0), ("d3", 0.0)]),
        ];
        let window = rotated(&["A", "B", "C"], vec![Some(1.0)]);
        let devices = devices(&["d1", "d2", "d3"]);
        let result = do_association(&window, &scores, &devices, &HungarianSolver);
        assert_eq!(result.len(), 3);
        let mut used: Vec<&str> = result.iter().map(|a| a.device_id.as_str()).collect();
        used.sort_unstable();
        used.dedup();
        assert_eq!(used.len(), 3);
        assert_eq!(result[0].device_id, "d1");
        assert_eq!(result[1].device_id, "d2");
        assert_eq!(result[2].device_id, "d3");
    }

    // ===== Solver Tests =====

    #[test]
    fn test_hungarian_solver_minimizes_total_cost() {
        // Taking the cheapest entry first would cost 1 + 100
        let cost = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 100.0]);
        let pairs = HungarianSolver.solve(&cost).unwrap();
        assert_eq!(pairs, vec![(0, 1), (1, 0)]);
        let total: f64 = pairs.iter().map(|&(i, j)| cost[(i, j)]).sum();
        assert_relative_eq!(total, 4.0);
    }

    #[test]
    fn test_association_serializes() {
        let a = Association {
            ts_start: 1.0,
            ts_end: 2.0,
            skeleton_id: "3".to_string(),
            device_id: "bracelet-1".to_string(),
        };
        let json = serde_json::to_string(&a).unwrap();
        let back: Association = serde_json::from_str(&json).unwrap();
        assert_eq!(a, back);
    }
}
