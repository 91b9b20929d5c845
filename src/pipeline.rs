//! End-to-end identification of one window.

use serde::{Deserialize, Serialize};

use crate::association::{do_association, AssignmentSolver, Association, HungarianSolver};
use crate::camera::CameraModel;
use crate::comparison::{combine_scores, compare_accel, compare_accel_der};
use crate::conversion::point_accelerations;
use crate::gravity::add_gravity;
use crate::preprocessing::{device_streams, skeleton_window, AccelerationSample, SkeletonFrame};
use crate::rotation::rotate_accelerations;
use crate::series::{DeviceStream, SkeletonWindow};
use crate::similarity::{Dtw, SimilarityMeasure};
use crate::skeleton::{directions, filter_skeletons, post_process_pair, Landmark};
use crate::smoothing::{smooth_device_accelerations, SavgolSmoother, SmoothFilter, SmootherEnum};
use crate::{Error, Result};

/// Identification parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitConfig {
    /// Camera model, which fixes the wrist and elbow joints.
    pub camera: CameraModel,

    /// Savitzky-Golay window for device accelerations.
    pub acceleration_smooth_window: usize,
    pub acceleration_smooth_poly: usize,

    /// Minimum seconds a skeleton must be seen to be kept.
    pub skeleton_min_duration: f64,

    /// Smoothing of the reconciled landmark positions.
    pub skeleton_smooth_filter: SmoothFilter,
    pub skeleton_smooth_window: usize,
    pub skeleton_smooth_poly: usize,

    /// Smoothing of the forearm direction.
    pub direction_smooth_filter: SmoothFilter,
    pub direction_smooth_window: usize,
    pub direction_smooth_poly: usize,

    /// Savitzky-Golay smoothing between the two differentiations.
    pub conversion_smooth_window: usize,
    pub conversion_smooth_poly: usize,

    /// Camera tilt with respect to the ground plane, in degrees.
    pub camera_angle: f64,

    /// Weight of the raw score against the derivative score.
    pub similarity_weight: f64,
}

impl Default for PitConfig {
    fn default() -> Self {
        Self {
            camera: CameraModel::Intel,
            acceleration_smooth_window: 35,
            acceleration_smooth_poly: 1,
            skeleton_min_duration: 5.0,
            skeleton_smooth_filter: SmoothFilter::Savgol,
            skeleton_smooth_window: 7,
            skeleton_smooth_poly: 1,
            direction_smooth_filter: SmoothFilter::Savgol,
            direction_smooth_window: 5,
            direction_smooth_poly: 1,
            conversion_smooth_window: 3,
            conversion_smooth_poly: 1,
            camera_angle: 0.0,
            similarity_weight: 0.7,
        }
    }
}

impl PitConfig {
    /// Check every parameter.
    pub fn validate(&self) -> Result<()> {
        let savgol_windows = [
            (
                "acceleration",
                SmoothFilter::Savgol,
                self.acceleration_smooth_window,
                self.acceleration_smooth_poly,
            ),
            (
                "skeleton",
                self.skeleton_smooth_filter,
                self.skeleton_smooth_window,
                self.skeleton_smooth_poly,
            ),
            (
                "direction",
                self.direction_smooth_filter,
                self.direction_smooth_window,
                self.direction_smooth_poly,
            ),
            (
                "conversion",
                SmoothFilter::Savgol,
                self.conversion_smooth_window,
                self.conversion_smooth_poly,
            ),
        ];
        for (name, filter, window, poly) in savgol_windows {
            if window == 0 {
                return Err(Error::InvalidConfig(format!(
                    "{}_smooth_window must be positive",
                    name
                )));
            }
            if filter == SmoothFilter::Savgol && window % 2 == 0 {
                return Err(Error::InvalidConfig(format!(
                    "{}_smooth_window must be odd for savgol, got {}",
                    name, window
                )));
            }
            if filter == SmoothFilter::Savgol && poly >= window {
                return Err(Error::InvalidConfig(format!(
                    "{}_smooth_poly must be less than the window, got {} >= {}",
                    name, poly, window
                )));
            }
        }

        if !self.skeleton_min_duration.is_finite() || self.skeleton_min_duration < 0.0 {
            return Err(Error::InvalidConfig(
                "skeleton_min_duration must be non-negative".to_string(),
            ));
        }

        if !(self.camera_angle > -90.0 && self.camera_angle < 90.0) {
            return Err(Error::InvalidConfig(format!(
                "camera_angle must be within (-90, 90) degrees, got {}",
                self.camera_angle
            )));
        }

        if !(0.0..=1.0).contains(&self.similarity_weight) {
            return Err(Error::InvalidConfig(format!(
                "similarity_weight must be within [0, 1], got {}",
                self.similarity_weight
            )));
        }

        Ok(())
    }
}

/// Associates skeletons with devices, one window at a time.
///
/// Holds no per-window state, so a single identifier can serve windows from
/// several threads.
pub struct Identifier {
    config: PitConfig,
    acceleration_smoother: SavgolSmoother,
    skeleton_smoother: SmootherEnum,
    direction_smoother: SmootherEnum,
    conversion_smoother: SavgolSmoother,
    measure: Box<dyn SimilarityMeasure>,
    solver: Box<dyn AssignmentSolver>,
}

impl Identifier {
    /// Create an identifier using DTW similarity and optimal assignment.
    pub fn new(config: PitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            acceleration_smoother: SavgolSmoother::new(
                config.acceleration_smooth_window,
                config.acceleration_smooth_poly,
            )?,
            skeleton_smoother: config
                .skeleton_smooth_filter
                .build(config.skeleton_smooth_window, config.skeleton_smooth_poly)?,
            direction_smoother: config
                .direction_smooth_filter
                .build(config.direction_smooth_window, config.direction_smooth_poly)?,
            conversion_smoother: SavgolSmoother::new(
                config.conversion_smooth_window,
                config.conversion_smooth_poly,
            )?,
            measure: Box::new(Dtw),
            solver: Box::new(HungarianSolver),
            config,
        })
    }

    /// Replace the similarity measure.
    pub fn with_measure(mut self, measure: impl SimilarityMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    /// Replace the assignment solver.
    pub fn with_solver(mut self, solver: impl AssignmentSolver + 'static) -> Self {
        self.solver = Box::new(solver);
        self
    }

    pub fn config(&self) -> &PitConfig {
        &self.config
    }

    /// Associate the skeletons of one window with the devices.
    ///
    /// Skeletons that cannot be processed are left out; the result may be
    /// empty but never fails.
    pub fn identify(&self, window: &SkeletonWindow, devices: &[DeviceStream]) -> Vec<Association> {
        // STAGE 1: Device smoothing
        let devices = smooth_device_accelerations(devices, &self.acceleration_smoother);

        // STAGE 2: Skeleton preprocessing
        let min_duration = self.config.skeleton_min_duration;
        let window = filter_skeletons(window, Landmark::Primary, min_duration);
        let window = filter_skeletons(&window, Landmark::Secondary, min_duration);
        let window = post_process_pair(&window, &self.skeleton_smoother);

        // STAGE 3: Forearm directions
        let (window, skeleton_directions) = directions(&window, &self.direction_smoother);

        // STAGE 4: Accelerations with gravity, in the forearm frame
        let accelerations = point_accelerations(&window, &self.conversion_smoother);
        let accelerations = add_gravity(&accelerations, self.config.camera_angle);
        let rotated = rotate_accelerations(&accelerations, &skeleton_directions);

        // STAGE 5: Similarity
        let raw = compare_accel(&rotated, &devices, self.measure.as_ref());
        let derivative = compare_accel_der(&rotated, &devices, self.measure.as_ref());
        let combined = combine_scores(&raw, &derivative, self.config.similarity_weight);

        // STAGE 6: Assignment
        let associations = do_association(&rotated, &combined, &devices, self.solver.as_ref());
        tracing::info!(
            skeletons = rotated.skeletons.len(),
            devices = devices.len(),
            associations = associations.len(),
            "window identified"
        );
        associations
    }

    /// Extract a window from raw records, then identify it.
    ///
    /// # Errors
    /// `Error::EmptyWindow` if there are no skeleton frames.
    pub fn try_identify_frames(
        &self,
        frames: &[SkeletonFrame],
        samples: &[AccelerationSample],
    ) -> Result<Vec<Association>> {
        let window = skeleton_window(frames, self.config.camera)?;
        let devices = device_streams(samples);
        Ok(self.identify(&window, &devices))
    }

    /// Extract a window from raw records, then identify it, logging extraction errors.
    pub fn identify_frames(
        &self,
        frames: &[SkeletonFrame],
        samples: &[AccelerationSample],
    ) -> Vec<Association> {
        match self.try_identify_frames(frames, samples) {
            Ok(associations) => associations,
            Err(e) => {
                tracing::error!(error = %e, "window extraction failed");
                Vec::new()
            }
        }
    }
}
