//! # mpit - Multisensor Person Identification and Tracking
//!
//! Associates skeletons seen by a depth camera with wearable accelerometers
//! ("devices") by comparing forearm motion, one time window at a time.
//!
//! ## Pipeline
//!
//! - Landmark extraction and minimum-duration filtering
//! - Wrist/elbow reconciliation (gap interpolation + smoothing)
//! - Forearm direction estimation
//! - Position to acceleration conversion
//! - Gravity compensation for the camera tilt
//! - Rotation of skeleton acceleration into the forearm frame
//! - DTW similarity (raw + derivative) against every device
//! - Minimum-cost assignment of skeletons to devices
//!
//! ## Example
//!
//! ```rust,ignore
//! use mpit_rs::{Identifier, PitConfig};
//!
//! let identifier = Identifier::new(PitConfig::default())?;
//! let associations = identifier.identify_frames(&frames, &samples);
//! for a in &associations {
//!     println!("{} -> {} [{}, {}]", a.skeleton_id, a.device_id, a.ts_start, a.ts_end);
//! }
//! ```

// Internal modules (ports of scipy, numpy, similaritymeasures)
pub(crate) mod internal;

// Public modules
pub mod series;
pub mod smoothing;
pub mod camera;
pub mod preprocessing;
pub mod skeleton;
pub mod conversion;
pub mod gravity;
pub mod rotation;
pub mod similarity;
pub mod comparison;
pub mod association;
pub mod pipeline;
pub mod windowing;

// Re-exports for convenience
pub use series::{DeviceStream, PointSeries, Samples, SkeletonTrack, SkeletonWindow};
pub use smoothing::{SmoothFilter, Smoother, SmootherEnum};
pub use camera::CameraModel;
pub use similarity::{Dtw, SimilarityMeasure};
pub use association::{Association, AssignmentSolver, HungarianSolver};
pub use pipeline::{Identifier, PitConfig};
pub use windowing::{identify_windows, try_identify_windows, WindowAssociations};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur in the mpit library
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Unknown camera: {0}")]
        UnknownCamera(String),

        #[error("Unknown smoothing filter: {0}")]
        UnknownFilter(String),

        #[error("Smoothing error: {0}")]
        Smoothing(String),

        #[error("Interpolation error: {0}")]
        Interpolation(String),

        #[error("Invalid series shape: expected {expected}, got {got}")]
        InvalidSeries { expected: String, got: String },

        #[error("Assignment error: {0}")]
        Assignment(String),

        #[error("Empty window: {0}")]
        EmptyWindow(String),
    }

    /// Result type for mpit operations
    pub type Result<T> = std::result::Result<T, Error>;
}
