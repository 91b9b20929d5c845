//! Camera models and their landmark tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Skeleton tracking camera, which fixes the joint layout of each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CameraModel {
    #[default]
    Intel,
    Kinect,
}

impl CameraModel {
    /// Joint index of the elbow.
    pub fn elbow(&self) -> usize {
        match self {
            CameraModel::Intel => 6,
            CameraModel::Kinect => 5,
        }
    }

    /// Joint index of the wrist.
    pub fn wrist(&self) -> usize {
        match self {
            CameraModel::Intel => 7,
            CameraModel::Kinect => 6,
        }
    }

    /// Number of joints in a well-formed skeleton record.
    pub fn total_joints(&self) -> usize {
        match self {
            CameraModel::Intel => 18,
            CameraModel::Kinect => 32,
        }
    }

    /// Landmark compared against the devices.
    pub fn primary(&self) -> usize {
        self.wrist()
    }

    /// Landmark that, together with the primary, gives the forearm direction.
    pub fn secondary(&self) -> usize {
        self.elbow()
    }
}

impl FromStr for CameraModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Intel" | "intel" => Ok(CameraModel::Intel),
            "Kinect" | "kinect" => Ok(CameraModel::Kinect),
            _ => Err(Error::UnknownCamera(format!("{} (expected Intel or Kinect)", s))),
        }
    }
}

impl fmt::Display for CameraModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraModel::Intel => write!(f, "Intel"),
            CameraModel::Kinect => write!(f, "Kinect"),
        }
    }
}
