//! Enum-based smoother dispatch and filter kind parsing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::savgol::SavgolSmoother;
use super::traits::Smoother;
use super::wiener::WienerSmoother;
use crate::{Error, Result};

/// Kind of smoothing filter, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothFilter {
    #[default]
    Savgol,
    #[serde(alias = "weiner")]
    Wiener,
}

impl SmoothFilter {
    /// Build a smoother of this kind. `poly` is ignored by the Wiener filter.
    pub fn build(self, window: usize, poly: usize) -> Result<SmootherEnum> {
        match self {
            SmoothFilter::Savgol => Ok(SmootherEnum::Savgol(SavgolSmoother::new(window, poly)?)),
            SmoothFilter::Wiener => Ok(SmootherEnum::Wiener(WienerSmoother::new(window)?)),
        }
    }
}

impl FromStr for SmoothFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "savgol" => Ok(SmoothFilter::Savgol),
            "wiener" | "weiner" => Ok(SmoothFilter::Wiener),
            other => Err(Error::UnknownFilter(format!(
                "{} (expected savgol or wiener)",
                other
            ))),
        }
    }
}

impl fmt::Display for SmoothFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmoothFilter::Savgol => write!(f, "savgol"),
            SmoothFilter::Wiener => write!(f, "wiener"),
        }
    }
}

/// Enum-based smoother for static dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmootherEnum {
    Savgol(SavgolSmoother),
    Wiener(WienerSmoother),
}

impl Smoother for SmootherEnum {
    #[inline(always)]
    fn smooth(&self, x: &[f64]) -> Result<Vec<f64>> {
        match self {
            SmootherEnum::Savgol(s) => s.smooth(x),
            SmootherEnum::Wiener(s) => s.smooth(x),
        }
    }

    #[inline(always)]
    fn window(&self) -> usize {
        match self {
            SmootherEnum::Savgol(s) => s.window(),
            SmootherEnum::Wiener(s) => s.window(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_str() {
        assert_eq!("savgol".parse::<SmoothFilter>().unwrap(), SmoothFilter::Savgol);
        assert_eq!("wiener".parse::<SmoothFilter>().unwrap(), SmoothFilter::Wiener);
        assert_eq!("weiner".parse::<SmoothFilter>().unwrap(), SmoothFilter::Wiener);
        assert_eq!("SavGol".parse::<SmoothFilter>().unwrap(), SmoothFilter::Savgol);
        assert!(matches!(
            "kalman".parse::<SmoothFilter>(),
            Err(Error::UnknownFilter(_))
        ));
    }

    #[test]
    fn test_filter_serde_accepts_misspelling() {
        let f: SmoothFilter = serde_json::from_str("\"weiner\"").unwrap();
        assert_eq!(f, SmoothFilter::Wiener);
        assert_eq!(serde_json::to_string(&SmoothFilter::Savgol).unwrap(), "\"savgol\"");
    }

    #[test]
    fn test_build_dispatch() {
        let s = SmoothFilter::Savgol.build(5, 1).unwrap();
        assert!(matches!(s, SmootherEnum::Savgol(_)));
        assert_eq!(s.window(), 5);

        let w = SmoothFilter::Wiener.build(4, 9).unwrap();
        assert!(matches!(w, SmootherEnum::Wiener(_)));
        assert_eq!(w.window(), 4);

        assert!(SmoothFilter::Savgol.build(4, 1).is_err());
    }
}
