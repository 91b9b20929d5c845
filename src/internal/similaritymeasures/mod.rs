//! similaritymeasures port.
//!
//! Ported from similaritymeasures.dtw (curve-to-curve dynamic time warping).
//! License: MIT (Charles Jekel)

mod dtw;

pub use dtw::*;
