//! Internal modules ported from external libraries.
//!
//! These modules contain code adapted from:
//! - scipy: Savitzky-Golay and Wiener filters, linear sum assignment
//! - numpy: Differences and interpolation
//! - similaritymeasures: Dynamic time warping

pub mod scipy;
pub mod numpy;
pub mod similaritymeasures;
