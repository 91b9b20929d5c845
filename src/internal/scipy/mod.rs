//! SciPy functions port.
//!
//! Ported from:
//! - scipy.signal
//! - scipy.optimize
//!
//! License: BSD 3-Clause (SciPy Developers)

mod optimize;
mod signal;

pub use optimize::*;
pub use signal::*;
