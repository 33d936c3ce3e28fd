//! Complex numbers, coordinate transforms and host-side scalar helpers.
mod complex;
mod coords;
pub mod scalar;

pub use complex::{
    as_polar, complex_cos, complex_div, complex_log, complex_mul, complex_pow, complex_sin,
    complex_tan,
};
pub use coords::{cartesian_to_polar, four_color_gradient, polar_to_cartesian};
