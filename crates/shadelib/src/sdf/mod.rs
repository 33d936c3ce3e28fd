//! Signed distance functions and blend operators.
mod ops;
mod shapes;

pub use ops::{smax, smin};
pub use shapes::{
    sd_box2d, sd_box3d, sd_diamond, sd_equilateral_triangle, sd_hexagon, sd_line,
    sd_parallelogram, sd_rhombus, sd_ring, sd_sphere, sd_triangle,
};
