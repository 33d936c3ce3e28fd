//! Procedural noise built from graph primitives.
//!
//! Functions:
//! - `grain` sine hash
//! - `simplex_noise_3d` / `simplex_noise_4d`
//! - `curl_noise_3d`
//! - `fbm`, `ridged_fbm`, `domain_warped_fbm`
//! - `turbulence`
pub mod common;
mod curl;
mod fbm;
mod grain;
mod simplex;
mod turbulence;

pub use curl::{curl_noise_3d, CURL_EPSILON};
pub use fbm::{domain_warped_fbm, fbm, ridged_fbm, FbmConfig, DEFAULT_WARP_STRENGTH};
pub use grain::grain;
pub use simplex::{simplex_noise_3d, simplex_noise_4d};
pub use turbulence::{turbulence, TurbulenceConfig};
