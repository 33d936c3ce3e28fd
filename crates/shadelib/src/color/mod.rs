//! Colour palettes, tone mapping and colour parsing.
mod hex;
mod hyperbolic;
mod palette;
mod tonemap;

pub use hex::{hex_color, parse_hex_color, srgb_to_linear};
pub use hyperbolic::{cosh, sinh, tanh};
pub use palette::{cosine_palette, cosine_palette_scaled, PALETTE_SCALE};
pub use tonemap::{
    aces_tonemap, bleach_bypass_tonemap, cinematic_tonemap, cross_process_tonemap,
    reinhard_tonemap, technicolor_tonemap, uncharted2_tonemap,
};
