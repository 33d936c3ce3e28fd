use std::f32::consts::PI;

use nodegraph::{resolution, uv, vec2, GraphError, Node};
use shadelib::color::cosine_palette;
use shadelib::effects::grain_texture;
use shadelib::function::screen_aspect_uv;

const BANDS: f32 = 12.0;

/// Banded flare: a compound radial gradient, offset per band and by a slow
/// sine over the screen height, tinted by a cosine palette.
pub fn flare1() -> Result<Node, GraphError> {
    let coord = screen_aspect_uv(&resolution(), 0.5)?;
    let screen = uv();

    let band = (coord.y() * BANDS).floor();
    let wave = (screen.y() * PI).sin();

    // Every band overwrites the colour of the one before, so only the last
    // band contributes.
    let last = BANDS - 1.0;
    let shift = band * last * 0.005;
    let offset = vec2(coord.x(), coord.y() + shift + wave * 0.05);
    let radial = (offset.x() * 1.5).abs().one_minus() + (offset.y() * 1.5).abs();

    let tint = cosine_palette(
        &(screen.y() * 0.25),
        [0.5, 0.5, 0.5],
        [0.5, 0.5, 0.5],
        [2.0, 1.0, 0.0],
        [0.5, 0.2, 0.25],
    )?;

    Ok(tint * radial + grain_texture(&screen)? * 0.1)
}
