use nodegraph::{resolution, time, GraphError, Node};
use shadelib::color::cosine_palette;
use shadelib::effects::grain_texture;
use shadelib::function::screen_aspect_uv;

/// Vertical cosine-palette gradient drifting slowly with time, striped by a
/// soft sawtooth and finished with grain.
pub fn dawn1() -> Result<Node, GraphError> {
    let coord = screen_aspect_uv(&resolution(), 0.5)?;

    let shade = coord.y() + 0.5 + time() * 0.01;
    let gradient = cosine_palette(
        &shade,
        [0.5, 0.5, 0.5],
        [0.5, 0.5, 0.5],
        [1.0, 1.0, 0.5],
        [0.8, 0.9, 0.3],
    )?;

    let stripes = (coord.y() * 24.0).fract() * 0.3;
    let grain = grain_texture(&coord)? * 0.2;

    Ok(gradient + stripes.pow(2.0) + grain)
}
