//! Pattern helpers that map a coordinate to a scalar mask. Sketches combine
//! them with colour; the post effects in `post` wrap some of them.
use std::f32::consts::PI;

use nodegraph::{
    expect_type, mix, resolution, smoothstep, step, vec2, GraphError, Node, ValueType,
};
use serde::Deserialize;

use crate::float_param;
use crate::function::screen_aspect_uv;
use crate::noise::{fbm, grain, simplex_noise_3d, FbmConfig};
use crate::sdf::sd_sphere;

fn coordinate(uv: &Node, op: &'static str) -> Result<(), GraphError> {
    expect_type(uv, &[ValueType::Vec2], op)
}

fn octaves(octaves: f32) -> FbmConfig {
    FbmConfig {
        octaves,
        ..FbmConfig::default()
    }
}

/// Per-pixel film grain in [0, 1); see `noise::grain`.
pub fn grain_texture(uv: &Node) -> Result<Node, GraphError> {
    grain(uv)
}

/// Woven canvas texture in [0.9, 1.0].
pub fn canvas_weave(uv: &Node) -> Result<Node, GraphError> {
    coordinate(uv, "canvas_weave")?;
    let grid = (uv * 200.0).fract();
    let wobble = fbm(&(uv * 30.0).extend(0.0), &octaves(3.0))? * 0.1;
    let warped = grid + wobble;

    let fine = octaves(2.0);
    let shift_x = fbm(&(uv * 100.0).extend(0.0), &fine)? * 0.5;
    let shift_y = fbm(&(uv * 100.0 + 0.5).extend(0.0), &fine)? * 0.5;
    let weave_x = (warped.x() * PI + shift_x).sin();
    let weave_y = (warped.y() * PI + shift_y).sin();

    let softened = smoothstep(-0.3, 0.3, weave_x * weave_y);
    Ok(mix(0.9, 1.0, softened))
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LedPatternConfig {
    /// Cell edge in pixels.
    pub cell_size: f32,
    /// Radius of each lamp within its cell.
    pub intensity: f32,
    pub intensity_falloff: f32,
    pub edge_softness: f32,
}

impl Default for LedPatternConfig {
    fn default() -> Self {
        Self {
            cell_size: 10.0,
            intensity: 0.5,
            intensity_falloff: 1.8,
            edge_softness: 0.2,
        }
    }
}

/// Grid of round lamps over the aspect-corrected screen.
pub fn led_pattern(config: &LedPatternConfig) -> Result<Node, GraphError> {
    let res = resolution();
    let cells = screen_aspect_uv(&res, 0.5)? * (&res / config.cell_size);
    let local = cells.fract() - 0.5;
    let lamp = (local / config.intensity).length().one_minus();
    Ok(smoothstep(config.edge_softness, 1.0, lamp).pow(config.intensity_falloff))
}

/// Snaps `uv` to blocks `size` pixels wide, measured on the screen width.
pub fn pixellation(uv: &Node, size: impl Into<Node>) -> Result<Node, GraphError> {
    coordinate(uv, "pixellation")?;
    let size = float_param(size, "pixellation")?;
    let block = size / resolution().x();
    Ok((uv / &block).floor() * block)
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpeckleConfig {
    /// Noise threshold both samples must exceed.
    pub density: f32,
    /// Frequencies of the two noise samples.
    pub warp: [f32; 2],
}

impl Default for SpeckleConfig {
    fn default() -> Self {
        Self {
            density: 0.75,
            warp: [80.0, 120.0],
        }
    }
}

/// Sparse 0/1 speckles on an fbm-warped domain.
pub fn speckled_noise(uv: &Node, config: &SpeckleConfig) -> Result<Node, GraphError> {
    coordinate(uv, "speckled_noise")?;
    let base = uv * 3.0;
    let warp_x = fbm(&base.extend(0.0), &FbmConfig::default())?;
    let warp_y = fbm(&(&base + 100.0).extend(0.0), &FbmConfig::default())?;
    let warped = uv + (vec2(warp_x, warp_y) - 0.5) * 0.1;

    let first = simplex_noise_3d(&(&warped * config.warp[0]).extend(0.0))?;
    let second = simplex_noise_3d(&(&warped * config.warp[1] + 50.0).extend(0.0))?;
    Ok(step(config.density, first) * step(config.density, second))
}

/// Radial darkening: 1 at the centre of a centred uv, falling to 0 at
/// distance 1. Smoothing 0.45 and exponent 1.2 are the usual settings.
pub fn vignette(
    uv: &Node,
    smoothing: impl Into<Node>,
    exponent: impl Into<Node>,
) -> Result<Node, GraphError> {
    coordinate(uv, "vignette")?;
    let smoothing = float_param(smoothing, "vignette")?;
    let exponent = float_param(exponent, "vignette")?;
    let falloff = smoothstep(smoothing, 1.0, sd_sphere(uv, 0.0)?).one_minus();
    Ok(falloff.pow(exponent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{evaluate, uv, EvalContext};

    fn eval_at(node: &Node, at: [f32; 2]) -> f32 {
        let ctx = EvalContext::new(at, 0.0, [320.0, 200.0]);
        evaluate(node, &ctx).expect("evaluates").as_f32()
    }

    #[test]
    fn canvas_weave_stays_in_band() {
        let node = canvas_weave(&uv()).expect("vec2");
        for at in [[0.1, 0.2], [0.5, 0.5], [0.93, 0.07]] {
            let value = eval_at(&node, at);
            assert!((0.9..=1.0).contains(&value), "weave {value}");
        }
    }

    #[test]
    fn led_lamp_is_brightest_at_cell_centre() {
        let node = led_pattern(&LedPatternConfig::default()).expect("builds");
        assert_eq!(node.ty(), ValueType::Float);
        // 320x200: aspect uv x = (u - 0.5) * 1.6, cells are 32 x 20
        let centre = eval_at(&node, [0.5 + 0.5 / 32.0 / 1.6, 0.5 + 0.5 / 20.0]);
        let corner = eval_at(&node, [0.5, 0.5]);
        assert!(centre > 0.9, "centre {centre}");
        assert_eq!(corner, 0.0);
    }

    #[test]
    fn pixellation_snaps_to_blocks() {
        let node = pixellation(&uv(), 32.0).expect("vec2");
        // block = 32 / 320 = 0.1
        let ctx = EvalContext::new([0.27, 0.55], 0.0, [320.0, 200.0]);
        let value = evaluate(&node, &ctx).expect("evaluates");
        assert!((value.lanes()[0] - 0.2).abs() < 1e-6);
        assert!((value.lanes()[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn speckles_are_binary() {
        let node = speckled_noise(&uv(), &SpeckleConfig::default()).expect("vec2");
        for at in [[0.1, 0.1], [0.4, 0.8]] {
            let value = eval_at(&node, at);
            assert!(value == 0.0 || value == 1.0);
        }
    }

    #[test]
    fn vignette_fades_outwards() {
        let centred = uv() - 0.5;
        let node = vignette(&centred, 0.45, 1.2).expect("vec2");
        assert_eq!(eval_at(&node, [0.5, 0.5]), 1.0);
        assert!(eval_at(&node, [1.0, 1.0]) < eval_at(&node, [0.6, 0.5]));
    }

    #[test]
    fn grain_texture_matches_noise_grain() {
        let a = grain_texture(&uv()).expect("vec2");
        let b = grain(&uv()).expect("vec2");
        assert_eq!(eval_at(&a, [0.3, 0.4]), eval_at(&b, [0.3, 0.4]));
    }
}
