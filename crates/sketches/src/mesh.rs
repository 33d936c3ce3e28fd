use std::f32::consts::PI;

use nodegraph::{float, fold, resolution, time, vec2, vec3, GraphError, LoopRange, Node};
use shadelib::color::hex_color;
use shadelib::effects::grain_texture;
use shadelib::function::{rotate, screen_aspect_uv};
use shadelib::noise::{turbulence, TurbulenceConfig};
use tracing::debug;

/// Tunables for `mesh1_with`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh1Params {
    /// Colour spots as `#rrggbb`, decoded to linear RGB.
    pub colors: Vec<String>,
    /// Per-spot weight; spots beyond the end of the list weigh 1.
    pub weights: Vec<f32>,
    pub distortion_factor: f32,
    pub vortex_factor: f32,
    pub amp1: f32,
    pub amp2: f32,
}

impl Default for Mesh1Params {
    fn default() -> Self {
        Self {
            colors: ["#fff9bf", "#f8a097", "#b7dbf9", "#20b2aa"]
                .into_iter()
                .map(String::from)
                .collect(),
            weights: vec![1.5, 1.5, 1.0, 1.0, 1.0, 1.0],
            distortion_factor: 0.8,
            vortex_factor: 0.2,
            amp1: 2.0,
            amp2: 2.5,
        }
    }
}

/// Mesh gradient with the default palette.
pub fn mesh1() -> Result<Node, GraphError> {
    mesh1_with(&Mesh1Params::default())
}

/// Mesh gradient: the coordinate is warped three ways (a circular ripple
/// strongest at the centre, turbulence, then a vortex growing with radius)
/// and coloured by inverse-distance weighting between moving colour spots.
pub fn mesh1_with(params: &Mesh1Params) -> Result<Node, GraphError> {
    let base = screen_aspect_uv(&resolution(), 0.5)?;
    let slow = time() * 0.05;
    let centre = base.length().one_minus();

    let [rippled] = fold(
        LoopRange::inclusive(1.0, 3.0),
        [&base * 3.0],
        |i, [p]| {
            let strength = -(&centre * params.distortion_factor / i / i);
            let x = p.get().x() + &strength * (&slow - p.get().y() * i).sin() * params.amp2;
            let y = p.get().y() + &strength * (&slow - &x * i).cos() * params.amp1;
            p.assign(vec2(x, y))
        },
    )?;

    let config = TurbulenceConfig {
        num: 2.5 * params.distortion_factor,
        amp: 0.7,
        speed: 0.3,
        freq: 1.5,
        exp: 0.5,
    };
    let warped = turbulence(&rippled, &(time() * 1.5), &config)?;
    let swirled = rotate(&warped, warped.length().log() * params.vortex_factor)?;

    let mut color = vec3(0.0, 0.0, 0.0);
    let mut total_weight = float(0.0);
    for (index, hex) in params.colors.iter().enumerate() {
        let i = index as f32;
        let angle = i * PI;
        let spot = vec2(
            (&slow * (i * 0.75) + angle).sin(),
            (&slow * 2.0 + angle * 2.5).cos(),
        );
        let falloff = (&swirled - spot).length().pow(2.5);
        let weight = 1.0 / falloff.max(0.0);
        let bias = params.weights.get(index).copied().unwrap_or(1.0);
        color = color + hex_color(hex)? * (&weight * bias);
        total_weight = total_weight + weight;
    }
    debug!(spots = params.colors.len(), "built mesh gradient");

    let blended = color / total_weight;
    Ok(&blended * &blended + grain_texture(&base)? * 0.1)
}
