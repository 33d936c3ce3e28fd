//! Post-processing effects over an upstream colour graph.
//!
//! Each effect is `fn(input, &Config) -> Result<Node, GraphError>`: `input`
//! is the upstream colour (vec3 is treated as opaque vec4), the config holds
//! the tunables with their defaults, and `input_uv` optionally replaces the
//! screen UV the effect reads. Sampling the input somewhere other than the
//! current pixel rebinds the input graph with `Node::at_uv`. Effects return
//! vec4 and chain by nesting.
//!
//! `PostEffect` is the serialisable form used by configuration files, tagged
//! by `effect = "<name>"`.
use nodegraph::{expect_type, uv, Builtin, GraphError, Node, NodeKind, ValueType};
use serde::Deserialize;

mod chromatic;
mod crt;
mod dither;
mod grain;
mod halftone;
mod led;
mod pixellation;
mod vignette;

pub use chromatic::{chromatic_aberration, ChromaticAberrationConfig};
pub use crt::{crt_scanline, CrtScanlineConfig};
pub use dither::{dither, DitherConfig, BAYER_8X8};
pub use grain::{grain, GrainConfig};
pub use halftone::{halftone, HalftoneConfig};
pub use led::{led, LedConfig};
pub use pixellation::{pixellation, PixellationConfig};
pub use vignette::{vignette, VignetteConfig};

/// Upstream colour as vec4, with vec3 input made opaque.
fn rgba(input: &Node, op: &'static str) -> Result<Node, GraphError> {
    expect_type(input, &[ValueType::Vec3, ValueType::Vec4], op)?;
    if input.ty() == ValueType::Vec3 {
        Ok(input.extend(1.0))
    } else {
        Ok(input.clone())
    }
}

/// The coordinate an effect reads: `input_uv`, or the screen UV.
fn effect_uv(input_uv: &Option<Node>, op: &'static str) -> Result<Node, GraphError> {
    match input_uv {
        Some(coord) => {
            expect_type(coord, &[ValueType::Vec2], op)?;
            Ok(coord.clone())
        }
        None => Ok(uv()),
    }
}

/// `input` as seen from `coord`.
fn sample(input: &Node, coord: &Node) -> Result<Node, GraphError> {
    if matches!(coord.kind(), NodeKind::Builtin(Builtin::Uv)) {
        return Ok(input.clone());
    }
    input.at_uv(coord)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum PostEffect {
    Grain(GrainConfig),
    Dither(DitherConfig),
    Halftone(HalftoneConfig),
    CrtScanline(CrtScanlineConfig),
    ChromaticAberration(ChromaticAberrationConfig),
    Vignette(VignetteConfig),
    Led(LedConfig),
    Pixellation(PixellationConfig),
}

impl PostEffect {
    pub const NAMES: [&'static str; 8] = [
        "grain",
        "dither",
        "halftone",
        "crt_scanline",
        "chromatic_aberration",
        "vignette",
        "led",
        "pixellation",
    ];

    /// The effect with default settings, by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        let effect = match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "grain" => PostEffect::Grain(GrainConfig::default()),
            "dither" => PostEffect::Dither(DitherConfig::default()),
            "halftone" => PostEffect::Halftone(HalftoneConfig::default()),
            "crt_scanline" | "crt" => PostEffect::CrtScanline(CrtScanlineConfig::default()),
            "chromatic_aberration" => {
                PostEffect::ChromaticAberration(ChromaticAberrationConfig::default())
            }
            "vignette" => PostEffect::Vignette(VignetteConfig::default()),
            "led" => PostEffect::Led(LedConfig::default()),
            "pixellation" => PostEffect::Pixellation(PixellationConfig::default()),
            _ => return None,
        };
        Some(effect)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PostEffect::Grain(_) => "grain",
            PostEffect::Dither(_) => "dither",
            PostEffect::Halftone(_) => "halftone",
            PostEffect::CrtScanline(_) => "crt_scanline",
            PostEffect::ChromaticAberration(_) => "chromatic_aberration",
            PostEffect::Vignette(_) => "vignette",
            PostEffect::Led(_) => "led",
            PostEffect::Pixellation(_) => "pixellation",
        }
    }

    pub fn apply(&self, input: &Node) -> Result<Node, GraphError> {
        match self {
            PostEffect::Grain(config) => grain(input, config),
            PostEffect::Dither(config) => dither(input, config),
            PostEffect::Halftone(config) => halftone(input, config),
            PostEffect::CrtScanline(config) => crt_scanline(input, config),
            PostEffect::ChromaticAberration(config) => chromatic_aberration(input, config),
            PostEffect::Vignette(config) => vignette(input, config),
            PostEffect::Led(config) => led(input, config),
            PostEffect::Pixellation(config) => pixellation(input, config),
        }
    }
}

/// Applies `effects` in order, each wrapping the previous result.
pub fn apply_chain(input: &Node, effects: &[PostEffect]) -> Result<Node, GraphError> {
    effects.iter().try_fold(input.clone(), |color, effect| {
        tracing::debug!(effect = effect.name(), "applying post effect");
        effect.apply(&color)
    })
}
