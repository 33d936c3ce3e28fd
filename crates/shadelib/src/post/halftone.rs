use nodegraph::{resolution, smoothstep, splat, vec2, GraphError, Node, ValueType};
use serde::Deserialize;

use super::{effect_uv, rgba, sample};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HalftoneConfig {
    /// Dots per unit of screen height.
    pub frequency: f32,
    /// Screen rotation in radians.
    pub angle: f32,
    pub smoothness: f32,
    /// Ink colour; the input colour is used when unset.
    pub color: Option<[f32; 3]>,
    #[serde(skip)]
    pub input_uv: Option<Node>,
}

impl Default for HalftoneConfig {
    fn default() -> Self {
        Self {
            frequency: 100.0,
            angle: 0.5,
            smoothness: 0.1,
            color: None,
            input_uv: None,
        }
    }
}

/// Print-style dot screen whose dot radius follows the input brightness.
pub fn halftone(input: &Node, config: &HalftoneConfig) -> Result<Node, GraphError> {
    let color = rgba(input, "halftone")?;
    let coord = effect_uv(&config.input_uv, "halftone")?;
    let res = resolution();
    let aspect = res.x() / res.y();
    let corrected = vec2(coord.x() * aspect, coord.y());

    let (c, s) = (config.angle.cos(), config.angle.sin());
    let rotated = vec2(corrected.dot([c, -s]), corrected.dot([s, c]));
    let cell = (rotated * config.frequency).fract() - 0.5;

    let original = sample(&color, &coord)?;
    let brightness = original.xyz().dot([0.299, 0.587, 0.114]);
    let dot_size = brightness * 0.7 + 0.15;
    let ink = smoothstep(
        &dot_size + config.smoothness,
        &dot_size - config.smoothness,
        cell.length(),
    );
    let ink = splat(ValueType::Vec3, ink);
    let rgb = match config.color {
        Some(tint) => ink * tint,
        None => ink * original.xyz(),
    };
    Ok(rgb.extend(original.w()))
}
