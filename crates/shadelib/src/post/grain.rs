use nodegraph::{GraphError, Node};
use serde::Deserialize;

use super::{effect_uv, rgba, sample};
use crate::noise;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GrainConfig {
    pub intensity: f32,
    /// Multiplies the coordinate before hashing.
    pub scale: f32,
    #[serde(skip)]
    pub input_uv: Option<Node>,
}

impl Default for GrainConfig {
    fn default() -> Self {
        Self {
            intensity: 0.1,
            scale: 1.0,
            input_uv: None,
        }
    }
}

/// Adds `(hash - 0.5) * intensity` to every channel, alpha included.
pub fn grain(input: &Node, config: &GrainConfig) -> Result<Node, GraphError> {
    let color = rgba(input, "grain")?;
    let coord = effect_uv(&config.input_uv, "grain")?;
    let hash = noise::grain(&(&coord * config.scale))?;
    let offset = (hash - 0.5) * config.intensity;
    Ok(sample(&color, &coord)? + offset)
}
