use nodegraph::{GraphError, Node};
use serde::Deserialize;

use super::{effect_uv, rgba, sample};
use crate::effects;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VignetteConfig {
    pub smoothing: f32,
    pub exponent: f32,
    #[serde(skip)]
    pub input_uv: Option<Node>,
}

impl Default for VignetteConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.25,
            exponent: 5.0,
            input_uv: None,
        }
    }
}

/// Darkens towards the corners, alpha included.
pub fn vignette(input: &Node, config: &VignetteConfig) -> Result<Node, GraphError> {
    let color = rgba(input, "vignette")?;
    let coord = effect_uv(&config.input_uv, "vignette")?;
    let mask = effects::vignette(&(&coord - 0.5), config.smoothing, config.exponent)?;
    Ok(sample(&color, &coord)? * mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{evaluate, vec4, EvalContext};

    #[test]
    fn centre_is_untouched_and_corners_darken() {
        let out = vignette(&vec4(1.0, 1.0, 1.0, 1.0), &VignetteConfig::default()).expect("vec4");
        let centre = EvalContext::new([0.5, 0.5], 0.0, [64.0, 64.0]);
        assert_eq!(evaluate(&out, &centre).expect("evaluates").lanes(), &[1.0; 4]);
        let corner = EvalContext::new([0.0, 0.0], 0.0, [64.0, 64.0]);
        assert!(evaluate(&out, &corner).expect("evaluates").lanes()[0] < 0.5);
    }
}
