use nodegraph::{smoothstep, GraphError, Node};
use serde::Deserialize;

use super::{effect_uv, rgba, sample};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedConfig {
    /// Lamps per unit of uv.
    pub scalar: f32,
    /// Shrinks each lamp within its cell.
    pub zoom: f32,
    pub exponent: f32,
    pub edge: f32,
    #[serde(skip)]
    pub input_uv: Option<Node>,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            scalar: 100.0,
            zoom: 2.0,
            exponent: 1.2,
            edge: 0.1,
            input_uv: None,
        }
    }
}

/// Masks the input with a grid of round lamps.
pub fn led(input: &Node, config: &LedConfig) -> Result<Node, GraphError> {
    let color = rgba(input, "led")?;
    let coord = effect_uv(&config.input_uv, "led")?;
    let cell = (&coord * config.scalar).fract() - 0.5;
    let lamp = (cell * config.zoom).length().one_minus();
    let mask = smoothstep(config.edge, 1.0, lamp).pow(config.exponent);
    Ok(sample(&color, &coord)? * mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{evaluate, vec4, EvalContext};

    #[test]
    fn lamp_centres_pass_and_gaps_block() {
        let out = led(&vec4(0.8, 0.8, 0.8, 1.0), &LedConfig::default()).expect("vec4");
        let centre = EvalContext::new([0.005, 0.005], 0.0, [64.0, 64.0]);
        let lit = evaluate(&out, &centre).expect("evaluates").lanes()[0];
        assert!((lit - 0.8).abs() < 1e-3, "lit {lit}");
        let gap = EvalContext::new([0.0, 0.0], 0.0, [64.0, 64.0]);
        assert_eq!(evaluate(&out, &gap).expect("evaluates").lanes()[0], 0.0);
    }
}
