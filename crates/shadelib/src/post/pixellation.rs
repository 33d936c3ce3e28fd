use nodegraph::{resolution, vec2, GraphError, Node};
use serde::Deserialize;

use super::{effect_uv, rgba, sample};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PixellationConfig {
    /// Block size in thousandths of the screen height.
    pub size: f32,
    #[serde(skip)]
    pub input_uv: Option<Node>,
}

impl Default for PixellationConfig {
    fn default() -> Self {
        Self {
            size: 20.0,
            input_uv: None,
        }
    }
}

/// Reads the input once per square block.
pub fn pixellation(input: &Node, config: &PixellationConfig) -> Result<Node, GraphError> {
    let color = rgba(input, "pixellation")?;
    let coord = effect_uv(&config.input_uv, "pixellation")?;
    let res = resolution();
    let aspect = res.x() / res.y();

    let block = config.size / 1000.0;
    let corrected = vec2(coord.x() * &aspect, coord.y());
    let snapped = (corrected / block).floor() * block;
    let at = vec2(snapped.x() / &aspect, snapped.y());
    sample(&color, &at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{evaluate, uv, EvalContext};

    #[test]
    fn pixels_in_one_block_share_a_colour() {
        let input = uv().extend(0.0).extend(1.0);
        let config = PixellationConfig {
            size: 100.0,
            ..PixellationConfig::default()
        };
        let out = pixellation(&input, &config).expect("vec4");
        let read = |at: [f32; 2]| {
            let ctx = EvalContext::new(at, 0.0, [100.0, 100.0]);
            evaluate(&out, &ctx).expect("evaluates").lanes().to_vec()
        };
        let a = read([0.41, 0.52]);
        let b = read([0.49, 0.58]);
        assert_eq!(a, b);
        assert!((a[0] - 0.4).abs() < 1e-5 && (a[1] - 0.5).abs() < 1e-5);
        assert_ne!(a, read([0.51, 0.52]));
    }
}
