use std::f32::consts::PI;

use nodegraph::{mix, GraphError, Node};
use serde::Deserialize;

use super::{effect_uv, rgba, sample};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrtScanlineConfig {
    /// Scanlines per unit of uv height.
    pub line_frequency: f32,
    /// Darkening at the centre of each line, 0 to 1.
    pub line_intensity: f32,
    /// Barrel distortion applied to the scanline grid.
    pub curvature: f32,
    pub scanline_sharpness: f32,
    #[serde(skip)]
    pub input_uv: Option<Node>,
}

impl Default for CrtScanlineConfig {
    fn default() -> Self {
        Self {
            line_frequency: 200.0,
            line_intensity: 0.3,
            curvature: 0.2,
            scanline_sharpness: 0.5,
            input_uv: None,
        }
    }
}

/// Darkens the input along horizontal scanlines bent by barrel distortion.
/// Only the line grid is distorted; the input is read at the undistorted
/// coordinate.
pub fn crt_scanline(input: &Node, config: &CrtScanlineConfig) -> Result<Node, GraphError> {
    let color = rgba(input, "crt_scanline")?;
    let coord = effect_uv(&config.input_uv, "crt_scanline")?;

    let centred = &coord - 0.5;
    let distorted = &coord + &centred * (centred.dot(&centred) * config.curvature);
    let line = (distorted.y() * config.line_frequency * PI).sin();
    let profile = (line * 0.5 + 0.5).pow(config.scanline_sharpness);
    let shade = mix(1.0 - config.line_intensity, 1.0, profile);

    Ok(sample(&color, &coord)? * shade)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{evaluate, vec4, EvalContext};

    #[test]
    fn shade_stays_between_intensity_and_one() {
        let out = crt_scanline(&vec4(1.0, 1.0, 1.0, 1.0), &CrtScanlineConfig::default())
            .expect("vec4");
        for y in [0.0, 0.11, 0.37, 0.5, 0.83] {
            let ctx = EvalContext::new([0.3, y], 0.0, [64.0, 64.0]);
            let value = evaluate(&out, &ctx).expect("evaluates");
            let r = value.lanes()[0];
            assert!((0.7 - 1e-5..=1.0 + 1e-5).contains(&r), "shade {r}");
        }
    }
}
