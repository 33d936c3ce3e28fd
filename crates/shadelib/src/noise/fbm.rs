//! Fractal sums of simplex noise.
//!
//! Octaves drive a float loop over `[0, octaves)`, so a fractional octave
//! count runs `ceil(octaves)` full octaves. Each sum is divided by the total
//! amplitude it accumulated; with zero octaves that is `0 / 0`.
use nodegraph::{expect_type, float, fold, vec3, GraphError, LoopRange, Node, ValueType};
use serde::Deserialize;

use super::simplex::simplex_noise_3d;

pub const DEFAULT_WARP_STRENGTH: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FbmConfig {
    pub octaves: f32,
    pub frequency: f32,
    pub amplitude: f32,
    pub lacunarity: f32,
    pub gain: f32,
}

impl Default for FbmConfig {
    fn default() -> Self {
        Self {
            octaves: 4.0,
            frequency: 1.0,
            amplitude: 1.0,
            lacunarity: 2.0,
            gain: 0.5,
        }
    }
}

fn octave_sum<F>(p: &Node, config: &FbmConfig, shape: F) -> Result<Node, GraphError>
where
    F: Fn(Node) -> Node,
{
    let [value, _, _, total] = fold(
        LoopRange::new(0.0, config.octaves),
        [
            float(0.0),
            float(config.amplitude),
            float(config.frequency),
            float(0.0),
        ],
        |_, [value, amplitude, frequency, total]| {
            let noise = simplex_noise_3d(&(p * frequency.get()))?;
            value.add_assign(shape(noise) * amplitude.get())?;
            total.add_assign(amplitude.get())?;
            frequency.mul_assign(config.lacunarity)?;
            amplitude.mul_assign(config.gain)?;
            Ok(())
        },
    )?;
    Ok(value / total)
}

/// Fractal Brownian motion in [-1, 1].
pub fn fbm(p: &Node, config: &FbmConfig) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec3], "fbm")?;
    octave_sum(p, config, |noise| noise)
}

/// Sharp-crested variant in [0, 1]: each octave contributes `(1 - |n|)^2`.
pub fn ridged_fbm(p: &Node, config: &FbmConfig) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec3], "ridged_fbm")?;
    octave_sum(p, config, |noise| {
        let ridge = 1.0 - noise.abs();
        &ridge * &ridge
    })
}

/// Offsets `p` by three decorrelated fbm fields before the final sum.
pub fn domain_warped_fbm(
    p: &Node,
    config: &FbmConfig,
    warp_strength: f32,
) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec3], "domain_warped_fbm")?;
    let warp = vec3(
        fbm(p, config)?,
        fbm(&(p + 100.0), config)?,
        fbm(&(p + 200.0), config)?,
    );
    fbm(&(p + warp * warp_strength), config)
}
