use nodegraph::{select, vec2, vec4, GraphError, Node};
use serde::Deserialize;

use super::{effect_uv, rgba, sample};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChromaticAberrationConfig {
    pub strength: f32,
    /// 0 shifts along `direction`, 1 shifts away from the screen centre.
    pub radial: f32,
    /// Only used when `radial < 1`; a zero vector means no fixed shift.
    pub direction: [f32; 2],
    #[serde(skip)]
    pub input_uv: Option<Node>,
}

impl Default for ChromaticAberrationConfig {
    fn default() -> Self {
        Self {
            strength: 0.01,
            radial: 0.5,
            direction: [0.0, 0.0],
            input_uv: None,
        }
    }
}

/// Splits red and blue by sampling the input either side of the pixel.
/// The shift grows with distance from the centre. Where the blended direction
/// has no length (the exact centre, or a zero `direction` with `radial = 0`)
/// the channels are not shifted.
pub fn chromatic_aberration(
    input: &Node,
    config: &ChromaticAberrationConfig,
) -> Result<Node, GraphError> {
    let color = rgba(input, "chromatic_aberration")?;
    let coord = effect_uv(&config.input_uv, "chromatic_aberration")?;

    let to_centre = &coord - vec2(0.5, 0.5);
    let distance = to_centre.length();
    let radial_dir = unit_or_zero(&to_centre);
    let blended =
        Node::from(config.direction) * (1.0 - config.radial) + radial_dir * config.radial;
    let direction = unit_or_zero(&blended);
    let offset = direction * config.strength * (distance + 0.5);

    let red = sample(&color, &(&coord + &offset))?;
    let green = sample(&color, &coord)?;
    let blue = sample(&color, &(&coord - &offset))?;
    Ok(vec4(red.x(), green.y(), blue.z(), green.w()))
}

fn unit_or_zero(v: &Node) -> Node {
    let len = v.length();
    select(&len.gt(1e-6), v / &len, vec2(0.0, 0.0))
}
