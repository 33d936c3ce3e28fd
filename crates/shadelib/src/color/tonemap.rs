//! Tone-mapping curves over linear vec3 colour.
//!
//! Reinhard maps non-negative input into [0, 1); every other curve clamps
//! its result to [0, 1].
use nodegraph::{expect_type, mix, smoothstep, splat, vec3, GraphError, Node, ValueType};

const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

fn rgb(color: &Node, op: &'static str) -> Result<(), GraphError> {
    expect_type(color, &[ValueType::Vec3], op)
}

pub fn reinhard_tonemap(color: &Node) -> Result<Node, GraphError> {
    rgb(color, "reinhard_tonemap")?;
    let x = color.max(0.0);
    Ok(&x / (&x + 1.0))
}

fn hable_partial(x: &Node) -> Node {
    const A: f32 = 0.15;
    const B: f32 = 0.50;
    const C: f32 = 0.10;
    const D: f32 = 0.20;
    const E: f32 = 0.02;
    const F: f32 = 0.30;
    (x * (x * A + C * B) + D * E) / (x * (x * A + B) + D * F) - E / F
}

/// John Hable's filmic curve with exposure bias 2, normalised by a white
/// point of 11.2.
pub fn uncharted2_tonemap(color: &Node) -> Result<Node, GraphError> {
    rgb(color, "uncharted2_tonemap")?;
    const EXPOSURE_BIAS: f32 = 2.0;
    const WHITE: f32 = 11.2;
    let curve = hable_partial(&(color.max(0.0) * EXPOSURE_BIAS));
    let white_scale = 1.0 / hable_partial(&splat(ValueType::Vec3, WHITE));
    Ok((curve * white_scale).clamp(0.0, 1.0))
}

/// Krzysztof Narkowicz's fit of the ACES filmic curve.
pub fn aces_tonemap(color: &Node) -> Result<Node, GraphError> {
    rgb(color, "aces_tonemap")?;
    let (a, b, c, d, e) = (2.51, 0.03, 2.43, 0.59, 0.14);
    let mapped = (color * (color * a + b)) / (color * (color * c + d) + e);
    Ok(mapped.clamp(0.0, 1.0))
}

/// Per-channel gamma that pushes blue and pulls red.
pub fn cross_process_tonemap(color: &Node) -> Result<Node, GraphError> {
    rgb(color, "cross_process_tonemap")?;
    let c = color.max(0.0);
    let mapped = vec3(c.x().pow(0.8), c.y().pow(1.2), c.z().pow(1.5));
    Ok(mapped.clamp(0.0, 1.0))
}

/// Desaturates towards luminance and boosts contrast.
pub fn bleach_bypass_tonemap(color: &Node) -> Result<Node, GraphError> {
    rgb(color, "bleach_bypass_tonemap")?;
    let lum = color.dot(LUMA);
    let mixed = mix(splat(ValueType::Vec3, lum), color, 0.7);
    Ok((mixed * 1.2).clamp(0.0, 1.0))
}

pub fn technicolor_tonemap(color: &Node) -> Result<Node, GraphError> {
    rgb(color, "technicolor_tonemap")?;
    let r = color.x() * 1.5;
    let g = color.y() * 1.2;
    let b = color.z() * 0.8 + color.x() * 0.2;
    Ok(vec3(r, g, b).clamp(0.0, 1.0))
}

/// Smoothstep S-curve with a slight warm shift.
pub fn cinematic_tonemap(color: &Node) -> Result<Node, GraphError> {
    rgb(color, "cinematic_tonemap")?;
    let r = smoothstep(0.05, 0.95, color.x() * 0.95 + 0.02);
    let g = smoothstep(0.05, 0.95, color.y() * 1.05);
    let b = smoothstep(0.05, 0.95, color.z() * 1.1);
    Ok(vec3(r, g, b).clamp(0.0, 1.0))
}
