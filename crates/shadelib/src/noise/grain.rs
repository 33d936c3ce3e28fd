use nodegraph::{expect_type, vec2, GraphError, Node, ValueType};

/// Sine hash of a 2D coordinate, nominally in [0, 1).
///
/// Not clamped: for large inputs `sin` loses precision and neighbouring
/// coordinates hash to visibly correlated values.
pub fn grain(uv: &Node) -> Result<Node, GraphError> {
    expect_type(uv, &[ValueType::Vec2], "grain")?;
    Ok((uv.dot(vec2(12.9898, 78.233)).sin() * 43_758.547).fract())
}
