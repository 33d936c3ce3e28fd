use nodegraph::{time, uv, GraphError, Node};

/// Starting point for new sketches: screen UV in red and green, a pulse in
/// blue.
pub fn template() -> Result<Node, GraphError> {
    Ok(uv().extend(time().sin()))
}
