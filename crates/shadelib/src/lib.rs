//! Building blocks for sketch graphs: noise, signed distance fields, colour
//! and tone mapping, math helpers, lighting, pattern effects and the post
//! effect chain.
//!
//! Every function that takes caller nodes validates their types up front and
//! reports a `GraphError` instead of panicking.
use nodegraph::{expect_type, GraphError, Node, ValueType};

pub mod color;
pub mod effects;
pub mod function;
pub mod lighting;
pub mod math;
pub mod noise;
pub mod post;
pub mod sdf;

/// Converts a scalar parameter and checks that it is a float.
pub(crate) fn float_param(value: impl Into<Node>, op: &'static str) -> Result<Node, GraphError> {
    let value = value.into();
    expect_type(&value, &[ValueType::Float], op)?;
    Ok(value)
}
