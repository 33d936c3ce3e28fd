//! Typed expression graphs for procedural fragment shaders.
//!
//! A graph is built from `Node`s with ordinary Rust operators and methods,
//! checked for type consistency as it is built, and then handed to a
//! consumer: the reference `Evaluator`, the WGSL emitter, or the JSON dump.
//! Bounded loops are expressed with `fold`; re-evaluating a graph at another
//! screen coordinate is `Node::at_uv`.
mod build;
mod dump;
mod error;
mod eval;
mod fold;
mod node;
mod ops;
mod rebind;
mod types;
mod wgsl;

pub use build::expect_type;
pub use dump::{GraphDump, NodeRecord};
pub use error::{EmitError, EvalError, GraphError};
pub use eval::{evaluate, EvalContext, Evaluator, TextureSource, Value, DEFAULT_ITERATION_LIMIT};
pub use fold::{fold, Accumulator, Fold, LoopRange};
pub use node::{
    boolean, float, int, resolution, time, uv, BinaryOp, Builtin, Intrinsic, Literal, Node,
    NodeKind, Swizzle, Table, UnaryOp,
};
pub use ops::{
    atan2, construct, lookup, mat2, mix, select, smoothstep, splat, step, texture, vec2, vec3,
    vec4,
};
pub use types::ValueType;
pub use wgsl::{emit_wgsl, WgslModule, FRAGMENT_ENTRY, VERTEX_ENTRY};
