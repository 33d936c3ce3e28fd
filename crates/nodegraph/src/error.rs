use thiserror::Error;

use crate::types::ValueType;

/// Raised while building a graph; a graph that builds is well typed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("type mismatch in {op}: {detail}")]
    TypeMismatch { op: &'static str, detail: String },

    #[error("invalid swizzle '{pattern}' on {ty}")]
    InvalidSwizzle { pattern: String, ty: ValueType },

    #[error("cannot construct {target} from {detail}")]
    InvalidConstruct { target: ValueType, detail: String },

    #[error("invalid literal: {0}")]
    InvalidLiteral(String),
}

impl GraphError {
    pub(crate) fn mismatch(op: &'static str, detail: impl Into<String>) -> Self {
        GraphError::TypeMismatch {
            op,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("texture slot {0} is not bound")]
    MissingTexture(u32),

    #[error("loop exceeded {limit} iterations")]
    IterationLimit { limit: u64 },

    #[error("accumulator of fold {fold} read outside its loop body")]
    UnboundSlot { fold: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("cannot write a {0} value to the fragment output")]
    UnsupportedOutput(ValueType),

    #[error("literal {0} has no WGSL representation")]
    NonFiniteLiteral(String),

    #[error("accumulator of fold {fold} read outside its loop body")]
    UnboundSlot { fold: u64 },
}
