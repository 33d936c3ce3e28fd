//! Bounded loops expressed as folds over accumulator slots.
//!
//! A fold runs `i = start; while i < end { body; i += 1 }` (or `<=` for an
//! inclusive range) with a float index. The body closure receives the index
//! node and one `Accumulator` per initial value; each accumulator starts bound
//! to its slot (the previous iteration's value) and is rebound by `assign`
//! and the compound-assignment helpers. The values bound when the closure
//! returns become next iteration's slots, and `fold` returns one output node
//! per accumulator.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::GraphError;
use crate::node::{BinaryOp, Node, NodeKind};
use crate::types::ValueType;

static NEXT_FOLD_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_fold_id() -> u64 {
    NEXT_FOLD_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub struct LoopRange {
    start: Node,
    end: Node,
    inclusive: bool,
}

impl LoopRange {
    /// Half-open `[start, end)`.
    pub fn new(start: impl Into<Node>, end: impl Into<Node>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            inclusive: false,
        }
    }

    /// Closed `[start, end]`.
    pub fn inclusive(start: impl Into<Node>, end: impl Into<Node>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            inclusive: true,
        }
    }
}

#[derive(Debug)]
pub struct Fold {
    id: u64,
    start: Node,
    end: Node,
    inclusive: bool,
    init: Vec<Node>,
    next: Vec<Node>,
}

impl Fold {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn start(&self) -> &Node {
        &self.start
    }

    pub fn end(&self) -> &Node {
        &self.end
    }

    pub fn inclusive(&self) -> bool {
        self.inclusive
    }

    pub fn init(&self) -> &[Node] {
        &self.init
    }

    /// Body results: the accumulator values handed to the next iteration.
    pub fn next(&self) -> &[Node] {
        &self.next
    }

    pub(crate) fn operands(&self) -> Vec<&Node> {
        let mut operands = vec![&self.start, &self.end];
        operands.extend(self.init.iter());
        operands.extend(self.next.iter());
        operands
    }

    pub(crate) fn rebuilt(
        id: u64,
        start: Node,
        end: Node,
        inclusive: bool,
        init: Vec<Node>,
        next: Vec<Node>,
    ) -> Arc<Fold> {
        Arc::new(Fold {
            id,
            start,
            end,
            inclusive,
            init,
            next,
        })
    }
}

/// Mutable binding of one fold accumulator inside the body closure.
#[derive(Debug)]
pub struct Accumulator {
    ty: ValueType,
    current: Node,
}

impl Accumulator {
    pub fn get(&self) -> &Node {
        &self.current
    }

    pub fn ty(&self) -> ValueType {
        self.ty
    }

    /// Rebinds the accumulator. Float values are splatted into vector
    /// accumulators; any other type change is rejected.
    pub fn assign(&mut self, value: impl Into<Node>) -> Result<(), GraphError> {
        let value = value.into();
        self.current = if value.ty() == self.ty {
            value
        } else if value.ty() == ValueType::Float && self.ty.is_vector() {
            Node::try_splat(self.ty, &value)?
        } else {
            return Err(GraphError::mismatch(
                "assign",
                format!("cannot store {} in a {} accumulator", value.ty(), self.ty),
            ));
        };
        Ok(())
    }

    pub fn add_assign(&mut self, value: impl Into<Node>) -> Result<(), GraphError> {
        self.compound(BinaryOp::Add, value.into())
    }

    pub fn sub_assign(&mut self, value: impl Into<Node>) -> Result<(), GraphError> {
        self.compound(BinaryOp::Sub, value.into())
    }

    pub fn mul_assign(&mut self, value: impl Into<Node>) -> Result<(), GraphError> {
        self.compound(BinaryOp::Mul, value.into())
    }

    pub fn div_assign(&mut self, value: impl Into<Node>) -> Result<(), GraphError> {
        self.compound(BinaryOp::Div, value.into())
    }

    fn compound(&mut self, op: BinaryOp, value: Node) -> Result<(), GraphError> {
        let next = Node::try_binary(op, &self.current, &value)?;
        self.assign(next)
    }
}

/// Builds a fold with `N` accumulators seeded from `init`.
///
/// Range bounds must be float or int (ints are converted). Errors raised by
/// the body propagate unchanged.
pub fn fold<const N: usize, F>(
    range: LoopRange,
    init: [Node; N],
    body: F,
) -> Result<[Node; N], GraphError>
where
    F: FnOnce(&Node, &mut [Accumulator; N]) -> Result<(), GraphError>,
{
    for bound in [&range.start, &range.end] {
        if !matches!(bound.ty(), ValueType::Int | ValueType::Float) {
            return Err(GraphError::mismatch(
                "fold",
                format!("loop bound is {}, expected int or float", bound.ty()),
            ));
        }
    }
    let start = range.start.try_cast(ValueType::Float)?;
    let end = range.end.try_cast(ValueType::Float)?;
    let id = next_fold_id();

    let index = Node::new(ValueType::Float, NodeKind::LoopIndex { fold: id });
    let mut accumulators: [Accumulator; N] = std::array::from_fn(|slot| {
        let ty = init[slot].ty();
        Accumulator {
            ty,
            current: Node::new(ty, NodeKind::Slot { fold: id, index: slot }),
        }
    });

    body(&index, &mut accumulators)?;

    let fold = Arc::new(Fold {
        id,
        start,
        end,
        inclusive: range.inclusive,
        init: init.to_vec(),
        next: accumulators.into_iter().map(|acc| acc.current).collect(),
    });
    tracing::trace!(fold = id, accumulators = N, "built fold");

    Ok(std::array::from_fn(|slot| {
        Node::new(
            init[slot].ty(),
            NodeKind::FoldOutput {
                fold: Arc::clone(&fold),
                index: slot,
            },
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{float, uv};

    #[test]
    fn outputs_carry_accumulator_types() {
        let [sum, offset] = fold(
            LoopRange::new(0.0, 4.0),
            [float(0.0), uv()],
            |i, [sum, offset]| {
                sum.add_assign(i)?;
                offset.add_assign(1.0)?;
                Ok(())
            },
        )
        .expect("fold builds");
        assert_eq!(sum.ty(), ValueType::Float);
        assert_eq!(offset.ty(), ValueType::Vec2);
        assert!(sum.free_folds().is_empty());
        assert!(offset.depends_on_uv());
    }

    #[test]
    fn assign_splats_scalars_into_vectors() {
        let [value] = fold(LoopRange::new(0.0, 1.0), [uv()], |_, [value]| {
            value.assign(float(0.5))
        })
        .expect("fold builds");
        let NodeKind::FoldOutput { fold, .. } = value.kind() else {
            panic!("expected fold output");
        };
        assert!(matches!(fold.next()[0].kind(), NodeKind::Splat(_)));
    }

    #[test]
    fn assign_rejects_type_changes() {
        let err = fold(LoopRange::new(0.0, 1.0), [float(0.0)], |_, [value]| {
            value.assign(uv())
        })
        .unwrap_err();
        assert!(matches!(err, GraphError::TypeMismatch { op: "assign", .. }));
    }

    #[test]
    fn body_nodes_reference_their_fold() {
        let mut captured = None;
        fold(LoopRange::new(0.0, 2.0), [float(1.0)], |i, [acc]| {
            let next = acc.get() * i;
            captured = Some(next.clone());
            acc.assign(next)
        })
        .expect("fold builds");
        let body = captured.expect("body ran");
        assert_eq!(body.free_folds().len(), 1);
    }

    #[test]
    fn bool_bounds_are_rejected() {
        let err = fold(
            LoopRange::new(0.0, uv().x().gt(0.5)),
            [float(0.0)],
            |_, _| Ok(()),
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::TypeMismatch { op: "fold", .. }));
    }
}
