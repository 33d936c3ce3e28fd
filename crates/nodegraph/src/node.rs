//! Core graph vocabulary: an immutable, reference-counted `Node` plus the
//! tagged `NodeKind` describing what it computes.
//!
//! Types:
//!
//! - `Node` is a cheap-to-clone handle; cloning shares the subgraph, which is
//!   how DAGs are formed. It caches its `ValueType`, the ids of folds whose
//!   slots it reads, and whether it depends on the screen UV.
//! - `NodeKind` enumerates literals, builtins, operators, intrinsic calls,
//!   constructors, swizzles, selects, casts, table lookups, texture samples,
//!   and the three fold-related kinds.
//! - `Table` wraps a constant array (usually `'static`) read by lookup nodes.
//!
//! Functions:
//!
//! - `float`, `int`, `boolean` build literals; `uv`, `time`, `resolution`
//!   build the builtin inputs every consumer must provide.
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::GraphError;
use crate::fold::Fold;
use crate::types::ValueType;

#[derive(Clone)]
pub struct Node(Arc<NodeData>);

struct NodeData {
    ty: ValueType,
    kind: NodeKind,
    folds: Box<[u64]>,
    uv_dependent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i32),
    Float(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Builtin {
    /// Normalised screen coordinate in [0,1]^2, origin bottom-left.
    Uv,
    /// Elapsed seconds.
    Time,
    /// Output size in pixels.
    Resolution,
}

impl Builtin {
    pub fn ty(self) -> ValueType {
        match self {
            Builtin::Uv | Builtin::Resolution => ValueType::Vec2,
            Builtin::Time => ValueType::Float,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Uv => "uv",
            Builtin::Time => "time",
            Builtin::Resolution => "resolution",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Floored modulo for floats (`x - y * floor(x / y)`), truncating for ints.
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Rem => "rem",
            BinaryOp::Lt => "lt",
            BinaryOp::Le => "le",
            BinaryOp::Gt => "gt",
            BinaryOp::Ge => "ge",
            BinaryOp::Eq => "eq",
            BinaryOp::Ne => "ne",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intrinsic {
    Abs,
    Sign,
    Floor,
    Ceil,
    Fract,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Exp,
    Log,
    Sqrt,
    Pow,
    Min,
    Max,
    Clamp,
    Mix,
    Step,
    Smoothstep,
    Length,
    Distance,
    Dot,
    Cross,
    Normalize,
    Reflect,
}

impl Intrinsic {
    /// Builtin function name, shared by WGSL and the graph dump.
    pub fn name(self) -> &'static str {
        match self {
            Intrinsic::Abs => "abs",
            Intrinsic::Sign => "sign",
            Intrinsic::Floor => "floor",
            Intrinsic::Ceil => "ceil",
            Intrinsic::Fract => "fract",
            Intrinsic::Sin => "sin",
            Intrinsic::Cos => "cos",
            Intrinsic::Tan => "tan",
            Intrinsic::Asin => "asin",
            Intrinsic::Acos => "acos",
            Intrinsic::Atan => "atan",
            Intrinsic::Atan2 => "atan2",
            Intrinsic::Exp => "exp",
            Intrinsic::Log => "log",
            Intrinsic::Sqrt => "sqrt",
            Intrinsic::Pow => "pow",
            Intrinsic::Min => "min",
            Intrinsic::Max => "max",
            Intrinsic::Clamp => "clamp",
            Intrinsic::Mix => "mix",
            Intrinsic::Step => "step",
            Intrinsic::Smoothstep => "smoothstep",
            Intrinsic::Length => "length",
            Intrinsic::Distance => "distance",
            Intrinsic::Dot => "dot",
            Intrinsic::Cross => "cross",
            Intrinsic::Normalize => "normalize",
            Intrinsic::Reflect => "reflect",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Intrinsic::Atan2
            | Intrinsic::Pow
            | Intrinsic::Min
            | Intrinsic::Max
            | Intrinsic::Step
            | Intrinsic::Distance
            | Intrinsic::Dot
            | Intrinsic::Cross
            | Intrinsic::Reflect => 2,
            Intrinsic::Clamp | Intrinsic::Mix | Intrinsic::Smoothstep => 3,
            _ => 1,
        }
    }
}

/// Lane selection such as `.zxy`; at most four lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swizzle {
    lanes: [u8; 4],
    len: u8,
}

impl Swizzle {
    /// Accepts `xyzw` or `rgba` letters (not mixed) addressing lanes of `ty`.
    pub fn parse(pattern: &str, ty: ValueType) -> Result<Self, GraphError> {
        let invalid = || GraphError::InvalidSwizzle {
            pattern: pattern.to_string(),
            ty,
        };
        if !ty.is_vector() || pattern.is_empty() || pattern.len() > 4 {
            return Err(invalid());
        }

        let positional = pattern.chars().all(|ch| "xyzw".contains(ch));
        let colour = pattern.chars().all(|ch| "rgba".contains(ch));
        if !positional && !colour {
            return Err(invalid());
        }

        let mut lanes = [0u8; 4];
        for (slot, ch) in pattern.chars().enumerate() {
            let lane = match ch {
                'x' | 'r' => 0,
                'y' | 'g' => 1,
                'z' | 'b' => 2,
                _ => 3,
            };
            if lane >= ty.lanes() {
                return Err(invalid());
            }
            lanes[slot] = lane as u8;
        }

        Ok(Self {
            lanes,
            len: pattern.len() as u8,
        })
    }

    pub fn lanes(&self) -> &[u8] {
        &self.lanes[..self.len as usize]
    }

    pub fn result_type(&self) -> ValueType {
        ValueType::float_with_lanes(self.len as usize).unwrap_or(ValueType::Float)
    }
}

impl fmt::Display for Swizzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lane in self.lanes() {
            let ch = ['x', 'y', 'z', 'w'][*lane as usize];
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}

/// Constant array of floats grouped into elements of `element` type.
#[derive(Clone)]
pub struct Table {
    data: Cow<'static, [f32]>,
    element: ValueType,
}

impl Table {
    pub fn from_static(data: &'static [f32], element: ValueType) -> Result<Self, GraphError> {
        Self::build(Cow::Borrowed(data), element)
    }

    pub fn from_vec(data: Vec<f32>, element: ValueType) -> Result<Self, GraphError> {
        Self::build(Cow::Owned(data), element)
    }

    fn build(data: Cow<'static, [f32]>, element: ValueType) -> Result<Self, GraphError> {
        if !element.is_float_like() {
            return Err(GraphError::InvalidLiteral(format!(
                "lookup tables hold float elements, not {element}"
            )));
        }
        if data.is_empty() || data.len() % element.lanes() != 0 {
            return Err(GraphError::InvalidLiteral(format!(
                "table of {} floats does not divide into {element} elements",
                data.len()
            )));
        }
        if let Some(value) = data.iter().find(|value| !value.is_finite()) {
            return Err(GraphError::InvalidLiteral(format!(
                "table entry {value} is not finite"
            )));
        }
        Ok(Self { data, element })
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.element.lanes()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn element(&self) -> ValueType {
        self.element
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn element_at(&self, index: usize) -> &[f32] {
        let lanes = self.element.lanes();
        &self.data[index * lanes..(index + 1) * lanes]
    }

    pub(crate) fn key(&self) -> (usize, usize) {
        (self.data.as_ptr() as usize, self.data.len())
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Table({} x {})", self.len(), self.element)
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Literal(Literal),
    Builtin(Builtin),
    Unary(UnaryOp, Node),
    Binary(BinaryOp, Node, Node),
    Call(Intrinsic, Vec<Node>),
    /// Vector or matrix assembled from float parts whose lanes add up.
    Construct(Vec<Node>),
    /// Scalar broadcast to every lane of the node's type.
    Splat(Node),
    Swizzle(Node, Swizzle),
    /// Column of a mat2.
    Column(Node, u8),
    Select {
        cond: Node,
        then: Node,
        otherwise: Node,
    },
    /// Conversion to the node's own type.
    Cast(Node),
    Lookup {
        table: Table,
        index: Node,
    },
    Sample {
        slot: u32,
        uv: Node,
    },
    /// Previous-iteration value of a fold accumulator.
    Slot {
        fold: u64,
        index: usize,
    },
    /// Float index of the enclosing fold.
    LoopIndex {
        fold: u64,
    },
    /// Final value of a fold accumulator.
    FoldOutput {
        fold: Arc<Fold>,
        index: usize,
    },
}

impl NodeKind {
    pub fn label(&self) -> String {
        match self {
            NodeKind::Literal(_) => "literal".to_string(),
            NodeKind::Builtin(builtin) => format!("builtin:{}", builtin.name()),
            NodeKind::Unary(UnaryOp::Neg, _) => "unary:neg".to_string(),
            NodeKind::Unary(UnaryOp::Not, _) => "unary:not".to_string(),
            NodeKind::Binary(op, _, _) => format!("binary:{}", op.name()),
            NodeKind::Call(intrinsic, _) => format!("call:{}", intrinsic.name()),
            NodeKind::Construct(_) => "construct".to_string(),
            NodeKind::Splat(_) => "splat".to_string(),
            NodeKind::Swizzle(_, swizzle) => format!("swizzle:{swizzle}"),
            NodeKind::Column(_, index) => format!("column:{index}"),
            NodeKind::Select { .. } => "select".to_string(),
            NodeKind::Cast(_) => "cast".to_string(),
            NodeKind::Lookup { .. } => "lookup".to_string(),
            NodeKind::Sample { slot, .. } => format!("sample:{slot}"),
            NodeKind::Slot { .. } => "slot".to_string(),
            NodeKind::LoopIndex { .. } => "loop_index".to_string(),
            NodeKind::FoldOutput { .. } => "fold_output".to_string(),
        }
    }

    /// Direct inputs. For fold outputs these are the fold's bounds, initial
    /// values and body results.
    pub fn operands(&self) -> Vec<&Node> {
        match self {
            NodeKind::Literal(_)
            | NodeKind::Builtin(_)
            | NodeKind::Slot { .. }
            | NodeKind::LoopIndex { .. } => Vec::new(),
            NodeKind::Unary(_, x)
            | NodeKind::Splat(x)
            | NodeKind::Swizzle(x, _)
            | NodeKind::Column(x, _)
            | NodeKind::Cast(x) => vec![x],
            NodeKind::Binary(_, a, b) => vec![a, b],
            NodeKind::Call(_, args) | NodeKind::Construct(args) => args.iter().collect(),
            NodeKind::Select {
                cond,
                then,
                otherwise,
            } => vec![cond, then, otherwise],
            NodeKind::Lookup { index, .. } => vec![index],
            NodeKind::Sample { uv, .. } => vec![uv],
            NodeKind::FoldOutput { fold, .. } => fold.operands(),
        }
    }

    /// Rebuilds the kind with every direct operand replaced. Fold outputs
    /// are returned unchanged; callers rewrite those through the fold.
    pub(crate) fn map_operands(&self, mut f: impl FnMut(&Node) -> Node) -> NodeKind {
        match self {
            NodeKind::Unary(op, x) => NodeKind::Unary(*op, f(x)),
            NodeKind::Splat(x) => NodeKind::Splat(f(x)),
            NodeKind::Swizzle(x, swizzle) => NodeKind::Swizzle(f(x), *swizzle),
            NodeKind::Column(x, index) => NodeKind::Column(f(x), *index),
            NodeKind::Cast(x) => NodeKind::Cast(f(x)),
            NodeKind::Binary(op, a, b) => NodeKind::Binary(*op, f(a), f(b)),
            NodeKind::Call(intrinsic, args) => {
                NodeKind::Call(*intrinsic, args.iter().map(&mut f).collect())
            }
            NodeKind::Construct(parts) => NodeKind::Construct(parts.iter().map(&mut f).collect()),
            NodeKind::Select {
                cond,
                then,
                otherwise,
            } => NodeKind::Select {
                cond: f(cond),
                then: f(then),
                otherwise: f(otherwise),
            },
            NodeKind::Lookup { table, index } => NodeKind::Lookup {
                table: table.clone(),
                index: f(index),
            },
            NodeKind::Sample { slot, uv } => NodeKind::Sample {
                slot: *slot,
                uv: f(uv),
            },
            other => other.clone(),
        }
    }
}

impl Node {
    /// Wraps an already type-checked kind.
    pub(crate) fn new(ty: ValueType, kind: NodeKind) -> Node {
        let mut folds: Vec<u64> = Vec::new();
        let mut uv_dependent = matches!(kind, NodeKind::Builtin(Builtin::Uv));
        for operand in kind.operands() {
            folds.extend_from_slice(&operand.0.folds);
            uv_dependent |= operand.0.uv_dependent;
        }
        match &kind {
            NodeKind::Slot { fold, .. } | NodeKind::LoopIndex { fold } => folds.push(*fold),
            NodeKind::FoldOutput { fold, .. } => {
                let own = fold.id();
                folds.retain(|id| *id != own);
            }
            _ => {}
        }
        folds.sort_unstable();
        folds.dedup();

        Node(Arc::new(NodeData {
            ty,
            kind,
            folds: folds.into_boxed_slice(),
            uv_dependent,
        }))
    }

    pub fn ty(&self) -> ValueType {
        self.0.ty
    }

    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    /// Ids of folds whose slots or index this node reads without being
    /// enclosed by the fold's output.
    pub fn free_folds(&self) -> &[u64] {
        &self.0.folds
    }

    pub fn depends_on_uv(&self) -> bool {
        self.0.uv_dependent
    }

    /// Identity of the shared allocation; equal for clones of one node.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn as_float_literal(&self) -> Option<f32> {
        match self.kind() {
            NodeKind::Literal(Literal::Float(value)) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({} {})", self.ty(), self.kind().label())
    }
}

pub fn float(value: f32) -> Node {
    Node::new(ValueType::Float, NodeKind::Literal(Literal::Float(value)))
}

pub fn int(value: i32) -> Node {
    Node::new(ValueType::Int, NodeKind::Literal(Literal::Int(value)))
}

pub fn boolean(value: bool) -> Node {
    Node::new(ValueType::Bool, NodeKind::Literal(Literal::Bool(value)))
}

pub fn uv() -> Node {
    builtin(Builtin::Uv)
}

pub fn time() -> Node {
    builtin(Builtin::Time)
}

pub fn resolution() -> Node {
    builtin(Builtin::Resolution)
}

fn builtin(builtin: Builtin) -> Node {
    Node::new(builtin.ty(), NodeKind::Builtin(builtin))
}

impl From<f32> for Node {
    fn from(value: f32) -> Self {
        float(value)
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        int(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        boolean(value)
    }
}

impl From<&Node> for Node {
    fn from(value: &Node) -> Self {
        value.clone()
    }
}

macro_rules! constant_vector {
    ($lanes:literal, $ty:expr) => {
        impl From<[f32; $lanes]> for Node {
            fn from(values: [f32; $lanes]) -> Self {
                Node::new($ty, NodeKind::Construct(values.iter().map(|v| float(*v)).collect()))
            }
        }
    };
}

constant_vector!(2, ValueType::Vec2);
constant_vector!(3, ValueType::Vec3);
constant_vector!(4, ValueType::Vec4);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swizzle_accepts_position_and_colour_sets() {
        let swizzle = Swizzle::parse("zxy", ValueType::Vec3).expect("valid swizzle");
        assert_eq!(swizzle.lanes(), &[2, 0, 1]);
        assert_eq!(swizzle.result_type(), ValueType::Vec3);
        assert_eq!(swizzle.to_string(), "zxy");

        let colour = Swizzle::parse("rg", ValueType::Vec4).expect("valid swizzle");
        assert_eq!(colour.result_type(), ValueType::Vec2);
    }

    #[test]
    fn swizzle_rejects_out_of_range_and_mixed_sets() {
        assert!(matches!(
            Swizzle::parse("z", ValueType::Vec2),
            Err(GraphError::InvalidSwizzle { .. })
        ));
        assert!(Swizzle::parse("xg", ValueType::Vec3).is_err());
        assert!(Swizzle::parse("x", ValueType::Float).is_err());
        assert!(Swizzle::parse("xxxxx", ValueType::Vec4).is_err());
    }

    #[test]
    fn tracks_uv_dependence() {
        let screen = uv();
        assert!(screen.depends_on_uv());
        assert!(!time().depends_on_uv());
        assert!(!float(1.0).depends_on_uv());
    }

    #[test]
    fn table_validates_shape() {
        static DATA: [f32; 6] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let table = Table::from_static(&DATA, ValueType::Vec3).expect("two vec3 elements");
        assert_eq!(table.len(), 2);
        assert_eq!(table.element_at(1), &[3.0, 4.0, 5.0]);
        assert!(Table::from_static(&DATA, ValueType::Vec4).is_err());
        assert!(Table::from_vec(vec![f32::NAN], ValueType::Float).is_err());
    }

    #[test]
    fn clones_share_identity() {
        let a = float(2.0);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.id(), b.id());
        assert!(!a.ptr_eq(&float(2.0)));
    }
}
