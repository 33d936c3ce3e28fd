//! Type-checked constructors. Every `try_*` function validates operand types
//! and returns `GraphError` on mismatch; intrinsics broadcast scalar float
//! arguments to the common vector type by inserting explicit splats.
use crate::error::GraphError;
use crate::node::{BinaryOp, Intrinsic, Node, NodeKind, Swizzle, Table, UnaryOp};
use crate::types::ValueType;

impl Node {
    pub fn try_unary(op: UnaryOp, x: &Node) -> Result<Node, GraphError> {
        let ty = x.ty();
        let valid = match op {
            UnaryOp::Neg => ty.is_numeric(),
            UnaryOp::Not => ty == ValueType::Bool,
        };
        if !valid {
            let name = if op == UnaryOp::Neg { "neg" } else { "not" };
            return Err(GraphError::mismatch(name, format!("operand is {ty}")));
        }
        Ok(Node::new(ty, NodeKind::Unary(op, x.clone())))
    }

    pub fn try_binary(op: BinaryOp, a: &Node, b: &Node) -> Result<Node, GraphError> {
        let ty = binary_type(op, a.ty(), b.ty()).ok_or_else(|| {
            GraphError::mismatch(
                op.name(),
                format!("cannot combine {} with {}", a.ty(), b.ty()),
            )
        })?;
        Ok(Node::new(ty, NodeKind::Binary(op, a.clone(), b.clone())))
    }

    pub fn try_call(intrinsic: Intrinsic, args: &[Node]) -> Result<Node, GraphError> {
        let op = intrinsic.name();
        if args.len() != intrinsic.arity() {
            return Err(GraphError::mismatch(
                op,
                format!("expected {} arguments, got {}", intrinsic.arity(), args.len()),
            ));
        }

        let mut args = args.to_vec();
        let ty = match intrinsic {
            Intrinsic::Abs | Intrinsic::Sign => {
                let ty = args[0].ty();
                if !ty.is_float_like() && ty != ValueType::Int {
                    return Err(GraphError::mismatch(op, format!("operand is {ty}")));
                }
                ty
            }
            Intrinsic::Floor
            | Intrinsic::Ceil
            | Intrinsic::Fract
            | Intrinsic::Sin
            | Intrinsic::Cos
            | Intrinsic::Tan
            | Intrinsic::Asin
            | Intrinsic::Acos
            | Intrinsic::Atan
            | Intrinsic::Exp
            | Intrinsic::Log
            | Intrinsic::Sqrt => {
                let ty = args[0].ty();
                if !ty.is_float_like() {
                    return Err(GraphError::mismatch(op, format!("operand is {ty}")));
                }
                ty
            }
            Intrinsic::Normalize => {
                let ty = args[0].ty();
                if !ty.is_vector() {
                    return Err(GraphError::mismatch(op, format!("operand is {ty}")));
                }
                ty
            }
            Intrinsic::Length => {
                let ty = args[0].ty();
                if !ty.is_float_like() {
                    return Err(GraphError::mismatch(op, format!("operand is {ty}")));
                }
                ValueType::Float
            }
            Intrinsic::Distance => {
                unify(op, &mut args, false)?;
                ValueType::Float
            }
            Intrinsic::Dot | Intrinsic::Reflect => {
                let (a, b) = (args[0].ty(), args[1].ty());
                if a != b || !a.is_vector() {
                    return Err(GraphError::mismatch(
                        op,
                        format!("operands are {a} and {b}; expected matching vectors"),
                    ));
                }
                if intrinsic == Intrinsic::Dot {
                    ValueType::Float
                } else {
                    a
                }
            }
            Intrinsic::Cross => {
                let (a, b) = (args[0].ty(), args[1].ty());
                if a != ValueType::Vec3 || b != ValueType::Vec3 {
                    return Err(GraphError::mismatch(
                        op,
                        format!("operands are {a} and {b}; expected vec3"),
                    ));
                }
                ValueType::Vec3
            }
            Intrinsic::Min | Intrinsic::Max | Intrinsic::Clamp => unify(op, &mut args, true)?,
            Intrinsic::Atan2
            | Intrinsic::Pow
            | Intrinsic::Step
            | Intrinsic::Mix
            | Intrinsic::Smoothstep => unify(op, &mut args, false)?,
        };

        Ok(Node::new(ty, NodeKind::Call(intrinsic, args)))
    }

    pub fn try_swizzle(&self, pattern: &str) -> Result<Node, GraphError> {
        let swizzle = Swizzle::parse(pattern, self.ty())?;
        Ok(Node::new(
            swizzle.result_type(),
            NodeKind::Swizzle(self.clone(), swizzle),
        ))
    }

    pub fn try_column(&self, index: u8) -> Result<Node, GraphError> {
        if self.ty() != ValueType::Mat2 || index > 1 {
            return Err(GraphError::mismatch(
                "column",
                format!("cannot take column {index} of {}", self.ty()),
            ));
        }
        Ok(Node::new(ValueType::Vec2, NodeKind::Column(self.clone(), index)))
    }

    pub fn try_cast(&self, target: ValueType) -> Result<Node, GraphError> {
        let valid_target = matches!(target, ValueType::Int | ValueType::Float);
        if !valid_target || !self.ty().is_scalar() {
            return Err(GraphError::mismatch(
                "cast",
                format!("cannot convert {} to {target}", self.ty()),
            ));
        }
        if self.ty() == target {
            return Ok(self.clone());
        }
        Ok(Node::new(target, NodeKind::Cast(self.clone())))
    }

    pub fn try_splat(target: ValueType, x: &Node) -> Result<Node, GraphError> {
        if x.ty() != ValueType::Float {
            return Err(GraphError::InvalidConstruct {
                target,
                detail: format!("a {} (splat needs a float)", x.ty()),
            });
        }
        if target == ValueType::Float {
            return Ok(x.clone());
        }
        if !target.is_vector() {
            return Err(GraphError::InvalidConstruct {
                target,
                detail: "a float splat".to_string(),
            });
        }
        Ok(Node::new(target, NodeKind::Splat(x.clone())))
    }

    /// Assembles a vector or mat2 from float parts; a single float part is a
    /// splat. Mat2 takes four floats or two vec2 columns.
    pub fn try_construct(target: ValueType, parts: &[Node]) -> Result<Node, GraphError> {
        let describe = || {
            parts
                .iter()
                .map(|part| part.ty().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };

        if let [single] = parts {
            if single.ty() == ValueType::Float && target.is_vector() {
                return Node::try_splat(target, single);
            }
            if single.ty() == target {
                return Ok(single.clone());
            }
        }

        let all_float_like = parts.iter().all(|part| part.ty().is_float_like());
        let lanes: usize = parts.iter().map(|part| part.ty().lanes()).sum();
        let shape_ok = match target {
            ValueType::Vec2 | ValueType::Vec3 | ValueType::Vec4 => {
                all_float_like && lanes == target.lanes()
            }
            ValueType::Mat2 => {
                parts.len() == 4 && parts.iter().all(|part| part.ty() == ValueType::Float)
                    || parts.len() == 2 && parts.iter().all(|part| part.ty() == ValueType::Vec2)
            }
            _ => false,
        };
        if !shape_ok {
            return Err(GraphError::InvalidConstruct {
                target,
                detail: format!("({})", describe()),
            });
        }

        Ok(Node::new(target, NodeKind::Construct(parts.to_vec())))
    }

    pub fn try_select(cond: &Node, then: &Node, otherwise: &Node) -> Result<Node, GraphError> {
        if cond.ty() != ValueType::Bool {
            return Err(GraphError::mismatch(
                "select",
                format!("condition is {}, expected bool", cond.ty()),
            ));
        }
        let (then, otherwise) = if then.ty() == otherwise.ty() {
            (then.clone(), otherwise.clone())
        } else {
            let mut pair = [then.clone(), otherwise.clone()];
            unify("select", &mut pair, false)?;
            let [then, otherwise] = pair;
            (then, otherwise)
        };
        Ok(Node::new(
            then.ty(),
            NodeKind::Select {
                cond: cond.clone(),
                then,
                otherwise,
            },
        ))
    }

    /// Reads element `floor(index)` of `table`, clamped to the table bounds.
    pub fn try_lookup(table: &Table, index: &Node) -> Result<Node, GraphError> {
        if !matches!(index.ty(), ValueType::Int | ValueType::Float) {
            return Err(GraphError::mismatch(
                "lookup",
                format!("index is {}, expected int or float", index.ty()),
            ));
        }
        Ok(Node::new(
            table.element(),
            NodeKind::Lookup {
                table: table.clone(),
                index: index.clone(),
            },
        ))
    }

    /// Samples input texture `slot` at `uv`, returning vec4.
    pub fn try_sample(slot: u32, uv: &Node) -> Result<Node, GraphError> {
        if uv.ty() != ValueType::Vec2 {
            return Err(GraphError::mismatch(
                "sample",
                format!("coordinate is {}, expected vec2", uv.ty()),
            ));
        }
        Ok(Node::new(
            ValueType::Vec4,
            NodeKind::Sample {
                slot,
                uv: uv.clone(),
            },
        ))
    }
}

/// Fails with `TypeMismatch` unless `node` has one of `expected`.
pub fn expect_type(
    node: &Node,
    expected: &[ValueType],
    op: &'static str,
) -> Result<(), GraphError> {
    if expected.contains(&node.ty()) {
        return Ok(());
    }
    let wanted = expected
        .iter()
        .map(|ty| ty.to_string())
        .collect::<Vec<_>>()
        .join(" or ");
    Err(GraphError::mismatch(
        op,
        format!("got {}, expected {wanted}", node.ty()),
    ))
}

fn binary_type(op: BinaryOp, a: ValueType, b: ValueType) -> Option<ValueType> {
    use ValueType::*;
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Div | BinaryOp::Rem => match (a, b) {
            (Mat2, Mat2) if matches!(op, BinaryOp::Add | BinaryOp::Sub) => Some(Mat2),
            (x, y) if x == y && (x == Int || x.is_float_like()) => Some(x),
            (Float, v) | (v, Float) if v.is_vector() => Some(v),
            _ => None,
        },
        BinaryOp::Mul => match (a, b) {
            (x, y) if x == y && x != Bool => Some(x),
            (Float, v) | (v, Float) if v.is_vector() || v == Mat2 => Some(v),
            (Mat2, Vec2) | (Vec2, Mat2) => Some(Vec2),
            _ => None,
        },
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            (a == b && matches!(a, Int | Float)).then_some(Bool)
        }
        BinaryOp::Eq | BinaryOp::Ne => (a == b && a.is_scalar()).then_some(Bool),
        BinaryOp::And | BinaryOp::Or => (a == Bool && b == Bool).then_some(Bool),
    }
}

/// Brings intrinsic arguments to one type, splatting float scalars up to the
/// single vector type present. `allow_int` admits all-int argument lists.
fn unify(op: &'static str, args: &mut [Node], allow_int: bool) -> Result<ValueType, GraphError> {
    let describe = |args: &[Node]| {
        args.iter()
            .map(|arg| arg.ty().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    if allow_int && args.iter().all(|arg| arg.ty() == ValueType::Int) {
        return Ok(ValueType::Int);
    }
    if !args.iter().all(|arg| arg.ty().is_float_like()) {
        return Err(GraphError::mismatch(
            op,
            format!("unsupported operands ({})", describe(args)),
        ));
    }

    let mut target = ValueType::Float;
    for arg in args.iter() {
        let ty = arg.ty();
        if ty.is_vector() {
            if target.is_vector() && target != ty {
                return Err(GraphError::mismatch(
                    op,
                    format!("mixed vector widths ({})", describe(args)),
                ));
            }
            target = ty;
        }
    }

    if target.is_vector() {
        for arg in args.iter_mut() {
            if arg.ty() == ValueType::Float {
                *arg = Node::new(target, NodeKind::Splat(arg.clone()));
            }
        }
    }
    Ok(target)
}
