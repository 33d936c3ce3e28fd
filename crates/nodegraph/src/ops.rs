//! Operator overloads and method sugar over the `try_*` constructors.
//!
//! These forms panic with the `GraphError` message on a type mismatch: a
//! mistyped graph is a programming error in the sketch or library building
//! it. Library entry points validate caller-supplied nodes with
//! `expect_type` first, so the sugar below never panics on their behalf.
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

use crate::error::GraphError;
use crate::node::{BinaryOp, Intrinsic, Node, Table, UnaryOp};
use crate::types::ValueType;

fn built(result: Result<Node, GraphError>) -> Node {
    match result {
        Ok(node) => node,
        Err(err) => panic!("{err}"),
    }
}

macro_rules! binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<T: Into<Node>> $trait<T> for Node {
            type Output = Node;

            fn $method(self, rhs: T) -> Node {
                built(Node::try_binary($op, &self, &rhs.into()))
            }
        }

        impl<T: Into<Node>> $trait<T> for &Node {
            type Output = Node;

            fn $method(self, rhs: T) -> Node {
                built(Node::try_binary($op, self, &rhs.into()))
            }
        }

        impl $trait<Node> for f32 {
            type Output = Node;

            fn $method(self, rhs: Node) -> Node {
                built(Node::try_binary($op, &Node::from(self), &rhs))
            }
        }

        impl $trait<&Node> for f32 {
            type Output = Node;

            fn $method(self, rhs: &Node) -> Node {
                built(Node::try_binary($op, &Node::from(self), rhs))
            }
        }
    };
}

binary_operator!(Add, add, BinaryOp::Add);
binary_operator!(Sub, sub, BinaryOp::Sub);
binary_operator!(Mul, mul, BinaryOp::Mul);
binary_operator!(Div, div, BinaryOp::Div);
binary_operator!(Rem, rem, BinaryOp::Rem);

impl Neg for Node {
    type Output = Node;

    fn neg(self) -> Node {
        built(Node::try_unary(UnaryOp::Neg, &self))
    }
}

impl Neg for &Node {
    type Output = Node;

    fn neg(self) -> Node {
        built(Node::try_unary(UnaryOp::Neg, self))
    }
}

impl Node {
    fn call(&self, intrinsic: Intrinsic) -> Node {
        built(Node::try_call(intrinsic, std::slice::from_ref(self)))
    }

    fn call2(&self, intrinsic: Intrinsic, other: impl Into<Node>) -> Node {
        built(Node::try_call(intrinsic, &[self.clone(), other.into()]))
    }

    fn compare(&self, op: BinaryOp, other: impl Into<Node>) -> Node {
        built(Node::try_binary(op, self, &other.into()))
    }

    pub fn swizzle(&self, pattern: &str) -> Node {
        built(self.try_swizzle(pattern))
    }

    pub fn x(&self) -> Node {
        self.swizzle("x")
    }

    pub fn y(&self) -> Node {
        self.swizzle("y")
    }

    pub fn z(&self) -> Node {
        self.swizzle("z")
    }

    pub fn w(&self) -> Node {
        self.swizzle("w")
    }

    pub fn xy(&self) -> Node {
        self.swizzle("xy")
    }

    pub fn xyz(&self) -> Node {
        self.swizzle("xyz")
    }

    pub fn rgb(&self) -> Node {
        self.swizzle("rgb")
    }

    pub fn column(&self, index: u8) -> Node {
        built(self.try_column(index))
    }

    pub fn abs(&self) -> Node {
        self.call(Intrinsic::Abs)
    }

    pub fn sign(&self) -> Node {
        self.call(Intrinsic::Sign)
    }

    pub fn floor(&self) -> Node {
        self.call(Intrinsic::Floor)
    }

    pub fn ceil(&self) -> Node {
        self.call(Intrinsic::Ceil)
    }

    pub fn fract(&self) -> Node {
        self.call(Intrinsic::Fract)
    }

    pub fn sin(&self) -> Node {
        self.call(Intrinsic::Sin)
    }

    pub fn cos(&self) -> Node {
        self.call(Intrinsic::Cos)
    }

    pub fn tan(&self) -> Node {
        self.call(Intrinsic::Tan)
    }

    pub fn asin(&self) -> Node {
        self.call(Intrinsic::Asin)
    }

    pub fn acos(&self) -> Node {
        self.call(Intrinsic::Acos)
    }

    pub fn atan(&self) -> Node {
        self.call(Intrinsic::Atan)
    }

    pub fn exp(&self) -> Node {
        self.call(Intrinsic::Exp)
    }

    /// Natural logarithm.
    pub fn log(&self) -> Node {
        self.call(Intrinsic::Log)
    }

    pub fn sqrt(&self) -> Node {
        self.call(Intrinsic::Sqrt)
    }

    pub fn length(&self) -> Node {
        self.call(Intrinsic::Length)
    }

    pub fn normalize(&self) -> Node {
        self.call(Intrinsic::Normalize)
    }

    pub fn one_minus(&self) -> Node {
        1.0 - self
    }

    pub fn pow(&self, exponent: impl Into<Node>) -> Node {
        self.call2(Intrinsic::Pow, exponent)
    }

    pub fn min(&self, other: impl Into<Node>) -> Node {
        self.call2(Intrinsic::Min, other)
    }

    pub fn max(&self, other: impl Into<Node>) -> Node {
        self.call2(Intrinsic::Max, other)
    }

    pub fn clamp(&self, low: impl Into<Node>, high: impl Into<Node>) -> Node {
        built(Node::try_call(
            Intrinsic::Clamp,
            &[self.clone(), low.into(), high.into()],
        ))
    }

    pub fn dot(&self, other: impl Into<Node>) -> Node {
        self.call2(Intrinsic::Dot, other)
    }

    pub fn cross(&self, other: impl Into<Node>) -> Node {
        self.call2(Intrinsic::Cross, other)
    }

    pub fn distance(&self, other: impl Into<Node>) -> Node {
        self.call2(Intrinsic::Distance, other)
    }

    pub fn reflect(&self, normal: impl Into<Node>) -> Node {
        self.call2(Intrinsic::Reflect, normal)
    }

    pub fn lt(&self, other: impl Into<Node>) -> Node {
        self.compare(BinaryOp::Lt, other)
    }

    pub fn le(&self, other: impl Into<Node>) -> Node {
        self.compare(BinaryOp::Le, other)
    }

    pub fn gt(&self, other: impl Into<Node>) -> Node {
        self.compare(BinaryOp::Gt, other)
    }

    pub fn ge(&self, other: impl Into<Node>) -> Node {
        self.compare(BinaryOp::Ge, other)
    }

    pub fn eq(&self, other: impl Into<Node>) -> Node {
        self.compare(BinaryOp::Eq, other)
    }

    pub fn ne(&self, other: impl Into<Node>) -> Node {
        self.compare(BinaryOp::Ne, other)
    }

    pub fn and(&self, other: impl Into<Node>) -> Node {
        self.compare(BinaryOp::And, other)
    }

    pub fn or(&self, other: impl Into<Node>) -> Node {
        self.compare(BinaryOp::Or, other)
    }

    pub fn not(&self) -> Node {
        built(Node::try_unary(UnaryOp::Not, self))
    }

    pub fn to_int(&self) -> Node {
        built(self.try_cast(ValueType::Int))
    }

    pub fn to_float(&self) -> Node {
        built(self.try_cast(ValueType::Float))
    }

    /// Appends one lane, e.g. `rgb.extend(1.0)` for an opaque vec4.
    pub fn extend(&self, lane: impl Into<Node>) -> Node {
        let target = ValueType::float_with_lanes(self.ty().lanes() + 1).unwrap_or(ValueType::Mat2);
        built(Node::try_construct(target, &[self.clone(), lane.into()]))
    }
}

pub fn vec2(x: impl Into<Node>, y: impl Into<Node>) -> Node {
    construct(ValueType::Vec2, [x.into(), y.into()])
}

pub fn vec3(x: impl Into<Node>, y: impl Into<Node>, z: impl Into<Node>) -> Node {
    construct(ValueType::Vec3, [x.into(), y.into(), z.into()])
}

pub fn vec4(
    x: impl Into<Node>,
    y: impl Into<Node>,
    z: impl Into<Node>,
    w: impl Into<Node>,
) -> Node {
    construct(ValueType::Vec4, [x.into(), y.into(), z.into(), w.into()])
}

/// Column-major: `(a, b)` is the first column, `(c, d)` the second.
pub fn mat2(a: impl Into<Node>, b: impl Into<Node>, c: impl Into<Node>, d: impl Into<Node>) -> Node {
    construct(ValueType::Mat2, [a.into(), b.into(), c.into(), d.into()])
}

pub fn construct<I>(target: ValueType, parts: I) -> Node
where
    I: IntoIterator,
    I::Item: Into<Node>,
{
    let parts: Vec<Node> = parts.into_iter().map(Into::into).collect();
    built(Node::try_construct(target, &parts))
}

pub fn splat(target: ValueType, x: impl Into<Node>) -> Node {
    built(Node::try_splat(target, &x.into()))
}

pub fn mix(a: impl Into<Node>, b: impl Into<Node>, t: impl Into<Node>) -> Node {
    built(Node::try_call(Intrinsic::Mix, &[a.into(), b.into(), t.into()]))
}

pub fn step(edge: impl Into<Node>, x: impl Into<Node>) -> Node {
    built(Node::try_call(Intrinsic::Step, &[edge.into(), x.into()]))
}

pub fn smoothstep(edge0: impl Into<Node>, edge1: impl Into<Node>, x: impl Into<Node>) -> Node {
    built(Node::try_call(
        Intrinsic::Smoothstep,
        &[edge0.into(), edge1.into(), x.into()],
    ))
}

pub fn atan2(y: impl Into<Node>, x: impl Into<Node>) -> Node {
    built(Node::try_call(Intrinsic::Atan2, &[y.into(), x.into()]))
}

pub fn select(cond: &Node, then: impl Into<Node>, otherwise: impl Into<Node>) -> Node {
    built(Node::try_select(cond, &then.into(), &otherwise.into()))
}

pub fn lookup(table: &Table, index: impl Into<Node>) -> Node {
    built(Node::try_lookup(table, &index.into()))
}

/// Samples input texture `slot` at the screen UV.
pub fn texture(slot: u32) -> Node {
    built(Node::try_sample(slot, &crate::node::uv()))
}
