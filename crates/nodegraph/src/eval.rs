//! Reference CPU interpreter.
//!
//! Types:
//!
//! - `Value` holds up to four `f32` lanes tagged with a `ValueType`; ints and
//!   bools are stored in lane 0.
//! - `EvalContext` supplies the builtin inputs for one fragment and an
//!   optional `TextureSource`.
//! - `Evaluator` caches results per node so shared subgraphs are computed
//!   once per scope. Loop-dependent nodes are cached in the frame of the
//!   innermost fold they read, which discards them every iteration.
//!
//! Functions:
//!
//! - `evaluate` is the one-shot entry point used by tests.
//! - `Evaluator::eval` reuses the evaluator's allocations across pixels.
use std::collections::HashMap;

use crate::error::EvalError;
use crate::fold::Fold;
use crate::node::{BinaryOp, Builtin, Intrinsic, Literal, Node, NodeKind, UnaryOp};
use crate::types::ValueType;

pub const DEFAULT_ITERATION_LIMIT: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Value {
    ty: ValueType,
    lanes: [f32; 4],
}

impl Value {
    pub fn new(ty: ValueType, lanes: [f32; 4]) -> Self {
        Self { ty, lanes }
    }

    pub fn float(value: f32) -> Self {
        Self::new(ValueType::Float, [value, 0.0, 0.0, 0.0])
    }

    pub fn int(value: i32) -> Self {
        Self::new(ValueType::Int, [value as f32, 0.0, 0.0, 0.0])
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ValueType::Bool, [if value { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0])
    }

    pub fn vec2(v: [f32; 2]) -> Self {
        Self::new(ValueType::Vec2, [v[0], v[1], 0.0, 0.0])
    }

    pub fn vec3(v: [f32; 3]) -> Self {
        Self::new(ValueType::Vec3, [v[0], v[1], v[2], 0.0])
    }

    pub fn vec4(v: [f32; 4]) -> Self {
        Self::new(ValueType::Vec4, v)
    }

    pub fn ty(&self) -> ValueType {
        self.ty
    }

    /// Active lanes only.
    pub fn lanes(&self) -> &[f32] {
        &self.lanes[..self.ty.lanes()]
    }

    pub fn as_f32(&self) -> f32 {
        self.lanes[0]
    }

    pub fn as_bool(&self) -> bool {
        self.lanes[0] != 0.0
    }

    /// Colour view used by image export: floats are grey, vec3 is opaque.
    pub fn to_rgba(&self) -> [f32; 4] {
        match self.ty {
            ValueType::Vec4 => self.lanes,
            ValueType::Vec3 => [self.lanes[0], self.lanes[1], self.lanes[2], 1.0],
            ValueType::Vec2 => [self.lanes[0], self.lanes[1], 0.0, 1.0],
            _ => [self.lanes[0], self.lanes[0], self.lanes[0], 1.0],
        }
    }

    fn map(self, f: impl Fn(f32) -> f32) -> Value {
        let mut lanes = self.lanes;
        for lane in lanes.iter_mut().take(self.ty.lanes()) {
            *lane = f(*lane);
        }
        Value::new(self.ty, lanes)
    }

    /// Componentwise combination; a one-lane operand broadcasts.
    fn zip(self, other: Value, ty: ValueType, f: impl Fn(f32, f32) -> f32) -> Value {
        let mut lanes = [0.0; 4];
        for (lane, out) in lanes.iter_mut().enumerate().take(ty.lanes()) {
            *out = f(self.lane(lane), other.lane(lane));
        }
        Value::new(ty, lanes)
    }

    fn lane(&self, index: usize) -> f32 {
        if self.ty.lanes() == 1 {
            self.lanes[0]
        } else {
            self.lanes[index]
        }
    }
}

/// Source of texels for `Sample` nodes.
pub trait TextureSource {
    fn sample(&self, slot: u32, uv: [f32; 2]) -> Option<[f32; 4]>;
}

#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    pub uv: [f32; 2],
    pub time: f32,
    pub resolution: [f32; 2],
    pub textures: Option<&'a dyn TextureSource>,
    pub iteration_limit: u64,
}

impl<'a> EvalContext<'a> {
    pub fn new(uv: [f32; 2], time: f32, resolution: [f32; 2]) -> Self {
        Self {
            uv,
            time,
            resolution,
            textures: None,
            iteration_limit: DEFAULT_ITERATION_LIMIT,
        }
    }

    pub fn with_textures(mut self, textures: &'a dyn TextureSource) -> Self {
        self.textures = Some(textures);
        self
    }

    pub fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.iteration_limit = limit;
        self
    }
}

pub fn evaluate(node: &Node, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Evaluator::default().eval(node, ctx)
}

#[derive(Default)]
struct Scope {
    values: HashMap<usize, Value>,
    folds: HashMap<usize, Vec<Value>>,
}

struct Frame {
    fold: u64,
    index: f32,
    slots: Vec<Value>,
    scope: Scope,
}

#[derive(Default)]
pub struct Evaluator {
    global: Scope,
    frames: Vec<Frame>,
    iterations: u64,
}

impl Evaluator {
    pub fn eval(&mut self, node: &Node, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        self.global.values.clear();
        self.global.folds.clear();
        self.frames.clear();
        self.iterations = 0;
        self.value(node, ctx)
    }

    /// Index into `frames` of the innermost fold `node` reads, or `None` for
    /// loop-invariant nodes.
    fn frame_for(&self, node: &Node) -> Result<Option<usize>, EvalError> {
        let folds = node.free_folds();
        if folds.is_empty() {
            return Ok(None);
        }
        self.frames
            .iter()
            .rposition(|frame| folds.contains(&frame.fold))
            .map(Some)
            .ok_or(EvalError::UnboundSlot { fold: folds[0] })
    }

    fn scope(&mut self, frame: Option<usize>) -> &mut Scope {
        match frame {
            Some(index) => &mut self.frames[index].scope,
            None => &mut self.global,
        }
    }

    fn value(&mut self, node: &Node, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        let frame = self.frame_for(node)?;
        if let Some(value) = self.scope(frame).values.get(&node.id()) {
            return Ok(*value);
        }
        let value = self.compute(node, ctx)?;
        self.scope(frame).values.insert(node.id(), value);
        Ok(value)
    }

    fn compute(&mut self, node: &Node, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        let ty = node.ty();
        let value = match node.kind() {
            NodeKind::Literal(Literal::Float(v)) => Value::float(*v),
            NodeKind::Literal(Literal::Int(v)) => Value::int(*v),
            NodeKind::Literal(Literal::Bool(v)) => Value::bool(*v),
            NodeKind::Builtin(Builtin::Uv) => Value::vec2(ctx.uv),
            NodeKind::Builtin(Builtin::Time) => Value::float(ctx.time),
            NodeKind::Builtin(Builtin::Resolution) => Value::vec2(ctx.resolution),
            NodeKind::Unary(op, x) => {
                let x = self.value(x, ctx)?;
                match op {
                    UnaryOp::Neg => x.map(|v| -v),
                    UnaryOp::Not => Value::bool(!x.as_bool()),
                }
            }
            NodeKind::Binary(op, a, b) => {
                let a = self.value(a, ctx)?;
                let b = self.value(b, ctx)?;
                binary(*op, a, b, ty)
            }
            NodeKind::Call(intrinsic, args) => {
                let mut values = [Value::float(0.0); 3];
                for (slot, arg) in args.iter().enumerate() {
                    values[slot] = self.value(arg, ctx)?;
                }
                call(*intrinsic, &values[..args.len()], ty)
            }
            NodeKind::Construct(parts) => {
                let mut lanes = [0.0; 4];
                let mut cursor = 0;
                for part in parts {
                    let part = self.value(part, ctx)?;
                    for lane in part.lanes() {
                        lanes[cursor] = *lane;
                        cursor += 1;
                    }
                }
                Value::new(ty, lanes)
            }
            NodeKind::Splat(x) => {
                let x = self.value(x, ctx)?.as_f32();
                Value::new(ty, [x; 4])
            }
            NodeKind::Swizzle(x, swizzle) => {
                let x = self.value(x, ctx)?;
                let mut lanes = [0.0; 4];
                for (out, lane) in lanes.iter_mut().zip(swizzle.lanes()) {
                    *out = x.lanes[*lane as usize];
                }
                Value::new(ty, lanes)
            }
            NodeKind::Column(m, index) => {
                let m = self.value(m, ctx)?;
                let base = *index as usize * 2;
                Value::vec2([m.lanes[base], m.lanes[base + 1]])
            }
            NodeKind::Select {
                cond,
                then,
                otherwise,
            } => {
                if self.value(cond, ctx)?.as_bool() {
                    self.value(then, ctx)?
                } else {
                    self.value(otherwise, ctx)?
                }
            }
            NodeKind::Cast(x) => {
                let x = self.value(x, ctx)?.as_f32();
                match ty {
                    ValueType::Int => Value::int(truncate_to_int(x)),
                    _ => Value::float(x),
                }
            }
            NodeKind::Lookup { table, index } => {
                let raw = self.value(index, ctx)?.as_f32().floor();
                let last = (table.len() - 1) as f32;
                let clamped = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, last) };
                let element = table.element_at(clamped as usize);
                let mut lanes = [0.0; 4];
                lanes[..element.len()].copy_from_slice(element);
                Value::new(ty, lanes)
            }
            NodeKind::Sample { slot, uv } => {
                let coord = self.value(uv, ctx)?;
                let texel = ctx
                    .textures
                    .and_then(|source| source.sample(*slot, [coord.lanes[0], coord.lanes[1]]))
                    .ok_or(EvalError::MissingTexture(*slot))?;
                Value::vec4(texel)
            }
            NodeKind::Slot { fold, index } => {
                let frame = self
                    .frames
                    .iter()
                    .rev()
                    .find(|frame| frame.fold == *fold)
                    .ok_or(EvalError::UnboundSlot { fold: *fold })?;
                frame.slots[*index]
            }
            NodeKind::LoopIndex { fold } => {
                let frame = self
                    .frames
                    .iter()
                    .rev()
                    .find(|frame| frame.fold == *fold)
                    .ok_or(EvalError::UnboundSlot { fold: *fold })?;
                Value::float(frame.index)
            }
            NodeKind::FoldOutput { fold, index } => {
                let outputs = self.fold_outputs(node, fold, ctx)?;
                outputs[*index]
            }
        };
        Ok(value)
    }

    fn fold_outputs(
        &mut self,
        node: &Node,
        fold: &std::sync::Arc<Fold>,
        ctx: &EvalContext<'_>,
    ) -> Result<Vec<Value>, EvalError> {
        let key = std::sync::Arc::as_ptr(fold) as usize;
        let frame = self.frame_for(node)?;
        if let Some(outputs) = self.scope(frame).folds.get(&key) {
            return Ok(outputs.clone());
        }

        let start = self.value(fold.start(), ctx)?.as_f32();
        let end = self.value(fold.end(), ctx)?.as_f32();
        let mut slots = fold
            .init()
            .iter()
            .map(|init| self.value(init, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        let mut index = start;
        while (fold.inclusive() && index <= end) || (!fold.inclusive() && index < end) {
            self.iterations += 1;
            if self.iterations > ctx.iteration_limit {
                return Err(EvalError::IterationLimit {
                    limit: ctx.iteration_limit,
                });
            }

            self.frames.push(Frame {
                fold: fold.id(),
                index,
                slots,
                scope: Scope::default(),
            });
            let next = fold
                .next()
                .iter()
                .map(|body| self.value(body, ctx))
                .collect::<Result<Vec<_>, _>>();
            self.frames.pop();
            slots = next?;
            index += 1.0;
        }

        self.scope(frame).folds.insert(key, slots.clone());
        Ok(slots)
    }
}

fn truncate_to_int(x: f32) -> i32 {
    if x.is_nan() {
        0
    } else {
        x.trunc() as i32
    }
}

fn binary(op: BinaryOp, a: Value, b: Value, ty: ValueType) -> Value {
    let int = a.ty == ValueType::Int;
    match op {
        BinaryOp::Add => a.zip(b, ty, |x, y| x + y),
        BinaryOp::Sub => a.zip(b, ty, |x, y| x - y),
        BinaryOp::Mul => multiply(a, b, ty),
        BinaryOp::Div if int => a.zip(b, ty, |x, y| if y == 0.0 { x } else { (x / y).trunc() }),
        BinaryOp::Div => a.zip(b, ty, |x, y| x / y),
        BinaryOp::Rem if int => a.zip(b, ty, |x, y| if y == 0.0 { 0.0 } else { x % y }),
        BinaryOp::Rem => a.zip(b, ty, |x, y| x - y * (x / y).floor()),
        BinaryOp::Lt => Value::bool(a.as_f32() < b.as_f32()),
        BinaryOp::Le => Value::bool(a.as_f32() <= b.as_f32()),
        BinaryOp::Gt => Value::bool(a.as_f32() > b.as_f32()),
        BinaryOp::Ge => Value::bool(a.as_f32() >= b.as_f32()),
        BinaryOp::Eq => Value::bool(a.as_f32() == b.as_f32()),
        BinaryOp::Ne => Value::bool(a.as_f32() != b.as_f32()),
        BinaryOp::And => Value::bool(a.as_bool() && b.as_bool()),
        BinaryOp::Or => Value::bool(a.as_bool() || b.as_bool()),
    }
}

/// Matrices are column-major: lanes are `[c0.x, c0.y, c1.x, c1.y]`.
fn multiply(a: Value, b: Value, ty: ValueType) -> Value {
    match (a.ty, b.ty) {
        (ValueType::Mat2, ValueType::Vec2) => {
            let (m, v) = (a.lanes, b.lanes);
            Value::vec2([m[0] * v[0] + m[2] * v[1], m[1] * v[0] + m[3] * v[1]])
        }
        (ValueType::Vec2, ValueType::Mat2) => {
            let (v, m) = (a.lanes, b.lanes);
            Value::vec2([v[0] * m[0] + v[1] * m[1], v[0] * m[2] + v[1] * m[3]])
        }
        (ValueType::Mat2, ValueType::Mat2) => {
            let (x, y) = (a.lanes, b.lanes);
            Value::new(
                ValueType::Mat2,
                [
                    x[0] * y[0] + x[2] * y[1],
                    x[1] * y[0] + x[3] * y[1],
                    x[0] * y[2] + x[2] * y[3],
                    x[1] * y[2] + x[3] * y[3],
                ],
            )
        }
        _ => a.zip(b, ty, |x, y| x * y),
    }
}

fn call(intrinsic: Intrinsic, args: &[Value], ty: ValueType) -> Value {
    let a = args[0];
    match intrinsic {
        Intrinsic::Abs => a.map(f32::abs),
        Intrinsic::Sign => a.map(|x| {
            if x > 0.0 {
                1.0
            } else if x < 0.0 {
                -1.0
            } else {
                x
            }
        }),
        Intrinsic::Floor => a.map(f32::floor),
        Intrinsic::Ceil => a.map(f32::ceil),
        Intrinsic::Fract => a.map(|x| x - x.floor()),
        Intrinsic::Sin => a.map(f32::sin),
        Intrinsic::Cos => a.map(f32::cos),
        Intrinsic::Tan => a.map(f32::tan),
        Intrinsic::Asin => a.map(f32::asin),
        Intrinsic::Acos => a.map(f32::acos),
        Intrinsic::Atan => a.map(f32::atan),
        Intrinsic::Exp => a.map(f32::exp),
        Intrinsic::Log => a.map(f32::ln),
        Intrinsic::Sqrt => a.map(f32::sqrt),
        Intrinsic::Atan2 => a.zip(args[1], ty, f32::atan2),
        Intrinsic::Pow => a.zip(args[1], ty, f32::powf),
        Intrinsic::Min => a.zip(args[1], ty, f32::min),
        Intrinsic::Max => a.zip(args[1], ty, f32::max),
        Intrinsic::Step => a.zip(args[1], ty, |edge, x| if x < edge { 0.0 } else { 1.0 }),
        Intrinsic::Clamp => a
            .zip(args[1], ty, f32::max)
            .zip(args[2], ty, f32::min),
        Intrinsic::Mix => {
            let (b, t) = (args[1], args[2]);
            let mut lanes = [0.0; 4];
            for (lane, out) in lanes.iter_mut().enumerate().take(ty.lanes()) {
                let t = t.lane(lane);
                *out = a.lane(lane) * (1.0 - t) + b.lane(lane) * t;
            }
            Value::new(ty, lanes)
        }
        Intrinsic::Smoothstep => {
            let (edge0, edge1, x) = (a, args[1], args[2]);
            let mut lanes = [0.0; 4];
            for (lane, out) in lanes.iter_mut().enumerate().take(ty.lanes()) {
                let (e0, e1) = (edge0.lane(lane), edge1.lane(lane));
                let t = ((x.lane(lane) - e0) / (e1 - e0)).clamp(0.0, 1.0);
                *out = t * t * (3.0 - 2.0 * t);
            }
            Value::new(ty, lanes)
        }
        Intrinsic::Length => Value::float(dot(&a, &a).sqrt()),
        Intrinsic::Distance => {
            let diff = a.zip(args[1], a.ty, |x, y| x - y);
            Value::float(dot(&diff, &diff).sqrt())
        }
        Intrinsic::Dot => Value::float(dot(&a, &args[1])),
        Intrinsic::Cross => {
            let (x, y) = (a.lanes, args[1].lanes);
            Value::vec3([
                x[1] * y[2] - x[2] * y[1],
                x[2] * y[0] - x[0] * y[2],
                x[0] * y[1] - x[1] * y[0],
            ])
        }
        Intrinsic::Normalize => {
            let length = dot(&a, &a).sqrt();
            a.map(|x| x / length)
        }
        Intrinsic::Reflect => {
            let n = args[1];
            let d = dot(&n, &a);
            a.zip(n, ty, |i, n| i - 2.0 * d * n)
        }
    }
}

fn dot(a: &Value, b: &Value) -> f32 {
    a.lanes()
        .iter()
        .zip(b.lanes())
        .map(|(x, y)| x * y)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fold::{fold, LoopRange};
    use crate::node::{float, int, time, uv, Table};
    use crate::ops::{mat2, select, smoothstep, texture, vec2, vec3};

    fn ctx() -> EvalContext<'static> {
        EvalContext::new([0.25, 0.75], 2.0, [640.0, 480.0])
    }

    fn eval(node: &Node) -> Value {
        evaluate(node, &ctx()).expect("evaluates")
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn reads_builtins() {
        assert_eq!(eval(&uv()).lanes(), &[0.25, 0.75]);
        assert_eq!(eval(&time()).as_f32(), 2.0);
    }

    #[test]
    fn float_rem_is_floored() {
        let value = eval(&(float(-1.0) % 3.0));
        assert!(close(value.as_f32(), 2.0));
        let ints = eval(&(int(-7) % int(3)));
        assert_eq!(ints.as_f32(), -1.0);
    }

    #[test]
    fn division_by_zero_follows_ieee() {
        let value = eval(&(float(1.0) / 0.0));
        assert!(value.as_f32().is_infinite());
        let nan = eval(&(float(0.0) / 0.0));
        assert!(nan.as_f32().is_nan());
    }

    #[test]
    fn mat2_is_column_major() {
        let m = mat2(1.0, 2.0, 3.0, 4.0);
        let v = vec2(1.0, 1.0);
        assert_eq!(eval(&(&m * &v)).lanes(), &[4.0, 6.0]);
        assert_eq!(eval(&(&v * &m)).lanes(), &[3.0, 7.0]);
        assert_eq!(eval(&m.column(1)).lanes(), &[3.0, 4.0]);
    }

    #[test]
    fn smoothstep_matches_hermite() {
        let value = eval(&smoothstep(0.0, 1.0, 0.25));
        assert!(close(value.as_f32(), 0.15625));
    }

    #[test]
    fn select_picks_branch() {
        let value = eval(&select(&uv().x().lt(0.5), vec3(1.0, 0.0, 0.0), 0.0));
        assert_eq!(value.lanes(), &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn fold_sums_index() {
        let [sum] = fold(LoopRange::new(0.0, 5.0), [float(0.0)], |i, [sum]| {
            sum.add_assign(i)
        })
        .expect("fold builds");
        assert_eq!(eval(&sum).as_f32(), 10.0);

        let [inclusive] = fold(LoopRange::inclusive(0.0, 5.0), [float(0.0)], |i, [sum]| {
            sum.add_assign(i)
        })
        .expect("fold builds");
        assert_eq!(eval(&inclusive).as_f32(), 15.0);
    }

    #[test]
    fn fractional_bounds_iterate_ceil_times() {
        let [count] = fold(LoopRange::new(0.0, 2.5), [float(0.0)], |_, [count]| {
            count.add_assign(1.0)
        })
        .expect("fold builds");
        assert_eq!(eval(&count).as_f32(), 3.0);
    }

    #[test]
    fn nested_folds_reset_inner_state() {
        let [outer] = fold(LoopRange::new(0.0, 3.0), [float(0.0)], |_, [outer]| {
            let [inner] = fold(LoopRange::new(0.0, 2.0), [float(0.0)], |j, [inner]| {
                inner.add_assign(j + 1.0)
            })?;
            outer.add_assign(inner)
        })
        .expect("fold builds");
        assert_eq!(eval(&outer).as_f32(), 9.0);
    }

    #[test]
    fn body_reads_previous_iteration() {
        let [a, b] = fold(
            LoopRange::new(0.0, 4.0),
            [float(0.0), float(1.0)],
            |_, [a, b]| {
                let sum = a.get() + b.get();
                let prev_b = b.get().clone();
                a.assign(prev_b)?;
                b.assign(sum)
            },
        )
        .expect("fold builds");
        assert_eq!(eval(&a).as_f32(), 3.0);
        assert_eq!(eval(&b).as_f32(), 5.0);
    }

    #[test]
    fn iteration_limit_is_enforced() {
        let [count] = fold(LoopRange::new(0.0, 1.0e9), [float(0.0)], |_, [count]| {
            count.add_assign(1.0)
        })
        .expect("fold builds");
        let err = evaluate(&count, &ctx().with_iteration_limit(100)).unwrap_err();
        assert_eq!(err, EvalError::IterationLimit { limit: 100 });
    }

    #[test]
    fn lookup_clamps_index() {
        static TABLE: [f32; 3] = [10.0, 20.0, 30.0];
        let table = Table::from_static(&TABLE, ValueType::Float).expect("table");
        assert_eq!(eval(&crate::ops::lookup(&table, 1.7)).as_f32(), 20.0);
        assert_eq!(eval(&crate::ops::lookup(&table, -4.0)).as_f32(), 10.0);
        assert_eq!(eval(&crate::ops::lookup(&table, 99.0)).as_f32(), 30.0);
    }

    struct Checker;

    impl TextureSource for Checker {
        fn sample(&self, slot: u32, uv: [f32; 2]) -> Option<[f32; 4]> {
            (slot == 0).then_some([uv[0], uv[1], 0.0, 1.0])
        }
    }

    #[test]
    fn samples_bound_textures() {
        let sampled = texture(0);
        let value = evaluate(&sampled, &ctx().with_textures(&Checker)).expect("bound");
        assert_eq!(value.lanes(), &[0.25, 0.75, 0.0, 1.0]);
        let err = evaluate(&sampled, &ctx()).unwrap_err();
        assert_eq!(err, EvalError::MissingTexture(0));
    }

    #[test]
    fn rebound_graph_evaluates_at_new_coordinate() {
        let graph = uv().x() * 10.0;
        let rebound = graph.at_uv(&vec2(0.5, 0.0)).expect("rebinds");
        assert!(close(eval(&rebound).as_f32(), 5.0));
    }
}
