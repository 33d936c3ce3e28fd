//! Lowers a colour graph into a self-contained WGSL module: a full-screen
//! triangle vertex stage (`vs_main`) and a fragment stage (`fs_main`) that
//! writes the graph's value as `vec4<f32>`.
//!
//! Every non-trivial node becomes one typed `let`, emitted once and hoisted
//! to the block of the innermost fold it reads (or the function body for
//! loop-invariant nodes). Folds become `for` loops over `var` accumulators;
//! each loop body first snapshots the accumulators so body expressions read
//! the previous iteration, and assigns the new values last.
//!
//! Bindings: `Globals { resolution, time }` at `@group(0) @binding(0)`;
//! texture slot `n` binds its texture at `@group(1) @binding(2n)` and its
//! sampler at `@binding(2n + 1)`.
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;

use crate::error::EmitError;
use crate::fold::Fold;
use crate::node::{BinaryOp, Builtin, Literal, Node, NodeKind, Table, UnaryOp};
use crate::types::ValueType;

#[derive(Debug, Clone)]
pub struct WgslModule {
    pub source: String,
    /// Texture slots the fragment stage samples, ascending.
    pub texture_slots: Vec<u32>,
}

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

const PRELUDE: &str = "struct Globals {
    resolution: vec2<f32>,
    time: f32,
    padding: f32,
}

@group(0) @binding(0) var<uniform> globals: Globals;
";

const VERTEX_STAGE: &str = "struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var corners = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -3.0),
        vec2<f32>(3.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vertex_index];
    var output: VertexOutput;
    output.position = vec4<f32>(corner, 0.0, 1.0);
    output.uv = corner * 0.5 + vec2<f32>(0.5, 0.5);
    return output;
}
";

pub fn emit_wgsl(output: &Node) -> Result<WgslModule, EmitError> {
    if !matches!(
        output.ty(),
        ValueType::Float | ValueType::Vec3 | ValueType::Vec4
    ) {
        return Err(EmitError::UnsupportedOutput(output.ty()));
    }

    let mut emitter = Emitter::new();
    let value = emitter.expr(output)?;
    let colour = match output.ty() {
        ValueType::Vec4 => value,
        ValueType::Vec3 => format!("vec4<f32>({value}, 1.0)"),
        _ => format!("vec4<f32>(vec3<f32>({value}), 1.0)"),
    };

    let mut source = String::from(PRELUDE);
    for slot in &emitter.texture_slots {
        let _ = writeln!(
            source,
            "@group(1) @binding({}) var input_texture{slot}: texture_2d<f32>;",
            slot * 2
        );
        let _ = writeln!(
            source,
            "@group(1) @binding({}) var input_sampler{slot}: sampler;",
            slot * 2 + 1
        );
    }
    for table in &emitter.tables {
        let _ = writeln!(source, "{table}");
    }
    source.push('\n');
    source.push_str(VERTEX_STAGE);
    source.push('\n');
    source.push_str("@fragment\nfn fs_main(frag: VertexOutput) -> @location(0) vec4<f32> {\n");
    source.push_str("    let frag_uv = frag.uv;\n");
    for line in &emitter.blocks[0].lines {
        let _ = writeln!(source, "    {line}");
    }
    let _ = writeln!(source, "    return {colour};");
    source.push_str("}\n");

    tracing::debug!(
        lets = emitter.next_name,
        tables = emitter.tables.len(),
        textures = emitter.texture_slots.len(),
        bytes = source.len(),
        "emitted wgsl module"
    );

    Ok(WgslModule {
        source,
        texture_slots: emitter.texture_slots.into_iter().collect(),
    })
}

#[derive(Default)]
struct Block {
    fold: Option<u64>,
    lines: Vec<String>,
    names: HashMap<usize, String>,
    folds: HashSet<usize>,
}

struct Emitter {
    blocks: Vec<Block>,
    next_name: usize,
    tables: Vec<String>,
    table_names: HashMap<(usize, usize), String>,
    texture_slots: BTreeSet<u32>,
}

impl Emitter {
    fn new() -> Self {
        Self {
            blocks: vec![Block::default()],
            next_name: 0,
            tables: Vec::new(),
            table_names: HashMap::new(),
            texture_slots: BTreeSet::new(),
        }
    }

    fn target_block(&self, node: &Node) -> Result<usize, EmitError> {
        let folds = node.free_folds();
        if folds.is_empty() {
            return Ok(0);
        }
        self.blocks
            .iter()
            .rposition(|block| block.fold.is_some_and(|id| folds.contains(&id)))
            .ok_or(EmitError::UnboundSlot { fold: folds[0] })
    }

    fn fold_is_open(&self, fold: u64) -> Result<(), EmitError> {
        if self.blocks.iter().any(|block| block.fold == Some(fold)) {
            Ok(())
        } else {
            Err(EmitError::UnboundSlot { fold })
        }
    }

    fn expr(&mut self, node: &Node) -> Result<String, EmitError> {
        match node.kind() {
            NodeKind::Literal(literal) => literal_text(*literal),
            NodeKind::Builtin(Builtin::Uv) => Ok("frag_uv".to_string()),
            NodeKind::Builtin(Builtin::Time) => Ok("globals.time".to_string()),
            NodeKind::Builtin(Builtin::Resolution) => Ok("globals.resolution".to_string()),
            NodeKind::Slot { fold, index } => {
                self.fold_is_open(*fold)?;
                Ok(format!("s{fold}_{index}"))
            }
            NodeKind::LoopIndex { fold } => {
                self.fold_is_open(*fold)?;
                Ok(format!("i{fold}"))
            }
            NodeKind::FoldOutput { fold, index } => {
                self.emit_fold(node, fold)?;
                Ok(format!("acc{}_{index}", fold.id()))
            }
            _ => {
                let block = self.target_block(node)?;
                if let Some(name) = self.blocks[block].names.get(&node.id()) {
                    return Ok(name.clone());
                }
                let value = self.compose(node)?;
                let name = format!("v{}", self.next_name);
                self.next_name += 1;
                let target = &mut self.blocks[block];
                target
                    .lines
                    .push(format!("let {name}: {} = {value};", node.ty().wgsl_name()));
                target.names.insert(node.id(), name.clone());
                Ok(name)
            }
        }
    }

    fn compose(&mut self, node: &Node) -> Result<String, EmitError> {
        let ty = node.ty();
        let text = match node.kind() {
            NodeKind::Unary(UnaryOp::Neg, x) => format!("-({})", self.expr(x)?),
            NodeKind::Unary(UnaryOp::Not, x) => format!("!({})", self.expr(x)?),
            NodeKind::Binary(op, a, b) => {
                let (lhs, rhs) = (self.expr(a)?, self.expr(b)?);
                match op {
                    BinaryOp::Rem if a.ty() != ValueType::Int => {
                        format!("({lhs} - {rhs} * floor({lhs} / {rhs}))")
                    }
                    _ => format!("({lhs} {} {rhs})", op.symbol()),
                }
            }
            NodeKind::Call(intrinsic, args) => {
                let args = self.exprs(args)?;
                format!("{}({})", intrinsic.name(), args.join(", "))
            }
            NodeKind::Construct(parts) => {
                let parts = self.exprs(parts)?;
                format!("{}({})", ty.wgsl_name(), parts.join(", "))
            }
            NodeKind::Splat(x) | NodeKind::Cast(x) => {
                format!("{}({})", ty.wgsl_name(), self.expr(x)?)
            }
            NodeKind::Swizzle(x, swizzle) => format!("{}.{swizzle}", self.expr(x)?),
            NodeKind::Column(m, index) => format!("{}[{index}]", self.expr(m)?),
            NodeKind::Select {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.expr(cond)?;
                let then = self.expr(then)?;
                let otherwise = self.expr(otherwise)?;
                format!("select({otherwise}, {then}, {cond})")
            }
            NodeKind::Lookup { table, index } => {
                let name = self.table(table)?;
                let mut index_text = self.expr(index)?;
                if index.ty() == ValueType::Int {
                    index_text = format!("f32({index_text})");
                }
                let last = float_text((table.len() - 1) as f32)?;
                format!("{name}[i32(clamp(floor({index_text}), 0.0, {last}))]")
            }
            NodeKind::Sample { slot, uv } => {
                self.texture_slots.insert(*slot);
                let coord = self.expr(uv)?;
                format!("textureSampleLevel(input_texture{slot}, input_sampler{slot}, {coord}, 0.0)")
            }
            NodeKind::Literal(_)
            | NodeKind::Builtin(_)
            | NodeKind::Slot { .. }
            | NodeKind::LoopIndex { .. }
            | NodeKind::FoldOutput { .. } => self.expr(node)?,
        };
        Ok(text)
    }

    fn exprs(&mut self, nodes: &[Node]) -> Result<Vec<String>, EmitError> {
        nodes.iter().map(|node| self.expr(node)).collect()
    }

    fn emit_fold(&mut self, node: &Node, fold: &Arc<Fold>) -> Result<(), EmitError> {
        let key = Arc::as_ptr(fold) as usize;
        let parent = self.target_block(node)?;
        if self.blocks[parent].folds.contains(&key) {
            return Ok(());
        }

        let start = self.expr(fold.start())?;
        let end = self.expr(fold.end())?;
        let init = self.exprs(fold.init())?;
        let id = fold.id();

        let depth = self.blocks.len();
        let mut body = Block {
            fold: Some(id),
            ..Block::default()
        };
        for (slot, value) in fold.init().iter().enumerate() {
            body.lines.push(format!(
                "let s{id}_{slot}: {} = acc{id}_{slot};",
                value.ty().wgsl_name()
            ));
        }
        self.blocks.push(body);
        let next = self.exprs(fold.next());
        let body_lines: Vec<String> = self
            .blocks
            .split_off(depth)
            .into_iter()
            .flat_map(|block| block.lines)
            .collect();
        let next = next?;

        let compare = if fold.inclusive() { "<=" } else { "<" };
        let target = &mut self.blocks[parent];
        for (slot, (value, text)) in fold.init().iter().zip(&init).enumerate() {
            target.lines.push(format!(
                "var acc{id}_{slot}: {} = {text};",
                value.ty().wgsl_name()
            ));
        }
        target.lines.push(format!(
            "for (var i{id}: f32 = {start}; i{id} {compare} {end}; i{id} = i{id} + 1.0) {{"
        ));
        target
            .lines
            .extend(body_lines.into_iter().map(|line| format!("    {line}")));
        for (slot, text) in next.iter().enumerate() {
            target.lines.push(format!("    acc{id}_{slot} = {text};"));
        }
        target.lines.push("}".to_string());
        target.folds.insert(key);
        Ok(())
    }

    fn table(&mut self, table: &Table) -> Result<String, EmitError> {
        if let Some(name) = self.table_names.get(&table.key()) {
            return Ok(name.clone());
        }
        let name = format!("lut{}", self.tables.len());
        let element = table.element();
        let array = format!("array<{}, {}>", element.wgsl_name(), table.len());
        let mut entries = Vec::with_capacity(table.len());
        for index in 0..table.len() {
            let lanes = table
                .element_at(index)
                .iter()
                .map(|value| float_text(*value))
                .collect::<Result<Vec<_>, _>>()?;
            entries.push(if element == ValueType::Float {
                lanes.join(", ")
            } else {
                format!("{}({})", element.wgsl_name(), lanes.join(", "))
            });
        }
        self.tables.push(format!(
            "var<private> {name}: {array} = {array}({});",
            entries.join(", ")
        ));
        self.table_names.insert(table.key(), name.clone());
        Ok(name)
    }
}

fn literal_text(literal: Literal) -> Result<String, EmitError> {
    match literal {
        Literal::Bool(value) => Ok(value.to_string()),
        Literal::Int(value) if value < 0 => Ok(format!("({value}i)")),
        Literal::Int(value) => Ok(format!("{value}i")),
        Literal::Float(value) => float_text(value),
    }
}

fn float_text(value: f32) -> Result<String, EmitError> {
    if !value.is_finite() {
        return Err(EmitError::NonFiniteLiteral(value.to_string()));
    }
    if value == 0.0 {
        return Ok("0.0".to_string());
    }
    let text = format!("{value:?}");
    if value < 0.0 {
        Ok(format!("({text})"))
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fold::{fold, LoopRange};
    use crate::node::{float, int, time, uv};
    use crate::ops::{lookup, select, texture, vec3};

    fn validate(source: &str) {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|err| panic!("parse failed: {}\n{source}", err.emit_to_string(source)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap_or_else(|err| panic!("validation failed: {err:?}\n{source}"));
    }

    #[test]
    fn emits_default_template() {
        let graph = vec3(uv().x(), uv().y(), time().sin());
        let module = emit_wgsl(&graph).expect("emits");
        assert!(module.source.contains("fn vs_main"));
        assert!(module.source.contains("fn fs_main"));
        assert!(module.texture_slots.is_empty());
        validate(&module.source);
    }

    #[test]
    fn shared_nodes_are_emitted_once() {
        let shared = uv().x().sin();
        let graph = vec3(shared.clone(), shared.clone(), shared);
        let module = emit_wgsl(&graph).expect("emits");
        assert_eq!(module.source.matches("sin(").count(), 1);
    }

    #[test]
    fn folds_become_loops() {
        let [sum, offset] = fold(
            LoopRange::new(0.0, time().floor() + 3.0),
            [float(0.0), uv()],
            |i, [sum, offset]| {
                let wave = (offset.get().x() * i).sin();
                sum.add_assign(wave)?;
                offset.mul_assign(1.5)
            },
        )
        .expect("fold builds");
        let graph = vec3(sum, offset.x(), offset.y());
        let module = emit_wgsl(&graph).expect("emits");
        assert!(module.source.contains("for (var i"));
        validate(&module.source);
    }

    #[test]
    fn nested_and_inclusive_folds_validate() {
        let [outer] = fold(LoopRange::inclusive(1.0, 3.0), [float(0.0)], |i, [outer]| {
            let scale = i.clone();
            let [inner] = fold(LoopRange::new(0.0, 2.0), [float(0.0)], |j, [inner]| {
                inner.add_assign(j * &scale)
            })?;
            outer.add_assign(inner)
        })
        .expect("fold builds");
        let module = emit_wgsl(&outer).expect("emits");
        assert!(module.source.contains("<= 3.0"));
        validate(&module.source);
    }

    #[test]
    fn lookups_and_selects_validate() {
        static TABLE: [f32; 4] = [0.0, 0.5, -0.25, 1.0];
        let table = Table::from_static(&TABLE, ValueType::Float).expect("table");
        let index = (uv().x() * 4.0).to_int() % int(4);
        let value = lookup(&table, index);
        let graph = select(&value.gt(0.0), vec3(1.0, 0.0, 0.0), vec3(0.0, 0.0, 1.0));
        let module = emit_wgsl(&graph).expect("emits");
        assert!(module.source.contains("var<private> lut0: array<f32, 4>"));
        validate(&module.source);
    }

    #[test]
    fn texture_samples_declare_bindings() {
        let graph = texture(0).at_uv(&(uv() * 0.5)).expect("rebinds");
        let module = emit_wgsl(&graph).expect("emits");
        assert_eq!(module.texture_slots, vec![0]);
        assert!(module.source.contains("textureSampleLevel(input_texture0"));
        validate(&module.source);
    }

    #[test]
    fn rejects_unsupported_outputs() {
        let err = emit_wgsl(&uv().x().gt(0.5)).unwrap_err();
        assert_eq!(err, EmitError::UnsupportedOutput(ValueType::Bool));
    }

    #[test]
    fn rejects_non_finite_literals() {
        let err = emit_wgsl(&(uv().x() * f32::INFINITY)).unwrap_err();
        assert!(matches!(err, EmitError::NonFiniteLiteral(_)));
    }

    #[test]
    fn negative_literals_are_parenthesised() {
        assert_eq!(float_text(-1.5).expect("finite"), "(-1.5)");
        assert_eq!(literal_text(Literal::Int(-3)).expect("int"), "(-3i)");
        assert_eq!(float_text(0.25).expect("finite"), "0.25");
    }
}
