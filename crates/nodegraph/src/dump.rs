use std::collections::HashMap;

use serde::Serialize;

use crate::node::{Literal, Node, NodeKind};
use crate::types::ValueType;

/// Flat, serialisable view of a graph. Nodes are listed operands-first and
/// referenced by their position in `nodes`.
#[derive(Debug, Clone, Serialize)]
pub struct GraphDump {
    pub root: usize,
    pub nodes: Vec<NodeRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeRecord {
    pub id: usize,
    #[serde(rename = "type")]
    pub ty: ValueType,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub operands: Vec<usize>,
}

impl GraphDump {
    pub fn from_node(root: &Node) -> Self {
        let mut builder = DumpBuilder::default();
        let root = builder.visit(root);
        GraphDump {
            root,
            nodes: builder.nodes,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Default)]
struct DumpBuilder {
    ids: HashMap<usize, usize>,
    nodes: Vec<NodeRecord>,
}

impl DumpBuilder {
    fn visit(&mut self, node: &Node) -> usize {
        if let Some(id) = self.ids.get(&node.id()) {
            return *id;
        }
        let operands: Vec<usize> = node
            .kind()
            .operands()
            .into_iter()
            .map(|operand| self.visit(operand))
            .collect();

        let id = self.nodes.len();
        self.nodes.push(NodeRecord {
            id,
            ty: node.ty(),
            kind: node.kind().label(),
            detail: detail(node.kind()),
            operands,
        });
        self.ids.insert(node.id(), id);
        id
    }
}

fn detail(kind: &NodeKind) -> Option<String> {
    match kind {
        NodeKind::Literal(Literal::Float(value)) => Some(format!("{value:?}")),
        NodeKind::Literal(Literal::Int(value)) => Some(value.to_string()),
        NodeKind::Literal(Literal::Bool(value)) => Some(value.to_string()),
        NodeKind::Lookup { table, .. } => {
            Some(format!("{} x {}", table.len(), table.element()))
        }
        NodeKind::Slot { fold, index } => Some(format!("fold {fold} slot {index}")),
        NodeKind::LoopIndex { fold } => Some(format!("fold {fold}")),
        NodeKind::FoldOutput { fold, index } => Some(format!(
            "fold {} output {index} ({} accumulators, {} range)",
            fold.id(),
            fold.init().len(),
            if fold.inclusive() { "closed" } else { "half-open" }
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{float, uv};

    #[test]
    fn shared_nodes_are_listed_once() {
        let shared = uv().x();
        let graph = &shared * &shared + float(1.0);
        let dump = GraphDump::from_node(&graph);
        let swizzles = dump
            .nodes
            .iter()
            .filter(|record| record.kind == "swizzle:x")
            .count();
        assert_eq!(swizzles, 1);
        assert_eq!(dump.root, dump.nodes.len() - 1);
    }

    #[test]
    fn serialises_to_json() {
        let dump = GraphDump::from_node(&(uv() * 2.0));
        let json = dump.to_json_pretty().expect("serialises");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(parsed["nodes"][0]["type"], "vec2");
        assert_eq!(parsed["nodes"][0]["kind"], "builtin:uv");
        assert_eq!(parsed["nodes"][1]["detail"], "2.0");
    }
}
