//! Re-evaluating a graph at another coordinate.
//!
//! `at_uv` rewrites every screen-UV leaf of a graph to a caller-supplied
//! vec2 node. Subgraphs that never read the UV are shared, not copied. A fold
//! whose body or bounds read the UV is rebuilt under a fresh id, so the
//! original and the rebound loop can coexist in one graph.
use std::collections::HashMap;
use std::sync::Arc;

use crate::build::expect_type;
use crate::error::GraphError;
use crate::fold::{next_fold_id, Fold};
use crate::node::{Builtin, Node, NodeKind};
use crate::types::ValueType;

impl Node {
    /// Returns this graph evaluated at `coord` instead of the screen UV.
    /// Texture samples taken at the screen UV move to `coord` as well.
    pub fn at_uv(&self, coord: &Node) -> Result<Node, GraphError> {
        expect_type(coord, &[ValueType::Vec2], "at_uv")?;
        let mut rebinder = Rebinder {
            coord: coord.clone(),
            nodes: HashMap::new(),
            folds: HashMap::new(),
            renamed: HashMap::new(),
        };
        Ok(rebinder.rewrite(self))
    }
}

struct Rebinder {
    coord: Node,
    nodes: HashMap<usize, Node>,
    folds: HashMap<usize, Arc<Fold>>,
    renamed: HashMap<u64, u64>,
}

impl Rebinder {
    fn untouched(&self, node: &Node) -> bool {
        !node.depends_on_uv()
            && node
                .free_folds()
                .iter()
                .all(|id| !self.renamed.contains_key(id))
    }

    fn rewrite(&mut self, node: &Node) -> Node {
        if self.untouched(node) {
            return node.clone();
        }
        if let Some(done) = self.nodes.get(&node.id()) {
            return done.clone();
        }

        let rewritten = match node.kind() {
            NodeKind::Builtin(Builtin::Uv) => self.coord.clone(),
            NodeKind::Slot { fold, index } => Node::new(
                node.ty(),
                NodeKind::Slot {
                    fold: self.renamed.get(fold).copied().unwrap_or(*fold),
                    index: *index,
                },
            ),
            NodeKind::LoopIndex { fold } => Node::new(
                node.ty(),
                NodeKind::LoopIndex {
                    fold: self.renamed.get(fold).copied().unwrap_or(*fold),
                },
            ),
            NodeKind::FoldOutput { fold, index } => {
                let fold = self.rewrite_fold(fold);
                Node::new(
                    node.ty(),
                    NodeKind::FoldOutput {
                        fold,
                        index: *index,
                    },
                )
            }
            kind => {
                let kind = kind.map_operands(|operand| self.rewrite(operand));
                Node::new(node.ty(), kind)
            }
        };

        self.nodes.insert(node.id(), rewritten.clone());
        rewritten
    }

    fn rewrite_fold(&mut self, fold: &Arc<Fold>) -> Arc<Fold> {
        let key = Arc::as_ptr(fold) as usize;
        if let Some(done) = self.folds.get(&key) {
            return Arc::clone(done);
        }

        let start = self.rewrite(fold.start());
        let end = self.rewrite(fold.end());
        let init: Vec<Node> = fold.init().iter().map(|node| self.rewrite(node)).collect();

        let id = next_fold_id();
        self.renamed.insert(fold.id(), id);
        let next: Vec<Node> = fold.next().iter().map(|node| self.rewrite(node)).collect();

        let rebuilt = Fold::rebuilt(id, start, end, fold.inclusive(), init, next);
        self.folds.insert(key, Arc::clone(&rebuilt));
        rebuilt
    }
}
