//! Path Grouper / Tree Builder
//!
//! Regroups matrix rows into a nested diff tree following each row's
//! ancestor path. Two path segments fold into the same node only when both
//! their name and their merge identity match a previously created sibling;
//! otherwise a new sibling is appended in row-encounter order. Child order
//! mirrors matrix row order, never alphabetic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use stepdiff_common::AncestorKind;

use crate::matrix::{CompareCell, ComparisonMatrix};

/// Kind of a diff-tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Compound,
    Step,
}

/// One matrix row attached to a leaf: the sub-step name plus the full
/// per-column cell line, so a grid can be rendered inside the leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubStepRow {
    pub name: String,
    pub cells: Vec<CompareCell>,
}

/// Node of the nested diff view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffTreeNode {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DiffTreeNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<SubStepRow>,
}

impl DiffTreeNode {
    fn new(name: String, kind: NodeKind) -> Self {
        Self {
            name,
            kind,
            children: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// Ordered trie over (segment name, merge identity); guarantees
/// insertion-ordered children.
struct TreeArena {
    nodes: Vec<DiffTreeNode>,
    children: Vec<Vec<usize>>,
    index: Vec<HashMap<(String, String), usize>>,
}

impl TreeArena {
    fn new(root: DiffTreeNode) -> Self {
        Self {
            nodes: vec![root],
            children: vec![Vec::new()],
            index: vec![HashMap::new()],
        }
    }

    fn child(&mut self, parent: usize, name: &str, merge_id: &str, kind: NodeKind) -> usize {
        let key = (name.to_string(), merge_id.to_string());
        if let Some(&existing) = self.index[parent].get(&key) {
            return existing;
        }
        let id = self.nodes.len();
        self.nodes.push(DiffTreeNode::new(name.to_string(), kind));
        self.children.push(Vec::new());
        self.index.push(HashMap::new());
        self.children[parent].push(id);
        self.index[parent].insert(key, id);
        id
    }

    fn into_tree(mut self) -> DiffTreeNode {
        // Children were only ever appended, so walking the arena back to
        // front keeps every parent's child list in insertion order.
        for id in (0..self.nodes.len()).rev() {
            let child_ids = std::mem::take(&mut self.children[id]);
            for child_id in child_ids {
                let child = std::mem::replace(
                    &mut self.nodes[child_id],
                    DiffTreeNode::new(String::new(), NodeKind::Step),
                );
                self.nodes[id].children.push(child);
            }
        }
        self.nodes.swap_remove(0)
    }
}

fn segment_kind(kind: AncestorKind) -> NodeKind {
    match kind {
        AncestorKind::Compound => NodeKind::Compound,
        _ => NodeKind::Step,
    }
}

/// Regroup the matrix into a nested diff tree.
///
/// Rows are consumed in matrix order. A row's path is taken from its first
/// populated cell; rows whose step has no real ancestors become leaves
/// directly under the root, keyed by step name and merge hash.
pub fn build_tree(matrix: &ComparisonMatrix) -> DiffTreeNode {
    let mut arena = TreeArena::new(DiffTreeNode::new("root".to_string(), NodeKind::Root));

    for row in &matrix.rows {
        let Some(base) = row.first_populated() else {
            continue;
        };
        let Some(step) = base.step.as_ref() else {
            continue;
        };

        let mut current = 0usize;
        let mut has_ancestors = false;
        for segment in step
            .ancestors
            .iter()
            .filter(|a| a.kind != AncestorKind::Root)
        {
            has_ancestors = true;
            current = arena.child(
                current,
                &segment.name,
                segment.merge_id(),
                segment_kind(segment.kind),
            );
        }

        if !has_ancestors {
            let merge_id = base.merge_hash.clone().unwrap_or_default();
            current = arena.child(current, &step.name, &merge_id, NodeKind::Step);
        }

        arena.nodes[current].rows.push(SubStepRow {
            name: step.name.clone(),
            cells: row.cells.clone(),
        });
    }

    arena.into_tree()
}
