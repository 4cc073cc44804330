//! Node arena for syntax tree storage.

use crate::doc::DocComment;
use crate::node::{Node, NodeData, NodeIndex};
use lty_common::limits::MAX_TREE_WALK_ITERATIONS;
use lty_common::{Atom, Span};
use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::hash_map::Entry;

/// Arena-based storage for one file's syntax tree.
/// Nodes are stored contiguously and referenced by index.
#[derive(Clone, Debug, Default, Serialize)]
pub struct NodeArena {
    pub nodes: Vec<Node>,
    docs: FxHashMap<NodeIndex, DocComment>,
    root: NodeIndex,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity),
            docs: FxHashMap::default(),
            root: NodeIndex::NONE,
        }
    }

    /// Add a node to the arena and return its index
    pub fn add(&mut self, node: Node) -> NodeIndex {
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        NodeIndex(index)
    }

    /// Get a node by index
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get_mut(index.0 as usize)
        }
    }

    #[inline]
    pub fn data(&self, index: NodeIndex) -> Option<&NodeData> {
        self.get(index).map(|node| &node.data)
    }

    pub fn span(&self, index: NodeIndex) -> Span {
        self.get(index).map(|node| node.span).unwrap_or_default()
    }

    pub fn parent(&self, index: NodeIndex) -> NodeIndex {
        self.get(index)
            .map(|node| node.parent)
            .unwrap_or(NodeIndex::NONE)
    }

    pub fn children(&self, index: NodeIndex) -> SmallVec<[NodeIndex; 4]> {
        self.data(index)
            .map(NodeData::children)
            .unwrap_or_default()
    }

    /// Text of a `Name` node.
    pub fn name_text(&self, index: NodeIndex) -> Option<&Atom> {
        self.data(index).and_then(NodeData::name_text)
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn set_root(&mut self, root: NodeIndex) {
        self.root = root;
    }

    /// Attach a parsed documentation comment to the statement or table field
    /// it precedes. A second comment on the same node is merged after the first.
    pub fn attach_doc(&mut self, index: NodeIndex, doc: DocComment) {
        if index.is_none() {
            return;
        }
        match self.docs.entry(index) {
            Entry::Occupied(mut existing) => existing.get_mut().tags.extend(doc.tags),
            Entry::Vacant(slot) => {
                slot.insert(doc);
            }
        }
    }

    pub fn doc(&self, index: NodeIndex) -> Option<&DocComment> {
        self.docs.get(&index)
    }

    /// Ancestors from the parent outward. Bounded so a malformed parent
    /// cycle cannot hang the caller.
    pub fn ancestors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        let mut current = self.parent(index);
        let mut steps = 0usize;
        std::iter::from_fn(move || {
            if current.is_none() || steps >= MAX_TREE_WALK_ITERATIONS {
                return None;
            }
            steps += 1;
            let out = current;
            current = self.parent(current);
            Some(out)
        })
    }

    /// Innermost enclosing `Closure`, if any.
    pub fn enclosing_function(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.ancestors(index)
            .find(|&idx| matches!(self.data(idx), Some(NodeData::Closure { .. })))
    }

    /// Innermost node whose span contains `pos`.
    pub fn node_at(&self, pos: u32) -> NodeIndex {
        let mut current = self.root;
        if !self.span(current).contains(pos) {
            return NodeIndex::NONE;
        }
        for _ in 0..MAX_TREE_WALK_ITERATIONS {
            let next = self
                .children(current)
                .into_iter()
                .find(|&child| self.span(child).contains(pos));
            match next {
                Some(child) => current = child,
                None => break,
            }
        }
        current
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
