use std::collections::{HashSet, VecDeque};
use std::fmt::Display;

use anyhow::bail;
use log::debug;

use crate::io::DataError;
use crate::Result;

mod tree_node;
pub use tree_node::*;
pub mod tree_parser;

#[derive(Debug, PartialEq, Clone, Copy, PartialOrd, Eq, Ord, Hash)]
pub enum NodeIdx {
    Internal(usize),
    Leaf(usize),
}

use NodeIdx::{Internal as Int, Leaf};

impl Display for NodeIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Int(idx) => write!(f, "internal node {}", idx),
            Leaf(idx) => write!(f, "leaf node {}", idx),
        }
    }
}

impl From<NodeIdx> for usize {
    fn from(node_idx: NodeIdx) -> usize {
        match node_idx {
            Int(idx) => idx,
            Leaf(idx) => idx,
        }
    }
}

impl From<&NodeIdx> for usize {
    fn from(node_idx: &NodeIdx) -> usize {
        usize::from(*node_idx)
    }
}

/// Rooted phylogenetic tree stored as an arena of nodes.
///
/// Every node keeps the length of the branch leading to it from its parent, so the branch
/// length from a node to its child `c` is `c.blen`. Internal nodes can have any positive number
/// of children.
#[derive(Debug, Clone)]
pub struct Tree {
    pub root: NodeIdx,
    pub(crate) nodes: Vec<Node>,
    pub(crate) postorder: Vec<NodeIdx>,
    pub(crate) preorder: Vec<NodeIdx>,
    pub(crate) levelorder: Vec<NodeIdx>,
    pub complete: bool,
    /// Number of leaves.
    pub n: usize,
    pub(crate) leaf_ids: Vec<String>,
}

impl Tree {
    pub(crate) fn new_empty() -> Self {
        Self {
            root: Int(0),
            nodes: Vec::new(),
            postorder: Vec::new(),
            preorder: Vec::new(),
            levelorder: Vec::new(),
            complete: false,
            n: 0,
            leaf_ids: Vec::new(),
        }
    }

    /// Fills in the traversal orders and leaf bookkeeping once all nodes have been added.
    pub(crate) fn complete(&mut self) {
        self.n = self
            .nodes
            .iter()
            .filter(|node| matches!(node.idx, Leaf(_)))
            .count();
        self.leaf_ids = self
            .nodes
            .iter()
            .filter(|node| matches!(node.idx, Leaf(_)))
            .map(|node| node.id.clone())
            .collect();
        self.compute_postorder();
        self.compute_preorder();
        self.compute_levelorder();
        self.complete = true;
    }

    pub(crate) fn compute_postorder(&mut self) {
        let mut order = Vec::<NodeIdx>::with_capacity(self.len());
        let mut stack = Vec::<NodeIdx>::with_capacity(self.len());
        stack.push(self.root);
        while let Some(cur) = stack.pop() {
            order.push(cur);
            stack.extend(self.children(&cur).iter());
        }
        order.reverse();
        self.postorder = order;
    }

    pub(crate) fn compute_preorder(&mut self) {
        self.preorder = self.preorder_subroot(&self.root);
    }

    pub(crate) fn compute_levelorder(&mut self) {
        let mut order = Vec::<NodeIdx>::with_capacity(self.len());
        let mut queue = VecDeque::<NodeIdx>::with_capacity(self.len());
        queue.push_back(self.root);
        while let Some(cur) = queue.pop_front() {
            order.push(cur);
            queue.extend(self.children(&cur).iter());
        }
        self.levelorder = order;
    }

    pub fn preorder_subroot(&self, subroot_idx: &NodeIdx) -> Vec<NodeIdx> {
        let mut order = Vec::<NodeIdx>::with_capacity(self.len());
        let mut stack = Vec::<NodeIdx>::with_capacity(self.len());
        stack.push(*subroot_idx);
        while let Some(cur) = stack.pop() {
            order.push(cur);
            stack.extend(self.children(&cur).iter().rev());
        }
        order
    }

    pub fn postorder(&self) -> &[NodeIdx] {
        debug_assert!(self.complete);
        &self.postorder
    }

    pub fn preorder(&self) -> &[NodeIdx] {
        debug_assert!(self.complete);
        &self.preorder
    }

    /// Breadth-first order starting at the root.
    pub fn levelorder(&self) -> &[NodeIdx] {
        debug_assert!(self.complete);
        &self.levelorder
    }

    /// Internal nodes ordered so that every internal node comes after all of its internal
    /// descendants. This is the reversed level order restricted to internal nodes.
    pub fn internal_postorder(&self) -> Vec<NodeIdx> {
        self.levelorder
            .iter()
            .rev()
            .filter(|idx| matches!(idx, Int(_)))
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn leaves(&self) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|&node| matches!(node.idx, Leaf(_)))
            .collect()
    }

    pub fn internals(&self) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|&node| matches!(node.idx, Int(_)))
            .collect()
    }

    pub fn leaf_ids(&self) -> Vec<String> {
        self.leaf_ids.clone()
    }

    pub fn node(&self, node_idx: &NodeIdx) -> &Node {
        &self.nodes[usize::from(node_idx)]
    }

    pub fn node_id(&self, node_idx: &NodeIdx) -> &str {
        &self.nodes[usize::from(node_idx)].id
    }

    pub fn children(&self, node_idx: &NodeIdx) -> &[NodeIdx] {
        &self.nodes[usize::from(node_idx)].children
    }

    /// Children of a node together with the length of the branch leading to each of them.
    pub fn children_with_blens<'a>(
        &'a self,
        node_idx: &NodeIdx,
    ) -> impl Iterator<Item = (NodeIdx, f64)> + 'a {
        self.children(node_idx)
            .iter()
            .map(move |child| (*child, self.blen(child)))
    }

    pub fn parent(&self, node_idx: &NodeIdx) -> Option<&NodeIdx> {
        self.nodes[usize::from(node_idx)].parent.as_ref()
    }

    pub fn blen(&self, node_idx: &NodeIdx) -> f64 {
        self.nodes[usize::from(node_idx)].blen
    }

    /// Returns the index of the node with the given id, bails if there is none.
    pub fn try_idx(&self, id: &str) -> Result<NodeIdx> {
        match self.nodes.iter().find(|node| node.id == id) {
            Some(node) => Ok(node.idx),
            None => bail!(DataError {
                message: format!("No node with id {} found in the tree", id)
            }),
        }
    }

    pub fn to_newick(&self) -> String {
        format!("{};", self.subtree_to_newick(&self.root))
    }

    fn subtree_to_newick(&self, node_idx: &NodeIdx) -> String {
        let node = self.node(node_idx);
        match node_idx {
            Int(_) => format!(
                "({}){}:{}",
                node.children
                    .iter()
                    .map(|child| self.subtree_to_newick(child))
                    .collect::<Vec<_>>()
                    .join(","),
                node.id,
                node.blen
            ),
            Leaf(_) => format!("{}:{}", node.id, node.blen),
        }
    }
}

/// Checks that no two nodes share a non-empty id.
pub fn node_ids_are_unique(tree: &Tree) -> Result<()> {
    debug!("Checking that tree node ids are unique");
    let mut seen = HashSet::with_capacity(tree.len());
    for node in tree.iter().filter(|node| !node.id.is_empty()) {
        if !seen.insert(node.id.as_str()) {
            bail!(DataError {
                message: format!("Node id {} appears more than once in the tree", node.id)
            });
        }
    }
    Ok(())
}

/// Checks that every internal node carries an id, since ancestral sequences are keyed by it.
pub fn internal_ids_are_present(tree: &Tree) -> Result<()> {
    if let Some(node) = tree.internals().iter().find(|node| node.id.is_empty()) {
        bail!(DataError {
            message: format!("The {} has no label, ancestral sequences need node ids", node.idx)
        });
    }
    Ok(())
}

/// Checks that all branch lengths are finite and non-negative.
pub fn branch_lengths_are_valid(tree: &Tree) -> Result<()> {
    if let Some(node) = tree.iter().find(|node| !node.blen.is_finite() || node.blen < 0.0) {
        bail!(DataError {
            message: format!(
                "Invalid branch length {} leading to {:?}",
                node.blen, node
            )
        });
    }
    Ok(())
}
