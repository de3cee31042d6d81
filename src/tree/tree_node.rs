use approx::relative_eq;

use crate::tree::NodeIdx::{self, Internal as Int, Leaf};

/// Arena entry of the tree. `blen` is the length of the branch leading to the node,
/// `id` is its newick label and may be empty.
#[derive(Debug, Clone)]
pub struct Node {
    pub idx: NodeIdx,
    pub parent: Option<NodeIdx>,
    pub children: Vec<NodeIdx>,
    pub blen: f64,
    pub id: String,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx
            && self.parent == other.parent
            && self.children == other.children
            && self.id == other.id
            && relative_eq!(self.blen, other.blen)
    }
}

impl Node {
    pub(crate) fn new_leaf(idx: usize, parent: Option<NodeIdx>, blen: f64, id: String) -> Self {
        Self {
            idx: Leaf(idx),
            parent,
            children: Vec::new(),
            blen,
            id,
        }
    }

    pub(crate) fn new_internal(
        idx: usize,
        parent: Option<NodeIdx>,
        children: Vec<NodeIdx>,
        blen: f64,
        id: String,
    ) -> Self {
        Self {
            idx: Int(idx),
            parent,
            children,
            blen,
            id,
        }
    }

    /// Placeholder for an internal node whose label, branch and children are parsed later.
    pub(crate) fn unlabelled_internal(idx: usize, parent: Option<NodeIdx>) -> Self {
        Self::new_internal(idx, parent, Vec::new(), 0.0, String::new())
    }
}
