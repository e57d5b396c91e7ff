use std::{cmp::Reverse, collections::BinaryHeap};

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::{bitstreams::BitSequence, error::{HuffmanError, Result}};

use super::{FrequencyTable, Symbol};

/// Index of a node inside the arena of a `CodeTree`.
pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node<S> {
    pub weight: u64,
    pub symbol: Option<S>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

impl<S> Node<S> {
    fn leaf(symbol: S, weight: u64) -> Self {
        Self { weight, symbol: Some(symbol), left: None, right: None }
    }

    fn internal(weight: u64, left: NodeId, right: Option<NodeId>) -> Self {
        Self { weight, symbol: None, left: Some(left), right }
    }

    pub fn is_leaf(&self) -> bool {
        self.symbol.is_some() && self.left.is_none() && self.right.is_none()
    }
}

/// Queue entry of the greedy merge. Nodes are created in order (leaves first,
/// by first appearance, then each merged parent), so the node id doubles as
/// the tie-break between equal weights: the older node is taken first.
#[derive(Debug)]
struct HeapNode {
    weight: u64,
    id: NodeId,
}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if self.weight == other.weight {
            return self.id.cmp(&other.id);
        }
        self.weight.cmp(&other.weight)
    }
}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for HeapNode {}

impl PartialEq for HeapNode {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.id == other.id
    }
}

/// A Huffman tree stored as an arena of nodes linked by index.
///
/// A tree over N distinct symbols has N leaves and N - 1 internal nodes,
/// except for a single symbol: then the root is an internal node whose only
/// child is the leaf on the left, which gives that symbol the code `0`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeTree<S> {
    nodes: Vec<Node<S>>,
    root: NodeId,
}

impl<S: Symbol> CodeTree<S> {
    /// Builds the tree by repeatedly merging the two lightest nodes. The first
    /// node taken from the queue becomes the left child.
    pub fn from_frequencies(table: &FrequencyTable<S>) -> Result<Self> {
        if table.is_empty() {
            return Err(HuffmanError::EmptyAlphabet);
        }

        let mut nodes = Vec::with_capacity(2 * table.len());
        let mut queue = BinaryHeap::with_capacity(table.len());

        for (symbol, weight) in table.iter() {
            queue.push(Reverse(HeapNode { weight, id: nodes.len() }));
            nodes.push(Node::leaf(symbol, weight));
        }

        if nodes.len() == 1 {
            let weight = nodes[0].weight;
            nodes.push(Node::internal(weight, 0, None));
            debug!(leaves = 1, "built single-symbol code tree");
            return Ok(Self { nodes, root: 1 });
        }

        let root = loop {
            let Some(Reverse(left)) = queue.pop() else {
                return Err(HuffmanError::EmptyAlphabet);
            };
            let Some(Reverse(right)) = queue.pop() else {
                break left.id;
            };

            let weight = left.weight + right.weight;
            let id = nodes.len();
            nodes.push(Node::internal(weight, left.id, Some(right.id)));
            queue.push(Reverse(HeapNode { weight, id }));
        };

        debug!(leaves = table.len(), nodes = nodes.len(), "built code tree");

        Ok(Self { nodes, root })
    }

    #[inline(always)]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline(always)]
    pub fn node(&self, id: NodeId) -> Option<&Node<S>> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[Node<S>] {
        &self.nodes
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn num_internal(&self) -> usize {
        self.nodes.len() - self.num_leaves()
    }

    /// Sum of all leaf weights, i.e. the length of the message the tree was built from.
    pub fn weight(&self) -> u64 {
        self.nodes.get(self.root).map_or(0, |n| n.weight)
    }

    /// Checks every structural invariant of the tree.
    pub fn validate(&self) -> Result<()> {
        self.walk(|_, _| {})
    }

    /// Depth-first traversal calling `visit` with each leaf symbol and its
    /// path from the root (`0` = left, `1` = right).
    ///
    /// Fails with `InvalidTreeStructure` on a node that is neither a leaf nor
    /// an internal node with two children (the single-symbol root aside), on
    /// dangling or shared links, on unreachable nodes and on weights that do
    /// not add up.
    pub fn walk<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(S, &BitSequence),
    {
        let invalid = |msg: String| HuffmanError::InvalidTreeStructure(msg);

        let mut seen = vec![false; self.nodes.len()];
        let mut path = BitSequence::new();
        let mut stack = vec![(self.root, 0usize, None)];

        while let Some((id, depth, bit)) = stack.pop() {
            let node = self.nodes.get(id)
                .ok_or_else(|| invalid(format!("node {} is out of bounds ({} nodes)", id, self.nodes.len())))?;

            if std::mem::replace(&mut seen[id], true) {
                return Err(invalid(format!("node {} is reachable more than once", id)));
            }

            if let Some(b) = bit {
                while path.len() >= depth {
                    path.pop();
                }
                path.push(b);
            }

            match (node.symbol, node.left, node.right) {
                (Some(_), None, None) if depth == 0 => {
                    return Err(invalid("the root cannot be a leaf".to_owned()));
                },
                (Some(symbol), None, None) => visit(symbol, &path),
                (None, Some(l), Some(r)) => {
                    if let (Some(a), Some(b)) = (self.nodes.get(l), self.nodes.get(r)) {
                        if a.weight.checked_add(b.weight) != Some(node.weight) {
                            return Err(invalid(format!("weight of node {} is not the sum of its children", id)));
                        }
                    }
                    stack.push((r, depth + 1, Some(true)));
                    stack.push((l, depth + 1, Some(false)));
                },
                (None, Some(l), None) if depth == 0 && self.nodes.len() == 2 => {
                    if let Some(child) = self.nodes.get(l) {
                        if child.weight != node.weight {
                            return Err(invalid(format!("weight of node {} differs from its only child", id)));
                        }
                    }
                    stack.push((l, 1, Some(false)));
                },
                _ => return Err(invalid(format!(
                    "node {} is neither a leaf nor an internal node with two children", id
                ))),
            }
        }

        if let Some(id) = seen.iter().position(|&s| !s) {
            return Err(invalid(format!("node {} is unreachable from the root", id)));
        }

        Ok(())
    }
}
