use std::collections::HashMap;

use crate::{
    error::{ExpandError, Result},
    tree::{
        Tree,
        node::{Node, NodeId, NodeKind},
    },
};

/// Incremental construction of a [`Tree`].
///
/// Nodes are appended under an existing parent; the parent index and the
/// redeclaration groups are computed once by [`TreeBuilder::finish`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the root node. A tree has exactly one.
    pub fn add_root(
        &mut self,
        node: Node,
    ) -> NodeId {
        let id = self.push(node);
        self.root = Some(id);
        id
    }

    /// Append `node` as the last child of `parent`.
    pub fn add(
        &mut self,
        parent: NodeId,
        node: Node,
    ) -> NodeId {
        let id = self.push(node);
        self.nodes[parent.index()].children.push(id);
        id
    }

    fn push(
        &mut self,
        node: Node,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn node_mut(
        &mut self,
        id: NodeId,
    ) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn finish(self) -> Result<Tree> {
        let root = self.root.ok_or_else(|| ExpandError::invariant("tree has no root node"))?;

        let mut parents = vec![None; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            for child in &node.children {
                let slot = &mut parents[child.index()];
                if slot.is_some() || *child == root {
                    return Err(ExpandError::invariant(format!("node {} has more than one parent", child.index())));
                }
                *slot = Some(NodeId(index as u32));
            }
        }

        let mut redeclarations: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if let NodeKind::Function(_) = node.kind {
                let id = NodeId(index as u32);
                let first = first_declaration(&self.nodes, id);
                redeclarations.entry(first).or_default().push(id);
            }
        }

        Ok(Tree {
            nodes: self.nodes,
            parents,
            root,
            redeclarations,
        })
    }
}

/// Follow `previous` links to the first declaration. Bounded by the node
/// count so a malformed cycle cannot loop forever.
fn first_declaration(
    nodes: &[Node],
    id: NodeId,
) -> NodeId {
    let mut current = id;
    for _ in 0..nodes.len() {
        match &nodes[current.index()].kind {
            NodeKind::Function(info) => match info.previous {
                Some(previous) if previous != current => current = previous,
                _ => break,
            },
            _ => break,
        }
    }
    current
}
