//! Arena-allocated syntax tree with a parent index.
//!
//! Nodes are addressed by [`NodeId`]; parent links are kept in a separate
//! index computed once when the tree is finished, so no node ever holds a
//! reference to another.

mod builder;
mod clang_nodes;
mod loader;
mod node;
mod types;

use std::collections::HashMap;

pub use builder::TreeBuilder;
pub use loader::load_clang_json;
pub use node::{
    CallForm, FunctionInfo, FunctionKind, ImplicitKind, Node, NodeId, NodeKind, RecordInfo, RecordTag, TypeName,
};
pub use types::normalize_type_name;

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
    root: NodeId,
    /// Function declarations grouped by their first declaration.
    redeclarations: HashMap<NodeId, Vec<NodeId>>,
}

impl Tree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(
        &self,
        id: NodeId,
    ) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(
        &self,
        id: NodeId,
    ) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn parent(
        &self,
        id: NodeId,
    ) -> Option<NodeId> {
        self.parents[id.index()]
    }

    pub fn children(
        &self,
        id: NodeId,
    ) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// All nodes reachable from the root, parents before children, siblings
    /// in source order.
    pub fn preorder(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.children(id).iter().rev().copied());
            Some(id)
        })
    }

    /// Strip compiler-inserted wrappers (implicit casts, cleanups, constant
    /// expressions, temporaries) from `id`.
    pub fn ignore_implicit(
        &self,
        id: NodeId,
    ) -> NodeId {
        let mut current = id;
        while let NodeKind::Implicit(_) = self.kind(current) {
            match self.children(current).first() {
                Some(&child) => current = child,
                None => break,
            }
        }
        current
    }

    /// Like [`Tree::ignore_implicit`], also looking through parentheses.
    pub fn ignore_parens_and_implicit(
        &self,
        id: NodeId,
    ) -> NodeId {
        let mut current = id;
        loop {
            let next = match self.kind(current) {
                NodeKind::Implicit(_) | NodeKind::Paren => self.children(current).first().copied(),
                _ => None,
            };
            match next {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Whether `parent` is an invisible wrapper around `child`: stripping
    /// implicit nodes from either lands on the same node.
    pub fn is_implicit_wrapper_of(
        &self,
        parent: NodeId,
        child: NodeId,
    ) -> bool {
        parent != child
            && matches!(self.kind(parent), NodeKind::Implicit(_))
            && self.ignore_implicit(parent) == self.ignore_implicit(child)
    }

    pub fn is_expression(
        &self,
        id: NodeId,
    ) -> bool {
        matches!(
            self.kind(id),
            NodeKind::Call(_)
                | NodeKind::Construct { .. }
                | NodeKind::DeclRef { .. }
                | NodeKind::Member { .. }
                | NodeKind::BinaryOperator { .. }
                | NodeKind::This
                | NodeKind::DefaultArg
                | NodeKind::Implicit(_)
                | NodeKind::Paren
                | NodeKind::Expr(_)
        )
    }

    pub fn function(
        &self,
        id: NodeId,
    ) -> Option<&FunctionInfo> {
        match self.kind(id) {
            NodeKind::Function(info) => Some(info),
            _ => None,
        }
    }

    /// Formal parameters of a function declaration, in order.
    pub fn function_params(
        &self,
        id: NodeId,
    ) -> Vec<NodeId> {
        self.children(id).iter().copied().filter(|&child| matches!(self.kind(child), NodeKind::Parameter { .. })).collect()
    }

    /// The body of this very declaration, if it has one.
    pub fn function_body(
        &self,
        id: NodeId,
    ) -> Option<NodeId> {
        self.children(id).iter().copied().find(|&child| matches!(self.kind(child), NodeKind::CompoundStmt))
    }

    /// The declaration among all redeclarations of `id` that carries a body.
    pub fn definition_of(
        &self,
        id: NodeId,
    ) -> Option<NodeId> {
        if self.function_body(id).is_some() {
            return Some(id);
        }
        self.redeclarations
            .values()
            .find(|group| group.contains(&id))
            .and_then(|group| group.iter().copied().find(|&decl| self.function_body(decl).is_some()))
    }

    /// A record (class, struct, union) declared with `name`, preferring one
    /// whose definition was seen.
    pub fn record_named(
        &self,
        name: &str,
    ) -> Option<&RecordInfo> {
        let mut fallback = None;
        for node in &self.nodes {
            if let NodeKind::Record(info) = &node.kind
                && info.name == name
            {
                if info.has_default_constructor.is_some() {
                    return Some(info);
                }
                if fallback.is_none() {
                    fallback = Some(info);
                }
            }
        }
        fallback
    }
}

#[cfg(test)]
#[path = "../../tests/src/tree/tree_tests.rs"]
mod tests;
