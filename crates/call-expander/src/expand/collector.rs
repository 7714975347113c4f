use crate::{
    error::{ExpandError, Result},
    expand::{DeclarationData, DefinitionData, ParameterMap, ScopeContext, ScopeKind},
    source::{Location, SourceManager},
    tree::{NodeId, NodeKind, RecordTag, Tree},
};

/// Extracts declaration and definition text of a resolved callee.
pub struct DeclarationCollector<'a> {
    tree: &'a Tree,
    sources: &'a SourceManager,
}

impl<'a> DeclarationCollector<'a> {
    pub fn new(
        tree: &'a Tree,
        sources: &'a SourceManager,
    ) -> Self {
        Self {
            tree,
            sources,
        }
    }

    pub fn declaration(
        &self,
        function: NodeId,
        parameters: ParameterMap,
    ) -> Result<DeclarationData> {
        let info = self.tree.function(function).ok_or_else(|| ExpandError::invariant("callee is not a function"))?;
        let node = self.tree.node(function);
        let range = node.range.as_ref().ok_or_else(|| ExpandError::invariant("function without a source range"))?;

        // A definition contributes its signature only.
        let mut text = match self.tree.function_body(function).and_then(|body| self.tree.node(body).range.as_ref()) {
            Some(body) => self.sources.text_between(&range.begin, &body.begin)?.trim_end().to_owned(),
            None => self.sources.text(range)?,
        };
        text.push(';');

        let parameter_types = self
            .tree
            .function_params(function)
            .into_iter()
            .filter_map(|param| match self.tree.kind(param) {
                NodeKind::Parameter {
                    ty,
                    ..
                } => Some(ty.canonical.clone()),
                _ => None,
            })
            .collect();

        Ok(DeclarationData {
            name: info.name.clone(),
            location: self.location(function)?,
            text,
            parameter_map: parameters,
            parameter_types,
            contexts: self.contexts(function),
        })
    }

    /// Body of whichever redeclaration of `function` has one.
    pub fn definition(
        &self,
        function: NodeId,
    ) -> Result<Option<DefinitionData>> {
        let Some(definition) = self.tree.definition_of(function) else {
            return Ok(None);
        };
        let Some(body) = self.tree.function_body(definition) else {
            return Ok(None);
        };
        let range =
            self.tree.node(body).range.as_ref().ok_or_else(|| ExpandError::invariant("function body without a range"))?;
        let text = self.sources.text(range)?;

        Ok(Some(DefinitionData {
            location: self.location(definition)?,
            rewritten: text.clone(),
            text,
            is_macro: false,
        }))
    }

    fn location(
        &self,
        declaration: NodeId,
    ) -> Result<Location> {
        let node = self.tree.node(declaration);
        node.loc
            .as_ref()
            .or(node.range.as_ref().map(|range| &range.begin))
            .and_then(|loc| loc.canonical())
            .map(Location::from)
            .ok_or_else(|| ExpandError::invariant(format!("declaration {} has no location", declaration.index())))
    }

    /// Enclosing namespaces and records, innermost first.
    fn contexts(
        &self,
        function: NodeId,
    ) -> Vec<ScopeContext> {
        let mut contexts = Vec::new();
        let mut current = self.scope_parent(function);
        // Bounded by the tree size so a broken semantic-parent link cannot
        // cycle.
        for _ in 0..self.tree.len() {
            let Some(scope) = current else {
                break;
            };
            match self.tree.kind(scope) {
                NodeKind::Namespace {
                    name,
                } => contexts.push(ScopeContext {
                    kind: ScopeKind::Namespace,
                    name: name.clone(),
                }),
                NodeKind::Record(info) => contexts.push(ScopeContext {
                    kind: match info.tag {
                        RecordTag::Class => ScopeKind::Class,
                        RecordTag::Struct => ScopeKind::Struct,
                        RecordTag::Union => ScopeKind::Union,
                    },
                    name: info.name.clone(),
                }),
                NodeKind::TranslationUnit => break,
                _ => {},
            }
            current = self.scope_parent(scope);
        }
        contexts
    }

    /// The semantic parent when one is recorded, else the lexical one.
    fn scope_parent(
        &self,
        id: NodeId,
    ) -> Option<NodeId> {
        let semantic = match self.tree.kind(id) {
            NodeKind::Function(info) => info.semantic_parent,
            NodeKind::Record(info) => info.semantic_parent,
            _ => None,
        };
        semantic.or_else(|| self.tree.parent(id))
    }
}

#[cfg(test)]
#[path = "../../tests/src/expand/collector_tests.rs"]
mod tests;
