use tracing::{debug, info};

use crate::{
    error::{ExpandError, Result},
    expand::{
        CallData, DefinitionData, Query,
        binder::ParameterBinder,
        collector::DeclarationCollector,
        context::CallContextWalker,
        names::name_location,
    },
    macros::{MacroExpansion, MacroTrace, create_parameter_map, rewrite_macro},
    source::{FilePosition, Location, Range, SourceLocation, SourceManager, paths_match},
    tree::{NodeId, NodeKind, Tree},
};

/// Bytes from the start of a member name to the symbol of an explicitly
/// spelled operator, `a.operator+(b)`.
const OPERATOR_KEYWORD_LEN: isize = 8;

/// A tree node that invokes something callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// A free function, static method or overloaded operator, called through
    /// a name reference.
    Call {
        call: NodeId,
        callee_ref: NodeId,
        function: Option<NodeId>,
    },
    /// A method called through member access, `obj.f()` or plain `f()` on
    /// `this`.
    MemberCall {
        call: NodeId,
        member: NodeId,
        function: Option<NodeId>,
    },
    Construction {
        construct: NodeId,
        constructor: Option<NodeId>,
    },
}

impl Candidate {
    /// The candidate rooted at `id`, if it is one.
    pub fn at(
        tree: &Tree,
        id: NodeId,
    ) -> Option<Self> {
        match tree.kind(id) {
            NodeKind::Call(_) => {
                let callee = tree.ignore_parens_and_implicit(*tree.children(id).first()?);
                match tree.kind(callee) {
                    NodeKind::DeclRef {
                        decl,
                        ..
                    } => Some(Self::Call {
                        call: id,
                        callee_ref: callee,
                        function: function_decl(tree, *decl)?,
                    }),
                    NodeKind::Member {
                        decl,
                        ..
                    } => Some(Self::MemberCall {
                        call: id,
                        member: callee,
                        function: function_decl(tree, *decl)?,
                    }),
                    _ => None,
                }
            },
            NodeKind::Construct {
                constructor,
                elidable: false,
            } => Some(Self::Construction {
                construct: id,
                constructor: *constructor,
            }),
            _ => None,
        }
    }

    /// The call or construction expression itself.
    pub fn expression(&self) -> NodeId {
        match *self {
            Self::Call {
                call,
                ..
            }
            | Self::MemberCall {
                call,
                ..
            } => call,
            Self::Construction {
                construct,
                ..
            } => construct,
        }
    }

    pub fn function(&self) -> Option<NodeId> {
        match *self {
            Self::Call {
                function,
                ..
            }
            | Self::MemberCall {
                function,
                ..
            } => function,
            Self::Construction {
                constructor,
                ..
            } => constructor,
        }
    }
}

/// `Some(None)` for an unresolved reference, `None` when the reference names
/// something other than a function (a function pointer, a field).
fn function_decl(
    tree: &Tree,
    decl: Option<NodeId>,
) -> Option<Option<NodeId>> {
    match decl {
        Some(decl) => tree.function(decl).map(|_| Some(decl)),
        None => Some(None),
    }
}

/// Compares candidates against the target position and fills the query on a
/// match.
pub struct LocationMatcher<'a> {
    tree: &'a Tree,
    sources: &'a SourceManager,
    target: &'a FilePosition,
    max_depth: usize,
}

impl<'a> LocationMatcher<'a> {
    pub fn new(
        tree: &'a Tree,
        sources: &'a SourceManager,
        target: &'a FilePosition,
        max_depth: usize,
    ) -> Self {
        Self {
            tree,
            sources,
            target,
            max_depth,
        }
    }

    /// The token that identifies what is called: the function name, the
    /// operator symbol, the member name or the start of a construction.
    pub fn invocation_location(
        &self,
        candidate: &Candidate,
    ) -> Result<Option<SourceLocation>> {
        match *candidate {
            Candidate::Call {
                callee_ref,
                ..
            } => name_location(self.tree, self.sources, callee_ref),
            Candidate::MemberCall {
                member,
                function,
                ..
            } => {
                let Some(loc) = name_location(self.tree, self.sources, member)? else {
                    return Ok(None);
                };
                let is_operator = function
                    .and_then(|function| self.tree.function(function))
                    .is_some_and(|info| info.operator_symbol().is_some());
                Ok(Some(if is_operator { loc.with_offset(OPERATOR_KEYWORD_LEN) } else { loc }))
            },
            Candidate::Construction {
                construct,
                ..
            } => {
                let node = self.tree.node(construct);
                Ok(node.loc.clone().or_else(|| node.range.as_ref().map(|range| range.begin.clone())))
            },
        }
    }

    /// Whether the candidate is invoked at the target. Source text is only
    /// consulted for candidates whose range covers the target.
    pub fn matches(
        &self,
        candidate: &Candidate,
    ) -> Result<bool> {
        if let Some(range) = &self.tree.node(candidate.expression()).range
            && !range.covers(self.target)
        {
            return Ok(false);
        }
        Ok(self.invocation_location(candidate)?.is_some_and(|loc| loc.same_position(self.target)))
    }

    pub fn expansion_matches(
        &self,
        expansion: &MacroExpansion,
    ) -> bool {
        expansion.name.offset == self.target.offset && paths_match(&expansion.name.file, &self.target.file)
    }

    /// Record a matched macro invocation. Returns whether it matched.
    pub fn match_expansion(
        &self,
        trace: &MacroTrace,
        expansion: &MacroExpansion,
        query: &mut Query,
    ) -> Result<bool> {
        if !self.expansion_matches(expansion) {
            return Ok(false);
        }
        let definition = trace
            .definition_of(expansion)
            .ok_or_else(|| ExpandError::invariant("macro expansion without a definition"))?;
        info!("[match] macro {} at offset {}", definition.name, expansion.name.offset);

        let options = query.options();
        if options.wants_call || options.wants_rewritten {
            query.set_call(CallData::new(Range {
                begin: Location::from(&expansion.name),
                end: Location::from(&expansion.end),
            }))?;
        }

        let parameters = create_parameter_map(definition, &expansion.args)?;
        query.set_definition(DefinitionData {
            location: Location::from(&definition.location),
            text: definition.body.clone(),
            rewritten: rewrite_macro(definition, &parameters),
            is_macro: true,
        })?;
        Ok(true)
    }

    /// Record a matched call or construction. Returns whether it matched.
    pub fn match_candidate(
        &self,
        candidate: &Candidate,
        query: &mut Query,
    ) -> Result<bool> {
        if !self.matches(candidate)? {
            return Ok(false);
        }
        let call = candidate.expression();
        let function = candidate.function().ok_or_else(|| {
            ExpandError::invariant(format!("call at node {} matched without a function declaration", call.index()))
        })?;
        if let Some(info) = self.tree.function(function) {
            info!("[match] {} called at offset {}", info.name, self.target.offset);
        }

        let parameters = ParameterBinder::new(self.tree, self.sources).bind(call, function)?;

        let options = query.options();
        if options.wants_call || options.wants_rewritten {
            let walker = CallContextWalker::new(self.tree, self.sources, self.max_depth);
            let mut data = walker.collect(call)?;
            walker.decorate_base(&mut data, candidate)?;
            query.set_call(data)?;
        }

        if query.found_macro() {
            debug!("[match] macro definition already recorded, skipping declaration");
            return Ok(true);
        }

        let collector = DeclarationCollector::new(self.tree, self.sources);
        if options.requires_declaration() {
            query.set_declaration(collector.declaration(function, parameters)?)?;
        }
        if options.requires_definition()
            && let Some(definition) = collector.definition(function)?
        {
            query.set_definition(definition)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
#[path = "../../tests/src/expand/matcher_tests.rs"]
mod tests;
