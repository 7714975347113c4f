use tracing::debug;

use crate::{
    error::{ExpandError, Result},
    expand::{
        AssigneeData, AssigneeType, CallData,
        matcher::Candidate,
        names::name_location,
    },
    source::{FileLocation, Location, Range, SourceManager, SourceRange, paths_match},
    tree::{CallForm, NodeId, NodeKind, Tree, normalize_type_name},
};

const REFUSE_MESSAGE: &str = "Refuse or unable to expand at given location";

/// Classifies how the result of a matched call is consumed and computes the
/// text range an expansion replaces.
pub struct CallContextWalker<'a> {
    tree: &'a Tree,
    sources: &'a SourceManager,
    max_depth: usize,
}

impl<'a> CallContextWalker<'a> {
    pub fn new(
        tree: &'a Tree,
        sources: &'a SourceManager,
        max_depth: usize,
    ) -> Self {
        Self {
            tree,
            sources,
            max_depth: max_depth.max(1),
        }
    }

    /// Call data for the call or construction node `call`.
    ///
    /// Fails with [`ExpandError::UnsafeContext`] when the call is not a whole
    /// statement, not returned, not assigned and not the initializer of a
    /// plain variable declaration.
    pub fn collect(
        &self,
        call: NodeId,
    ) -> Result<CallData> {
        if let Some(parent) = self.parent_skipping_implicit(call)
            && matches!(self.tree.kind(parent), NodeKind::CompoundStmt | NodeKind::TranslationUnit)
        {
            return Ok(CallData::new(self.statement_range(call, call)?));
        }

        match self.from_context(call, call, self.max_depth)? {
            Some(data) => Ok(data),
            None => Err(ExpandError::unsafe_context(REFUSE_MESSAGE)),
        }
    }

    /// The first parent that is not an invisible wrapper of its child.
    fn parent_skipping_implicit(
        &self,
        node: NodeId,
    ) -> Option<NodeId> {
        let mut child = node;
        let mut parent = self.tree.parent(child)?;
        while self.tree.is_implicit_wrapper_of(parent, child) {
            child = parent;
            parent = self.tree.parent(child)?;
        }
        Some(parent)
    }

    fn from_context(
        &self,
        call: NodeId,
        expr: NodeId,
        depth: usize,
    ) -> Result<Option<CallData>> {
        let Some(parent) = self.tree.parent(expr) else {
            return Ok(None);
        };

        match self.tree.kind(parent) {
            NodeKind::ReturnStmt => return Ok(Some(CallData::new(self.statement_range(call, parent)?))),
            NodeKind::Variable {
                name,
                ty,
                ..
            } => {
                self.ensure_plain_declaration(parent)?;
                let is_default_constructible =
                    !(ty.is_reference() || ty.is_const_qualified() || self.lacks_default_constructor(&ty.canonical));
                let assignee = AssigneeData {
                    name: name.clone(),
                    op: "=".to_owned(),
                    ty: Some(AssigneeType {
                        name: ty.canonical.clone(),
                        is_default_constructible,
                    }),
                };
                return Ok(Some(CallData {
                    range: self.statement_range(call, parent)?,
                    assignee: Some(assignee),
                    base: String::new(),
                }));
            },
            NodeKind::BinaryOperator {
                opcode,
            } => return self.assignment(call, parent, opcode).map(Some),
            _ => {},
        }

        if depth > 1 && self.tree.is_expression(parent) && !self.is_enclosing_call(parent) {
            return self.from_context(call, parent, depth - 1);
        }
        debug!("[match] context walk stopped at node {} with {} levels left", parent.index(), depth - 1);
        Ok(None)
    }

    /// A call whose value feeds another call cannot be replaced by a
    /// statement.
    fn is_enclosing_call(
        &self,
        node: NodeId,
    ) -> bool {
        match self.tree.kind(node) {
            NodeKind::Call(_) => true,
            NodeKind::Construct {
                elidable,
                ..
            } => !elidable,
            _ => false,
        }
    }

    /// A variable initialized by the call must be declared on its own: at
    /// namespace scope or in a declaration statement of a block.
    fn ensure_plain_declaration(
        &self,
        variable: NodeId,
    ) -> Result<()> {
        let plain = match self.tree.parent(variable).map(|parent| (parent, self.tree.kind(parent))) {
            Some((_, NodeKind::TranslationUnit)) => true,
            Some((statement, NodeKind::DeclStmt)) => {
                self.tree.parent(statement).is_some_and(|block| matches!(self.tree.kind(block), NodeKind::CompoundStmt))
            },
            _ => false,
        };
        if plain {
            Ok(())
        } else {
            Err(ExpandError::unsafe_context(REFUSE_MESSAGE))
        }
    }

    fn lacks_default_constructor(
        &self,
        canonical: &str,
    ) -> bool {
        if canonical.trim_end().ends_with('*') {
            return false;
        }
        normalize_type_name(canonical)
            .and_then(|name| self.tree.record_named(&name))
            .is_some_and(|record| record.has_default_constructor == Some(false))
    }

    fn assignment(
        &self,
        call: NodeId,
        operator: NodeId,
        opcode: &str,
    ) -> Result<CallData> {
        if !is_assignment(opcode) {
            return Err(ExpandError::unsafe_context(format!("Cannot expand call as operand of {opcode}")));
        }

        let lhs = self.tree.children(operator).first().map(|&lhs| self.tree.ignore_implicit(lhs));
        let name = match lhs.map(|lhs| (lhs, self.tree.kind(lhs))) {
            Some((_, NodeKind::DeclRef { name, .. })) => name.clone(),
            Some((member, NodeKind::Member { .. })) => {
                let range = self
                    .tree
                    .node(member)
                    .range
                    .as_ref()
                    .ok_or_else(|| ExpandError::invariant("member expression without a range"))?;
                self.sources.text(range)?
            },
            _ => {
                return Err(ExpandError::unsafe_context("Cannot expand call because assignee is not recognized"));
            },
        };

        Ok(CallData {
            range: self.statement_range(call, operator)?,
            assignee: Some(AssigneeData {
                name,
                op: opcode.to_owned(),
                ty: None,
            }),
            base: String::new(),
        })
    }

    /// The range of `statement`, extended over the token that terminates it.
    ///
    /// The end of a call's range is its closing parenthesis, one byte before
    /// the terminator. An overloaded operator call ends on the first byte of
    /// its last operand, so the whole operand token is skipped instead.
    fn statement_range(
        &self,
        call: NodeId,
        statement: NodeId,
    ) -> Result<Range> {
        let range = self
            .tree
            .node(statement)
            .range
            .as_ref()
            .ok_or_else(|| ExpandError::invariant(format!("node {} has no source range", statement.index())))?;
        let (begin, end) = endpoints(range)?;

        let extra = match self.tree.kind(call) {
            NodeKind::Call(CallForm::Operator) => self.token_length(end)?,
            _ => 1,
        };
        let terminator = end.offset + extra;
        let char_end = terminator + self.sources.token_length_at(&end.file, terminator)?;

        Ok(Range {
            begin: Location::from(begin),
            end: self.sources.location_at(&end.file, char_end)?,
        })
    }

    fn token_length(
        &self,
        loc: &FileLocation,
    ) -> Result<usize> {
        if loc.tok_len > 0 {
            return Ok(loc.tok_len);
        }
        self.sources.token_length_at(&loc.file, loc.offset)
    }

    /// Fill in the prefix that qualifies member references of the inlined
    /// body: the receiver of a method call, or the variable a constructor
    /// initializes.
    pub fn decorate_base(
        &self,
        data: &mut CallData,
        candidate: &Candidate,
    ) -> Result<()> {
        match *candidate {
            Candidate::Call {
                call,
                function: Some(function),
                ..
            } if self.is_member_operator_call(call, function) => {
                let receiver = self.tree.children(call).get(1).copied();
                let range = receiver
                    .and_then(|receiver| self.tree.node(receiver).range.as_ref())
                    .ok_or_else(|| ExpandError::invariant("member operator call without a receiver"))?;
                data.base = format!("{}.", self.sources.text(range)?);
            },
            Candidate::MemberCall {
                member,
                ..
            } => {
                let object = self.tree.children(member).first().map(|&object| self.tree.ignore_implicit(object));
                let on_this = object.is_some_and(|object| matches!(self.tree.kind(object), NodeKind::This));
                if !on_this
                    && let Some(range) = &self.tree.node(member).range
                    && let Some(name) = name_location(self.tree, self.sources, member)?
                {
                    data.base = self.sources.text_between(&range.begin, &name)?;
                }
            },
            Candidate::Construction {
                ..
            } => {
                if let Some(assignee) = &data.assignee {
                    data.base = format!("{}.", assignee.name);
                }
            },
            Candidate::Call {
                ..
            } => {},
        }
        Ok(())
    }

    fn is_member_operator_call(
        &self,
        call: NodeId,
        function: NodeId,
    ) -> bool {
        matches!(self.tree.kind(call), NodeKind::Call(CallForm::Operator))
            && self.tree.function(function).is_some_and(|info| info.is_method())
    }
}

fn endpoints(range: &SourceRange) -> Result<(&FileLocation, &FileLocation)> {
    let begin = range.begin.canonical().ok_or_else(|| ExpandError::invariant("range without a begin location"))?;
    let end = range.end.canonical().ok_or_else(|| ExpandError::invariant("range without an end location"))?;
    if !paths_match(&begin.file, &end.file) {
        return Err(ExpandError::RangeSpansFiles {
            begin_file: begin.file.to_string(),
            end_file: end.file.to_string(),
        });
    }
    Ok((begin, end))
}

/// Plain, compound and shift assignments.
pub fn is_assignment(opcode: &str) -> bool {
    matches!(opcode, "=" | "*=" | "/=" | "%=" | "+=" | "-=" | "<<=" | ">>=" | "&=" | "^=" | "|=")
}

#[cfg(test)]
#[path = "../../tests/src/expand/context_tests.rs"]
mod tests;
