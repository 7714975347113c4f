use crate::{
    error::{ExpandError, Result},
    expand::ParameterMap,
    source::SourceManager,
    tree::{CallForm, NodeId, NodeKind, Tree},
};

/// Operators that never take their operand on the right-hand side, even with
/// two arguments.
const NON_INFIX_OPERATORS: [&str; 5] = ["++", "--", "()", "[]", "->"];

/// Binds the formal parameters of a callee to the argument text of one call.
pub struct ParameterBinder<'a> {
    tree: &'a Tree,
    sources: &'a SourceManager,
}

impl<'a> ParameterBinder<'a> {
    pub fn new(
        tree: &'a Tree,
        sources: &'a SourceManager,
    ) -> Self {
        Self {
            tree,
            sources,
        }
    }

    /// Map parameters of `function` to the arguments of `call`, a call or
    /// construction node.
    pub fn bind(
        &self,
        call: NodeId,
        function: NodeId,
    ) -> Result<ParameterMap> {
        let args = self.arguments(call);
        let info = self.tree.function(function).ok_or_else(|| ExpandError::invariant("callee is not a function"))?;
        let params = self.tree.function_params(function);

        if matches!(self.tree.kind(call), NodeKind::Call(CallForm::Operator)) && info.is_method() {
            let symbol = info.operator_symbol().unwrap_or_default();
            if args.len() <= 1 {
                return Ok(ParameterMap::new());
            }
            if is_infix_binary(symbol, args.len()) {
                let mut map = ParameterMap::new();
                let param = params.first().ok_or_else(|| {
                    ExpandError::invariant(format!("binary {} declares no parameter", info.name))
                })?;
                self.insert(&mut map, *param, args[1])?;
                return Ok(map);
            }
            // `obj(a, b)` and `obj[i]`: the object is the first argument.
            return self.positional(&params, &args[1..], info.variadic, &info.name);
        }

        self.positional(&params, &args, info.variadic, &info.name)
    }

    fn positional(
        &self,
        params: &[NodeId],
        args: &[NodeId],
        variadic: bool,
        name: &str,
    ) -> Result<ParameterMap> {
        let mut map = ParameterMap::new();
        let mut params = params.iter();
        for &arg in args {
            if let NodeKind::DefaultArg = self.tree.kind(self.tree.ignore_implicit(arg)) {
                continue;
            }
            match params.next() {
                Some(&param) => self.insert(&mut map, param, arg)?,
                None if variadic => break,
                None => {
                    return Err(ExpandError::invariant(format!("{name} is called with more arguments than parameters")));
                },
            }
        }
        Ok(map)
    }

    /// Call arguments: every child after the callee, or every child of a
    /// construction.
    fn arguments(
        &self,
        call: NodeId,
    ) -> Vec<NodeId> {
        let children = self.tree.children(call);
        match self.tree.kind(call) {
            NodeKind::Call(_) => children.iter().skip(1).copied().collect(),
            _ => children.to_vec(),
        }
    }

    fn insert(
        &self,
        map: &mut ParameterMap,
        param: NodeId,
        arg: NodeId,
    ) -> Result<()> {
        let NodeKind::Parameter {
            name,
            ..
        } = self.tree.kind(param)
        else {
            return Err(ExpandError::invariant("parameter list holds a non-parameter"));
        };
        // Unnamed parameters cannot be referenced from the body.
        if name.is_empty() {
            return Ok(());
        }

        let arg = self.tree.ignore_implicit(arg);
        let range = self
            .tree
            .node(arg)
            .range
            .as_ref()
            .ok_or_else(|| ExpandError::invariant(format!("argument for {name} has no source range")))?;
        map.insert(name.clone(), self.sources.text(range)?);
        Ok(())
    }
}

/// Whether an overloaded operator call with `arg_count` arguments is written
/// `lhs <op> rhs`.
pub fn is_infix_binary(
    symbol: &str,
    arg_count: usize,
) -> bool {
    arg_count == 2 && !NON_INFIX_OPERATORS.contains(&symbol)
}

#[cfg(test)]
#[path = "../../tests/src/expand/binder_tests.rs"]
mod tests;
