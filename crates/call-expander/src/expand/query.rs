use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    error::{ExpandError, Result},
    source::{Location, Range},
};

/// Formal parameter name to the source text of its argument.
pub type ParameterMap = BTreeMap<String, String>;

/// Which parts of a [`Query`] the caller wants filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryOptions {
    pub wants_call: bool,
    pub wants_declaration: bool,
    pub wants_definition: bool,
    pub wants_rewritten: bool,
}

impl QueryOptions {
    pub fn all() -> Self {
        Self {
            wants_call: true,
            wants_declaration: true,
            wants_definition: true,
            wants_rewritten: true,
        }
    }

    /// Rewriting needs the parameter map, which lives in the declaration.
    pub fn requires_declaration(&self) -> bool {
        self.wants_declaration || self.wants_rewritten
    }

    pub fn requires_definition(&self) -> bool {
        self.wants_definition || self.wants_rewritten
    }
}

/// A slot that accepts exactly one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WriteOnce<T>(Option<T>);

impl<T> Default for WriteOnce<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> WriteOnce<T> {
    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub fn into_inner(self) -> Option<T> {
        self.0
    }

    fn set(
        &mut self,
        value: T,
        slot: &str,
    ) -> Result<()> {
        if self.0.is_some() {
            return Err(ExpandError::invariant(format!("{slot} data written twice")));
        }
        self.0 = Some(value);
        Ok(())
    }
}

/// How the variable receiving the call result is typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeType {
    pub name: String,
    pub is_default_constructible: bool,
}

/// The variable or left-hand side that receives the call's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssigneeData {
    pub name: String,
    pub op: String,
    /// Only known when the call initializes a fresh variable.
    #[serde(rename = "type")]
    pub ty: Option<AssigneeType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallData {
    /// Everything to replace: the call plus the statement consuming it.
    pub range: Range,
    pub assignee: Option<AssigneeData>,
    /// Prefix for member references inside the inlined body, e.g. `obj.`.
    pub base: String,
}

impl CallData {
    pub fn new(range: Range) -> Self {
        Self {
            range,
            assignee: None,
            base: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Namespace,
    Class,
    Struct,
    Union,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeContext {
    pub kind: ScopeKind,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationData {
    pub name: String,
    pub location: Location,
    /// Always ends in `;`.
    pub text: String,
    pub parameter_map: ParameterMap,
    pub parameter_types: Vec<String>,
    /// Enclosing scopes, innermost first.
    pub contexts: Vec<ScopeContext>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionData {
    pub location: Location,
    pub text: String,
    pub rewritten: String,
    pub is_macro: bool,
}

/// The result of one resolution request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    #[serde(skip)]
    options: QueryOptions,
    call: WriteOnce<CallData>,
    declaration: WriteOnce<DeclarationData>,
    definition: WriteOnce<DefinitionData>,
}

impl Query {
    pub fn new(options: QueryOptions) -> Self {
        Self {
            options,
            call: WriteOnce::default(),
            declaration: WriteOnce::default(),
            definition: WriteOnce::default(),
        }
    }

    pub fn options(&self) -> QueryOptions {
        self.options
    }

    pub fn call(&self) -> Option<&CallData> {
        self.call.get()
    }

    pub fn declaration(&self) -> Option<&DeclarationData> {
        self.declaration.get()
    }

    pub fn definition(&self) -> Option<&DefinitionData> {
        self.definition.get()
    }

    /// Nothing matched the target.
    pub fn is_empty(&self) -> bool {
        !self.call.is_set() && !self.declaration.is_set() && !self.definition.is_set()
    }

    pub fn found_macro(&self) -> bool {
        self.definition().is_some_and(|definition| definition.is_macro)
    }

    pub(crate) fn set_call(
        &mut self,
        call: CallData,
    ) -> Result<()> {
        self.call.set(call, "call")
    }

    pub(crate) fn set_declaration(
        &mut self,
        declaration: DeclarationData,
    ) -> Result<()> {
        if self.found_macro() {
            return Err(ExpandError::invariant("declaration written after a macro definition"));
        }
        self.declaration.set(declaration, "declaration")
    }

    pub(crate) fn set_definition(
        &mut self,
        definition: DefinitionData,
    ) -> Result<()> {
        self.definition.set(definition, "definition")
    }
}

#[cfg(test)]
#[path = "../../tests/src/expand/query_tests.rs"]
mod tests;
