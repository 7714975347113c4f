//! A lightweight preprocessor trace: macro definitions seen in a buffer and
//! the invocations of those macros, with their raw argument tokens.

mod rewriter;
mod scanner;

use crate::source::FileLocation;

pub use rewriter::{create_parameter_map, rewrite_macro};
pub use scanner::{HeaderSearch, scan_macros, trace_macros};

pub const VA_ARGS: &str = "__VA_ARGS__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroTokenKind {
    Identifier,
    Hash,
    HashHash,
    Other,
}

/// One token of a macro body or argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroToken {
    pub kind: MacroTokenKind,
    pub spelling: String,
    /// Offset relative to the start of the owning text (the macro body for
    /// definitions, the file for arguments).
    pub offset: usize,
    /// Whitespace or a comment separated this token from the previous one.
    pub leading_space: bool,
}

impl MacroToken {
    pub fn end(&self) -> usize {
        self.offset + self.spelling.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    pub name: String,
    /// The macro name in its `#define` line.
    pub location: FileLocation,
    pub function_like: bool,
    /// The last parameter collects all surplus arguments.
    pub variadic: bool,
    pub params: Vec<String>,
    /// Raw replacement list, from the first body token to the end of the last.
    pub body: String,
    /// Tokens of `body`, offsets relative to it.
    pub tokens: Vec<MacroToken>,
}

impl MacroDefinition {
    pub fn param_index(
        &self,
        name: &str,
    ) -> Option<usize> {
        self.params.iter().position(|param| param == name)
    }
}

/// One invocation of a traced macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroExpansion {
    /// Index into [`MacroTrace::definitions`].
    pub definition: usize,
    /// The macro name token of the invocation.
    pub name: FileLocation,
    /// One past the closing parenthesis, or the name for object-like macros.
    pub end: FileLocation,
    /// Raw argument token runs, split on top-level commas.
    pub args: Vec<Vec<MacroToken>>,
}

#[derive(Debug, Clone, Default)]
pub struct MacroTrace {
    definitions: Vec<MacroDefinition>,
    expansions: Vec<MacroExpansion>,
}

impl MacroTrace {
    pub fn definitions(&self) -> &[MacroDefinition] {
        &self.definitions
    }

    pub fn expansions(&self) -> &[MacroExpansion] {
        &self.expansions
    }

    pub fn definition_of(
        &self,
        expansion: &MacroExpansion,
    ) -> Option<&MacroDefinition> {
        self.definitions.get(expansion.definition)
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Text of one argument run: spellings joined by a single space wherever the
/// source had whitespace between two tokens.
pub fn argument_text(tokens: &[MacroToken]) -> String {
    let mut text = String::new();
    for (index, token) in tokens.iter().enumerate() {
        if index > 0 && token.leading_space {
            text.push(' ');
        }
        text.push_str(&token.spelling);
    }
    text
}
