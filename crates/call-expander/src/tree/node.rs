use crate::source::{SourceLocation, SourceRange};

/// Stable handle of a node inside a [`Tree`](super::Tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One syntax node.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// The name location of declarations and references, when known.
    pub loc: Option<SourceLocation>,
    pub range: Option<SourceRange>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            loc: None,
            range: None,
            children: Vec::new(),
        }
    }

    pub fn with_loc(
        mut self,
        loc: SourceLocation,
    ) -> Self {
        self.loc = Some(loc);
        self
    }

    pub fn with_range(
        mut self,
        range: SourceRange,
    ) -> Self {
        self.range = Some(range);
        self
    }
}

/// The node kinds call expansion cares about. Everything else collapses into
/// [`NodeKind::Other`] (statements, declarations) or [`NodeKind::Expr`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    TranslationUnit,
    Namespace {
        name: String,
    },
    Record(RecordInfo),
    Function(FunctionInfo),
    /// A formal parameter.
    Parameter {
        name: String,
        ty: TypeName,
    },
    /// A variable; its initializer, if any, is the last child.
    Variable {
        name: String,
        ty: TypeName,
    },
    CompoundStmt,
    DeclStmt,
    ReturnStmt,
    /// Any call. The first child is the callee, the rest are the arguments.
    Call(CallForm),
    /// A constructor invocation; children are the arguments.
    Construct {
        constructor: Option<NodeId>,
        elidable: bool,
    },
    /// A reference to a named declaration. `loc` is the name token.
    DeclRef {
        name: String,
        decl: Option<NodeId>,
    },
    /// `base.name` or `base->name`; the only child is the base. `loc` is the
    /// start of the member name.
    Member {
        name: String,
        is_arrow: bool,
        decl: Option<NodeId>,
    },
    /// Built-in binary operators, including compound assignments.
    BinaryOperator {
        opcode: String,
    },
    This,
    /// A default argument the compiler filled in.
    DefaultArg,
    /// A wrapper the compiler inserted around its only child.
    Implicit(ImplicitKind),
    Paren,
    /// Any other expression, by clang kind name.
    Expr(&'static str),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallForm {
    Plain,
    /// Callee is a member access, the object is not among the arguments.
    Member,
    /// Overloaded operator syntax; for member operators the object is the
    /// first argument.
    Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImplicitKind {
    Cast,
    Cleanups,
    Constant,
    MaterializeTemporary,
    BindTemporary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Free,
    Method,
    Constructor,
    Destructor,
    Conversion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: String,
    pub kind: FunctionKind,
    /// Clang's function type string, e.g. `void (int, float)`.
    pub signature: String,
    pub variadic: bool,
    /// The declaration this one redeclares.
    pub previous: Option<NodeId>,
    /// Semantic parent when it differs from the lexical one (out-of-line
    /// member definitions).
    pub semantic_parent: Option<NodeId>,
}

impl FunctionInfo {
    pub fn new(
        name: impl Into<String>,
        kind: FunctionKind,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            signature: String::new(),
            variadic: false,
            previous: None,
            semantic_parent: None,
        }
    }

    pub fn is_method(&self) -> bool {
        !matches!(self.kind, FunctionKind::Free)
    }

    /// The operator symbol of an overloaded operator, e.g. `+=` for
    /// `operator+=`.
    pub fn operator_symbol(&self) -> Option<&str> {
        let rest = self.name.strip_prefix("operator")?;
        let symbol = rest.trim_start();
        let is_symbol = symbol.chars().next().is_some_and(|c| !c.is_alphanumeric() && c != '_');
        is_symbol.then_some(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTag {
    Class,
    Struct,
    Union,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordInfo {
    pub name: String,
    pub tag: RecordTag,
    /// `None` when only a forward declaration was seen.
    pub has_default_constructor: Option<bool>,
    pub semantic_parent: Option<NodeId>,
}

/// A type in canonical (desugared) form, typedefs and aliases resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeName {
    pub canonical: String,
}

impl TypeName {
    pub fn new(canonical: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
        }
    }

    pub fn is_reference(&self) -> bool {
        self.canonical.trim_end().ends_with('&')
    }

    /// Whether the outermost type is const-qualified: `const int`,
    /// `int *const`, but not `const int *`.
    pub fn is_const_qualified(&self) -> bool {
        let ty = self.canonical.trim();
        let outer = match ty.rfind(['*', '&']) {
            Some(idx) => &ty[idx + 1..],
            None => ty,
        };
        outer.split(|c: char| !c.is_alphanumeric() && c != '_').any(|word| word == "const")
    }
}
