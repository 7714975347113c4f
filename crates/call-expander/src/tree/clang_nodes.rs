use clang_ast::{Id, SourceLocation, SourceRange};
use serde::Deserialize;

pub type ClangNode = clang_ast::Node<Clang>;

/// Typed representation of the Clang AST node kinds call expansion reads.
///
/// Each variant corresponds to a Clang AST node `"kind"` value.
/// The `Other` fallback efficiently skips all unrecognized node kinds.
#[derive(Deserialize)]
pub enum Clang {
    // --- Scopes ---
    TranslationUnitDecl(ExprData),
    NamespaceDecl(DeclData),
    CXXRecordDecl(RecordData),
    RecordDecl(RecordData),
    ClassTemplateSpecializationDecl(RecordData),

    // --- Functions and variables ---
    FunctionDecl(DeclData),
    CXXMethodDecl(DeclData),
    CXXConstructorDecl(DeclData),
    CXXDestructorDecl(DeclData),
    CXXConversionDecl(DeclData),
    ParmVarDecl(DeclData),
    VarDecl(DeclData),

    // --- Statements ---
    CompoundStmt(ExprData),
    DeclStmt(ExprData),
    ReturnStmt(ExprData),

    // --- Calls ---
    CallExpr(ExprData),
    CXXMemberCallExpr(ExprData),
    CXXOperatorCallExpr(ExprData),
    CXXConstructExpr(ConstructData),
    CXXTemporaryObjectExpr(ConstructData),

    // --- References and operators ---
    DeclRefExpr(RefExprData),
    MemberExpr(MemberExprData),
    BinaryOperator(OperatorData),
    CompoundAssignOperator(OperatorData),
    CXXThisExpr(ExprData),
    CXXDefaultArgExpr(ExprData),

    // --- Implicit wrappers ---
    ImplicitCastExpr(ExprData),
    ExprWithCleanups(ExprData),
    ConstantExpr(ExprData),
    MaterializeTemporaryExpr(ExprData),
    CXXBindTemporaryExpr(ExprData),

    // --- Other expressions a call can be nested in ---
    ParenExpr(ExprData),
    UnaryOperator(ExprData),
    ConditionalOperator(ExprData),
    CStyleCastExpr(ExprData),
    CXXFunctionalCastExpr(ExprData),
    CXXStaticCastExpr(ExprData),
    CXXReinterpretCastExpr(ExprData),
    CXXConstCastExpr(ExprData),
    ArraySubscriptExpr(ExprData),
    InitListExpr(ExprData),
    IntegerLiteral(ExprData),
    FloatingLiteral(ExprData),
    StringLiteral(ExprData),
    CharacterLiteral(ExprData),
    CXXBoolLiteralExpr(ExprData),
    CXXNullPtrLiteralExpr(ExprData),

    // --- Catch-all ---
    // The `loc` and `range` fields MUST be deserialized even for unrecognized
    // node kinds. The `clang-ast` crate tracks "current file" state across the
    // deserialization stream via `SourceLocation`; if we skip locations for
    // nodes that set the file path, all subsequent nodes inherit an empty file.
    Other {
        #[serde(default)]
        loc: Option<SourceLocation>,
        #[serde(default)]
        range: Option<SourceRange>,
    },
}

/// Location data shared by every statement and expression.
#[derive(Deserialize, Debug)]
pub struct ExprData {
    pub loc: Option<SourceLocation>,
    pub range: Option<SourceRange>,
}

/// Common data for named declarations.
#[derive(Deserialize, Debug)]
pub struct DeclData {
    pub name: Option<String>,
    pub loc: Option<SourceLocation>,
    pub range: Option<SourceRange>,
    #[serde(rename = "type")]
    pub ty: Option<QualType>,
    #[serde(rename = "previousDecl")]
    pub previous_decl: Option<Id>,
    #[serde(rename = "parentDeclContextId")]
    pub parent_decl_context_id: Option<Id>,
    pub variadic: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct RecordData {
    pub name: Option<String>,
    pub loc: Option<SourceLocation>,
    pub range: Option<SourceRange>,
    #[serde(rename = "tagUsed")]
    pub tag_used: Option<String>,
    #[serde(rename = "parentDeclContextId")]
    pub parent_decl_context_id: Option<Id>,
    #[serde(rename = "definitionData")]
    pub definition_data: Option<DefinitionData>,
}

#[derive(Deserialize, Debug)]
pub struct DefinitionData {
    #[serde(rename = "defaultCtor")]
    pub default_ctor: Option<SpecialMember>,
}

#[derive(Deserialize, Debug)]
pub struct SpecialMember {
    pub exists: Option<bool>,
    #[serde(rename = "needsImplicit")]
    pub needs_implicit: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct ConstructData {
    pub loc: Option<SourceLocation>,
    pub range: Option<SourceRange>,
    #[serde(rename = "type")]
    pub ty: Option<QualType>,
    #[serde(rename = "ctorType")]
    pub ctor_type: Option<QualType>,
    pub elidable: Option<bool>,
}

/// DeclRefExpr data.
#[derive(Deserialize, Debug)]
pub struct RefExprData {
    pub loc: Option<SourceLocation>,
    pub range: Option<SourceRange>,
    #[serde(rename = "referencedDecl")]
    pub referenced_decl: Option<ReferencedDecl>,
}

#[derive(Deserialize, Debug)]
pub struct MemberExprData {
    pub loc: Option<SourceLocation>,
    pub range: Option<SourceRange>,
    pub name: Option<String>,
    #[serde(rename = "isArrow")]
    pub is_arrow: Option<bool>,
    #[serde(rename = "referencedMemberDecl")]
    pub referenced_member_decl: Option<Id>,
}

#[derive(Deserialize, Debug)]
pub struct OperatorData {
    pub loc: Option<SourceLocation>,
    pub range: Option<SourceRange>,
    pub opcode: Option<String>,
}

/// Inline summary of a referenced declaration.
#[derive(Deserialize, Debug)]
pub struct ReferencedDecl {
    pub id: Id,
    pub name: Option<String>,
}

/// Clang's qualified type representation.
#[derive(Deserialize, Debug)]
pub struct QualType {
    #[serde(rename = "qualType")]
    pub qual_type: Option<String>,
    #[serde(rename = "desugaredQualType")]
    pub desugared_qual_type: Option<String>,
}

impl QualType {
    pub fn written(&self) -> &str {
        self.qual_type.as_deref().unwrap_or_default()
    }

    /// The desugared spelling when clang reports one, else the written one.
    pub fn canonical(&self) -> &str {
        self.desugared_qual_type.as_deref().unwrap_or_else(|| self.written())
    }
}
