use std::collections::HashMap;

use clang_ast::Id;
use tracing::debug;

use crate::{
    error::Result,
    source::{FileLocation, SourceLocation, SourceRange},
    tree::{
        Tree, TreeBuilder,
        clang_nodes::{Clang, ClangNode, ConstructData, DeclData, MemberExprData, QualType, RecordData},
        node::{
            CallForm, FunctionInfo, FunctionKind, ImplicitKind, Node, NodeId, NodeKind, RecordInfo, RecordTag, TypeName,
        },
        types::normalize_type_name,
    },
};

/// Parse clang's `-ast-dump=json` output and lower it into a [`Tree`].
pub fn load_clang_json(json: &str) -> Result<Tree> {
    let root: ClangNode = serde_json::from_str(json)?;
    let mut lowering = Lowering::default();
    lowering.lower(&root, None);
    lowering.resolve_references();

    debug!(
        "[load] lowered {} nodes ({} declarations with ids, {} pending references)",
        lowering.builder.len(),
        lowering.ids.len(),
        lowering.pending.len(),
    );

    lowering.builder.finish()
}

/// A cross reference that can only be resolved once every node exists.
enum Pending {
    Decl(Id),
    Previous(Id),
    SemanticParent(Id),
    Constructor {
        class: String,
        signature: String,
    },
}

#[derive(Default)]
struct Lowering {
    builder: TreeBuilder,
    ids: HashMap<Id, NodeId>,
    pending: Vec<(NodeId, Pending)>,
    /// Constructors by class name, with their function type string.
    constructors: HashMap<String, Vec<(NodeId, String)>>,
}

impl Lowering {
    fn lower(
        &mut self,
        clang: &ClangNode,
        parent: Option<NodeId>,
    ) {
        let node = self.convert(clang);
        let id = match parent {
            Some(parent) => self.builder.add(parent, node),
            None => self.builder.add_root(node),
        };
        self.ids.insert(clang.id, id);
        self.record_pending(clang, id);

        for child in &clang.inner {
            self.lower(child, Some(id));
        }
    }

    fn convert(
        &self,
        clang: &ClangNode,
    ) -> Node {
        match &clang.kind {
            Clang::TranslationUnitDecl(d) => node(NodeKind::TranslationUnit, &d.loc, &d.range),
            Clang::NamespaceDecl(d) => node(
                NodeKind::Namespace {
                    name: d.name.clone().unwrap_or_default(),
                },
                &d.loc,
                &d.range,
            ),
            Clang::CXXRecordDecl(d) | Clang::RecordDecl(d) | Clang::ClassTemplateSpecializationDecl(d) => record(d),

            Clang::FunctionDecl(d) => function(d, FunctionKind::Free),
            Clang::CXXMethodDecl(d) => function(d, FunctionKind::Method),
            Clang::CXXConstructorDecl(d) => function(d, FunctionKind::Constructor),
            Clang::CXXDestructorDecl(d) => function(d, FunctionKind::Destructor),
            Clang::CXXConversionDecl(d) => function(d, FunctionKind::Conversion),
            Clang::ParmVarDecl(d) => node(
                NodeKind::Parameter {
                    name: d.name.clone().unwrap_or_default(),
                    ty: type_name(d.ty.as_ref()),
                },
                &d.loc,
                &d.range,
            ),
            Clang::VarDecl(d) => node(
                NodeKind::Variable {
                    name: d.name.clone().unwrap_or_default(),
                    ty: type_name(d.ty.as_ref()),
                },
                &d.loc,
                &d.range,
            ),

            Clang::CompoundStmt(d) => node(NodeKind::CompoundStmt, &d.loc, &d.range),
            Clang::DeclStmt(d) => node(NodeKind::DeclStmt, &d.loc, &d.range),
            Clang::ReturnStmt(d) => node(NodeKind::ReturnStmt, &d.loc, &d.range),

            Clang::CallExpr(d) => node(NodeKind::Call(CallForm::Plain), &d.loc, &d.range),
            Clang::CXXMemberCallExpr(d) => node(NodeKind::Call(CallForm::Member), &d.loc, &d.range),
            Clang::CXXOperatorCallExpr(d) => node(NodeKind::Call(CallForm::Operator), &d.loc, &d.range),
            Clang::CXXConstructExpr(d) | Clang::CXXTemporaryObjectExpr(d) => construct(d),

            Clang::DeclRefExpr(d) => name_ref(
                NodeKind::DeclRef {
                    name: d.referenced_decl.as_ref().and_then(|r| r.name.clone()).unwrap_or_default(),
                    decl: None,
                },
                &d.loc,
                &d.range,
            ),
            Clang::MemberExpr(d) => member(d),
            Clang::BinaryOperator(d) | Clang::CompoundAssignOperator(d) => node(
                NodeKind::BinaryOperator {
                    opcode: d.opcode.clone().unwrap_or_default(),
                },
                &d.loc,
                &d.range,
            ),
            Clang::CXXThisExpr(d) => node(NodeKind::This, &d.loc, &d.range),
            Clang::CXXDefaultArgExpr(d) => node(NodeKind::DefaultArg, &d.loc, &d.range),

            Clang::ImplicitCastExpr(d) => node(NodeKind::Implicit(ImplicitKind::Cast), &d.loc, &d.range),
            Clang::ExprWithCleanups(d) => node(NodeKind::Implicit(ImplicitKind::Cleanups), &d.loc, &d.range),
            Clang::ConstantExpr(d) => node(NodeKind::Implicit(ImplicitKind::Constant), &d.loc, &d.range),
            Clang::MaterializeTemporaryExpr(d) => {
                node(NodeKind::Implicit(ImplicitKind::MaterializeTemporary), &d.loc, &d.range)
            },
            Clang::CXXBindTemporaryExpr(d) => node(NodeKind::Implicit(ImplicitKind::BindTemporary), &d.loc, &d.range),

            Clang::ParenExpr(d) => node(NodeKind::Paren, &d.loc, &d.range),
            Clang::UnaryOperator(d) => node(NodeKind::Expr("UnaryOperator"), &d.loc, &d.range),
            Clang::ConditionalOperator(d) => node(NodeKind::Expr("ConditionalOperator"), &d.loc, &d.range),
            Clang::CStyleCastExpr(d) => node(NodeKind::Expr("CStyleCastExpr"), &d.loc, &d.range),
            Clang::CXXFunctionalCastExpr(d) => node(NodeKind::Expr("CXXFunctionalCastExpr"), &d.loc, &d.range),
            Clang::CXXStaticCastExpr(d) => node(NodeKind::Expr("CXXStaticCastExpr"), &d.loc, &d.range),
            Clang::CXXReinterpretCastExpr(d) => node(NodeKind::Expr("CXXReinterpretCastExpr"), &d.loc, &d.range),
            Clang::CXXConstCastExpr(d) => node(NodeKind::Expr("CXXConstCastExpr"), &d.loc, &d.range),
            Clang::ArraySubscriptExpr(d) => node(NodeKind::Expr("ArraySubscriptExpr"), &d.loc, &d.range),
            Clang::InitListExpr(d) => node(NodeKind::Expr("InitListExpr"), &d.loc, &d.range),
            Clang::IntegerLiteral(d) => node(NodeKind::Expr("IntegerLiteral"), &d.loc, &d.range),
            Clang::FloatingLiteral(d) => node(NodeKind::Expr("FloatingLiteral"), &d.loc, &d.range),
            Clang::StringLiteral(d) => node(NodeKind::Expr("StringLiteral"), &d.loc, &d.range),
            Clang::CharacterLiteral(d) => node(NodeKind::Expr("CharacterLiteral"), &d.loc, &d.range),
            Clang::CXXBoolLiteralExpr(d) => node(NodeKind::Expr("CXXBoolLiteralExpr"), &d.loc, &d.range),
            Clang::CXXNullPtrLiteralExpr(d) => node(NodeKind::Expr("CXXNullPtrLiteralExpr"), &d.loc, &d.range),

            Clang::Other {
                loc,
                range,
            } => node(NodeKind::Other, loc, range),
        }
    }

    fn record_pending(
        &mut self,
        clang: &ClangNode,
        id: NodeId,
    ) {
        match &clang.kind {
            Clang::FunctionDecl(d)
            | Clang::CXXMethodDecl(d)
            | Clang::CXXDestructorDecl(d)
            | Clang::CXXConversionDecl(d) => self.record_redeclaration(d, id),
            Clang::CXXConstructorDecl(d) => {
                self.record_redeclaration(d, id);
                let signature = d.ty.as_ref().map(|ty| ty.written().to_owned()).unwrap_or_default();
                self.constructors.entry(d.name.clone().unwrap_or_default()).or_default().push((id, signature));
            },
            Clang::CXXRecordDecl(d) | Clang::RecordDecl(d) | Clang::ClassTemplateSpecializationDecl(d) => {
                if let Some(parent) = d.parent_decl_context_id {
                    self.pending.push((id, Pending::SemanticParent(parent)));
                }
            },
            Clang::DeclRefExpr(d) => {
                if let Some(referenced) = &d.referenced_decl {
                    self.pending.push((id, Pending::Decl(referenced.id)));
                }
            },
            Clang::MemberExpr(d) => {
                if let Some(referenced) = d.referenced_member_decl {
                    self.pending.push((id, Pending::Decl(referenced)));
                }
            },
            Clang::CXXConstructExpr(d) | Clang::CXXTemporaryObjectExpr(d) => {
                let class = d.ty.as_ref().and_then(|ty| normalize_type_name(ty.canonical()));
                let signature = d.ctor_type.as_ref().map(|ty| ty.written().to_owned());
                if let (Some(class), Some(signature)) = (class, signature) {
                    self.pending.push((
                        id,
                        Pending::Constructor {
                            class,
                            signature,
                        },
                    ));
                }
            },
            _ => {},
        }
    }

    fn record_redeclaration(
        &mut self,
        d: &DeclData,
        id: NodeId,
    ) {
        if let Some(previous) = d.previous_decl {
            self.pending.push((id, Pending::Previous(previous)));
        }
        if let Some(parent) = d.parent_decl_context_id {
            self.pending.push((id, Pending::SemanticParent(parent)));
        }
    }

    fn resolve_references(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        let mut unresolved = 0usize;
        for (id, reference) in &pending {
            let target = match reference {
                Pending::Decl(target) | Pending::Previous(target) | Pending::SemanticParent(target) => {
                    self.ids.get(target).copied()
                },
                Pending::Constructor {
                    class,
                    signature,
                } => self
                    .constructors
                    .get(class)
                    .and_then(|ctors| ctors.iter().find(|(_, ty)| ty == signature))
                    .map(|(ctor, _)| *ctor),
            };
            let Some(target) = target else {
                unresolved += 1;
                continue;
            };

            match (&mut self.builder.node_mut(*id).kind, reference) {
                (NodeKind::DeclRef { decl, .. } | NodeKind::Member { decl, .. }, Pending::Decl(_)) => {
                    *decl = Some(target);
                },
                (NodeKind::Function(info), Pending::Previous(_)) => info.previous = Some(target),
                (NodeKind::Function(info), Pending::SemanticParent(_)) => info.semantic_parent = Some(target),
                (NodeKind::Record(info), Pending::SemanticParent(_)) => info.semantic_parent = Some(target),
                (NodeKind::Construct { constructor, .. }, Pending::Constructor { .. }) => {
                    *constructor = Some(target);
                },
                _ => {},
            }
        }
        if unresolved > 0 {
            debug!("[load] {unresolved} references point outside the dumped tree");
        }
        self.pending = pending;
    }
}

fn node(
    kind: NodeKind,
    loc: &Option<clang_ast::SourceLocation>,
    range: &Option<clang_ast::SourceRange>,
) -> Node {
    Node {
        kind,
        loc: loc.as_ref().map(source_location),
        range: range.as_ref().map(source_range),
        children: Vec::new(),
    }
}

/// Clang dumps no `loc` for references. A one-token range is the name token;
/// anything longer (qualifiers, template arguments, operator brackets) is left
/// for [`name_location`](crate::expand::name_location) to search in the text.
fn name_ref(
    kind: NodeKind,
    loc: &Option<clang_ast::SourceLocation>,
    range: &Option<clang_ast::SourceRange>,
) -> Node {
    let mut lowered = node(kind, loc, range);
    if lowered.loc.is_none()
        && let Some(range) = &lowered.range
        && range.begin.canonical().map(|loc| loc.offset) == range.end.canonical().map(|loc| loc.offset)
    {
        lowered.loc = Some(range.begin.clone());
    }
    lowered
}

fn member(d: &MemberExprData) -> Node {
    let kind = NodeKind::Member {
        name: d.name.clone().unwrap_or_default(),
        is_arrow: d.is_arrow.unwrap_or(false),
        decl: None,
    };
    name_ref(kind, &d.loc, &d.range)
}

fn construct(d: &ConstructData) -> Node {
    let mut lowered = node(
        NodeKind::Construct {
            constructor: None,
            elidable: d.elidable.unwrap_or(false),
        },
        &d.loc,
        &d.range,
    );
    if lowered.loc.is_none() {
        lowered.loc = lowered.range.as_ref().map(|r| r.begin.clone());
    }
    lowered
}

fn function(
    d: &DeclData,
    kind: FunctionKind,
) -> Node {
    let mut info = FunctionInfo::new(d.name.clone().unwrap_or_default(), kind);
    info.signature = d.ty.as_ref().map(|ty| ty.written().to_owned()).unwrap_or_default();
    info.variadic = d.variadic.unwrap_or(false);
    node(NodeKind::Function(info), &d.loc, &d.range)
}

fn record(d: &RecordData) -> Node {
    let tag = match d.tag_used.as_deref() {
        Some("class") => RecordTag::Class,
        Some("union") => RecordTag::Union,
        _ => RecordTag::Struct,
    };
    let has_default_constructor = d.definition_data.as_ref().map(|data| {
        data.default_ctor
            .as_ref()
            .is_some_and(|ctor| ctor.exists.unwrap_or(false) || ctor.needs_implicit.unwrap_or(false))
    });
    node(
        NodeKind::Record(RecordInfo {
            name: d.name.clone().unwrap_or_default(),
            tag,
            has_default_constructor,
            semantic_parent: None,
        }),
        &d.loc,
        &d.range,
    )
}

fn type_name(ty: Option<&QualType>) -> TypeName {
    match ty {
        Some(ty) => TypeName::new(ty.canonical()),
        None => TypeName::default(),
    }
}

fn file_location(bare: &clang_ast::BareSourceLocation) -> FileLocation {
    FileLocation {
        file: bare.file.clone(),
        offset: bare.offset,
        line: bare.line as u32,
        col: bare.col as u32,
        tok_len: bare.tok_len,
    }
}

fn source_location(loc: &clang_ast::SourceLocation) -> SourceLocation {
    SourceLocation {
        spelling: loc.spelling_loc.as_ref().map(file_location),
        expansion: loc.expansion_loc.as_ref().map(file_location),
    }
}

fn source_range(range: &clang_ast::SourceRange) -> SourceRange {
    SourceRange {
        begin: source_location(&range.begin),
        end: source_location(&range.end),
    }
}
