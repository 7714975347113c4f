use super::*;
use crate::{
    expand::{QueryOptions, ScopeKind},
    macros::scan_macros,
    test_support::Fixture,
    tree::{CallForm, FunctionInfo, FunctionKind, ImplicitKind, Node, RecordInfo, RecordTag, TreeBuilder, TypeName},
};

const SOURCE: &str = "\
#define SQUARE(x) ((x) * (x))
struct Acc {
  int add(int v);
  Acc &operator+=(int v);
};
int Acc::add(int v) { return v; }
int f(int a) { return a + 1; }
void run(Acc acc, int (*fp)(int)) {
  f(2);
  acc.add(3);
  acc.operator+=(4);
  fp(5);
  int s = SQUARE(6);
}
";

struct Sample {
    fx: Fixture,
    tree: Tree,
    f: NodeId,
    plain: NodeId,
    method: NodeId,
    operator: NodeId,
    pointer: NodeId,
}

fn function(
    builder: &mut TreeBuilder,
    fx: &Fixture,
    parent: NodeId,
    info: FunctionInfo,
    text: &str,
    name: &str,
    param: &str,
) -> NodeId {
    let id = builder.add(parent, fx.node(NodeKind::Function(info), text).with_loc(fx.loc_in(text, name)));
    builder.add(
        id,
        Node::new(NodeKind::Parameter {
            name: param.to_string(),
            ty: TypeName::new("int"),
        }),
    );
    id
}

fn argument(
    builder: &mut TreeBuilder,
    fx: &Fixture,
    call: NodeId,
    statement: &str,
    text: &str,
) {
    builder.add(call, Node::new(NodeKind::Expr("IntegerLiteral")).with_range(fx.range_in(statement, text)));
}

fn member_call(
    builder: &mut TreeBuilder,
    fx: &Fixture,
    body: NodeId,
    statement: &str,
    name: &str,
    decl: NodeId,
) -> NodeId {
    let call = builder.add(body, fx.node(NodeKind::Call(CallForm::Member), statement));
    let access = &statement[..statement.find('(').unwrap_or(statement.len())];
    let member = Node::new(NodeKind::Member {
        name: name.to_string(),
        is_arrow: false,
        decl: Some(decl),
    })
    .with_range(fx.range(access))
    .with_loc(fx.loc_in(statement, name));
    let member = builder.add(call, member);
    builder.add(
        member,
        Node::new(NodeKind::DeclRef {
            name: "acc".to_string(),
            decl: None,
        }),
    );
    argument(builder, fx, call, statement, &statement[access.len() + 1..access.len() + 2]);
    call
}

fn sample() -> Sample {
    let fx = Fixture::new("match.cpp", SOURCE);
    let mut builder = TreeBuilder::new();
    let root = builder.add_root(Node::new(NodeKind::TranslationUnit));
    let record = builder.add(
        root,
        Node::new(NodeKind::Record(RecordInfo {
            name: "Acc".to_string(),
            tag: RecordTag::Struct,
            has_default_constructor: Some(true),
            semantic_parent: None,
        })),
    );
    let add = function(
        &mut builder,
        &fx,
        record,
        FunctionInfo::new("add", FunctionKind::Method),
        "int add(int v)",
        "add",
        "v",
    );
    let plus_assign = function(
        &mut builder,
        &fx,
        record,
        FunctionInfo::new("operator+=", FunctionKind::Method),
        "Acc &operator+=(int v)",
        "operator",
        "v",
    );

    let mut info = FunctionInfo::new("add", FunctionKind::Method);
    info.previous = Some(add);
    info.semantic_parent = Some(record);
    let add_def = function(&mut builder, &fx, root, info, "int Acc::add(int v) { return v; }", "add", "v");
    builder.add(add_def, fx.node(NodeKind::CompoundStmt, "{ return v; }"));

    let f = function(
        &mut builder,
        &fx,
        root,
        FunctionInfo::new("f", FunctionKind::Free),
        "int f(int a) { return a + 1; }",
        "f",
        "a",
    );
    builder.add(f, fx.node(NodeKind::CompoundStmt, "{ return a + 1; }"));

    let run = builder.add(root, Node::new(NodeKind::Function(FunctionInfo::new("run", FunctionKind::Free))));
    let fp = builder.add(
        run,
        Node::new(NodeKind::Parameter {
            name: "fp".to_string(),
            ty: TypeName::new("int (*)(int)"),
        }),
    );
    let body = builder.add(run, Node::new(NodeKind::CompoundStmt));

    let plain = builder.add(body, fx.node(NodeKind::Call(CallForm::Plain), "f(2)"));
    let cast = builder.add(plain, Node::new(NodeKind::Implicit(ImplicitKind::Cast)));
    builder.add(
        cast,
        Node::new(NodeKind::DeclRef {
            name: "f".to_string(),
            decl: Some(f),
        })
        .with_loc(fx.loc("f(2)")),
    );
    argument(&mut builder, &fx, plain, "f(2)", "2");

    let method = member_call(&mut builder, &fx, body, "acc.add(3)", "add", add);
    let operator = member_call(&mut builder, &fx, body, "acc.operator+=(4)", "operator", plus_assign);

    let pointer = builder.add(body, fx.node(NodeKind::Call(CallForm::Plain), "fp(5)"));
    let cast = builder.add(pointer, Node::new(NodeKind::Implicit(ImplicitKind::Cast)));
    builder.add(
        cast,
        Node::new(NodeKind::DeclRef {
            name: "fp".to_string(),
            decl: Some(fp),
        })
        .with_loc(fx.loc("fp(5)")),
    );

    Sample {
        tree: builder.finish().unwrap(),
        fx,
        f,
        plain,
        method,
        operator,
        pointer,
    }
}

fn candidate(
    sample: &Sample,
    id: NodeId,
) -> Candidate {
    Candidate::at(&sample.tree, id).unwrap()
}

#[test]
fn candidates_are_calls_of_functions() {
    let sample = sample();
    assert!(matches!(candidate(&sample, sample.plain), Candidate::Call { function: Some(f), .. } if f == sample.f));
    assert!(matches!(candidate(&sample, sample.method), Candidate::MemberCall { function: Some(_), .. }));
    assert_eq!(candidate(&sample, sample.method).expression(), sample.method);
    assert!(Candidate::at(&sample.tree, sample.pointer).is_none());
    assert!(Candidate::at(&sample.tree, sample.tree.root()).is_none());
}

#[test]
fn elidable_constructions_are_not_candidates() {
    let mut builder = TreeBuilder::new();
    let root = builder.add_root(Node::new(NodeKind::TranslationUnit));
    let elided = builder.add(
        root,
        Node::new(NodeKind::Construct {
            constructor: None,
            elidable: true,
        }),
    );
    let kept = builder.add(
        root,
        Node::new(NodeKind::Construct {
            constructor: None,
            elidable: false,
        }),
    );
    let tree = builder.finish().unwrap();
    assert!(Candidate::at(&tree, elided).is_none());
    assert!(matches!(Candidate::at(&tree, kept), Some(Candidate::Construction { construct, .. }) if construct == kept));
}

#[test]
fn explicit_operator_calls_match_on_the_symbol() {
    let sample = sample();
    let sources = sample.fx.sources();
    let on_symbol = sample.fx.position("+=(4)");
    let on_keyword = sample.fx.position("operator+=(4)");
    let operator = candidate(&sample, sample.operator);

    assert!(LocationMatcher::new(&sample.tree, &sources, &on_symbol, 8).matches(&operator).unwrap());
    assert!(!LocationMatcher::new(&sample.tree, &sources, &on_keyword, 8).matches(&operator).unwrap());
}

#[test]
fn a_matched_call_fills_every_requested_part() {
    let sample = sample();
    let sources = sample.fx.sources();
    let target = sample.fx.position("f(2)");
    let matcher = LocationMatcher::new(&sample.tree, &sources, &target, 8);
    let mut query = Query::new(QueryOptions::all());

    assert!(matcher.match_candidate(&candidate(&sample, sample.plain), &mut query).unwrap());

    let call = query.call().unwrap();
    assert_eq!(call.range.begin.offset, target.offset);
    assert_eq!(call.range.end.offset, target.offset + "f(2);".len());
    let declaration = query.declaration().unwrap();
    assert_eq!(declaration.text, "int f(int a);");
    assert_eq!(declaration.parameter_map.get("a").map(String::as_str), Some("2"));
    let definition = query.definition().unwrap();
    assert_eq!(definition.text, "{ return a + 1; }");
    assert!(!definition.is_macro);
}

#[test]
fn method_calls_carry_their_object_and_scope() {
    let sample = sample();
    let sources = sample.fx.sources();
    let target = sample.fx.position("add(3)");
    let matcher = LocationMatcher::new(&sample.tree, &sources, &target, 8);
    let mut query = Query::new(QueryOptions::all());

    assert!(matcher.match_candidate(&candidate(&sample, sample.method), &mut query).unwrap());

    assert_eq!(query.call().unwrap().base, "acc.");
    let declaration = query.declaration().unwrap();
    assert_eq!(declaration.text, "int add(int v);");
    assert_eq!(declaration.contexts[0].kind, ScopeKind::Struct);
    assert_eq!(declaration.parameter_map.get("v").map(String::as_str), Some("3"));
    assert_eq!(query.definition().unwrap().text, "{ return v; }");
}

#[test]
fn only_requested_parts_are_filled() {
    let sample = sample();
    let sources = sample.fx.sources();
    let target = sample.fx.position("f(2)");
    let matcher = LocationMatcher::new(&sample.tree, &sources, &target, 8);
    let mut query = Query::new(QueryOptions {
        wants_call: true,
        ..QueryOptions::default()
    });

    assert!(matcher.match_candidate(&candidate(&sample, sample.plain), &mut query).unwrap());
    assert!(query.call().is_some());
    assert!(query.declaration().is_none());
    assert!(query.definition().is_none());
}

#[test]
fn other_positions_do_not_match() {
    let sample = sample();
    let sources = sample.fx.sources();
    let target = sample.fx.position("(2)");
    let matcher = LocationMatcher::new(&sample.tree, &sources, &target, 8);
    let mut query = Query::new(QueryOptions::all());

    assert!(!matcher.match_candidate(&candidate(&sample, sample.plain), &mut query).unwrap());
    assert!(query.is_empty());
}

#[test]
fn unresolved_callees_are_an_invariant_violation() {
    let fx = Fixture::new("match.cpp", SOURCE);
    let mut builder = TreeBuilder::new();
    let root = builder.add_root(Node::new(NodeKind::TranslationUnit));
    let call = builder.add(root, fx.node(NodeKind::Call(CallForm::Plain), "f(2)"));
    builder.add(
        call,
        Node::new(NodeKind::DeclRef {
            name: "f".to_string(),
            decl: None,
        })
        .with_loc(fx.loc("f(2)")),
    );
    let tree = builder.finish().unwrap();
    let sources = fx.sources();
    let target = fx.position("f(2)");
    let unresolved = Candidate::at(&tree, call).unwrap();
    assert_eq!(unresolved.function(), None);

    let mut query = Query::new(QueryOptions::all());
    let err = LocationMatcher::new(&tree, &sources, &target, 8).match_candidate(&unresolved, &mut query).unwrap_err();
    assert!(matches!(err, ExpandError::InvariantViolation(_)));
}

#[test]
fn macro_invocations_are_rewritten() {
    let sample = sample();
    let sources = sample.fx.sources();
    let trace = scan_macros("match.cpp", SOURCE);
    let target = sample.fx.position("SQUARE(6)");
    let matcher = LocationMatcher::new(&sample.tree, &sources, &target, 8);
    let mut query = Query::new(QueryOptions::all());

    let expansion = &trace.expansions()[0];
    assert!(matcher.match_expansion(&trace, expansion, &mut query).unwrap());

    let call = query.call().unwrap();
    assert_eq!(call.range.begin.offset, target.offset);
    assert_eq!(call.range.end.offset, target.offset + "SQUARE(6)".len());
    let definition = query.definition().unwrap();
    assert!(definition.is_macro);
    assert_eq!(definition.text, "((x) * (x))");
    assert_eq!(definition.rewritten, "((6) * (6))");
    assert_eq!((definition.location.line, definition.location.column), (1, 9));
    assert!(query.declaration().is_none());
}

#[test]
fn a_recorded_macro_suppresses_the_declaration() {
    let sample = sample();
    let sources = sample.fx.sources();
    let target = sample.fx.position("f(2)");
    let matcher = LocationMatcher::new(&sample.tree, &sources, &target, 8);
    let mut query = Query::new(QueryOptions {
        wants_declaration: true,
        wants_definition: true,
        ..QueryOptions::default()
    });
    query
        .set_definition(DefinitionData {
            location: Location {
                filename: "match.cpp".to_string(),
                offset: 0,
                line: 1,
                column: 1,
            },
            text: "f".to_string(),
            rewritten: "f".to_string(),
            is_macro: true,
        })
        .unwrap();

    assert!(matcher.match_candidate(&candidate(&sample, sample.plain), &mut query).unwrap());
    assert!(query.declaration().is_none());
    assert!(query.found_macro());
}
