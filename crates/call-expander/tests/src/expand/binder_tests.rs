use super::*;
use crate::{
    test_support::Fixture,
    tree::{FunctionInfo, FunctionKind, ImplicitKind, Node, TreeBuilder, TypeName},
};

const SOURCE: &str = "\
struct Vec {
  Vec operator+(const Vec &o) const;
  int operator()(int i, int j);
  Vec &operator++();
  Vec(int x, int y);
};
int f(int a, int b = 2, ...);
void g(int);
void use(Vec v, Vec w) {
  f(10 + 20, 30, 40);
  f(70);
  v + w;
  v(50, 60);
  ++v;
  g(90);
  Vec made(11, 12);
}
";

fn fixture() -> Fixture {
    Fixture::new("bind.cpp", SOURCE)
}

fn function(
    builder: &mut TreeBuilder,
    parent: NodeId,
    name: &str,
    kind: FunctionKind,
    params: &[&str],
    variadic: bool,
) -> NodeId {
    let mut info = FunctionInfo::new(name, kind);
    info.variadic = variadic;
    let id = builder.add(parent, Node::new(NodeKind::Function(info)));
    for param in params {
        builder.add(
            id,
            Node::new(NodeKind::Parameter {
                name: param.to_string(),
                ty: TypeName::new("int"),
            }),
        );
    }
    id
}

fn callee(
    builder: &mut TreeBuilder,
    call: NodeId,
    name: &str,
    decl: NodeId,
) {
    let cast = builder.add(call, Node::new(NodeKind::Implicit(ImplicitKind::Cast)));
    builder.add(
        cast,
        Node::new(NodeKind::DeclRef {
            name: name.to_string(),
            decl: Some(decl),
        }),
    );
}

fn arg(
    builder: &mut TreeBuilder,
    fx: &Fixture,
    call: NodeId,
    statement: &str,
    text: &str,
) -> NodeId {
    builder.add(call, Node::new(NodeKind::Expr("Literal")).with_range(fx.range_in(statement, text)))
}

fn bind(
    builder: TreeBuilder,
    fx: &Fixture,
    call: NodeId,
    function: NodeId,
) -> Result<ParameterMap> {
    let tree = builder.finish().unwrap();
    let sources = fx.sources();
    ParameterBinder::new(&tree, &sources).bind(call, function)
}

fn map(pairs: &[(&str, &str)]) -> ParameterMap {
    pairs.iter().map(|(name, text)| (name.to_string(), text.to_string())).collect()
}

#[test]
fn binds_arguments_in_order() {
    let fx = fixture();
    let mut builder = TreeBuilder::new();
    let root = builder.add_root(Node::new(NodeKind::TranslationUnit));
    let f = function(&mut builder, root, "f", FunctionKind::Free, &["a", "b"], true);
    let call = builder.add(root, Node::new(NodeKind::Call(CallForm::Plain)));
    callee(&mut builder, call, "f", f);
    for text in ["10 + 20", "30", "40"] {
        arg(&mut builder, &fx, call, "f(10 + 20, 30, 40)", text);
    }

    assert_eq!(bind(builder, &fx, call, f).unwrap(), map(&[("a", "10 + 20"), ("b", "30")]));
}

#[test]
fn default_arguments_are_not_bound() {
    let fx = fixture();
    let mut builder = TreeBuilder::new();
    let root = builder.add_root(Node::new(NodeKind::TranslationUnit));
    let f = function(&mut builder, root, "f", FunctionKind::Free, &["a", "b"], true);
    let call = builder.add(root, Node::new(NodeKind::Call(CallForm::Plain)));
    callee(&mut builder, call, "f", f);
    arg(&mut builder, &fx, call, "f(70)", "70");
    builder.add(call, Node::new(NodeKind::DefaultArg));

    assert_eq!(bind(builder, &fx, call, f).unwrap(), map(&[("a", "70")]));
}

#[test]
fn unnamed_parameters_are_skipped() {
    let fx = fixture();
    let mut builder = TreeBuilder::new();
    let root = builder.add_root(Node::new(NodeKind::TranslationUnit));
    let g = function(&mut builder, root, "g", FunctionKind::Free, &[""], false);
    let call = builder.add(root, Node::new(NodeKind::Call(CallForm::Plain)));
    callee(&mut builder, call, "g", g);
    arg(&mut builder, &fx, call, "g(90)", "90");

    assert!(bind(builder, &fx, call, g).unwrap().is_empty());
}

#[test]
fn surplus_arguments_need_a_variadic_callee() {
    let fx = fixture();
    let mut builder = TreeBuilder::new();
    let root = builder.add_root(Node::new(NodeKind::TranslationUnit));
    let g = function(&mut builder, root, "g", FunctionKind::Free, &["n"], false);
    let call = builder.add(root, Node::new(NodeKind::Call(CallForm::Plain)));
    callee(&mut builder, call, "g", g);
    arg(&mut builder, &fx, call, "f(10 + 20, 30, 40)", "30");
    arg(&mut builder, &fx, call, "f(10 + 20, 30, 40)", "40");

    let err = bind(builder, &fx, call, g).unwrap_err();
    assert!(matches!(err, ExpandError::InvariantViolation(_)));
}

#[test]
fn infix_member_operators_bind_the_right_operand() {
    let fx = fixture();
    let mut builder = TreeBuilder::new();
    let root = builder.add_root(Node::new(NodeKind::TranslationUnit));
    let plus = function(&mut builder, root, "operator+", FunctionKind::Method, &["o"], false);
    let call = builder.add(root, Node::new(NodeKind::Call(CallForm::Operator)));
    callee(&mut builder, call, "operator+", plus);
    arg(&mut builder, &fx, call, "v + w", "v");
    let cast = builder.add(call, Node::new(NodeKind::Implicit(ImplicitKind::Cast)));
    arg(&mut builder, &fx, cast, "v + w", "w");

    assert_eq!(bind(builder, &fx, call, plus).unwrap(), map(&[("o", "w")]));
}

#[test]
fn call_operators_skip_the_object() {
    let fx = fixture();
    let mut builder = TreeBuilder::new();
    let root = builder.add_root(Node::new(NodeKind::TranslationUnit));
    let apply = function(&mut builder, root, "operator()", FunctionKind::Method, &["i", "j"], false);
    let call = builder.add(root, Node::new(NodeKind::Call(CallForm::Operator)));
    callee(&mut builder, call, "operator()", apply);
    for text in ["v", "50", "60"] {
        arg(&mut builder, &fx, call, "v(50, 60)", text);
    }

    assert_eq!(bind(builder, &fx, call, apply).unwrap(), map(&[("i", "50"), ("j", "60")]));
}

#[test]
fn unary_member_operators_bind_nothing() {
    let fx = fixture();
    let mut builder = TreeBuilder::new();
    let root = builder.add_root(Node::new(NodeKind::TranslationUnit));
    let increment = function(&mut builder, root, "operator++", FunctionKind::Method, &[], false);
    let call = builder.add(root, Node::new(NodeKind::Call(CallForm::Operator)));
    callee(&mut builder, call, "operator++", increment);
    arg(&mut builder, &fx, call, "++v", "v");

    assert!(bind(builder, &fx, call, increment).unwrap().is_empty());
}

#[test]
fn constructions_bind_every_child() {
    let fx = fixture();
    let mut builder = TreeBuilder::new();
    let root = builder.add_root(Node::new(NodeKind::TranslationUnit));
    let ctor = function(&mut builder, root, "Vec", FunctionKind::Constructor, &["x", "y"], false);
    let construct = builder.add(
        root,
        Node::new(NodeKind::Construct {
            constructor: Some(ctor),
            elidable: false,
        }),
    );
    arg(&mut builder, &fx, construct, "made(11, 12)", "11");
    arg(&mut builder, &fx, construct, "made(11, 12)", "12");

    assert_eq!(bind(builder, &fx, construct, ctor).unwrap(), map(&[("x", "11"), ("y", "12")]));
}

#[test]
fn infix_detection() {
    assert!(is_infix_binary("+", 2));
    assert!(is_infix_binary("==", 2));
    assert!(is_infix_binary("<<", 2));
    assert!(!is_infix_binary("++", 2));
    assert!(!is_infix_binary("[]", 2));
    assert!(!is_infix_binary("()", 2));
    assert!(!is_infix_binary("+", 1));
    assert!(!is_infix_binary("()", 3));
}
