use super::*;
use crate::{
    source::SourceRange,
    test_support::Fixture,
    tree::{Node, TreeBuilder},
};

const SOURCE: &str = "\
void run(Vec v, Adder obj, Box box, Acc acc) {
  v[3];
  obj(1, 2);
  f<int>(1);
  ns::g(2);
  h<Pair<int, int>>(3);
  box.get<int>();
  acc += 4;
  acc.operator+=(5);
  twice(6);
}
";

fn decl_ref(name: &str) -> NodeKind {
    NodeKind::DeclRef {
        name: name.to_string(),
        decl: None,
    }
}

fn member(name: &str) -> NodeKind {
    NodeKind::Member {
        name: name.to_string(),
        is_arrow: false,
        decl: None,
    }
}

/// Name location of a single reference covering `range`.
fn name_of(
    fx: &Fixture,
    kind: NodeKind,
    range: SourceRange,
) -> Option<usize> {
    let mut builder = TreeBuilder::new();
    let root = builder.add_root(Node::new(NodeKind::TranslationUnit));
    let id = builder.add(root, Node::new(kind).with_range(range));
    let tree = builder.finish().unwrap();
    name_location(&tree, &fx.sources(), id).unwrap().and_then(|loc| loc.canonical().map(|loc| loc.offset))
}

#[test]
fn subscript_and_call_operators_start_at_their_bracket() {
    let fx = Fixture::new("names.cpp", SOURCE);
    assert_eq!(name_of(&fx, decl_ref("operator[]"), fx.range("[3]")), Some(fx.offset("[3]", 0)));
    assert_eq!(name_of(&fx, decl_ref("operator()"), fx.range("(1, 2)")), Some(fx.offset("(1, 2)", 0)));
}

#[test]
fn template_arguments_are_skipped() {
    let fx = Fixture::new("names.cpp", SOURCE);
    assert_eq!(name_of(&fx, decl_ref("f"), fx.range("f<int>")), Some(fx.offset("f<int>", 0)));
    assert_eq!(name_of(&fx, decl_ref("h"), fx.range("h<Pair<int, int>>")), Some(fx.offset("h<Pair", 0)));
    assert_eq!(name_of(&fx, member("get"), fx.range("box.get<int>")), Some(fx.offset("get<int>", 0)));
}

#[test]
fn qualifiers_are_skipped() {
    let fx = Fixture::new("names.cpp", SOURCE);
    assert_eq!(name_of(&fx, decl_ref("g"), fx.range("ns::g")), Some(fx.offset("g(2)", 0)));
}

#[test]
fn spelled_operators_resolve_to_the_keyword() {
    let fx = Fixture::new("names.cpp", SOURCE);
    let range = fx.range("acc.operator+=");
    assert_eq!(name_of(&fx, member("operator+="), range), Some(fx.offset("operator+=(5)", 0)));
    assert_eq!(name_of(&fx, decl_ref("operator+="), fx.range_in("acc += 4", "+=")), Some(fx.offset("+= 4", 0)));
}

#[test]
fn explicit_locations_and_one_token_ranges_are_used_as_is() {
    let fx = Fixture::new("names.cpp", SOURCE);
    assert_eq!(name_of(&fx, decl_ref("twice"), fx.range("twice")), Some(fx.offset("twice", 0)));

    let mut builder = TreeBuilder::new();
    let root = builder.add_root(Node::new(NodeKind::TranslationUnit));
    let located = builder.add(root, Node::new(member("get")).with_range(fx.range("box.get<int>")).with_loc(fx.loc("box")));
    let bare = builder.add(root, Node::new(decl_ref("f")));
    let tree = builder.finish().unwrap();
    let sources = fx.sources();
    assert_eq!(name_location(&tree, &sources, located).unwrap(), Some(fx.loc("box")));
    assert_eq!(name_location(&tree, &sources, bare).unwrap(), None);
}

#[test]
fn the_name_token_carries_its_position_and_length() {
    let fx = Fixture::new("names.cpp", SOURCE);
    let mut builder = TreeBuilder::new();
    let root = builder.add_root(Node::new(NodeKind::TranslationUnit));
    let id = builder.add(root, Node::new(decl_ref("f")).with_range(fx.range("f<int>")));
    let tree = builder.finish().unwrap();
    let loc = name_location(&tree, &fx.sources(), id).unwrap().unwrap();
    assert_eq!(loc, fx.loc("f<int>"));
    assert!(!loc.is_macro_expansion());
}

#[test]
fn operator_names_need_a_symbol() {
    assert!(is_operator_name("operator[]"));
    assert!(is_operator_name("operator()"));
    assert!(is_operator_name("operator +="));
    assert!(!is_operator_name("operator_count"));
    assert!(!is_operator_name("operator bool"));
    assert!(!is_operator_name("twice"));
}
