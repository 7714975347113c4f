use super::*;
use crate::macros::{MacroExpansion, MacroTrace, VA_ARGS, scan_macros};

/// The definition and last invocation found in `text`.
fn traced(text: &str) -> (MacroTrace, MacroExpansion) {
    let trace = scan_macros("m.cpp", text);
    let expansion = trace.expansions().last().cloned().expect("an invocation");
    (trace, expansion)
}

fn rewrite(text: &str) -> String {
    let (trace, expansion) = traced(text);
    let definition = trace.definition_of(&expansion).unwrap();
    let map = create_parameter_map(definition, &expansion.args).unwrap();
    rewrite_macro(definition, &map)
}

#[test]
fn substitutes_parameters() {
    assert_eq!(rewrite("#define ADD(a, b) ((a) + (b))\nADD(1, f(2, 3));\n"), "((1) + (f(2, 3)))");
    assert_eq!(rewrite("#define SQ(x) x * x\nSQ(3);\n"), "3 * 3");
}

#[test]
fn stringizes_after_a_single_hash() {
    assert_eq!(rewrite("#define STR(x) #x\nSTR(foo+1);\n"), "\"foo+1\"");
    assert_eq!(rewrite("#define STR(x) puts(# x)\nSTR(hi);\n"), "puts(\"hi\")");
}

#[test]
fn token_pasting_glues_neighbours() {
    assert_eq!(rewrite("#define CAT(x) a##x##b\nCAT(12);\n"), "a12b");
    assert_eq!(rewrite("#define CAT(x) a ## x\nCAT(12);\n"), "a12");
}

#[test]
fn other_identifiers_are_kept() {
    assert_eq!(rewrite("#define CALL(x) helper(x, y)\nCALL(z);\n"), "helper(z, y)");
}

#[test]
fn variadic_arguments_are_joined() {
    let (trace, expansion) = traced("#define LOG(fmt, ...) printf(fmt, __VA_ARGS__)\nLOG(\"%d %d\", 1, g(2));\n");
    let definition = trace.definition_of(&expansion).unwrap();
    let map = create_parameter_map(definition, &expansion.args).unwrap();
    assert_eq!(map["fmt"], "\"%d %d\"");
    assert_eq!(map[VA_ARGS], "1, g(2)");
    assert_eq!(rewrite_macro(definition, &map), "printf(\"%d %d\", 1, g(2))");
}

#[test]
fn missing_arguments_map_to_empty_text() {
    let (trace, expansion) = traced("#define PAIR(a, b) {a, b}\nPAIR(1);\n");
    let map = create_parameter_map(trace.definition_of(&expansion).unwrap(), &expansion.args).unwrap();
    assert_eq!(map["a"], "1");
    assert_eq!(map["b"], "");
}

#[test]
fn surplus_arguments_are_an_error() {
    let (trace, expansion) = traced("#define ONE(a) a\nONE(1, 2);\n");
    let err = create_parameter_map(trace.definition_of(&expansion).unwrap(), &expansion.args).unwrap_err();
    assert!(matches!(err, ExpandError::InvariantViolation(_)));
}

#[test]
fn macros_without_parameters_have_an_empty_map() {
    let (trace, expansion) = traced("#define NOW() clock()\nNOW();\n");
    let definition = trace.definition_of(&expansion).unwrap();
    let map = create_parameter_map(definition, &expansion.args).unwrap();
    assert!(map.is_empty());
    assert_eq!(rewrite_macro(definition, &map), "clock()");
}
