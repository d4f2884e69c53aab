use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::name_lookup::{UnqualifiedTypeLookup, UnqualifiedValueLookup};
use crate::{
    ast::{
        ast::{AstNode, DeclId, SourceFile},
        declarations::DeclKind,
    },
    lexer::lexer::tokenize,
    parser::parser::parse,
    types::{context::AstContext, types::TypeId},
};

fn parse_file(source: &str) -> SourceFile {
    let tokens = tokenize(source.to_string(), Some("test.sora".to_string())).unwrap();
    let (_, result) = parse(tokens, Rc::new("test.sora".to_string()));
    result.unwrap()
}

fn offset(source: &str, needle: &str) -> u32 {
    source.find(needle).unwrap() as u32
}

/// The let declarations of the first function's body, in order.
fn body_lets(file: &SourceFile) -> Vec<DeclId> {
    let func = file.ast.decl(file.members[0]).as_func().unwrap();
    let body = file.ast.stmt(func.body.unwrap()).as_block().unwrap();
    body.elements
        .iter()
        .filter_map(|element| match element {
            AstNode::Decl(decl) if file.ast.decl(*decl).as_let().is_some() => Some(*decl),
            _ => None,
        })
        .collect()
}

#[test]
fn test_value_lookup_finds_parameter() {
    let source = "func f(x: i32) -> i32 { return x }";
    let file = parse_file(source);

    let mut lookup = UnqualifiedValueLookup::new(&file);
    lookup.perform_lookup(offset(source, "x }"), Some("x"));

    let decl = lookup.get_unique_result().unwrap();
    assert!(matches!(file.ast.decl(decl).kind, DeclKind::Param(_)));
    assert!(lookup.is_result_unique());
}

#[test]
fn test_value_lookup_not_found() {
    let source = "func f() { y }";
    let file = parse_file(source);

    let mut lookup = UnqualifiedValueLookup::new(&file);
    lookup.perform_lookup(offset(source, "y"), Some("y"));
    assert!(lookup.is_empty());
    assert_eq!(lookup.get_unique_result(), None);
}

#[test]
fn test_value_lookup_innermost_shadows() {
    let source = "func f() {\n  let x = 3\n  {\n    let x = true\n    x\n  }\n}";
    let file = parse_file(source);

    let mut lookup = UnqualifiedValueLookup::new(&file);
    lookup.perform_lookup(offset(source, "x\n  }"), Some("x"));

    let outer = file.ast.let_decl_vars(body_lets(&file)[0])[0];
    let found = lookup.get_unique_result().unwrap();
    assert_ne!(found, outer);
}

#[test]
fn test_value_lookup_ignoring_own_variables() {
    // The initializer of `let x = x` sees the outer `x`.
    let source = "func f() {\n  let x = 3\n  {\n    let x = x\n  }\n}";
    let file = parse_file(source);
    let loc = offset(source, "x\n  }");

    let outer = file.ast.let_decl_vars(body_lets(&file)[0])[0];

    let mut lookup = UnqualifiedValueLookup::new(&file);
    lookup.perform_lookup(loc, Some("x"));
    assert_eq!(lookup.get_unique_result(), Some(outer));

    // Ignoring a declaration that would otherwise match keeps walking outward.
    let source = "func f() {\n  let x = 3\n  let x = 4\n  x\n}";
    let file = parse_file(source);
    let lets = body_lets(&file);
    let outer = file.ast.let_decl_vars(lets[0])[0];
    let inner = file.ast.let_decl_vars(lets[1])[0];

    let mut lookup = UnqualifiedValueLookup::new(&file);
    lookup
        .ignore(inner)
        .perform_lookup(offset(source, "x\n}"), Some("x"));
    assert_eq!(lookup.results(), &[outer]);
}

#[test]
fn test_value_lookup_without_identifier_collects_everything() {
    let source = "func f(a: i32) {\n  let (b, c) = (1, 2)\n  b\n}\nfunc g() {}";
    let file = parse_file(source);

    let mut lookup = UnqualifiedValueLookup::new(&file);
    lookup.perform_lookup(offset(source, "b\n}"), None);

    let names: Vec<_> = lookup
        .results()
        .iter()
        .map(|decl| file.ast.decl(*decl).identifier().unwrap())
        .collect();
    assert_eq!(names, vec!["b", "c", "a", "f", "g"]);
}

#[test]
fn test_value_lookup_filter_results() {
    let source = "func f(a: i32) {\n  a\n}\nfunc g() {}";
    let file = parse_file(source);

    let mut lookup = UnqualifiedValueLookup::new(&file);
    lookup
        .perform_lookup(offset(source, "a\n}"), None)
        .filter_results(|decl| file.ast.decl(decl).as_func().is_some());
    assert_eq!(lookup.results().len(), 2);
}

#[test]
fn test_value_lookup_finds_every_declaration_in_the_same_scope() {
    let source = "func f() {}\nfunc f() {}\nfunc g() { f }";
    let file = parse_file(source);

    let mut lookup = UnqualifiedValueLookup::new(&file);
    lookup.perform_lookup(offset(source, "f }"), Some("f"));
    assert_eq!(lookup.results().len(), 2);
    assert!(!lookup.is_result_unique());
    assert_eq!(lookup.get_unique_result(), None);
}

#[test]
#[should_panic(expected = "consecutive lookups using the same object aren't supported")]
fn test_value_lookup_twice_panics() {
    let source = "func f() {}";
    let file = parse_file(source);

    let mut lookup = UnqualifiedValueLookup::new(&file);
    lookup.perform_lookup(0, Some("f"));
    lookup.perform_lookup(0, Some("f"));
}

#[test]
fn test_type_lookup() {
    let ctx = AstContext::new();

    let mut lookup = UnqualifiedTypeLookup::new(&ctx);
    lookup.perform_lookup(Some("i32"));
    assert_eq!(lookup.get_unique_result(), Some(TypeId::I32));

    let mut lookup = UnqualifiedTypeLookup::new(&ctx);
    lookup.perform_lookup(Some("string"));
    assert!(lookup.is_empty());

    let mut lookup = UnqualifiedTypeLookup::new(&ctx);
    lookup.perform_lookup(None);
    assert_eq!(lookup.results().len(), 14);
    assert!(lookup.results().contains(&TypeId::BOOL));
    assert!(!lookup.results().contains(&TypeId::NULL));
}

#[test]
#[should_panic(expected = "consecutive lookups using the same object aren't supported")]
fn test_type_lookup_twice_panics() {
    let ctx = AstContext::new();
    let mut lookup = UnqualifiedTypeLookup::new(&ctx);
    lookup.perform_lookup(Some("i8"));
    lookup.perform_lookup(Some("i8"));
}
