//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Function declarations and parameters
//! - Let declarations and patterns
//! - Expressions and operator precedence
//! - Control flow statements
//! - Error cases

use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::parser::parse;
use crate::{
    ast::{
        ast::{AstNode, ExprId, SourceFile},
        declarations::DeclKind,
        expressions::{BinaryOp, ExprKind, UnaryOp},
        patterns::PatternKind,
        statements::{StmtCondition, StmtKind},
        types::TypeReprKind,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
};

fn try_parse(source: &str) -> Result<SourceFile, Error> {
    let tokens = tokenize(source.to_string(), Some("test.sora".to_string())).unwrap();
    let (_, result) = parse(tokens, Rc::new("test.sora".to_string()));
    result
}

fn parse_file(source: &str) -> SourceFile {
    try_parse(source).unwrap()
}

/// The elements of the body of the first function in `file`.
fn body_elements(file: &SourceFile) -> Vec<AstNode> {
    let func = file.ast.decl(file.members[0]).as_func().unwrap();
    let body = file.ast.stmt(func.body.unwrap());
    body.as_block().unwrap().elements.clone()
}

fn first_expr(file: &SourceFile) -> ExprId {
    match body_elements(file)[0] {
        AstNode::Expr(expr) => expr,
        other => panic!("expected an expression, got {:?}", other),
    }
}

#[test]
fn test_parse_function_declaration() {
    let file = parse_file("func add(a: i32, b: i32) -> i32 { return a + b }");
    assert_eq!(file.members.len(), 1);

    let decl = file.ast.decl(file.members[0]);
    assert!(!decl.is_local);
    let func = decl.as_func().unwrap();
    assert_eq!(func.identifier, "add");
    assert_eq!(func.params.len(), 2);
    assert!(func.return_type.is_some());

    let param = file.ast.decl(func.params[1]);
    assert_eq!(param.identifier(), Some("b"));
    assert_eq!(param.span.start.0, 17);
    assert_eq!(param.span.end.0, 23);
}

#[test]
fn test_parse_multiple_functions() {
    let file = parse_file("func a() {}\nfunc b() {};\nfunc c() {}");
    let names: Vec<_> = file
        .members
        .iter()
        .map(|decl| file.ast.decl(*decl).identifier().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(file.span.start.0, 0);
    assert_eq!(file.span.end.0, 36);
}

#[test]
fn test_parse_top_level_statement_is_an_error() {
    let error = try_parse("let x = 1").unwrap_err();
    assert!(matches!(
        error.get_internal_error(),
        ErrorImpl::UnexpectedTokenDetailed { .. }
    ));
}

#[test]
fn test_parse_let_declaration() {
    let file = parse_file("func f() { let mut x: i64 = 42; }");
    let elements = body_elements(&file);
    assert_eq!(elements.len(), 1);

    let AstNode::Decl(decl) = elements[0] else {
        panic!("expected a declaration");
    };
    let let_decl = file.ast.decl(decl).as_let().unwrap();
    assert!(let_decl.initializer.is_some());
    assert!(matches!(
        file.ast.pattern(let_decl.pattern).kind,
        PatternKind::Typed { .. }
    ));

    let vars = file.ast.let_decl_vars(decl);
    assert_eq!(vars.len(), 1);
    let var = file.ast.decl(vars[0]);
    assert!(var.is_local);
    match &var.kind {
        DeclKind::Var(var) => {
            assert_eq!(var.identifier, "x");
            assert!(var.is_mut);
        }
        other => panic!("expected a variable, got {:?}", other),
    }

    // The declaration ends with its initializer, not the separator.
    let span = &file.ast.decl(decl).span;
    assert_eq!((span.start.0, span.end.0), (11, 30));
}

#[test]
fn test_parse_tuple_pattern() {
    let file = parse_file("func f() { let (a, _, mut b) = (1, 2, 3) }");
    let AstNode::Decl(decl) = body_elements(&file)[0] else {
        panic!("expected a declaration");
    };
    let names: Vec<_> = file
        .ast
        .let_decl_vars(decl)
        .into_iter()
        .map(|var| file.ast.decl(var).identifier().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_parse_single_element_tuple_is_an_error() {
    assert!(try_parse("func f() { (1,) }").is_err());
    assert!(try_parse("func f() { let (a,) = 1 }").is_err());
    assert!(try_parse("func f(x: (i32,)) {}").is_err());
    assert!(try_parse("func f() { (1) }").is_ok());
}

#[test]
fn test_parse_operator_precedence() {
    let file = parse_file("func f() { 1 + 2 * 3 == 7 && true }");
    let expr = file.ast.expr(first_expr(&file));

    let ExprKind::Binary { op, lhs, .. } = &expr.kind else {
        panic!("expected a binary expression");
    };
    assert_eq!(*op, BinaryOp::And);

    let ExprKind::Binary { op, lhs, .. } = &file.ast.expr(*lhs).kind else {
        panic!("expected a comparison");
    };
    assert_eq!(*op, BinaryOp::Eq);

    let ExprKind::Binary { op, rhs, .. } = &file.ast.expr(*lhs).kind else {
        panic!("expected an addition");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(
        file.ast.expr(*rhs).kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn test_parse_assignment_is_right_associative() {
    let file = parse_file("func f() { a = b = c }");
    let ExprKind::Binary { op, lhs, rhs } = &file.ast.expr(first_expr(&file)).kind else {
        panic!("expected an assignment");
    };
    assert_eq!(*op, BinaryOp::Assign);
    assert!(matches!(file.ast.expr(*lhs).kind, ExprKind::DeclRef(_)));
    assert!(matches!(
        file.ast.expr(*rhs).kind,
        ExprKind::Binary {
            op: BinaryOp::Assign,
            ..
        }
    ));
}

#[test]
fn test_parse_double_address_of() {
    let file = parse_file("func f() { &&mut x }");
    let ExprKind::Unary { op, sub } = &file.ast.expr(first_expr(&file)).kind else {
        panic!("expected a unary expression");
    };
    assert_eq!(*op, UnaryOp::AddressOf);

    let inner = file.ast.expr(*sub);
    assert!(matches!(
        inner.kind,
        ExprKind::Unary {
            op: UnaryOp::AddressOfMut,
            ..
        }
    ));
    assert_eq!(inner.span.start.0, 12);
}

#[test]
fn test_parse_nested_tuple_member() {
    let file = parse_file("func f() { t.0.1 }");
    let ExprKind::Member { base, member, .. } = &file.ast.expr(first_expr(&file)).kind else {
        panic!("expected a member access");
    };
    assert_eq!(member, "1");

    let ExprKind::Member { member, .. } = &file.ast.expr(*base).kind else {
        panic!("expected a member access");
    };
    assert_eq!(member, "0");
}

#[test]
fn test_parse_arrow_member_through_nested_tuple() {
    let file = parse_file("func f() { r->0.1 }");
    let ExprKind::Member {
        base,
        member,
        is_arrow,
    } = &file.ast.expr(first_expr(&file)).kind
    else {
        panic!("expected a member access");
    };
    assert_eq!(member, "1");
    assert!(!*is_arrow);

    let ExprKind::Member {
        member, is_arrow, ..
    } = &file.ast.expr(*base).kind
    else {
        panic!("expected a member access");
    };
    assert_eq!(member, "0");
    assert!(*is_arrow);
}

#[test]
fn test_parse_deref_and_force_unwrap() {
    // Postfix operators bind tighter than prefix ones.
    let file = parse_file("func f() { *m! }");
    let ExprKind::Unary { op, sub } = &file.ast.expr(first_expr(&file)).kind else {
        panic!("expected a unary expression");
    };
    assert_eq!(*op, UnaryOp::Deref);
    assert!(matches!(file.ast.expr(*sub).kind, ExprKind::ForceUnwrap(_)));

    let file = parse_file("func f() { a != b }");
    assert!(matches!(
        file.ast.expr(first_expr(&file)).kind,
        ExprKind::Binary {
            op: BinaryOp::NotEq,
            ..
        }
    ));
}

#[test]
fn test_parse_conditional_expr() {
    let file = parse_file("func f() { x = a || b ? 1 : c ? 2 : 3 }");
    let ExprKind::Binary { op, rhs, .. } = &file.ast.expr(first_expr(&file)).kind else {
        panic!("expected an assignment");
    };
    assert_eq!(*op, BinaryOp::Assign);

    let ExprKind::Conditional {
        condition,
        else_expr,
        ..
    } = &file.ast.expr(*rhs).kind
    else {
        panic!("expected a conditional expression");
    };
    assert!(matches!(
        file.ast.expr(*condition).kind,
        ExprKind::Binary {
            op: BinaryOp::Or,
            ..
        }
    ));
    assert!(matches!(
        file.ast.expr(*else_expr).kind,
        ExprKind::Conditional { .. }
    ));
}

#[test]
fn test_parse_conditional_without_colon() {
    let error = try_parse("func f() { c ? 1 }").unwrap_err();
    assert!(matches!(
        error.get_internal_error(),
        ErrorImpl::UnexpectedTokenDetailed { .. }
    ));
}

#[test]
fn test_parse_cast_and_call() {
    let file = parse_file("func f() { g(1, 2) as maybe &mut i8 }");
    let ExprKind::Cast { sub, to } = &file.ast.expr(first_expr(&file)).kind else {
        panic!("expected a cast");
    };
    assert!(matches!(
        &file.ast.expr(*sub).kind,
        ExprKind::Call { args, .. } if args.len() == 2
    ));

    let TypeReprKind::Maybe(inner) = &file.ast.type_repr(*to).kind else {
        panic!("expected a maybe type");
    };
    assert!(matches!(
        file.ast.type_repr(*inner).kind,
        TypeReprKind::Reference { is_mut: true, .. }
    ));
}

#[test]
fn test_parse_if_let_else_if() {
    let file = parse_file("func f() { if let x = y { } else if z { } else { } }");
    let AstNode::Stmt(stmt) = body_elements(&file)[0] else {
        panic!("expected a statement");
    };
    let StmtKind::If(if_stmt) = &file.ast.stmt(stmt).kind else {
        panic!("expected an if statement");
    };
    assert!(matches!(if_stmt.condition, StmtCondition::LetDecl(_)));

    let else_body = file.ast.stmt(if_stmt.else_body.unwrap());
    let StmtKind::If(else_if) = &else_body.kind else {
        panic!("expected an else-if");
    };
    assert!(matches!(else_if.condition, StmtCondition::Expr(_)));
    assert!(else_if.else_body.is_some());
}

#[test]
fn test_parse_while_and_jumps() {
    let file = parse_file("func f() { while true { break; continue } return }");
    let elements = body_elements(&file);
    assert_eq!(elements.len(), 2);

    let AstNode::Stmt(while_stmt) = elements[0] else {
        panic!("expected a statement");
    };
    let StmtKind::While(while_stmt) = &file.ast.stmt(while_stmt).kind else {
        panic!("expected a while statement");
    };
    let body = file.ast.stmt(while_stmt.body).as_block().unwrap();
    assert_eq!(body.elements.len(), 2);

    let AstNode::Stmt(ret) = elements[1] else {
        panic!("expected a statement");
    };
    assert!(matches!(file.ast.stmt(ret).kind, StmtKind::Return(None)));
}

#[test]
fn test_parse_local_function() {
    let file = parse_file("func f() { func g() -> bool { return true } }");
    let AstNode::Decl(decl) = body_elements(&file)[0] else {
        panic!("expected a declaration");
    };
    let decl = file.ast.decl(decl);
    assert!(decl.is_local);
    assert_eq!(decl.identifier(), Some("g"));
}

#[test]
fn test_parse_unclosed_block() {
    let error = try_parse("func f() { let x = 1").unwrap_err();
    assert!(matches!(
        error.get_internal_error(),
        ErrorImpl::UnexpectedTokenDetailed { .. }
    ));
}
