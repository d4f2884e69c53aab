use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::{
    ast::{Ast, AstNode, DeclId},
    declarations::{Decl, DeclKind, LetDecl, VarDecl},
    expressions::{BinaryOp, DeclRefExpr, Expr, ExprKind},
    patterns::{Pattern, PatternKind},
};
use crate::{types::types::TypeId, Position, Span};

fn span(start: u32, end: u32) -> Span {
    let file = Rc::new(String::from("test.sora"));
    Span::new(Position(start, Rc::clone(&file)), Position(end, file))
}

fn add_var(ast: &mut Ast, name: &str) -> DeclId {
    ast.add_decl(Decl::new(
        DeclKind::Var(VarDecl {
            identifier: name.to_string(),
            is_mut: false,
        }),
        span(0, 1),
        true,
    ))
}

#[test]
fn test_ids_are_dense() {
    let mut ast = Ast::new();
    let a = add_var(&mut ast, "a");
    let b = add_var(&mut ast, "b");
    assert_eq!((a.0, b.0), (0, 1));
    assert_eq!(ast.decl_ids().collect::<Vec<_>>(), vec![a, b]);
}

#[test]
fn test_pattern_variables_in_source_order() {
    let mut ast = Ast::new();
    let a = add_var(&mut ast, "a");
    let b = add_var(&mut ast, "b");

    let pa = ast.add_pattern(Pattern {
        kind: PatternKind::Var(a),
        span: span(0, 1),
    });
    let discard = ast.add_pattern(Pattern {
        kind: PatternKind::Discard,
        span: span(0, 1),
    });
    let pb = ast.add_pattern(Pattern {
        kind: PatternKind::Var(b),
        span: span(0, 1),
    });
    let mut_b = ast.add_pattern(Pattern {
        kind: PatternKind::Mut(pb),
        span: span(0, 1),
    });
    let tuple = ast.add_pattern(Pattern {
        kind: PatternKind::Tuple(vec![pa, discard, mut_b]),
        span: span(0, 1),
    });

    assert_eq!(ast.var_decls_of(tuple), vec![a, b]);

    let let_decl = ast.add_decl(Decl::new(
        DeclKind::Let(LetDecl {
            pattern: tuple,
            initializer: None,
        }),
        span(0, 1),
        true,
    ));
    assert_eq!(ast.let_decl_vars(let_decl), vec![a, b]);
    assert!(ast.let_decl_vars(a).is_empty());
    assert_eq!(ast.decl(let_decl).identifier(), None);
    assert!(!ast.decl(let_decl).is_value_decl());
}

#[test]
fn test_resolution_and_types_are_recorded_in_place() {
    let mut ast = Ast::new();
    let x = add_var(&mut ast, "x");
    let lhs = ast.add_expr(Expr::new(
        ExprKind::DeclRef(DeclRefExpr::new("x".to_string())),
        span(0, 1),
    ));
    let rhs = ast.add_expr(Expr::new(ExprKind::IntegerLiteral("1".to_string()), span(4, 5)));
    let sum = ast.add_expr(Expr::new(
        ExprKind::Binary {
            op: BinaryOp::Add,
            lhs,
            rhs,
        },
        span(0, 5),
    ));

    let ExprKind::DeclRef(decl_ref) = &ast.expr(lhs).kind else {
        panic!("expected a reference");
    };
    assert_eq!(decl_ref.resolved(), None);
    decl_ref.resolve(x);
    assert_eq!(decl_ref.resolved(), Some(x));

    assert_eq!(ast.expr(sum).ty(), None);
    ast.expr(sum).set_ty(TypeId::I32);
    assert_eq!(ast.expr(sum).ty(), Some(TypeId::I32));
    assert_eq!(ast.span_of(AstNode::Expr(sum)).len(), 5);
}

#[test]
fn test_binary_op_classes() {
    assert!(BinaryOp::LessEq.is_comparison());
    assert!(!BinaryOp::Add.is_comparison());
    assert!(BinaryOp::Or.is_logical());
    assert_eq!(BinaryOp::Rem.spelling(), "%");
}
