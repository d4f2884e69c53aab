use std::cell::Cell;

use crate::{types::types::TypeId, Span};

use super::ast::{DeclId, ExprId, TypeReprId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Not,
    Deref,
    AddressOf,
    AddressOfMut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
    Assign,
}

impl BinaryOp {
    pub fn spelling(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Assign => "=",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Less
                | BinaryOp::LessEq
                | BinaryOp::Greater
                | BinaryOp::GreaterEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

#[derive(Debug)]
pub struct DeclRefExpr {
    pub identifier: String,
    resolved: Cell<Option<DeclId>>,
}

impl DeclRefExpr {
    pub fn new(identifier: String) -> Self {
        DeclRefExpr {
            identifier,
            resolved: Cell::new(None),
        }
    }

    pub fn resolved(&self) -> Option<DeclId> {
        self.resolved.get()
    }

    pub fn resolve(&self, decl: DeclId) {
        self.resolved.set(Some(decl));
    }
}

#[derive(Debug)]
pub enum ExprKind {
    IntegerLiteral(String),
    FloatLiteral(String),
    BooleanLiteral(bool),
    NullLiteral,
    Discard,
    DeclRef(DeclRefExpr),
    Tuple(Vec<ExprId>),
    Paren(ExprId),
    Call { callee: ExprId, args: Vec<ExprId> },
    /// `base.member`, or `base->member` through a reference.
    Member {
        base: ExprId,
        member: String,
        is_arrow: bool,
    },
    ForceUnwrap(ExprId),
    Conditional {
        condition: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    Cast { sub: ExprId, to: TypeReprId },
    Unary { op: UnaryOp, sub: ExprId },
    Binary { op: BinaryOp, lhs: ExprId, rhs: ExprId },
}

#[derive(Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    ty: Cell<Option<TypeId>>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr {
            kind,
            span,
            ty: Cell::new(None),
        }
    }

    pub fn ty(&self) -> Option<TypeId> {
        self.ty.get()
    }

    pub fn set_ty(&self, ty: TypeId) {
        self.ty.set(Some(ty));
    }
}
