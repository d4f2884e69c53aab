use crate::Span;

use super::ast::{AstNode, DeclId, ExprId, StmtId};

#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub elements: Vec<AstNode>,
}

/// The condition of an `if` or `while`: a plain expression or a `let` binding.
#[derive(Debug, Clone, Copy)]
pub enum StmtCondition {
    Expr(ExprId),
    LetDecl(DeclId),
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: StmtCondition,
    pub then_body: StmtId,
    pub else_body: Option<StmtId>,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: StmtCondition,
    pub body: StmtId,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Block(BlockStmt),
    Return(Option<ExprId>),
    If(IfStmt),
    While(WhileStmt),
    Break,
    Continue,
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn as_block(&self) -> Option<&BlockStmt> {
        match &self.kind {
            StmtKind::Block(block) => Some(block),
            _ => None,
        }
    }
}
