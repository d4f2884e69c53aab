use std::cell::Cell;

use crate::{types::types::TypeId, Span};

use super::ast::{DeclId, ExprId, PatternId, StmtId, TypeReprId};

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub identifier: String,
    pub is_mut: bool,
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub identifier: String,
    pub type_repr: TypeReprId,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub identifier: String,
    pub params: Vec<DeclId>,
    pub return_type: Option<TypeReprId>,
    pub body: Option<StmtId>,
}

#[derive(Debug, Clone)]
pub struct LetDecl {
    pub pattern: PatternId,
    pub initializer: Option<ExprId>,
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    Var(VarDecl),
    Param(ParamDecl),
    Func(FuncDecl),
    Let(LetDecl),
}

#[derive(Debug)]
pub struct Decl {
    pub kind: DeclKind,
    pub span: Span,
    pub is_local: bool,
    ty: Cell<Option<TypeId>>,
}

impl Decl {
    pub fn new(kind: DeclKind, span: Span, is_local: bool) -> Self {
        Decl {
            kind,
            span,
            is_local,
            ty: Cell::new(None),
        }
    }

    /// The name of a value declaration. Let declarations have none.
    pub fn identifier(&self) -> Option<&str> {
        match &self.kind {
            DeclKind::Var(var) => Some(&var.identifier),
            DeclKind::Param(param) => Some(&param.identifier),
            DeclKind::Func(func) => Some(&func.identifier),
            DeclKind::Let(_) => None,
        }
    }

    pub fn is_value_decl(&self) -> bool {
        self.identifier().is_some()
    }

    pub fn as_func(&self) -> Option<&FuncDecl> {
        match &self.kind {
            DeclKind::Func(func) => Some(func),
            _ => None,
        }
    }

    pub fn as_let(&self) -> Option<&LetDecl> {
        match &self.kind {
            DeclKind::Let(let_decl) => Some(let_decl),
            _ => None,
        }
    }

    /// The type assigned by the checker. Always free of type variables.
    pub fn ty(&self) -> Option<TypeId> {
        self.ty.get()
    }

    pub fn set_ty(&self, ty: TypeId) {
        self.ty.set(Some(ty));
    }
}
