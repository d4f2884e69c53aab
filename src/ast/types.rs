use crate::Span;

use super::ast::TypeReprId;

#[derive(Debug, Clone)]
pub enum TypeReprKind {
    Identifier(String),
    Paren(TypeReprId),
    Tuple(Vec<TypeReprId>),
    Reference { sub: TypeReprId, is_mut: bool },
    Maybe(TypeReprId),
}

#[derive(Debug, Clone)]
pub struct TypeRepr {
    pub kind: TypeReprKind,
    pub span: Span,
}
