use crate::Span;

use super::ast::{DeclId, PatternId, TypeReprId};

#[derive(Debug, Clone)]
pub enum PatternKind {
    /// Introduces a variable; the decl is a `DeclKind::Var`.
    Var(DeclId),
    Discard,
    Mut(PatternId),
    Paren(PatternId),
    Tuple(Vec<PatternId>),
    Typed { sub: PatternId, type_repr: TypeReprId },
}

#[derive(Debug, Clone)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}
