use std::{cell::RefCell, rc::Rc};

use crate::{scope::scope::ScopeMap, Span};

use super::{
    declarations::{Decl, DeclKind},
    expressions::Expr,
    patterns::{Pattern, PatternKind},
    statements::Stmt,
    types::TypeRepr,
};

macro_rules! node_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

node_id!(DeclId);
node_id!(StmtId);
node_id!(ExprId);
node_id!(PatternId);
node_id!(TypeReprId);

/// Any node that can appear as an element of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstNode {
    Expr(ExprId),
    Stmt(StmtId),
    Decl(DeclId),
}

/// Node pools for one source file. Nodes refer to each other through ids.
#[derive(Debug, Default)]
pub struct Ast {
    decls: Vec<Decl>,
    stmts: Vec<Stmt>,
    exprs: Vec<Expr>,
    patterns: Vec<Pattern>,
    type_reprs: Vec<TypeRepr>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_decl(&mut self, decl: Decl) -> DeclId {
        self.decls.push(decl);
        DeclId(self.decls.len() as u32 - 1)
    }

    pub fn add_stmt(&mut self, stmt: Stmt) -> StmtId {
        self.stmts.push(stmt);
        StmtId(self.stmts.len() as u32 - 1)
    }

    pub fn add_expr(&mut self, expr: Expr) -> ExprId {
        self.exprs.push(expr);
        ExprId(self.exprs.len() as u32 - 1)
    }

    pub fn add_pattern(&mut self, pattern: Pattern) -> PatternId {
        self.patterns.push(pattern);
        PatternId(self.patterns.len() as u32 - 1)
    }

    pub fn add_type_repr(&mut self, type_repr: TypeRepr) -> TypeReprId {
        self.type_reprs.push(type_repr);
        TypeReprId(self.type_reprs.len() as u32 - 1)
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.index()]
    }

    pub fn type_repr(&self, id: TypeReprId) -> &TypeRepr {
        &self.type_reprs[id.index()]
    }

    pub fn decl_ids(&self) -> impl Iterator<Item = DeclId> {
        (0..self.decls.len() as u32).map(DeclId)
    }

    pub fn expr_ids(&self) -> impl Iterator<Item = ExprId> {
        (0..self.exprs.len() as u32).map(ExprId)
    }

    pub fn span_of(&self, node: AstNode) -> &Span {
        match node {
            AstNode::Expr(id) => &self.expr(id).span,
            AstNode::Stmt(id) => &self.stmt(id).span,
            AstNode::Decl(id) => &self.decl(id).span,
        }
    }

    /// Calls `f` on every variable declared by `pattern`, in source order.
    pub fn for_each_var_decl(&self, pattern: PatternId, f: &mut dyn FnMut(DeclId)) {
        match &self.pattern(pattern).kind {
            PatternKind::Var(decl) => f(*decl),
            PatternKind::Discard => {}
            PatternKind::Mut(sub) | PatternKind::Paren(sub) => self.for_each_var_decl(*sub, f),
            PatternKind::Typed { sub, .. } => self.for_each_var_decl(*sub, f),
            PatternKind::Tuple(elements) => {
                for element in elements {
                    self.for_each_var_decl(*element, f);
                }
            }
        }
    }

    pub fn var_decls_of(&self, pattern: PatternId) -> Vec<DeclId> {
        let mut result = vec![];
        self.for_each_var_decl(pattern, &mut |decl| result.push(decl));
        result
    }

    /// The variables introduced by a let declaration, or nothing for other decls.
    pub fn let_decl_vars(&self, decl: DeclId) -> Vec<DeclId> {
        match &self.decl(decl).kind {
            DeclKind::Let(let_decl) => self.var_decls_of(let_decl.pattern),
            _ => vec![],
        }
    }
}

/// A parsed source file: its node pools, its top-level declarations and the
/// scope map built lazily over them.
#[derive(Debug)]
pub struct SourceFile {
    pub name: Rc<String>,
    pub ast: Ast,
    pub members: Vec<DeclId>,
    pub span: Span,
    pub(crate) scope_map: RefCell<ScopeMap>,
}

impl SourceFile {
    pub fn new(name: Rc<String>, ast: Ast, members: Vec<DeclId>, span: Span) -> Self {
        let scope_map = RefCell::new(ScopeMap::new(span.clone()));
        SourceFile {
            name,
            ast,
            members,
            span,
            scope_map,
        }
    }

    /// Finds a top-level declaration by name.
    pub fn find_member(&self, identifier: &str) -> Option<DeclId> {
        self.members
            .iter()
            .copied()
            .find(|decl| self.ast.decl(*decl).identifier() == Some(identifier))
    }
}
