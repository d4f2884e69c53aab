use std::fmt::{Display, Write};

use tracing::trace;

use crate::{
    ast::{
        ast::{Ast, AstNode, DeclId, SourceFile, StmtId},
        declarations::DeclKind,
        statements::{StmtCondition, StmtKind},
    },
    Span,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const ROOT: ScopeId = ScopeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The AST node a scope was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    SourceFile,
    FuncDecl(DeclId),
    BlockStmt(StmtId),
    If(StmtId),
    While(StmtId),
    /// The variables of a `let`, visible from past the declaration to the
    /// end of the enclosing block, or over the body of an `if let`/`while let`.
    LocalLetDecl(DeclId),
}

impl Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScopeKind::SourceFile => "SourceFile",
            ScopeKind::FuncDecl(_) => "FuncDecl",
            ScopeKind::BlockStmt(_) => "BlockStmt",
            ScopeKind::If(_) => "If",
            ScopeKind::While(_) => "While",
            ScopeKind::LocalLetDecl(_) => "LocalLetDecl",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionState {
    Unexpanded,
    Expanded,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub span: Span,
    pub parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    state: ExpansionState,
}

impl Scope {
    /// Sorted by source position, never overlapping.
    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    pub fn state(&self) -> ExpansionState {
        self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.state == ExpansionState::Expanded
    }
}

/// The scope tree of one source file. Scopes are only created when a lookup
/// needs to descend into them.
#[derive(Debug)]
pub struct ScopeMap {
    scopes: Vec<Scope>,
}

impl ScopeMap {
    pub fn new(span: Span) -> Self {
        ScopeMap {
            scopes: vec![Scope {
                kind: ScopeKind::SourceFile,
                span,
                parent: None,
                children: vec![],
                state: ExpansionState::Unexpanded,
            }],
        }
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Number of scopes created so far.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    fn create_scope(&mut self, kind: ScopeKind, span: Span, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            span,
            parent: None,
            children: vec![],
            state: ExpansionState::Unexpanded,
        });
        self.add_child(parent, id);
        id
    }

    /// Attaches `child` under `parent`, keeping the children sorted.
    pub fn add_child(&mut self, parent: ScopeId, child: ScopeId) {
        let span = self.scope(child).span.clone();
        debug_assert!(
            self.scope(parent).span.contains_span(&span),
            "child scope {} is not inside its parent {}",
            span,
            self.scope(parent).span
        );
        debug_assert!(
            self.scope(parent)
                .children
                .iter()
                .all(|sibling| !self.scope(*sibling).span.overlaps(&span)),
            "child scope {} overlaps a sibling",
            span
        );

        let index = self
            .scope(parent)
            .children
            .partition_point(|sibling| self.scope(*sibling).span.start.0 < span.start.0);
        self.scopes[parent.index()].children.insert(index, child);
        self.scopes[child.index()].parent = Some(parent);
    }

    /// Creates the immediate children of `id`. Does nothing the second time.
    pub fn expand(&mut self, ast: &Ast, members: &[DeclId], id: ScopeId) {
        if self.scope(id).is_expanded() {
            return;
        }

        match self.scope(id).kind {
            ScopeKind::SourceFile => {
                for member in members {
                    if ast.decl(*member).as_func().is_some() {
                        let span = ast.decl(*member).span.clone();
                        self.create_scope(ScopeKind::FuncDecl(*member), span, id);
                    }
                }
            }
            ScopeKind::FuncDecl(decl) => {
                if let Some(body) = ast.decl(decl).as_func().and_then(|func| func.body) {
                    let span = ast.stmt(body).span.clone();
                    self.create_scope(ScopeKind::BlockStmt(body), span, id);
                }
            }
            ScopeKind::BlockStmt(stmt) => self.expand_block(ast, stmt, id),
            ScopeKind::If(stmt) => {
                if let StmtKind::If(if_stmt) = &ast.stmt(stmt).kind {
                    self.add_condition_body(ast, id, if_stmt.condition, if_stmt.then_body);
                    if let Some(else_body) = if_stmt.else_body {
                        self.add_stmt_scope(ast, else_body, id);
                    }
                }
            }
            ScopeKind::While(stmt) => {
                if let StmtKind::While(while_stmt) = &ast.stmt(stmt).kind {
                    self.add_condition_body(ast, id, while_stmt.condition, while_stmt.body);
                }
            }
            ScopeKind::LocalLetDecl(_) => {}
        }

        let scope = &mut self.scopes[id.index()];
        scope.state = ExpansionState::Expanded;
        trace!(
            kind = %scope.kind,
            range = %scope.span,
            children = scope.children.len(),
            "expanded scope"
        );
    }

    fn expand_block(&mut self, ast: &Ast, block: StmtId, id: ScopeId) {
        let Some(block_stmt) = ast.stmt(block).as_block() else {
            return;
        };
        let block_end = ast.stmt(block).span.end.clone();

        let mut parent = id;
        for element in &block_stmt.elements {
            match *element {
                AstNode::Stmt(stmt) => {
                    self.add_stmt_scope(ast, stmt, parent);
                }
                AstNode::Decl(decl) => match &ast.decl(decl).kind {
                    DeclKind::Func(_) => {
                        let span = ast.decl(decl).span.clone();
                        self.create_scope(ScopeKind::FuncDecl(decl), span, parent);
                    }
                    DeclKind::Let(_) => {
                        let span = Span::new(ast.decl(decl).span.end.clone(), block_end.clone());
                        parent = self.create_scope(ScopeKind::LocalLetDecl(decl), span, parent);
                    }
                    _ => {}
                },
                AstNode::Expr(_) => {}
            }
        }
    }

    /// Blocks, ifs and whiles get a scope. Other statements don't.
    fn add_stmt_scope(&mut self, ast: &Ast, stmt: StmtId, parent: ScopeId) -> Option<ScopeId> {
        let kind = match ast.stmt(stmt).kind {
            StmtKind::Block(_) => ScopeKind::BlockStmt(stmt),
            StmtKind::If(_) => ScopeKind::If(stmt),
            StmtKind::While(_) => ScopeKind::While(stmt),
            _ => return None,
        };
        let span = ast.stmt(stmt).span.clone();
        Some(self.create_scope(kind, span, parent))
    }

    fn add_condition_body(
        &mut self,
        ast: &Ast,
        parent: ScopeId,
        condition: StmtCondition,
        body: StmtId,
    ) {
        let body_span = ast.stmt(body).span.clone();
        let parent = match condition {
            StmtCondition::LetDecl(decl) => {
                self.create_scope(ScopeKind::LocalLetDecl(decl), body_span.clone(), parent)
            }
            StmtCondition::Expr(_) => parent,
        };
        self.create_scope(ScopeKind::BlockStmt(body), body_span, parent);
    }

    /// Descends from the root to the innermost scope containing `loc`,
    /// expanding only the scopes along the way.
    pub fn find_innermost_scope(&mut self, ast: &Ast, members: &[DeclId], loc: u32) -> ScopeId {
        let mut current = ScopeId::ROOT;
        loop {
            self.expand(ast, members, current);
            let children = &self.scope(current).children;
            let index = children.partition_point(|child| self.scope(*child).span.end.0 <= loc);
            match children.get(index) {
                Some(child) if self.scope(*child).span.contains(loc) => current = *child,
                _ => return current,
            }
        }
    }

    pub fn full_expand(&mut self, ast: &Ast, members: &[DeclId]) {
        let mut worklist = vec![ScopeId::ROOT];
        while let Some(id) = worklist.pop() {
            self.expand(ast, members, id);
            worklist.extend(self.scope(id).children.iter().rev());
        }
    }

    /// Renders the scopes created so far. Never expands anything.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_impl(&mut out, ScopeId::ROOT, 0);
        out
    }

    fn dump_impl(&self, out: &mut String, id: ScopeId, indent: usize) {
        let scope = self.scope(id);
        let _ = writeln!(
            out,
            "{:indent$}{}Scope range:{} numChildren:{}",
            "",
            scope.kind,
            scope.span,
            scope.children.len(),
            indent = indent
        );
        for child in &scope.children {
            self.dump_impl(out, *child, indent + 2);
        }
    }

    /// `start` followed by its ancestors, innermost first.
    fn ancestors(&self, start: ScopeId) -> Vec<(ScopeId, ScopeKind)> {
        let mut chain = vec![];
        let mut current = Some(start);
        while let Some(id) = current {
            chain.push((id, self.scope(id).kind));
            current = self.scope(id).parent;
        }
        chain
    }
}

/// The value declarations a scope introduces by itself.
fn local_decls(file: &SourceFile, kind: ScopeKind) -> Vec<DeclId> {
    let ast = &file.ast;
    match kind {
        ScopeKind::SourceFile => file
            .members
            .iter()
            .copied()
            .filter(|decl| ast.decl(*decl).as_func().is_some())
            .collect(),
        ScopeKind::FuncDecl(decl) => ast
            .decl(decl)
            .as_func()
            .map(|func| func.params.clone())
            .unwrap_or_default(),
        ScopeKind::LocalLetDecl(decl) => ast.let_decl_vars(decl),
        ScopeKind::BlockStmt(stmt) => ast
            .stmt(stmt)
            .as_block()
            .map(|block| {
                block
                    .elements
                    .iter()
                    .filter_map(|element| match element {
                        AstNode::Decl(decl) if ast.decl(*decl).as_func().is_some() => Some(*decl),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default(),
        ScopeKind::If(_) | ScopeKind::While(_) => vec![],
    }
}

impl SourceFile {
    pub fn find_innermost_scope(&self, loc: u32) -> ScopeId {
        self.scope_map
            .borrow_mut()
            .find_innermost_scope(&self.ast, &self.members, loc)
    }

    pub fn full_expand_scopes(&self) {
        self.scope_map.borrow_mut().full_expand(&self.ast, &self.members);
    }

    pub fn dump_scopes(&self) -> String {
        self.scope_map.borrow().dump()
    }

    pub fn scope(&self, id: ScopeId) -> Scope {
        self.scope_map.borrow().scope(id).clone()
    }

    /// Walks outward from `start`. Each scope's declarations named
    /// `identifier` (or all of them when it is `None`) are handed to
    /// `consumer`, which is never called with an empty slice and stops the
    /// walk by returning `true`.
    pub fn lookup(
        &self,
        start: ScopeId,
        identifier: Option<&str>,
        consumer: &mut dyn FnMut(&[DeclId], ScopeId) -> bool,
    ) {
        let chain = self.scope_map.borrow().ancestors(start);
        for (id, kind) in chain {
            let matches: Vec<DeclId> = local_decls(self, kind)
                .into_iter()
                .filter(|decl| match identifier {
                    Some(identifier) => self.ast.decl(*decl).identifier() == Some(identifier),
                    None => true,
                })
                .collect();
            if !matches.is_empty() && consumer(&matches, id) {
                return;
            }
        }
    }
}
