use num_bigint::BigUint;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::{
    ast::{
        ast::{AstNode, DeclId, ExprId, PatternId, SourceFile, StmtId, TypeReprId},
        declarations::{Decl, DeclKind},
        expressions::{BinaryOp, ExprKind, UnaryOp},
        patterns::PatternKind,
        statements::{StmtCondition, StmtKind},
        types::TypeReprKind,
    },
    constraint_system::constraint_system::{ConstraintSystem, ConstraintSystemOptions},
    errors::errors::{Error, ErrorImpl},
    name_lookup::name_lookup::{UnqualifiedTypeLookup, UnqualifiedValueLookup},
    types::{
        context::AstContext,
        printer::TypePrintOptions,
        types::{TypeId, TypeKind},
    },
    Position,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCheckerOptions {
    pub constraint_system: ConstraintSystemOptions,
}

/// Checks one source file, writing types and resolved declarations back
/// into its AST.
pub struct TypeChecker<'a> {
    pub ctx: &'a AstContext,
    pub file: &'a SourceFile,
    pub options: TypeCheckerOptions,
    pub diagnostics: Vec<Error>,
    /// Functions being checked with their return types, innermost last.
    functions: Vec<(DeclId, TypeId)>,
    /// Variables of the `let` whose initializer is being checked.
    ignored: Vec<DeclId>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(ctx: &'a AstContext, file: &'a SourceFile, options: TypeCheckerOptions) -> Self {
        TypeChecker {
            ctx,
            file,
            options,
            diagnostics: vec![],
            functions: vec![],
            ignored: vec![],
        }
    }

    pub fn error(&mut self, error: ErrorImpl, position: Position) {
        self.diagnostics.push(Error::new(error, position));
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    fn new_constraint_system(&self) -> ConstraintSystem<'a> {
        ConstraintSystem::with_options(self.ctx, self.options.constraint_system)
    }
}

/// Types in diagnostics are printed as the user would write them. Null and
/// error types are allowed so that reporting never panics.
fn diagnostic_print_options() -> TypePrintOptions {
    TypePrintOptions {
        allow_null_types: true,
        allow_error_types: true,
        ..TypePrintOptions::for_diagnostics()
    }
}

//===- Type annotations -----------------------------------------------------===//

pub fn resolve_type_repr(type_checker: &mut TypeChecker, repr: TypeReprId) -> TypeId {
    let ctx = type_checker.ctx;
    let file = type_checker.file;
    let type_repr = file.ast.type_repr(repr);

    match &type_repr.kind {
        TypeReprKind::Identifier(name) => {
            let mut lookup = UnqualifiedTypeLookup::new(ctx);
            lookup.perform_lookup(Some(name.as_str()));
            match lookup.get_unique_result() {
                Some(ty) => ty,
                None => {
                    let position = type_repr.span.start.clone();
                    type_checker.error(
                        ErrorImpl::CannotFindTypeInScope {
                            type_: name.clone(),
                        },
                        position,
                    );
                    TypeId::ERROR
                }
            }
        }
        TypeReprKind::Paren(sub) => resolve_type_repr(type_checker, *sub),
        TypeReprKind::Tuple(elements) => {
            if elements.is_empty() {
                return ctx.get_empty_tuple_type();
            }
            let elements: Vec<TypeId> = elements
                .iter()
                .map(|element| resolve_type_repr(type_checker, *element))
                .collect();
            ctx.get_tuple_type(&elements)
        }
        TypeReprKind::Reference { sub, is_mut } => {
            let pointee = resolve_type_repr(type_checker, *sub);
            ctx.get_reference_type(pointee, *is_mut)
        }
        TypeReprKind::Maybe(sub) => {
            let inner = resolve_type_repr(type_checker, *sub);
            ctx.get_maybe_type(inner)
        }
    }
}

/// Assigns the parameter types and the `(params) -> ret` type of a function.
pub fn declare_function_signature(type_checker: &mut TypeChecker, decl: DeclId) {
    let file = type_checker.file;
    let Some(func) = file.ast.decl(decl).as_func() else {
        return;
    };

    check_duplicate_bindings(type_checker, &func.params, |identifier| {
        ErrorImpl::DuplicateParameter { identifier }
    });

    let mut params = Vec::with_capacity(func.params.len());
    for param in &func.params {
        let ty = match &file.ast.decl(*param).kind {
            DeclKind::Param(param) => resolve_type_repr(type_checker, param.type_repr),
            _ => TypeId::ERROR,
        };
        file.ast.decl(*param).set_ty(ty);
        params.push(ty);
    }

    let ret = match func.return_type {
        Some(repr) => resolve_type_repr(type_checker, repr),
        None => TypeId::VOID,
    };
    let ty = type_checker.ctx.get_function_type(&params, ret);
    file.ast.decl(decl).set_ty(ty);
}

/// Reports every declaration of `decls` whose name an earlier one already
/// binds. The later declaration is the one reported.
fn check_duplicate_bindings(
    type_checker: &mut TypeChecker,
    decls: &[DeclId],
    make_error: fn(String) -> ErrorImpl,
) {
    let file = type_checker.file;
    let mut seen = FxHashSet::default();
    for decl in decls {
        let decl = file.ast.decl(*decl);
        let Some(identifier) = decl.identifier() else {
            continue;
        };
        if !seen.insert(identifier) {
            type_checker.error(make_error(identifier.to_string()), decl.span.start.clone());
        }
    }
}

//===- Declarations and statements ------------------------------------------===//

pub fn type_check_function(type_checker: &mut TypeChecker, decl: DeclId) {
    let file = type_checker.file;
    let Some(func) = file.ast.decl(decl).as_func() else {
        return;
    };

    let ret = file
        .ast
        .decl(decl)
        .ty()
        .and_then(|ty| match type_checker.ctx.kind(ty) {
            TypeKind::Function { ret, .. } => Some(ret),
            _ => None,
        })
        .unwrap_or(TypeId::ERROR);

    let before = type_checker.diagnostics.len();
    type_checker.functions.push((decl, ret));
    if let Some(body) = func.body {
        type_check_block(type_checker, body);
    }
    type_checker.functions.pop();

    debug!(
        function = %func.identifier,
        diagnostics = type_checker.diagnostics.len() - before,
        "checked function"
    );
}

pub fn type_check_block(type_checker: &mut TypeChecker, block: StmtId) {
    let file = type_checker.file;
    let Some(block) = file.ast.stmt(block).as_block() else {
        return;
    };

    // Local functions can be called before their declaration.
    let functions: Vec<DeclId> = block
        .elements
        .iter()
        .filter_map(|element| match element {
            AstNode::Decl(decl) if file.ast.decl(*decl).as_func().is_some() => Some(*decl),
            _ => None,
        })
        .collect();
    check_duplicate_bindings(type_checker, &functions, |identifier| {
        ErrorImpl::ValueAlreadyDefined { identifier }
    });
    for function in &functions {
        declare_function_signature(type_checker, *function);
    }

    for element in &block.elements {
        type_check_node(type_checker, *element);
    }
}

pub fn type_check_node(type_checker: &mut TypeChecker, node: AstNode) {
    let file = type_checker.file;
    match node {
        AstNode::Expr(expr) => {
            let mut checker = ExprChecker::new(type_checker);
            checker.check(expr);
            checker.finish();
        }
        AstNode::Stmt(stmt) => type_check_stmt(type_checker, stmt),
        AstNode::Decl(decl) => match &file.ast.decl(decl).kind {
            DeclKind::Func(_) => type_check_function(type_checker, decl),
            DeclKind::Let(_) => type_check_let(type_checker, decl, false),
            DeclKind::Var(_) | DeclKind::Param(_) => {}
        },
    }
}

pub fn type_check_stmt(type_checker: &mut TypeChecker, stmt: StmtId) {
    let file = type_checker.file;
    match &file.ast.stmt(stmt).kind {
        StmtKind::Block(_) => type_check_block(type_checker, stmt),
        StmtKind::Return(value) => {
            let expected = type_checker
                .functions
                .last()
                .map_or(TypeId::ERROR, |(_, ret)| *ret);
            let position = file.ast.stmt(stmt).span.start.clone();

            let mut checker = ExprChecker::new(type_checker);
            let ty = match value {
                Some(value) => checker.check_rvalue(*value),
                None => TypeId::VOID,
            };
            if !checker.coerce(ty, expected) {
                checker.mismatch(expected, ty, position);
            }
            checker.finish();
        }
        StmtKind::If(if_stmt) => {
            type_check_condition(type_checker, if_stmt.condition);
            type_check_stmt(type_checker, if_stmt.then_body);
            if let Some(else_body) = if_stmt.else_body {
                type_check_stmt(type_checker, else_body);
            }
        }
        StmtKind::While(while_stmt) => {
            type_check_condition(type_checker, while_stmt.condition);
            type_check_stmt(type_checker, while_stmt.body);
        }
        StmtKind::Break | StmtKind::Continue => {}
    }
}

fn type_check_condition(type_checker: &mut TypeChecker, condition: StmtCondition) {
    match condition {
        StmtCondition::LetDecl(decl) => type_check_let(type_checker, decl, true),
        StmtCondition::Expr(expr) => {
            let position = type_checker.file.ast.expr(expr).span.start.clone();
            let mut checker = ExprChecker::new(type_checker);
            let ty = checker.check_rvalue(expr);
            if !checker.coerce(ty, TypeId::BOOL) {
                let received = checker.describe(ty);
                checker.error(ErrorImpl::ConditionNotBool { received }, position);
            }
            checker.finish();
        }
    }
}

/// Checks `let pattern [= initializer]`. In an `if let` or `while let` the
/// initializer is a `maybe T` and the pattern binds the `T`.
pub fn type_check_let(type_checker: &mut TypeChecker, decl: DeclId, conditional: bool) {
    let file = type_checker.file;
    let Some(let_decl) = file.ast.decl(decl).as_let() else {
        return;
    };

    let vars = file.ast.let_decl_vars(decl);
    check_duplicate_bindings(type_checker, &vars, |identifier| {
        ErrorImpl::DuplicatePatternBinding { identifier }
    });

    let mut checker = ExprChecker::new(type_checker);
    let pattern_ty = checker.check_pattern(let_decl.pattern);

    if let Some(initializer) = let_decl.initializer {
        let position = file.ast.expr(initializer).span.start.clone();

        checker.checker.ignored = vars.clone();
        let init_ty = checker.check_rvalue(initializer);
        checker.checker.ignored.clear();

        let value_ty = if conditional {
            let resolved = checker.cs.resolve(init_ty);
            match checker.ctx().get_maybe_value_type(resolved) {
                Some(value) => Some(value),
                None if checker.ctx().has_error_type(resolved) => Some(TypeId::ERROR),
                None => {
                    let received = checker.describe(init_ty);
                    checker.error(ErrorImpl::NotAMaybe { received }, position.clone());
                    None
                }
            }
        } else {
            Some(init_ty)
        };

        if let Some(value_ty) = value_ty {
            if !checker.coerce(value_ty, pattern_ty) {
                checker.mismatch(pattern_ty, value_ty, position);
            }
        }
    }

    checker.finish();
}

//===- Expressions ----------------------------------------------------------===//

struct IntegerLiteral {
    expr: ExprId,
    negated: bool,
}

/// Checks one statement-level expression or declaration inside its own
/// constraint system. Types are simplified and stored by `finish`.
pub struct ExprChecker<'c, 'a> {
    checker: &'c mut TypeChecker<'a>,
    cs: ConstraintSystem<'a>,
    exprs: Vec<(ExprId, TypeId)>,
    vars: Vec<(DeclId, TypeId)>,
    literals: Vec<IntegerLiteral>,
    diagnostics_before: usize,
}

impl<'c, 'a> ExprChecker<'c, 'a> {
    pub fn new(checker: &'c mut TypeChecker<'a>) -> Self {
        let cs = checker.new_constraint_system();
        let diagnostics_before = checker.diagnostics.len();
        ExprChecker {
            checker,
            cs,
            exprs: vec![],
            vars: vec![],
            literals: vec![],
            diagnostics_before,
        }
    }

    fn ctx(&self) -> &'a AstContext {
        self.checker.ctx
    }

    fn file(&self) -> &'a SourceFile {
        self.checker.file
    }

    fn error(&mut self, error: ErrorImpl, position: Position) {
        self.checker.error(error, position);
    }

    fn describe(&self, ty: TypeId) -> String {
        self.cs.print_type(ty, &diagnostic_print_options())
    }

    fn mismatch(&mut self, expected: TypeId, received: TypeId, position: Position) {
        let expected = self.describe(expected);
        let received = self.describe(received);
        self.error(ErrorImpl::TypeMatchError { expected, received }, position);
    }

    fn resolve(&self, ty: TypeId) -> TypeId {
        self.cs.resolve(self.ctx().get_rvalue_type(ty))
    }

    fn is_numeric(&self, ty: TypeId) -> bool {
        self.cs.is_numeric(self.resolve(ty))
    }

    /// Implicitly converts `from` to `to`. The bindings every step of the
    /// conversion needs are kept so that literals take the type they are
    /// used as, even inside tuples and nested `maybe`s.
    pub fn coerce(&mut self, from: TypeId, to: TypeId) -> bool {
        // Errors flow into the variables they reach, so nothing downstream
        // is reported as uninferable.
        let target = self.resolve(to);
        if self.ctx().is_error_type(self.resolve(from))
            && self.cs.variable_id(target).is_some()
            && self.cs.can_bind(target, TypeId::ERROR)
        {
            self.cs.bind(target, TypeId::ERROR);
            return true;
        }

        self.cs.implicitly_cast(from, to)
    }

    /// Checks `expr` and strips any `@lvalue` off its type.
    pub fn check_rvalue(&mut self, expr: ExprId) -> TypeId {
        let ty = self.check(expr);
        self.ctx().get_rvalue_type(ty)
    }

    pub fn check(&mut self, expr: ExprId) -> TypeId {
        let ty = self.check_impl(expr);
        self.exprs.push((expr, ty));
        ty
    }

    fn check_impl(&mut self, expr_id: ExprId) -> TypeId {
        let ctx = self.ctx();
        let file = self.file();
        let expr = file.ast.expr(expr_id);
        let position = expr.span.start.clone();

        match &expr.kind {
            ExprKind::IntegerLiteral(_) => {
                self.literals.push(IntegerLiteral {
                    expr: expr_id,
                    negated: false,
                });
                self.cs.create_integer_type_variable()
            }
            ExprKind::FloatLiteral(_) => self.cs.create_float_type_variable(),
            ExprKind::BooleanLiteral(_) => TypeId::BOOL,
            ExprKind::NullLiteral => TypeId::NULL,
            ExprKind::Discard => {
                let var = self.cs.create_general_type_variable();
                ctx.get_lvalue_type(var)
            }
            ExprKind::DeclRef(decl_ref) => {
                let mut lookup = UnqualifiedValueLookup::new(file);
                for ignored in &self.checker.ignored {
                    lookup.ignore(*ignored);
                }
                lookup.perform_lookup(position.0, Some(decl_ref.identifier.as_str()));

                if lookup.is_empty() {
                    self.error(
                        ErrorImpl::CannotFindValueInScope {
                            identifier: decl_ref.identifier.clone(),
                        },
                        position,
                    );
                    return TypeId::ERROR;
                }
                let Some(decl) = lookup.get_unique_result() else {
                    let candidates = lookup.results().len();
                    self.error(
                        ErrorImpl::AmbiguousReference {
                            identifier: decl_ref.identifier.clone(),
                            candidates,
                        },
                        position,
                    );
                    return TypeId::ERROR;
                };

                let resolved = file.ast.decl(decl);
                if self.is_captured(resolved) {
                    self.error(
                        ErrorImpl::CannotCaptureLocalValue {
                            identifier: decl_ref.identifier.clone(),
                        },
                        position,
                    );
                    return TypeId::ERROR;
                }

                decl_ref.resolve(decl);
                let ty = resolved.ty().unwrap_or(TypeId::ERROR);
                match &resolved.kind {
                    DeclKind::Var(var) if var.is_mut => ctx.get_lvalue_type(ty),
                    _ => ty,
                }
            }
            ExprKind::Tuple(elements) => {
                if elements.is_empty() {
                    return ctx.get_empty_tuple_type();
                }
                let elements: Vec<TypeId> = elements
                    .iter()
                    .map(|element| self.check_rvalue(*element))
                    .collect();
                ctx.get_tuple_type(&elements)
            }
            ExprKind::Paren(sub) => self.check(*sub),
            ExprKind::Call { callee, args } => self.check_call(*callee, args, position),
            ExprKind::Member {
                base,
                member,
                is_arrow,
            } => self.check_member(*base, member, *is_arrow, position),
            ExprKind::ForceUnwrap(sub) => {
                let sub_ty = self.check_rvalue(*sub);
                let resolved = self.resolve(sub_ty);
                if ctx.has_error_type(resolved) {
                    return TypeId::ERROR;
                }
                match ctx.get_maybe_value_type(resolved) {
                    Some(value) => value,
                    None => {
                        let type_ = self.describe(sub_ty);
                        self.error(ErrorImpl::CannotForceUnwrap { type_ }, position);
                        TypeId::ERROR
                    }
                }
            }
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => self.check_conditional(*condition, *then_expr, *else_expr),
            ExprKind::Cast { sub, to } => {
                let from = self.check_rvalue(*sub);
                let to = resolve_type_repr(self.checker, *to);
                if ctx.has_error_type(from) || ctx.has_error_type(to) {
                    return to;
                }
                if !self.cs.can_explicitly_cast(from, to) {
                    let from = self.describe(from);
                    let to = self.describe(to);
                    self.error(ErrorImpl::InvalidExplicitCast { from, to }, position);
                }
                to
            }
            ExprKind::Unary { op, sub } => self.check_unary(*op, *sub, position),
            ExprKind::Binary { op, lhs, rhs } => self.check_binary(*op, *lhs, *rhs, position),
        }
    }

    /// Whether `decl` is a variable or parameter of a function enclosing the
    /// one being checked. Local functions cannot capture those.
    fn is_captured(&self, decl: &Decl) -> bool {
        if !matches!(decl.kind, DeclKind::Var(_) | DeclKind::Param(_)) {
            return false;
        }
        let Some((function, _)) = self.checker.functions.last() else {
            return false;
        };
        !self.file().ast.decl(*function).span.contains_span(&decl.span)
    }

    fn check_call(&mut self, callee: ExprId, args: &[ExprId], position: Position) -> TypeId {
        let callee_ty = self.check_rvalue(callee);
        let arg_tys: Vec<TypeId> = args.iter().map(|arg| self.check_rvalue(*arg)).collect();

        let resolved = self.resolve(callee_ty);
        if self.ctx().has_error_type(resolved) {
            return TypeId::ERROR;
        }
        let TypeKind::Function { params, ret } = self.ctx().kind(resolved) else {
            let type_ = self.describe(callee_ty);
            self.error(ErrorImpl::NotCallable { type_ }, position);
            return TypeId::ERROR;
        };

        if params.len() != arg_tys.len() {
            self.error(
                ErrorImpl::ArgumentCountMismatch {
                    expected: params.len(),
                    received: arg_tys.len(),
                },
                position,
            );
            return ret;
        }

        for ((arg, arg_ty), param) in args.iter().zip(arg_tys).zip(params) {
            if !self.coerce(arg_ty, param) {
                let position = self.file().ast.expr(*arg).span.start.clone();
                self.mismatch(param, arg_ty, position);
            }
        }
        ret
    }

    /// Tuple members are positional. A member of an lvalue, or of what a
    /// `&mut` points to, is an lvalue.
    fn check_member(
        &mut self,
        base: ExprId,
        member: &str,
        is_arrow: bool,
        position: Position,
    ) -> TypeId {
        let ctx = self.ctx();
        let base_ty = self.check(base);
        let resolved = self.resolve(base_ty);
        if ctx.has_error_type(resolved) {
            return TypeId::ERROR;
        }

        let (tuple, is_lvalue) = match ctx.kind(resolved) {
            TypeKind::Reference { pointee, is_mut } if is_arrow => {
                (self.cs.resolve(pointee), is_mut)
            }
            _ if is_arrow => {
                let type_ = self.describe(base_ty);
                self.error(ErrorImpl::ArrowBaseNotReference { type_ }, position);
                return TypeId::ERROR;
            }
            TypeKind::Reference { .. } => {
                let type_ = self.describe(base_ty);
                self.error(ErrorImpl::DotBaseIsReference { type_ }, position);
                return TypeId::ERROR;
            }
            _ => (resolved, ctx.is_lvalue_type(base_ty)),
        };
        if ctx.has_error_type(tuple) {
            return TypeId::ERROR;
        }

        let element = ctx
            .lookup_tuple_member(tuple, member)
            .and_then(|index| ctx.tuple_elements(tuple).map(|elements| elements[index]));
        match element {
            Some(element) if is_lvalue => ctx.get_lvalue_type(element),
            Some(element) => element,
            None => {
                let type_ = self.describe(tuple);
                self.error(
                    ErrorImpl::NoSuchMember {
                        type_,
                        member: member.to_string(),
                    },
                    position,
                );
                TypeId::ERROR
            }
        }
    }

    fn check_unary(&mut self, op: UnaryOp, sub: ExprId, position: Position) -> TypeId {
        let ctx = self.ctx();
        let sub_ty = self.check(sub);
        let rvalue = ctx.get_rvalue_type(sub_ty);
        if ctx.has_error_type(rvalue) {
            return TypeId::ERROR;
        }

        match op {
            UnaryOp::Minus => {
                let literal = self.literals.iter_mut().find(|literal| literal.expr == sub);
                if let Some(literal) = literal {
                    literal.negated = true;
                }
                if self.is_numeric(rvalue) {
                    return rvalue;
                }
                self.invalid_operand("-", rvalue, position)
            }
            UnaryOp::Not => {
                if self.coerce(rvalue, TypeId::BOOL) {
                    return TypeId::BOOL;
                }
                self.invalid_operand("!", rvalue, position)
            }
            UnaryOp::Deref => match ctx.kind(self.resolve(rvalue)) {
                TypeKind::Reference {
                    pointee,
                    is_mut: true,
                } => ctx.get_lvalue_type(pointee),
                TypeKind::Reference { pointee, .. } => pointee,
                _ => {
                    let type_ = self.describe(rvalue);
                    self.error(ErrorImpl::CannotDereference { type_ }, position);
                    TypeId::ERROR
                }
            },
            UnaryOp::AddressOf | UnaryOp::AddressOfMut => {
                self.check_address_of(op == UnaryOp::AddressOfMut, sub, sub_ty, position)
            }
        }
    }

    /// `&x` needs something with storage: a variable, a parameter, a member
    /// of one, or a dereferenced reference. `&mut x` also needs an lvalue.
    fn check_address_of(
        &mut self,
        is_mut: bool,
        sub: ExprId,
        sub_ty: TypeId,
        position: Position,
    ) -> TypeId {
        let ctx = self.ctx();
        let file = self.file();

        let error = match &file.ast.expr(self.skip_parens(sub)).kind {
            ExprKind::IntegerLiteral(_)
            | ExprKind::FloatLiteral(_)
            | ExprKind::BooleanLiteral(_)
            | ExprKind::NullLiteral => Some(ErrorImpl::CannotTakeAddressOfLiteral),
            ExprKind::DeclRef(decl_ref) => decl_ref
                .resolved()
                .filter(|decl| file.ast.decl(*decl).as_func().is_some())
                .map(|_| ErrorImpl::CannotTakeAddressOfFunction {
                    identifier: decl_ref.identifier.clone(),
                }),
            _ if !self.has_storage(sub) => Some(ErrorImpl::CannotTakeAddressOfTemporary),
            _ => None,
        };
        if let Some(error) = error {
            self.error(error, position);
            return TypeId::ERROR;
        }

        if is_mut && !ctx.is_lvalue_type(sub_ty) {
            let type_ = self.describe(sub_ty);
            self.error(ErrorImpl::NotAssignable { type_ }, position);
            return TypeId::ERROR;
        }
        ctx.get_reference_type(ctx.get_rvalue_type(sub_ty), is_mut)
    }

    fn skip_parens(&self, mut expr: ExprId) -> ExprId {
        while let ExprKind::Paren(sub) = &self.file().ast.expr(expr).kind {
            expr = *sub;
        }
        expr
    }

    fn has_storage(&self, expr: ExprId) -> bool {
        let file = self.file();
        match &file.ast.expr(self.skip_parens(expr)).kind {
            ExprKind::Discard => true,
            ExprKind::DeclRef(decl_ref) => decl_ref.resolved().is_some_and(|decl| {
                matches!(
                    file.ast.decl(decl).kind,
                    DeclKind::Var(_) | DeclKind::Param(_)
                )
            }),
            ExprKind::Member { base, is_arrow, .. } => *is_arrow || self.has_storage(*base),
            ExprKind::Unary {
                op: UnaryOp::Deref,
                ..
            } => true,
            _ => false,
        }
    }

    /// `c ? a : b` has the type both branches agree on, or the type one
    /// branch implicitly converts to.
    fn check_conditional(
        &mut self,
        condition: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    ) -> TypeId {
        let ctx = self.ctx();
        let cond_ty = self.check_rvalue(condition);
        let then_ty = self.check_rvalue(then_expr);
        let else_ty = self.check_rvalue(else_expr);

        if !self.coerce(cond_ty, TypeId::BOOL) {
            let received = self.describe(cond_ty);
            let position = self.file().ast.expr(condition).span.start.clone();
            self.error(ErrorImpl::ConditionNotBool { received }, position);
        }

        if ctx.has_error_type(then_ty) || ctx.has_error_type(else_ty) {
            return TypeId::ERROR;
        }
        if self.cs.unify(then_ty, else_ty) || self.coerce(else_ty, then_ty) {
            return then_ty;
        }
        if self.coerce(then_ty, else_ty) {
            return else_ty;
        }

        let then_type = self.describe(then_ty);
        let else_type = self.describe(else_ty);
        let position = self.file().ast.expr(else_expr).span.start.clone();
        self.error(
            ErrorImpl::ConditionalBranchMismatch {
                then_type,
                else_type,
            },
            position,
        );
        TypeId::ERROR
    }

    fn invalid_operand(&mut self, operator: &str, ty: TypeId, position: Position) -> TypeId {
        let type_ = self.describe(ty);
        self.error(
            ErrorImpl::InvalidOperand {
                operator: operator.to_string(),
                type_,
            },
            position,
        );
        TypeId::ERROR
    }

    fn check_binary(
        &mut self,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
        position: Position,
    ) -> TypeId {
        let ctx = self.ctx();

        if op == BinaryOp::Assign {
            let lhs_ty = self.check(lhs);
            let rhs_ty = self.check_rvalue(rhs);
            if ctx.has_error_type(lhs_ty) {
                return TypeId::VOID;
            }
            if !ctx.is_lvalue_type(lhs_ty) {
                let type_ = self.describe(lhs_ty);
                self.error(ErrorImpl::NotAssignable { type_ }, position);
                return TypeId::VOID;
            }
            let target = ctx.get_rvalue_type(lhs_ty);
            if !self.coerce(rhs_ty, target) {
                let position = self.file().ast.expr(rhs).span.start.clone();
                self.mismatch(target, rhs_ty, position);
            }
            return TypeId::VOID;
        }

        let lhs_ty = self.check_rvalue(lhs);
        let rhs_ty = self.check_rvalue(rhs);
        if ctx.has_error_type(lhs_ty) || ctx.has_error_type(rhs_ty) {
            return if op.is_comparison() || op.is_logical() {
                TypeId::BOOL
            } else {
                TypeId::ERROR
            };
        }

        let valid = if op.is_logical() {
            self.coerce(lhs_ty, TypeId::BOOL) && self.coerce(rhs_ty, TypeId::BOOL)
        } else if matches!(op, BinaryOp::Eq | BinaryOp::NotEq) {
            self.cs.unify(lhs_ty, rhs_ty)
                || self.coerce(rhs_ty, lhs_ty)
                || self.coerce(lhs_ty, rhs_ty)
        } else {
            self.cs.unify(lhs_ty, rhs_ty) && self.is_numeric(lhs_ty)
        };

        if !valid {
            let lhs = self.describe(lhs_ty);
            let rhs = self.describe(rhs_ty);
            self.error(
                ErrorImpl::InvalidOperands {
                    operator: op.spelling().to_string(),
                    lhs,
                    rhs,
                },
                position,
            );
            return if op.is_comparison() || op.is_logical() {
                TypeId::BOOL
            } else {
                TypeId::ERROR
            };
        }

        if op.is_comparison() || op.is_logical() {
            TypeId::BOOL
        } else {
            lhs_ty
        }
    }

    //===- Patterns ---------------------------------------------------------===//

    /// The type a pattern matches. Every variable gets a fresh type variable,
    /// and annotations are unified with what they annotate.
    pub fn check_pattern(&mut self, pattern: PatternId) -> TypeId {
        let ctx = self.ctx();
        let file = self.file();
        let pattern = file.ast.pattern(pattern);

        match &pattern.kind {
            PatternKind::Var(decl) => {
                let var = self.cs.create_general_type_variable();
                self.vars.push((*decl, var));
                var
            }
            PatternKind::Discard => self.cs.create_general_type_variable(),
            PatternKind::Mut(sub) | PatternKind::Paren(sub) => self.check_pattern(*sub),
            PatternKind::Tuple(elements) => {
                if elements.is_empty() {
                    return ctx.get_empty_tuple_type();
                }
                let elements: Vec<TypeId> = elements
                    .iter()
                    .map(|element| self.check_pattern(*element))
                    .collect();
                ctx.get_tuple_type(&elements)
            }
            PatternKind::Typed { sub, type_repr } => {
                let sub_ty = self.check_pattern(*sub);
                let annotation = resolve_type_repr(self.checker, *type_repr);
                if !self.cs.unify(sub_ty, annotation) {
                    self.mismatch(annotation, sub_ty, pattern.span.start.clone());
                }
                annotation
            }
        }
    }

    //===- Finishing --------------------------------------------------------===//

    /// Simplifies and stores every type, then reports what could not be
    /// inferred and integer literals that don't fit.
    pub fn finish(mut self) {
        let ctx = self.ctx();
        let file = self.file();
        let clean = self.checker.diagnostics.len() == self.diagnostics_before;
        let mut reported_inference = false;

        for (decl, var) in std::mem::take(&mut self.vars) {
            let (ty, unbound) = self.cs.simplify_type(var);
            let decl = file.ast.decl(decl);
            decl.set_ty(ty);
            if unbound && clean {
                reported_inference = true;
                let what = format!("`{}`", decl.identifier().unwrap_or("_"));
                self.error(ErrorImpl::CannotInferType { what }, decl.span.start.clone());
            }
        }

        for (expr, ty) in std::mem::take(&mut self.exprs) {
            let (ty, unbound) = self.cs.simplify_type(ty);
            let expr = file.ast.expr(expr);
            expr.set_ty(ty);
            if unbound && clean && !reported_inference {
                reported_inference = true;
                self.error(
                    ErrorImpl::CannotInferType {
                        what: String::from("this expression"),
                    },
                    expr.span.start.clone(),
                );
            }
        }

        for literal in std::mem::take(&mut self.literals) {
            let expr = file.ast.expr(literal.expr);
            let (ExprKind::IntegerLiteral(text), Some(ty)) = (&expr.kind, expr.ty()) else {
                continue;
            };
            let Some((bits, signed)) = ctx.integer_info(ty) else {
                continue;
            };
            if !literal_fits(text, bits, signed, literal.negated) {
                let type_ = ctx.print_type(ty, &diagnostic_print_options());
                self.error(
                    ErrorImpl::IntegerLiteralOverflow {
                        literal: text.clone(),
                        type_,
                    },
                    expr.span.start.clone(),
                );
            }
        }
    }
}

/// Whether the magnitude `text` fits an integer of the given width. Negated
/// signed literals may reach one past the positive maximum.
fn literal_fits(text: &str, bits: u16, signed: bool, negated: bool) -> bool {
    let Some(value) = BigUint::parse_bytes(text.as_bytes(), 10) else {
        return false;
    };
    let magnitude_bits = if signed { bits - 1 } else { bits };
    let limit = BigUint::from(1u8) << usize::from(magnitude_bits);
    if signed && negated {
        value <= limit
    } else {
        value < limit
    }
}

/// Checks every function of `file`. Diagnostics accumulate on the returned
/// checker; types and resolved references are written into the AST.
#[tracing::instrument(skip_all, fields(file = %file.name))]
pub fn type_check<'a>(
    ctx: &'a AstContext,
    file: &'a SourceFile,
    options: &TypeCheckerOptions,
) -> TypeChecker<'a> {
    let mut type_checker = TypeChecker::new(ctx, file, *options);

    check_duplicate_bindings(&mut type_checker, &file.members, |identifier| {
        ErrorImpl::ValueAlreadyDefined { identifier }
    });
    for member in &file.members {
        declare_function_signature(&mut type_checker, *member);
    }
    for member in &file.members {
        type_check_function(&mut type_checker, *member);
    }

    debug!(
        functions = file.members.len(),
        diagnostics = type_checker.diagnostics.len(),
        "type checked file"
    );
    type_checker
}
