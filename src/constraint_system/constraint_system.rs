use std::fmt::Write;

use tracing::{debug, trace};

use crate::{
    arena::arena::ArenaKind,
    types::{
        context::AstContext,
        printer::{TypePrintOptions, TypePrinter},
        types::{TypeId, TypeKind, TypeVariableKind},
    },
};

use super::type_variables::TypeVariableEnvironment;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstraintSystemOptions {
    /// What unbound integer variables become. `i32` when unset.
    pub int_default: Option<TypeId>,
    /// What unbound float variables become. `f64` when unset.
    pub float_default: Option<TypeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnificationOptions {
    pub ignore_lvalues: bool,
    pub ignore_reference_mutability: bool,
}

impl Default for UnificationOptions {
    fn default() -> Self {
        UnificationOptions {
            ignore_lvalues: true,
            ignore_reference_mutability: false,
        }
    }
}

/// Inference state for one unit of checking.
///
/// Creating one opens the context's constraint-system region and dropping
/// it closes the region, which invalidates every type that mentions one of
/// its variables. Only one constraint system can be alive per context.
pub struct ConstraintSystem<'ctx> {
    pub ctx: &'ctx AstContext,
    pub(crate) env: TypeVariableEnvironment,
    variables: Vec<TypeId>,
    epoch: u32,
}

impl<'ctx> ConstraintSystem<'ctx> {
    pub fn new(ctx: &'ctx AstContext) -> Self {
        Self::with_options(ctx, ConstraintSystemOptions::default())
    }

    pub fn with_options(ctx: &'ctx AstContext, options: ConstraintSystemOptions) -> Self {
        assert!(
            !ctx.is_constraint_system_active(),
            "a constraint system is already active on this context"
        );
        let int_default = options.int_default.unwrap_or(TypeId::I32);
        let float_default = options.float_default.unwrap_or(TypeId::F64);
        assert!(
            ctx.is_any_integer_type(int_default),
            "the integer default must be an integer type"
        );
        assert!(
            ctx.is_any_float_type(float_default),
            "the float default must be a float type"
        );

        let epoch = ctx.begin_constraint_system_region();
        ConstraintSystem {
            ctx,
            env: TypeVariableEnvironment::new(int_default, float_default),
            variables: vec![],
            epoch,
        }
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    //===- Type variables ---------------------------------------------------===//

    pub fn create_type_variable(&mut self, kind: TypeVariableKind) -> TypeId {
        let id = self.env.push(kind);
        let ty = self.ctx.get_type_variable(id, kind);
        self.variables.push(ty);
        ty
    }

    pub fn create_general_type_variable(&mut self) -> TypeId {
        self.create_type_variable(TypeVariableKind::General)
    }

    pub fn create_integer_type_variable(&mut self) -> TypeId {
        self.create_type_variable(TypeVariableKind::Integer)
    }

    pub fn create_float_type_variable(&mut self) -> TypeId {
        self.create_type_variable(TypeVariableKind::Float)
    }

    /// Every variable created so far, in creation order.
    pub fn type_variables(&self) -> &[TypeId] {
        &self.variables
    }

    pub(crate) fn variable_id(&self, ty: TypeId) -> Option<u32> {
        match self.ctx.kind(ty) {
            TypeKind::TypeVariable { id, .. } => Some(id),
            _ => None,
        }
    }

    fn expect_variable(&self, ty: TypeId) -> u32 {
        match self.variable_id(ty) {
            Some(id) => id,
            None => panic!(
                "{} is not a type variable",
                self.print_type(ty, &TypePrintOptions::for_debug())
            ),
        }
    }

    /// The current kind of a variable, including upgrades.
    pub fn variable_kind(&self, var: TypeId) -> TypeVariableKind {
        self.env.kind(self.expect_variable(var))
    }

    pub fn get_binding(&self, var: TypeId) -> Option<TypeId> {
        self.env.binding(self.expect_variable(var))
    }

    pub fn is_bound(&self, var: TypeId) -> bool {
        self.get_binding(var).is_some()
    }

    pub fn get_default_type(&self, kind: TypeVariableKind) -> Option<TypeId> {
        self.env.default_type(kind)
    }

    pub fn get_binding_or_default(&self, var: TypeId) -> Option<TypeId> {
        let id = self.expect_variable(var);
        self.env
            .binding(id)
            .or_else(|| self.env.default_type(self.env.kind(id)))
    }

    /// Follows bindings at the top level until reaching something that is
    /// not a bound variable. The result is canonical.
    pub(crate) fn resolve(&self, ty: TypeId) -> TypeId {
        let mut ty = self.ctx.get_canonical_type(ty).id();
        while let Some(binding) = self.variable_id(ty).and_then(|id| self.env.binding(id)) {
            ty = self.ctx.get_canonical_type(binding).id();
        }
        ty
    }

    /// An unbound integer or float variable.
    pub(crate) fn is_unbound_numeric_variable(&self, ty: TypeId) -> bool {
        self.variable_id(ty).is_some_and(|id| {
            self.env.binding(id).is_none() && self.env.kind(id) != TypeVariableKind::General
        })
    }

    /// Whether `id` occurs in `ty`, looking through bindings.
    fn occurs(&self, id: u32, ty: TypeId) -> bool {
        if !self.ctx.has_type_variable(ty) {
            return false;
        }
        if let Some(other) = self.variable_id(ty) {
            return other == id
                || self
                    .env
                    .binding(other)
                    .is_some_and(|binding| self.occurs(id, binding));
        }
        self.ctx
            .kind(ty)
            .children()
            .iter()
            .any(|child| self.occurs(id, *child))
    }

    //===- Binding ----------------------------------------------------------===//

    pub fn can_bind(&self, var: TypeId, candidate: TypeId) -> bool {
        let id = self.expect_variable(var);
        if self.env.binding(id).is_some() {
            return false;
        }
        let candidate = self.resolve(candidate);
        if self.ctx.has_lvalue(candidate) || self.occurs(id, candidate) {
            return false;
        }

        let kind = self.env.kind(id);
        let candidate_kind = self.variable_id(candidate).map(|other| self.env.kind(other));
        match (kind, candidate_kind) {
            (TypeVariableKind::General, _) => true,
            (kind, Some(candidate_kind)) => {
                candidate_kind == kind || candidate_kind == TypeVariableKind::General
            }
            (TypeVariableKind::Integer, None) => self.ctx.is_any_integer_type(candidate),
            (TypeVariableKind::Float, None) => self.ctx.is_any_float_type(candidate),
        }
    }

    /// Binds `var` to `candidate`, which must satisfy `can_bind`.
    pub fn bind(&mut self, var: TypeId, candidate: TypeId) {
        assert!(
            self.can_bind(var, candidate),
            "cannot bind {} to {}",
            self.print_type(var, &TypePrintOptions::for_debug()),
            self.print_type(candidate, &TypePrintOptions::for_debug())
        );
        let id = self.expect_variable(var);
        self.env.set_binding(id, candidate);

        let kind = self.env.kind(id);
        if kind != TypeVariableKind::General {
            if let Some(other) = self.variable_id(self.resolve(candidate)) {
                if self.env.kind(other) == TypeVariableKind::General {
                    self.env.set_kind(other, kind);
                }
            }
        }

        trace!(
            var = %self.print_type(var, &TypePrintOptions::for_debug()),
            "bound type variable"
        );
    }

    //===- Unification ------------------------------------------------------===//

    pub fn unify(&mut self, a: TypeId, b: TypeId) -> bool {
        self.unify_with(a, b, &UnificationOptions::default())
    }

    /// Makes `a` and `b` equal by binding variables. Nothing is bound when
    /// this fails.
    pub fn unify_with(&mut self, a: TypeId, b: TypeId, options: &UnificationOptions) -> bool {
        let snapshot = self.env.snapshot();
        let (a, b) = self.strip_lvalues(a, b, options);
        let unified = self.unify_impl(a, b, options);
        if !unified {
            self.env.restore(snapshot);
        }

        trace!(
            lhs = %self.print_type(a, &TypePrintOptions::for_debug()),
            rhs = %self.print_type(b, &TypePrintOptions::for_debug()),
            unified,
            "unify"
        );
        unified
    }

    /// Checks whether `a` and `b` could be unified without binding anything.
    pub fn can_unify(&mut self, a: TypeId, b: TypeId) -> bool {
        self.can_unify_with(a, b, &UnificationOptions::default())
    }

    pub fn can_unify_with(&mut self, a: TypeId, b: TypeId, options: &UnificationOptions) -> bool {
        let snapshot = self.env.snapshot();
        let (a, b) = self.strip_lvalues(a, b, options);
        let unified = self.unify_impl(a, b, options);
        self.env.restore(snapshot);
        unified
    }

    fn strip_lvalues(
        &self,
        a: TypeId,
        b: TypeId,
        options: &UnificationOptions,
    ) -> (TypeId, TypeId) {
        if options.ignore_lvalues {
            (
                self.ctx.rebuild_type_without_lvalues(a),
                self.ctx.rebuild_type_without_lvalues(b),
            )
        } else {
            (a, b)
        }
    }

    fn unify_impl(&mut self, a: TypeId, b: TypeId, options: &UnificationOptions) -> bool {
        let a = self.resolve(a);
        let b = self.resolve(b);
        if a == b {
            return true;
        }
        if self.ctx.is_error_type(a) || self.ctx.is_error_type(b) {
            return true;
        }

        match (self.variable_id(a), self.variable_id(b)) {
            (Some(x), Some(y)) => return self.unify_variables(a, x, b, y),
            (Some(_), None) => return self.try_bind(a, b),
            (None, Some(_)) => return self.try_bind(b, a),
            (None, None) => {}
        }

        match (self.ctx.kind(a), self.ctx.kind(b)) {
            (
                TypeKind::Reference {
                    pointee: lhs,
                    is_mut: lhs_mut,
                },
                TypeKind::Reference {
                    pointee: rhs,
                    is_mut: rhs_mut,
                },
            ) => {
                (lhs_mut == rhs_mut || options.ignore_reference_mutability)
                    && self.unify_impl(lhs, rhs, options)
            }
            (TypeKind::Maybe(lhs), TypeKind::Maybe(rhs)) => self.unify_impl(lhs, rhs, options),
            (TypeKind::LValue(lhs), TypeKind::LValue(rhs)) => self.unify_impl(lhs, rhs, options),
            (TypeKind::Tuple(lhs), TypeKind::Tuple(rhs)) => {
                self.unify_lists(&lhs, &rhs, options)
            }
            (
                TypeKind::Function {
                    params: lhs_params,
                    ret: lhs_ret,
                },
                TypeKind::Function {
                    params: rhs_params,
                    ret: rhs_ret,
                },
            ) => {
                self.unify_lists(&lhs_params, &rhs_params, options)
                    && self.unify_impl(lhs_ret, rhs_ret, options)
            }
            _ => false,
        }
    }

    fn unify_lists(
        &mut self,
        lhs: &[TypeId],
        rhs: &[TypeId],
        options: &UnificationOptions,
    ) -> bool {
        lhs.len() == rhs.len()
            && lhs
                .iter()
                .zip(rhs)
                .all(|(lhs, rhs)| self.unify_impl(*lhs, *rhs, options))
    }

    /// Both sides are unbound variables. A general variable is bound to a
    /// kinded one, and between equal kinds the younger variable is bound to
    /// the older one.
    fn unify_variables(&mut self, a: TypeId, x: u32, b: TypeId, y: u32) -> bool {
        let (var, target) = match (self.env.kind(x), self.env.kind(y)) {
            (lhs, rhs) if lhs == rhs => {
                if x > y {
                    (a, b)
                } else {
                    (b, a)
                }
            }
            (TypeVariableKind::General, _) => (a, b),
            (_, TypeVariableKind::General) => (b, a),
            _ => return false,
        };
        self.try_bind(var, target)
    }

    fn try_bind(&mut self, var: TypeId, candidate: TypeId) -> bool {
        if !self.can_bind(var, candidate) {
            return false;
        }
        self.bind(var, candidate);
        true
    }

    //===- Simplification ---------------------------------------------------===//

    /// Replaces every variable in `ty` by its binding, or its kind's default
    /// when unbound. Unbound general variables become the error type, which
    /// the second result reports.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn simplify_type(&self, ty: TypeId) -> (TypeId, bool) {
        if !self.ctx.has_type_variable(ty) {
            return (ty, false);
        }

        let mut had_unbound_general = false;
        let simplified = self.ctx.rebuild_type(ty, &mut |ty| {
            let id = self.variable_id(ty)?;
            let replacement = match self.env.binding(id) {
                Some(binding) => {
                    let (binding, unbound_general) = self.simplify_type(binding);
                    had_unbound_general |= unbound_general;
                    binding
                }
                None => match self.env.default_type(self.env.kind(id)) {
                    Some(default) => default,
                    None => {
                        had_unbound_general = true;
                        TypeId::ERROR
                    }
                },
            };
            Some(replacement)
        });

        debug_assert!(!self.ctx.has_type_variable(simplified));
        (simplified, had_unbound_general)
    }

    //===- Printing ---------------------------------------------------------===//

    pub fn print_type(&self, ty: impl Into<Option<TypeId>>, options: &TypePrintOptions) -> String {
        TypePrinter::new(self.ctx, options, Some(&self.env)).print(ty.into())
    }

    pub fn dump_type_variables(&self) -> String {
        let options = TypePrintOptions::for_debug();
        let mut out = String::new();
        for var in &self.variables {
            let id = self.expect_variable(*var);
            let _ = write!(out, "${}{}", self.env.kind(id).letter(), id);
            match (self.env.binding(id), self.env.default_type(self.env.kind(id))) {
                (Some(binding), _) => {
                    let _ = writeln!(out, " := {}", self.print_type(binding, &options));
                }
                (None, Some(default)) => {
                    let default = self.print_type(default, &options);
                    let _ = writeln!(out, " unbound, defaults to {}", default);
                }
                (None, None) => {
                    let _ = writeln!(out, " unbound");
                }
            }
        }
        out
    }
}

impl Drop for ConstraintSystem<'_> {
    fn drop(&mut self) {
        debug!(
            epoch = self.epoch,
            variables = self.env.len(),
            bytes = self.ctx.region_usage(ArenaKind::ConstraintSystem),
            "tearing down constraint system"
        );
        self.ctx.end_constraint_system_region();
    }
}
