use crate::types::types::{TypeId, TypeKind};

use super::constraint_system::ConstraintSystem;

impl ConstraintSystem<'_> {
    /// Whether a value of type `from` can be used where `to` is expected.
    /// Never binds anything.
    pub fn can_implicitly_cast(&mut self, from: TypeId, to: TypeId) -> bool {
        let snapshot = self.env.snapshot();
        let legal = self.implicit_cast_impl(from, to);
        self.env.restore(snapshot);
        legal
    }

    /// Converts `from` to `to` implicitly, keeping the bindings each step of
    /// the conversion needs. Nothing is bound when the conversion is illegal.
    pub fn implicitly_cast(&mut self, from: TypeId, to: TypeId) -> bool {
        let snapshot = self.env.snapshot();
        let legal = self.implicit_cast_impl(from, to);
        if !legal {
            self.env.restore(snapshot);
        }
        legal
    }

    fn implicit_cast_impl(&mut self, from: TypeId, to: TypeId) -> bool {
        let from = self.ctx.rebuild_type_without_lvalues(from);
        let to = self.ctx.rebuild_type_without_lvalues(to);
        if self.ctx.has_error_type(from) || self.ctx.has_error_type(to) {
            return true;
        }
        if self.unify(from, to) {
            return true;
        }

        let from = self.resolve(from);
        let to = self.resolve(to);
        match (self.ctx.kind(from), self.ctx.kind(to)) {
            (TypeKind::Null, TypeKind::Maybe(_)) => true,
            (TypeKind::Maybe(from_value), TypeKind::Maybe(to_value)) => {
                self.implicit_cast_impl(from_value, to_value)
            }
            (_, TypeKind::Maybe(to_value)) => self.implicit_cast_impl(from, to_value),
            (
                TypeKind::Reference {
                    pointee: from_pointee,
                    is_mut: true,
                },
                TypeKind::Reference {
                    pointee: to_pointee,
                    is_mut: false,
                },
            ) => self.unify(from_pointee, to_pointee),
            (TypeKind::Tuple(from_elements), TypeKind::Tuple(to_elements)) => {
                from_elements.len() == to_elements.len()
                    && from_elements
                        .iter()
                        .zip(&to_elements)
                        .all(|(from, to)| self.implicit_cast_impl(*from, *to))
            }
            _ => false,
        }
    }

    /// Whether `from as to` is legal.
    ///
    /// Unbound integer and float variables convert to any numeric type and
    /// stay unbound. Other variables are unified with the target, and those
    /// bindings are kept when the cast is legal.
    pub fn can_explicitly_cast(&mut self, from: TypeId, to: TypeId) -> bool {
        assert!(
            !self.ctx.has_error_type(from),
            "an error type cannot be the source of an explicit cast"
        );
        let snapshot = self.env.snapshot();
        let legal = self.explicit_cast_impl(from, to);
        if !legal {
            self.env.restore(snapshot);
        }
        legal
    }

    fn explicit_cast_impl(&mut self, from: TypeId, to: TypeId) -> bool {
        if self.ctx.has_error_type(to) {
            return true;
        }
        let from = self.resolve(self.ctx.rebuild_type_without_lvalues(from));
        let to = self.resolve(self.ctx.rebuild_type_without_lvalues(to));
        if from == to {
            return true;
        }

        if self.is_unbound_numeric_variable(from) {
            return self.is_numeric(to) || self.unify(from, to);
        }
        if self.is_unbound_numeric_variable(to) && self.is_numeric(from) {
            return true;
        }
        if self.unify(from, to) {
            return true;
        }
        // Every implicit conversion is also a legal explicit one.
        if self.implicitly_cast(from, to) {
            return true;
        }

        match (self.ctx.kind(from), self.ctx.kind(to)) {
            (
                TypeKind::Integer { .. } | TypeKind::Float(_),
                TypeKind::Integer { .. } | TypeKind::Float(_),
            ) => true,
            (TypeKind::Maybe(from_value), TypeKind::Maybe(to_value)) => {
                self.explicit_cast_impl(from_value, to_value)
            }
            (TypeKind::Tuple(from_elements), TypeKind::Tuple(to_elements)) => {
                from_elements.len() == to_elements.len()
                    && from_elements
                        .iter()
                        .zip(&to_elements)
                        .all(|(from, to)| self.explicit_cast_impl(*from, *to))
            }
            _ => false,
        }
    }

    /// Numeric builtins and unbound numeric variables.
    pub(crate) fn is_numeric(&self, ty: TypeId) -> bool {
        self.ctx.is_any_integer_type(ty)
            || self.ctx.is_any_float_type(ty)
            || self.is_unbound_numeric_variable(ty)
    }
}
