use std::fmt::Write;

use super::{
    context::AstContext,
    types::{IntegerWidth, TypeId, TypeKind, TypeVariableKind},
};

/// Controls how `TypePrinter` renders types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypePrintOptions {
    /// Print an absent type as `<null_type>` instead of panicking.
    pub allow_null_types: bool,
    /// Print the error type as `<error_type>` instead of panicking.
    pub allow_error_types: bool,
    /// Print `@lvalue` prefixes. When off, lvalues are transparent.
    pub print_lvalues: bool,
    /// Print type variables as `$T0`, `$I0` or `$F0`.
    pub debug_type_variables: bool,
    /// Print a bound type variable as its binding.
    pub print_bound_type_variables_as_binding: bool,
    /// Print an unbound numeric type variable as its default type.
    pub print_default_for_unbound_type_variables: bool,
}

impl TypePrintOptions {
    pub fn for_debug() -> Self {
        TypePrintOptions {
            allow_null_types: true,
            allow_error_types: true,
            print_lvalues: true,
            debug_type_variables: true,
            print_bound_type_variables_as_binding: false,
            print_default_for_unbound_type_variables: false,
        }
    }

    pub fn for_diagnostics() -> Self {
        TypePrintOptions {
            allow_null_types: false,
            allow_error_types: false,
            print_lvalues: false,
            debug_type_variables: false,
            print_bound_type_variables_as_binding: true,
            print_default_for_unbound_type_variables: true,
        }
    }
}

impl Default for TypePrintOptions {
    fn default() -> Self {
        Self::for_debug()
    }
}

/// What the printer needs to know about type variables it meets.
pub trait TypeVariableBindings {
    /// Current kind of the variable, which may have been upgraded since creation.
    fn kind_of(&self, id: u32) -> Option<TypeVariableKind>;
    fn binding_of(&self, id: u32) -> Option<TypeId>;
    fn default_for(&self, kind: TypeVariableKind) -> Option<TypeId>;
}

pub struct TypePrinter<'a> {
    ctx: &'a AstContext,
    options: &'a TypePrintOptions,
    bindings: Option<&'a dyn TypeVariableBindings>,
}

impl<'a> TypePrinter<'a> {
    pub fn new(
        ctx: &'a AstContext,
        options: &'a TypePrintOptions,
        bindings: Option<&'a dyn TypeVariableBindings>,
    ) -> Self {
        TypePrinter {
            ctx,
            options,
            bindings,
        }
    }

    pub fn print(&self, ty: Option<TypeId>) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty);
        out
    }

    fn write_type(&self, out: &mut String, ty: Option<TypeId>) {
        let Some(ty) = ty else {
            assert!(
                self.options.allow_null_types,
                "attempted to print a null type"
            );
            out.push_str("<null_type>");
            return;
        };

        match self.ctx.kind(ty) {
            TypeKind::Integer { width, signed } => {
                let prefix = if signed { 'i' } else { 'u' };
                let _ = match width {
                    IntegerWidth::Fixed(bits) => write!(out, "{}{}", prefix, bits),
                    IntegerWidth::Pointer => write!(out, "{}size", prefix),
                };
            }
            TypeKind::Float(kind) => {
                let _ = write!(out, "f{}", kind.width());
            }
            TypeKind::Void => out.push_str("void"),
            TypeKind::Bool => out.push_str("bool"),
            TypeKind::Null => out.push_str("null"),
            TypeKind::Error => {
                assert!(
                    self.options.allow_error_types,
                    "attempted to print an error type"
                );
                out.push_str("<error_type>");
            }
            TypeKind::Reference { pointee, is_mut } => {
                out.push_str(if is_mut { "&mut " } else { "&" });
                self.write_type(out, Some(pointee));
            }
            TypeKind::Maybe(inner) => {
                out.push_str("maybe ");
                self.write_type(out, Some(inner));
            }
            TypeKind::Tuple(elements) => self.write_list(out, &elements),
            TypeKind::Function { params, ret } => {
                self.write_list(out, &params);
                out.push_str(" -> ");
                self.write_type(out, Some(ret));
            }
            TypeKind::LValue(object) => {
                if self.options.print_lvalues {
                    out.push_str("@lvalue ");
                }
                self.write_type(out, Some(object));
            }
            TypeKind::TypeVariable { id, kind } => self.write_type_variable(out, id, kind),
        }
    }

    fn write_list(&self, out: &mut String, types: &[TypeId]) {
        out.push('(');
        for (i, ty) in types.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_type(out, Some(*ty));
        }
        out.push(')');
    }

    fn write_type_variable(&self, out: &mut String, id: u32, created_as: TypeVariableKind) {
        let kind = self
            .bindings
            .and_then(|bindings| bindings.kind_of(id))
            .unwrap_or(created_as);
        let binding = self.bindings.and_then(|bindings| bindings.binding_of(id));

        if self.options.debug_type_variables {
            let _ = write!(out, "${}{}", kind.letter(), id);
            if let Some(binding) = binding {
                out.push('(');
                self.write_type(out, Some(binding));
                out.push(')');
            }
            return;
        }

        if let Some(binding) = binding {
            if self.options.print_bound_type_variables_as_binding {
                return self.write_type(out, Some(binding));
            }
        } else if self.options.print_default_for_unbound_type_variables {
            if let Some(default) = self.bindings.and_then(|bindings| bindings.default_for(kind)) {
                return self.write_type(out, Some(default));
            }
        }
        out.push('_');
    }
}
