use pretty_assertions::assert_eq;

use crate::{
    arena::arena::ArenaKind,
    types::{
        context::AstContext,
        printer::TypePrintOptions,
        types::{TypeId, TypeVariableKind},
    },
};

use super::constraint_system::{ConstraintSystem, ConstraintSystemOptions, UnificationOptions};

#[test]
fn test_create_type_variables() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let t = cs.create_general_type_variable();
    let i = cs.create_integer_type_variable();
    let f = cs.create_float_type_variable();

    assert_eq!(cs.type_variables(), &[t, i, f]);
    assert_eq!(cs.variable_kind(i), TypeVariableKind::Integer);
    assert!(!cs.is_bound(t));
    assert_eq!(cs.print_type(f, &TypePrintOptions::for_debug()), "$F2");
    assert_eq!(ctx.type_count(ArenaKind::ConstraintSystem), 3);
}

#[test]
fn test_can_bind_respects_kinds() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let t = cs.create_general_type_variable();
    let i = cs.create_integer_type_variable();
    let f = cs.create_float_type_variable();

    assert!(cs.can_bind(t, TypeId::BOOL));
    assert!(cs.can_bind(i, TypeId::U8));
    assert!(cs.can_bind(i, TypeId::USIZE));
    assert!(!cs.can_bind(i, TypeId::F32));
    assert!(!cs.can_bind(i, TypeId::BOOL));
    assert!(cs.can_bind(f, TypeId::F32));
    assert!(!cs.can_bind(f, TypeId::I32));
    assert!(cs.can_bind(i, t));
    assert!(!cs.can_bind(i, f));
    assert!(!cs.can_bind(f, i));
}

#[test]
fn test_can_bind_rejects_lvalues_and_cycles() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let t = cs.create_general_type_variable();
    let u = cs.create_general_type_variable();

    assert!(!cs.can_bind(t, t));
    assert!(!cs.can_bind(t, ctx.get_lvalue_type(TypeId::I32)));
    assert!(!cs.can_bind(t, ctx.get_reference_type(t, false)));

    cs.bind(u, ctx.get_maybe_type(t));
    assert!(!cs.can_bind(t, u));
    assert!(!cs.can_bind(u, TypeId::I32));
}

#[test]
fn test_bind_upgrades_general_candidate() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let i = cs.create_integer_type_variable();
    let t = cs.create_general_type_variable();
    cs.bind(i, t);

    assert_eq!(cs.get_binding(i), Some(t));
    assert_eq!(cs.variable_kind(t), TypeVariableKind::Integer);
    assert!(!cs.can_bind(t, TypeId::BOOL));
    assert!(cs.can_bind(t, TypeId::I64));
}

#[test]
#[should_panic(expected = "cannot bind")]
fn test_bind_bound_variable_panics() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let t = cs.create_general_type_variable();
    cs.bind(t, TypeId::I32);
    cs.bind(t, TypeId::I64);
}

#[test]
fn test_unify_structural() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let t = cs.create_general_type_variable();
    let u = cs.create_general_type_variable();
    let lhs = ctx.get_function_type(&[t, ctx.get_reference_type(TypeId::BOOL, true)], u);
    let rhs = ctx.get_function_type(
        &[TypeId::I8, ctx.get_reference_type(TypeId::BOOL, true)],
        TypeId::VOID,
    );

    assert!(cs.unify(lhs, rhs));
    assert_eq!(cs.get_binding(t), Some(TypeId::I8));
    assert_eq!(cs.simplify_type(lhs), (rhs, false));
}

#[test]
fn test_unify_failures() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    assert!(!cs.unify(TypeId::I32, TypeId::I64));
    assert!(!cs.unify(
        ctx.get_reference_type(TypeId::I32, true),
        ctx.get_reference_type(TypeId::I32, false)
    ));
    assert!(!cs.unify(
        ctx.get_tuple_type(&[TypeId::I32, TypeId::I32]),
        ctx.get_tuple_type(&[TypeId::I32, TypeId::I32, TypeId::I32])
    ));
    assert!(!cs.unify(ctx.get_maybe_type(TypeId::I32), TypeId::I32));

    let i = cs.create_integer_type_variable();
    let f = cs.create_float_type_variable();
    assert!(!cs.unify(i, f));
    assert!(!cs.unify(i, TypeId::BOOL));
}

#[test]
fn test_unify_options() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let lvalue = ctx.get_lvalue_type(TypeId::I32);
    assert!(cs.unify(lvalue, TypeId::I32));

    let strict = UnificationOptions {
        ignore_lvalues: false,
        ..UnificationOptions::default()
    };
    assert!(!cs.unify_with(lvalue, TypeId::I32, &strict));
    assert!(cs.unify_with(lvalue, lvalue, &strict));

    let lenient = UnificationOptions {
        ignore_reference_mutability: true,
        ..UnificationOptions::default()
    };
    assert!(cs.unify_with(
        ctx.get_reference_type(TypeId::I32, true),
        ctx.get_reference_type(TypeId::I32, false),
        &lenient
    ));
}

#[test]
fn test_unify_canonical_forms() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let empty = ctx.get_empty_tuple_type();
    assert!(cs.unify(empty, TypeId::VOID));
    assert!(cs.unify(ctx.get_maybe_type(empty), ctx.get_maybe_type(TypeId::VOID)));
}

#[test]
fn test_unify_error_type() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let i = cs.create_integer_type_variable();
    assert!(cs.unify(TypeId::ERROR, TypeId::BOOL));
    assert!(cs.unify(i, TypeId::ERROR));
    assert!(!cs.is_bound(i));
    assert!(cs.unify(
        ctx.get_tuple_type(&[TypeId::ERROR, TypeId::I8]),
        ctx.get_tuple_type(&[TypeId::BOOL, TypeId::I8])
    ));
}

#[test]
fn test_unify_is_transactional() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let t = cs.create_general_type_variable();
    let lhs = ctx.get_tuple_type(&[t, TypeId::I32]);
    let rhs = ctx.get_tuple_type(&[TypeId::BOOL, TypeId::F32]);

    assert!(!cs.unify(lhs, rhs));
    assert!(!cs.is_bound(t));

    assert!(cs.can_unify(t, TypeId::BOOL));
    assert!(!cs.is_bound(t));
}

#[test]
fn test_unify_variables_is_symmetric() {
    let ctx = AstContext::new();

    for swap in [false, true] {
        let mut cs = ConstraintSystem::new(&ctx);
        let first = cs.create_integer_type_variable();
        let second = cs.create_integer_type_variable();
        let (a, b) = if swap { (second, first) } else { (first, second) };
        assert!(cs.unify(a, b));
        assert_eq!(cs.get_binding(second), Some(first));
        assert!(!cs.is_bound(first));
    }

    for swap in [false, true] {
        let mut cs = ConstraintSystem::new(&ctx);
        let general = cs.create_general_type_variable();
        let float = cs.create_float_type_variable();
        let (a, b) = if swap { (float, general) } else { (general, float) };
        assert!(cs.unify(a, b));
        assert_eq!(cs.get_binding(general), Some(float));
        assert!(!cs.is_bound(float));
    }
}

#[test]
fn test_chained_variables_share_kind_constraints() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let t = cs.create_general_type_variable();
    let i = cs.create_integer_type_variable();
    assert!(cs.unify(t, i));
    assert!(!cs.unify(t, TypeId::BOOL));
    assert!(cs.unify(t, TypeId::U16));
    assert_eq!(cs.simplify_type(t), (TypeId::U16, false));
    assert_eq!(cs.simplify_type(i), (TypeId::U16, false));
}

#[test]
fn test_simplify_type_defaults() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let i = cs.create_integer_type_variable();
    let f = cs.create_float_type_variable();
    let t = cs.create_general_type_variable();
    let tuple = ctx.get_tuple_type(&[i, f]);

    let (simplified, had_unbound_general) = cs.simplify_type(tuple);
    assert_eq!(simplified, ctx.get_tuple_type(&[TypeId::I32, TypeId::F64]));
    assert!(simplified.is_permanent());
    assert!(!had_unbound_general);

    let (simplified, had_unbound_general) = cs.simplify_type(ctx.get_maybe_type(t));
    assert_eq!(simplified, ctx.get_maybe_type(TypeId::ERROR));
    assert!(had_unbound_general);

    assert_eq!(cs.simplify_type(TypeId::BOOL), (TypeId::BOOL, false));
}

#[test]
fn test_configured_defaults() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::with_options(
        &ctx,
        ConstraintSystemOptions {
            int_default: Some(TypeId::I64),
            float_default: Some(TypeId::F32),
        },
    );

    let i = cs.create_integer_type_variable();
    let f = cs.create_float_type_variable();
    assert_eq!(cs.get_default_type(TypeVariableKind::General), None);
    assert_eq!(cs.get_binding_or_default(i), Some(TypeId::I64));
    assert_eq!(cs.simplify_type(f), (TypeId::F32, false));
}

#[test]
#[should_panic(expected = "the integer default must be an integer type")]
fn test_invalid_default_panics() {
    let ctx = AstContext::new();
    ConstraintSystem::with_options(
        &ctx,
        ConstraintSystemOptions {
            int_default: Some(TypeId::F32),
            float_default: None,
        },
    );
}

#[test]
fn test_can_implicitly_cast() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let maybe_i32 = ctx.get_maybe_type(TypeId::I32);
    assert!(cs.can_implicitly_cast(TypeId::I32, TypeId::I32));
    assert!(cs.can_implicitly_cast(TypeId::NULL, maybe_i32));
    assert!(cs.can_implicitly_cast(TypeId::I32, maybe_i32));
    assert!(cs.can_implicitly_cast(ctx.get_lvalue_type(TypeId::I32), maybe_i32));
    assert!(!cs.can_implicitly_cast(TypeId::I64, maybe_i32));
    assert!(!cs.can_implicitly_cast(maybe_i32, TypeId::I32));

    let mut_ref = ctx.get_reference_type(TypeId::I32, true);
    let shared_ref = ctx.get_reference_type(TypeId::I32, false);
    assert!(cs.can_implicitly_cast(mut_ref, shared_ref));
    assert!(!cs.can_implicitly_cast(shared_ref, mut_ref));

    let from = ctx.get_tuple_type(&[TypeId::NULL, mut_ref]);
    let to = ctx.get_tuple_type(&[maybe_i32, shared_ref]);
    assert!(cs.can_implicitly_cast(from, to));

    assert!(cs.can_implicitly_cast(TypeId::ERROR, TypeId::BOOL));
    assert!(cs.can_implicitly_cast(TypeId::BOOL, TypeId::ERROR));
}

#[test]
fn test_can_implicitly_cast_does_not_bind() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let i = cs.create_integer_type_variable();
    assert!(cs.can_implicitly_cast(i, ctx.get_maybe_type(TypeId::U8)));
    assert!(!cs.is_bound(i));
}

#[test]
fn test_implicitly_cast_keeps_element_bindings() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    // (maybe i64, i64) takes each element through its own conversion.
    let a = cs.create_integer_type_variable();
    let b = cs.create_integer_type_variable();
    let from = ctx.get_tuple_type(&[a, b]);
    let to = ctx.get_tuple_type(&[ctx.get_maybe_type(TypeId::I64), TypeId::I64]);
    assert!(cs.implicitly_cast(from, to));
    assert_eq!(cs.resolve(a), TypeId::I64);
    assert_eq!(cs.resolve(b), TypeId::I64);

    let c = cs.create_integer_type_variable();
    let nested = ctx.get_maybe_type(ctx.get_maybe_type(TypeId::U16));
    assert!(cs.implicitly_cast(c, nested));
    assert_eq!(cs.resolve(c), TypeId::U16);

    let p = cs.create_general_type_variable();
    let mut_ref = ctx.get_reference_type(p, true);
    assert!(cs.implicitly_cast(mut_ref, ctx.get_reference_type(TypeId::BOOL, false)));
    assert_eq!(cs.resolve(p), TypeId::BOOL);
}

#[test]
fn test_failed_implicit_cast_binds_nothing() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    // The first element converts before the second one fails.
    let a = cs.create_integer_type_variable();
    let from = ctx.get_tuple_type(&[a, TypeId::BOOL]);
    let to = ctx.get_tuple_type(&[ctx.get_maybe_type(TypeId::I64), TypeId::I64]);
    assert!(!cs.implicitly_cast(from, to));
    assert!(!cs.is_bound(a));

    let b = cs.create_integer_type_variable();
    let from = ctx.get_tuple_type(&[b, b]);
    assert!(cs.can_implicitly_cast(from, ctx.get_tuple_type(&[TypeId::I8, TypeId::I8])));
    assert!(!cs.is_bound(b));
}

#[test]
fn test_can_explicitly_cast() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    assert!(cs.can_explicitly_cast(TypeId::I8, TypeId::F64));
    assert!(cs.can_explicitly_cast(TypeId::F32, TypeId::USIZE));
    assert!(!cs.can_explicitly_cast(TypeId::BOOL, TypeId::I32));
    assert!(cs.can_explicitly_cast(
        ctx.get_maybe_type(TypeId::I8),
        ctx.get_maybe_type(TypeId::U64)
    ));
    assert!(cs.can_explicitly_cast(
        ctx.get_tuple_type(&[TypeId::I8, TypeId::F32]),
        ctx.get_tuple_type(&[TypeId::F64, TypeId::U8])
    ));
    assert!(!cs.can_explicitly_cast(
        ctx.get_reference_type(TypeId::I8, false),
        ctx.get_reference_type(TypeId::U8, false)
    ));
    assert!(!cs.can_explicitly_cast(
        ctx.get_function_type(&[TypeId::I8], TypeId::VOID),
        ctx.get_function_type(&[TypeId::U8], TypeId::VOID)
    ));
    assert!(cs.can_explicitly_cast(
        ctx.get_reference_type(TypeId::I8, true),
        ctx.get_reference_type(TypeId::I8, false)
    ));
    assert!(cs.can_explicitly_cast(TypeId::BOOL, ctx.get_maybe_type(TypeId::BOOL)));
    let empty = ctx.get_empty_tuple_type();
    assert!(cs.can_explicitly_cast(
        ctx.get_reference_type(empty, false),
        ctx.get_reference_type(TypeId::VOID, false)
    ));
}

#[test]
fn test_explicit_cast_of_type_variables() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let i = cs.create_integer_type_variable();
    assert!(cs.can_explicitly_cast(i, TypeId::F32));
    assert!(!cs.is_bound(i));
    assert!(!cs.can_explicitly_cast(i, TypeId::BOOL));
    assert!(!cs.is_bound(i));

    let t = cs.create_general_type_variable();
    assert!(cs.can_explicitly_cast(t, TypeId::BOOL));
    assert_eq!(cs.get_binding(t), Some(TypeId::BOOL));

    let u = cs.create_general_type_variable();
    cs.bind(u, TypeId::I16);
    assert!(cs.can_explicitly_cast(u, TypeId::F64));
}

#[test]
#[should_panic(expected = "an error type cannot be the source of an explicit cast")]
fn test_explicit_cast_from_error_panics() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);
    cs.can_explicitly_cast(TypeId::ERROR, TypeId::I32);
}

#[test]
fn test_print_and_dump() {
    let ctx = AstContext::new();
    let mut cs = ConstraintSystem::new(&ctx);

    let t = cs.create_general_type_variable();
    let i = cs.create_integer_type_variable();
    let u = cs.create_general_type_variable();
    cs.bind(t, TypeId::BOOL);
    let tuple = ctx.get_tuple_type(&[t, i, u]);

    assert_eq!(
        cs.print_type(tuple, &TypePrintOptions::for_debug()),
        "($T0(bool), $I1, $T2)"
    );
    assert_eq!(
        cs.print_type(tuple, &TypePrintOptions::for_diagnostics()),
        "(bool, i32, _)"
    );
    assert_eq!(
        cs.dump_type_variables(),
        "$T0 := bool\n$I1 unbound, defaults to i32\n$T2 unbound\n"
    );
}

#[test]
fn test_region_is_released_on_drop() {
    let ctx = AstContext::new();
    {
        let mut cs = ConstraintSystem::new(&ctx);
        let t = cs.create_general_type_variable();
        ctx.get_maybe_type(t);
        assert!(ctx.is_constraint_system_active());
        assert!(ctx.region_usage(ArenaKind::ConstraintSystem) > 0);
    }
    assert!(!ctx.is_constraint_system_active());
    assert_eq!(ctx.type_count(ArenaKind::ConstraintSystem), 0);

    let cs = ConstraintSystem::new(&ctx);
    assert!(cs.type_variables().is_empty());
}

#[test]
#[should_panic(expected = "a constraint system is already active on this context")]
fn test_nested_constraint_system_panics() {
    let ctx = AstContext::new();
    let _outer = ConstraintSystem::new(&ctx);
    let _inner = ConstraintSystem::new(&ctx);
}

#[test]
#[should_panic(expected = "outlived the constraint system")]
fn test_type_from_dropped_constraint_system_panics() {
    let ctx = AstContext::new();
    let var = {
        let mut cs = ConstraintSystem::new(&ctx);
        cs.create_general_type_variable()
    };
    let _cs = ConstraintSystem::new(&ctx);
    ctx.kind(var);
}
