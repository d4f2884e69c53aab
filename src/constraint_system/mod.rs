//! Type inference.
//!
//! A `ConstraintSystem` owns the type variables created while checking one
//! statement or declaration. It unifies types by binding those variables,
//! answers cast legality questions and finally simplifies inferred types
//! back into permanent, variable-free types.
//!
//! - `type_variables`: per-variable state and the defaults for numeric kinds
//! - `constraint_system`: creation, binding, unification and simplification
//! - `casts`: implicit and explicit conversion rules

pub mod casts;
pub mod constraint_system;
pub mod type_variables;

#[cfg(test)]
mod tests;
