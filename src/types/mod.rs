//! Semantic types.
//!
//! This module holds the type representation shared by every pass:
//!
//! - `types`: `TypeId` handles, the closed set of type kinds and their properties
//! - `context`: the `AstContext` interning table with canonicalization,
//!   rebuilding, predicates and tuple member lookup
//! - `printer`: rendering types to text under `TypePrintOptions`
//!
//! Types are interned: two structurally identical types always share one id,
//! so comparing ids compares types. Types mentioning type variables live in
//! the constraint-system region and die with it.

pub mod context;
pub mod printer;
pub mod types;
