//! Region-based allocation bookkeeping.
//!
//! Every interned entity is owned by one region of the [`arena::Arena`]:
//!
//! - `Permanent` lives as long as the context that owns the arena
//! - `ConstraintSystem` lives while one constraint system is active
//!
//! Regions are never freed piecemeal. Ending a region runs its registered
//! finalizers and invalidates everything allocated in it by bumping the
//! region's epoch.

pub mod arena;
