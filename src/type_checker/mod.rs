//! Type checking and semantic analysis module.
//!
//! This module checks a parsed source file on top of the semantic core:
//!
//! - Resolving type annotations through unqualified type lookup
//! - Assigning function, parameter and variable types
//! - Resolving references through unqualified value lookup
//! - Checking each statement inside its own constraint system
//!
//! Errors are accumulated as diagnostics and error types keep one mistake
//! from being reported over and over.

pub mod type_checker;
