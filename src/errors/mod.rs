//! Error types and error handling for the front end.
//!
//! This module defines the diagnostics produced while lexing, parsing and
//! checking a source file. It includes:
//!
//! - Error structures with source position information
//! - Specific error variants for lexing, lookup and typing failures
//! - Short tips shown next to the error name when rendered

pub mod errors;
