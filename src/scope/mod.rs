/// Scope module
/// Lexical scopes built lazily over a parsed source file
///
/// Submodules:
/// - scope: The scope map, on-demand expansion and the outward lookup walk
pub mod scope;
