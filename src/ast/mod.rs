/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Node ids, the per-file node pools and the source file
/// - declarations: Function, parameter, variable and let declarations
/// - expressions: Definitions for the expression forms
/// - patterns: Patterns introduced by let declarations
/// - statements: Definitions for the statement forms
/// - types: Type annotations as written in the source
pub mod ast;
pub mod declarations;
pub mod expressions;
pub mod patterns;
pub mod statements;
pub mod types;

#[cfg(test)]
mod tests;
