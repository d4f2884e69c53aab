/// Name lookup module
/// Unqualified value and type lookup on top of the scope tree
///
/// Submodules:
/// - name_lookup: `UnqualifiedValueLookup` and `UnqualifiedTypeLookup`
pub mod name_lookup;

#[cfg(test)]
mod tests;
