use rustc_hash::FxHashSet;
use tracing::debug;

use crate::{
    ast::ast::{DeclId, SourceFile},
    types::{context::AstContext, types::TypeId},
};

/// Finds the value declarations visible from a location.
///
/// One object performs one lookup. Declarations added with `ignore` are
/// never returned, and a scope whose only matches are ignored does not stop
/// the walk.
pub struct UnqualifiedValueLookup<'a> {
    file: &'a SourceFile,
    ignored: FxHashSet<DeclId>,
    results: Vec<DeclId>,
    performed: bool,
}

impl<'a> UnqualifiedValueLookup<'a> {
    pub fn new(file: &'a SourceFile) -> Self {
        UnqualifiedValueLookup {
            file,
            ignored: FxHashSet::default(),
            results: vec![],
            performed: false,
        }
    }

    pub fn ignore(&mut self, decl: DeclId) -> &mut Self {
        self.ignored.insert(decl);
        self
    }

    /// With an identifier, stops at the innermost scope declaring it. Without
    /// one, collects every visible declaration.
    pub fn perform_lookup(&mut self, loc: u32, identifier: Option<&str>) -> &mut Self {
        assert!(
            !self.performed,
            "consecutive lookups using the same object aren't supported"
        );
        debug_assert!(
            self.file.span.contains(loc) || loc == self.file.span.end.0,
            "location {} is outside of {}",
            loc,
            self.file.name
        );
        self.performed = true;

        let start = self.file.find_innermost_scope(loc);
        let ignored = &self.ignored;
        let results = &mut self.results;
        self.file.lookup(start, identifier, &mut |candidates, _| {
            let before = results.len();
            results.extend(candidates.iter().filter(|decl| !ignored.contains(*decl)));
            results.len() > before && identifier.is_some()
        });

        debug!(
            identifier = identifier.unwrap_or("<any>"),
            loc,
            results = self.results.len(),
            "unqualified value lookup"
        );
        self
    }

    pub fn filter_results(&mut self, mut predicate: impl FnMut(DeclId) -> bool) -> &mut Self {
        self.results.retain(|decl| predicate(*decl));
        self
    }

    pub fn results(&self) -> &[DeclId] {
        &self.results
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn is_result_unique(&self) -> bool {
        self.results.len() == 1
    }

    /// `None` when nothing or more than one declaration was found.
    pub fn get_unique_result(&self) -> Option<DeclId> {
        match self.results.as_slice() {
            [decl] => Some(*decl),
            _ => None,
        }
    }
}

/// Finds the types visible by name. Only builtin types can be named.
pub struct UnqualifiedTypeLookup<'a> {
    ctx: &'a AstContext,
    results: Vec<TypeId>,
    performed: bool,
}

impl<'a> UnqualifiedTypeLookup<'a> {
    pub fn new(ctx: &'a AstContext) -> Self {
        UnqualifiedTypeLookup {
            ctx,
            results: vec![],
            performed: false,
        }
    }

    pub fn perform_lookup(&mut self, identifier: Option<&str>) -> &mut Self {
        assert!(
            !self.performed,
            "consecutive lookups using the same object aren't supported"
        );
        self.performed = true;

        match identifier {
            Some(identifier) => self.results.extend(self.ctx.lookup_builtin_type(identifier)),
            None => {
                let ctx = self.ctx;
                self.results.extend(
                    ctx.builtin_type_names()
                        .filter_map(|name| ctx.lookup_builtin_type(name)),
                );
            }
        }
        self
    }

    pub fn results(&self) -> &[TypeId] {
        &self.results
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn is_result_unique(&self) -> bool {
        self.results.len() == 1
    }

    pub fn get_unique_result(&self) -> Option<TypeId> {
        match self.results.as_slice() {
            [ty] => Some(*ty),
            _ => None,
        }
    }
}
