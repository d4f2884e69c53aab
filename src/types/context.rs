use std::{
    cell::{Cell, RefCell},
    mem,
    rc::Rc,
};

use num_bigint::BigUint;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::arena::arena::{Arena, ArenaKind};

use super::{
    printer::{TypePrintOptions, TypePrinter},
    types::{
        CanType, FloatKind, IntegerWidth, TypeId, TypeIdVec, TypeKind, TypeNode, TypeProperties,
        TypeVariableKind,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextOptions {
    /// Width of `isize` and `usize` in bits.
    pub pointer_width: u16,
}

impl Default for ContextOptions {
    fn default() -> Self {
        ContextOptions { pointer_width: 64 }
    }
}

const BUILTIN_NAMES: [(&str, TypeId); 14] = [
    ("i8", TypeId::I8),
    ("i16", TypeId::I16),
    ("i32", TypeId::I32),
    ("i64", TypeId::I64),
    ("isize", TypeId::ISIZE),
    ("u8", TypeId::U8),
    ("u16", TypeId::U16),
    ("u32", TypeId::U32),
    ("u64", TypeId::U64),
    ("usize", TypeId::USIZE),
    ("f32", TypeId::F32),
    ("f64", TypeId::F64),
    ("void", TypeId::VOID),
    ("bool", TypeId::BOOL),
];

#[derive(Debug, Default)]
struct TypePool {
    nodes: Vec<TypeNode>,
    intern_map: FxHashMap<TypeKind, u32>,
}

impl TypePool {
    fn clear(&mut self) {
        self.nodes.clear();
        self.intern_map.clear();
    }
}

/// The interning table for one compilation.
///
/// Interning only ever appends, so every method takes `&self`. Types whose
/// structure mentions a type variable are placed in the constraint-system
/// region, everything else is permanent.
pub struct AstContext {
    options: ContextOptions,
    arena: RefCell<Arena>,
    permanent: RefCell<TypePool>,
    transient: Rc<RefCell<TypePool>>,
}

impl Default for AstContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AstContext {
    pub fn new() -> Self {
        Self::with_options(ContextOptions::default())
    }

    pub fn with_options(options: ContextOptions) -> Self {
        let ctx = AstContext {
            options,
            arena: RefCell::new(Arena::new()),
            permanent: RefCell::new(TypePool::default()),
            transient: Rc::new(RefCell::new(TypePool::default())),
        };

        let integer = |bits: u16, signed: bool| TypeKind::Integer {
            width: IntegerWidth::Fixed(bits),
            signed,
        };
        let builtins = [
            (TypeId::I8, integer(8, true)),
            (TypeId::I16, integer(16, true)),
            (TypeId::I32, integer(32, true)),
            (TypeId::I64, integer(64, true)),
            (
                TypeId::ISIZE,
                TypeKind::Integer {
                    width: IntegerWidth::Pointer,
                    signed: true,
                },
            ),
            (TypeId::U8, integer(8, false)),
            (TypeId::U16, integer(16, false)),
            (TypeId::U32, integer(32, false)),
            (TypeId::U64, integer(64, false)),
            (
                TypeId::USIZE,
                TypeKind::Integer {
                    width: IntegerWidth::Pointer,
                    signed: false,
                },
            ),
            (TypeId::F32, TypeKind::Float(FloatKind::IEEE32)),
            (TypeId::F64, TypeKind::Float(FloatKind::IEEE64)),
            (TypeId::VOID, TypeKind::Void),
            (TypeId::BOOL, TypeKind::Bool),
            (TypeId::NULL, TypeKind::Null),
            (TypeId::ERROR, TypeKind::Error),
        ];
        for (expected, kind) in builtins {
            let id = ctx.intern(kind);
            debug_assert_eq!(id, expected);
        }
        debug_assert_eq!(ctx.type_count(ArenaKind::Permanent) as u32, TypeId::FIRST_DYNAMIC);

        ctx
    }

    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    //===- Regions ----------------------------------------------------------===//

    pub fn region_usage(&self, kind: ArenaKind) -> usize {
        self.arena.borrow().region_usage(kind)
    }

    pub fn arena_dump(&self) -> String {
        self.arena.borrow().dump()
    }

    pub fn is_constraint_system_active(&self) -> bool {
        self.arena.borrow().is_active(ArenaKind::ConstraintSystem)
    }

    /// Number of types currently interned in `kind`.
    pub fn type_count(&self, kind: ArenaKind) -> usize {
        match kind {
            ArenaKind::Permanent => self.permanent.borrow().nodes.len(),
            ArenaKind::ConstraintSystem => self.transient.borrow().nodes.len(),
        }
    }

    pub(crate) fn begin_constraint_system_region(&self) -> u32 {
        let mut arena = self.arena.borrow_mut();
        let epoch = arena.begin_region(ArenaKind::ConstraintSystem);
        let transient = Rc::clone(&self.transient);
        arena.add_finalizer(ArenaKind::ConstraintSystem, move || transient.borrow_mut().clear());
        epoch
    }

    pub(crate) fn end_constraint_system_region(&self) {
        self.arena
            .borrow_mut()
            .end_region(ArenaKind::ConstraintSystem);
    }

    //===- Interning --------------------------------------------------------===//

    fn pool(&self, region: ArenaKind) -> &RefCell<TypePool> {
        match region {
            ArenaKind::Permanent => &self.permanent,
            ArenaKind::ConstraintSystem => &self.transient,
        }
    }

    fn with_node<R>(&self, ty: TypeId, f: impl FnOnce(&TypeNode) -> R) -> R {
        if !ty.is_permanent() {
            let arena = self.arena.borrow();
            assert!(
                arena.is_active(ArenaKind::ConstraintSystem)
                    && arena.epoch(ArenaKind::ConstraintSystem) == ty.epoch,
                "type #{} outlived the constraint system that created it",
                ty.index
            );
        }
        let pool = self.pool(ty.region()).borrow();
        f(&pool.nodes[ty.index as usize])
    }

    fn compute_properties(&self, kind: &TypeKind) -> (TypeProperties, bool) {
        match kind {
            TypeKind::Null => (TypeProperties::HAS_NULL_TYPE, true),
            TypeKind::Error => (TypeProperties::HAS_ERROR_TYPE, true),
            TypeKind::TypeVariable { .. } => (TypeProperties::HAS_TYPE_VARIABLE, true),
            _ if kind.is_leaf() => (TypeProperties::NONE, true),
            _ => {
                let mut properties = TypeProperties::NONE;
                let mut is_canonical = true;
                for child in kind.children() {
                    let (child_properties, child_canonical) =
                        self.with_node(child, |node| (node.properties, node.is_canonical));
                    properties |= child_properties;
                    is_canonical &= child_canonical;
                }
                match kind {
                    TypeKind::LValue(_) => properties |= TypeProperties::HAS_LVALUE,
                    // `()` is spelled differently but canonicalizes to `void`.
                    TypeKind::Tuple(elements) if elements.is_empty() => is_canonical = false,
                    _ => {}
                }
                (properties, is_canonical)
            }
        }
    }

    /// Returns the unique type with this structure, allocating it on first use.
    pub fn intern(&self, kind: TypeKind) -> TypeId {
        debug_assert!(
            !matches!(&kind, TypeKind::Tuple(elements) if elements.len() == 1),
            "single-element tuples collapse to their element"
        );
        let (properties, is_canonical) = self.compute_properties(&kind);
        let region = if properties.contains(TypeProperties::HAS_TYPE_VARIABLE) {
            ArenaKind::ConstraintSystem
        } else {
            ArenaKind::Permanent
        };
        assert!(
            region == ArenaKind::Permanent || self.is_constraint_system_active(),
            "types mentioning type variables require an active constraint system"
        );

        let pool = self.pool(region);
        let epoch = self.arena.borrow().epoch(region);
        if let Some(index) = pool.borrow().intern_map.get(&kind).copied() {
            return TypeId { index, epoch };
        }

        let size = mem::size_of::<TypeNode>() + kind.children().len() * mem::size_of::<TypeId>();
        let allocation = self
            .arena
            .borrow_mut()
            .allocate(size, mem::align_of::<TypeNode>(), region);

        let mut pool = pool.borrow_mut();
        let index = pool.nodes.len() as u32;
        trace!(?kind, index, region = %region, "interned type");
        pool.intern_map.insert(kind.clone(), index);
        pool.nodes.push(TypeNode {
            kind,
            properties,
            is_canonical,
            canonical: Cell::new(None),
        });

        TypeId {
            index,
            epoch: allocation.epoch,
        }
    }

    pub fn kind(&self, ty: TypeId) -> TypeKind {
        self.with_node(ty, |node| node.kind.clone())
    }

    pub fn properties(&self, ty: TypeId) -> TypeProperties {
        self.with_node(ty, |node| node.properties)
    }

    pub fn has_error_type(&self, ty: TypeId) -> bool {
        self.properties(ty).contains(TypeProperties::HAS_ERROR_TYPE)
    }

    pub fn has_type_variable(&self, ty: TypeId) -> bool {
        self.properties(ty).contains(TypeProperties::HAS_TYPE_VARIABLE)
    }

    pub fn has_null_type(&self, ty: TypeId) -> bool {
        self.properties(ty).contains(TypeProperties::HAS_NULL_TYPE)
    }

    pub fn has_lvalue(&self, ty: TypeId) -> bool {
        self.properties(ty).contains(TypeProperties::HAS_LVALUE)
    }

    //===- Constructors -----------------------------------------------------===//

    pub fn get_integer_type(&self, width: IntegerWidth, signed: bool) -> TypeId {
        self.intern(TypeKind::Integer { width, signed })
    }

    pub fn get_float_type(&self, kind: FloatKind) -> TypeId {
        self.intern(TypeKind::Float(kind))
    }

    pub fn get_reference_type(&self, pointee: TypeId, is_mut: bool) -> TypeId {
        self.intern(TypeKind::Reference { pointee, is_mut })
    }

    pub fn get_maybe_type(&self, inner: TypeId) -> TypeId {
        self.intern(TypeKind::Maybe(inner))
    }

    /// A single element yields the element itself.
    pub fn get_tuple_type(&self, elements: &[TypeId]) -> TypeId {
        if let [element] = elements {
            return *element;
        }
        self.intern(TypeKind::Tuple(SmallVec::from_slice(elements)))
    }

    pub fn get_empty_tuple_type(&self) -> TypeId {
        self.get_tuple_type(&[])
    }

    pub fn get_function_type(&self, params: &[TypeId], ret: TypeId) -> TypeId {
        self.intern(TypeKind::Function {
            params: SmallVec::from_slice(params),
            ret,
        })
    }

    pub fn get_lvalue_type(&self, object: TypeId) -> TypeId {
        self.intern(TypeKind::LValue(object))
    }

    pub(crate) fn get_type_variable(&self, id: u32, kind: TypeVariableKind) -> TypeId {
        self.intern(TypeKind::TypeVariable { id, kind })
    }

    pub fn lookup_builtin_type(&self, name: &str) -> Option<TypeId> {
        BUILTIN_NAMES
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(_, ty)| *ty)
    }

    pub fn builtin_type_names(&self) -> impl Iterator<Item = &'static str> {
        BUILTIN_NAMES.iter().map(|(name, _)| *name)
    }

    //===- Canonical types --------------------------------------------------===//

    pub fn is_canonical(&self, ty: TypeId) -> bool {
        self.with_node(ty, |node| node.is_canonical)
    }

    pub fn get_canonical_type(&self, ty: TypeId) -> CanType {
        let (is_canonical, cached) =
            self.with_node(ty, |node| (node.is_canonical, node.canonical.get()));
        if is_canonical {
            return CanType(ty);
        }
        if let Some(cached) = cached {
            return CanType(cached);
        }

        let canonical = |child: TypeId| self.get_canonical_type(child).id();
        let result = match self.kind(ty) {
            TypeKind::Reference { pointee, is_mut } => {
                self.get_reference_type(canonical(pointee), is_mut)
            }
            TypeKind::Maybe(inner) => self.get_maybe_type(canonical(inner)),
            TypeKind::Tuple(elements) if elements.is_empty() => TypeId::VOID,
            TypeKind::Tuple(elements) => {
                let elements: TypeIdVec = elements.iter().map(|e| canonical(*e)).collect();
                self.get_tuple_type(&elements)
            }
            TypeKind::Function { params, ret } => {
                let params: TypeIdVec = params.iter().map(|p| canonical(*p)).collect();
                self.get_function_type(&params, canonical(ret))
            }
            TypeKind::LValue(object) => self.get_lvalue_type(canonical(object)),
            kind => unreachable!("{:?} is always canonical", kind),
        };

        debug_assert!(self.is_canonical(result), "canonical form is not canonical");
        self.with_node(ty, |node| node.canonical.set(Some(result)));
        CanType(result)
    }

    /// Kind of the canonical form of `ty`.
    pub fn canonical_kind(&self, ty: TypeId) -> TypeKind {
        self.kind(self.get_canonical_type(ty).id())
    }

    pub fn are_canonically_equal(&self, lhs: TypeId, rhs: TypeId) -> bool {
        self.get_canonical_type(lhs) == self.get_canonical_type(rhs)
    }

    //===- Rebuilding -------------------------------------------------------===//

    /// Rebuilds `ty` bottom-up. `rebuilder` is offered every node after its
    /// children were rebuilt and may return a replacement, which is not
    /// revisited. Only the nodes on changed paths are re-interned.
    pub fn rebuild_type(
        &self,
        ty: TypeId,
        rebuilder: &mut dyn FnMut(TypeId) -> Option<TypeId>,
    ) -> TypeId {
        self.rebuild_impl(ty, rebuilder).unwrap_or(ty)
    }

    /// `None` means "unchanged".
    fn rebuild_impl(
        &self,
        ty: TypeId,
        rebuilder: &mut dyn FnMut(TypeId) -> Option<TypeId>,
    ) -> Option<TypeId> {
        match self.rebuild_children(ty, rebuilder) {
            Some(visited) => Some(rebuilder(visited).unwrap_or(visited)),
            None => rebuilder(ty),
        }
    }

    fn rebuild_children(
        &self,
        ty: TypeId,
        rebuilder: &mut dyn FnMut(TypeId) -> Option<TypeId>,
    ) -> Option<TypeId> {
        match self.kind(ty) {
            TypeKind::Reference { pointee, is_mut } => self
                .rebuild_impl(pointee, rebuilder)
                .map(|pointee| self.get_reference_type(pointee, is_mut)),
            TypeKind::Maybe(inner) => self
                .rebuild_impl(inner, rebuilder)
                .map(|inner| self.get_maybe_type(inner)),
            TypeKind::LValue(object) => self
                .rebuild_impl(object, rebuilder)
                .map(|object| self.get_lvalue_type(object)),
            TypeKind::Tuple(elements) => {
                let (elements, changed) = self.rebuild_list(&elements, rebuilder);
                changed.then(|| self.get_tuple_type(&elements))
            }
            TypeKind::Function { params, ret } => {
                let (params, params_changed) = self.rebuild_list(&params, rebuilder);
                let new_ret = self.rebuild_impl(ret, rebuilder);
                (params_changed || new_ret.is_some())
                    .then(|| self.get_function_type(&params, new_ret.unwrap_or(ret)))
            }
            _ => None,
        }
    }

    fn rebuild_list(
        &self,
        types: &[TypeId],
        rebuilder: &mut dyn FnMut(TypeId) -> Option<TypeId>,
    ) -> (TypeIdVec, bool) {
        let mut changed = false;
        let mut rebuilt = TypeIdVec::with_capacity(types.len());
        for ty in types {
            match self.rebuild_impl(*ty, rebuilder) {
                Some(new_ty) => {
                    changed = true;
                    rebuilt.push(new_ty);
                }
                None => rebuilt.push(*ty),
            }
        }
        (rebuilt, changed)
    }

    pub fn rebuild_type_without_lvalues(&self, ty: TypeId) -> TypeId {
        if !self.has_lvalue(ty) {
            return ty;
        }
        self.rebuild_type(ty, &mut |ty| match self.kind(ty) {
            TypeKind::LValue(object) => Some(object),
            _ => None,
        })
    }

    /// Strips every outer `@lvalue`.
    pub fn get_rvalue_type(&self, ty: TypeId) -> TypeId {
        let mut ty = ty;
        while let TypeKind::LValue(object) = self.kind(ty) {
            ty = object;
        }
        ty
    }

    /// `&mut T` becomes `&T`; anything else is returned as is.
    pub fn without_mut(&self, ty: TypeId) -> TypeId {
        match self.kind(ty) {
            TypeKind::Reference {
                pointee,
                is_mut: true,
            } => self.get_reference_type(pointee, false),
            _ => ty,
        }
    }

    pub fn get_maybe_value_type(&self, ty: TypeId) -> Option<TypeId> {
        match self.kind(ty) {
            TypeKind::Maybe(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn tuple_elements(&self, ty: TypeId) -> Option<TypeIdVec> {
        match self.kind(ty) {
            TypeKind::Tuple(elements) => Some(elements),
            _ => None,
        }
    }

    /// Resolves a positional tuple field such as `t.1` to an element index.
    pub fn lookup_tuple_member(&self, tuple: TypeId, name: &str) -> Option<usize> {
        let count = self.tuple_elements(tuple)?.len();
        // BigUint would also accept a sign or digit separators.
        if name.is_empty() || !name.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        let value = BigUint::parse_bytes(name.as_bytes(), 10)?;
        if value >= BigUint::from(count) {
            return None;
        }
        usize::try_from(&value).ok()
    }

    /// Bit width and signedness of an integer type.
    pub fn integer_info(&self, ty: TypeId) -> Option<(u16, bool)> {
        match self.canonical_kind(ty) {
            TypeKind::Integer { width, signed } => {
                Some((width.bits(self.options.pointer_width), signed))
            }
            _ => None,
        }
    }

    //===- Predicates -------------------------------------------------------===//

    pub fn is_void_type(&self, ty: TypeId) -> bool {
        matches!(self.canonical_kind(ty), TypeKind::Void)
    }

    pub fn is_bool_type(&self, ty: TypeId) -> bool {
        matches!(self.canonical_kind(ty), TypeKind::Bool)
    }

    pub fn is_null_type(&self, ty: TypeId) -> bool {
        matches!(self.canonical_kind(ty), TypeKind::Null)
    }

    pub fn is_error_type(&self, ty: TypeId) -> bool {
        matches!(self.canonical_kind(ty), TypeKind::Error)
    }

    pub fn is_any_integer_type(&self, ty: TypeId) -> bool {
        matches!(self.canonical_kind(ty), TypeKind::Integer { .. })
    }

    pub fn is_any_float_type(&self, ty: TypeId) -> bool {
        matches!(self.canonical_kind(ty), TypeKind::Float(_))
    }

    pub fn is_reference_type(&self, ty: TypeId) -> bool {
        matches!(self.canonical_kind(ty), TypeKind::Reference { .. })
    }

    pub fn is_maybe_type(&self, ty: TypeId) -> bool {
        matches!(self.canonical_kind(ty), TypeKind::Maybe(_))
    }

    pub fn is_tuple_type(&self, ty: TypeId) -> bool {
        matches!(self.canonical_kind(ty), TypeKind::Tuple(_))
    }

    pub fn is_function_type(&self, ty: TypeId) -> bool {
        matches!(self.canonical_kind(ty), TypeKind::Function { .. })
    }

    pub fn is_lvalue_type(&self, ty: TypeId) -> bool {
        matches!(self.canonical_kind(ty), TypeKind::LValue(_))
    }

    pub fn is_type_variable(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::TypeVariable { .. })
    }

    //===- Printing ---------------------------------------------------------===//

    pub fn print_type(&self, ty: impl Into<Option<TypeId>>, options: &TypePrintOptions) -> String {
        TypePrinter::new(self, options, None).print(ty.into())
    }
}

impl std::fmt::Debug for AstContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstContext")
            .field("options", &self.options)
            .field("permanent_types", &self.type_count(ArenaKind::Permanent))
            .field("transient_types", &self.type_count(ArenaKind::ConstraintSystem))
            .finish()
    }
}
