use std::{
    cell::Cell,
    fmt::Display,
    ops::{BitOr, BitOrAssign},
};

use smallvec::SmallVec;

use crate::arena::arena::ArenaKind;

pub type TypeIdVec = SmallVec<[TypeId; 4]>;

/// Handle to an interned type. Epoch 0 is the permanent region; any other
/// epoch names the constraint-system region the type was created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId {
    pub(crate) index: u32,
    pub(crate) epoch: u32,
}

impl TypeId {
    const fn reserved(index: u32) -> TypeId {
        TypeId { index, epoch: 0 }
    }

    // Builtins are pre-interned in this order by `AstContext::new`.
    pub const I8: TypeId = TypeId::reserved(0);
    pub const I16: TypeId = TypeId::reserved(1);
    pub const I32: TypeId = TypeId::reserved(2);
    pub const I64: TypeId = TypeId::reserved(3);
    pub const ISIZE: TypeId = TypeId::reserved(4);
    pub const U8: TypeId = TypeId::reserved(5);
    pub const U16: TypeId = TypeId::reserved(6);
    pub const U32: TypeId = TypeId::reserved(7);
    pub const U64: TypeId = TypeId::reserved(8);
    pub const USIZE: TypeId = TypeId::reserved(9);
    pub const F32: TypeId = TypeId::reserved(10);
    pub const F64: TypeId = TypeId::reserved(11);
    pub const VOID: TypeId = TypeId::reserved(12);
    pub const BOOL: TypeId = TypeId::reserved(13);
    pub const NULL: TypeId = TypeId::reserved(14);
    pub const ERROR: TypeId = TypeId::reserved(15);

    /// First index available to non-builtin permanent types.
    pub const FIRST_DYNAMIC: u32 = 16;

    pub fn is_builtin(self) -> bool {
        self.epoch == 0 && self.index < Self::FIRST_DYNAMIC
    }

    pub fn region(self) -> ArenaKind {
        if self.epoch == 0 {
            ArenaKind::Permanent
        } else {
            ArenaKind::ConstraintSystem
        }
    }

    pub fn is_permanent(self) -> bool {
        self.epoch == 0
    }
}

/// A type known to be in canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanType(pub(crate) TypeId);

impl CanType {
    pub fn id(self) -> TypeId {
        self.0
    }
}

impl From<CanType> for TypeId {
    fn from(value: CanType) -> Self {
        value.0
    }
}

impl PartialEq<TypeId> for CanType {
    fn eq(&self, other: &TypeId) -> bool {
        self.0 == *other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerWidth {
    Fixed(u16),
    /// `isize`/`usize`
    Pointer,
}

impl IntegerWidth {
    pub fn bits(self, pointer_width: u16) -> u16 {
        match self {
            IntegerWidth::Fixed(bits) => bits,
            IntegerWidth::Pointer => pointer_width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    IEEE32,
    IEEE64,
}

impl FloatKind {
    pub fn width(self) -> u16 {
        match self {
            FloatKind::IEEE32 => 32,
            FloatKind::IEEE64 => 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeVariableKind {
    /// Can be bound to anything.
    General,
    /// Integer types, or other integer/general variables.
    Integer,
    /// Float types, or other float/general variables.
    Float,
}

impl TypeVariableKind {
    pub fn letter(self) -> char {
        match self {
            TypeVariableKind::General => 'T',
            TypeVariableKind::Integer => 'I',
            TypeVariableKind::Float => 'F',
        }
    }
}

impl Display for TypeVariableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeVariableKind::General => write!(f, "general"),
            TypeVariableKind::Integer => write!(f, "integer"),
            TypeVariableKind::Float => write!(f, "float"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Integer { width: IntegerWidth, signed: bool },
    Float(FloatKind),
    Void,
    Bool,
    /// The type of the `null` literal.
    Null,
    Error,
    Reference { pointee: TypeId, is_mut: bool },
    Maybe(TypeId),
    /// Never exactly one element.
    Tuple(TypeIdVec),
    Function { params: TypeIdVec, ret: TypeId },
    LValue(TypeId),
    /// `kind` is the kind at creation; the constraint system tracks upgrades.
    TypeVariable { id: u32, kind: TypeVariableKind },
}

impl TypeKind {
    /// Builtins, errors and type variables have no children and are always canonical.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            TypeKind::Integer { .. }
                | TypeKind::Float(_)
                | TypeKind::Void
                | TypeKind::Bool
                | TypeKind::Null
                | TypeKind::Error
                | TypeKind::TypeVariable { .. }
        )
    }

    pub fn children(&self) -> TypeIdVec {
        match self {
            TypeKind::Reference { pointee, .. } => SmallVec::from_slice(&[*pointee]),
            TypeKind::Maybe(inner) | TypeKind::LValue(inner) => SmallVec::from_slice(&[*inner]),
            TypeKind::Tuple(elements) => elements.clone(),
            TypeKind::Function { params, ret } => {
                let mut children = params.clone();
                children.push(*ret);
                children
            }
            _ => SmallVec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeProperties(u8);

impl TypeProperties {
    pub const NONE: TypeProperties = TypeProperties(0);
    pub const HAS_ERROR_TYPE: TypeProperties = TypeProperties(0x01);
    pub const HAS_TYPE_VARIABLE: TypeProperties = TypeProperties(0x02);
    pub const HAS_NULL_TYPE: TypeProperties = TypeProperties(0x04);
    pub const HAS_LVALUE: TypeProperties = TypeProperties(0x08);

    pub fn contains(self, other: TypeProperties) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TypeProperties {
    type Output = TypeProperties;

    fn bitor(self, rhs: Self) -> Self::Output {
        TypeProperties(self.0 | rhs.0)
    }
}

impl BitOrAssign for TypeProperties {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// An interned type and the facts computed about it at interning time.
#[derive(Debug)]
pub(crate) struct TypeNode {
    pub(crate) kind: TypeKind,
    pub(crate) properties: TypeProperties,
    pub(crate) is_canonical: bool,
    /// Memoized canonical form of a non-canonical type.
    pub(crate) canonical: Cell<Option<TypeId>>,
}
