use crate::types::{
    printer::TypeVariableBindings,
    types::{TypeId, TypeVariableKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeVariableInfo {
    /// Starts as the creation kind. A general variable bound from a numeric
    /// one is upgraded.
    pub kind: TypeVariableKind,
    pub substitution: Option<TypeId>,
}

/// The state of every variable of one constraint system, indexed by id.
#[derive(Debug, Clone)]
pub struct TypeVariableEnvironment {
    infos: Vec<TypeVariableInfo>,
    int_default: TypeId,
    float_default: TypeId,
}

/// A copy of the bindings and kinds, used to roll back a failed unification.
#[derive(Debug, Clone)]
pub struct Snapshot(Vec<TypeVariableInfo>);

impl TypeVariableEnvironment {
    pub fn new(int_default: TypeId, float_default: TypeId) -> Self {
        TypeVariableEnvironment {
            infos: vec![],
            int_default,
            float_default,
        }
    }

    /// Registers a variable and returns its id.
    pub fn push(&mut self, kind: TypeVariableKind) -> u32 {
        self.infos.push(TypeVariableInfo {
            kind,
            substitution: None,
        });
        self.infos.len() as u32 - 1
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn info(&self, id: u32) -> &TypeVariableInfo {
        &self.infos[id as usize]
    }

    pub fn kind(&self, id: u32) -> TypeVariableKind {
        self.info(id).kind
    }

    pub fn binding(&self, id: u32) -> Option<TypeId> {
        self.info(id).substitution
    }

    pub(crate) fn set_binding(&mut self, id: u32, binding: TypeId) {
        self.infos[id as usize].substitution = Some(binding);
    }

    pub(crate) fn set_kind(&mut self, id: u32, kind: TypeVariableKind) {
        self.infos[id as usize].kind = kind;
    }

    pub fn default_type(&self, kind: TypeVariableKind) -> Option<TypeId> {
        match kind {
            TypeVariableKind::General => None,
            TypeVariableKind::Integer => Some(self.int_default),
            TypeVariableKind::Float => Some(self.float_default),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.infos.clone())
    }

    /// Variables created after the snapshot are kept, unbound.
    pub fn restore(&mut self, snapshot: Snapshot) {
        let Snapshot(infos) = snapshot;
        let count = infos.len();
        for (slot, info) in self.infos.iter_mut().zip(infos) {
            *slot = info;
        }
        for info in self.infos.iter_mut().skip(count) {
            info.substitution = None;
        }
    }
}

impl TypeVariableBindings for TypeVariableEnvironment {
    fn kind_of(&self, id: u32) -> Option<TypeVariableKind> {
        self.infos.get(id as usize).map(|info| info.kind)
    }

    fn binding_of(&self, id: u32) -> Option<TypeId> {
        self.infos.get(id as usize).and_then(|info| info.substitution)
    }

    fn default_for(&self, kind: TypeVariableKind) -> Option<TypeId> {
        self.default_type(kind)
    }
}
