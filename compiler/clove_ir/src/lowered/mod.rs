//! Lowered, layout-level program representation.
//!
//! One [`LoweredUnit`] per compilation unit. Each class becomes a
//! [`ClassLayout`]: explicit data members, an explicit vtable with its
//! initializer, a raw default constructor, `__init` routines for two-phase
//! construction, and methods whose bodies live in the unit's [`LowArena`].

mod arena;
mod expr;

use std::path::PathBuf;

pub use arena::LowArena;
pub use expr::{CheckKind, LowExpr, LowNode, LowStmt};

use crate::{LowId, LowStmtId, Name, Ty};

#[derive(Clone, Debug)]
pub struct LoweredUnit {
    pub path: PathBuf,
    pub package: Vec<Name>,
    /// Units this one imports, as written in the source.
    pub imports: Vec<PathBuf>,
    pub classes: Vec<ClassLayout>,
    pub arena: LowArena,
}

impl LoweredUnit {
    pub fn class(&self, name: Name) -> Option<&ClassLayout> {
        self.classes.iter().find(|c| c.name == name)
    }
}

#[derive(Clone, Debug)]
pub struct ClassLayout {
    pub name: Name,
    pub parent: Name,
    pub identity: TypeIdentity,
    /// Instance data, vtable pointer first.
    pub data: Vec<DataMember>,
    /// Out-of-line storage for static fields.
    pub statics: Vec<StaticStorage>,
    pub vtable: VtableLayout,
    pub vtable_init: VtableInit,
    pub default_ctor: DefaultCtor,
    /// One per user constructor, or a single synthesized one.
    pub init_routines: Vec<LoweredMethod>,
    pub methods: Vec<LoweredMethod>,
}

impl ClassLayout {
    /// Instance fields in layout order, without the vtable pointer.
    pub fn fields(&self) -> impl Iterator<Item = (Name, &Ty)> {
        self.data.iter().filter_map(|member| match member {
            DataMember::Field { name, ty, .. } => Some((*name, ty)),
            DataMember::VtablePtr => None,
        })
    }

    pub fn method(&self, name: Name) -> Option<&LoweredMethod> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Per-class runtime identity: qualified name plus the parent's identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeIdentity {
    pub class: Name,
    /// `package.Class`, or just `Class` in the default package.
    pub qualified: Name,
    pub parent: Name,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataMember {
    VtablePtr,
    Field { name: Name, ty: Ty, owner: Name },
}

#[derive(Clone, Debug, PartialEq)]
pub struct StaticStorage {
    pub name: Name,
    pub ty: Ty,
    pub init: LowId,
}

/// Method slot of a vtable. The identity slot `__is_a` is implicit and
/// always precedes these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VtableSlot {
    /// Name given by the class that introduced the slot.
    pub name: Name,
    pub source: Name,
    pub params: Vec<Ty>,
    pub ret: Ty,
    /// Introducing class; also the slot's receiver type.
    pub declared_in: Name,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VtableLayout {
    pub slots: Vec<VtableSlot>,
}

impl VtableLayout {
    /// Slot count including the identity slot.
    pub fn len(&self) -> usize {
        self.slots.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn slot(&self, name: Name) -> Option<&VtableSlot> {
        self.slots.iter().find(|s| s.name == name)
    }
}

/// Implementation bound to one vtable slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotBinding {
    pub slot: Name,
    /// Nearest ancestor-or-self defining the method.
    pub owner: Name,
    pub impl_name: Name,
    /// The owner differs from the slot's declaring class, so the function
    /// pointer needs a receiver cast.
    pub needs_cast: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VtableInit {
    pub bindings: Vec<SlotBinding>,
}

impl VtableInit {
    pub fn binding(&self, slot: Name) -> Option<&SlotBinding> {
        self.bindings.iter().find(|b| b.slot == slot)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberInit {
    Field { field: Name, value: LowId },
    VtablePtr,
}

/// Raw constructor run by `new __Class()`: default literals and the vtable
/// pointer, nothing else.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefaultCtor {
    pub members: Vec<MemberInit>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Instance,
    Static,
    Init,
    Entry,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LowParam {
    pub name: Name,
    pub ty: Ty,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoweredMethod {
    /// Mangled name, `__init`, or `main`.
    pub name: Name,
    pub source: Name,
    pub owner: Name,
    pub kind: MethodKind,
    /// Instance and init routines take the receiver first.
    pub params: Vec<LowParam>,
    pub ret: Ty,
    pub body: LowStmtId,
    pub synthesized: bool,
}
