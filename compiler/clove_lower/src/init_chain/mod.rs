//! Initializer chain resolution.
//!
//! For every class, the ordered list of instance-field initializers an
//! object of that class carries: the root's first, each descendant's after,
//! with a descendant's `(name, type)` entry replacing its ancestor's in place.
//! Statics are never inherited and are kept per class.

use clove_ir::{ExprId, Name, Ty};
use clove_types::ClassTable;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::LowerError;

/// Zero value a field holds before any initializer runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DefaultLiteral {
    Int,
    Float,
    Bool,
    Char,
    Null,
}

impl DefaultLiteral {
    pub fn for_type(ty: &Ty) -> Self {
        match ty {
            Ty::Boolean => DefaultLiteral::Bool,
            Ty::Char => DefaultLiteral::Char,
            Ty::Float | Ty::Double => DefaultLiteral::Float,
            Ty::Byte | Ty::Short | Ty::Int | Ty::Long => DefaultLiteral::Int,
            Ty::Void | Ty::Class(_) | Ty::Array(_) | Ty::Null => DefaultLiteral::Null,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Initializer {
    pub name: Name,
    /// Declared type of the field.
    pub ty: Ty,
    /// Declaring class; `value` lives in that class's unit.
    pub owner: Name,
    pub default: DefaultLiteral,
    /// Explicit initializer, or `ExprId::INVALID`.
    pub value: ExprId,
    pub is_static: bool,
}

impl Initializer {
    pub fn has_value(&self) -> bool {
        self.value.is_valid()
    }

    /// Override identity: same name and same declared type.
    pub fn same_slot(&self, other: &Initializer) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

/// Resolved chains for a whole program.
#[derive(Clone, Debug, Default)]
pub struct InitializerChain {
    instance: FxHashMap<Name, Vec<Initializer>>,
    statics: FxHashMap<Name, Vec<Initializer>>,
}

impl InitializerChain {
    /// Ancestor-first instance initializers of `class`.
    pub fn instance(&self, class: Name) -> Option<&[Initializer]> {
        self.instance.get(&class).map(Vec::as_slice)
    }

    /// The class's own static initializers, in declaration order.
    pub fn statics(&self, class: Name) -> &[Initializer] {
        self.statics.get(&class).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.instance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instance.is_empty()
    }
}

/// Parent per class. The root maps to `Name::EMPTY`.
pub type ParentMap = FxHashMap<Name, Name>;

/// Declared initializers per class, statics included.
pub type RawInitializers = FxHashMap<Name, Vec<Initializer>>;

/// Gather the parent map and raw initializer lists from the class table.
pub fn collect(table: &ClassTable) -> (ParentMap, RawInitializers) {
    let mut parents = ParentMap::default();
    let mut raw = RawInitializers::default();
    for info in table.classes() {
        parents.insert(info.name, info.parent);
        if info.fields.is_empty() {
            continue;
        }
        let inits = info
            .fields
            .iter()
            .map(|field| Initializer {
                name: field.name,
                ty: field.ty.clone(),
                owner: info.name,
                default: DefaultLiteral::for_type(&field.ty),
                value: field.init,
                is_static: field.is_static,
            })
            .collect();
        raw.insert(info.name, inits);
    }
    (parents, raw)
}

/// Resolve every class in `parents`.
///
/// A class missing from `raw` contributes no initializers. Fails on a cycle
/// in the parent map or on a parent that has no entry of its own.
pub fn resolve(parents: &ParentMap, raw: &RawInitializers) -> Result<InitializerChain, LowerError> {
    let mut classes: Vec<Name> = parents.keys().copied().collect();
    classes.sort_unstable();

    let mut chain = InitializerChain::default();
    for class in classes {
        let lineage = lineage(parents, class)?;

        let mut resolved: Vec<Initializer> = Vec::new();
        for ancestor in lineage.iter().rev() {
            for init in raw.get(ancestor).into_iter().flatten() {
                if init.is_static {
                    continue;
                }
                match resolved.iter_mut().find(|existing| existing.same_slot(init)) {
                    Some(existing) => *existing = init.clone(),
                    None => resolved.push(init.clone()),
                }
            }
        }

        let statics: Vec<Initializer> = raw
            .get(&class)
            .into_iter()
            .flatten()
            .filter(|init| init.is_static)
            .cloned()
            .collect();

        debug!(?class, instance = resolved.len(), statics = statics.len(), "initializer chain");
        chain.instance.insert(class, resolved);
        if !statics.is_empty() {
            chain.statics.insert(class, statics);
        }
    }
    Ok(chain)
}

/// `class` followed by each ancestor up to the root.
fn lineage(parents: &ParentMap, class: Name) -> Result<Vec<Name>, LowerError> {
    let mut stack = Vec::new();
    let mut seen = FxHashSet::default();
    let mut current = class;
    loop {
        if !seen.insert(current) {
            return Err(LowerError::InheritanceCycle { class });
        }
        stack.push(current);
        match parents.get(&current) {
            Some(parent) if !parent.is_empty() => {
                if !parents.contains_key(parent) {
                    return Err(LowerError::UnknownParent {
                        class: current,
                        parent: *parent,
                    });
                }
                current = *parent;
            }
            _ => return Ok(stack),
        }
    }
}
