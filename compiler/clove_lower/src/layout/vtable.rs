//! Whole-program vtable construction.
//!
//! A class's vtable is its parent's, with slots whose signature the class
//! redefines rebound to the class's implementation, followed by a new slot
//! for each virtual method the class introduces. Slot positions are
//! therefore stable down the hierarchy.

use clove_ir::{
    Name, SlotBinding, StringInterner, Ty, VtableInit, VtableLayout, VtableSlot,
};
use clove_types::{ClassTable, MethodRef};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::mangle::MangleRecord;
use crate::LowerError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassVtable {
    pub layout: VtableLayout,
    /// `init.bindings[i]` fills `layout.slots[i]`.
    pub init: VtableInit,
}

/// Vtables for every class in the program, runtime-provided ones included.
#[derive(Clone, Debug, Default)]
pub struct VtableSet {
    tables: FxHashMap<Name, ClassVtable>,
}

impl VtableSet {
    pub fn compute(
        table: &ClassTable,
        record: &MangleRecord,
        interner: &StringInterner,
    ) -> Result<Self, LowerError> {
        let mut builder = Builder {
            table,
            record,
            interner,
            set: VtableSet::default(),
            visiting: FxHashSet::default(),
        };
        for info in table.classes() {
            builder.build(info.name)?;
        }
        debug!(classes = builder.set.tables.len(), "vtables computed");
        Ok(builder.set)
    }

    pub fn get(&self, class: Name) -> Option<&ClassVtable> {
        self.tables.get(&class)
    }

    /// Slot of `class`'s vtable holding the method `source(params)`.
    pub fn slot_for(&self, class: Name, source: Name, params: &[Ty]) -> Option<&VtableSlot> {
        self.tables
            .get(&class)?
            .layout
            .slots
            .iter()
            .find(|slot| slot.source == source && slot.params == params)
    }
}

struct Builder<'a> {
    table: &'a ClassTable,
    record: &'a MangleRecord,
    interner: &'a StringInterner,
    set: VtableSet,
    visiting: FxHashSet<Name>,
}

impl Builder<'_> {
    fn build(&mut self, class: Name) -> Result<(), LowerError> {
        if self.set.tables.contains_key(&class) {
            return Ok(());
        }
        let table = self.table;
        let Some(info) = table.class(class) else {
            return Ok(());
        };
        if !self.visiting.insert(class) {
            return Err(LowerError::InheritanceCycle { class });
        }

        let mut vtable = if info.parent.is_empty() {
            ClassVtable::default()
        } else {
            if !table.contains(info.parent) {
                return Err(LowerError::UnknownParent {
                    class,
                    parent: info.parent,
                });
            }
            self.build(info.parent)?;
            self.set
                .tables
                .get(&info.parent)
                .cloned()
                .unwrap_or_default()
        };

        let mut introduced = 0usize;
        for (index, method) in info.methods.iter().enumerate() {
            if !method.flags.is_virtual() {
                continue;
            }
            let method_ref = MethodRef {
                class,
                index: u32::try_from(index).unwrap_or(u32::MAX),
            };
            let impl_name = self.record.mangled(method_ref).unwrap_or(method.name);

            let existing = vtable
                .layout
                .slots
                .iter()
                .position(|slot| slot.source == method.name && slot.params == method.params.as_slice());
            if let Some(position) = existing {
                let slot = &vtable.layout.slots[position];
                vtable.init.bindings[position] = SlotBinding {
                    slot: slot.name,
                    owner: class,
                    impl_name,
                    needs_cast: slot.declared_in != class,
                };
                continue;
            }

            // Per-class counters can hand a subclass's new overload the same
            // mangled name as an inherited slot.
            let slot_name = if vtable.layout.slot(impl_name).is_some() {
                self.interner.intern(&format!(
                    "{}_{}",
                    self.interner.lookup(impl_name),
                    self.interner.lookup(class)
                ))
            } else {
                impl_name
            };
            vtable.layout.slots.push(VtableSlot {
                name: slot_name,
                source: method.name,
                params: method.params.to_vec(),
                ret: method.ret.clone(),
                declared_in: class,
            });
            vtable.init.bindings.push(SlotBinding {
                slot: slot_name,
                owner: class,
                impl_name,
                needs_cast: false,
            });
            introduced += 1;
        }

        debug!(
            ?class,
            slots = vtable.layout.slots.len(),
            introduced,
            "vtable"
        );
        self.visiting.remove(&class);
        self.set.tables.insert(class, vtable);
        Ok(())
    }
}
