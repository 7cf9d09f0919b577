//! Overload mangling.
//!
//! Two explicit phases:
//!
//! 1. [`DeclNamer`] gives every method declaration a unique name within its
//!    class, `<name>_<k>`, where `k` counts declarations of the same source
//!    name in that class. The entry point and constructors keep their names.
//! 2. [`CallResolver`] resolves each call site against the static type of its
//!    receiver and records the target's mangled name in a side table.
//!
//! Nothing in the source arena is touched. A call that cannot be resolved
//! (unknown receiver type, no applicable or an ambiguous overload) is simply
//! absent from the table; later passes keep its source name.

use clove_ir::{CompilationUnit, ExprArena, ExprId, ExprKind, Name, StringInterner, Ty};
use clove_types::{IdentRes, MethodRef, TypeQuery};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::walk::{walk_expr, walk_stmt};
use crate::LowerOptions;

/// Declaration-phase output: mangled name per method, plus the per-class
/// counters that produced them.
#[derive(Clone, Debug, Default)]
pub struct MangleRecord {
    names: FxHashMap<MethodRef, Name>,
    counters: FxHashMap<(Name, Name), u32>,
}

impl MangleRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mangled name of a declared method. `None` for methods that keep their
    /// source name (entry point, constructors, runtime-provided methods).
    pub fn mangled(&self, method: MethodRef) -> Option<Name> {
        self.names.get(&method).copied()
    }

    /// How many declarations of `source` in `class` have been named so far.
    pub fn count(&self, class: Name, source: Name) -> u32 {
        self.counters.get(&(class, source)).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn assign(
        &mut self,
        interner: &StringInterner,
        method: MethodRef,
        source: Name,
    ) -> Name {
        let counter = self.counters.entry((method.class, source)).or_insert(0);
        let k = *counter;
        *counter += 1;
        let mangled = interner.intern(&format!("{}_{k}", interner.lookup(source)));
        self.names.insert(method, mangled);
        mangled
    }
}

/// Declaration phase.
pub struct DeclNamer<'a> {
    interner: &'a StringInterner,
    entry_point: Name,
    record: MangleRecord,
}

impl<'a> DeclNamer<'a> {
    pub fn new(interner: &'a StringInterner, entry_point: Name) -> Self {
        DeclNamer {
            interner,
            entry_point,
            record: MangleRecord::new(),
        }
    }

    /// Name every method declared in `unit`. Classes whose table entry
    /// belongs to another unit (duplicates) are skipped.
    pub fn name_unit(&mut self, unit_index: usize, unit: &CompilationUnit, query: &impl TypeQuery) {
        for decl in &unit.classes {
            let owned = query
                .class(decl.name)
                .is_some_and(|info| info.unit == Some(unit_index));
            if !owned {
                continue;
            }
            for (index, method) in decl.methods.iter().enumerate() {
                if method.name == self.entry_point || method.is_constructor(decl.name) {
                    continue;
                }
                let method_ref = MethodRef {
                    class: decl.name,
                    index: u32::try_from(index).unwrap_or(u32::MAX),
                };
                let mangled = self.record.assign(self.interner, method_ref, method.name);
                trace!(
                    class = self.interner.lookup(decl.name),
                    method = self.interner.lookup(method.name),
                    mangled = self.interner.lookup(mangled),
                    "mangled declaration"
                );
            }
        }
    }

    pub fn finish(self) -> MangleRecord {
        self.record
    }
}

/// A resolved call site.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallTarget {
    pub method: MethodRef,
    /// Mangled name of the target, or its source name if it has none.
    pub mangled: Name,
}

/// Call-site annotations for one unit.
#[derive(Clone, Debug, Default)]
pub struct UnitCalls {
    targets: FxHashMap<ExprId, CallTarget>,
    implicit_self: FxHashSet<ExprId>,
}

impl UnitCalls {
    pub fn target(&self, call: ExprId) -> Option<CallTarget> {
        self.targets.get(&call).copied()
    }

    /// The call has no written receiver but targets an instance method, so
    /// lowering must pass the current receiver explicitly.
    pub fn needs_self(&self, call: ExprId) -> bool {
        self.implicit_self.contains(&call)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Call-site phase for one unit.
pub struct CallResolver<'a, Q> {
    record: &'a MangleRecord,
    query: &'a Q,
}

impl<'a, Q: TypeQuery> CallResolver<'a, Q> {
    pub fn new(record: &'a MangleRecord, query: &'a Q) -> Self {
        CallResolver { record, query }
    }

    pub fn resolve_unit(&self, unit_index: usize, unit: &CompilationUnit) -> UnitCalls {
        let mut calls = UnitCalls::default();
        let arena = &unit.arena;
        for decl in &unit.classes {
            let owned = self
                .query
                .class(decl.name)
                .is_some_and(|info| info.unit == Some(unit_index));
            if !owned {
                continue;
            }
            let mut visit = |id: ExprId| self.resolve_expr(arena, decl.name, id, &mut calls);
            for field in &decl.fields {
                walk_expr(arena, field.init, &mut visit);
            }
            for method in &decl.methods {
                walk_stmt(arena, method.body, &mut visit);
            }
        }
        debug!(
            path = %unit.path.display(),
            resolved = calls.targets.len(),
            implicit_self = calls.implicit_self.len(),
            "call sites resolved"
        );
        calls
    }

    fn resolve_expr(&self, arena: &ExprArena, class: Name, id: ExprId, calls: &mut UnitCalls) {
        let ExprKind::Call {
            receiver,
            method,
            args,
        } = arena.kind(id)
        else {
            return;
        };
        let implicit = !receiver.is_valid();
        let Some(lookup) = self.lookup_class(arena, class, *receiver) else {
            trace!(?method, "receiver type unknown; call left unmangled");
            return;
        };
        let arg_tys: Vec<Option<Ty>> = arena
            .expr_list(*args)
            .iter()
            .map(|&arg| self.query.expr_type(arg).cloned())
            .collect();
        let Some(target) = self.query.resolve_overload(lookup, *method, &arg_tys) else {
            trace!(?method, ?lookup, "no unique overload; call left unmangled");
            return;
        };
        let Some(info) = self.query.method(target) else {
            return;
        };
        let mangled = self.record.mangled(target).unwrap_or(info.name);
        calls.targets.insert(id, CallTarget { method: target, mangled });
        if implicit && !info.flags.is_static() {
            calls.implicit_self.insert(id);
        }
    }

    /// Class whose methods a call with this receiver is resolved against.
    fn lookup_class(&self, arena: &ExprArena, class: Name, receiver: ExprId) -> Option<Name> {
        if !receiver.is_valid() {
            return Some(class);
        }
        match arena.kind(receiver) {
            ExprKind::This => Some(class),
            ExprKind::Super => self.query.direct_supertype(class),
            ExprKind::Ident(_) => match self.query.ident(receiver) {
                Some(IdentRes::Class(named)) => Some(named),
                _ => self.query.expr_type(receiver).and_then(receiver_class),
            },
            // Chained calls and every other receiver shape: its static type.
            _ => self.query.expr_type(receiver).and_then(receiver_class),
        }
    }
}

fn receiver_class(ty: &Ty) -> Option<Name> {
    match ty {
        Ty::Class(class) => Some(*class),
        Ty::Array(_) => Some(Name::OBJECT),
        _ => None,
    }
}

/// Both phases over a whole program.
#[derive(Clone, Debug, Default)]
pub struct MangleTable {
    pub record: MangleRecord,
    pub units: Vec<UnitCalls>,
}

impl MangleTable {
    pub fn unit(&self, index: usize) -> Option<&UnitCalls> {
        self.units.get(index)
    }
}

/// Run the declaration phase over every unit, then the call-site phase per
/// unit. `queries[i]` must be the facade for `units[i]`.
pub fn mangle_program<Q: TypeQuery>(
    units: &[CompilationUnit],
    queries: &[Q],
    interner: &StringInterner,
    options: &LowerOptions,
) -> MangleTable {
    let mut namer = DeclNamer::new(interner, options.entry_point);
    for (index, (unit, query)) in units.iter().zip(queries).enumerate() {
        namer.name_unit(index, unit, query);
    }
    let record = namer.finish();
    debug!(declarations = record.len(), "declarations mangled");

    let units = units
        .iter()
        .zip(queries)
        .enumerate()
        .map(|(index, (unit, query))| CallResolver::new(&record, query).resolve_unit(index, unit))
        .collect();
    MangleTable { record, units }
}
