//! Whole-program class table.
//!
//! Built once from every unit's class declarations plus the runtime-provided
//! classes (`Object`, `String`, `Class`). Answers inheritance, field lookup,
//! assignability and overload-resolution queries.

use clove_ir::{CompilationUnit, ExprId, Modifiers, Name, Span, StringInterner, Ty};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::MethodFlags;

/// Parameter types of a method; most methods have few.
pub type ParamTys = SmallVec<[Ty; 4]>;

/// A method, by declaring class and position in its declaration list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodRef {
    pub class: Name,
    pub index: u32,
}

/// A field, by declaring class and position in its declaration list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldRef {
    pub class: Name,
    pub index: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldInfo {
    pub name: Name,
    pub ty: Ty,
    pub is_static: bool,
    /// Explicit initializer in the declaring unit's arena, or `ExprId::INVALID`.
    pub init: ExprId,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodInfo {
    pub name: Name,
    pub params: ParamTys,
    pub ret: Ty,
    pub flags: MethodFlags,
    pub span: Span,
}

impl MethodInfo {
    /// Same source name and parameter types: the override relation.
    pub fn same_signature(&self, other: &MethodInfo) -> bool {
        self.name == other.name && self.params == other.params
    }
}

#[derive(Clone, Debug)]
pub struct ClassInfo {
    pub name: Name,
    /// `Name::EMPTY` for the root.
    pub parent: Name,
    pub qualified: Name,
    /// Index of the declaring unit; `None` for runtime-provided classes.
    pub unit: Option<usize>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
}

impl ClassInfo {
    pub fn is_builtin(&self) -> bool {
        self.unit.is_none()
    }

    pub fn has_constructor(&self) -> bool {
        self.methods.iter().any(|m| m.flags.is_constructor())
    }
}

#[derive(Debug, Default)]
pub struct ClassTable {
    classes: FxHashMap<Name, ClassInfo>,
    order: Vec<Name>,
}

impl ClassTable {
    /// Build the table for a whole program.
    ///
    /// A class declared twice keeps its first declaration.
    pub fn build(units: &[CompilationUnit], interner: &StringInterner) -> Self {
        let mut table = ClassTable::default();
        table.insert_builtins(interner);

        for (unit_index, unit) in units.iter().enumerate() {
            let prefix: Vec<&str> = unit.package.iter().map(|&p| interner.lookup(p)).collect();
            for decl in &unit.classes {
                if table.classes.contains_key(&decl.name) {
                    warn!(
                        class = interner.lookup(decl.name),
                        path = %unit.path.display(),
                        "duplicate class declaration ignored"
                    );
                    continue;
                }
                let mut segments = prefix.clone();
                segments.push(interner.lookup(decl.name));
                let qualified = interner.intern(&segments.join("."));

                let fields = decl
                    .fields
                    .iter()
                    .map(|f| FieldInfo {
                        name: f.name,
                        ty: f.ty.clone(),
                        is_static: f.is_static(),
                        init: f.init,
                        span: f.span,
                    })
                    .collect();
                let methods = decl
                    .methods
                    .iter()
                    .map(|m| MethodInfo {
                        name: m.name,
                        params: m.params.iter().map(|p| p.ty.clone()).collect(),
                        ret: m.ret.clone(),
                        flags: declared_flags(m.modifiers, m.is_constructor(decl.name), m.name),
                        span: m.span,
                    })
                    .collect();

                table.insert(ClassInfo {
                    name: decl.name,
                    parent: decl.parent_or_root(),
                    qualified,
                    unit: Some(unit_index),
                    fields,
                    methods,
                });
            }
        }

        table.mark_overrides();
        debug!(classes = table.order.len(), "class table built");
        table
    }

    fn insert(&mut self, info: ClassInfo) {
        self.order.push(info.name);
        self.classes.insert(info.name, info);
    }

    fn insert_builtins(&mut self, interner: &StringInterner) {
        let virt = MethodFlags::VIRTUAL;
        let fin = MethodFlags::FINAL;
        let builtin = |name: &str, params: &[Ty], ret: Ty, flags: MethodFlags| MethodInfo {
            name: interner.intern(name),
            params: params.iter().cloned().collect(),
            ret,
            flags,
            span: Span::DUMMY,
        };

        self.insert(ClassInfo {
            name: Name::OBJECT,
            parent: Name::EMPTY,
            qualified: interner.intern("java.lang.Object"),
            unit: None,
            fields: Vec::new(),
            methods: vec![
                builtin("hashCode", &[], Ty::Int, virt),
                builtin("equals", &[Ty::OBJECT], Ty::Boolean, virt),
                builtin("getClass", &[], Ty::Class(Name::CLASS), virt),
                builtin("toString", &[], Ty::STRING, virt),
            ],
        });
        self.insert(ClassInfo {
            name: Name::STRING,
            parent: Name::OBJECT,
            qualified: interner.intern("java.lang.String"),
            unit: None,
            fields: Vec::new(),
            methods: vec![
                builtin("length", &[], Ty::Int, fin),
                builtin("charAt", &[Ty::Int], Ty::Char, fin),
            ],
        });
        self.insert(ClassInfo {
            name: Name::CLASS,
            parent: Name::OBJECT,
            qualified: interner.intern("java.lang.Class"),
            unit: None,
            fields: Vec::new(),
            methods: vec![builtin("getName", &[], Ty::STRING, fin)],
        });
    }

    fn mark_overrides(&mut self) {
        let mut overriding = Vec::new();
        for &name in &self.order {
            let Some(info) = self.classes.get(&name) else {
                continue;
            };
            for (index, method) in info.methods.iter().enumerate() {
                if !method.flags.is_virtual() {
                    continue;
                }
                let overrides = self.ancestors(info.parent).any(|ancestor| {
                    ancestor
                        .methods
                        .iter()
                        .any(|m| m.flags.is_virtual() && m.same_signature(method))
                });
                if overrides {
                    overriding.push((name, index));
                }
            }
        }
        for (name, index) in overriding {
            if let Some(method) = self
                .classes
                .get_mut(&name)
                .and_then(|c| c.methods.get_mut(index))
            {
                method.flags |= MethodFlags::OVERRIDE;
            }
        }
    }

    pub fn class(&self, name: Name) -> Option<&ClassInfo> {
        self.classes.get(&name)
    }

    pub fn contains(&self, name: Name) -> bool {
        self.classes.contains_key(&name)
    }

    /// Every class, runtime-provided ones first, then in declaration order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.order.iter().filter_map(|name| self.classes.get(name))
    }

    /// Classes declared in source, in declaration order.
    pub fn user_classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes().filter(|c| !c.is_builtin())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn method(&self, method: MethodRef) -> Option<&MethodInfo> {
        self.classes
            .get(&method.class)?
            .methods
            .get(method.index as usize)
    }

    pub fn field(&self, field: FieldRef) -> Option<&FieldInfo> {
        self.classes
            .get(&field.class)?
            .fields
            .get(field.index as usize)
    }

    /// `None` for the root and for unknown classes.
    pub fn direct_supertype(&self, class: Name) -> Option<Name> {
        let parent = self.classes.get(&class)?.parent;
        (!parent.is_empty()).then_some(parent)
    }

    /// Walk from `class` up to the root, self first.
    ///
    /// Stops at the first unknown class. A cyclic parent chain is cut off
    /// after visiting every class once.
    pub fn ancestors(&self, class: Name) -> Ancestors<'_> {
        Ancestors {
            table: self,
            next: (!class.is_empty()).then_some(class),
            remaining: self.order.len(),
        }
    }

    pub fn is_subclass(&self, sub: Name, sup: Name) -> bool {
        self.ancestors(sub).any(|c| c.name == sup)
    }

    /// Assignment conversion: identity, primitive widening, `null` to any
    /// reference, subclass to superclass, arrays to `Object`, and covariant
    /// reference arrays.
    pub fn is_assignable(&self, from: &Ty, to: &Ty) -> bool {
        if from == to {
            return true;
        }
        match (from, to) {
            (Ty::Null, target) => target.is_reference(),
            (Ty::Class(sub), Ty::Class(sup)) => self.is_subclass(*sub, *sup),
            (Ty::Array(_), Ty::Class(sup)) => *sup == Name::OBJECT,
            (Ty::Array(a), Ty::Array(b)) => {
                a.is_reference() && b.is_reference() && self.is_assignable(a, b)
            }
            _ => from.widens_to(to),
        }
    }

    /// Nearest declaration of `name` in `class` or its ancestors.
    pub fn lookup_field(&self, class: Name, name: Name) -> Option<FieldRef> {
        self.ancestors(class).find_map(|info| {
            info.fields
                .iter()
                .position(|f| f.name == name)
                .map(|index| FieldRef {
                    class: info.name,
                    index: index_u32(index),
                })
        })
    }

    /// Every field visible on `class`, root-most declarations first.
    pub fn fields_own_and_inherited(&self, class: Name) -> Vec<FieldRef> {
        let chain: Vec<&ClassInfo> = self.ancestors(class).collect();
        chain
            .into_iter()
            .rev()
            .flat_map(|info| {
                (0..info.fields.len()).map(move |index| FieldRef {
                    class: info.name,
                    index: index_u32(index),
                })
            })
            .collect()
    }

    /// Resolve a call of `name` with `args` against `class` and its ancestors.
    ///
    /// An argument type of `None` (unknown) is compatible with any parameter.
    /// A method redeclared with the same parameter types hides the ancestor's.
    /// Returns `None` when nothing applies or the most specific candidate is
    /// ambiguous.
    pub fn resolve_overload(
        &self,
        class: Name,
        name: Name,
        args: &[Option<Ty>],
    ) -> Option<MethodRef> {
        let mut candidates: SmallVec<[(MethodRef, &MethodInfo); 4]> = SmallVec::new();
        for info in self.ancestors(class) {
            for (index, method) in info.methods.iter().enumerate() {
                if method.name != name
                    || method.flags.is_constructor()
                    || method.params.len() != args.len()
                {
                    continue;
                }
                if candidates.iter().any(|(_, c)| c.params == method.params) {
                    continue;
                }
                if !self.applicable(method, args) {
                    continue;
                }
                let method_ref = MethodRef {
                    class: info.name,
                    index: index_u32(index),
                };
                candidates.push((method_ref, method));
            }
        }

        let mut best = candidates.iter().filter(|(_, candidate)| {
            candidates
                .iter()
                .all(|(_, other)| self.more_specific(candidate, other))
        });
        let first = best.next()?;
        if best.next().is_some() {
            return None;
        }
        Some(first.0)
    }

    fn applicable(&self, method: &MethodInfo, args: &[Option<Ty>]) -> bool {
        method
            .params
            .iter()
            .zip(args)
            .all(|(param, arg)| arg.as_ref().map_or(true, |arg| self.is_assignable(arg, param)))
    }

    fn more_specific(&self, a: &MethodInfo, b: &MethodInfo) -> bool {
        a.params
            .iter()
            .zip(&b.params)
            .all(|(pa, pb)| self.is_assignable(pa, pb))
    }
}

/// Iterator over a class and its ancestors; see [`ClassTable::ancestors`].
pub struct Ancestors<'a> {
    table: &'a ClassTable,
    next: Option<Name>,
    remaining: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ClassInfo;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.next.take()?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let info = self.table.classes.get(&name)?;
        self.next = (!info.parent.is_empty()).then_some(info.parent);
        Some(info)
    }
}

fn declared_flags(modifiers: Modifiers, is_constructor: bool, name: Name) -> MethodFlags {
    let mut flags = MethodFlags::empty();
    let is_static = modifiers.contains(Modifiers::STATIC);
    let is_private = modifiers.contains(Modifiers::PRIVATE);
    if is_static {
        flags |= MethodFlags::STATIC;
    }
    if is_private {
        flags |= MethodFlags::PRIVATE;
    }
    if modifiers.contains(Modifiers::FINAL) {
        flags |= MethodFlags::FINAL;
    }
    if is_constructor {
        flags |= MethodFlags::CONSTRUCTOR;
    } else if !is_static && !is_private {
        flags |= MethodFlags::VIRTUAL;
    }
    if is_static && name == Name::MAIN {
        flags |= MethodFlags::ENTRY;
    }
    flags
}

fn index_u32(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests;
