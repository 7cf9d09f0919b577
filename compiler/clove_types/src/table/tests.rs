#![allow(clippy::unwrap_used, clippy::expect_used)]

use clove_ir::{Modifiers, Name, StringInterner, Ty, UnitBuilder};
use pretty_assertions::assert_eq;

use super::*;

fn zoo(interner: &StringInterner) -> ClassTable {
    let mut b = UnitBuilder::new(interner, "Zoo.java");
    b.package("zoo");
    let animal = b.class("Animal", None);
    b.field(animal, Modifiers::empty(), Ty::Int, "legs", None);
    b.method(animal, Modifiers::PUBLIC, Ty::STRING, "speak", &[], vec![]);
    b.method(animal, Modifiers::PRIVATE, Ty::Void, "secret", &[], vec![]);
    let dog = b.class("Dog", Some("Animal"));
    b.field(dog, Modifiers::STATIC, Ty::Int, "count", None);
    b.method(dog, Modifiers::PUBLIC, Ty::STRING, "speak", &[], vec![]);
    b.method(dog, Modifiers::STATIC, Ty::Void, "main", &[(Ty::array_of(Ty::STRING, 1), "args")], vec![]);
    let unit = b.finish();
    ClassTable::build(&[unit], interner)
}

fn overloads(interner: &StringInterner) -> ClassTable {
    let mut b = UnitBuilder::new(interner, "Ov.java");
    let ov = b.class("Ov", None);
    b.method(ov, Modifiers::empty(), Ty::Void, "f", &[(Ty::Int, "a")], vec![]);
    b.method(ov, Modifiers::empty(), Ty::Void, "f", &[(Ty::Long, "a")], vec![]);
    b.method(ov, Modifiers::empty(), Ty::Void, "f", &[(Ty::Int, "a"), (Ty::Int, "b")], vec![]);
    b.method(ov, Modifiers::empty(), Ty::Void, "g", &[(Ty::Int, "a"), (Ty::Long, "b")], vec![]);
    b.method(ov, Modifiers::empty(), Ty::Void, "g", &[(Ty::Long, "a"), (Ty::Int, "b")], vec![]);
    ClassTable::build(&[b.finish()], interner)
}

#[test]
fn builtins_are_present() {
    let interner = StringInterner::new();
    let table = ClassTable::build(&[], &interner);
    assert_eq!(table.len(), 3);
    let object = table.class(Name::OBJECT).unwrap();
    assert!(object.is_builtin());
    assert_eq!(object.parent, Name::EMPTY);
    assert_eq!(table.direct_supertype(Name::STRING), Some(Name::OBJECT));
    assert_eq!(table.direct_supertype(Name::OBJECT), None);
}

#[test]
fn qualified_names_include_package() {
    let interner = StringInterner::new();
    let table = zoo(&interner);
    let dog = table.class(interner.intern("Dog")).unwrap();
    assert_eq!(interner.lookup(dog.qualified), "zoo.Dog");
    assert_eq!(dog.unit, Some(0));
}

#[test]
fn flags_follow_modifiers() {
    let interner = StringInterner::new();
    let table = zoo(&interner);
    let animal = table.class(interner.intern("Animal")).unwrap();
    assert!(animal.methods[0].flags.is_virtual());
    assert!(!animal.methods[0].flags.contains(MethodFlags::OVERRIDE));
    assert!(!animal.methods[1].flags.is_virtual());
    assert!(animal.methods[1].flags.contains(MethodFlags::PRIVATE));

    let dog = table.class(interner.intern("Dog")).unwrap();
    assert!(dog.methods[0].flags.contains(MethodFlags::OVERRIDE));
    assert!(dog.methods[1].flags.is_entry());
    assert!(dog.methods[1].flags.is_static());
}

#[test]
fn ancestors_walk_to_root() {
    let interner = StringInterner::new();
    let table = zoo(&interner);
    let names: Vec<Name> = table
        .ancestors(interner.intern("Dog"))
        .map(|c| c.name)
        .collect();
    assert_eq!(
        names,
        vec![interner.intern("Dog"), interner.intern("Animal"), Name::OBJECT]
    );
}

#[test]
fn assignability() {
    let interner = StringInterner::new();
    let table = zoo(&interner);
    let dog = Ty::Class(interner.intern("Dog"));
    let animal = Ty::Class(interner.intern("Animal"));
    assert!(table.is_assignable(&dog, &animal));
    assert!(table.is_assignable(&dog, &Ty::OBJECT));
    assert!(!table.is_assignable(&animal, &dog));
    assert!(table.is_assignable(&Ty::Null, &dog));
    assert!(!table.is_assignable(&Ty::Null, &Ty::Int));
    assert!(table.is_assignable(&Ty::array_of(dog.clone(), 1), &Ty::array_of(animal, 1)));
    assert!(table.is_assignable(&Ty::array_of(Ty::Int, 1), &Ty::OBJECT));
    assert!(!table.is_assignable(&Ty::array_of(Ty::Int, 1), &Ty::array_of(Ty::Long, 1)));
}

#[test]
fn field_lookup_finds_inherited() {
    let interner = StringInterner::new();
    let table = zoo(&interner);
    let dog = interner.intern("Dog");
    let legs = table.lookup_field(dog, interner.intern("legs")).unwrap();
    assert_eq!(legs.class, interner.intern("Animal"));
    let all = table.fields_own_and_inherited(dog);
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], legs);
    assert!(table.field(all[1]).unwrap().is_static);
}

#[test]
fn overload_exact_match() {
    let interner = StringInterner::new();
    let table = overloads(&interner);
    let ov = interner.intern("Ov");
    let f = interner.intern("f");
    let one = table.resolve_overload(ov, f, &[Some(Ty::Int)]).unwrap();
    assert_eq!(one.index, 0);
    let two = table
        .resolve_overload(ov, f, &[Some(Ty::Int), Some(Ty::Int)])
        .unwrap();
    assert_eq!(two.index, 2);
}

#[test]
fn overload_prefers_most_specific_widening() {
    let interner = StringInterner::new();
    let table = overloads(&interner);
    let ov = interner.intern("Ov");
    let f = interner.intern("f");
    // short widens to both int and long; int is more specific.
    let picked = table.resolve_overload(ov, f, &[Some(Ty::Short)]).unwrap();
    assert_eq!(picked.index, 0);
    let long = table.resolve_overload(ov, f, &[Some(Ty::Long)]).unwrap();
    assert_eq!(long.index, 1);
}

#[test]
fn overload_ambiguity_is_unresolved() {
    let interner = StringInterner::new();
    let table = overloads(&interner);
    let ov = interner.intern("Ov");
    let g = interner.intern("g");
    assert_eq!(
        table.resolve_overload(ov, g, &[Some(Ty::Int), Some(Ty::Int)]),
        None
    );
    assert_eq!(table.resolve_overload(ov, interner.intern("h"), &[]), None);
}

#[test]
fn overload_finds_nearest_override() {
    let interner = StringInterner::new();
    let table = zoo(&interner);
    let speak = interner.intern("speak");
    let found = table
        .resolve_overload(interner.intern("Dog"), speak, &[])
        .unwrap();
    assert_eq!(found.class, interner.intern("Dog"));
    let inherited = table
        .resolve_overload(interner.intern("Dog"), interner.intern("hashCode"), &[])
        .unwrap();
    assert_eq!(inherited.class, Name::OBJECT);
}

#[test]
fn duplicate_class_keeps_first() {
    let interner = StringInterner::new();
    let mut a = UnitBuilder::new(&interner, "A.java");
    let first = a.class("Twice", None);
    a.field(first, Modifiers::empty(), Ty::Int, "x", None);
    let mut b = UnitBuilder::new(&interner, "B.java");
    b.class("Twice", None);
    let table = ClassTable::build(&[a.finish(), b.finish()], &interner);
    let twice = table.class(interner.intern("Twice")).unwrap();
    assert_eq!(twice.unit, Some(0));
    assert_eq!(twice.fields.len(), 1);
}

#[test]
fn cyclic_parents_do_not_hang() {
    let interner = StringInterner::new();
    let mut b = UnitBuilder::new(&interner, "Cycle.java");
    b.class("A", Some("B"));
    b.class("B", Some("A"));
    let table = ClassTable::build(&[b.finish()], &interner);
    let a = interner.intern("A");
    assert!(table.ancestors(a).count() <= table.len());
}
