#![allow(clippy::unwrap_used, clippy::expect_used)]

use clove_ir::{CompilationUnit, ExprId, Modifiers, StringInterner, Ty, UnitBuilder};
use pretty_assertions::assert_eq;

use super::*;
use crate::{TypeQuery, UnitQuery};

struct Zoo {
    unit: CompilationUnit,
    virtual_call: ExprId,
    super_call: ExprId,
    static_call: ExprId,
    private_call: ExprId,
    print_call: ExprId,
    length: ExprId,
    legs_ident: ExprId,
    local_ident: ExprId,
    class_ident: ExprId,
}

/// ```text
/// class Animal { int legs; String speak() {..} private void secret() {..} static int count() {..} }
/// class Dog extends Animal {
///     String speak() { super.speak(); return "woof"; }
///     void run(int[] xs) {
///         Animal a = new Dog(); a.speak(); secret(); Animal.count();
///         System.out.println(xs.length); legs;
///     }
/// }
/// ```
fn zoo(interner: &StringInterner) -> Zoo {
    let mut b = UnitBuilder::new(interner, "Zoo.java");
    let animal = b.class("Animal", None);
    b.field(animal, Modifiers::empty(), Ty::Int, "legs", None);
    b.method(animal, Modifiers::empty(), Ty::STRING, "speak", &[], vec![]);
    b.method(animal, Modifiers::PRIVATE, Ty::Void, "secret", &[], vec![]);
    b.method(animal, Modifiers::STATIC, Ty::Int, "count", &[], vec![]);

    let dog = b.class("Dog", Some("Animal"));
    let sup = b.super_ref();
    let super_call = b.call(Some(sup), "speak", &[]);
    let s0 = b.expr_stmt(super_call);
    let woof = b.str("woof");
    let s1 = b.ret(Some(woof));
    b.method(dog, Modifiers::empty(), Ty::STRING, "speak", &[], vec![s0, s1]);

    let animal_ty = b.class_ty("Animal");
    let new_dog = b.new_object("Dog", &[]);
    let s0 = b.local(animal_ty, "a", Some(new_dog));
    let local_ident = b.ident("a");
    let virtual_call = b.call(Some(local_ident), "speak", &[]);
    let s1 = b.expr_stmt(virtual_call);
    let private_call = b.call(None, "secret", &[]);
    let s2 = b.expr_stmt(private_call);
    let class_ident = b.ident("Animal");
    let static_call = b.call(Some(class_ident), "count", &[]);
    let s3 = b.expr_stmt(static_call);
    let xs = b.ident("xs");
    let length = b.field_access(xs, "length");
    let print_call = b.println(&[length]);
    let s4 = b.expr_stmt(print_call);
    let legs_ident = b.ident("legs");
    let s5 = b.expr_stmt(legs_ident);
    b.method(
        dog,
        Modifiers::empty(),
        Ty::Void,
        "run",
        &[(Ty::array_of(Ty::Int, 1), "xs")],
        vec![s0, s1, s2, s3, s4, s5],
    );

    Zoo {
        unit: b.finish(),
        virtual_call,
        super_call,
        static_call,
        private_call,
        print_call,
        length,
        legs_ident,
        local_ident,
        class_ident,
    }
}

#[test]
fn virtual_call_through_supertype_local() {
    let interner = StringInterner::new();
    let zoo = zoo(&interner);
    let table = ClassTable::build(std::slice::from_ref(&zoo.unit), &interner);
    let typed = check_unit(&table, 0, &zoo.unit);

    let info = typed.call(zoo.virtual_call).unwrap();
    assert_eq!(info.dispatch, DispatchKind::Virtual);
    assert_eq!(info.target.class, interner.intern("Animal"));
    assert_eq!(typed.expr_type(zoo.virtual_call), Some(&Ty::STRING));
    assert_eq!(typed.ident(zoo.local_ident), Some(IdentRes::Local));
}

#[test]
fn super_call_is_direct() {
    let interner = StringInterner::new();
    let zoo = zoo(&interner);
    let table = ClassTable::build(std::slice::from_ref(&zoo.unit), &interner);
    let typed = check_unit(&table, 0, &zoo.unit);

    let info = typed.call(zoo.super_call).unwrap();
    assert_eq!(info.dispatch, DispatchKind::Direct);
    assert_eq!(info.target.class, interner.intern("Animal"));
}

#[test]
fn static_and_implicit_calls() {
    let interner = StringInterner::new();
    let zoo = zoo(&interner);
    let table = ClassTable::build(std::slice::from_ref(&zoo.unit), &interner);
    let typed = check_unit(&table, 0, &zoo.unit);

    assert_eq!(
        typed.call(zoo.static_call).map(|c| c.dispatch),
        Some(DispatchKind::Static)
    );
    assert_eq!(
        typed.ident(zoo.class_ident),
        Some(IdentRes::Class(interner.intern("Animal")))
    );
    assert_eq!(
        typed.call(zoo.private_call).map(|c| c.dispatch),
        Some(DispatchKind::Direct)
    );
}

#[test]
fn console_output_is_left_unresolved() {
    let interner = StringInterner::new();
    let zoo = zoo(&interner);
    let table = ClassTable::build(std::slice::from_ref(&zoo.unit), &interner);
    let typed = check_unit(&table, 0, &zoo.unit);

    assert_eq!(typed.call(zoo.print_call), None);
    assert_eq!(typed.expr_type(zoo.length), Some(&Ty::Int));
}

#[test]
fn implicit_field_reference_resolves_to_ancestor() {
    let interner = StringInterner::new();
    let zoo = zoo(&interner);
    let table = ClassTable::build(std::slice::from_ref(&zoo.unit), &interner);
    let typed = check_unit(&table, 0, &zoo.unit);

    let Some(IdentRes::Field(field)) = typed.ident(zoo.legs_ident) else {
        panic!("legs should resolve to a field");
    };
    assert_eq!(field.class, interner.intern("Animal"));
    assert_eq!(typed.expr_type(zoo.legs_ident), Some(&Ty::Int));
}

#[test]
fn query_type_of_prefers_locals() {
    let interner = StringInterner::new();
    let zoo = zoo(&interner);
    let table = ClassTable::build(std::slice::from_ref(&zoo.unit), &interner);
    let typed = check_unit(&table, 0, &zoo.unit);
    let query = UnitQuery::new(&table, &typed);

    let dog = interner.intern("Dog");
    let run = MethodRef { class: dog, index: 1 };
    let scope = Scope {
        class: dog,
        method: Some(run),
    };
    assert_eq!(
        query.type_of(scope, interner.intern("a")),
        Some(Ty::Class(interner.intern("Animal")))
    );
    assert_eq!(
        query.type_of(scope, interner.intern("xs")),
        Some(Ty::array_of(Ty::Int, 1))
    );
    assert_eq!(query.type_of(scope, interner.intern("legs")), Some(Ty::Int));
    assert!(query.is_class(dog));
    assert!(!query.is_class(interner.intern("System")));
}

#[test]
fn dispatch_classification() {
    assert_eq!(
        DispatchKind::classify(MethodFlags::STATIC, false),
        DispatchKind::Static
    );
    assert_eq!(
        DispatchKind::classify(MethodFlags::VIRTUAL, true),
        DispatchKind::Direct
    );
    assert_eq!(
        DispatchKind::classify(MethodFlags::PRIVATE, false),
        DispatchKind::Direct
    );
    assert_eq!(
        DispatchKind::classify(MethodFlags::VIRTUAL | MethodFlags::FINAL, false),
        DispatchKind::Virtual
    );
}
