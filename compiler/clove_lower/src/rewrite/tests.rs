#![allow(clippy::unwrap_used, clippy::expect_used)]

use clove_ir::{
    BinaryOp, LowExpr, LoweredUnit, MethodKind, Modifiers, Name, StringInterner, Ty, UnaryOp,
    UnitBuilder,
};
use pretty_assertions::assert_eq;

use crate::test_helpers::{exprs_in, sketch_body, zoo, Analyzed};
use crate::{LowerError, LowerOptions};

fn method_body(unit: &LoweredUnit, class: &str, method: &str, interner: &StringInterner) -> Vec<String> {
    let class = unit.class(interner.intern(class)).unwrap();
    let method = class.method(interner.intern(method)).unwrap();
    sketch_body(&unit.arena, method.body, interner)
}

#[test]
fn virtual_call_through_declared_supertype() {
    let interner = StringInterner::new();
    let analyzed = Analyzed::new(vec![zoo(&interner)], &interner);
    let lowered = analyzed.lower(&interner, &LowerOptions::default());
    let unit = &lowered[0];

    assert_eq!(
        method_body(unit, "Main", "main", &interner),
        vec![
            "Animal a = Dog::__init(new Dog)",
            "{ checkNotNull(a); a->vptr->speak_0(a) }",
            "{ Animal __tmp0 = Animal::make_0(); checkNotNull(__tmp0); __tmp0->vptr->speak_0(__tmp0) }",
            "println({ checkNotNull(a); a->vptr->speak_0(a) })",
            "return 0",
        ]
    );

    // The slot the call goes through is bound to Dog's implementation.
    let dog = unit.class(interner.intern("Dog")).unwrap();
    let binding = dog.vtable_init.binding(interner.intern("speak_0")).unwrap();
    assert_eq!(binding.owner, dog.name);
}

#[test]
fn entry_point_returns_exit_status() {
    let interner = StringInterner::new();
    let analyzed = Analyzed::new(vec![zoo(&interner)], &interner);
    let lowered = analyzed.lower(&interner, &LowerOptions::default());
    let main = lowered[0]
        .class(interner.intern("Main"))
        .unwrap()
        .method(Name::MAIN)
        .unwrap();

    assert_eq!(main.kind, MethodKind::Entry);
    assert_eq!(main.ret, Ty::Int);
    assert_eq!(main.params.len(), 1);
    assert_eq!(main.params[0].name, interner.intern("args"));
}

#[test]
fn instance_methods_take_the_receiver_first() {
    let interner = StringInterner::new();
    let analyzed = Analyzed::new(vec![zoo(&interner)], &interner);
    let lowered = analyzed.lower(&interner, &LowerOptions::default());
    let animal = lowered[0].class(interner.intern("Animal")).unwrap();

    let speak = animal.method(interner.intern("speak_0")).unwrap();
    assert_eq!(speak.kind, MethodKind::Instance);
    assert_eq!(speak.params[0].name, Name::SELF_PARAM);
    assert_eq!(speak.params[0].ty, Ty::Class(animal.name));
    assert_eq!(speak.source, interner.intern("speak"));

    let make = animal.method(interner.intern("make_0")).unwrap();
    assert_eq!(make.kind, MethodKind::Static);
    assert!(make.params.is_empty());
}

#[test]
fn implicit_receiver_calls() {
    let interner = StringInterner::new();
    let analyzed = Analyzed::new(vec![zoo(&interner)], &interner);
    let lowered = analyzed.lower(&interner, &LowerOptions::default());

    assert_eq!(
        method_body(&lowered[0], "Animal", "poke_0", &interner),
        vec!["__this.secret_0(__this)", "__this->vptr->speak_0(__this)"]
    );
    assert_eq!(
        method_body(&lowered[0], "Animal", "make_0", &interner),
        vec!["return Dog::__init(new Dog)"]
    );
}

#[test]
fn super_call_is_qualified() {
    let interner = StringInterner::new();
    let analyzed = Analyzed::new(vec![zoo(&interner)], &interner);
    let lowered = analyzed.lower(&interner, &LowerOptions::default());

    assert_eq!(
        method_body(&lowered[0], "Dog", "speak_0", &interner),
        vec!["Animal::speak_0(__this)", "return \"woof\""]
    );
}

/// ```text
/// class Store {
///     int[] arr;
///     int next() { return 1; }
///     void put(int i) { arr[i] = next(); }
///     int get(int[] xs) { return xs[0] + xs.length; }
///     void bump(int[] xs) { xs[next()]++; }
///     int[][] grid() { return new int[2][3]; }
///     Object[] row() { return new Object[4][]; }
///     void shift(int[] xs, int i) { xs[i] = i++; }
///     static int twice(int x) { return x; }
///     Store me() { return this; }
///     int relay() { return me().twice(1); }
/// }
/// ```
fn store(interner: &StringInterner) -> Analyzed {
    let mut b = UnitBuilder::new(interner, "Store.java");
    let store = b.class("Store", None);
    let ints = Ty::array_of(Ty::Int, 1);
    b.field(store, Modifiers::empty(), ints.clone(), "arr", None);

    let one = b.int(1);
    let r = b.ret(Some(one));
    b.method(store, Modifiers::empty(), Ty::Int, "next", &[], vec![r]);

    let arr = b.ident("arr");
    let i = b.ident("i");
    let slot = b.index(arr, i);
    let next = b.call(None, "next", &[]);
    let assign = b.assign(slot, next);
    let s = b.expr_stmt(assign);
    b.method(store, Modifiers::empty(), Ty::Void, "put", &[(Ty::Int, "i")], vec![s]);

    let xs = b.ident("xs");
    let zero = b.int(0);
    let first = b.index(xs, zero);
    let xs = b.ident("xs");
    let len = b.field_access(xs, "length");
    let sum = b.binary(BinaryOp::Add, first, len);
    let r = b.ret(Some(sum));
    b.method(store, Modifiers::empty(), Ty::Int, "get", &[(ints.clone(), "xs")], vec![r]);

    let xs = b.ident("xs");
    let next = b.call(None, "next", &[]);
    let slot = b.index(xs, next);
    let bump = b.unary(UnaryOp::PostInc, slot);
    let s = b.expr_stmt(bump);
    b.method(store, Modifiers::empty(), Ty::Void, "bump", &[(ints, "xs")], vec![s]);

    let two = b.int(2);
    let three = b.int(3);
    let grid = b.new_array(Ty::Int, &[two, three], 0);
    let r = b.ret(Some(grid));
    b.method(store, Modifiers::empty(), Ty::array_of(Ty::Int, 2), "grid", &[], vec![r]);

    let four = b.int(4);
    let row = b.new_array(Ty::OBJECT, &[four], 1);
    let r = b.ret(Some(row));
    b.method(store, Modifiers::empty(), Ty::array_of(Ty::OBJECT, 2), "row", &[], vec![r]);

    let xs = b.ident("xs");
    let i = b.ident("i");
    let slot = b.index(xs, i);
    let i = b.ident("i");
    let step = b.unary(UnaryOp::PostInc, i);
    let assign = b.assign(slot, step);
    let s = b.expr_stmt(assign);
    b.method(
        store,
        Modifiers::empty(),
        Ty::Void,
        "shift",
        &[(Ty::array_of(Ty::Int, 1), "xs"), (Ty::Int, "i")],
        vec![s],
    );

    let x = b.ident("x");
    let r = b.ret(Some(x));
    b.method(store, Modifiers::STATIC, Ty::Int, "twice", &[(Ty::Int, "x")], vec![r]);
    let this = b.this();
    let r = b.ret(Some(this));
    let store_ty = b.class_ty("Store");
    b.method(store, Modifiers::empty(), store_ty, "me", &[], vec![r]);
    let me = b.call(None, "me", &[]);
    let one = b.int(1);
    let twice = b.call(Some(me), "twice", &[one]);
    let r = b.ret(Some(twice));
    b.method(store, Modifiers::empty(), Ty::Int, "relay", &[], vec![r]);

    Analyzed::new(vec![b.finish()], interner)
}

#[test]
fn array_store_evaluates_value_once() {
    let interner = StringInterner::new();
    let analyzed = store(&interner);
    let lowered = analyzed.lower(&interner, &LowerOptions::default());
    let unit = &lowered[0];

    assert_eq!(
        method_body(unit, "Store", "put_0", &interner),
        vec![
            "{ int[] __tmp0 = __this->arr; int __tmp1 = i; \
             int __tmp2 = __this->vptr->next_0(__this); \
             arrayStoreCheck(__tmp0, __tmp1, __tmp2); __tmp0[__tmp1] = __tmp2 }"
        ]
    );

    let put = unit
        .class(interner.intern("Store"))
        .unwrap()
        .method(interner.intern("put_0"))
        .unwrap();
    let calls = exprs_in(&unit.arena, put.body)
        .into_iter()
        .filter(|&id| matches!(unit.arena.kind(id), LowExpr::VirtualCall { .. }))
        .count();
    assert_eq!(calls, 1);
}

#[test]
fn element_store_fixes_the_slot_before_the_value() {
    let interner = StringInterner::new();
    let analyzed = store(&interner);
    let lowered = analyzed.lower(&interner, &LowerOptions::default());

    assert_eq!(
        method_body(&lowered[0], "Store", "shift_0", &interner),
        vec![
            "{ int[] __tmp0 = xs; int __tmp1 = i; int __tmp2 = i++; \
             arrayStoreCheck(__tmp0, __tmp1, __tmp2); __tmp0[__tmp1] = __tmp2 }"
        ]
    );
}

#[test]
fn static_call_evaluates_impure_receiver() {
    let interner = StringInterner::new();
    let analyzed = store(&interner);
    let lowered = analyzed.lower(&interner, &LowerOptions::default());

    assert_eq!(
        method_body(&lowered[0], "Store", "relay_0", &interner),
        vec!["return { __this->vptr->me_0(__this); Store::twice_0(1) }"]
    );
}

#[test]
fn array_reads_are_checked() {
    let interner = StringInterner::new();
    let analyzed = store(&interner);
    let lowered = analyzed.lower(&interner, &LowerOptions::default());

    assert_eq!(
        method_body(&lowered[0], "Store", "get_0", &interner),
        vec![
            "return ({ arrayAccessCheck(xs, 0); xs[0] } + { checkNotNull(xs); xs->length })"
        ]
    );
}

#[test]
fn element_update_binds_impure_index() {
    let interner = StringInterner::new();
    let analyzed = store(&interner);
    let lowered = analyzed.lower(&interner, &LowerOptions::default());

    assert_eq!(
        method_body(&lowered[0], "Store", "bump_0", &interner),
        vec![
            "{ int[] __tmp0 = xs; int __tmp1 = __this->vptr->next_0(__this); \
             arrayAccessCheck(__tmp0, __tmp1); __tmp0[__tmp1]++ }"
        ]
    );
}

#[test]
fn nested_array_allocation_fills_each_level() {
    let interner = StringInterner::new();
    let analyzed = store(&interner);
    let lowered = analyzed.lower(&interner, &LowerOptions::default());

    assert_eq!(
        method_body(&lowered[0], "Store", "grid_0", &interner),
        vec![
            "return { int __tmp0 = checkNegativeIndex(2); int __tmp1 = checkNegativeIndex(3); \
             int[][] __tmp2 = new int[][__tmp0]; \
             for (int __tmp3 = 0; (__tmp3 < __tmp0); __tmp3++) { __tmp2[__tmp3] = new int[__tmp1] }; \
             __tmp2 }"
        ]
    );
    assert_eq!(
        method_body(&lowered[0], "Store", "row_0", &interner),
        vec!["return new Object[][checkNegativeIndex(4)]"]
    );
}

#[test]
fn checks_can_be_disabled() {
    let interner = StringInterner::new();
    let analyzed = store(&interner);
    let options = LowerOptions {
        null_checks: false,
        array_checks: false,
        ..LowerOptions::default()
    };
    let lowered = analyzed.lower(&interner, &options);

    assert_eq!(
        method_body(&lowered[0], "Store", "get_0", &interner),
        vec!["return (xs[0] + xs->length)"]
    );
    assert_eq!(
        method_body(&lowered[0], "Store", "put_0", &interner),
        vec![
            "{ int[] __tmp0 = __this->arr; int __tmp1 = i; \
             __tmp0[__tmp1] = __this->vptr->next_0(__this) }"
        ]
    );
    assert_eq!(
        method_body(&lowered[0], "Store", "shift_0", &interner),
        vec!["{ int[] __tmp0 = xs; int __tmp1 = i; __tmp0[__tmp1] = i++ }"]
    );
}

/// ```text
/// class Loose { void run(Mystery m) { m.go(1); vanish(); } }
/// ```
fn loose(interner: &StringInterner) -> Analyzed {
    let mut b = UnitBuilder::new(interner, "Loose.java");
    let loose = b.class("Loose", None);
    let m = b.ident("m");
    let one = b.int(1);
    let go = b.call(Some(m), "go", &[one]);
    let s0 = b.expr_stmt(go);
    let vanish = b.call(None, "vanish", &[]);
    let s1 = b.expr_stmt(vanish);
    let mystery = b.class_ty("Mystery");
    b.method(loose, Modifiers::empty(), Ty::Void, "run", &[(mystery, "m")], vec![s0, s1]);
    Analyzed::new(vec![b.finish()], interner)
}

#[test]
fn unresolved_calls_keep_source_names() {
    let interner = StringInterner::new();
    let analyzed = loose(&interner);
    let lowered = analyzed.lower(&interner, &LowerOptions::default());

    assert_eq!(
        method_body(&lowered[0], "Loose", "run_0", &interner),
        vec!["m.?go(1)", "?vanish()"]
    );
}

#[test]
fn strict_resolution_rejects_unresolved_calls() {
    let interner = StringInterner::new();
    let analyzed = loose(&interner);
    let options = LowerOptions::default().strict();
    let queries = analyzed.queries();
    let facts = analyzed.facts(&interner, &options);

    let err = crate::lower_unit(0, &analyzed.units[0], &queries[0], &facts, &interner, &options)
        .unwrap_err();
    assert!(matches!(
        err,
        LowerError::UnresolvedCall { method, .. } if method == interner.intern("go")
    ));
}

/// ```text
/// class Counter {
///     static int total = 10;
///     int hits;
///     void hit() { hits++; Counter.total = total + 1; if (hits > 3) return; }
/// }
/// ```
#[test]
fn field_references_are_explicit() {
    let interner = StringInterner::new();
    let mut b = UnitBuilder::new(&interner, "Counter.java");
    let counter = b.class("Counter", None);
    let ten = b.int(10);
    b.field(counter, Modifiers::STATIC, Ty::Int, "total", Some(ten));
    b.field(counter, Modifiers::empty(), Ty::Int, "hits", None);

    let hits = b.ident("hits");
    let inc = b.unary(UnaryOp::PostInc, hits);
    let s0 = b.expr_stmt(inc);
    let class = b.ident("Counter");
    let target = b.field_access(class, "total");
    let total = b.ident("total");
    let one = b.int(1);
    let sum = b.binary(BinaryOp::Add, total, one);
    let assign = b.assign(target, sum);
    let s1 = b.expr_stmt(assign);
    let hits = b.ident("hits");
    let three = b.int(3);
    let cond = b.binary(BinaryOp::Gt, hits, three);
    let ret = b.ret(None);
    let s2 = b.if_stmt(cond, ret, None);
    b.method(counter, Modifiers::empty(), Ty::Void, "hit", &[], vec![s0, s1, s2]);

    let analyzed = Analyzed::new(vec![b.finish()], &interner);
    let lowered = analyzed.lower(&interner, &LowerOptions::default());
    let unit = &lowered[0];

    assert_eq!(
        method_body(unit, "Counter", "hit_0", &interner),
        vec![
            "__this->hits++",
            "Counter::total = (Counter::total + 1)",
            "if ((__this->hits > 3)) return",
        ]
    );
    let class = unit.class(interner.intern("Counter")).unwrap();
    assert_eq!(unit.arena.kind(class.statics[0].init), &LowExpr::Int(10));
}

#[test]
fn temporaries_restart_per_method() {
    let interner = StringInterner::new();
    let analyzed = store(&interner);
    let lowered = analyzed.lower(&interner, &LowerOptions::default());

    let put = method_body(&lowered[0], "Store", "put_0", &interner);
    let bump = method_body(&lowered[0], "Store", "bump_0", &interner);
    assert!(put[0].contains("__tmp0"));
    assert!(bump[0].contains("__tmp0"));
    assert!(!bump[0].contains("__tmp2"));
}
