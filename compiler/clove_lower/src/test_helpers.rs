//! Shared fixtures for lowering tests.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use clove_ir::{
    CompilationUnit, LowArena, LowExpr, LowId, LowStmt, LowStmtId, LoweredUnit, Modifiers,
    StringInterner, Ty, UnaryOp, UnitBuilder,
};
use clove_types::{check_unit, ClassTable, TypedUnit, UnitQuery};

use crate::{lower_unit, LowerOptions, ProgramFacts};

/// Units with their class table and annotations.
pub(crate) struct Analyzed {
    pub units: Vec<CompilationUnit>,
    pub table: ClassTable,
    pub typed: Vec<TypedUnit>,
}

impl Analyzed {
    pub fn new(units: Vec<CompilationUnit>, interner: &StringInterner) -> Self {
        let table = ClassTable::build(&units, interner);
        let typed = units
            .iter()
            .enumerate()
            .map(|(index, unit)| check_unit(&table, index, unit))
            .collect();
        Analyzed {
            units,
            table,
            typed,
        }
    }

    pub fn queries(&self) -> Vec<UnitQuery<'_>> {
        self.typed
            .iter()
            .map(|typed| UnitQuery::new(&self.table, typed))
            .collect()
    }

    pub fn facts(&self, interner: &StringInterner, options: &LowerOptions) -> ProgramFacts {
        ProgramFacts::analyze(&self.table, &self.units, &self.queries(), interner, options)
            .unwrap()
    }

    pub fn lower(&self, interner: &StringInterner, options: &LowerOptions) -> Vec<LoweredUnit> {
        let queries = self.queries();
        let facts = self.facts(interner, options);
        self.units
            .iter()
            .zip(&queries)
            .enumerate()
            .map(|(index, (unit, query))| {
                lower_unit(index, unit, query, &facts, interner, options).unwrap()
            })
            .collect()
    }
}

/// ```text
/// package zoo;
/// class Animal {
///     int legs = 4;
///     String name;
///     static int count;
///     String speak() { return "..."; }
///     private void secret() {}
///     static Animal make() { return new Dog(); }
///     void poke() { secret(); speak(); }
/// }
/// class Dog extends Animal {
///     int legs = 3;
///     boolean good = true;
///     String speak() { super.speak(); return "woof"; }
/// }
/// class Main {
///     static void main(String[] args) {
///         Animal a = new Dog();
///         a.speak();
///         Animal.make().speak();
///         System.out.println(a.speak());
///     }
/// }
/// ```
pub(crate) fn zoo(interner: &StringInterner) -> CompilationUnit {
    let mut b = UnitBuilder::new(interner, "zoo/Zoo.java");
    b.package("zoo");
    let animal_ty = b.class_ty("Animal");

    let animal = b.class("Animal", None);
    let four = b.int(4);
    b.field(animal, Modifiers::empty(), Ty::Int, "legs", Some(four));
    b.field(animal, Modifiers::empty(), Ty::STRING, "name", None);
    b.field(animal, Modifiers::STATIC, Ty::Int, "count", None);
    let dots = b.str("...");
    let ret = b.ret(Some(dots));
    b.method(animal, Modifiers::empty(), Ty::STRING, "speak", &[], vec![ret]);
    b.method(animal, Modifiers::PRIVATE, Ty::Void, "secret", &[], vec![]);
    let dog = b.new_object("Dog", &[]);
    let ret = b.ret(Some(dog));
    b.method(animal, Modifiers::STATIC, animal_ty.clone(), "make", &[], vec![ret]);
    let secret = b.call(None, "secret", &[]);
    let s0 = b.expr_stmt(secret);
    let speak = b.call(None, "speak", &[]);
    let s1 = b.expr_stmt(speak);
    b.method(animal, Modifiers::empty(), Ty::Void, "poke", &[], vec![s0, s1]);

    let dog = b.class("Dog", Some("Animal"));
    let three = b.int(3);
    b.field(dog, Modifiers::empty(), Ty::Int, "legs", Some(three));
    let yes = b.bool(true);
    b.field(dog, Modifiers::empty(), Ty::Boolean, "good", Some(yes));
    let sup = b.super_ref();
    let up = b.call(Some(sup), "speak", &[]);
    let s0 = b.expr_stmt(up);
    let woof = b.str("woof");
    let s1 = b.ret(Some(woof));
    b.method(dog, Modifiers::empty(), Ty::STRING, "speak", &[], vec![s0, s1]);

    let main = b.class("Main", None);
    let new_dog = b.new_object("Dog", &[]);
    let s0 = b.local(animal_ty, "a", Some(new_dog));
    let a = b.ident("a");
    let call = b.call(Some(a), "speak", &[]);
    let s1 = b.expr_stmt(call);
    let class = b.ident("Animal");
    let made = b.call(Some(class), "make", &[]);
    let call = b.call(Some(made), "speak", &[]);
    let s2 = b.expr_stmt(call);
    let a = b.ident("a");
    let call = b.call(Some(a), "speak", &[]);
    let print = b.println(&[call]);
    let s3 = b.expr_stmt(print);
    b.method(
        main,
        Modifiers::STATIC,
        Ty::Void,
        "main",
        &[(Ty::array_of(Ty::STRING, 1), "args")],
        vec![s0, s1, s2, s3],
    );
    b.finish()
}

/// Statements of a lowered body, one sketch per top-level statement.
pub(crate) fn sketch_body(arena: &LowArena, body: LowStmtId, interner: &StringInterner) -> Vec<String> {
    match arena.stmt(body) {
        LowStmt::Block(range) => arena
            .stmt_list(*range)
            .iter()
            .map(|&stmt| sketch_stmt(arena, stmt, interner))
            .collect(),
        _ => vec![sketch_stmt(arena, body, interner)],
    }
}

/// Every expression node reachable from `body`, pre-order.
pub(crate) fn exprs_in(arena: &LowArena, body: LowStmtId) -> Vec<LowId> {
    let mut out = Vec::new();
    collect_stmt(arena, body, &mut out);
    out
}

fn collect_stmt(arena: &LowArena, id: LowStmtId, out: &mut Vec<LowId>) {
    if !id.is_valid() {
        return;
    }
    match arena.stmt(id) {
        LowStmt::Expr(e) | LowStmt::Return(e) | LowStmt::Local { init: e, .. } => {
            collect_expr(arena, *e, out);
        }
        LowStmt::Block(range) => {
            for &stmt in arena.stmt_list(*range) {
                collect_stmt(arena, stmt, out);
            }
        }
        LowStmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            collect_expr(arena, *cond, out);
            collect_stmt(arena, *then_branch, out);
            collect_stmt(arena, *else_branch, out);
        }
        LowStmt::While { cond, body } => {
            collect_expr(arena, *cond, out);
            collect_stmt(arena, *body, out);
        }
        LowStmt::For {
            init,
            cond,
            update,
            body,
        } => {
            for &stmt in arena.stmt_list(*init) {
                collect_stmt(arena, stmt, out);
            }
            collect_expr(arena, *cond, out);
            for &e in arena.list(*update) {
                collect_expr(arena, e, out);
            }
            collect_stmt(arena, *body, out);
        }
    }
}

fn collect_expr(arena: &LowArena, id: LowId, out: &mut Vec<LowId>) {
    if !id.is_valid() {
        return;
    }
    out.push(id);
    match arena.kind(id) {
        LowExpr::Field { object: c, .. }
        | LowExpr::ArrayLength(c)
        | LowExpr::Unary { operand: c, .. }
        | LowExpr::Cast { expr: c, .. }
        | LowExpr::InstanceOf { expr: c, .. }
        | LowExpr::ArrayAlloc { length: c, .. } => collect_expr(arena, *c, out),
        LowExpr::Index { array: a, index: b }
        | LowExpr::Assign {
            target: a,
            value: b,
        }
        | LowExpr::Binary {
            left: a, right: b, ..
        } => {
            collect_expr(arena, *a, out);
            collect_expr(arena, *b, out);
        }
        LowExpr::VirtualCall { receiver, args, .. }
        | LowExpr::DirectCall { receiver, args, .. }
        | LowExpr::UnresolvedCall { receiver, args, .. } => {
            collect_expr(arena, *receiver, out);
            for &arg in arena.list(*args) {
                collect_expr(arena, arg, out);
            }
        }
        LowExpr::InitCall { args, .. }
        | LowExpr::QualifiedCall { args, .. }
        | LowExpr::Check { args, .. }
        | LowExpr::Print { args, .. } => {
            for &arg in arena.list(*args) {
                collect_expr(arena, arg, out);
            }
        }
        LowExpr::Block { stmts, result } => {
            for &stmt in arena.stmt_list(*stmts) {
                collect_stmt(arena, stmt, out);
            }
            collect_expr(arena, *result, out);
        }
        LowExpr::Int(_)
        | LowExpr::Float(_)
        | LowExpr::Bool(_)
        | LowExpr::Char(_)
        | LowExpr::Str(_)
        | LowExpr::Null
        | LowExpr::Local(_)
        | LowExpr::StaticField { .. }
        | LowExpr::Alloc { .. }
        | LowExpr::TypeIdentity { .. } => {}
    }
}

/// Compact, C-like rendering of a lowered statement for assertions.
pub(crate) fn sketch_stmt(arena: &LowArena, id: LowStmtId, interner: &StringInterner) -> String {
    let e = |id: LowId| sketch(arena, id, interner);
    let s = |id: LowStmtId| sketch_stmt(arena, id, interner);
    match arena.stmt(id) {
        LowStmt::Expr(expr) => e(*expr),
        LowStmt::Local { name, ty, init } if init.is_valid() => {
            format!("{} {} = {}", sketch_ty(ty, interner), interner.lookup(*name), e(*init))
        }
        LowStmt::Local { name, ty, .. } => {
            format!("{} {}", sketch_ty(ty, interner), interner.lookup(*name))
        }
        LowStmt::Block(range) => {
            let stmts: Vec<String> = arena.stmt_list(*range).iter().map(|&st| s(st)).collect();
            format!("{{ {} }}", stmts.join("; "))
        }
        LowStmt::If {
            cond,
            then_branch,
            else_branch,
        } if else_branch.is_valid() => {
            format!("if ({}) {} else {}", e(*cond), s(*then_branch), s(*else_branch))
        }
        LowStmt::If {
            cond, then_branch, ..
        } => format!("if ({}) {}", e(*cond), s(*then_branch)),
        LowStmt::While { cond, body } => format!("while ({}) {}", e(*cond), s(*body)),
        LowStmt::For {
            init,
            cond,
            update,
            body,
        } => {
            let init: Vec<String> = arena.stmt_list(*init).iter().map(|&st| s(st)).collect();
            let update: Vec<String> = arena.list(*update).iter().map(|&u| e(u)).collect();
            let cond = if cond.is_valid() { e(*cond) } else { String::new() };
            format!(
                "for ({}; {}; {}) {}",
                init.join(", "),
                cond,
                update.join(", "),
                s(*body)
            )
        }
        LowStmt::Return(value) if value.is_valid() => format!("return {}", e(*value)),
        LowStmt::Return(_) => "return".to_owned(),
    }
}

/// Compact, C-like rendering of a lowered expression for assertions.
pub(crate) fn sketch(arena: &LowArena, id: LowId, interner: &StringInterner) -> String {
    let e = |id: LowId| sketch(arena, id, interner);
    let n = |name| interner.lookup(name);
    let list = |range| {
        arena
            .list(range)
            .iter()
            .map(|&arg| e(arg))
            .collect::<Vec<_>>()
            .join(", ")
    };
    match arena.kind(id) {
        LowExpr::Int(v) => v.to_string(),
        LowExpr::Float(bits) => f64::from_bits(*bits).to_string(),
        LowExpr::Bool(v) => v.to_string(),
        LowExpr::Char(c) => format!("{c:?}"),
        LowExpr::Str(s) => format!("{:?}", n(*s)),
        LowExpr::Null => "null".to_owned(),
        LowExpr::Local(name) => n(*name).to_owned(),
        LowExpr::Field { object, field } => format!("{}->{}", e(*object), n(*field)),
        LowExpr::StaticField { class, field } => format!("{}::{}", n(*class), n(*field)),
        LowExpr::ArrayLength(array) => format!("{}->length", e(*array)),
        LowExpr::Index { array, index } => format!("{}[{}]", e(*array), e(*index)),
        LowExpr::Assign { target, value } => format!("{} = {}", e(*target), e(*value)),
        LowExpr::Binary { op, left, right } => {
            format!("({} {} {})", e(*left), op.as_symbol(), e(*right))
        }
        LowExpr::Unary { op, operand } => match op {
            UnaryOp::Neg => format!("-{}", e(*operand)),
            UnaryOp::Not => format!("!{}", e(*operand)),
            UnaryOp::PreInc => format!("++{}", e(*operand)),
            UnaryOp::PreDec => format!("--{}", e(*operand)),
            UnaryOp::PostInc => format!("{}++", e(*operand)),
            UnaryOp::PostDec => format!("{}--", e(*operand)),
        },
        LowExpr::Cast { ty, expr } => format!("({}) {}", sketch_ty(ty, interner), e(*expr)),
        LowExpr::InstanceOf { expr, class } => format!("{} instanceof {}", e(*expr), n(*class)),
        LowExpr::Alloc { class } => format!("new {}", n(*class)),
        LowExpr::InitCall { class, args } => format!("{}::__init({})", n(*class), list(*args)),
        LowExpr::VirtualCall {
            receiver,
            slot,
            args,
        } => format!("{}->vptr->{}({})", e(*receiver), n(*slot), list(*args)),
        LowExpr::QualifiedCall {
            class,
            method,
            args,
        } => format!("{}::{}({})", n(*class), n(*method), list(*args)),
        LowExpr::DirectCall {
            receiver,
            method,
            args,
        } => format!("{}.{}({})", e(*receiver), n(*method), list(*args)),
        LowExpr::UnresolvedCall {
            receiver,
            method,
            args,
        } if receiver.is_valid() => format!("{}.?{}({})", e(*receiver), n(*method), list(*args)),
        LowExpr::UnresolvedCall { method, args, .. } => format!("?{}({})", n(*method), list(*args)),
        LowExpr::Check { kind, args } => format!("{}({})", kind.runtime_name(), list(*args)),
        LowExpr::ArrayAlloc { elem, length } => {
            format!("new {}[{}]", sketch_ty(elem, interner), e(*length))
        }
        LowExpr::TypeIdentity { class } => format!("{}::class", n(*class)),
        LowExpr::Print { args, newline } => {
            let name = if *newline { "println" } else { "print" };
            format!("{name}({})", list(*args))
        }
        LowExpr::Block { stmts, result } => {
            let mut parts: Vec<String> = arena
                .stmt_list(*stmts)
                .iter()
                .map(|&st| sketch_stmt(arena, st, interner))
                .collect();
            parts.push(e(*result));
            format!("{{ {} }}", parts.join("; "))
        }
    }
}

pub(crate) fn sketch_ty(ty: &Ty, interner: &StringInterner) -> String {
    match ty {
        Ty::Void => "void".to_owned(),
        Ty::Boolean => "boolean".to_owned(),
        Ty::Byte => "byte".to_owned(),
        Ty::Char => "char".to_owned(),
        Ty::Short => "short".to_owned(),
        Ty::Int => "int".to_owned(),
        Ty::Long => "long".to_owned(),
        Ty::Float => "float".to_owned(),
        Ty::Double => "double".to_owned(),
        Ty::Null => "null".to_owned(),
        Ty::Class(name) => interner.lookup(*name).to_owned(),
        Ty::Array(elem) => format!("{}[]", sketch_ty(elem, interner)),
    }
}
