//! Debug-mode validation of lowered units.
//!
//! Asserts the invariants later stages rely on:
//! - every `LowId` and `LowStmtId` a node holds resolves in the arena
//! - every range lies within its list storage
//! - each class's data starts with the vtable pointer, and its default
//!   constructor sets the vtable pointer last
//! - vtable bindings line up one-to-one with slots
//! - every check node carries its runtime function's arity
//!
//! Enabled only in debug builds (`debug_assert!`).

use clove_ir::{
    ClassLayout, DataMember, LowArena, LowExpr, LowId, LowRange, LowStmt, LowStmtId,
    LowStmtRange, LoweredUnit, MemberInit,
};

/// Validate a lowered unit. Panics with a descriptive message on the first
/// broken invariant.
pub fn validate(unit: &LoweredUnit) {
    let arena = &unit.arena;

    for i in 0..arena.expr_count() {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "arena indices always fit u32"
        )]
        let id = LowId::new(i as u32);
        validate_expr(arena, id, arena.kind(id));
    }
    for i in 0..arena.stmt_count() {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "arena indices always fit u32"
        )]
        let id = LowStmtId::new(i as u32);
        validate_stmt(arena, id, arena.stmt(id));
    }
    for class in &unit.classes {
        validate_class(arena, class);
    }
}

fn validate_class(arena: &LowArena, class: &ClassLayout) {
    debug_assert!(
        matches!(class.data.first(), Some(DataMember::VtablePtr)),
        "{:?}: data must start with the vtable pointer",
        class.name,
    );
    debug_assert!(
        matches!(class.default_ctor.members.last(), Some(MemberInit::VtablePtr)),
        "{:?}: default constructor must set the vtable pointer last",
        class.name,
    );
    debug_assert_eq!(
        class.vtable.slots.len(),
        class.vtable_init.bindings.len(),
        "{:?}: one binding per vtable slot",
        class.name,
    );
    for (slot, binding) in class.vtable.slots.iter().zip(&class.vtable_init.bindings) {
        debug_assert_eq!(slot.name, binding.slot, "{:?}: binding out of slot order", class.name);
    }
    for storage in &class.statics {
        validate_id(arena, "static initializer", storage.init);
    }
    for member in &class.default_ctor.members {
        if let MemberInit::Field { value, .. } = member {
            validate_id(arena, "default member", *value);
        }
    }
    for routine in class.init_routines.iter().chain(&class.methods) {
        debug_assert!(
            routine.body.index() < arena.stmt_count(),
            "{:?}::{:?} body out of bounds",
            class.name,
            routine.name,
        );
    }
}

fn validate_expr(arena: &LowArena, id: LowId, kind: &LowExpr) {
    let what = "expression child";
    match kind {
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

        LowExpr::Field { object: child, .. }
        | LowExpr::ArrayLength(child)
        | LowExpr::Unary { operand: child, .. }
        | LowExpr::Cast { expr: child, .. }
        | LowExpr::InstanceOf { expr: child, .. }
        | LowExpr::ArrayAlloc { length: child, .. } => validate_id(arena, what, *child),

        LowExpr::Index { array: a, index: b }
        | LowExpr::Assign {
            target: a,
            value: b,
        }
        | LowExpr::Binary {
            left: a, right: b, ..
        } => {
            validate_id(arena, what, *a);
            validate_id(arena, what, *b);
        }

        LowExpr::VirtualCall { receiver, args, .. } | LowExpr::DirectCall { receiver, args, .. } => {
            validate_id(arena, what, *receiver);
            validate_range(arena, *args);
            debug_assert!(
                !args.is_empty(),
                "LowNode({}): instance call without receiver argument",
                id.raw(),
            );
        }
        LowExpr::UnresolvedCall { receiver, args, .. } => {
            if receiver.is_valid() {
                validate_id(arena, what, *receiver);
            }
            validate_range(arena, *args);
        }
        LowExpr::InitCall { args, .. } => {
            validate_range(arena, *args);
            debug_assert!(
                !args.is_empty(),
                "LowNode({}): __init without an object",
                id.raw(),
            );
        }
        LowExpr::QualifiedCall { args, .. } | LowExpr::Print { args, .. } => {
            validate_range(arena, *args);
        }
        LowExpr::Check { kind, args } => {
            validate_range(arena, *args);
            debug_assert_eq!(
                args.len(),
                kind.arity(),
                "LowNode({}): {} arity",
                id.raw(),
                kind.runtime_name(),
            );
        }
        LowExpr::Block { stmts, result } => {
            validate_stmt_range(arena, *stmts);
            validate_id(arena, what, *result);
        }
    }
}

fn validate_stmt(arena: &LowArena, id: LowStmtId, stmt: &LowStmt) {
    let what = "statement child";
    match stmt {
        LowStmt::Expr(expr) => validate_id(arena, what, *expr),
        LowStmt::Local { init, .. } | LowStmt::Return(init) => {
            if init.is_valid() {
                validate_id(arena, what, *init);
            }
        }
        LowStmt::Block(range) => validate_stmt_range(arena, *range),
        LowStmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            validate_id(arena, what, *cond);
            validate_stmt_id(arena, id, *then_branch);
            if else_branch.is_valid() {
                validate_stmt_id(arena, id, *else_branch);
            }
        }
        LowStmt::While { cond, body } => {
            validate_id(arena, what, *cond);
            validate_stmt_id(arena, id, *body);
        }
        LowStmt::For {
            init,
            cond,
            update,
            body,
        } => {
            validate_stmt_range(arena, *init);
            if cond.is_valid() {
                validate_id(arena, what, *cond);
            }
            validate_range(arena, *update);
            validate_stmt_id(arena, id, *body);
        }
    }
}

fn validate_id(arena: &LowArena, what: &str, child: LowId) {
    debug_assert!(
        child.index() < arena.expr_count(),
        "{what} references LowId({}) but arena has {} nodes",
        child.raw(),
        arena.expr_count(),
    );
}

fn validate_stmt_id(arena: &LowArena, parent: LowStmtId, child: LowStmtId) {
    debug_assert!(
        child.index() < arena.stmt_count(),
        "LowStmt({}) references LowStmt({}) but arena has {} statements",
        parent.raw(),
        child.raw(),
        arena.stmt_count(),
    );
}

fn validate_range(arena: &LowArena, range: LowRange) {
    debug_assert!(
        range.window().end <= arena.list_storage_len(),
        "LowRange {:?} exceeds list storage ({})",
        range,
        arena.list_storage_len(),
    );
    if range.window().end > arena.list_storage_len() {
        return;
    }
    for &child in arena.list(range) {
        validate_id(arena, "list element", child);
    }
}

fn validate_stmt_range(arena: &LowArena, range: LowStmtRange) {
    debug_assert!(
        range.window().end <= arena.stmt_list_storage_len(),
        "LowStmtRange {:?} exceeds statement list storage ({})",
        range,
        arena.stmt_list_storage_len(),
    );
    if range.window().end > arena.stmt_list_storage_len() {
        return;
    }
    for &child in arena.stmt_list(range) {
        debug_assert!(
            child.index() < arena.stmt_count(),
            "statement list references LowStmt({}) but arena has {} statements",
            child.raw(),
            arena.stmt_count(),
        );
    }
}
