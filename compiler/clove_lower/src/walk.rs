//! Read-only pre-order traversal of source bodies.

use clove_ir::{ExprArena, ExprId, ExprKind, StmtId, StmtKind};

pub(crate) fn walk_stmt(arena: &ExprArena, id: StmtId, f: &mut impl FnMut(ExprId)) {
    if !id.is_valid() {
        return;
    }
    match arena.stmt_kind(id) {
        StmtKind::Expr(expr) | StmtKind::Return(expr) => walk_expr(arena, *expr, f),
        StmtKind::Local { init, .. } => walk_expr(arena, *init, f),
        StmtKind::Block(range) => {
            for &stmt in arena.stmt_list(*range) {
                walk_stmt(arena, stmt, f);
            }
        }
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            walk_expr(arena, *cond, f);
            walk_stmt(arena, *then_branch, f);
            walk_stmt(arena, *else_branch, f);
        }
        StmtKind::While { cond, body } => {
            walk_expr(arena, *cond, f);
            walk_stmt(arena, *body, f);
        }
        StmtKind::For {
            init,
            cond,
            update,
            body,
        } => {
            for &stmt in arena.stmt_list(*init) {
                walk_stmt(arena, stmt, f);
            }
            walk_expr(arena, *cond, f);
            for &expr in arena.expr_list(*update) {
                walk_expr(arena, expr, f);
            }
            walk_stmt(arena, *body, f);
        }
    }
}

pub(crate) fn walk_expr(arena: &ExprArena, id: ExprId, f: &mut impl FnMut(ExprId)) {
    if !id.is_valid() {
        return;
    }
    f(id);
    match arena.kind(id) {
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Bool(_)
        | ExprKind::Char(_)
        | ExprKind::Str(_)
        | ExprKind::Null
        | ExprKind::Ident(_)
        | ExprKind::This
        | ExprKind::Super => {}
        ExprKind::Field { receiver, .. } => walk_expr(arena, *receiver, f),
        ExprKind::Call { receiver, args, .. } => {
            walk_expr(arena, *receiver, f);
            for &arg in arena.expr_list(*args) {
                walk_expr(arena, arg, f);
            }
        }
        ExprKind::CtorChain { args, .. } | ExprKind::New { args, .. } => {
            for &arg in arena.expr_list(*args) {
                walk_expr(arena, arg, f);
            }
        }
        ExprKind::NewArray { dims, .. } => {
            for &dim in arena.expr_list(*dims) {
                walk_expr(arena, dim, f);
            }
        }
        ExprKind::Index { array, index } => {
            walk_expr(arena, *array, f);
            walk_expr(arena, *index, f);
        }
        ExprKind::Assign { target, value } => {
            walk_expr(arena, *target, f);
            walk_expr(arena, *value, f);
        }
        ExprKind::Binary { left, right, .. } => {
            walk_expr(arena, *left, f);
            walk_expr(arena, *right, f);
        }
        ExprKind::Unary { operand, .. } => walk_expr(arena, *operand, f),
        ExprKind::Cast { expr, .. } | ExprKind::InstanceOf { expr, .. } => {
            walk_expr(arena, *expr, f);
        }
    }
}
