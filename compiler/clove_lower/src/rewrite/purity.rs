//! Side-effect freedom of source expressions.

use clove_ir::{ExprArena, ExprId, ExprKind};

/// True if evaluating `id` twice is indistinguishable from evaluating it
/// once: literals, names, the receiver, and field reads off such values.
pub(crate) fn is_pure(arena: &ExprArena, id: ExprId) -> bool {
    match arena.kind(id) {
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Bool(_)
        | ExprKind::Char(_)
        | ExprKind::Str(_)
        | ExprKind::Null
        | ExprKind::Ident(_)
        | ExprKind::This
        | ExprKind::Super => true,
        ExprKind::Field { receiver, .. } => is_pure(arena, *receiver),
        ExprKind::Call { .. }
        | ExprKind::CtorChain { .. }
        | ExprKind::New { .. }
        | ExprKind::NewArray { .. }
        | ExprKind::Index { .. }
        | ExprKind::Assign { .. }
        | ExprKind::Binary { .. }
        | ExprKind::Unary { .. }
        | ExprKind::Cast { .. }
        | ExprKind::InstanceOf { .. } => false,
    }
}

/// True for literals, whose value no other evaluation can change.
pub(crate) fn is_constant(arena: &ExprArena, id: ExprId) -> bool {
    matches!(
        arena.kind(id),
        ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Bool(_)
            | ExprKind::Char(_)
            | ExprKind::Str(_)
            | ExprKind::Null
    )
}
