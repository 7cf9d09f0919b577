//! Source statements.

use crate::{ExprId, ExprRange, Name, Span, StmtId, StmtRange, Ty};

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Expr(ExprId),
    /// `ty name = init;` (`init` may be `ExprId::INVALID`).
    Local {
        name: Name,
        ty: Ty,
        init: ExprId,
    },
    Block(StmtRange),
    If {
        cond: ExprId,
        then_branch: StmtId,
        else_branch: StmtId,
    },
    While {
        cond: ExprId,
        body: StmtId,
    },
    For {
        init: StmtRange,
        cond: ExprId,
        update: ExprRange,
        body: StmtId,
    },
    /// `return expr;` (`ExprId::INVALID` for a bare `return;`).
    Return(ExprId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}
