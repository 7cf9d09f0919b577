//! Storage for lowered nodes.
//!
//! Built fresh by each unit's lowering; the source [`ExprArena`](crate::ast::ExprArena)
//! is never written.

use super::{LowExpr, LowNode, LowStmt};
use crate::ids::{to_u16, to_u32};
use crate::{LowId, LowRange, LowStmtId, LowStmtRange, Span};

#[derive(Clone, Debug, Default)]
pub struct LowArena {
    exprs: Vec<LowNode>,
    stmts: Vec<LowStmt>,
    expr_lists: Vec<LowId>,
    stmt_lists: Vec<LowStmtId>,
}

impl LowArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, kind: LowExpr, span: Span) -> LowId {
        let id = LowId::new(to_u32(self.exprs.len(), "lowered expressions"));
        self.exprs.push(LowNode { kind, span });
        id
    }

    pub fn alloc_stmt(&mut self, stmt: LowStmt) -> LowStmtId {
        let id = LowStmtId::new(to_u32(self.stmts.len(), "lowered statements"));
        self.stmts.push(stmt);
        id
    }

    pub fn alloc_list(&mut self, ids: &[LowId]) -> LowRange {
        if ids.is_empty() {
            return LowRange::EMPTY;
        }
        let start = to_u32(self.expr_lists.len(), "lowered expression lists");
        self.expr_lists.extend_from_slice(ids);
        LowRange::new(start, to_u16(ids.len(), "lowered expression list"))
    }

    pub fn alloc_stmt_list(&mut self, ids: &[LowStmtId]) -> LowStmtRange {
        if ids.is_empty() {
            return LowStmtRange::EMPTY;
        }
        let start = to_u32(self.stmt_lists.len(), "lowered statement lists");
        self.stmt_lists.extend_from_slice(ids);
        LowStmtRange::new(start, to_u16(ids.len(), "lowered statement list"))
    }

    #[inline]
    pub fn kind(&self, id: LowId) -> &LowExpr {
        &self.exprs[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: LowId) -> Span {
        self.exprs[id.index()].span
    }

    #[inline]
    pub fn stmt(&self, id: LowStmtId) -> &LowStmt {
        &self.stmts[id.index()]
    }

    pub fn list(&self, range: LowRange) -> &[LowId] {
        &self.expr_lists[range.window()]
    }

    pub fn stmt_list(&self, range: LowStmtRange) -> &[LowStmtId] {
        &self.stmt_lists[range.window()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    /// Total length of the flattened expression-list storage.
    pub fn list_storage_len(&self) -> usize {
        self.expr_lists.len()
    }

    /// Total length of the flattened statement-list storage.
    pub fn stmt_list_storage_len(&self) -> usize {
        self.stmt_lists.len()
    }
}
