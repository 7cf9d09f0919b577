//! Array allocation, element access and element stores.
//!
//! Checks are explicit nodes placed before the unchecked operation inside a
//! statement-expression block. Operands that are not pure are bound to
//! temporaries first, so each source expression runs exactly once.

use clove_ir::{
    BinaryOp, CheckKind, ExprId, ExprRange, LowExpr, LowId, LowStmt, LowStmtId, Name, Span, Ty,
    UnaryOp,
};
use clove_types::TypeQuery;

use super::{Lowerer, RewriteCtx};
use crate::LowerError;

impl<Q: TypeQuery> Lowerer<'_, Q> {
    /// `new T[d0][d1]..[]`
    ///
    /// One dimension lowers to a checked allocation. Several sized
    /// dimensions bind each length to a temporary (left to right) and fill
    /// the outer array level by level. Unsized trailing dimensions only
    /// deepen the innermost element type.
    pub(crate) fn lower_new_array(
        &mut self,
        ctx: &mut RewriteCtx,
        elem: &Ty,
        dims: ExprRange,
        extra_dims: u8,
        span: Span,
    ) -> Result<LowId, LowerError> {
        let leaf = Ty::array_of(elem.clone(), usize::from(extra_dims));
        let src = self.src;
        let dims = src.expr_list(dims);

        if dims.is_empty() {
            return Err(LowerError::MissingAnnotation {
                method: Name::EMPTY,
                annotation: "array dimension",
                span,
            });
        }
        if let [dim] = dims {
            let length = self.lower_expr(ctx, *dim)?;
            let length = self.checked_length(length, span);
            return Ok(self.alloc(LowExpr::ArrayAlloc { elem: leaf, length }, span));
        }

        let mut stmts = Vec::with_capacity(dims.len() + 2);
        let mut lengths = Vec::with_capacity(dims.len());
        for &dim in dims {
            let length = self.lower_expr(ctx, dim)?;
            let length = self.checked_length(length, span);
            let (decl, name) = self.bind_temp(ctx, Ty::Int, length);
            stmts.push(decl);
            lengths.push(name);
        }
        let result = self.fill_levels(ctx, &leaf, &lengths, span, &mut stmts);
        Ok(self.block_expr(&stmts, result, span))
    }

    /// Allocate the level whose length is `lengths[0]`, filling each element
    /// with the next level. Returns the node evaluating to the array.
    fn fill_levels(
        &mut self,
        ctx: &mut RewriteCtx,
        leaf: &Ty,
        lengths: &[Name],
        span: Span,
        stmts: &mut Vec<LowStmtId>,
    ) -> LowId {
        let elem = Ty::array_of(leaf.clone(), lengths.len().saturating_sub(1));
        let length = self.alloc(LowExpr::Local(lengths[0]), span);
        let alloc = self.alloc(
            LowExpr::ArrayAlloc {
                elem: elem.clone(),
                length,
            },
            span,
        );
        if lengths.len() == 1 {
            return alloc;
        }

        let (decl, array) = self.bind_temp(ctx, Ty::Array(Box::new(elem)), alloc);
        stmts.push(decl);

        let zero = self.alloc(LowExpr::Int(0), span);
        let (counter_decl, counter) = self.bind_temp(ctx, Ty::Int, zero);
        let counter_ref = self.alloc(LowExpr::Local(counter), span);
        let bound = self.alloc(LowExpr::Local(lengths[0]), span);
        let cond = self.alloc(
            LowExpr::Binary {
                op: BinaryOp::Lt,
                left: counter_ref,
                right: bound,
            },
            span,
        );
        let counter_ref = self.alloc(LowExpr::Local(counter), span);
        let step = self.alloc(
            LowExpr::Unary {
                op: UnaryOp::PostInc,
                operand: counter_ref,
            },
            span,
        );

        let mut body = Vec::new();
        let inner = self.fill_levels(ctx, leaf, &lengths[1..], span, &mut body);
        let array_ref = self.alloc(LowExpr::Local(array), span);
        let counter_ref = self.alloc(LowExpr::Local(counter), span);
        let slot = self.alloc(
            LowExpr::Index {
                array: array_ref,
                index: counter_ref,
            },
            span,
        );
        let store = self.alloc(
            LowExpr::Assign {
                target: slot,
                value: inner,
            },
            span,
        );
        body.push(self.expr_stmt(store));
        let body = self.block_stmt(&body);

        let init = self.arena.alloc_stmt_list(&[counter_decl]);
        let update = self.arena.alloc_list(&[step]);
        let fill = self.stmt(LowStmt::For {
            init,
            cond,
            update,
            body,
        });
        stmts.push(fill);
        self.alloc(LowExpr::Local(array), span)
    }

    fn checked_length(&mut self, length: LowId, span: Span) -> LowId {
        if !self.options.array_checks {
            return length;
        }
        self.check(CheckKind::NegativeLength, &[length], span)
    }

    /// `a[i]` as an rvalue.
    pub(crate) fn lower_index(
        &mut self,
        ctx: &mut RewriteCtx,
        array: ExprId,
        index: ExprId,
        span: Span,
    ) -> Result<LowId, LowerError> {
        let mut stmts = Vec::new();
        let slot = self.checked_slot(ctx, array, index, span, &mut stmts)?;
        Ok(self.block_expr(&stmts, slot, span))
    }

    /// `a[i]++` and friends: the access check runs once before the update.
    pub(crate) fn lower_index_update(
        &mut self,
        ctx: &mut RewriteCtx,
        op: UnaryOp,
        array: ExprId,
        index: ExprId,
        span: Span,
    ) -> Result<LowId, LowerError> {
        let mut stmts = Vec::new();
        let slot = self.checked_slot(ctx, array, index, span, &mut stmts)?;
        let update = self.alloc(LowExpr::Unary { op, operand: slot }, span);
        Ok(self.block_expr(&stmts, update, span))
    }

    /// Element node for `a[i]`, preceded in `stmts` by the access check.
    ///
    /// The array is fixed before an impure index runs.
    fn checked_slot(
        &mut self,
        ctx: &mut RewriteCtx,
        array: ExprId,
        index: ExprId,
        span: Span,
        stmts: &mut Vec<LowStmtId>,
    ) -> Result<LowId, LowerError> {
        let array = self.operand_before(ctx, array, &Ty::OBJECT, index, stmts)?;
        if !self.options.array_checks {
            let array = self.use_operand(ctx, array, span)?;
            let index = self.lower_expr(ctx, index)?;
            return Ok(self.alloc(LowExpr::Index { array, index }, span));
        }
        let index = self.operand(ctx, index, &Ty::Int, stmts)?;

        let check_array = self.use_operand(ctx, array, span)?;
        let check_index = self.use_operand(ctx, index, span)?;
        let check = self.check(CheckKind::ArrayAccess, &[check_array, check_index], span);
        stmts.push(self.expr_stmt(check));

        let array = self.use_operand(ctx, array, span)?;
        let index = self.use_operand(ctx, index, span)?;
        Ok(self.alloc(LowExpr::Index { array, index }, span))
    }

    /// Assignment. An element store fixes the array and index, evaluates
    /// the value once into a temporary, checks it against the array, then
    /// stores it.
    pub(crate) fn lower_assign(
        &mut self,
        ctx: &mut RewriteCtx,
        target: ExprId,
        value: ExprId,
        span: Span,
    ) -> Result<LowId, LowerError> {
        let src = self.src;
        let clove_ir::ExprKind::Index { array, index } = *src.kind(target) else {
            let target = self.lower_expr(ctx, target)?;
            let value = self.lower_expr(ctx, value)?;
            return Ok(self.alloc(LowExpr::Assign { target, value }, span));
        };

        let mut stmts = Vec::new();
        let array_ty = self.type_or(array, &Ty::OBJECT);
        let array_op = self.operand_before(ctx, array, &array_ty, value, &mut stmts)?;
        let index_op = self.operand_before(ctx, index, &Ty::Int, value, &mut stmts)?;

        if !self.options.array_checks {
            let array = self.use_operand(ctx, array_op, span)?;
            let index = self.use_operand(ctx, index_op, span)?;
            let slot = self.alloc(LowExpr::Index { array, index }, span);
            let value = self.lower_expr(ctx, value)?;
            let store = self.alloc(LowExpr::Assign { target: slot, value }, span);
            return Ok(self.block_expr(&stmts, store, span));
        }

        let stored = self.lower_expr(ctx, value)?;
        let ty = array_ty
            .element()
            .cloned()
            .unwrap_or_else(|| self.type_or(value, &Ty::OBJECT));
        let (decl, temp) = self.bind_temp(ctx, ty, stored);
        stmts.push(decl);

        let check_array = self.use_operand(ctx, array_op, span)?;
        let check_index = self.use_operand(ctx, index_op, span)?;
        let check_value = self.alloc(LowExpr::Local(temp), span);
        let check = self.check(
            CheckKind::ArrayStore,
            &[check_array, check_index, check_value],
            span,
        );
        stmts.push(self.expr_stmt(check));

        let array = self.use_operand(ctx, array_op, span)?;
        let index = self.use_operand(ctx, index_op, span)?;
        let slot = self.alloc(LowExpr::Index { array, index }, span);
        let value = self.alloc(LowExpr::Local(temp), span);
        let store = self.alloc(LowExpr::Assign { target: slot, value }, span);
        Ok(self.block_expr(&stmts, store, span))
    }
}
