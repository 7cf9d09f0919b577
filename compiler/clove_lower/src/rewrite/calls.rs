//! Call lowering.
//!
//! | Source | Dispatch | Lowered |
//! |--------|----------|---------|
//! | `r.m(a)` | virtual | `checkNotNull(r); r->__vptr->slot(r, a)` |
//! | `m(a)` | virtual | `__this->__vptr->slot(__this, a)` |
//! | `r.m(a)` | direct | `r->m_k(r, a)` |
//! | `super.m(a)` | direct | `__Parent::m_k(__this, a)` |
//! | `C.m(a)`, `m(a)` | static | `__C::m_k(a)` |
//! | `e.m(a)`, `e` impure | static | `e; __C::m_k(a)` |
//! | `new C(a)` | | `__C::__init(new __C(), a)` |
//! | `this(a)`, `super(a)` | | `__C::__init(__this, a)` |
//! | `System.out.println(a)` | | console output |
//!
//! An impure receiver is bound to a temporary before the check so it is
//! evaluated once.

use clove_ir::{ChainTarget, ExprId, ExprKind, ExprRange, LowExpr, LowId, Name, Span};
use clove_types::{DispatchKind, IdentRes, TypeQuery};
use tracing::{debug, warn};

use super::{purity, Lowerer, Operand, RewriteCtx};
use crate::mangle::CallTarget;
use crate::LowerError;

impl<Q: TypeQuery> Lowerer<'_, Q> {
    pub(crate) fn lower_call(
        &mut self,
        ctx: &mut RewriteCtx,
        id: ExprId,
    ) -> Result<LowId, LowerError> {
        let src = self.src;
        let span = src.span(id);
        let ExprKind::Call {
            receiver,
            method,
            args,
        } = *src.kind(id)
        else {
            return Err(LowerError::MissingAnnotation {
                method: Name::EMPTY,
                annotation: "call expression",
                span,
            });
        };

        if self.is_console_output(receiver, method) {
            let args = self.lower_list(ctx, args)?;
            let args = self.arena.alloc_list(&args);
            return Ok(self.alloc(
                LowExpr::Print {
                    args,
                    newline: method == Name::PRINTLN,
                },
                span,
            ));
        }

        let Some(target) = self.calls.target(id) else {
            return self.lower_unresolved(ctx, receiver, method, args, span);
        };
        let Some(dispatch) = self.query.dispatch_kind(id) else {
            return Err(LowerError::MissingAnnotation {
                method,
                annotation: "dispatch kind",
                span,
            });
        };

        match dispatch {
            DispatchKind::Static => {
                let mut stmts = Vec::new();
                if receiver.is_valid() && !purity::is_pure(self.src, receiver) {
                    let value = self.lower_expr(ctx, receiver)?;
                    stmts.push(self.expr_stmt(value));
                }
                let args = self.lower_list(ctx, args)?;
                let args = self.arena.alloc_list(&args);
                let call = self.alloc(
                    LowExpr::QualifiedCall {
                        class: target.method.class,
                        method: target.mangled,
                        args,
                    },
                    span,
                );
                Ok(self.block_expr(&stmts, call, span))
            }
            DispatchKind::Direct => self.lower_direct(ctx, id, receiver, target, args, span),
            DispatchKind::Virtual => self.lower_virtual(ctx, id, receiver, target, args, span),
        }
    }

    fn lower_virtual(
        &mut self,
        ctx: &mut RewriteCtx,
        id: ExprId,
        receiver: ExprId,
        target: CallTarget,
        args: ExprRange,
        span: Span,
    ) -> Result<LowId, LowerError> {
        let info = self
            .query
            .method(target.method)
            .ok_or(LowerError::MissingAnnotation {
                method: target.mangled,
                annotation: "method signature",
                span,
            })?;
        let slot = self
            .vtables
            .slot_for(target.method.class, info.name, &info.params)
            .ok_or(LowerError::MissingAnnotation {
                method: target.mangled,
                annotation: "vtable slot",
                span,
            })?
            .name;

        let mut stmts = Vec::new();
        let operand = self.receiver_operand(ctx, id, receiver, span, &mut stmts)?;
        self.null_check(ctx, operand, span, &mut stmts)?;
        let receiver = self.use_operand(ctx, operand, span)?;
        let args = self.receiver_args(ctx, operand, args, span)?;
        let call = self.alloc(
            LowExpr::VirtualCall {
                receiver,
                slot,
                args,
            },
            span,
        );
        Ok(self.block_expr(&stmts, call, span))
    }

    fn lower_direct(
        &mut self,
        ctx: &mut RewriteCtx,
        id: ExprId,
        receiver: ExprId,
        target: CallTarget,
        args: ExprRange,
        span: Span,
    ) -> Result<LowId, LowerError> {
        if receiver.is_valid() && matches!(self.src.kind(receiver), ExprKind::Super) {
            let args = self.receiver_args(ctx, Operand::SelfRef, args, span)?;
            return Ok(self.alloc(
                LowExpr::QualifiedCall {
                    class: target.method.class,
                    method: target.mangled,
                    args,
                },
                span,
            ));
        }

        let mut stmts = Vec::new();
        let operand = self.receiver_operand(ctx, id, receiver, span, &mut stmts)?;
        let receiver = self.use_operand(ctx, operand, span)?;
        let args = self.receiver_args(ctx, operand, args, span)?;
        let call = self.alloc(
            LowExpr::DirectCall {
                receiver,
                method: target.mangled,
                args,
            },
            span,
        );
        Ok(self.block_expr(&stmts, call, span))
    }

    /// Receiver of an instance call; the implicit one is `__this`.
    fn receiver_operand(
        &mut self,
        ctx: &mut RewriteCtx,
        id: ExprId,
        receiver: ExprId,
        span: Span,
        stmts: &mut Vec<clove_ir::LowStmtId>,
    ) -> Result<Operand, LowerError> {
        if receiver.is_valid() {
            let fallback = clove_ir::Ty::Class(ctx.class);
            return self.operand(ctx, receiver, &fallback, stmts);
        }
        if !self.calls.needs_self(id) {
            return Err(LowerError::MissingAnnotation {
                method: Name::EMPTY,
                annotation: "implicit receiver",
                span,
            });
        }
        Ok(Operand::SelfRef)
    }

    /// Argument list with the receiver prepended.
    fn receiver_args(
        &mut self,
        ctx: &mut RewriteCtx,
        operand: Operand,
        args: ExprRange,
        span: Span,
    ) -> Result<clove_ir::LowRange, LowerError> {
        let mut list = vec![self.use_operand(ctx, operand, span)?];
        list.extend(self.lower_list(ctx, args)?);
        Ok(self.arena.alloc_list(&list))
    }

    fn lower_unresolved(
        &mut self,
        ctx: &mut RewriteCtx,
        receiver: ExprId,
        method: Name,
        args: ExprRange,
        span: Span,
    ) -> Result<LowId, LowerError> {
        if self.options.strict_resolution {
            return Err(LowerError::UnresolvedCall { method, span });
        }
        debug!(
            method = self.interner.lookup(method),
            %span,
            "unresolved call kept under its source name"
        );
        let receiver = if receiver.is_valid() {
            self.lower_expr(ctx, receiver)?
        } else {
            LowId::INVALID
        };
        let args = self.lower_list(ctx, args)?;
        let args = self.arena.alloc_list(&args);
        Ok(self.alloc(
            LowExpr::UnresolvedCall {
                receiver,
                method,
                args,
            },
            span,
        ))
    }

    /// `System.out.println(..)` / `System.out.print(..)`, unless `System`
    /// is shadowed by a local, field, or user class.
    fn is_console_output(&self, receiver: ExprId, method: Name) -> bool {
        if !matches!(method, Name::PRINTLN | Name::PRINT) || !receiver.is_valid() {
            return false;
        }
        let ExprKind::Field {
            receiver: system,
            name: Name::OUT,
        } = *self.src.kind(receiver)
        else {
            return false;
        };
        matches!(self.src.kind(system), ExprKind::Ident(Name::SYSTEM))
            && !matches!(
                self.query.ident(system),
                Some(IdentRes::Local | IdentRes::Field(_) | IdentRes::Class(_))
            )
    }

    /// `this(..)` / `super(..)`: run the target's `__init` on the current
    /// receiver.
    pub(crate) fn lower_ctor_chain(
        &mut self,
        ctx: &mut RewriteCtx,
        target: ChainTarget,
        args: ExprRange,
        span: Span,
    ) -> Result<LowId, LowerError> {
        if !ctx.in_constructor() {
            warn!(
                class = self.interner.lookup(ctx.class),
                %span,
                "constructor chaining outside a constructor"
            );
        }
        let class = match target {
            ChainTarget::This => ctx.class,
            ChainTarget::Super => self
                .query
                .direct_supertype(ctx.class)
                .unwrap_or(Name::OBJECT),
        };
        let args = self.receiver_args(ctx, Operand::SelfRef, args, span)?;
        Ok(self.alloc(LowExpr::InitCall { class, args }, span))
    }
}
