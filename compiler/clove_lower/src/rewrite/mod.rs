//! Expression and call rewriting.
//!
//! Every source expression is lowered into a fresh node of the unit's
//! [`LowArena`]; the source arena is only read. Traversal state (current
//! class and method, entry-point and constructor flags, the temporary
//! counter) lives in a [`RewriteCtx`] passed explicitly to each call.
//!
//! Submodules:
//! - `calls`: dispatch-specific call forms, console output, constructor chaining
//! - `arrays`: checked allocation, element reads and stores
//! - `stmt`: statements and method bodies
//! - `purity`: which source expressions may be evaluated more than once

mod arrays;
mod calls;
mod purity;
mod stmt;

use clove_ir::{
    CompilationUnit, ExprArena, ExprId, ExprKind, ExprRange, LowArena, LowExpr, LowId, LowStmt,
    LowStmtId, Name, Span, StringInterner, Ty,
};
use clove_types::{FieldRef, IdentRes, MethodRef, TypeQuery};
use tracing::trace;

use crate::init_chain::{DefaultLiteral, InitializerChain};
use crate::layout::VtableSet;
use crate::mangle::{MangleRecord, UnitCalls};
use crate::{LowerError, LowerOptions};

pub use stmt::chains_constructor;

/// What kind of routine is being lowered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Instance,
    Static,
    /// The static entry point; returns an exit status.
    Entry,
    /// A user or synthesized `__init` routine; returns the receiver.
    Constructor,
}

/// Traversal state for one routine.
#[derive(Clone, Debug)]
pub struct RewriteCtx {
    pub class: Name,
    pub method: Option<MethodRef>,
    pub mode: Mode,
    /// The constructor body chains to `this(..)` or `super(..)`.
    pub chained: bool,
    temps: u32,
}

impl RewriteCtx {
    pub fn new(class: Name, method: Option<MethodRef>, mode: Mode) -> Self {
        RewriteCtx {
            class,
            method,
            mode,
            chained: false,
            temps: 0,
        }
    }

    pub fn in_entry(&self) -> bool {
        self.mode == Mode::Entry
    }

    pub fn in_constructor(&self) -> bool {
        self.mode == Mode::Constructor
    }

    /// Number of temporaries introduced so far.
    pub fn temp_count(&self) -> u32 {
        self.temps
    }

    fn fresh_temp(&mut self, interner: &StringInterner) -> Name {
        let name = interner.intern_indexed("__tmp", self.temps);
        self.temps += 1;
        name
    }
}

/// A value used more than once by a lowered form.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Operand {
    /// Side-effect free: re-lowered at each use.
    Pure(ExprId),
    /// Bound once to a temporary.
    Temp(Name),
    /// The explicit receiver parameter.
    SelfRef,
}

/// Lowering state for one unit.
///
/// Holds read-only references to the program facts and owns the target
/// arena being built.
pub(crate) struct Lowerer<'a, Q> {
    /// Source arena (read-only).
    pub(crate) src: &'a ExprArena,
    pub(crate) query: &'a Q,
    pub(crate) record: &'a MangleRecord,
    pub(crate) calls: &'a UnitCalls,
    pub(crate) chains: &'a InitializerChain,
    pub(crate) vtables: &'a VtableSet,
    pub(crate) interner: &'a StringInterner,
    pub(crate) options: &'a LowerOptions,
    /// Target arena (being built).
    pub(crate) arena: LowArena,
}

impl<'a, Q: TypeQuery> Lowerer<'a, Q> {
    #[expect(clippy::too_many_arguments, reason = "one reference per program fact")]
    pub(crate) fn new(
        unit: &'a CompilationUnit,
        query: &'a Q,
        record: &'a MangleRecord,
        calls: &'a UnitCalls,
        chains: &'a InitializerChain,
        vtables: &'a VtableSet,
        interner: &'a StringInterner,
        options: &'a LowerOptions,
    ) -> Self {
        Lowerer {
            src: &unit.arena,
            query,
            record,
            calls,
            chains,
            vtables,
            interner,
            options,
            arena: LowArena::new(),
        }
    }

    // Node helpers

    pub(crate) fn alloc(&mut self, kind: LowExpr, span: Span) -> LowId {
        self.arena.alloc(kind, span)
    }

    pub(crate) fn self_ref(&mut self, span: Span) -> LowId {
        self.alloc(LowExpr::Local(self.options.self_param), span)
    }

    pub(crate) fn stmt(&mut self, stmt: LowStmt) -> LowStmtId {
        self.arena.alloc_stmt(stmt)
    }

    pub(crate) fn expr_stmt(&mut self, expr: LowId) -> LowStmtId {
        self.arena.alloc_stmt(LowStmt::Expr(expr))
    }

    pub(crate) fn block_stmt(&mut self, stmts: &[LowStmtId]) -> LowStmtId {
        let range = self.arena.alloc_stmt_list(stmts);
        self.arena.alloc_stmt(LowStmt::Block(range))
    }

    /// `result` alone when there is nothing to run first.
    pub(crate) fn block_expr(&mut self, stmts: &[LowStmtId], result: LowId, span: Span) -> LowId {
        if stmts.is_empty() {
            return result;
        }
        let stmts = self.arena.alloc_stmt_list(stmts);
        self.alloc(LowExpr::Block { stmts, result }, span)
    }

    pub(crate) fn check(&mut self, kind: clove_ir::CheckKind, args: &[LowId], span: Span) -> LowId {
        let args = self.arena.alloc_list(args);
        self.alloc(LowExpr::Check { kind, args }, span)
    }

    /// Declare a fresh temporary holding `value`.
    pub(crate) fn bind_temp(
        &mut self,
        ctx: &mut RewriteCtx,
        ty: Ty,
        value: LowId,
    ) -> (LowStmtId, Name) {
        let name = ctx.fresh_temp(self.interner);
        let stmt = self.stmt(LowStmt::Local {
            name,
            ty,
            init: value,
        });
        (stmt, name)
    }

    pub(crate) fn default_literal(&mut self, literal: DefaultLiteral, span: Span) -> LowId {
        let kind = match literal {
            DefaultLiteral::Int => LowExpr::Int(0),
            DefaultLiteral::Float => LowExpr::Float(0f64.to_bits()),
            DefaultLiteral::Bool => LowExpr::Bool(false),
            DefaultLiteral::Char => LowExpr::Char('\0'),
            DefaultLiteral::Null => LowExpr::Null,
        };
        self.alloc(kind, span)
    }

    /// Static type of a source expression, or `fallback` when unknown.
    pub(crate) fn type_or(&self, expr: ExprId, fallback: &Ty) -> Ty {
        match self.query.expr_type(expr) {
            Some(Ty::Null | Ty::Void) | None => fallback.clone(),
            Some(ty) => ty.clone(),
        }
    }

    // Operands

    /// Prepare `expr` for repeated use, binding it to a temporary unless it
    /// is pure.
    pub(crate) fn operand(
        &mut self,
        ctx: &mut RewriteCtx,
        expr: ExprId,
        fallback: &Ty,
        stmts: &mut Vec<LowStmtId>,
    ) -> Result<Operand, LowerError> {
        if matches!(self.src.kind(expr), ExprKind::This | ExprKind::Super) {
            return Ok(Operand::SelfRef);
        }
        if purity::is_pure(self.src, expr) {
            return Ok(Operand::Pure(expr));
        }
        let value = self.lower_expr(ctx, expr)?;
        let ty = self.type_or(expr, fallback);
        let (decl, name) = self.bind_temp(ctx, ty, value);
        stmts.push(decl);
        Ok(Operand::Temp(name))
    }

    /// Like [`operand`](Self::operand), but `later` runs between the
    /// binding and every use: unless `later` is pure, anything short of a
    /// literal or the receiver is read into a temporary now.
    pub(crate) fn operand_before(
        &mut self,
        ctx: &mut RewriteCtx,
        expr: ExprId,
        fallback: &Ty,
        later: ExprId,
        stmts: &mut Vec<LowStmtId>,
    ) -> Result<Operand, LowerError> {
        if purity::is_pure(self.src, later) || purity::is_constant(self.src, expr) {
            return self.operand(ctx, expr, fallback, stmts);
        }
        if matches!(self.src.kind(expr), ExprKind::This | ExprKind::Super) {
            return Ok(Operand::SelfRef);
        }
        let value = self.lower_expr(ctx, expr)?;
        let ty = self.type_or(expr, fallback);
        let (decl, name) = self.bind_temp(ctx, ty, value);
        stmts.push(decl);
        Ok(Operand::Temp(name))
    }

    /// A fresh node reading the operand.
    pub(crate) fn use_operand(
        &mut self,
        ctx: &mut RewriteCtx,
        operand: Operand,
        span: Span,
    ) -> Result<LowId, LowerError> {
        match operand {
            Operand::Pure(expr) => self.lower_expr(ctx, expr),
            Operand::Temp(name) => Ok(self.alloc(LowExpr::Local(name), span)),
            Operand::SelfRef => Ok(self.self_ref(span)),
        }
    }

    /// Null-check `operand` unless it is the receiver itself.
    pub(crate) fn null_check(
        &mut self,
        ctx: &mut RewriteCtx,
        operand: Operand,
        span: Span,
        stmts: &mut Vec<LowStmtId>,
    ) -> Result<(), LowerError> {
        if !self.options.null_checks || matches!(operand, Operand::SelfRef) {
            return Ok(());
        }
        let value = self.use_operand(ctx, operand, span)?;
        let check = self.check(clove_ir::CheckKind::NotNull, &[value], span);
        let stmt = self.expr_stmt(check);
        stmts.push(stmt);
        Ok(())
    }

    pub(crate) fn lower_list(
        &mut self,
        ctx: &mut RewriteCtx,
        range: ExprRange,
    ) -> Result<Vec<LowId>, LowerError> {
        let src = self.src;
        src.expr_list(range)
            .iter()
            .map(|&expr| self.lower_expr(ctx, expr))
            .collect()
    }

    // Expressions

    pub(crate) fn lower_expr(
        &mut self,
        ctx: &mut RewriteCtx,
        id: ExprId,
    ) -> Result<LowId, LowerError> {
        let src = self.src;
        let span = src.span(id);
        let kind = match src.kind(id) {
            ExprKind::Int(value) => LowExpr::Int(*value),
            ExprKind::Float(bits) => LowExpr::Float(*bits),
            ExprKind::Bool(value) => LowExpr::Bool(*value),
            ExprKind::Char(value) => LowExpr::Char(*value),
            ExprKind::Str(name) => LowExpr::Str(*name),
            ExprKind::Null => LowExpr::Null,
            ExprKind::This | ExprKind::Super => LowExpr::Local(self.options.self_param),
            ExprKind::Ident(name) => return Ok(self.lower_ident(id, *name, span)),
            ExprKind::Field { receiver, name } => {
                return self.lower_field(ctx, id, *receiver, *name, span)
            }
            ExprKind::Call { .. } => return self.lower_call(ctx, id),
            ExprKind::CtorChain { target, args } => {
                return self.lower_ctor_chain(ctx, *target, *args, span)
            }
            ExprKind::New { class, args } => {
                let class = *class;
                let object = self.alloc(LowExpr::Alloc { class }, span);
                let mut list = vec![object];
                list.extend(self.lower_list(ctx, *args)?);
                let args = self.arena.alloc_list(&list);
                LowExpr::InitCall { class, args }
            }
            ExprKind::NewArray {
                elem,
                dims,
                extra_dims,
            } => return self.lower_new_array(ctx, elem, *dims, *extra_dims, span),
            ExprKind::Index { array, index } => {
                return self.lower_index(ctx, *array, *index, span)
            }
            ExprKind::Assign { target, value } => {
                return self.lower_assign(ctx, *target, *value, span)
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.lower_expr(ctx, *left)?;
                let right = self.lower_expr(ctx, *right)?;
                LowExpr::Binary {
                    op: *op,
                    left,
                    right,
                }
            }
            ExprKind::Unary { op, operand } => {
                if let ExprKind::Index { array, index } = src.kind(*operand) {
                    if op.mutates() {
                        return self.lower_index_update(ctx, *op, *array, *index, span);
                    }
                }
                let operand = self.lower_expr(ctx, *operand)?;
                LowExpr::Unary { op: *op, operand }
            }
            ExprKind::Cast { ty, expr } => {
                let expr = self.lower_expr(ctx, *expr)?;
                LowExpr::Cast {
                    ty: ty.clone(),
                    expr,
                }
            }
            ExprKind::InstanceOf { expr, class } => {
                let expr = self.lower_expr(ctx, *expr)?;
                LowExpr::InstanceOf {
                    expr,
                    class: *class,
                }
            }
        };
        Ok(self.alloc(kind, span))
    }

    fn lower_ident(&mut self, id: ExprId, name: Name, span: Span) -> LowId {
        match self.query.ident(id) {
            Some(IdentRes::Field(field)) => self.field_ref(field, name, span),
            Some(IdentRes::Local | IdentRes::Class(_)) => self.alloc(LowExpr::Local(name), span),
            None => {
                trace!(?name, "identifier without resolution kept as local");
                self.alloc(LowExpr::Local(name), span)
            }
        }
    }

    /// Implicit field reference: `__this->f` or `__Owner::f`.
    fn field_ref(&mut self, field: FieldRef, name: Name, span: Span) -> LowId {
        let is_static = self.query.field(field).is_some_and(|f| f.is_static);
        if is_static {
            return self.alloc(
                LowExpr::StaticField {
                    class: field.class,
                    field: name,
                },
                span,
            );
        }
        let object = self.self_ref(span);
        self.alloc(LowExpr::Field { object, field: name }, span)
    }

    fn lower_field(
        &mut self,
        ctx: &mut RewriteCtx,
        id: ExprId,
        receiver: ExprId,
        name: Name,
        span: Span,
    ) -> Result<LowId, LowerError> {
        if let Some(IdentRes::Field(field)) = self.query.ident(id) {
            if self.query.field(field).is_some_and(|f| f.is_static) {
                return Ok(self.alloc(
                    LowExpr::StaticField {
                        class: field.class,
                        field: name,
                    },
                    span,
                ));
            }
        }
        if let Some(IdentRes::Class(class)) = self.query.ident(receiver) {
            return Ok(self.alloc(LowExpr::StaticField { class, field: name }, span));
        }
        let receiver_is_array = self.query.expr_type(receiver).is_some_and(Ty::is_array);
        if name == Name::LENGTH && receiver_is_array {
            return self.lower_length(ctx, receiver, span);
        }
        let object = self.lower_expr(ctx, receiver)?;
        Ok(self.alloc(LowExpr::Field { object, field: name }, span))
    }

    /// `a.length` with the array null-checked first.
    fn lower_length(
        &mut self,
        ctx: &mut RewriteCtx,
        array: ExprId,
        span: Span,
    ) -> Result<LowId, LowerError> {
        let mut stmts = Vec::new();
        let operand = self.operand(ctx, array, &Ty::OBJECT, &mut stmts)?;
        self.null_check(ctx, operand, span, &mut stmts)?;
        let value = self.use_operand(ctx, operand, span)?;
        let length = self.alloc(LowExpr::ArrayLength(value), span);
        Ok(self.block_expr(&stmts, length, span))
    }
}

#[cfg(test)]
mod tests;
