//! Statements and routine bodies.

use clove_ir::{
    ClassDecl, ExprArena, ExprKind, LowExpr, LowId, LowParam, LowStmt, LowStmtId, LoweredMethod,
    MethodDecl, MethodKind, Name, Span, StmtId, StmtKind, Ty,
};
use clove_types::{MethodRef, TypeQuery};

use super::{Lowerer, Mode, RewriteCtx};
use crate::walk::walk_stmt;
use crate::LowerError;

/// True if the body chains to another constructor with `this(..)` or
/// `super(..)`. Such a body gets no implicit prologue.
pub fn chains_constructor(arena: &ExprArena, body: StmtId) -> bool {
    let mut found = false;
    walk_stmt(arena, body, &mut |id| {
        found |= matches!(arena.kind(id), ExprKind::CtorChain { .. });
    });
    found
}

impl<Q: TypeQuery> Lowerer<'_, Q> {
    pub(crate) fn lower_stmt(
        &mut self,
        ctx: &mut RewriteCtx,
        id: StmtId,
    ) -> Result<LowStmtId, LowerError> {
        let src = self.src;
        let span = src.stmt(id).span;
        let stmt = match src.stmt_kind(id) {
            StmtKind::Expr(expr) => LowStmt::Expr(self.lower_expr(ctx, *expr)?),
            StmtKind::Local { name, ty, init } => LowStmt::Local {
                name: *name,
                ty: ty.clone(),
                init: self.lower_opt(ctx, *init)?,
            },
            StmtKind::Block(range) => {
                let stmts = src
                    .stmt_list(*range)
                    .iter()
                    .map(|&stmt| self.lower_stmt(ctx, stmt))
                    .collect::<Result<Vec<_>, _>>()?;
                LowStmt::Block(self.arena.alloc_stmt_list(&stmts))
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => LowStmt::If {
                cond: self.lower_expr(ctx, *cond)?,
                then_branch: self.lower_stmt(ctx, *then_branch)?,
                else_branch: self.lower_stmt_opt(ctx, *else_branch)?,
            },
            StmtKind::While { cond, body } => LowStmt::While {
                cond: self.lower_expr(ctx, *cond)?,
                body: self.lower_stmt(ctx, *body)?,
            },
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => {
                let init = src
                    .stmt_list(*init)
                    .iter()
                    .map(|&stmt| self.lower_stmt(ctx, stmt))
                    .collect::<Result<Vec<_>, _>>()?;
                let init = self.arena.alloc_stmt_list(&init);
                let cond = self.lower_opt(ctx, *cond)?;
                let update = self.lower_list(ctx, *update)?;
                let update = self.arena.alloc_list(&update);
                LowStmt::For {
                    init,
                    cond,
                    update,
                    body: self.lower_stmt(ctx, *body)?,
                }
            }
            StmtKind::Return(value) if value.is_valid() => {
                LowStmt::Return(self.lower_expr(ctx, *value)?)
            }
            StmtKind::Return(_) => LowStmt::Return(self.implicit_result(ctx, span)),
        };
        Ok(self.stmt(stmt))
    }

    fn lower_opt(
        &mut self,
        ctx: &mut RewriteCtx,
        expr: clove_ir::ExprId,
    ) -> Result<LowId, LowerError> {
        if expr.is_valid() {
            self.lower_expr(ctx, expr)
        } else {
            Ok(LowId::INVALID)
        }
    }

    fn lower_stmt_opt(
        &mut self,
        ctx: &mut RewriteCtx,
        stmt: StmtId,
    ) -> Result<LowStmtId, LowerError> {
        if stmt.is_valid() {
            self.lower_stmt(ctx, stmt)
        } else {
            Ok(LowStmtId::INVALID)
        }
    }

    /// What a bare `return` hands back: the receiver from `__init`, exit
    /// status zero from the entry point, nothing elsewhere.
    fn implicit_result(&mut self, ctx: &RewriteCtx, span: Span) -> LowId {
        match ctx.mode {
            Mode::Constructor => self.self_ref(span),
            Mode::Entry => self.alloc(LowExpr::Int(0), span),
            Mode::Instance | Mode::Static => LowId::INVALID,
        }
    }

    /// `prologue`, then the body's statements, then the implicit result
    /// unless the body already ends in a return.
    fn lower_body(
        &mut self,
        ctx: &mut RewriteCtx,
        body: StmtId,
        mut stmts: Vec<LowStmtId>,
        span: Span,
    ) -> Result<LowStmtId, LowerError> {
        let src = self.src;
        if body.is_valid() {
            match src.stmt_kind(body) {
                StmtKind::Block(range) => {
                    for &stmt in src.stmt_list(*range) {
                        stmts.push(self.lower_stmt(ctx, stmt)?);
                    }
                }
                _ => stmts.push(self.lower_stmt(ctx, body)?),
            }
        }
        let ends_in_return = stmts
            .last()
            .is_some_and(|&last| matches!(self.arena.stmt(last), LowStmt::Return(_)));
        if matches!(ctx.mode, Mode::Constructor | Mode::Entry) && !ends_in_return {
            let result = self.implicit_result(ctx, span);
            stmts.push(self.stmt(LowStmt::Return(result)));
        }
        Ok(self.block_stmt(&stmts))
    }

    fn receiver_param(&self, class: Name) -> LowParam {
        LowParam {
            name: self.options.self_param,
            ty: Ty::Class(class),
        }
    }

    /// Instance, static, or entry-point method.
    pub(crate) fn lower_method(
        &mut self,
        decl: &ClassDecl,
        method_ref: MethodRef,
        method: &MethodDecl,
    ) -> Result<LoweredMethod, LowerError> {
        let mode = if !method.is_static() {
            Mode::Instance
        } else if method.name == self.options.entry_point {
            Mode::Entry
        } else {
            Mode::Static
        };
        let mut ctx = RewriteCtx::new(decl.name, Some(method_ref), mode);

        let mut params = Vec::with_capacity(method.params.len() + 1);
        if mode == Mode::Instance {
            params.push(self.receiver_param(decl.name));
        }
        params.extend(method.params.iter().map(|p| LowParam {
            name: p.name,
            ty: p.ty.clone(),
        }));

        let body = self.lower_body(&mut ctx, method.body, Vec::new(), method.span)?;
        let (kind, ret) = match mode {
            Mode::Instance => (MethodKind::Instance, method.ret.clone()),
            Mode::Static => (MethodKind::Static, method.ret.clone()),
            Mode::Entry | Mode::Constructor => (MethodKind::Entry, Ty::Int),
        };
        Ok(LoweredMethod {
            name: self.record.mangled(method_ref).unwrap_or(method.name),
            source: method.name,
            owner: decl.name,
            kind,
            params,
            ret,
            body,
            synthesized: false,
        })
    }

    /// A user constructor as an `__init` routine returning the receiver.
    pub(crate) fn lower_constructor(
        &mut self,
        decl: &ClassDecl,
        method_ref: MethodRef,
        method: &MethodDecl,
    ) -> Result<LoweredMethod, LowerError> {
        let mut ctx = RewriteCtx::new(decl.name, Some(method_ref), Mode::Constructor);
        ctx.chained = chains_constructor(self.src, method.body);
        let prologue = if ctx.chained {
            Vec::new()
        } else {
            self.init_prologue(&mut ctx, method.span)?
        };

        let mut params = Vec::with_capacity(method.params.len() + 1);
        params.push(self.receiver_param(decl.name));
        params.extend(method.params.iter().map(|p| LowParam {
            name: p.name,
            ty: p.ty.clone(),
        }));

        let body = self.lower_body(&mut ctx, method.body, prologue, method.span)?;
        Ok(LoweredMethod {
            name: Name::INIT,
            source: method.name,
            owner: decl.name,
            kind: MethodKind::Init,
            params,
            ret: Ty::Class(decl.name),
            body,
            synthesized: false,
        })
    }

    /// `__init(__this)` for a class that declares no constructor.
    pub(crate) fn synthesized_init(&mut self, decl: &ClassDecl) -> Result<LoweredMethod, LowerError> {
        let mut ctx = RewriteCtx::new(decl.name, None, Mode::Constructor);
        let prologue = self.init_prologue(&mut ctx, decl.span)?;
        let body = self.lower_body(&mut ctx, StmtId::INVALID, prologue, decl.span)?;
        Ok(LoweredMethod {
            name: Name::INIT,
            source: decl.name,
            owner: decl.name,
            kind: MethodKind::Init,
            params: vec![self.receiver_param(decl.name)],
            ret: Ty::Class(decl.name),
            body,
            synthesized: true,
        })
    }

    /// Parent `__init` on the receiver, then the class's own explicit field
    /// initializers in resolved order.
    fn init_prologue(
        &mut self,
        ctx: &mut RewriteCtx,
        span: Span,
    ) -> Result<Vec<LowStmtId>, LowerError> {
        let class = ctx.class;
        let parent = self.query.direct_supertype(class).unwrap_or(Name::OBJECT);
        let receiver = self.self_ref(span);
        let args = self.arena.alloc_list(&[receiver]);
        let parent_init = self.alloc(LowExpr::InitCall { class: parent, args }, span);
        let mut stmts = vec![self.expr_stmt(parent_init)];

        let chains = self.chains;
        let chain = chains
            .instance(class)
            .ok_or(LowerError::MissingInitializers { class })?;
        for init in chain.iter().filter(|i| i.owner == class && i.has_value()) {
            let value = self.lower_expr(ctx, init.value)?;
            let object = self.self_ref(span);
            let target = self.alloc(
                LowExpr::Field {
                    object,
                    field: init.name,
                },
                span,
            );
            let assign = self.alloc(LowExpr::Assign { target, value }, span);
            stmts.push(self.expr_stmt(assign));
        }
        Ok(stmts)
    }
}
