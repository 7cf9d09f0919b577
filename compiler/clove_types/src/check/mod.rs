//! Per-unit type annotation.
//!
//! Walks every field initializer and method body of one unit and records,
//! in side tables keyed by `ExprId`:
//! - the static type of each expression,
//! - what each identifier or member access names,
//! - the resolved target and dispatch kind of each call.
//!
//! The walk never fails. Anything it cannot type is left absent and later
//! passes decide what to do with the gap.

use clove_ir::{
    BinaryOp, CompilationUnit, ExprId, ExprKind, Name, StmtId, StmtKind, Ty, UnaryOp,
};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{ClassTable, FieldRef, MethodFlags, MethodRef};

/// How a resolved call reaches its implementation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DispatchKind {
    /// Through the receiver's vtable.
    Virtual,
    /// Class-qualified, no receiver.
    Static,
    /// A known implementation with an explicit receiver.
    Direct,
}

impl DispatchKind {
    /// Static methods are `Static`; calls through `super` and methods
    /// without a vtable slot are `Direct`; everything else is `Virtual`.
    pub fn classify(flags: MethodFlags, via_super: bool) -> Self {
        if flags.is_static() {
            DispatchKind::Static
        } else if via_super || !flags.is_virtual() {
            DispatchKind::Direct
        } else {
            DispatchKind::Virtual
        }
    }
}

/// What an identifier or member access refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IdentRes {
    /// A local variable or parameter.
    Local,
    Field(FieldRef),
    /// A class name, usable only as a receiver.
    Class(Name),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallInfo {
    pub target: MethodRef,
    pub dispatch: DispatchKind,
}

/// Lookup scope for [`TypeQuery::type_of`](crate::TypeQuery::type_of).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scope {
    pub class: Name,
    /// `None` for field initializers.
    pub method: Option<MethodRef>,
}

/// Annotations for one compilation unit.
#[derive(Clone, Debug, Default)]
pub struct TypedUnit {
    expr_types: Vec<Option<Ty>>,
    idents: FxHashMap<ExprId, IdentRes>,
    calls: FxHashMap<ExprId, CallInfo>,
    locals: FxHashMap<MethodRef, FxHashMap<Name, Ty>>,
}

impl TypedUnit {
    pub fn expr_type(&self, expr: ExprId) -> Option<&Ty> {
        self.expr_types.get(expr.index())?.as_ref()
    }

    pub fn ident(&self, expr: ExprId) -> Option<IdentRes> {
        self.idents.get(&expr).copied()
    }

    pub fn call(&self, expr: ExprId) -> Option<CallInfo> {
        self.calls.get(&expr).copied()
    }

    /// Type of a local or parameter declared anywhere in the method.
    pub fn local_type(&self, method: MethodRef, name: Name) -> Option<&Ty> {
        self.locals.get(&method)?.get(&name)
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }
}

/// Annotate one unit. `unit_index` is the unit's position in the program,
/// used to skip classes whose table entry came from another unit.
pub fn check_unit(table: &ClassTable, unit_index: usize, unit: &CompilationUnit) -> TypedUnit {
    let mut checker = Checker {
        table,
        unit,
        out: TypedUnit {
            expr_types: vec![None; unit.arena.expr_count()],
            ..TypedUnit::default()
        },
        class: Name::EMPTY,
        method: None,
        scopes: Vec::new(),
    };

    for decl in &unit.classes {
        let owned = table
            .class(decl.name)
            .is_some_and(|info| info.unit == Some(unit_index));
        if !owned {
            continue;
        }
        checker.class = decl.name;

        for field in &decl.fields {
            if field.init.is_valid() {
                checker.method = None;
                checker.scopes.clear();
                checker.check_expr(field.init);
            }
        }

        for (index, method) in decl.methods.iter().enumerate() {
            let method_ref = MethodRef {
                class: decl.name,
                index: u32::try_from(index).unwrap_or(u32::MAX),
            };
            checker.method = Some(method_ref);
            checker.scopes.clear();
            checker.scopes.push(FxHashMap::default());
            for param in &method.params {
                checker.declare(param.name, param.ty.clone());
            }
            checker.check_stmt(method.body);
        }
    }

    debug!(
        path = %unit.path.display(),
        calls = checker.out.calls.len(),
        idents = checker.out.idents.len(),
        "unit annotated"
    );
    checker.out
}

struct Checker<'a> {
    table: &'a ClassTable,
    unit: &'a CompilationUnit,
    out: TypedUnit,
    class: Name,
    method: Option<MethodRef>,
    scopes: Vec<FxHashMap<Name, Ty>>,
}

impl Checker<'_> {
    fn declare(&mut self, name: Name, ty: Ty) {
        if let Some(method) = self.method {
            self.out
                .locals
                .entry(method)
                .or_default()
                .insert(name, ty.clone());
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, ty);
        }
    }

    fn lookup_local(&self, name: Name) -> Option<&Ty> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&name))
    }

    fn check_stmt(&mut self, id: StmtId) {
        let unit = self.unit;
        let arena = &unit.arena;
        match arena.stmt_kind(id) {
            StmtKind::Expr(expr) => {
                self.check_expr(*expr);
            }
            StmtKind::Local { name, ty, init } => {
                if init.is_valid() {
                    self.check_expr(*init);
                }
                self.declare(*name, ty.clone());
            }
            StmtKind::Block(range) => {
                self.scopes.push(FxHashMap::default());
                for &stmt in arena.stmt_list(*range) {
                    self.check_stmt(stmt);
                }
                self.scopes.pop();
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.check_expr(*cond);
                self.check_stmt(*then_branch);
                if else_branch.is_valid() {
                    self.check_stmt(*else_branch);
                }
            }
            StmtKind::While { cond, body } => {
                self.check_expr(*cond);
                self.check_stmt(*body);
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => {
                self.scopes.push(FxHashMap::default());
                for &stmt in arena.stmt_list(*init) {
                    self.check_stmt(stmt);
                }
                if cond.is_valid() {
                    self.check_expr(*cond);
                }
                for &expr in arena.expr_list(*update) {
                    self.check_expr(expr);
                }
                self.check_stmt(*body);
                self.scopes.pop();
            }
            StmtKind::Return(value) => {
                if value.is_valid() {
                    self.check_expr(*value);
                }
            }
        }
    }

    fn check_expr(&mut self, id: ExprId) -> Option<Ty> {
        let ty = self.infer(id);
        if let Some(slot) = self.out.expr_types.get_mut(id.index()) {
            slot.clone_from(&ty);
        }
        ty
    }

    fn infer(&mut self, id: ExprId) -> Option<Ty> {
        let unit = self.unit;
        let arena = &unit.arena;
        match arena.kind(id) {
            ExprKind::Int(value) => Some(if i32::try_from(*value).is_ok() {
                Ty::Int
            } else {
                Ty::Long
            }),
            ExprKind::Float(_) => Some(Ty::Double),
            ExprKind::Bool(_) => Some(Ty::Boolean),
            ExprKind::Char(_) => Some(Ty::Char),
            ExprKind::Str(_) => Some(Ty::STRING),
            ExprKind::Null => Some(Ty::Null),
            ExprKind::This => Some(Ty::Class(self.class)),
            ExprKind::Super => self.table.direct_supertype(self.class).map(Ty::Class),
            ExprKind::Ident(name) => self.infer_ident(id, *name),
            ExprKind::Field { receiver, name } => self.infer_field(id, *receiver, *name),
            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                let receiver = *receiver;
                let method = *method;
                self.infer_call(id, receiver, method, arena.expr_list(*args))
            }
            ExprKind::CtorChain { args, .. } => {
                for arg in arena.expr_list(*args).iter().copied() {
                    self.check_expr(arg);
                }
                Some(Ty::Void)
            }
            ExprKind::New { class, args } => {
                let class = *class;
                for arg in arena.expr_list(*args).iter().copied() {
                    self.check_expr(arg);
                }
                Some(Ty::Class(class))
            }
            ExprKind::NewArray {
                elem,
                dims,
                extra_dims,
            } => {
                let ty = Ty::array_of(elem.clone(), dims.len() + usize::from(*extra_dims));
                for dim in arena.expr_list(*dims).iter().copied() {
                    self.check_expr(dim);
                }
                Some(ty)
            }
            ExprKind::Index { array, index } => {
                let (array, index) = (*array, *index);
                let array_ty = self.check_expr(array);
                self.check_expr(index);
                array_ty.and_then(|ty| ty.element().cloned())
            }
            ExprKind::Assign { target, value } => {
                let (target, value) = (*target, *value);
                let ty = self.check_expr(target);
                self.check_expr(value);
                ty
            }
            ExprKind::Binary { op, left, right } => {
                let (op, left, right) = (*op, *left, *right);
                let l = self.check_expr(left);
                let r = self.check_expr(right);
                binary_type(op, l.as_ref(), r.as_ref())
            }
            ExprKind::Unary { op, operand } => {
                let op = *op;
                let ty = self.check_expr(*operand);
                match op {
                    UnaryOp::Not => Some(Ty::Boolean),
                    UnaryOp::Neg => ty.as_ref().and_then(|t| promote(t, t)),
                    _ => ty,
                }
            }
            ExprKind::Cast { ty, expr } => {
                let ty = ty.clone();
                self.check_expr(*expr);
                Some(ty)
            }
            ExprKind::InstanceOf { expr, .. } => {
                self.check_expr(*expr);
                Some(Ty::Boolean)
            }
        }
    }

    fn infer_ident(&mut self, id: ExprId, name: Name) -> Option<Ty> {
        if let Some(ty) = self.lookup_local(name) {
            let ty = ty.clone();
            self.out.idents.insert(id, IdentRes::Local);
            return Some(ty);
        }
        if let Some(field) = self.table.lookup_field(self.class, name) {
            self.out.idents.insert(id, IdentRes::Field(field));
            return self.table.field(field).map(|f| f.ty.clone());
        }
        if self.table.contains(name) {
            self.out.idents.insert(id, IdentRes::Class(name));
        } else {
            trace!(?name, "unresolved identifier");
        }
        None
    }

    fn infer_field(&mut self, id: ExprId, receiver: ExprId, name: Name) -> Option<Ty> {
        let receiver_ty = self.check_expr(receiver);
        let class = match (self.out.ident(receiver), &receiver_ty) {
            (Some(IdentRes::Class(class)), _) => class,
            (_, Some(ty)) if ty.is_array() && name == Name::LENGTH => return Some(Ty::Int),
            (_, Some(Ty::Class(class))) => *class,
            _ => return None,
        };
        let field = self.table.lookup_field(class, name)?;
        self.out.idents.insert(id, IdentRes::Field(field));
        self.table.field(field).map(|f| f.ty.clone())
    }

    fn infer_call(
        &mut self,
        id: ExprId,
        receiver: ExprId,
        method: Name,
        args: &[ExprId],
    ) -> Option<Ty> {
        let (class, via_super) = if receiver.is_valid() {
            let via_super = matches!(self.unit.arena.kind(receiver), ExprKind::Super);
            let receiver_ty = self.check_expr(receiver);
            let class = match (self.out.ident(receiver), receiver_ty) {
                (Some(IdentRes::Class(class)), _) => Some(class),
                (_, Some(Ty::Class(class))) => Some(class),
                (_, Some(Ty::Array(_))) => Some(Name::OBJECT),
                _ => None,
            };
            (class, via_super)
        } else {
            (Some(self.class), false)
        };

        let arg_tys: Vec<Option<Ty>> = args.iter().map(|&arg| self.check_expr(arg)).collect();
        let class = class?;
        let Some(target) = self.table.resolve_overload(class, method, &arg_tys) else {
            trace!(?method, ?class, "no applicable overload");
            return None;
        };
        let info = self.table.method(target)?;
        let dispatch = DispatchKind::classify(info.flags, via_super);
        let ret = info.ret.clone();
        self.out.calls.insert(id, CallInfo { target, dispatch });
        Some(ret)
    }
}

fn binary_type(op: BinaryOp, left: Option<&Ty>, right: Option<&Ty>) -> Option<Ty> {
    if op.is_comparison() || op.is_logical() {
        return Some(Ty::Boolean);
    }
    if op == BinaryOp::Add && (left == Some(&Ty::STRING) || right == Some(&Ty::STRING)) {
        return Some(Ty::STRING);
    }
    promote(left?, right?)
}

/// Binary numeric promotion: the wider operand, at least `int`.
fn promote(left: &Ty, right: &Ty) -> Option<Ty> {
    let rank = left.numeric_rank()?.max(right.numeric_rank()?);
    Some(match rank {
        0..=2 => Ty::Int,
        3 => Ty::Long,
        4 => Ty::Float,
        _ => Ty::Double,
    })
}

#[cfg(test)]
mod tests;
