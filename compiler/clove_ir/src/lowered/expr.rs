//! Lowered expressions and statements.
//!
//! Every node names its runtime mechanism explicitly: which dispatch a call
//! uses, where a null or bounds check happens, how an object or array is
//! allocated. The emitter prints these one-to-one.

use crate::ast::{BinaryOp, UnaryOp};
use crate::{LowId, LowRange, LowStmtId, LowStmtRange, Name, Span, Ty};

/// Runtime check inserted by lowering.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CheckKind {
    /// `checkNotNull(obj)`
    NotNull,
    /// `checkNegativeIndex(len)`; evaluates to `len`.
    NegativeLength,
    /// `arrayAccessCheck(array, index)`
    ArrayAccess,
    /// `arrayStoreCheck(array, index, value)`
    ArrayStore,
}

impl CheckKind {
    /// Name of the runtime support function.
    pub fn runtime_name(self) -> &'static str {
        match self {
            CheckKind::NotNull => "checkNotNull",
            CheckKind::NegativeLength => "checkNegativeIndex",
            CheckKind::ArrayAccess => "arrayAccessCheck",
            CheckKind::ArrayStore => "arrayStoreCheck",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            CheckKind::NotNull | CheckKind::NegativeLength => 1,
            CheckKind::ArrayAccess => 2,
            CheckKind::ArrayStore => 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LowExpr {
    Int(i64),
    Float(u64),
    Bool(bool),
    Char(char),
    Str(Name),
    Null,
    /// Local, parameter, temporary, or the explicit receiver.
    Local(Name),
    /// `object->field`
    Field {
        object: LowId,
        field: Name,
    },
    /// `__Class::field`
    StaticField {
        class: Name,
        field: Name,
    },
    /// `array->length`
    ArrayLength(LowId),
    /// Unchecked element access; checks are separate nodes.
    Index {
        array: LowId,
        index: LowId,
    },
    Assign {
        target: LowId,
        value: LowId,
    },
    Binary {
        op: BinaryOp,
        left: LowId,
        right: LowId,
    },
    Unary {
        op: UnaryOp,
        operand: LowId,
    },
    Cast {
        ty: Ty,
        expr: LowId,
    },
    InstanceOf {
        expr: LowId,
        class: Name,
    },
    /// Raw allocation `new __Class()`, running only the default constructor.
    Alloc {
        class: Name,
    },
    /// `__Class::__init(args)`; the first argument is the object.
    InitCall {
        class: Name,
        args: LowRange,
    },
    /// `receiver->__vptr->slot(args)`; `args` starts with the receiver.
    VirtualCall {
        receiver: LowId,
        slot: Name,
        args: LowRange,
    },
    /// `__Class::method(args)`: static calls and `super.m(..)`.
    QualifiedCall {
        class: Name,
        method: Name,
        args: LowRange,
    },
    /// `receiver->method(args)`; `args` starts with the receiver.
    DirectCall {
        receiver: LowId,
        method: Name,
        args: LowRange,
    },
    /// A call that could not be resolved, kept under its source name.
    /// `receiver` is `LowId::INVALID` for an implicit receiver.
    UnresolvedCall {
        receiver: LowId,
        method: Name,
        args: LowRange,
    },
    Check {
        kind: CheckKind,
        args: LowRange,
    },
    /// Checked one-dimensional allocation of `length` elements of `elem`.
    ArrayAlloc {
        elem: Ty,
        length: LowId,
    },
    /// `__Class::__class()`
    TypeIdentity {
        class: Name,
    },
    /// Console output; each argument is streamed in order.
    Print {
        args: LowRange,
        newline: bool,
    },
    /// Statement expression: run `stmts`, then evaluate to `result`.
    Block {
        stmts: LowStmtRange,
        result: LowId,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum LowStmt {
    Expr(LowId),
    Local {
        name: Name,
        ty: Ty,
        /// `LowId::INVALID` when uninitialized.
        init: LowId,
    },
    Block(LowStmtRange),
    If {
        cond: LowId,
        then_branch: LowStmtId,
        else_branch: LowStmtId,
    },
    While {
        cond: LowId,
        body: LowStmtId,
    },
    For {
        init: LowStmtRange,
        cond: LowId,
        update: LowRange,
        body: LowStmtId,
    },
    Return(LowId),
}

/// A lowered expression with the span of the source node it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct LowNode {
    pub kind: LowExpr,
    pub span: Span,
}
