//! Source expressions.

use crate::{ExprId, ExprRange, Name, Span, Ty};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    /// Increment/decrement write their operand.
    pub fn mutates(self) -> bool {
        matches!(
            self,
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
        )
    }
}

/// Target of a constructor-chaining call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChainTarget {
    /// `this(...)`: another constructor of the same class.
    This,
    /// `super(...)`: a constructor of the direct superclass.
    Super,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Int(i64),
    /// Stored as bits so the node stays `Eq`-friendly for tests.
    Float(u64),
    Bool(bool),
    Char(char),
    Str(Name),
    Null,
    /// A bare identifier: local, parameter, field, or class name.
    Ident(Name),
    This,
    Super,
    /// `receiver.name`
    Field {
        receiver: ExprId,
        name: Name,
    },
    /// `receiver.method(args)`; `receiver` is `ExprId::INVALID` when implicit.
    Call {
        receiver: ExprId,
        method: Name,
        args: ExprRange,
    },
    /// `this(args)` / `super(args)` inside a constructor body.
    CtorChain {
        target: ChainTarget,
        args: ExprRange,
    },
    /// `new Class(args)`
    New {
        class: Name,
        args: ExprRange,
    },
    /// `new elem[d0][d1]..[]..`: `dims` are the sized dimensions,
    /// `extra_dims` the trailing unsized ones.
    NewArray {
        elem: Ty,
        dims: ExprRange,
        extra_dims: u8,
    },
    Index {
        array: ExprId,
        index: ExprId,
    },
    Assign {
        target: ExprId,
        value: ExprId,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Cast {
        ty: Ty,
        expr: ExprId,
    },
    InstanceOf {
        expr: ExprId,
        class: Name,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}
