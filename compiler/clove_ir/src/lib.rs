//! Clove IR - program representations for object-model lowering
//!
//! This crate holds the data both sides of lowering agree on:
//! - Spans and interned names
//! - Source-level types
//! - The source AST ([`ast`]) in a flat arena
//! - The lowered, layout-level IR ([`lowered`]) in its own arena
//! - A builder ([`build`]) for constructing units without a parser
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers are `Name(u32)`
//! - **Flatten Everything**: children are `ExprId`/`LowId` indices, lists are ranges
//! - **Never Rewrite In Place**: lowering reads an [`ExprArena`] and fills a
//!   fresh [`LowArena`]
//!
//! Floats are stored as u64 bits so nodes stay hashable.

pub mod ast;
pub mod build;
mod ids;
mod interner;
pub mod lowered;
mod name;
mod span;
mod ty;

pub use ast::{
    BinaryOp, ChainTarget, ClassDecl, CompilationUnit, Expr, ExprArena, ExprKind, FieldDecl,
    MethodDecl, Modifiers, Param, Stmt, StmtKind, UnaryOp,
};
pub use build::{ClassHandle, UnitBuilder};
pub use ids::{ExprId, ExprRange, LowId, LowRange, LowStmtId, LowStmtRange, StmtId, StmtRange};
pub use interner::{InternError, StringInterner};
pub use lowered::{
    CheckKind, ClassLayout, DataMember, DefaultCtor, LowArena, LowExpr, LowParam, LowStmt,
    LoweredMethod, LoweredUnit, MemberInit, MethodKind, SlotBinding, StaticStorage, TypeIdentity,
    VtableInit, VtableLayout, VtableSlot,
};
pub use name::Name;
pub use span::Span;
pub use ty::Ty;
