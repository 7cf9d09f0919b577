//! Source-level program representation.
//!
//! A [`CompilationUnit`] is one source file: its package, its imports (as
//! paths), its class declarations, and a flat [`ExprArena`] holding every
//! expression and statement of every method body and field initializer.

mod arena;
mod expr;
mod stmt;

use std::path::PathBuf;

use bitflags::bitflags;

pub use arena::ExprArena;
pub use expr::{BinaryOp, ChainTarget, Expr, ExprKind, UnaryOp};
pub use stmt::{Stmt, StmtKind};

use crate::{ExprId, Name, Span, StmtId, Ty};

bitflags! {
    /// Declaration modifiers.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const STATIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const FINAL = 1 << 2;
        const PUBLIC = 1 << 3;
        const PROTECTED = 1 << 4;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Name,
    pub ty: Ty,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: Ty,
    /// Explicit initializer, or `ExprId::INVALID`.
    pub init: ExprId,
    pub modifiers: Modifiers,
    pub span: Span,
}

impl FieldDecl {
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodDecl {
    pub name: Name,
    pub params: Vec<Param>,
    /// `Ty::Void` for constructors.
    pub ret: Ty,
    /// Always a `StmtKind::Block`.
    pub body: StmtId,
    pub modifiers: Modifiers,
    pub span: Span,
}

impl MethodDecl {
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    pub fn is_private(&self) -> bool {
        self.modifiers.contains(Modifiers::PRIVATE)
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.contains(Modifiers::FINAL)
    }

    /// A method named like its class is a constructor.
    pub fn is_constructor(&self, class: Name) -> bool {
        self.name == class
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDecl {
    pub name: Name,
    /// `None` means the class implicitly extends `Object`.
    pub parent: Option<Name>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

impl ClassDecl {
    pub fn parent_or_root(&self) -> Name {
        self.parent.unwrap_or(Name::OBJECT)
    }

    pub fn has_constructor(&self) -> bool {
        self.methods.iter().any(|m| m.is_constructor(self.name))
    }
}

#[derive(Clone, Debug)]
pub struct CompilationUnit {
    pub path: PathBuf,
    /// Package segments, outermost first. Empty for the default package.
    pub package: Vec<Name>,
    pub imports: Vec<PathBuf>,
    pub classes: Vec<ClassDecl>,
    pub arena: ExprArena,
}
