//! Programmatic construction of compilation units.
//!
//! This is the surface a parser drives. Every node gets a distinct synthetic
//! span so diagnostics and side tables can tell nodes apart.

use std::path::PathBuf;

use crate::ast::{
    BinaryOp, ChainTarget, ClassDecl, CompilationUnit, Expr, ExprArena, ExprKind, FieldDecl,
    MethodDecl, Modifiers, Param, Stmt, StmtKind, UnaryOp,
};
use crate::{ExprId, Name, Span, StmtId, StringInterner, Ty};

/// Index of a class declared through a [`UnitBuilder`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClassHandle(usize);

pub struct UnitBuilder<'a> {
    interner: &'a StringInterner,
    path: PathBuf,
    package: Vec<Name>,
    imports: Vec<PathBuf>,
    classes: Vec<ClassDecl>,
    arena: ExprArena,
    cursor: u32,
}

impl<'a> UnitBuilder<'a> {
    pub fn new(interner: &'a StringInterner, path: impl Into<PathBuf>) -> Self {
        UnitBuilder {
            interner,
            path: path.into(),
            package: Vec::new(),
            imports: Vec::new(),
            classes: Vec::new(),
            arena: ExprArena::new(),
            cursor: 0,
        }
    }

    pub fn interner(&self) -> &'a StringInterner {
        self.interner
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    pub fn class_ty(&self, name: &str) -> Ty {
        Ty::Class(self.name(name))
    }

    /// Set the package from dotted form (`"a.b"`).
    pub fn package(&mut self, dotted: &str) -> &mut Self {
        self.package = dotted
            .split('.')
            .filter(|s| !s.is_empty())
            .map(|s| self.interner.intern(s))
            .collect();
        self
    }

    pub fn import(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.imports.push(path.into());
        self
    }

    fn next_span(&mut self) -> Span {
        let start = self.cursor;
        self.cursor += 1;
        Span::new(start, start + 1)
    }

    // Declarations

    pub fn class(&mut self, name: &str, parent: Option<&str>) -> ClassHandle {
        let span = self.next_span();
        let decl = ClassDecl {
            name: self.name(name),
            parent: parent.map(|p| self.name(p)),
            fields: Vec::new(),
            methods: Vec::new(),
            span,
        };
        self.classes.push(decl);
        ClassHandle(self.classes.len() - 1)
    }

    pub fn field(
        &mut self,
        class: ClassHandle,
        modifiers: Modifiers,
        ty: Ty,
        name: &str,
        init: Option<ExprId>,
    ) {
        let span = self.next_span();
        let decl = FieldDecl {
            name: self.name(name),
            ty,
            init: init.unwrap_or(ExprId::INVALID),
            modifiers,
            span,
        };
        self.classes[class.0].fields.push(decl);
    }

    pub fn method(
        &mut self,
        class: ClassHandle,
        modifiers: Modifiers,
        ret: Ty,
        name: &str,
        params: &[(Ty, &str)],
        body: Vec<StmtId>,
    ) {
        let name = self.name(name);
        self.push_method(class, modifiers, ret, name, params, body);
    }

    /// Declare a constructor (a method named like its class).
    pub fn constructor(
        &mut self,
        class: ClassHandle,
        modifiers: Modifiers,
        params: &[(Ty, &str)],
        body: Vec<StmtId>,
    ) {
        let name = self.classes[class.0].name;
        self.push_method(class, modifiers, Ty::Void, name, params, body);
    }

    fn push_method(
        &mut self,
        class: ClassHandle,
        modifiers: Modifiers,
        ret: Ty,
        name: Name,
        params: &[(Ty, &str)],
        body: Vec<StmtId>,
    ) {
        let params = params
            .iter()
            .map(|(ty, param)| Param {
                name: self.name(param),
                ty: ty.clone(),
            })
            .collect();
        let body = self.block(body);
        let span = self.next_span();
        self.classes[class.0].methods.push(MethodDecl {
            name,
            params,
            ret,
            body,
            modifiers,
            span,
        });
    }

    // Expressions

    fn expr(&mut self, kind: ExprKind) -> ExprId {
        let span = self.next_span();
        self.arena.alloc_expr(Expr::new(kind, span))
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.expr(ExprKind::Int(value))
    }

    pub fn float(&mut self, value: f64) -> ExprId {
        self.expr(ExprKind::Float(value.to_bits()))
    }

    pub fn bool(&mut self, value: bool) -> ExprId {
        self.expr(ExprKind::Bool(value))
    }

    pub fn char(&mut self, value: char) -> ExprId {
        self.expr(ExprKind::Char(value))
    }

    pub fn str(&mut self, text: &str) -> ExprId {
        let name = self.name(text);
        self.expr(ExprKind::Str(name))
    }

    pub fn null(&mut self) -> ExprId {
        self.expr(ExprKind::Null)
    }

    pub fn ident(&mut self, name: &str) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::Ident(name))
    }

    pub fn this(&mut self) -> ExprId {
        self.expr(ExprKind::This)
    }

    pub fn super_ref(&mut self) -> ExprId {
        self.expr(ExprKind::Super)
    }

    pub fn field_access(&mut self, receiver: ExprId, name: &str) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::Field { receiver, name })
    }

    /// `receiver.method(args)`, or `method(args)` when `receiver` is `None`.
    pub fn call(&mut self, receiver: Option<ExprId>, method: &str, args: &[ExprId]) -> ExprId {
        let method = self.name(method);
        let args = self.arena.alloc_expr_list(args);
        self.expr(ExprKind::Call {
            receiver: receiver.unwrap_or(ExprId::INVALID),
            method,
            args,
        })
    }

    pub fn this_call(&mut self, args: &[ExprId]) -> ExprId {
        self.ctor_chain(ChainTarget::This, args)
    }

    pub fn super_call(&mut self, args: &[ExprId]) -> ExprId {
        self.ctor_chain(ChainTarget::Super, args)
    }

    fn ctor_chain(&mut self, target: ChainTarget, args: &[ExprId]) -> ExprId {
        let args = self.arena.alloc_expr_list(args);
        self.expr(ExprKind::CtorChain { target, args })
    }

    pub fn new_object(&mut self, class: &str, args: &[ExprId]) -> ExprId {
        let class = self.name(class);
        let args = self.arena.alloc_expr_list(args);
        self.expr(ExprKind::New { class, args })
    }

    /// `new elem[dims..][]..` with `extra_dims` trailing unsized dimensions.
    pub fn new_array(&mut self, elem: Ty, dims: &[ExprId], extra_dims: u8) -> ExprId {
        let dims = self.arena.alloc_expr_list(dims);
        self.expr(ExprKind::NewArray {
            elem,
            dims,
            extra_dims,
        })
    }

    pub fn index(&mut self, array: ExprId, index: ExprId) -> ExprId {
        self.expr(ExprKind::Index { array, index })
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId) -> ExprId {
        self.expr(ExprKind::Assign { target, value })
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.expr(ExprKind::Binary { op, left, right })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Unary { op, operand })
    }

    pub fn cast(&mut self, ty: Ty, expr: ExprId) -> ExprId {
        self.expr(ExprKind::Cast { ty, expr })
    }

    pub fn instance_of(&mut self, expr: ExprId, class: &str) -> ExprId {
        let class = self.name(class);
        self.expr(ExprKind::InstanceOf { expr, class })
    }

    /// `System.out.println(args)`
    pub fn println(&mut self, args: &[ExprId]) -> ExprId {
        let system = self.ident("System");
        let out = self.field_access(system, "out");
        self.call(Some(out), "println", args)
    }

    // Statements

    fn stmt(&mut self, kind: StmtKind) -> StmtId {
        let span = self.next_span();
        self.arena.alloc_stmt(Stmt::new(kind, span))
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn local(&mut self, ty: Ty, name: &str, init: Option<ExprId>) -> StmtId {
        let name = self.name(name);
        self.stmt(StmtKind::Local {
            name,
            ty,
            init: init.unwrap_or(ExprId::INVALID),
        })
    }

    pub fn block(&mut self, stmts: Vec<StmtId>) -> StmtId {
        let range = self.arena.alloc_stmt_list(&stmts);
        self.stmt(StmtKind::Block(range))
    }

    pub fn if_stmt(&mut self, cond: ExprId, then_branch: StmtId, else_branch: Option<StmtId>) -> StmtId {
        self.stmt(StmtKind::If {
            cond,
            then_branch,
            else_branch: else_branch.unwrap_or(StmtId::INVALID),
        })
    }

    pub fn while_stmt(&mut self, cond: ExprId, body: StmtId) -> StmtId {
        self.stmt(StmtKind::While { cond, body })
    }

    pub fn for_stmt(
        &mut self,
        init: Vec<StmtId>,
        cond: Option<ExprId>,
        update: &[ExprId],
        body: StmtId,
    ) -> StmtId {
        let init = self.arena.alloc_stmt_list(&init);
        let update = self.arena.alloc_expr_list(update);
        self.stmt(StmtKind::For {
            init,
            cond: cond.unwrap_or(ExprId::INVALID),
            update,
            body,
        })
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> StmtId {
        self.stmt(StmtKind::Return(value.unwrap_or(ExprId::INVALID)))
    }

    pub fn finish(self) -> CompilationUnit {
        CompilationUnit {
            path: self.path,
            package: self.package,
            imports: self.imports,
            classes: self.classes,
            arena: self.arena,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_records_class_members() {
        let interner = StringInterner::new();
        let mut b = UnitBuilder::new(&interner, "Main.java");
        b.package("demo.zoo");
        let dog = b.class("Dog", Some("Animal"));
        let one = b.int(1);
        b.field(dog, Modifiers::empty(), Ty::Int, "legs", Some(one));
        b.constructor(dog, Modifiers::PUBLIC, &[], vec![]);
        let unit = b.finish();

        assert_eq!(unit.package.len(), 2);
        let class = &unit.classes[0];
        assert_eq!(class.parent_or_root(), interner.intern("Animal"));
        assert_eq!(class.fields[0].init, one);
        assert!(class.has_constructor());
        assert!(matches!(
            unit.arena.stmt_kind(class.methods[0].body),
            StmtKind::Block(range) if range.is_empty()
        ));
    }

    #[test]
    fn test_builder_spans_are_distinct() {
        let interner = StringInterner::new();
        let mut b = UnitBuilder::new(&interner, "A.java");
        let a = b.int(1);
        let c = b.int(2);
        let unit = b.finish();
        assert_ne!(unit.arena.span(a), unit.arena.span(c));
    }

    #[test]
    fn test_println_shape() {
        let interner = StringInterner::new();
        let mut b = UnitBuilder::new(&interner, "A.java");
        let arg = b.int(3);
        let call = b.println(&[arg]);
        let unit = b.finish();
        let ExprKind::Call { receiver, method, args } = unit.arena.kind(call) else {
            panic!("expected call");
        };
        assert_eq!(*method, Name::PRINTLN);
        assert_eq!(unit.arena.expr_list(*args), &[arg]);
        assert!(matches!(
            unit.arena.kind(*receiver),
            ExprKind::Field { name, .. } if *name == Name::OUT
        ));
    }
}
