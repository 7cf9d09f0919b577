//! Type query facade consumed by lowering.

use clove_ir::{ExprId, Name, Ty};

use crate::{
    ClassInfo, ClassTable, DispatchKind, FieldInfo, FieldRef, IdentRes, MethodInfo, MethodRef,
    Scope, TypedUnit,
};

/// Everything lowering asks about types, scoped to one unit.
///
/// Lowering depends only on this trait so it can be driven by a different
/// front end, or by hand-built annotations in tests.
pub trait TypeQuery {
    /// Static type of `name` in `scope`: a local or parameter of the scope's
    /// method, else a field visible on the scope's class.
    fn type_of(&self, scope: Scope, name: Name) -> Option<Ty>;

    fn expr_type(&self, expr: ExprId) -> Option<&Ty>;

    fn resolve_overload(&self, class: Name, name: Name, args: &[Option<Ty>]) -> Option<MethodRef>;

    fn direct_supertype(&self, class: Name) -> Option<Name>;

    fn fields_own_and_inherited(&self, class: Name) -> Vec<FieldRef>;

    fn method(&self, method: MethodRef) -> Option<&MethodInfo>;

    fn field(&self, field: FieldRef) -> Option<&FieldInfo>;

    fn class(&self, name: Name) -> Option<&ClassInfo>;

    fn dispatch_kind(&self, call: ExprId) -> Option<DispatchKind>;

    fn ident(&self, expr: ExprId) -> Option<IdentRes>;

    fn is_class(&self, name: Name) -> bool {
        self.class(name).is_some()
    }
}

/// [`TypeQuery`] over the program's class table and one unit's annotations.
#[derive(Copy, Clone)]
pub struct UnitQuery<'a> {
    pub table: &'a ClassTable,
    pub typed: &'a TypedUnit,
}

impl<'a> UnitQuery<'a> {
    pub fn new(table: &'a ClassTable, typed: &'a TypedUnit) -> Self {
        UnitQuery { table, typed }
    }
}

impl TypeQuery for UnitQuery<'_> {
    fn type_of(&self, scope: Scope, name: Name) -> Option<Ty> {
        if let Some(ty) = scope
            .method
            .and_then(|method| self.typed.local_type(method, name))
        {
            return Some(ty.clone());
        }
        let field = self.table.lookup_field(scope.class, name)?;
        self.table.field(field).map(|f| f.ty.clone())
    }

    fn expr_type(&self, expr: ExprId) -> Option<&Ty> {
        self.typed.expr_type(expr)
    }

    fn resolve_overload(&self, class: Name, name: Name, args: &[Option<Ty>]) -> Option<MethodRef> {
        self.table.resolve_overload(class, name, args)
    }

    fn direct_supertype(&self, class: Name) -> Option<Name> {
        self.table.direct_supertype(class)
    }

    fn fields_own_and_inherited(&self, class: Name) -> Vec<FieldRef> {
        self.table.fields_own_and_inherited(class)
    }

    fn method(&self, method: MethodRef) -> Option<&MethodInfo> {
        self.table.method(method)
    }

    fn field(&self, field: FieldRef) -> Option<&FieldInfo> {
        self.table.field(field)
    }

    fn class(&self, name: Name) -> Option<&ClassInfo> {
        self.table.class(name)
    }

    fn dispatch_kind(&self, call: ExprId) -> Option<DispatchKind> {
        self.typed.call(call).map(|info| info.dispatch)
    }

    fn ident(&self, expr: ExprId) -> Option<IdentRes> {
        self.typed.ident(expr)
    }
}
