//! Clove Types - class table and per-unit type annotations
//!
//! Two layers:
//! - [`ClassTable`]: whole-program class metadata, inheritance, assignability
//!   and overload resolution. Built once.
//! - [`TypedUnit`]: per-unit side tables (expression types, identifier
//!   resolutions, call targets with their [`DispatchKind`]).
//!
//! [`UnitQuery`] binds the two behind the [`TypeQuery`] trait, which is all
//! lowering sees.

mod check;
mod flags;
mod query;
mod table;

pub use check::{check_unit, CallInfo, DispatchKind, IdentRes, Scope, TypedUnit};
pub use flags::MethodFlags;
pub use query::{TypeQuery, UnitQuery};
pub use table::{
    Ancestors, ClassInfo, ClassTable, FieldInfo, FieldRef, MethodInfo, MethodRef, ParamTys,
};
