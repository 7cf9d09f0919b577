//! Object-model lowering for the Clove compiler.
//!
//! This crate turns type-annotated compilation units of a class-based
//! language (single inheritance, overloading, virtual dispatch) into the
//! layout-level IR of `clove_ir::lowered`: explicit data layouts, vtables,
//! two-phase construction and explicitly dispatched calls.
//!
//! # Pipeline Position
//!
//! ```text
//! Parse → Class Table → Type Check → **Lower** → clove_emit
//! ```
//!
//! # Phases
//!
//! 1. **Mangling** (`mangle`): every overload gets a unique per-class name;
//!    every call site is resolved to one of them
//! 2. **Initializer chains** (`init_chain`): the ancestor-first field list
//!    of every class, with in-place overriding
//! 3. **Vtables** (`layout::vtable`): inherited slots first, rebound where
//!    a class overrides; new virtual methods appended
//! 4. **Rewriting** (`rewrite`): method bodies become explicit virtual,
//!    direct and qualified calls, with null and array checks
//! 5. **Synthesis** (`layout`): per-class data members, statics, type
//!    identity, default constructor and `__init` routines
//!
//! Phases 1-3 need the whole program and run once ([`ProgramFacts`]).
//! Phases 4-5 are per unit and independent of one another.

mod error;
mod init_chain;
mod layout;
mod lower;
mod mangle;
mod options;
mod rewrite;
mod validate;
mod walk;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::LowerError;
pub use init_chain::{
    collect as collect_initializers, resolve as resolve_initializers, DefaultLiteral, Initializer,
    InitializerChain, ParentMap, RawInitializers,
};
pub use layout::{ClassVtable, VtableSet};
pub use lower::{lower_program, lower_unit, ProgramFacts};
pub use mangle::{
    mangle_program, CallResolver, CallTarget, DeclNamer, MangleRecord, MangleTable, UnitCalls,
};
pub use options::LowerOptions;
pub use rewrite::{chains_constructor, Mode, RewriteCtx};
pub use validate::validate;
