//! Lowering errors.
//!
//! Only configuration errors and broken invariants are errors. A call the
//! type facade could not resolve is not: it is lowered under its source
//! name unless strict resolution is requested.

use clove_ir::{Name, Span};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LowerError {
    /// The parent chain of `class` loops back on itself.
    #[error("inheritance cycle through class {class:?}")]
    InheritanceCycle { class: Name },

    #[error("class {class:?} extends unknown class {parent:?}")]
    UnknownParent { class: Name, parent: Name },

    /// A class reached lowering with no resolved initializer list.
    #[error("no resolved initializers for class {class:?}")]
    MissingInitializers { class: Name },

    /// An annotation a later pass relies on is absent, e.g. a call with a
    /// resolved target but no dispatch kind.
    #[error("missing {annotation} for `{method:?}` at {span}")]
    MissingAnnotation {
        method: Name,
        annotation: &'static str,
        span: Span,
    },

    /// Strict resolution only.
    #[error("unresolved call to `{method:?}` at {span}")]
    UnresolvedCall { method: Name, span: Span },
}
