//! Clove Emit - C++ text for lowered units
//!
//! A pure serializer: every decision about dispatch, checks, layout and
//! naming was made by `clove_lower`. This crate only spells the lowered
//! tree as a header (forward declarations, data layout structs, vtable
//! structs) and a body (constructors, type identity, vtable and static
//! storage, method definitions, and the process entry wrapper).
//!
//! # Pipeline Position
//!
//! ```text
//! clove_lower (LoweredUnit) → clove_emit (header + body text)
//! ```
//!
//! Generated code links against the runtime support library named by
//! [`EmitOptions::runtime`], which provides `Ptr`, `Array`, the root
//! classes, `literal`, `null`, `java_cast`, `instanceOf` and the check
//! routines.

mod code;
mod emitter;
mod names;
mod options;
mod unit;

pub use emitter::{Emitter, InlineEmitter, StringEmitter};
pub use options::EmitOptions;
pub use unit::EmittedUnit;

use clove_ir::{LoweredUnit, StringInterner};
use tracing::debug;

use crate::unit::{header_name, UnitPrinter};

/// Print one lowered unit as a header and a body.
pub fn emit_unit(
    unit: &LoweredUnit,
    interner: &StringInterner,
    options: &EmitOptions,
) -> EmittedUnit {
    let header_name = header_name(&unit.path);

    let printer = UnitPrinter::new(unit, interner, options);
    let header = printer.header();
    let body = printer.body(&header_name);
    debug!(
        path = %unit.path.display(),
        header = header.len(),
        body = body.len(),
        "unit emitted"
    );
    EmittedUnit {
        path: unit.path.clone(),
        header_name,
        header,
        body,
    }
}

/// Print every unit, in order.
pub fn emit_program(
    units: &[LoweredUnit],
    interner: &StringInterner,
    options: &EmitOptions,
) -> Vec<EmittedUnit> {
    units
        .iter()
        .map(|unit| emit_unit(unit, interner, options))
        .collect()
}
