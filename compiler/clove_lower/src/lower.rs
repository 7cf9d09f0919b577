//! Lowering entry points.

use clove_ir::{CompilationUnit, LoweredUnit, StringInterner};
use clove_types::{check_unit, ClassTable, TypeQuery, TypedUnit, UnitQuery};
use tracing::debug;

use crate::init_chain;
use crate::layout::VtableSet;
use crate::mangle::{mangle_program, MangleTable, UnitCalls};
use crate::rewrite::Lowerer;
use crate::{InitializerChain, LowerError, LowerOptions};

/// Whole-program facts every unit's lowering reads.
#[derive(Clone, Debug, Default)]
pub struct ProgramFacts {
    pub mangle: MangleTable,
    pub chains: InitializerChain,
    pub vtables: VtableSet,
}

impl ProgramFacts {
    /// Mangle every unit, resolve every initializer chain and build every
    /// vtable. `queries[i]` must be the facade for `units[i]`.
    ///
    /// # Errors
    ///
    /// An inheritance cycle or an unknown parent class.
    pub fn analyze<Q: TypeQuery>(
        table: &ClassTable,
        units: &[CompilationUnit],
        queries: &[Q],
        interner: &StringInterner,
        options: &LowerOptions,
    ) -> Result<Self, LowerError> {
        let mangle = mangle_program(units, queries, interner, options);
        let (parents, raw) = init_chain::collect(table);
        let chains = init_chain::resolve(&parents, &raw)?;
        let vtables = VtableSet::compute(table, &mangle.record, interner)?;
        debug!(
            mangled = mangle.record.len(),
            chains = chains.len(),
            "program facts"
        );
        Ok(ProgramFacts {
            mangle,
            chains,
            vtables,
        })
    }
}

/// Lower the classes `unit` owns.
///
/// Classes whose table entry belongs to another unit (duplicate
/// declarations) are skipped.
///
/// # Errors
///
/// A broken annotation invariant, or an unresolved call under strict
/// resolution.
pub fn lower_unit<Q: TypeQuery>(
    unit_index: usize,
    unit: &CompilationUnit,
    query: &Q,
    facts: &ProgramFacts,
    interner: &StringInterner,
    options: &LowerOptions,
) -> Result<LoweredUnit, LowerError> {
    let empty = UnitCalls::default();
    let calls = facts.mangle.unit(unit_index).unwrap_or(&empty);
    let mut lowerer = Lowerer::new(
        unit,
        query,
        &facts.mangle.record,
        calls,
        &facts.chains,
        &facts.vtables,
        interner,
        options,
    );

    let mut classes = Vec::with_capacity(unit.classes.len());
    for decl in &unit.classes {
        let owned = query
            .class(decl.name)
            .is_some_and(|info| info.unit == Some(unit_index));
        if !owned {
            continue;
        }
        classes.push(lowerer.synthesize_class(decl)?);
    }

    let result = LoweredUnit {
        path: unit.path.clone(),
        package: unit.package.clone(),
        imports: unit.imports.clone(),
        classes,
        arena: lowerer.arena,
    };

    #[cfg(debug_assertions)]
    crate::validate(&result);

    debug!(
        path = %result.path.display(),
        classes = result.classes.len(),
        nodes = result.arena.expr_count(),
        "unit lowered"
    );
    Ok(result)
}

/// Build the class table, check, and lower every unit, sequentially.
///
/// # Errors
///
/// The first error of any unit, in unit order.
pub fn lower_program(
    units: &[CompilationUnit],
    interner: &StringInterner,
    options: &LowerOptions,
) -> Result<Vec<LoweredUnit>, LowerError> {
    let table = ClassTable::build(units, interner);
    let typed: Vec<TypedUnit> = units
        .iter()
        .enumerate()
        .map(|(index, unit)| check_unit(&table, index, unit))
        .collect();
    let queries: Vec<UnitQuery<'_>> = typed.iter().map(|t| UnitQuery::new(&table, t)).collect();

    let facts = ProgramFacts::analyze(&table, units, &queries, interner, options)?;
    units
        .iter()
        .zip(&queries)
        .enumerate()
        .map(|(index, (unit, query))| lower_unit(index, unit, query, &facts, interner, options))
        .collect()
}
