//! The lowering pipeline, from source set to emitted text.

use std::path::Path;

use clove_emit::{emit_unit, EmitOptions, EmittedUnit};
use clove_ir::{CompilationUnit, LoweredUnit, StringInterner};
use clove_lower::{lower_unit, LowerOptions, ProgramFacts};
use clove_types::{check_unit, ClassTable, TypedUnit, UnitQuery};
use rayon::prelude::*;
use tracing::{debug, debug_span};

use crate::source_set::{resolve_source_set, SourceLoader};
use crate::PipelineError;

/// Options for one pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    pub lower: LowerOptions,
    pub emit: EmitOptions,
    /// Print C++ text; when off the run stops after lowering.
    pub emit_text: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            lower: LowerOptions::default(),
            emit: EmitOptions::default(),
            emit_text: true,
        }
    }
}

/// Everything a successful run produced, in source-set order.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub units: Vec<CompilationUnit>,
    pub lowered: Vec<LoweredUnit>,
    /// Empty unless `emit_text` was set.
    pub emitted: Vec<EmittedUnit>,
}

pub struct Pipeline<'a> {
    interner: &'a StringInterner,
    config: PipelineConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(interner: &'a StringInterner, config: PipelineConfig) -> Self {
        Pipeline { interner, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resolve the source set reachable from `entry`, then lower it.
    ///
    /// # Errors
    ///
    /// A unit that cannot be loaded, or any lowering error.
    pub fn run<L: SourceLoader>(
        &self,
        loader: &L,
        entry: &Path,
    ) -> Result<PipelineOutput, PipelineError> {
        let units = {
            let _span = debug_span!("source_set", entry = %entry.display()).entered();
            resolve_source_set(loader, entry)?
        };
        self.run_units(units)
    }

    /// Lower an already-resolved program.
    ///
    /// # Errors
    ///
    /// An inheritance cycle or unknown parent anywhere in the program, or a
    /// per-unit lowering error.
    pub fn run_units(&self, units: Vec<CompilationUnit>) -> Result<PipelineOutput, PipelineError> {
        let interner = self.interner;
        let options = &self.config.lower;

        let table = {
            let _span = debug_span!("class_table", units = units.len()).entered();
            ClassTable::build(&units, interner)
        };

        let typed: Vec<TypedUnit> = {
            let _span = debug_span!("annotate").entered();
            units
                .par_iter()
                .enumerate()
                .map(|(index, unit)| check_unit(&table, index, unit))
                .collect()
        };
        let queries: Vec<UnitQuery<'_>> = typed.iter().map(|t| UnitQuery::new(&table, t)).collect();

        let facts = {
            let _span = debug_span!("program_facts").entered();
            ProgramFacts::analyze(&table, &units, &queries, interner, options)
                .map_err(PipelineError::Program)?
        };

        let lowered = {
            let _span = debug_span!("lower").entered();
            units
                .par_iter()
                .zip(queries.par_iter())
                .enumerate()
                .map(|(index, (unit, query))| {
                    lower_unit(index, unit, query, &facts, interner, options).map_err(|source| {
                        PipelineError::Lower {
                            path: unit.path.clone(),
                            source,
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let emitted = if self.config.emit_text {
            let _span = debug_span!("emit").entered();
            lowered
                .par_iter()
                .map(|unit| emit_unit(unit, interner, &self.config.emit))
                .collect()
        } else {
            Vec::new()
        };

        debug!(
            units = units.len(),
            classes = lowered.iter().map(|u| u.classes.len()).sum::<usize>(),
            "pipeline finished"
        );
        Ok(PipelineOutput {
            units,
            lowered,
            emitted,
        })
    }
}
