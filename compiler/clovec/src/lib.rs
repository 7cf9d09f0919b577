//! Clove compiler driver
//!
//! Runs the whole object-model lowering pipeline for a program:
//!
//! ```text
//! entry unit ─► source set ─► class table ─► per-unit annotation (parallel)
//!            ─► program facts (mangling, initializer chains, vtables)
//!            ─► per-unit lowering (parallel) ─► C++ header/body text
//! ```
//!
//! There is no text parser. Units come from a [`SourceLoader`], which
//! hands out units built with `clove_ir::UnitBuilder`.

mod error;
mod pipeline;
mod source_set;

use std::sync::Once;

pub use error::{PipelineError, SourceError};
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput};
pub use source_set::{resolve_source_set, MemoryLoader, SourceLoader};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debugging.
///
/// Set `RUST_LOG=clove_lower=debug` (or `trace`) to see per-class slot
/// counts, mangled names and per-call resolution. Spans print as a tree.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};
        use tracing_tree::HierarchicalLayer;

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .init();
        }
    });
}
