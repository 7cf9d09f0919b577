//! Lowering configuration.

use clove_ir::Name;

/// Knobs for one lowering run. `Default` gives the standard runtime contract.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LowerOptions {
    /// Treat an unresolved call as an error instead of lowering it under
    /// its source name.
    pub strict_resolution: bool,
    /// Insert `checkNotNull` before calls through a receiver.
    pub null_checks: bool,
    /// Insert bounds, store and negative-length checks around arrays.
    pub array_checks: bool,
    /// Static method lowered as the program entry point.
    pub entry_point: Name,
    /// Name of the explicit receiver parameter.
    pub self_param: Name,
}

impl Default for LowerOptions {
    fn default() -> Self {
        LowerOptions {
            strict_resolution: false,
            null_checks: true,
            array_checks: true,
            entry_point: Name::MAIN,
            self_param: Name::SELF_PARAM,
        }
    }
}

impl LowerOptions {
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict_resolution = true;
        self
    }
}
