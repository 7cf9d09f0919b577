//! Emission configuration.

/// Knobs for printing lowered units as C++.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmitOptions {
    /// Spaces per nesting level.
    pub indent_width: usize,
    /// Namespace of the runtime support library.
    pub runtime: String,
    /// Header every generated header includes for the runtime.
    pub runtime_header: String,
    /// Wrap each unit's declarations in its package's namespaces.
    pub namespaces: bool,
    /// Emit a C `main` that forwards to the unit's entry point.
    pub entry_wrapper: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions {
            indent_width: 4,
            runtime: "__rt".to_owned(),
            runtime_header: "clove_rt.h".to_owned(),
            namespaces: true,
            entry_wrapper: true,
        }
    }
}
