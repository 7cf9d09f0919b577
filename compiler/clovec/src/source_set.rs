//! Source-set resolution.
//!
//! Starting from an entry unit, follow imports breadth-first until every
//! reachable unit is loaded. Units are identified by canonical path, so a
//! unit reached along several import paths (or through an import cycle) is
//! loaded once.

use std::collections::VecDeque;
use std::path::{Component, Path, PathBuf};

use clove_ir::CompilationUnit;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::SourceError;

/// Where units come from.
pub trait SourceLoader {
    /// Canonical identity of `path`. Two paths naming the same unit must
    /// canonicalize to the same value.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf, SourceError>;

    /// Load the unit at a canonical path.
    fn load(&self, path: &Path) -> Result<CompilationUnit, SourceError>;
}

/// Every unit reachable from `entry`, in breadth-first discovery order.
///
/// # Errors
///
/// The first path that cannot be canonicalized or loaded.
pub fn resolve_source_set<L: SourceLoader>(
    loader: &L,
    entry: &Path,
) -> Result<Vec<CompilationUnit>, SourceError> {
    let entry = loader.canonicalize(entry)?;
    let mut seen = FxHashSet::default();
    let mut queue = VecDeque::new();
    seen.insert(entry.clone());
    queue.push_back(entry);

    let mut units = Vec::new();
    while let Some(path) = queue.pop_front() {
        let unit = loader.load(&path)?;
        for import in &unit.imports {
            let canonical = loader.canonicalize(import)?;
            if seen.insert(canonical.clone()) {
                queue.push_back(canonical);
            } else {
                trace!(import = %canonical.display(), "already in source set");
            }
        }
        debug!(path = %path.display(), imports = unit.imports.len(), "unit loaded");
        units.push(unit);
    }
    Ok(units)
}

/// In-memory loader over units built with `clove_ir::UnitBuilder`.
///
/// Paths are canonicalized lexically: `.` components are dropped and `..`
/// removes the preceding component.
#[derive(Default)]
pub struct MemoryLoader {
    units: FxHashMap<PathBuf, CompilationUnit>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `unit` under its own path.
    ///
    /// # Errors
    ///
    /// The unit's path climbs above the root.
    pub fn insert(&mut self, unit: CompilationUnit) -> Result<(), SourceError> {
        let path = normalize(&unit.path)?;
        self.units.insert(path, unit);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl SourceLoader for MemoryLoader {
    fn canonicalize(&self, path: &Path) -> Result<PathBuf, SourceError> {
        normalize(path)
    }

    fn load(&self, path: &Path) -> Result<CompilationUnit, SourceError> {
        self.units
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                path: path.to_path_buf(),
            })
    }
}

fn normalize(path: &Path) -> Result<PathBuf, SourceError> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return Err(SourceError::OutsideRoot {
                        path: path.to_path_buf(),
                    });
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}
