//! Which member accesses are subject to the naming check.

use glob_match::glob_match;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::model::{AccessExpression, PhysicalLocation, Symbol, Unit};
use crate::paths;

/// Outcome of filtering one access expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeDecision {
    Checkable {
        access: PhysicalLocation,
        declaration: PhysicalLocation,
    },
    /// Call target, method, static member or other declaration kind.
    NotDataMember,
    Public,
    /// A location had no file behind it. Soft skip, not an error.
    Unresolved,
    OutsideRoot,
    Excluded,
}

/// Counts of why accesses were not checked.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScopeStats {
    pub not_data_member: usize,
    pub public: usize,
    pub unresolved: usize,
    pub outside_root: usize,
    pub excluded: usize,
}

impl ScopeStats {
    pub fn record(&mut self, decision: &ScopeDecision) {
        match decision {
            ScopeDecision::Checkable { .. } => {}
            ScopeDecision::NotDataMember => self.not_data_member += 1,
            ScopeDecision::Public => self.public += 1,
            ScopeDecision::Unresolved => self.unresolved += 1,
            ScopeDecision::OutsideRoot => self.outside_root += 1,
            ScopeDecision::Excluded => self.excluded += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScopeFilter {
    root: PathBuf,
    exclude: Vec<String>,
}

impl ScopeFilter {
    pub fn new(root: impl AsRef<Path>, exclude: Vec<String>) -> Self {
        Self {
            root: paths::normalize(root.as_ref()),
            exclude,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True when `path` is under the project root and matches no exclude glob.
    pub fn owns(&self, path: &Path) -> bool {
        paths::is_within(path, &self.root) && !self.is_excluded(path)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let relative = paths::display_relative(path, &self.root);
        self.exclude
            .iter()
            .any(|pattern| glob_match(pattern, &relative))
    }

    pub fn is_checkable(&self, unit: &Unit, access: &AccessExpression, symbol: &Symbol) -> bool {
        matches!(
            self.evaluate(unit, access, symbol),
            ScopeDecision::Checkable { .. }
        )
    }

    /// Classify one access. Both the access site and the declaration site
    /// are resolved to physical files before the boundary check.
    pub fn evaluate(&self, unit: &Unit, access: &AccessExpression, symbol: &Symbol) -> ScopeDecision {
        if access.is_call || !symbol.is_data_member() {
            return ScopeDecision::NotDataMember;
        }
        if symbol.access.is_public() {
            return ScopeDecision::Public;
        }

        let Some(site) = unit.resolve_physical(access.location) else {
            log_status!(
                "scope",
                "Skipping access to '{}' in {}: location has no file",
                symbol.name,
                unit.file.display()
            );
            return ScopeDecision::Unresolved;
        };
        let Some(declaration) = unit.resolve_physical(symbol.location) else {
            log_status!(
                "scope",
                "Skipping access to '{}' in {}: declaration has no file",
                symbol.name,
                unit.file.display()
            );
            return ScopeDecision::Unresolved;
        };

        if !paths::is_within(&site.path, &self.root)
            || !paths::is_within(&declaration.path, &self.root)
        {
            return ScopeDecision::OutsideRoot;
        }
        if self.is_excluded(&site.path) || self.is_excluded(&declaration.path) {
            return ScopeDecision::Excluded;
        }

        ScopeDecision::Checkable {
            access: site,
            declaration,
        }
    }
}
