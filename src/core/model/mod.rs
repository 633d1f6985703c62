//! Program model adapter.
//!
//! The compiled-language front end is an external collaborator: it parses
//! every translation unit and emits a JSON snapshot of declarations, member
//! accesses and its file table. This module loads that snapshot against the
//! build description and exposes it as an immutable [`ProgramModel`].

pub mod compile_db;
mod types;
mod unit;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub use types::{
    AccessExpression, AccessSpecifier, DeclarationKind, FileEntry, FileEntryKind,
    PhysicalLocation, SourceLocation, Symbol,
};
pub use unit::{TranslationUnit, Unit};

use crate::error::{Error, Result};
use crate::utils::io;

/// The snapshot file as written by the front end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub units: Vec<TranslationUnit>,
}

impl ModelSnapshot {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::model_load_failed(
                path.to_string_lossy(),
                "model snapshot not found",
            ));
        }
        let content = io::read_file(path, "read model snapshot")
            .map_err(|e| Error::model_load_failed(path.to_string_lossy(), e.details.to_string()))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::model_invalid_json(path.to_string_lossy(), e))
    }
}

/// Immutable snapshot of one analysis pass.
#[derive(Debug, Clone, Default)]
pub struct ProgramModel {
    units: Vec<Unit>,
    digests: BTreeMap<PathBuf, String>,
}

impl ProgramModel {
    /// Load the build description and the snapshot, keeping exactly the
    /// units the build lists. Fails when a listed unit has no model.
    pub fn load(compile_commands: &Path, snapshot_path: &Path) -> Result<Self> {
        let build_units = compile_db::load(compile_commands)?;
        let snapshot = ModelSnapshot::load(snapshot_path)?;

        log_status!(
            "model",
            "{} translation units in {}",
            build_units.len(),
            compile_commands.display()
        );

        let mut by_file: HashMap<PathBuf, TranslationUnit> = HashMap::new();
        for raw in snapshot.units {
            let key = crate::paths::normalize(Path::new(&raw.file));
            by_file.entry(key).or_insert(raw);
        }

        let mut selected = Vec::with_capacity(build_units.len());
        for unit_path in &build_units {
            let raw = by_file.remove(unit_path).ok_or_else(|| {
                Error::model_missing_unit(
                    unit_path.to_string_lossy(),
                    snapshot_path.to_string_lossy(),
                )
            })?;
            selected.push(raw);
        }

        for extra in by_file.keys() {
            log_status!(
                "model",
                "Ignoring {} (not in the compilation database)",
                extra.display()
            );
        }

        Self::from_units(selected)
    }

    /// Build a model from already-deserialized units.
    pub fn from_units(raw_units: Vec<TranslationUnit>) -> Result<Self> {
        let mut units = Vec::with_capacity(raw_units.len());
        let mut digests = BTreeMap::new();

        for raw in raw_units {
            let unit = Unit::index(raw)?;
            for (path, sha) in unit.physical_files() {
                if let Some(sha) = sha {
                    digests.entry(path).or_insert_with(|| sha.to_string());
                }
            }
            units.push(unit);
        }

        units.sort_by(|a, b| a.file.cmp(&b.file));
        Ok(Self { units, digests })
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// SHA-256 of `path` as the front end analyzed it, when recorded.
    pub fn digest(&self, path: &Path) -> Option<&str> {
        self.digests.get(path).map(String::as_str)
    }

    /// Every member of a type (fields, static fields, methods), keyed by
    /// symbol id. A rename must not land on any of these names.
    pub fn members(&self) -> BTreeMap<&str, &Symbol> {
        self.units
            .iter()
            .flat_map(|unit| unit.symbols())
            .filter(|symbol| !symbol.owner.is_empty())
            .map(|symbol| (symbol.id.as_str(), symbol))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SNAPSHOT: &str = r#"{"units": [
        {"file": "/proj/src/a.cpp",
         "files": [{"id": 0, "kind": "physical", "path": "/proj/src/a.cpp", "sha256": "aa"}],
         "symbols": [{"id": "c:@S@Foo@FI@Count", "name": "Count", "kind": "field",
                      "access": "private", "owner": "Foo", "location": {"file": 0, "offset": 4}}],
         "accesses": [{"symbol": "c:@S@Foo@FI@Count", "location": {"file": 0, "offset": 20}}]},
        {"file": "/proj/src/unused.cpp"}
    ]}"#;

    fn write_inputs(dir: &Path, database: &str) -> (PathBuf, PathBuf) {
        let db = dir.join("compile_commands.json");
        let model = dir.join("memberlint-model.json");
        fs::write(&db, database).unwrap();
        fs::write(&model, SNAPSHOT).unwrap();
        (db, model)
    }

    #[test]
    fn load_keeps_units_listed_in_database() {
        let dir = tempfile::tempdir().unwrap();
        let (db, model) = write_inputs(
            dir.path(),
            r#"[{"directory": "/proj/src", "file": "a.cpp", "command": "c++ -c a.cpp"}]"#,
        );

        let program = ProgramModel::load(&db, &model).unwrap();

        assert_eq!(program.units().len(), 1);
        assert_eq!(program.units()[0].file, PathBuf::from("/proj/src/a.cpp"));
        assert_eq!(program.digest(Path::new("/proj/src/a.cpp")), Some("aa"));
        assert_eq!(program.members().len(), 1);
    }

    #[test]
    fn load_fails_when_unit_has_no_model() {
        let dir = tempfile::tempdir().unwrap();
        let (db, model) = write_inputs(
            dir.path(),
            r#"[{"directory": "/proj/src", "file": "missing.cpp", "command": "c++ -c missing.cpp"}]"#,
        );

        let err = ProgramModel::load(&db, &model).unwrap_err();
        assert_eq!(err.code.as_str(), "model.missing_unit");
    }

    #[test]
    fn load_fails_without_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("compile_commands.json");
        fs::write(&db, "[]").unwrap();

        let err = ProgramModel::load(&db, &dir.path().join("nope.json")).unwrap_err();
        assert!(err.code.is_model_load());
    }
}
