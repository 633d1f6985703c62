//! One analyzed translation unit and its location resolution.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use super::types::{AccessExpression, FileEntry, FileEntryKind, PhysicalLocation, SourceLocation, Symbol};
use crate::error::{Error, Result};
use crate::paths;

/// A translation unit exactly as it appears in the model snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// Main source file of the unit.
    pub file: String,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    #[serde(default)]
    pub accesses: Vec<AccessExpression>,
}

/// A translation unit with its tables indexed.
#[derive(Debug, Clone)]
pub struct Unit {
    pub file: PathBuf,
    files: HashMap<u32, FileEntryKind>,
    symbols: HashMap<String, Symbol>,
    accesses: Vec<AccessExpression>,
}

impl Unit {
    /// Index a raw unit. Every access must be bound to a symbol of the same
    /// unit; anything else means the front end emitted a broken model.
    pub fn index(raw: TranslationUnit) -> Result<Self> {
        let file = paths::normalize(std::path::Path::new(&raw.file));
        let files: HashMap<u32, FileEntryKind> =
            raw.files.into_iter().map(|entry| (entry.id, entry.kind)).collect();
        let symbols: HashMap<String, Symbol> = raw
            .symbols
            .into_iter()
            .map(|symbol| (symbol.id.clone(), symbol))
            .collect();

        if let Some(unbound) = raw
            .accesses
            .iter()
            .find(|access| !symbols.contains_key(&access.symbol))
        {
            return Err(Error::model_load_failed(
                file.to_string_lossy(),
                format!("access at offset {} is bound to unknown symbol '{}'", unbound.location.offset, unbound.symbol),
            ));
        }

        Ok(Self {
            file,
            files,
            symbols,
            accesses: raw.accesses,
        })
    }

    pub fn symbol(&self, id: &str) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn accesses(&self) -> &[AccessExpression] {
        &self.accesses
    }

    /// Physical files of this unit with the digest the front end saw.
    pub fn physical_files(&self) -> impl Iterator<Item = (PathBuf, Option<&str>)> {
        self.files.values().filter_map(|kind| match kind {
            FileEntryKind::Physical { path, sha256 } => Some((
                paths::normalize(std::path::Path::new(path)),
                sha256.as_deref(),
            )),
            _ => None,
        })
    }

    /// Map a location to the file on disk that holds its token.
    ///
    /// Fallback chain: direct file entry, then the spelling location of a
    /// macro expansion (followed through nested expansions), then give up.
    /// The walk is bounded by the table size so a cyclic table cannot hang.
    pub fn resolve_physical(&self, location: SourceLocation) -> Option<PhysicalLocation> {
        let mut current = location;
        for _ in 0..=self.files.len() {
            match self.files.get(&current.file)? {
                FileEntryKind::Physical { path, .. } => {
                    return Some(PhysicalLocation {
                        path: paths::normalize(std::path::Path::new(path)),
                        offset: current.offset,
                        line: current.line,
                        column: current.column,
                    });
                }
                FileEntryKind::Expansion { spelling } => current = *spelling,
                FileEntryKind::Virtual { .. } => return None,
            }
        }
        None
    }
}
