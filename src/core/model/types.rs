//! Entities of one translation unit as emitted by the front end.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::PathBuf;

/// A location inside one unit's file table. Offsets are byte offsets of the
/// member-name token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: u32,
    pub offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

/// How a file-table entry maps to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileEntryKind {
    /// A real file on disk.
    Physical {
        path: String,
        /// Digest of the content the front end analyzed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sha256: Option<String>,
    },
    /// A macro expansion buffer; the token was spelled at `spelling`.
    Expansion { spelling: SourceLocation },
    /// A buffer with no file behind it (`<built-in>`, `<scratch space>`).
    Virtual { name: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: u32,
    #[serde(flatten)]
    pub kind: FileEntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Field,
    Method,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessSpecifier {
    Public,
    Protected,
    Private,
}

impl AccessSpecifier {
    pub fn is_public(&self) -> bool {
        matches!(self, AccessSpecifier::Public)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    /// Stable identity shared by every unit that sees this declaration.
    pub id: String,
    pub name: String,
    pub kind: DeclarationKind,
    pub access: AccessSpecifier,
    #[serde(default)]
    pub is_static: bool,
    /// Owning type, used for rename collision checks.
    #[serde(default)]
    pub owner: String,
    pub location: SourceLocation,
}

impl Symbol {
    pub fn is_data_member(&self) -> bool {
        self.kind == DeclarationKind::Field && !self.is_static
    }
}

/// An `object.member` occurrence bound to one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessExpression {
    pub symbol: String,
    pub location: SourceLocation,
    #[serde(default)]
    pub is_call: bool,
}

/// A location after macro indirection has been resolved.
///
/// Equality and ordering use path and offset only; line and column are
/// carried for display.
#[derive(Debug, Clone, Serialize)]
pub struct PhysicalLocation {
    pub path: PathBuf,
    pub offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl PhysicalLocation {
    pub fn new(path: impl Into<PathBuf>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
            line: None,
            column: None,
        }
    }
}

impl PartialEq for PhysicalLocation {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.offset == other.offset
    }
}

impl Eq for PhysicalLocation {}

impl PartialOrd for PhysicalLocation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PhysicalLocation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path
            .cmp(&other.path)
            .then(self.offset.cmp(&other.offset))
    }
}
