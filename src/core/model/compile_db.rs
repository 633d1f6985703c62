//! JSON compilation database (`compile_commands.json`).

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths;
use crate::utils::io;

#[derive(Debug, Clone, Deserialize)]
pub struct CompileCommand {
    pub directory: String,
    pub file: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
    #[serde(default)]
    pub output: Option<String>,
}

impl CompileCommand {
    /// Absolute, normalized path of the translation unit's main file.
    pub fn source_path(&self) -> PathBuf {
        let file = Path::new(&self.file);
        if file.is_absolute() {
            paths::normalize(file)
        } else {
            paths::normalize(&Path::new(&self.directory).join(file))
        }
    }
}

/// Load the database and return its translation units, deduplicated and
/// sorted. A unit compiled several times (different flags) is analyzed once.
pub fn load(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_file() {
        return Err(Error::model_load_failed(
            path.to_string_lossy(),
            "compilation database not found",
        )
        .with_hint("Generate one with CMAKE_EXPORT_COMPILE_COMMANDS=ON or bear"));
    }

    let content = io::read_file(path, "read compilation database")
        .map_err(|e| Error::model_load_failed(path.to_string_lossy(), e.details.to_string()))?;
    parse(&content, path)
}

pub(crate) fn parse(content: &str, path: &Path) -> Result<Vec<PathBuf>> {
    let commands: Vec<CompileCommand> = serde_json::from_str(content)
        .map_err(|e| Error::model_invalid_json(path.to_string_lossy(), e))?;

    if let Some(bad) = commands
        .iter()
        .find(|c| c.command.is_none() && c.arguments.is_none())
    {
        return Err(Error::model_load_failed(
            path.to_string_lossy(),
            format!("entry for '{}' has neither 'command' nor 'arguments'", bad.file),
        ));
    }

    let mut units: Vec<PathBuf> = commands.iter().map(CompileCommand::source_path).collect();
    units.sort();
    units.dedup();
    Ok(units)
}
