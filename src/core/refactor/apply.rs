//! Write planned edits back to disk.

use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use super::plan::{EditPlan, FileEdits};
use crate::code_audit::ScopeFilter;
use crate::error::{Error, Result};
use crate::model::ProgramModel;
use crate::utils::io;

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub file: String,
    pub code: String,
    pub message: String,
    pub details: Value,
}

impl FileFailure {
    pub(crate) fn new(file: &Path, error: &Error) -> Self {
        Self {
            file: file.to_string_lossy().to_string(),
            code: error.code.as_str().to_string(),
            message: error.message.clone(),
            details: error.details.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplySummary {
    pub files_written: Vec<String>,
    pub edits_applied: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FileFailure>,
}

/// Apply every accepted file batch. A failing file is skipped and reported;
/// it never stops the remaining files.
pub fn apply(plan: &EditPlan, model: &ProgramModel, filter: &ScopeFilter) -> ApplySummary {
    let mut summary = ApplySummary::default();

    for batch in &plan.files {
        match apply_file(batch, model, filter) {
            Ok(count) => {
                log_status!("apply", "Rewrote {} ({} edits)", batch.file.display(), count);
                summary
                    .files_written
                    .push(batch.file.to_string_lossy().to_string());
                summary.edits_applied += count;
            }
            Err(err) => {
                log_status!("apply", "Skipped {}: {}", batch.file.display(), err.message);
                summary.failures.push(FileFailure::new(&batch.file, &err));
            }
        }
    }

    summary
}

/// Rewrite one file, all of its edits or none.
pub fn apply_file(batch: &FileEdits, model: &ProgramModel, filter: &ScopeFilter) -> Result<usize> {
    let path = batch.file.as_path();
    if !filter.owns(path) {
        return Err(Error::validation_invalid_argument(
            "file",
            format!("{} is outside the project root", path.display()),
        ));
    }

    let writable = std::fs::metadata(path)
        .map(|metadata| !metadata.permissions().readonly())
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("stat {}", path.display()))))?;
    if !writable {
        return Err(Error::apply_not_writable(path.to_string_lossy()));
    }

    // Sources need not be UTF-8
    let content = io::read_bytes(path, "read file for fix")?;

    if let Some(expected) = model.digest(path) {
        if io::sha256_hex(&content) != expected {
            return Err(Error::apply_stale_file(
                path.to_string_lossy(),
                "content digest differs from the analyzed file",
            ));
        }
    }

    for edit in &batch.edits {
        if content.get(edit.start..edit.end) != Some(edit.original.as_bytes()) {
            return Err(Error::apply_stale_file(
                path.to_string_lossy(),
                format!(
                    "expected '{}' at {}..{}",
                    edit.original, edit.start, edit.end
                ),
            ));
        }
    }

    let mut updated = content;
    // Back to front so earlier offsets stay valid
    for edit in batch.edits.iter().rev() {
        updated
            .splice(edit.start..edit.end, edit.replacement.bytes())
            .for_each(drop);
    }

    io::write_bytes_atomic(path, &updated, "write fixed file")?;
    Ok(batch.edits.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refactor::plan::Edit;
    use std::fs;

    fn edit(file: &Path, start: usize, original: &str, replacement: &str) -> Edit {
        Edit {
            file: file.to_path_buf(),
            start,
            end: start + original.len(),
            original: original.to_string(),
            replacement: replacement.to_string(),
            symbol: "s".to_string(),
        }
    }

    #[test]
    fn edits_apply_back_to_front() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.cpp");
        fs::write(&file, "f.Count + f.Count;").unwrap();

        let batch = FileEdits {
            file: file.clone(),
            edits: vec![edit(&file, 2, "Count", "count_"), edit(&file, 12, "Count", "count_")],
        };
        let filter = ScopeFilter::new(dir.path(), vec![]);

        let count = apply_file(&batch, &ProgramModel::default(), &filter).unwrap();

        assert_eq!(count, 2);
        assert_eq!(fs::read_to_string(&file).unwrap(), "f.count_ + f.count_;");
    }

    #[test]
    fn stale_text_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.cpp");
        fs::write(&file, "f.Total;").unwrap();

        let batch = FileEdits {
            file: file.clone(),
            edits: vec![edit(&file, 2, "Count", "count_")],
        };
        let filter = ScopeFilter::new(dir.path(), vec![]);

        let err = apply_file(&batch, &ProgramModel::default(), &filter).unwrap_err();

        assert_eq!(err.code.as_str(), "apply.stale_file");
        assert_eq!(fs::read_to_string(&file).unwrap(), "f.Total;");
    }

    #[test]
    fn non_utf8_source_is_rewritten_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.cpp");
        fs::write(&file, b"// caf\xe9\nx.Count;\n").unwrap();

        let batch = FileEdits {
            file: file.clone(),
            edits: vec![edit(&file, 10, "Count", "count_")],
        };
        let filter = ScopeFilter::new(dir.path(), vec![]);

        apply_file(&batch, &ProgramModel::default(), &filter).unwrap();

        assert_eq!(fs::read(&file).unwrap(), b"// caf\xe9\nx.count_;\n");
    }

    #[test]
    fn read_only_file_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.cpp");
        fs::write(&file, "x.Count").unwrap();
        let mut permissions = fs::metadata(&file).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&file, permissions).unwrap();

        let batch = FileEdits {
            file: file.clone(),
            edits: vec![edit(&file, 2, "Count", "count_")],
        };
        let filter = ScopeFilter::new(dir.path(), vec![]);

        let err = apply_file(&batch, &ProgramModel::default(), &filter).unwrap_err();

        assert_eq!(err.code.as_str(), "apply.not_writable");
        assert_eq!(fs::read_to_string(&file).unwrap(), "x.Count");
        assert!(fs::metadata(&file).unwrap().permissions().readonly());
    }

    #[test]
    fn file_outside_root_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("src");
        fs::create_dir_all(&root).unwrap();
        let file = dir.path().join("third_party.h");
        fs::write(&file, "int Count;").unwrap();

        let batch = FileEdits {
            file: file.clone(),
            edits: vec![edit(&file, 4, "Count", "count_")],
        };
        let filter = ScopeFilter::new(&root, vec![]);

        assert!(apply_file(&batch, &ProgramModel::default(), &filter).is_err());
        assert_eq!(fs::read_to_string(&file).unwrap(), "int Count;");
    }

    #[test]
    fn failures_do_not_stop_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.cpp");
        let stale = dir.path().join("stale.cpp");
        fs::write(&good, "x.Count").unwrap();
        fs::write(&stale, "x.Other").unwrap();

        let plan = EditPlan {
            files: vec![
                FileEdits {
                    file: good.clone(),
                    edits: vec![edit(&good, 2, "Count", "count_")],
                },
                FileEdits {
                    file: stale.clone(),
                    edits: vec![edit(&stale, 2, "Count", "count_")],
                },
            ],
            ..Default::default()
        };
        let filter = ScopeFilter::new(dir.path(), vec![]);

        let summary = apply(&plan, &ProgramModel::default(), &filter);

        assert_eq!(summary.edits_applied, 1);
        assert_eq!(summary.files_written.len(), 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].code, "apply.stale_file");
        assert_eq!(fs::read_to_string(&good).unwrap(), "x.count_");
    }
}
