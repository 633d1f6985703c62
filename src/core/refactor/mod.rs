//! Rename non-compliant members across the project.
//!
//! Plans one edit per access site and declaration, rejects files whose edits
//! overlap, and optionally writes the rest back. Dry-run unless `write` is set.

pub mod apply;
pub mod plan;

pub use apply::{apply, apply_file, ApplySummary, FileFailure};
pub use plan::{plan, Edit, EditConflict, EditPlan, FileEdits, RenameCollision};

use serde::Serialize;
use std::path::Path;

use crate::code_audit::{self, AuditSummary, Finding, Unfixable};
use crate::config::Config;
use crate::paths;
use crate::Result;

/// Edits planned for one file, project-relative.
#[derive(Debug, Clone, Serialize)]
pub struct FilePlanSummary {
    pub file: String,
    pub edits: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FixResult {
    pub project_root: String,
    pub applied: bool,
    pub summary: AuditSummary,
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unfixable: Vec<Unfixable>,
    pub planned: Vec<FilePlanSummary>,
    pub total_edits: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<FileFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collisions: Vec<RenameCollision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply: Option<ApplySummary>,
}

impl FixResult {
    /// True when some file could not be planned or written.
    pub fn has_failures(&self) -> bool {
        !self.conflicts.is_empty()
            || self
                .apply
                .as_ref()
                .is_some_and(|summary| !summary.failures.is_empty())
    }
}

/// Audit, plan and (with `write`) apply renames for the configured project.
pub fn fix(config: &Config, write: bool) -> Result<FixResult> {
    let model = code_audit::load_model(config)?;
    let filter = code_audit::scope_filter(config);
    let audit = code_audit::audit_model(&model, &filter);

    let plan = plan(&audit.violations, &model);
    log_status!(
        "refactor",
        "Planned {} edits in {} files ({} conflicting files)",
        plan.total_edits(),
        plan.files.len(),
        plan.conflicts.len()
    );

    let root = filter.root();
    let apply = if write {
        Some(apply(&plan, &model, &filter))
    } else {
        log_status!("refactor", "Dry run, pass --write to apply");
        None
    };

    Ok(FixResult {
        project_root: audit.project_root,
        applied: write,
        summary: audit.summary,
        findings: audit.findings,
        unfixable: audit.unfixable,
        planned: plan
            .files
            .iter()
            .map(|f| FilePlanSummary {
                file: paths::display_relative(&f.file, root),
                edits: f.edits.len(),
            })
            .collect(),
        total_edits: plan.total_edits(),
        conflicts: plan
            .conflicts
            .iter()
            .map(|c| FileFailure::new(Path::new(&paths::display_relative(&c.file, root)), &c.error))
            .collect(),
        collisions: plan.collisions,
        apply,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLayer;
    use std::fs;

    #[test]
    fn fix_is_dry_run_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        let cpp = src.join("a.cpp");
        fs::write(&cpp, "struct Foo { int Count; }; int f(Foo x) { return x.Count; }").unwrap();

        fs::write(
            dir.path().join("compile_commands.json"),
            format!(
                r#"[{{"directory": "{}", "file": "a.cpp", "command": "c++ -c a.cpp"}}]"#,
                src.display()
            ),
        )
        .unwrap();
        fs::write(
            dir.path().join("memberlint-model.json"),
            format!(
                r#"{{"units": [{{"file": "{cpp}",
                    "files": [{{"id": 0, "kind": "physical", "path": "{cpp}"}}],
                    "symbols": [{{"id": "count", "name": "Count", "kind": "field", "access": "private",
                                  "owner": "Foo", "location": {{"file": 0, "offset": 17}}}}],
                    "accesses": [{{"symbol": "count", "location": {{"file": 0, "offset": 51}}}}]}}]}}"#,
                cpp = cpp.display()
            ),
        )
        .unwrap();

        let config = Config::from_layer(
            dir.path(),
            ConfigLayer {
                project_root: Some("src".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let dry = fix(&config, false).unwrap();
        assert!(!dry.applied);
        assert_eq!(dry.total_edits, 2);
        assert!(dry.apply.is_none());
        assert!(fs::read_to_string(&cpp).unwrap().contains("int Count;"));

        let written = fix(&config, true).unwrap();
        assert!(!written.has_failures());
        assert_eq!(
            fs::read_to_string(&cpp).unwrap(),
            "struct Foo { int count_; }; int f(Foo x) { return x.count_; }"
        );
    }
}
