//! Baseline management for CI-friendly violation tracking.
//!
//! Saves the fingerprints of today's violations and compares future runs
//! against them. Only NEW violations count as drift.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};

use super::CodeAuditResult;
use crate::error::{Error, Result};
use crate::utils::io;

/// A saved baseline snapshot.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Baseline {
    /// RFC 3339 timestamp when the baseline was created.
    pub created_at: String,
    pub project_root: String,
    pub violations_count: usize,
    /// `symbol::current::suggested` per accepted violation.
    pub known_violations: Vec<String>,
}

/// Result of comparing an audit against a baseline.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BaselineComparison {
    pub new_violations: Vec<NewViolation>,
    pub resolved_violations: Vec<String>,
    pub delta: i64,
    /// Whether new violations appeared (true = fail in CI).
    pub drift_increased: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct NewViolation {
    pub fingerprint: String,
    pub file: String,
    pub current_name: String,
    pub suggested_name: String,
}

const BASELINE_DIR: &str = ".memberlint";
const BASELINE_FILE: &str = "baseline.json";

pub fn baseline_path(project_root: &Path) -> PathBuf {
    project_root.join(BASELINE_DIR).join(BASELINE_FILE)
}

pub fn save_baseline(result: &CodeAuditResult) -> Result<PathBuf> {
    let root = Path::new(&result.project_root);
    let dir = root.join(BASELINE_DIR);
    std::fs::create_dir_all(&dir).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("create {}", dir.display())))
    })?;

    let baseline = Baseline {
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        project_root: result.project_root.clone(),
        violations_count: result.findings.len(),
        known_violations: result.findings.iter().map(|f| f.fingerprint()).collect(),
    };

    let json = serde_json::to_string_pretty(&baseline)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize baseline".to_string())))?;

    let path = baseline_path(root);
    io::write_file_atomic(&path, &json, "write baseline")?;
    Ok(path)
}

/// Load the baseline for `project_root`. `Ok(None)` when none was saved; a
/// file that cannot be read or parsed is an error.
pub fn load_baseline(project_root: &Path) -> Result<Option<Baseline>> {
    let path = baseline_path(project_root);
    if !path.exists() {
        return Ok(None);
    }

    let content = io::read_file(&path, "read baseline")?;
    serde_json::from_str(&content).map(Some).map_err(|e| {
        Error::internal_json(e.to_string(), Some(format!("parse {}", path.display())))
    })
}

pub fn compare(result: &CodeAuditResult, baseline: &Baseline) -> BaselineComparison {
    let current: HashSet<String> = result.findings.iter().map(|f| f.fingerprint()).collect();
    let known: HashSet<&str> = baseline
        .known_violations
        .iter()
        .map(String::as_str)
        .collect();

    let new_violations: Vec<NewViolation> = result
        .findings
        .iter()
        .filter(|f| !known.contains(f.fingerprint().as_str()))
        .map(|f| NewViolation {
            fingerprint: f.fingerprint(),
            file: f.file.clone(),
            current_name: f.current_name.clone(),
            suggested_name: f.suggested_name.clone(),
        })
        .collect();

    let mut resolved_violations: Vec<String> = baseline
        .known_violations
        .iter()
        .filter(|fp| !current.contains(*fp))
        .cloned()
        .collect();
    resolved_violations.sort();

    let delta = result.findings.len() as i64 - baseline.violations_count as i64;
    let drift_increased = !new_violations.is_empty();

    BaselineComparison {
        new_violations,
        resolved_violations,
        delta,
        drift_increased,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_audit::findings::Finding;
    use crate::code_audit::AuditSummary;

    fn finding(symbol: &str, name: &str) -> Finding {
        Finding {
            symbol: symbol.to_string(),
            file: "a.h".to_string(),
            offset: 0,
            line: None,
            column: None,
            current_name: name.to_string(),
            suggested_name: format!("{}_", name.to_lowercase()),
            access_sites: vec![],
        }
    }

    fn result(root: &Path, findings: Vec<Finding>) -> CodeAuditResult {
        CodeAuditResult {
            project_root: root.to_string_lossy().to_string(),
            summary: AuditSummary {
                violations_found: findings.len(),
                ..Default::default()
            },
            findings,
            unfixable: vec![],
            violations: vec![],
        }
    }

    #[test]
    fn save_and_load_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let original = result(dir.path(), vec![finding("a", "Count"), finding("b", "Size")]);

        let path = save_baseline(&original).unwrap();
        assert!(path.exists());

        let loaded = load_baseline(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.violations_count, 2);
        assert_eq!(loaded.known_violations.len(), 2);
        assert!(loaded.created_at.ends_with('Z'));
    }

    #[test]
    fn compare_no_new_drift() {
        let dir = tempfile::tempdir().unwrap();
        let original = result(dir.path(), vec![finding("a", "Count")]);
        save_baseline(&original).unwrap();
        let baseline = load_baseline(dir.path()).unwrap().unwrap();

        let comparison = compare(&original, &baseline);
        assert!(!comparison.drift_increased);
        assert!(comparison.new_violations.is_empty());
        assert!(comparison.resolved_violations.is_empty());
        assert_eq!(comparison.delta, 0);
    }

    #[test]
    fn compare_new_and_resolved_simultaneously() {
        let dir = tempfile::tempdir().unwrap();
        save_baseline(&result(dir.path(), vec![finding("a", "Count"), finding("b", "Size")])).unwrap();
        let baseline = load_baseline(dir.path()).unwrap().unwrap();

        let current = result(dir.path(), vec![finding("a", "Count"), finding("c", "Name")]);
        let comparison = compare(&current, &baseline);

        assert!(comparison.drift_increased);
        assert_eq!(comparison.new_violations.len(), 1);
        assert_eq!(comparison.new_violations[0].current_name, "Name");
        assert_eq!(comparison.resolved_violations, vec!["b::Size::size_"]);
        assert_eq!(comparison.delta, 0);
    }

    #[test]
    fn no_baseline_returns_none() {
        assert!(load_baseline(Path::new("/nonexistent/path")).unwrap().is_none());
    }

    #[test]
    fn corrupt_baseline_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = baseline_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_baseline(dir.path()).unwrap_err();
        assert_eq!(err.code.as_str(), "internal.json_error");
    }
}
