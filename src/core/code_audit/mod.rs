//! Member naming audit.
//!
//! Checks non-public data members against the trailing-underscore
//! convention. Works by:
//!
//! 1. Loading the program model produced by the front end
//! 2. Filtering member accesses to the project's own, non-public fields
//! 3. Collecting one violation per member identity
//! 4. Producing findings for the report

pub mod baseline;
pub mod findings;
pub mod naming;
pub mod scope;
pub mod violations;

pub use findings::Finding;
pub use scope::{ScopeDecision, ScopeFilter, ScopeStats};
pub use violations::{collect, Collection, Unfixable, Violation};

use crate::config::Config;
use crate::model::ProgramModel;
use crate::Result;

/// Summary counts for the audit report.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct AuditSummary {
    pub units_analyzed: usize,
    pub accesses_seen: usize,
    pub accesses_checked: usize,
    pub skipped: ScopeStats,
    pub violations_found: usize,
    #[serde(skip_serializing_if = "is_zero")]
    pub unfixable_found: usize,
}

fn is_zero(v: &usize) -> bool {
    *v == 0
}

/// Complete result of auditing a project.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CodeAuditResult {
    pub project_root: String,
    pub summary: AuditSummary,
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unfixable: Vec<Unfixable>,
    #[serde(skip)]
    pub violations: Vec<Violation>,
}

pub fn scope_filter(config: &Config) -> ScopeFilter {
    ScopeFilter::new(&config.project_root, config.exclude.clone())
}

/// Load the model described by `config`.
pub fn load_model(config: &Config) -> Result<ProgramModel> {
    log_status!("model", "Loading {}", config.model.display());
    ProgramModel::load(&config.compile_commands, &config.model)
}

/// Audit the project described by `config`.
pub fn audit(config: &Config) -> Result<CodeAuditResult> {
    let model = load_model(config)?;
    Ok(audit_model(&model, &scope_filter(config)))
}

/// Core audit logic over an already loaded model.
pub fn audit_model(model: &ProgramModel, filter: &ScopeFilter) -> CodeAuditResult {
    log_status!(
        "audit",
        "Checking {} units under {}",
        model.units().len(),
        filter.root().display()
    );

    let Collection {
        violations,
        unfixable,
        stats,
    } = collect(model, filter);

    let findings = findings::build_findings(&violations, filter.root());

    log_status!(
        "audit",
        "Complete: {} accesses checked, {} violations, {} unresolved skipped",
        stats.accesses_checked,
        violations.len(),
        stats.skipped.unresolved
    );

    CodeAuditResult {
        project_root: filter.root().to_string_lossy().to_string(),
        summary: AuditSummary {
            units_analyzed: stats.units_analyzed,
            accesses_seen: stats.accesses_seen,
            accesses_checked: stats.accesses_checked,
            skipped: stats.skipped,
            violations_found: violations.len(),
            unfixable_found: unfixable.len(),
        },
        findings,
        unfixable,
        violations,
    }
}
