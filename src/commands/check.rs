use clap::Args;
use serde::Serialize;
use std::path::Path;

use memberlint::code_audit::{self, baseline, findings, AuditSummary, CodeAuditResult};

use super::CmdResult;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Print the JSON envelope instead of one line per violation
    #[arg(long)]
    pub json: bool,

    /// Compare against the saved baseline; only new violations fail
    #[arg(long, conflicts_with = "save_baseline")]
    pub baseline: bool,

    /// Save the current violations as the baseline
    #[arg(long)]
    pub save_baseline: bool,
}

/// Plain text output only when nothing needs the envelope.
pub fn is_text(args: &CheckArgs) -> bool {
    !args.json && !args.baseline && !args.save_baseline
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum CheckOutput {
    #[serde(rename = "check")]
    Full(CodeAuditResult),

    #[serde(rename = "check.baseline_saved")]
    BaselineSaved {
        project_root: String,
        path: String,
        violations_count: usize,
    },

    #[serde(rename = "check.baseline")]
    Compared {
        project_root: String,
        summary: AuditSummary,
        baseline: baseline::BaselineComparison,
    },
}

pub fn run(args: CheckArgs, global: &super::GlobalArgs) -> CmdResult<CheckOutput> {
    let config = global.resolve_config()?;
    let result = code_audit::audit(&config)?;

    if args.save_baseline {
        let path = baseline::save_baseline(&result)?;
        return Ok((
            CheckOutput::BaselineSaved {
                project_root: result.project_root,
                path: path.to_string_lossy().to_string(),
                violations_count: result.summary.violations_found,
            },
            0,
        ));
    }

    if args.baseline {
        if let Some(saved) = baseline::load_baseline(Path::new(&result.project_root))? {
            let comparison = baseline::compare(&result, &saved);
            let exit_code = if comparison.drift_increased { 1 } else { 0 };
            return Ok((
                CheckOutput::Compared {
                    project_root: result.project_root,
                    summary: result.summary,
                    baseline: comparison,
                },
                exit_code,
            ));
        }
        memberlint::log_status!("baseline", "No baseline saved yet, reporting every violation");
    }

    Ok((CheckOutput::Full(result), 0))
}

/// The line-oriented report.
pub fn run_text(_args: CheckArgs, global: &super::GlobalArgs) -> memberlint::Result<(String, i32)> {
    let config = global.resolve_config()?;
    let result = code_audit::audit(&config)?;
    let report = findings::render_text(
        &result.findings,
        &result.unfixable,
        Path::new(&result.project_root),
    );
    Ok((report, 0))
}
