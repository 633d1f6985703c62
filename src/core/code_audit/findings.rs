//! Convert violations into report entries and the line-oriented text report.

use std::path::Path;

use super::violations::{Unfixable, Violation};
use crate::paths;

/// A violation as shown to the user.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Finding {
    pub symbol: String,
    /// Declaration file, project-relative.
    pub file: String,
    pub offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub current_name: String,
    pub suggested_name: String,
    /// Project-relative access sites, `file@offset`.
    pub access_sites: Vec<String>,
}

impl Finding {
    /// `file`, `file:line` or `file:line:column`, whatever the model knows.
    pub fn location(&self) -> String {
        location(&self.file, self.line, self.column)
    }

    /// Stable identity used by baselines.
    pub fn fingerprint(&self) -> String {
        format!(
            "{}::{}::{}",
            self.symbol, self.current_name, self.suggested_name
        )
    }
}

pub fn build_findings(violations: &[Violation], root: &Path) -> Vec<Finding> {
    violations
        .iter()
        .map(|v| Finding {
            symbol: v.symbol.clone(),
            file: paths::display_relative(&v.declaration.path, root),
            offset: v.declaration.offset,
            line: v.declaration.line,
            column: v.declaration.column,
            current_name: v.current_name.clone(),
            suggested_name: v.suggested_name.clone(),
            access_sites: v
                .accesses
                .iter()
                .map(|site| format!("{}@{}", paths::display_relative(&site.path, root), site.offset))
                .collect(),
        })
        .collect()
}

fn location(file: &str, line: Option<u32>, column: Option<u32>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!("{}:{}:{}", file, line, column),
        (Some(line), None) => format!("{}:{}", file, line),
        _ => file.to_string(),
    }
}

/// One line per finding, `<file> : <current>, suggestion <suggested>`, then
/// one per member whose name cannot be fixed, `<file> : <name>, unfixable (<reason>)`.
pub fn render_text(findings: &[Finding], unfixable: &[Unfixable], root: &Path) -> String {
    let mut out = String::new();
    for finding in findings {
        out.push_str(&format!(
            "{} : {}, suggestion {}\n",
            finding.location(),
            finding.current_name,
            finding.suggested_name
        ));
    }
    for entry in unfixable {
        let file = paths::display_relative(&entry.declaration.path, root);
        out.push_str(&format!(
            "{} : {}, unfixable ({})\n",
            location(&file, entry.declaration.line, entry.declaration.column),
            entry.name,
            entry.reason
        ));
    }
    out
}
