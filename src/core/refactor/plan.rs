//! Turn violations into per-file text edits.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::code_audit::Violation;
use crate::error::{ConflictSiteDetails, Error};
use crate::model::{PhysicalLocation, ProgramModel};

/// Replace `[start, end)` of `file` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub file: PathBuf,
    pub start: usize,
    pub end: usize,
    /// Text expected at the range; checked again before writing.
    pub original: String,
    pub replacement: String,
    pub symbol: String,
}

impl Edit {
    fn at(site: &PhysicalLocation, violation: &Violation) -> Self {
        Self {
            file: site.path.clone(),
            start: site.offset,
            end: site.offset + violation.current_name.len(),
            original: violation.current_name.clone(),
            replacement: violation.suggested_name.clone(),
            symbol: violation.symbol.clone(),
        }
    }

    fn overlaps(&self, other: &Edit) -> bool {
        self.start < other.end && other.start < self.end
    }

    fn site(&self) -> ConflictSiteDetails {
        ConflictSiteDetails {
            symbol: self.symbol.clone(),
            start: self.start,
            end: self.end,
            replacement: self.replacement.clone(),
        }
    }
}

/// Accepted edits of one file, ascending by offset, free of overlap.
#[derive(Debug, Clone, Serialize)]
pub struct FileEdits {
    pub file: PathBuf,
    pub edits: Vec<Edit>,
}

/// A file whose batch was rejected because two edits collide.
#[derive(Debug, Clone)]
pub struct EditConflict {
    pub file: PathBuf,
    pub error: Error,
}

/// A rename that would make two members of one type share a name.
#[derive(Debug, Clone, Serialize)]
pub struct RenameCollision {
    pub symbol: String,
    pub owner: String,
    pub current_name: String,
    pub suggested_name: String,
    /// Symbol id of the member that already has, or would also get, the name.
    pub collides_with: String,
}

#[derive(Debug, Clone, Default)]
pub struct EditPlan {
    pub files: Vec<FileEdits>,
    pub conflicts: Vec<EditConflict>,
    pub collisions: Vec<RenameCollision>,
}

impl EditPlan {
    pub fn total_edits(&self) -> usize {
        self.files.iter().map(|f| f.edits.len()).sum()
    }
}

/// Plan edits for every violation: each access site plus the declaration.
///
/// The suggested name comes from the violation, so every site of one member
/// is renamed identically. Members whose rename would collide with another
/// member of the same type are left out. A file with overlapping edits is
/// rejected as a whole; other files are unaffected.
pub fn plan(violations: &[Violation], model: &ProgramModel) -> EditPlan {
    let collisions = find_collisions(violations, model);
    let colliding: std::collections::HashSet<&str> =
        collisions.iter().map(|c| c.symbol.as_str()).collect();

    let mut by_file: BTreeMap<PathBuf, Vec<Edit>> = BTreeMap::new();
    for violation in violations {
        if colliding.contains(violation.symbol.as_str()) {
            continue;
        }
        for site in violation
            .accesses
            .iter()
            .chain(std::iter::once(&violation.declaration))
        {
            let edit = Edit::at(site, violation);
            by_file.entry(edit.file.clone()).or_default().push(edit);
        }
    }

    let mut files = Vec::new();
    let mut conflicts = Vec::new();

    for (file, mut edits) in by_file {
        edits.sort_by(|a, b| {
            (a.start, a.end, &a.symbol, &a.replacement).cmp(&(b.start, b.end, &b.symbol, &b.replacement))
        });
        edits.dedup();

        match first_overlap(&edits) {
            Some((first, second)) => {
                log_status!(
                    "refactor",
                    "Rejecting edits for {}: {}..{} overlaps {}..{}",
                    file.display(),
                    first.start,
                    first.end,
                    second.start,
                    second.end
                );
                conflicts.push(EditConflict {
                    error: Error::edit_conflict(file.to_string_lossy(), first.site(), second.site()),
                    file,
                });
            }
            None => files.push(FileEdits { file, edits }),
        }
    }

    EditPlan {
        files,
        conflicts,
        collisions,
    }
}

/// First pair of overlapping edits in a start-sorted list.
fn first_overlap(edits: &[Edit]) -> Option<(&Edit, &Edit)> {
    let mut widest: Option<&Edit> = None;
    for edit in edits {
        if let Some(previous) = widest {
            if previous.overlaps(edit) {
                return Some((previous, edit));
            }
        }
        if widest.map_or(true, |w| edit.end > w.end) {
            widest = Some(edit);
        }
    }
    None
}

fn find_collisions(violations: &[Violation], model: &ProgramModel) -> Vec<RenameCollision> {
    // owner -> name -> symbol id, for every member whatever its kind
    let mut members: HashMap<&str, HashMap<&str, &str>> = HashMap::new();
    for (id, symbol) in model.members() {
        members
            .entry(symbol.owner.as_str())
            .or_default()
            .insert(symbol.name.as_str(), id);
    }

    // owner -> suggested name -> first violation claiming it
    let mut claimed: HashMap<(&str, &str), &str> = HashMap::new();
    let mut collisions = Vec::new();

    for violation in violations {
        if violation.owner.is_empty() {
            continue;
        }
        let existing = members
            .get(violation.owner.as_str())
            .and_then(|names| names.get(violation.suggested_name.as_str()))
            .filter(|id| **id != violation.symbol);

        let key = (violation.owner.as_str(), violation.suggested_name.as_str());
        let rival = existing.copied().or_else(|| claimed.get(&key).copied());

        match rival {
            Some(other) => {
                collisions.push(collision(violation, other));
                if let Some(first) = violations.iter().find(|v| v.symbol == other) {
                    if !collisions.iter().any(|c| c.symbol == first.symbol) {
                        collisions.push(collision(first, &violation.symbol));
                    }
                }
            }
            None => {
                claimed.insert(key, violation.symbol.as_str());
            }
        }
    }

    for c in &collisions {
        log_status!(
            "refactor",
            "Not renaming {}::{}: '{}' collides with {}",
            c.owner,
            c.current_name,
            c.suggested_name,
            c.collides_with
        );
    }

    collisions
}

fn collision(violation: &Violation, other: &str) -> RenameCollision {
    RenameCollision {
        symbol: violation.symbol.clone(),
        owner: violation.owner.clone(),
        current_name: violation.current_name.clone(),
        suggested_name: violation.suggested_name.clone(),
        collides_with: other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TranslationUnit;

    fn violation(symbol: &str, owner: &str, name: &str, suggested: &str, decl: usize, sites: &[usize]) -> Violation {
        Violation {
            symbol: symbol.to_string(),
            owner: owner.to_string(),
            declaration: PhysicalLocation::new("/proj/src/a.h", decl),
            accesses: sites
                .iter()
                .map(|offset| PhysicalLocation::new("/proj/src/a.cpp", *offset))
                .collect(),
            current_name: name.to_string(),
            suggested_name: suggested.to_string(),
        }
    }

    fn model_with_members(members: &[(&str, &str, &str)]) -> ProgramModel {
        let fields: Vec<(&str, &str, &str, &str)> = members
            .iter()
            .map(|(id, owner, name)| (*id, *owner, *name, r#""kind": "field""#))
            .collect();
        model_with_symbols(&fields)
    }

    /// Members as (id, owner, name, kind fields).
    fn model_with_symbols(members: &[(&str, &str, &str, &str)]) -> ProgramModel {
        let symbols: Vec<String> = members
            .iter()
            .enumerate()
            .map(|(i, (id, owner, name, kind))| {
                format!(
                    r#"{{"id": "{id}", "name": "{name}", {kind}, "access": "private",
                        "owner": "{owner}", "location": {{"file": 0, "offset": {}}}}}"#,
                    i * 100
                )
            })
            .collect();
        let raw: TranslationUnit = serde_json::from_str(&format!(
            r#"{{"file": "/proj/src/a.cpp",
                "files": [{{"id": 0, "kind": "physical", "path": "/proj/src/a.h"}}],
                "symbols": [{}]}}"#,
            symbols.join(",")
        ))
        .unwrap();
        ProgramModel::from_units(vec![raw]).unwrap()
    }

    #[test]
    fn declaration_and_access_sites_share_one_name() {
        let v = violation("count", "Foo", "Count", "count_", 40, &[140, 100]);
        let plan = plan(&[v], &ProgramModel::default());

        assert!(plan.conflicts.is_empty());
        assert_eq!(plan.files.len(), 2);
        assert_eq!(plan.total_edits(), 3);
        let cpp = plan.files.iter().find(|f| f.file.ends_with("a.cpp")).unwrap();
        assert_eq!(cpp.edits[0].start, 100);
        assert_eq!(cpp.edits[1].start, 140);
        assert_eq!(cpp.edits[0].end, 105);
        assert!(plan
            .files
            .iter()
            .flat_map(|f| &f.edits)
            .all(|e| e.replacement == "count_"));
    }

    #[test]
    fn overlapping_edits_reject_only_that_file() {
        let a = violation("a", "Foo", "Count", "count_", 40, &[100]);
        let b = violation("b", "Bar", "Counter", "counter_", 200, &[102]);
        let plan = plan(&[a, b], &ProgramModel::default());

        assert_eq!(plan.conflicts.len(), 1);
        assert!(plan.conflicts[0].file.ends_with("a.cpp"));
        assert_eq!(plan.conflicts[0].error.code.as_str(), "refactor.edit_conflict");
        assert_eq!(plan.conflicts[0].error.details["first"]["symbol"], "a");
        assert_eq!(plan.conflicts[0].error.details["second"]["symbol"], "b");

        // the header batch is still accepted
        assert_eq!(plan.files.len(), 1);
        assert!(plan.files[0].file.ends_with("a.h"));
        assert_eq!(plan.files[0].edits.len(), 2);
    }

    #[test]
    fn identical_sites_of_one_symbol_collapse() {
        let mut v = violation("count", "Foo", "Count", "count_", 40, &[]);
        v.accesses.push(PhysicalLocation::new("/proj/src/a.h", 40));
        let plan = plan(&[v], &ProgramModel::default());

        assert!(plan.conflicts.is_empty());
        assert_eq!(plan.total_edits(), 1);
    }

    #[test]
    fn adjacent_edits_do_not_conflict() {
        let a = violation("a", "Foo", "Ab", "ab_", 0, &[10]);
        let b = violation("b", "Foo", "Cd", "cd_", 2, &[12]);
        let plan = plan(&[a, b], &ProgramModel::default());
        assert!(plan.conflicts.is_empty());
        assert_eq!(plan.total_edits(), 4);
    }

    #[test]
    fn rename_onto_existing_member_is_a_collision() {
        let model = model_with_members(&[("count", "Foo", "Count"), ("other", "Foo", "count_")]);
        let v = violation("count", "Foo", "Count", "count_", 0, &[100]);
        let plan = plan(&[v], &model);

        assert_eq!(plan.collisions.len(), 1);
        assert_eq!(plan.collisions[0].collides_with, "other");
        assert_eq!(plan.total_edits(), 0);
    }

    #[test]
    fn two_members_with_same_suggestion_both_collide() {
        let model = model_with_members(&[("upper", "Foo", "Count"), ("lower", "Foo", "count")]);
        let a = violation("upper", "Foo", "Count", "count_", 0, &[100]);
        let b = violation("lower", "Foo", "count", "count_", 50, &[200]);
        let plan = plan(&[a, b], &model);

        assert_eq!(plan.collisions.len(), 2);
        assert_eq!(plan.total_edits(), 0);
    }

    #[test]
    fn rename_onto_static_field_or_method_is_a_collision() {
        let model = model_with_symbols(&[
            ("count", "Foo", "Count", r#""kind": "field""#),
            ("size", "Foo", "Size", r#""kind": "field""#),
            ("shared", "Foo", "count_", r#""kind": "field", "is_static": true"#),
            ("getter", "Foo", "size_", r#""kind": "method""#),
        ]);
        let count = violation("count", "Foo", "Count", "count_", 0, &[100]);
        let size = violation("size", "Foo", "Size", "size_", 20, &[120]);
        let plan = plan(&[count, size], &model);

        assert_eq!(plan.collisions.len(), 2);
        assert_eq!(plan.collisions[0].collides_with, "shared");
        assert_eq!(plan.collisions[1].collides_with, "getter");
        assert_eq!(plan.total_edits(), 0);
    }

    #[test]
    fn same_name_in_other_type_is_fine() {
        let model = model_with_members(&[("count", "Foo", "Count"), ("other", "Bar", "count_")]);
        let v = violation("count", "Foo", "Count", "count_", 0, &[100]);
        let plan = plan(&[v], &model);

        assert!(plan.collisions.is_empty());
        assert_eq!(plan.total_edits(), 2);
    }
}
