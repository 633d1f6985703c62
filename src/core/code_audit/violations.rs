//! Walk every member access of the program and collect naming violations.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::naming;
use super::scope::{ScopeDecision, ScopeFilter, ScopeStats};
use crate::model::{PhysicalLocation, ProgramModel, Symbol};

/// One non-compliant member, with every in-scope place it is accessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub symbol: String,
    pub owner: String,
    pub declaration: PhysicalLocation,
    pub accesses: Vec<PhysicalLocation>,
    pub current_name: String,
    pub suggested_name: String,
}

/// A non-compliant member whose name cannot be canonicalized.
#[derive(Debug, Clone, Serialize)]
pub struct Unfixable {
    pub symbol: String,
    pub name: String,
    pub declaration: PhysicalLocation,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectStats {
    pub units_analyzed: usize,
    pub accesses_seen: usize,
    pub accesses_checked: usize,
    #[serde(flatten)]
    pub skipped: ScopeStats,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Collection {
    pub violations: Vec<Violation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unfixable: Vec<Unfixable>,
    pub stats: CollectStats,
}

struct Pending<'a> {
    symbol: &'a Symbol,
    declaration: PhysicalLocation,
    accesses: BTreeSet<PhysicalLocation>,
}

/// Collect one violation per distinct member identity.
///
/// The result is ordered by declaration location, then symbol id, so the
/// same model always produces the same sequence.
pub fn collect(model: &ProgramModel, filter: &ScopeFilter) -> Collection {
    let mut stats = CollectStats {
        units_analyzed: model.units().len(),
        ..Default::default()
    };
    let mut pending: BTreeMap<&str, Pending> = BTreeMap::new();

    for unit in model.units() {
        for access in unit.accesses() {
            stats.accesses_seen += 1;
            let Some(symbol) = unit.symbol(&access.symbol) else {
                continue;
            };

            let decision = filter.evaluate(unit, access, symbol);
            stats.skipped.record(&decision);
            let ScopeDecision::Checkable {
                access: site,
                declaration,
            } = decision
            else {
                continue;
            };

            stats.accesses_checked += 1;
            if naming::is_compliant(&symbol.name) {
                continue;
            }

            pending
                .entry(symbol.id.as_str())
                .or_insert_with(|| Pending {
                    symbol,
                    declaration,
                    accesses: BTreeSet::new(),
                })
                .accesses
                .insert(site);
        }
    }

    let mut violations = Vec::new();
    let mut unfixable = Vec::new();

    for (id, entry) in pending {
        match naming::canonicalize(&entry.symbol.name) {
            Ok(suggested_name) => violations.push(Violation {
                symbol: id.to_string(),
                owner: entry.symbol.owner.clone(),
                declaration: entry.declaration,
                accesses: entry.accesses.into_iter().collect(),
                current_name: entry.symbol.name.clone(),
                suggested_name,
            }),
            Err(err) => unfixable.push(Unfixable {
                symbol: id.to_string(),
                name: entry.symbol.name.clone(),
                declaration: entry.declaration,
                reason: err.details["problem"]
                    .as_str()
                    .unwrap_or(&err.message)
                    .to_string(),
            }),
        }
    }

    violations.sort_by(|a, b| {
        a.declaration
            .cmp(&b.declaration)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    unfixable.sort_by(|a, b| a.declaration.cmp(&b.declaration));

    Collection {
        violations,
        unfixable,
        stats,
    }
}
