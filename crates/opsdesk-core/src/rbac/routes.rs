//! Route prefix to module mapping.
//!
//! Prefixes match on whole path segments: `/commerce` gates `/commerce` and
//! `/commerce/pos`, never `/commerce-extra`. Construction rejects prefixes
//! that overlap, so at most one entry matches any path and table order is
//! irrelevant.

use serde::{Deserialize, Serialize};

use super::types::ModuleId;
use crate::error::{Error, Result};

/// One gated route prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub prefix: String,
    pub module: ModuleId,
}

/// Disjoint set of gated route prefixes.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// The application's route table.
    pub fn builtin() -> Self {
        let entries = ModuleId::ALL
            .iter()
            .map(|&module| RouteEntry {
                prefix: format!("/{module}"),
                module,
            })
            .collect();
        Self { entries }
    }

    /// Build a table, validating that prefixes are well-formed and disjoint.
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self> {
        for entry in &entries {
            validate_prefix(&entry.prefix)?;
        }
        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                if segment_match(&a.prefix, &b.prefix) || segment_match(&b.prefix, &a.prefix) {
                    return Err(Error::Routes(format!(
                        "route prefixes '{}' and '{}' overlap",
                        a.prefix, b.prefix
                    )));
                }
            }
        }
        Ok(Self { entries })
    }

    /// Module gating `path`, or `None` when the path is not module-gated.
    pub fn module_for(&self, path: &str) -> Option<ModuleId> {
        let path = strip_query(path);
        self.entries
            .iter()
            .find(|entry| segment_match(&entry.prefix, path))
            .map(|entry| entry.module)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_prefix(prefix: &str) -> Result<()> {
    if !prefix.starts_with('/') {
        return Err(Error::Routes(format!(
            "route prefix '{prefix}' must start with '/'"
        )));
    }
    if prefix == "/" || prefix.ends_with('/') {
        return Err(Error::Routes(format!(
            "route prefix '{prefix}' must name at least one segment without a trailing '/'"
        )));
    }
    if prefix.contains(['?', '#']) {
        return Err(Error::Routes(format!(
            "route prefix '{prefix}' must not carry a query or fragment"
        )));
    }
    Ok(())
}

/// Drop any `?query` or `#fragment` suffix.
fn strip_query(path: &str) -> &str {
    path.find(['?', '#']).map_or(path, |idx| &path[..idx])
}

/// Whether `path` is `prefix` or lies below it.
fn segment_match(prefix: &str, path: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
