//! Name resolution for full reindexing.
//!
//! Given the raw on-disk names of one directory's children (one namespace at
//! a time: memory records or sub-directories), assign every child a unique
//! slug. Assignment is deterministic:
//!
//! 1. names are processed in byte order;
//! 2. names that already equal their slug claim it first;
//! 3. every other name takes its slug if free, otherwise the first
//!    `<slug>-N` (N >= 2) that is neither some child's base slug nor already
//!    assigned;
//! 4. names with an empty slug are treated as [`EMPTY_SLUG_FALLBACK`].
//!
//! Collisions and empty slugs produce warnings.

use std::collections::HashSet;
use std::fmt;

use crate::path::{Slug, slugify};

/// Slug assigned to names that normalize to nothing.
pub const EMPTY_SLUG_FALLBACK: &str = "untitled";

/// Which namespace a set of children belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    Memory,
    Category,
}

impl fmt::Display for ChildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildKind::Memory => f.write_str("memory"),
            ChildKind::Category => f.write_str("category"),
        }
    }
}

/// A child name paired with the slug it is indexed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub raw: String,
    pub slug: Slug,
}

impl ResolvedName {
    /// True when the on-disk name has to change to match the slug.
    pub fn needs_rename(&self) -> bool {
        self.raw != self.slug.as_str()
    }
}

/// Result of resolving one directory's names.
#[derive(Debug, Default)]
pub struct Resolution {
    pub names: Vec<ResolvedName>,
    pub warnings: Vec<String>,
}

/// Assign unique slugs to `raw_names`.
///
/// `location` is only used in warning text. The returned names are in byte
/// order of the raw input.
pub fn resolve_names(location: &str, kind: ChildKind, raw_names: &[String]) -> Resolution {
    let mut sorted: Vec<&String> = raw_names.iter().collect();
    sorted.sort();
    sorted.dedup();

    let bases: Vec<String> = sorted
        .iter()
        .map(|raw| {
            let slug = slugify(raw);
            if slug.is_empty() {
                EMPTY_SLUG_FALLBACK.to_string()
            } else {
                slug
            }
        })
        .collect();
    let all_bases: HashSet<&str> = bases.iter().map(String::as_str).collect();

    let mut assigned: HashSet<String> = HashSet::new();
    let mut slots: Vec<Option<String>> = vec![None; sorted.len()];
    let mut warnings = Vec::new();

    for (i, raw) in sorted.iter().enumerate() {
        if raw.as_str() == bases[i] && assigned.insert(bases[i].clone()) {
            slots[i] = Some(bases[i].clone());
        }
    }

    for (i, raw) in sorted.iter().enumerate() {
        if slots[i].is_some() {
            continue;
        }
        let base = &bases[i];
        if slugify(raw).is_empty() {
            warnings.push(format!(
                "{kind} '{raw}' in '{location}' has an empty slug; indexed as '{EMPTY_SLUG_FALLBACK}'"
            ));
        }

        let slug = if assigned.contains(base) {
            let candidate = (2..)
                .map(|n| format!("{base}-{n}"))
                .find(|c| !all_bases.contains(c.as_str()) && !assigned.contains(c))
                .unwrap_or_else(|| base.clone());
            warnings.push(format!(
                "{kind} '{raw}' in '{location}' collides with slug '{base}'; indexed as '{candidate}'"
            ));
            candidate
        } else {
            base.clone()
        };
        assigned.insert(slug.clone());
        slots[i] = Some(slug);
    }

    let names = sorted
        .into_iter()
        .zip(slots)
        .filter_map(|(raw, slot)| {
            slot.map(|slug| ResolvedName {
                raw: raw.clone(),
                slug: Slug::from_normalized(&slug),
            })
        })
        .collect();

    Resolution { names, warnings }
}
