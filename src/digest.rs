//! Project records and the digest selection algorithm.
//!
//! A digest has two sections built from the same fetched record set:
//! every record flagged "do soon" (in source order), then one randomly
//! chosen open record per category (categories in first-appearance order).
//! Completed records never appear; a category with nothing open simply
//! contributes no line.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::debug;

/// One row of the project table.
///
/// Records are immutable once fetched; a run only filters, groups and
/// samples them. Missing `done`/`do_soon` cells deserialize as `false`
/// (Airtable omits unchecked checkbox fields entirely).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    /// Display name.
    #[serde(alias = "Project")]
    pub project: String,
    /// Grouping key for the one-per-category section.
    #[serde(alias = "Category")]
    pub category: String,
    /// Completed projects are excluded from sampling.
    #[serde(alias = "Done")]
    pub done: bool,
    /// Flagged records always appear in the first section.
    #[serde(alias = "Do soon", alias = "Do Soon")]
    pub do_soon: bool,
}

/// Compose the digest body from `records`.
///
/// The result is the intro line followed by one `- {project}` line per
/// selected record, joined with newlines. An empty record set yields the
/// intro alone. The random source is injected so runs can be reproduced
/// in tests with a seeded generator; given the same records and the same
/// generator state the output is identical.
pub fn build_digest<R: Rng>(records: &[ProjectRecord], intro: &str, rng: &mut R) -> String {
    let mut lines: Vec<&str> = Vec::new();

    for record in records.iter().filter(|r| r.do_soon) {
        lines.push(&record.project);
    }

    for category in categories_in_order(records) {
        let open: Vec<&ProjectRecord> = records
            .iter()
            .filter(|r| r.category == category && !r.done)
            .collect();
        if let Some(pick) = open.choose(rng) {
            lines.push(&pick.project);
        }
    }

    debug!(
        "selected {} of {} records for the digest",
        lines.len(),
        records.len()
    );

    let mut digest = intro.to_owned();
    for line in lines {
        digest.push_str("\n- ");
        digest.push_str(line);
    }
    digest
}

/// Distinct category values in first-appearance order.
///
/// Deterministic for a given input order; deliberately not alphabetic.
fn categories_in_order(records: &[ProjectRecord]) -> Vec<&str> {
    let mut categories: Vec<&str> = Vec::new();
    for record in records {
        if !categories.contains(&record.category.as_str()) {
            categories.push(&record.category);
        }
    }
    categories
}
