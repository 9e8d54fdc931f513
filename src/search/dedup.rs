//! Deduplication & Statistics
//!
//! Pure functions folding the raw hit sequence into a unique patent set and
//! aggregate statistics. No portal or registry access happens here, which keeps
//! every rule in this file unit-testable in isolation.
//!
//! ## Rules
//! - Identity is the normalized publication number (uppercase, alphanumerics only).
//! - On collision the first-seen record keeps its position and source country;
//!   empty fields are filled from later duplicates carrying data.
//! - Output order is first-seen traversal order, never sorted by an attribute.

use super::types::{NameCount, PatentRecord, SearchStats};
use regex::Regex;
use std::collections::HashMap;

/// Normalizes a publication number for case/format-insensitive comparison.
///
/// `"us-2020/123456 a1"` and `"US2020123456A1"` compare equal.
pub fn normalize_publication_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Folds hits in traversal order into a deduplicated record list.
///
/// Records whose publication number normalizes to the empty string carry no
/// usable identity and are dropped.
pub fn dedupe_and_merge(records: Vec<PatentRecord>) -> Vec<PatentRecord> {
    let mut unique: Vec<PatentRecord> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = normalize_publication_number(&record.publication_number);
        if key.is_empty() {
            tracing::warn!("Dropping hit without publication number");
            continue;
        }

        match index_by_key.get(&key) {
            Some(&idx) => merge_missing(&mut unique[idx], record),
            None => {
                index_by_key.insert(key, unique.len());
                unique.push(record);
            }
        }
    }

    unique
}

/// Fills empty fields of the first-seen record from a later duplicate.
///
/// Position and `source_country` of the first sighting always win.
fn merge_missing(into: &mut PatentRecord, other: PatentRecord) {
    if into.title.is_empty() && !other.title.is_empty() {
        into.title = other.title;
    }
    if into.publication_date.is_empty() && !other.publication_date.is_empty() {
        into.publication_date = other.publication_date;
    }
    if into.applicants.is_empty() && !other.applicants.is_empty() {
        into.applicants = other.applicants;
    }
    if into.inventors.is_empty() && !other.inventors.is_empty() {
        into.inventors = other.inventors;
    }
    if into.application_number.is_none() {
        into.application_number = other.application_number;
    }
    if into.abstract_text.is_none() {
        into.abstract_text = other.abstract_text;
    }
}

/// Extracts the 4-digit year prefix of a publication date, if present.
pub fn extract_year(date: &str) -> Option<String> {
    let re = Regex::new(r"^(\d{4})").unwrap();
    re.captures(date.trim())
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Computes the statistics block over the final unique set.
pub fn aggregate_stats(records: &[PatentRecord], top_n: usize) -> SearchStats {
    let mut counts_by_country: HashMap<String, usize> = HashMap::new();
    let mut counts_by_year: HashMap<String, usize> = HashMap::new();

    for record in records {
        *counts_by_country
            .entry(record.source_country.clone())
            .or_insert(0) += 1;

        if let Some(year) = extract_year(&record.publication_date) {
            *counts_by_year.entry(year).or_insert(0) += 1;
        }
    }

    SearchStats {
        counts_by_country,
        counts_by_year,
        top_applicants: top_names(records.iter().map(|r| r.applicants.as_slice()), top_n),
        top_inventors: top_names(records.iter().map(|r| r.inventors.as_slice()), top_n),
    }
}

/// Frequency-ranks names across the unique set.
///
/// Descending by count, ties broken by first-seen order, truncated to `top_n`.
fn top_names<'a>(groups: impl Iterator<Item = &'a [String]>, top_n: usize) -> Vec<NameCount> {
    let mut counts: HashMap<&'a str, (usize, usize)> = HashMap::new();
    let mut next_seen = 0usize;

    for group in groups {
        for name in group {
            let entry = counts.entry(name.as_str()).or_insert_with(|| {
                let seen = next_seen;
                next_seen += 1;
                (0, seen)
            });
            entry.0 += 1;
        }
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(name, (count, seen))| (name, count, seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(top_n);

    ranked
        .into_iter()
        .map(|(name, count, _)| NameCount {
            name: name.to_string(),
            count,
        })
        .collect()
}
