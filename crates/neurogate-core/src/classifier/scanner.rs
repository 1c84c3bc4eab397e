//! Lexical scanner over the keyword catalog.
//!
//! Counts how many catalog terms occur in the lowercased input, per category
//! and tier. Counting is order-independent and never fails.

use once_cell::sync::Lazy;
use regex::RegexSet;
use serde::{Deserialize, Serialize};

use super::catalog::{Tier, CATALOG, FAST_PATH_TERMS};
use super::MisuseCategory;

/// How catalog terms are matched against input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Plain substring containment. "meth" matches inside "method".
    #[default]
    Substring,
    /// Terms must start and end on a word boundary.
    WordBoundary,
}

/// Match counts for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierCounts {
    /// Number of high-tier terms found.
    pub high: usize,
    /// Number of medium-tier terms found.
    pub medium: usize,
}

impl TierCounts {
    /// Total matches across both tiers.
    pub fn total(&self) -> usize {
        self.high + self.medium
    }
}

/// Output of a full catalog scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanCounts {
    counts: Vec<(MisuseCategory, TierCounts)>,
    /// Every term that matched, in catalog order. A term listed in several
    /// tiers or categories appears once per listing.
    pub matched_terms: Vec<&'static str>,
}

impl ScanCounts {
    /// Returns the counts for a category (zero for `None` or unknown).
    pub fn get(&self, category: MisuseCategory) -> TierCounts {
        self.counts
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, counts)| *counts)
            .unwrap_or_default()
    }

    /// Iterates over per-category counts in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (MisuseCategory, TierCounts)> + '_ {
        self.counts.iter().copied()
    }

    /// Returns true if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.matched_terms.is_empty()
    }
}

/// Word-boundary matchers for one catalog tier.
struct CompiledTier {
    terms: &'static [&'static str],
    set: RegexSet,
}

impl CompiledTier {
    fn new(terms: &'static [&'static str]) -> Self {
        let patterns = terms
            .iter()
            .map(|term| format!(r"\b{}\b", regex::escape(term)));
        let set = RegexSet::new(patterns).expect("Invalid catalog pattern");
        Self { terms, set }
    }

    fn matches(&self, text: &str) -> Vec<&'static str> {
        self.set
            .matches(text)
            .into_iter()
            .map(|idx| self.terms[idx])
            .collect()
    }
}

/// Compiled catalog: `(category, high, medium)` in priority order.
static WORD_BOUNDARY_CATALOG: Lazy<Vec<(MisuseCategory, CompiledTier, CompiledTier)>> =
    Lazy::new(|| {
        CATALOG
            .iter()
            .map(|entry| {
                (
                    entry.category,
                    CompiledTier::new(entry.terms(Tier::High)),
                    CompiledTier::new(entry.terms(Tier::Medium)),
                )
            })
            .collect()
    });

static WORD_BOUNDARY_FAST_PATH: Lazy<CompiledTier> =
    Lazy::new(|| CompiledTier::new(FAST_PATH_TERMS));

/// Scans text for catalog terms.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalScanner {
    mode: MatchMode,
}

impl LexicalScanner {
    /// Creates a scanner with the given match mode.
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    /// Returns the match mode.
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Normalizes input before matching. Lowercasing is the only transformation.
    pub fn normalize(text: &str) -> String {
        text.to_lowercase()
    }

    /// Counts per-category, per-tier matches in already-normalized text.
    pub fn scan_normalized(&self, normalized: &str) -> ScanCounts {
        let mut scan = ScanCounts::default();

        match self.mode {
            MatchMode::Substring => {
                for entry in CATALOG {
                    let high = contained(entry.terms(Tier::High), normalized);
                    let medium = contained(entry.terms(Tier::Medium), normalized);
                    scan.counts.push((
                        entry.category,
                        TierCounts {
                            high: high.len(),
                            medium: medium.len(),
                        },
                    ));
                    scan.matched_terms.extend(high);
                    scan.matched_terms.extend(medium);
                }
            }
            MatchMode::WordBoundary => {
                for (category, high, medium) in WORD_BOUNDARY_CATALOG.iter() {
                    let high = high.matches(normalized);
                    let medium = medium.matches(normalized);
                    scan.counts.push((
                        *category,
                        TierCounts {
                            high: high.len(),
                            medium: medium.len(),
                        },
                    ));
                    scan.matched_terms.extend(high);
                    scan.matched_terms.extend(medium);
                }
            }
        }

        scan
    }

    /// Lowercases `text` and scans it.
    pub fn scan(&self, text: &str) -> ScanCounts {
        self.scan_normalized(&Self::normalize(text))
    }

    /// Returns the fast-path terms present in already-normalized text.
    pub fn fast_path_matches(&self, normalized: &str) -> Vec<&'static str> {
        match self.mode {
            MatchMode::Substring => contained(FAST_PATH_TERMS, normalized),
            MatchMode::WordBoundary => WORD_BOUNDARY_FAST_PATH.matches(normalized),
        }
    }
}

fn contained(terms: &'static [&'static str], text: &str) -> Vec<&'static str> {
    terms
        .iter()
        .copied()
        .filter(|term| text.contains(term))
        .collect()
}
