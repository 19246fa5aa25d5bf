use std::sync::LazyLock;

use regex::Regex;
use rusqlite::Connection;
use serde::Serialize;

use super::SearchError;
use crate::db::repository::{get_medicine_info, list_all_medicines};
use crate::models::Medicine;

/// Scores at or above this count as a match in `search_with_suggestions`.
pub const DEFAULT_MIN_SCORE: u8 = 60;

const SUGGESTION_PREVIEW: usize = 3;

static DOSAGE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d+\s*(?:mg|ml|g|mcg|tablets?|capsules?|tab|cap)\b").unwrap()
});

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const ABBREVIATIONS: &[(&str, &str)] = &[
    ("tab", "tablet"),
    ("tabs", "tablets"),
    ("cap", "capsule"),
    ("caps", "capsules"),
    ("paracet", "paracetamol"),
    ("ibupro", "ibuprofen"),
];

/// Canonical form of a medicine name used for comparison.
pub fn normalize_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let without_dosage = DOSAGE_TOKEN.replace_all(&lowered, "");
    let words_only = NON_WORD.replace_all(&without_dosage, " ");
    let collapsed = WHITESPACE.replace_all(words_only.trim(), " ").into_owned();

    let (head, rest) = match collapsed.split_once(' ') {
        Some((head, rest)) => (head, Some(rest)),
        None => (collapsed.as_str(), None),
    };
    match ABBREVIATIONS.iter().find(|(abbrev, _)| *abbrev == head) {
        Some((_, full)) => match rest {
            Some(rest) => format!("{full} {rest}"),
            None => (*full).to_string(),
        },
        None => collapsed,
    }
}

// ═══════════════════════════════════════════
// Similarity scorers (0-100)
// ═══════════════════════════════════════════

pub fn ratio(a: &str, b: &str) -> u8 {
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8
}

/// Best `ratio` of the shorter string against every window of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let (short, long) = if a.chars().count() <= b.chars().count() { (a, b) } else { (b, a) };
    let short_len = short.chars().count();
    if short_len == 0 {
        return if long.is_empty() { 100 } else { 0 };
    }

    let long_chars: Vec<char> = long.chars().collect();
    let mut best = 0;
    for window in long_chars.windows(short_len) {
        let candidate: String = window.iter().collect();
        best = best.max(ratio(short, &candidate));
        if best == 100 {
            break;
        }
    }
    best
}

pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

// ═══════════════════════════════════════════
// Search results
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// High and medium confidence results may be used to correct a name.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::High | Self::Medium)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FuzzyMatch {
    #[serde(flatten)]
    pub medicine: Medicine,
    pub similarity_score: u8,
    pub match_type: MatchType,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub query: String,
    pub normalized_query: String,
    pub matches: Vec<FuzzyMatch>,
    pub total_found: usize,
    pub confidence: Confidence,
    pub has_exact_match: bool,
    pub suggestions: Vec<String>,
}

impl SearchResult {
    pub fn best_match(&self) -> Option<&FuzzyMatch> {
        self.matches.first()
    }
}

struct CachedMedicine {
    medicine: Medicine,
    normalized_name: String,
    normalized_generic: Option<String>,
}

/// Fuzzy search over the catalogue with a lazily loaded, normalised name cache.
pub struct FuzzySearcher<'a> {
    conn: &'a Connection,
    cache: Option<Vec<CachedMedicine>>,
}

impl<'a> FuzzySearcher<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn, cache: None }
    }

    /// Drop the cached catalogue so the next search reloads it.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    fn catalogue(&mut self) -> Result<&[CachedMedicine], SearchError> {
        if self.cache.is_none() {
            let medicines = list_all_medicines(self.conn)?;
            tracing::debug!(count = medicines.len(), "Loaded medicine names for fuzzy search");
            let cached = medicines
                .into_iter()
                .map(|medicine| CachedMedicine {
                    normalized_name: normalize_name(&medicine.name),
                    normalized_generic: medicine
                        .generic_name
                        .as_deref()
                        .filter(|g| !g.trim().is_empty())
                        .map(normalize_name),
                    medicine,
                })
                .collect();
            self.cache = Some(cached);
        }
        Ok(self.cache.as_deref().unwrap_or(&[]))
    }

    /// Catalogue entries scoring at least `min_score`, best first.
    pub fn search_fuzzy(
        &mut self,
        query: &str,
        limit: usize,
        min_score: u8,
    ) -> Result<Vec<FuzzyMatch>, SearchError> {
        let normalized_query = normalize_name(query);
        if normalized_query.is_empty() || limit == 0 {
            return Ok(vec![]);
        }

        let mut matches: Vec<FuzzyMatch> = self
            .catalogue()?
            .iter()
            .filter_map(|entry| {
                let name = &entry.normalized_name;
                let mut best = ratio(&normalized_query, name)
                    .max(partial_ratio(&normalized_query, name))
                    .max(token_sort_ratio(&normalized_query, name));
                if let Some(generic) = &entry.normalized_generic {
                    best = best.max(ratio(&normalized_query, generic));
                }
                (best >= min_score).then(|| FuzzyMatch {
                    medicine: entry.medicine.clone(),
                    similarity_score: best,
                    match_type: MatchType::Fuzzy,
                })
            })
            .collect();

        // Stable sort keeps catalogue order among equal scores
        matches.sort_by(|a, b| b.similarity_score.cmp(&a.similarity_score));
        matches.truncate(limit);
        Ok(matches)
    }

    /// Exact catalogue hit first (if any), then fuzzy hits, with a confidence label.
    pub fn search_with_suggestions(&mut self, query: &str, limit: usize) -> Result<SearchResult, SearchError> {
        let exact = get_medicine_info(self.conn, query)?;

        let matches = match exact {
            Some(medicine) => {
                let exact_id = medicine.id;
                let mut all = vec![FuzzyMatch {
                    medicine,
                    similarity_score: 100,
                    match_type: MatchType::Exact,
                }];
                // The exact row also scores as a fuzzy hit
                let fuzzy = self.search_fuzzy(query, limit, DEFAULT_MIN_SCORE)?;
                all.extend(fuzzy.into_iter().filter(|m| m.medicine.id != exact_id));
                all.truncate(limit.max(1));
                all
            }
            None => self.search_fuzzy(query, limit, DEFAULT_MIN_SCORE)?,
        };

        let has_exact_match = matches.first().is_some_and(|m| m.match_type == MatchType::Exact);
        let confidence = if has_exact_match {
            Confidence::High
        } else if !matches.is_empty() {
            Confidence::Medium
        } else {
            Confidence::Low
        };

        Ok(SearchResult {
            query: query.to_string(),
            normalized_query: normalize_name(query),
            total_found: matches.len(),
            suggestions: matches
                .iter()
                .take(SUGGESTION_PREVIEW)
                .map(|m| m.medicine.name.clone())
                .collect(),
            matches,
            confidence,
            has_exact_match,
        })
    }

    /// Autocomplete names whose normalised form starts with or contains the query.
    pub fn get_suggestions(&mut self, partial: &str, limit: usize) -> Result<Vec<String>, SearchError> {
        if partial.trim().chars().count() < 2 {
            return Ok(vec![]);
        }
        let normalized_query = normalize_name(partial);
        if normalized_query.is_empty() {
            return Ok(vec![]);
        }

        let mut names: Vec<String> = self
            .catalogue()?
            .iter()
            .filter(|entry| entry.normalized_name.contains(&normalized_query))
            .map(|entry| entry.medicine.name.clone())
            .collect();
        names.sort();
        names.dedup();
        names.truncate(limit);
        Ok(names)
    }
}
