//! Lexical scoring used by `MemoryStore`.
//!
//! Approximates what Postgres does for the same queries: `pg_trgm`
//! similarity for fuzzy search and an English `tsvector` match for full-text
//! search. Scores are close to, but not bit-identical with, the database.

use std::collections::HashSet;

/// `pg_trgm.similarity_threshold` default.
pub const SIMILARITY_THRESHOLD: f64 = 0.3;

/// `pg_trgm.word_similarity_threshold` default.
pub const WORD_SIMILARITY_THRESHOLD: f64 = 0.6;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "how", "in", "is", "it", "of",
    "on", "or", "that", "the", "this", "to", "was", "what", "with",
];

/// Trigram set of a string, built the way `pg_trgm` does: lowercase,
/// split on non-alphanumerics, each word padded with two leading blanks and
/// one trailing blank.
pub fn trigrams(text: &str) -> HashSet<String> {
    let mut set = HashSet::new();
    for word in words(text) {
        let padded: Vec<char> = format!("  {} ", word).chars().collect();
        for window in padded.windows(3) {
            set.insert(window.iter().collect());
        }
    }
    set
}

/// Jaccard overlap of the two trigram sets (`similarity(a, b)`).
pub fn similarity(a: &str, b: &str) -> f64 {
    let ta = trigrams(a);
    let tb = trigrams(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let shared = ta.intersection(&tb).count();
    let union = ta.len() + tb.len() - shared;
    shared as f64 / union as f64
}

/// Share of the query's trigrams found in the target (`word_similarity(query, target)`).
///
/// Postgres looks for the best matching extent of the target; counting over
/// the whole target gives the same answer whenever the query is a substring.
pub fn word_similarity(query: &str, target: &str) -> f64 {
    let tq = trigrams(query);
    if tq.is_empty() {
        return 0.0;
    }
    let tt = trigrams(target);
    tq.intersection(&tt).count() as f64 / tq.len() as f64
}

/// Fuzzy score of `target` for `query`, or `None` when neither
/// `target % query` nor `query <% target` would match.
pub fn fuzzy_score(query: &str, target: &str) -> Option<f64> {
    let sim = similarity(target, query);
    let word_sim = word_similarity(query, target);
    if sim >= SIMILARITY_THRESHOLD || word_sim >= WORD_SIMILARITY_THRESHOLD {
        Some(sim.max(word_sim))
    } else {
        None
    }
}

/// Query lexemes, as `plainto_tsquery('english', ..)` would produce them.
pub fn lexemes(text: &str) -> Vec<String> {
    words(text)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .map(|w| stem(&w))
        .collect()
}

/// Full-text rank of weighted fields for the query, or `None` unless every
/// query lexeme occurs in at least one field.
///
/// `fields` pairs each text with its weight (task name highest).
pub fn fulltext_rank(query: &str, fields: &[(&str, f64)]) -> Option<f64> {
    let terms = lexemes(query);
    if terms.is_empty() {
        return None;
    }

    let documents: Vec<(Vec<String>, f64)> = fields
        .iter()
        .map(|(text, weight)| (lexemes(text), *weight))
        .collect();

    let mut rank = 0.0;
    for term in &terms {
        let mut term_rank = 0.0;
        for (lexemes, weight) in &documents {
            let hits = lexemes.iter().filter(|l| *l == term).count();
            term_rank += hits as f64 * weight;
        }
        if term_rank == 0.0 {
            return None;
        }
        rank += term_rank;
    }

    let total: usize = documents.iter().map(|(l, _)| l.len()).sum();
    Some(rank / (1.0 + (total as f64).ln_1p()))
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
}

// Crude suffix stripping, enough to match "deploying"/"deploys" to "deploy".
fn stem(word: &str) -> String {
    for suffix in ["ing", "ed", "es", "s"] {
        if let Some(root) = word.strip_suffix(suffix) {
            if root.chars().count() >= 3 {
                return root.to_string();
            }
        }
    }
    word.to_string()
}
