//! File relevance ranking for bounded prompt construction.
//!
//! Scores each retrieved file against an optional free-text focus phrase
//! and an optional explicit class-name list, then sorts by descending
//! relevance. The caller truncates the ranked list to fit its prompt
//! budget, so ties must preserve input order (stable sort).

use regex::RegexBuilder;

use crate::uml::{RankedFile, SourceFile};

/// Score awarded when the file path contains a focus term.
const PATH_MATCH_SCORE: f64 = 0.4;
/// Per-occurrence content score for a focus term, capped at `CONTENT_MATCH_CAP`.
const CONTENT_MATCH_STEP: f64 = 0.03;
const CONTENT_MATCH_CAP: f64 = 0.3;
/// Score for a file that declares one of the requested classes.
const DECLARATION_SCORE: f64 = 0.7;
/// Score for a file that merely mentions one of the requested classes.
const USAGE_SCORE: f64 = 0.3;
/// Flat score when there is nothing to rank against.
const NEUTRAL_SCORE: f64 = 0.5;

/// Rank files by relevance to a focus phrase and/or explicit class names.
///
/// With neither a focus phrase nor class names, every file gets a flat
/// neutral score and input order is preserved. A non-empty phrase is always
/// scored, even when none of its terms survive filtering. Scores are
/// clamped to 1.0.
pub fn rank(files: &[SourceFile], focus_phrase: &str, class_names: &[String]) -> Vec<RankedFile> {
    if focus_phrase.is_empty() && class_names.is_empty() {
        return files
            .iter()
            .map(|file| RankedFile {
                file: file.clone(),
                relevance_score: NEUTRAL_SCORE,
            })
            .collect();
    }

    let focus_terms: Vec<String> = focus_phrase
        .to_lowercase()
        .split_whitespace()
        // Short terms are too common to carry meaning.
        .filter(|term| term.len() > 3)
        .map(str::to_string)
        .collect();

    let mut ranked: Vec<RankedFile> = files
        .iter()
        .map(|file| RankedFile {
            relevance_score: score_file(file, &focus_terms, class_names),
            file: file.clone(),
        })
        .collect();

    // Vec::sort_by is stable: equal scores keep their input order, which
    // callers rely on when truncating to a fixed prefix.
    ranked.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

fn score_file(file: &SourceFile, focus_terms: &[String], class_names: &[String]) -> f64 {
    let mut score = 0.0;
    let lower_path = file.path.to_lowercase();
    let lower_content = file.content.to_lowercase();

    for term in focus_terms {
        if lower_path.contains(term.as_str()) {
            score += PATH_MATCH_SCORE;
        }

        let occurrences = lower_content.matches(term.as_str()).count();
        if occurrences > 0 {
            score += CONTENT_MATCH_CAP.min(occurrences as f64 * CONTENT_MATCH_STEP);
        }
    }

    for name in class_names {
        let escaped = regex::escape(name);

        if let Some(declaration) = word_pattern(&format!(r"(class|interface)\s+{escaped}\b")) {
            if declaration.is_match(&file.content) {
                score += DECLARATION_SCORE;
            }
        }

        // Imports and usages count too, independently of the declaration.
        if let Some(usage) = word_pattern(&format!(r"\b{escaped}\b")) {
            if usage.is_match(&file.content) {
                score += USAGE_SCORE;
            }
        }
    }

    score.min(1.0)
}

fn word_pattern(pattern: &str) -> Option<regex::Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .ok()
}
