//! Statistical keyword extraction: the fallback when semantic extraction fails.
//!
//! Scores terms with TF-IDF over a corpus made of the input text alone.
//! With a single document the smoothed IDF is `ln(2/2) + 1 = 1` for every term,
//! so the ranking reduces to L2-normalized in-document term frequency.
//!
//! Tie-break: terms with equal scores keep the order in which they first
//! appear in the text. The same ordering decides which terms survive the
//! vocabulary cap.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use stop_words::{get, LANGUAGE};

/// Maximum number of distinct terms considered for scoring.
pub const VOCABULARY_CAP: usize = 1000;

/// A scored vocabulary term.
#[derive(Debug, Clone, PartialEq)]
pub struct TermScore {
    pub term: String,
    pub score: f64,
}

fn english_stop_words() -> &'static HashSet<String> {
    static STOP_WORDS: OnceLock<HashSet<String>> = OnceLock::new();
    STOP_WORDS.get_or_init(|| {
        get(LANGUAGE::English)
            .iter()
            .map(|w| w.to_string().to_lowercase())
            .collect()
    })
}

/// Splits text into lower-cased word tokens of two or more characters.
/// Word characters are letters, digits and underscore.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_lowercase)
}

/// Scores every vocabulary term of `text`, highest score first.
pub fn score_terms(text: &str) -> Vec<TermScore> {
    let stop_words = english_stop_words();

    // term -> (count, first position)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, token) in tokenize(text).enumerate() {
        if stop_words.contains(&token) {
            continue;
        }
        counts
            .entry(token)
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, position));
    }

    let mut vocabulary: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(term, (count, first))| (term, count, first))
        .collect();
    vocabulary.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    vocabulary.truncate(VOCABULARY_CAP);

    let idf = smoothed_idf(1, 1);
    let norm = vocabulary
        .iter()
        .map(|(_, count, _)| (*count as f64 * idf).powi(2))
        .sum::<f64>()
        .sqrt();
    if norm == 0.0 {
        return Vec::new();
    }

    // Already ordered by count desc then first appearance, which is the
    // score order since the weight is uniform.
    vocabulary
        .into_iter()
        .map(|(term, count, _)| TermScore {
            term,
            score: count as f64 * idf / norm,
        })
        .collect()
}

/// `ln((1 + n) / (1 + df)) + 1`, the smoothed inverse document frequency.
fn smoothed_idf(documents: usize, document_frequency: usize) -> f64 {
    ((1.0 + documents as f64) / (1.0 + document_frequency as f64)).ln() + 1.0
}

/// Returns the `top_n` highest scoring terms of `text`.
/// Empty or whitespace-only input yields an empty list.
pub fn extract_top_terms(text: &str, top_n: usize) -> Vec<String> {
    if text.trim().is_empty() || top_n == 0 {
        return Vec::new();
    }
    score_terms(text)
        .into_iter()
        .take(top_n)
        .map(|t| t.term)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const JD: &str = "We need a Rust engineer. Rust services run on Kubernetes. \
        Kubernetes operators are written in Rust. Terraform experience helps.";

    #[test]
    fn test_most_frequent_terms_rank_first() {
        let terms = extract_top_terms(JD, 2);
        assert_eq!(terms, vec!["rust", "kubernetes"]);
    }

    #[test]
    fn test_ties_keep_first_appearance_order() {
        let terms = extract_top_terms("zebra python zebra python docker", 3);
        assert_eq!(terms, vec!["zebra", "python", "docker"]);
    }

    #[test]
    fn test_stop_words_and_single_characters_are_dropped() {
        let terms = extract_top_terms("the the the a of and python c", 10);
        assert_eq!(terms, vec!["python"]);
    }

    #[test]
    fn test_empty_and_whitespace_input_degrade_to_empty() {
        assert!(extract_top_terms("", 10).is_empty());
        assert!(extract_top_terms("   \n\t ", 10).is_empty());
        assert!(extract_top_terms("the and of", 10).is_empty());
    }

    #[test]
    fn test_top_n_caps_output() {
        assert_eq!(extract_top_terms(JD, 1).len(), 1);
        assert!(extract_top_terms(JD, 0).is_empty());
    }

    #[test]
    fn test_scores_are_l2_normalized() {
        let scores = score_terms(JD);
        let norm: f64 = scores.iter().map(|t| t.score * t.score).sum();
        assert!((norm - 1.0).abs() < 1e-9);
        assert!(scores.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_single_document_idf_is_one() {
        assert!((smoothed_idf(1, 1) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_vocabulary_is_capped() {
        let text: String = (0..VOCABULARY_CAP + 50)
            .map(|i| format!("term{i} "))
            .collect();
        assert_eq!(score_terms(&text).len(), VOCABULARY_CAP);
    }
}
