use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\p{L}\p{N}\s]+").expect("NON_WORD_CHARS is a valid regex pattern")
});

static WHITESPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("WHITESPACE_RUNS is a valid regex pattern"));

const LEVENSHTEIN_WEIGHT: f64 = 0.4;
const TOKEN_OVERLAP_WEIGHT: f64 = 0.4;
const CONTAINMENT_WEIGHT: f64 = 0.2;

/// Scores how close a free-text answer is to an expected answer.
///
/// The result is a weighted blend of three metrics over normalized text:
/// character-level Levenshtein similarity (40%), Jaccard overlap of the word
/// sets (40%) and substring containment (20%). Exact matches after
/// normalization always score `1.0`.
pub struct TextSimilarityCalculator;

impl TextSimilarityCalculator {
    pub fn similarity(student_answer: &str, expected_answer: &str) -> f64 {
        let student = Self::normalize(student_answer);
        let expected = Self::normalize(expected_answer);

        match (student.is_empty(), expected.is_empty()) {
            (true, true) => return 1.0,
            (true, false) | (false, true) => return 0.0,
            _ => {}
        }

        if student == expected {
            return 1.0;
        }

        let score = LEVENSHTEIN_WEIGHT * Self::levenshtein_similarity(&student, &expected)
            + TOKEN_OVERLAP_WEIGHT * Self::token_overlap(&student, &expected)
            + CONTAINMENT_WEIGHT * Self::containment(&student, &expected);

        score.clamp(0.0, 1.0)
    }

    /// Lowercases, turns punctuation into spaces and collapses whitespace.
    pub fn normalize(text: &str) -> String {
        let lowered = text.trim().to_lowercase();
        let stripped = NON_WORD_CHARS.replace_all(&lowered, " ");
        WHITESPACE_RUNS
            .replace_all(stripped.trim(), " ")
            .into_owned()
    }

    pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
        let longest = a.chars().count().max(b.chars().count());
        if longest == 0 {
            return 1.0;
        }
        1.0 - Self::levenshtein_distance(a, b) as f64 / longest as f64
    }

    pub fn levenshtein_distance(a: &str, b: &str) -> usize {
        let a_chars: Vec<char> = a.chars().collect();
        let b_chars: Vec<char> = b.chars().collect();

        if a_chars.is_empty() {
            return b_chars.len();
        }
        if b_chars.is_empty() {
            return a_chars.len();
        }

        let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
        let mut current = vec![0usize; b_chars.len() + 1];

        for (i, a_char) in a_chars.iter().enumerate() {
            current[0] = i + 1;
            for (j, b_char) in b_chars.iter().enumerate() {
                let cost = usize::from(a_char != b_char);
                current[j + 1] = (previous[j + 1] + 1)
                    .min(current[j] + 1)
                    .min(previous[j] + cost);
            }
            std::mem::swap(&mut previous, &mut current);
        }

        previous[b_chars.len()]
    }

    /// Jaccard index of the whitespace-separated word sets.
    pub fn token_overlap(a: &str, b: &str) -> f64 {
        let a_tokens: HashSet<&str> = a.split_whitespace().collect();
        let b_tokens: HashSet<&str> = b.split_whitespace().collect();

        let union = a_tokens.union(&b_tokens).count();
        if union == 0 {
            return 0.0;
        }
        a_tokens.intersection(&b_tokens).count() as f64 / union as f64
    }

    /// Length ratio of the shorter string to the longer one when either
    /// contains the other, otherwise 0.
    pub fn containment(a: &str, b: &str) -> f64 {
        let a_len = a.chars().count();
        let b_len = b.chars().count();
        if a_len == 0 || b_len == 0 {
            return 0.0;
        }

        let (shorter, longer, short_len, long_len) = if a_len <= b_len {
            (a, b, a_len, b_len)
        } else {
            (b, a, b_len, a_len)
        };

        if longer.contains(shorter) {
            short_len as f64 / long_len as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_scores_one() {
        assert_eq!(
            TextSimilarityCalculator::similarity("Mitochondria", "Mitochondria"),
            1.0
        );
    }

    #[test]
    fn case_and_punctuation_are_ignored() {
        assert_eq!(
            TextSimilarityCalculator::similarity("  PARIS!! ", "paris"),
            1.0
        );
        assert_eq!(
            TextSimilarityCalculator::similarity("new-york", "New York"),
            1.0
        );
    }

    #[test]
    fn disjoint_strings_score_near_zero() {
        let score = TextSimilarityCalculator::similarity("apple", "zebra");
        assert!(score < 0.2, "expected near zero, got {}", score);
    }

    #[test]
    fn partial_word_overlap_lands_between() {
        let disjoint = TextSimilarityCalculator::similarity("apple", "zebra");
        let partial = TextSimilarityCalculator::similarity(
            "the powerhouse of the cell",
            "mitochondria are the powerhouse of a cell",
        );

        assert!(partial > 0.0 && partial < 1.0);
        assert!(partial > disjoint);
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(TextSimilarityCalculator::similarity("", "   "), 1.0);
        assert_eq!(TextSimilarityCalculator::similarity("", "answer"), 0.0);
        assert_eq!(TextSimilarityCalculator::similarity("?!", "answer"), 0.0);
    }

    #[test]
    fn similarity_is_symmetric() {
        let a = "the mitochondria";
        let b = "mitochondria";
        assert_eq!(
            TextSimilarityCalculator::similarity(a, b),
            TextSimilarityCalculator::similarity(b, a)
        );
    }

    #[test]
    fn leading_article_still_passes_default_threshold() {
        // levenshtein 0.75, overlap 0.5, containment 0.75
        let score = TextSimilarityCalculator::similarity("The mitochondria", "mitochondria");
        assert!((score - 0.65).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn normalize_collapses_whitespace_and_punctuation() {
        assert_eq!(
            TextSimilarityCalculator::normalize("  Hello,   World!\tAgain "),
            "hello world again"
        );
    }

    #[test]
    fn levenshtein_distance_known_values() {
        assert_eq!(TextSimilarityCalculator::levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(TextSimilarityCalculator::levenshtein_distance("", "abc"), 3);
        assert_eq!(TextSimilarityCalculator::levenshtein_distance("café", "cafe"), 1);
    }

    #[test]
    fn containment_uses_length_ratio() {
        let score = TextSimilarityCalculator::containment("cell", "cell wall");
        assert!((score - 4.0 / 9.0).abs() < 1e-9);
        assert_eq!(TextSimilarityCalculator::containment("cell", "nucleus"), 0.0);
    }
}
