//! Deterministic text metrics: sentence, word and syllable counts and the
//! Flesch Reading Ease score.
//!
//! Every count is floored at 1 so that degenerate input (empty strings,
//! punctuation only) never divides by zero.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SENTENCE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid sentence regex"));
static WORDS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid word regex"));

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'y'];

/// All metrics for one text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TextStats {
    pub sentences: usize,
    pub words: usize,
    pub syllables: usize,
    /// Flesch Reading Ease, rounded to 2 decimals. Unbounded in both directions.
    pub readability: f64,
}

/// Number of non-empty sentences, at least 1.
pub fn count_sentences(text: &str) -> usize {
    SENTENCE_BREAKS
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1)
}

/// Number of word-character runs, at least 1.
pub fn count_words(text: &str) -> usize {
    WORDS.find_iter(text).count().max(1)
}

/// Vowel-group syllable estimate for one word, at least 1.
///
/// A trailing "e" is treated as silent.
pub fn count_syllables(word: &str) -> usize {
    let word = word.to_lowercase();
    let mut syllables = 0usize;
    let mut prev_was_vowel = false;

    for c in word.chars() {
        let is_vowel = VOWELS.contains(&c);
        if is_vowel && !prev_was_vowel {
            syllables += 1;
        }
        prev_was_vowel = is_vowel;
    }

    if word.ends_with('e') {
        syllables = syllables.saturating_sub(1);
    }

    syllables.max(1)
}

/// Flesch Reading Ease:
/// `206.835 - 1.015 * (words / sentences) - 84.6 * (syllables / words)`,
/// rounded to 2 decimals.
pub fn readability(text: &str) -> f64 {
    analyze_text(text).readability
}

/// Compute all metrics in one pass over the words.
pub fn analyze_text(text: &str) -> TextStats {
    let sentences = count_sentences(text);
    let (words, syllables) = WORDS
        .find_iter(text)
        .fold((0usize, 0usize), |(w, s), m| {
            (w + 1, s + count_syllables(m.as_str()))
        });
    let words = words.max(1);

    let words_per_sentence = words as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words as f64;
    let score = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;

    TextStats {
        sentences,
        words,
        syllables,
        readability: round2(score),
    }
}

/// Round to 2 decimal places, halves to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_sentences_splits_on_punctuation_runs() {
        assert_eq!(count_sentences("One. Two! Three?"), 3);
        assert_eq!(count_sentences("Wait... what?!"), 2);
        assert_eq!(count_sentences("No terminal punctuation"), 1);
    }

    #[test]
    fn test_count_sentences_floors_at_one() {
        assert_eq!(count_sentences(""), 1);
        assert_eq!(count_sentences("...!!!"), 1);
        assert_eq!(count_sentences("   "), 1);
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("The sky is blue."), 4);
        assert_eq!(count_words("don't"), 2);
        assert_eq!(count_words(""), 1);
        assert_eq!(count_words("?!"), 1);
    }

    #[test]
    fn test_count_syllables_vowel_groups() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("beautiful"), 3);
        assert_eq!(count_syllables("rhythm"), 1);
        assert_eq!(count_syllables("queue"), 1);
    }

    #[test]
    fn test_count_syllables_silent_e() {
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("the"), 1);
        assert_eq!(count_syllables("Stone"), 1);
        assert_eq!(count_syllables("create"), 1);
    }

    #[test]
    fn test_count_syllables_floors_at_one() {
        assert_eq!(count_syllables(""), 1);
        assert_eq!(count_syllables("brr"), 1);
        assert_eq!(count_syllables("42"), 1);
    }

    #[test]
    fn test_readability_empty_is_finite() {
        let score = readability("");
        assert!(score.is_finite());
        // 1 sentence, 1 word (floored), 0 syllables
        assert_eq!(score, 205.82);
    }

    #[test]
    fn test_readability_simple_sentence() {
        // 3 words, 1 sentence, 3 syllables
        // 206.835 - 1.015*3 - 84.6*1 = 119.19
        assert_eq!(readability("The cat sat."), 119.19);
    }

    #[test]
    fn test_readability_half_rounds_to_even() {
        // 10 words, 1 sentence, 11 syllables: 103.625 exactly
        assert_eq!(readability("Cat sat on the mat and the dog ran away."), 103.62);
    }

    #[test]
    fn test_readability_drops_for_dense_prose() {
        let plain = readability("The cat sat. The dog ran.");
        let dense = readability(
            "Institutional considerations notwithstanding, the administration deliberated interminably.",
        );
        assert!(dense < plain, "dense={dense} plain={plain}");
    }

    #[test]
    fn test_readability_is_deterministic() {
        let text = "It was the best of times, it was the worst of times.";
        assert_eq!(readability(text).to_bits(), readability(text).to_bits());
    }

    #[test]
    fn test_analyze_text_matches_individual_counts() {
        let text = "The quick brown fox jumps. It lands softly!";
        let stats = analyze_text(text);
        assert_eq!(stats.sentences, count_sentences(text));
        assert_eq!(stats.words, count_words(text));
        assert_eq!(stats.readability, readability(text));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(-3.14159), -3.14);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_counts_never_below_one(text in "\\PC{0,200}") {
                prop_assert!(count_sentences(&text) >= 1);
                prop_assert!(count_words(&text) >= 1);
            }

            #[test]
            fn prop_syllables_never_below_one(word in "\\PC{0,30}") {
                prop_assert!(count_syllables(&word) >= 1);
            }

            #[test]
            fn prop_readability_is_finite(text in "\\PC{0,300}") {
                prop_assert!(readability(&text).is_finite());
            }
        }
    }
}
