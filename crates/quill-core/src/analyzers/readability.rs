//! Readability formulas over the punctuation-split sentences.
//!
//! Syllables come from a vowel-group heuristic, not a pronunciation
//! dictionary, so every index here is an approximation.

use anyhow::Result;

use crate::analyzer::{AnalysisContext, DimensionAnalyzer};
use crate::types::{Dimension, DimensionScore};

pub const FLESCH_READING_EASE: &str = "flesch_reading_ease";
pub const FLESCH_KINCAID_GRADE: &str = "flesch_kincaid_grade";
pub const GUNNING_FOG: &str = "gunning_fog";
pub const SMOG_INDEX: &str = "smog_index";

/// Readability indices for a block of text.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadabilityMetrics {
    pub words: usize,
    pub sentences: usize,
    pub syllables: usize,
    pub complex_words: usize,
    pub words_per_sentence: f64,
    pub syllables_per_word: f64,
    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,
    pub gunning_fog: f64,
    pub smog_index: f64,
}

impl ReadabilityMetrics {
    /// `None` when there are no words or no sentences to average over.
    pub fn compute<'w>(words: impl IntoIterator<Item = &'w str>, sentences: usize) -> Option<Self> {
        let mut word_count = 0usize;
        let mut syllables = 0usize;
        let mut complex_words = 0usize;
        for word in words {
            let s = count_syllables(word);
            if s == 0 {
                continue;
            }
            word_count += 1;
            syllables += s;
            if s >= 3 {
                complex_words += 1;
            }
        }
        if word_count == 0 || sentences == 0 {
            return None;
        }

        let wps = word_count as f64 / sentences as f64;
        let spw = syllables as f64 / word_count as f64;
        let complex_ratio = complex_words as f64 / word_count as f64;

        Some(Self {
            words: word_count,
            sentences,
            syllables,
            complex_words,
            words_per_sentence: wps,
            syllables_per_word: spw,
            flesch_reading_ease: 206.835 - 1.015 * wps - 84.6 * spw,
            flesch_kincaid_grade: 0.39 * wps + 11.8 * spw - 15.59,
            gunning_fog: 0.4 * (wps + 100.0 * complex_ratio),
            smog_index: 1.0430 * (complex_words as f64 * 30.0 / sentences as f64).sqrt() + 3.1291,
        })
    }
}

/// Count vowel groups, dropping a silent trailing `e`. Words without letters
/// have no syllables; any other word has at least one.
pub fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    if letters.is_empty() {
        return 0;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0usize;
    let mut prev_vowel = false;
    for &c in &letters {
        let v = is_vowel(c);
        if v && !prev_vowel {
            count += 1;
        }
        prev_vowel = v;
    }

    let n = letters.len();
    let silent_e = n > 2 && letters[n - 1] == 'e' && letters[n - 2] != 'l';
    if silent_e && count > 1 {
        count -= 1;
    }
    count.max(1)
}

pub struct ReadabilityAnalyzer;

impl DimensionAnalyzer for ReadabilityAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::Readability
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<DimensionScore> {
        let doc = ctx.document;
        let Some(m) = ReadabilityMetrics::compute(
            doc.words().iter().map(|w| w.text.as_str()),
            doc.sentence_count(),
        ) else {
            return Ok(DimensionScore::degenerate(
                Dimension::Readability,
                "No complete sentences to measure readability",
            ));
        };

        let mut score = DimensionScore::new(Dimension::Readability, m.flesch_reading_ease)
            .with_detail(format!("Flesch Reading Ease: {:.1}", m.flesch_reading_ease))
            .with_detail(format!("Flesch-Kincaid Grade: {:.1}", m.flesch_kincaid_grade))
            .with_detail(format!("Gunning Fog Index: {:.1}", m.gunning_fog))
            .with_detail(format!("SMOG Index: {:.1}", m.smog_index))
            .with_detail(format!(
                "{:.1} words per sentence, {:.2} syllables per word (estimated)",
                m.words_per_sentence, m.syllables_per_word
            ))
            .with_metric(FLESCH_READING_EASE, m.flesch_reading_ease)
            .with_metric(FLESCH_KINCAID_GRADE, m.flesch_kincaid_grade)
            .with_metric(GUNNING_FOG, m.gunning_fog)
            .with_metric(SMOG_INDEX, m.smog_index)
            .with_metric("words_per_sentence", m.words_per_sentence)
            .with_metric("syllables_per_word", m.syllables_per_word);

        if m.flesch_reading_ease < 40.0 {
            score = score.with_insight(
                "Prose reads as dense; shorten long sentences and prefer plainer words",
            );
        }
        if m.words_per_sentence > 25.0 {
            score = score.with_insight(format!(
                "Average sentence runs {:.0} words; break up the longest sentences",
                m.words_per_sentence
            ));
        }
        if m.flesch_kincaid_grade > 12.0 {
            score = score.with_insight(
                "Reading level is above grade 12; check that it suits the intended audience",
            );
        }
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::run;

    #[test]
    fn test_count_syllables() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("beautiful"), 3);
        assert_eq!(count_syllables("Rhythm."), 1);
        assert_eq!(count_syllables("the"), 1);
        assert_eq!(count_syllables("—"), 0);
        assert_eq!(count_syllables("42"), 0);
    }

    #[test]
    fn test_formulas_match_published_constants() {
        // 2 sentences, 6 one-syllable words.
        let m = ReadabilityMetrics::compute(["The", "cat", "sat", "The", "dog", "ran"], 2).unwrap();
        assert_eq!(m.words_per_sentence, 3.0);
        assert_eq!(m.syllables_per_word, 1.0);
        assert!((m.flesch_reading_ease - (206.835 - 3.045 - 84.6)).abs() < 1e-9);
        assert!((m.flesch_kincaid_grade - (1.17 + 11.8 - 15.59)).abs() < 1e-9);
        assert!((m.gunning_fog - 1.2).abs() < 1e-9);
        assert!((m.smog_index - 3.1291).abs() < 1e-9);
    }

    #[test]
    fn test_simple_prose_scores_high() {
        let s = run(&ReadabilityAnalyzer, "The cat sat on the mat. The dog ran to the park.");
        assert!(s.score > 90.0, "got {}", s.score);
        assert_eq!(s.metric(FLESCH_READING_EASE).map(|f| f > 90.0), Some(true));
    }

    #[test]
    fn test_dense_prose_is_clamped_and_flagged() {
        let text = "Institutionalization of uncharacteristically interdisciplinary \
                    considerations necessitates extraordinarily comprehensive \
                    organizational reconceptualization.";
        let s = run(&ReadabilityAnalyzer, text);
        assert_eq!(s.score, 0.0);
        assert!(!s.insights.is_empty());
    }

    #[test]
    fn test_degenerate_input() {
        for text in ["", "   ", "...", "42 17."] {
            let s = run(&ReadabilityAnalyzer, text);
            assert_eq!(s.score, 0.0, "text {text:?}");
            assert!(!s.details.is_empty());
        }
    }
}
