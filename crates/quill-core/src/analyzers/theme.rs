//! Recurring themes and symbols.
//!
//! A theme is "detected" once it recurs often enough to be deliberate; the
//! thresholds come from `AnalysisSettings`. Distribution compares how hits
//! fall across the beginning, middle and end of the text.

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::analyzer::{AnalysisContext, DimensionAnalyzer};
use crate::clusters::ClusterGroup;
use crate::document::Document;
use crate::types::{Dimension, DimensionScore, MatchOccurrence};

pub const THEMES_DETECTED: &str = "themes_detected";
pub const SYMBOLS_DETECTED: &str = "symbols_detected";

const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeDistribution {
    Concentrated,
    Scattered,
    Balanced,
}

impl ThemeDistribution {
    /// Classify hit counts per third of the text.
    pub fn from_thirds(thirds: [usize; 3]) -> Self {
        let total: usize = thirds.iter().sum();
        if total == 0 {
            return ThemeDistribution::Scattered;
        }
        let max = thirds.iter().max().copied().unwrap_or(0);
        let min = thirds.iter().min().copied().unwrap_or(0);
        let spread = (max - min) as f64 / total as f64;
        if spread > 0.6 {
            ThemeDistribution::Concentrated
        } else if spread < 0.25 {
            ThemeDistribution::Balanced
        } else {
            ThemeDistribution::Scattered
        }
    }
}

impl fmt::Display for ThemeDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeDistribution::Concentrated => write!(f, "concentrated"),
            ThemeDistribution::Scattered => write!(f, "scattered"),
            ThemeDistribution::Balanced => write!(f, "balanced"),
        }
    }
}

/// Breakpoints on words per occurrence: rarer mentions read as fainter.
pub fn theme_intensity(words: usize, occurrences: usize) -> f64 {
    if occurrences == 0 {
        return 0.0;
    }
    let words_per_occurrence = words as f64 / occurrences as f64;
    if words_per_occurrence > 500.0 {
        40.0
    } else if words_per_occurrence > 300.0 {
        60.0
    } else if words_per_occurrence > 150.0 {
        80.0
    } else {
        100.0
    }
}

/// One theme or symbol cluster as it shows up in the text.
#[derive(Debug, Clone, Serialize)]
pub struct PatternFinding {
    pub name: String,
    pub occurrences: usize,
    pub intensity: f64,
    pub distribution: ThemeDistribution,
    pub examples: Vec<String>,
}

impl PatternFinding {
    fn from_hits(name: &str, hits: &[MatchOccurrence], document: &Document) -> Self {
        let len = document.text().len().max(1);
        let mut thirds = [0usize; 3];
        for hit in hits {
            thirds[(hit.offset * 3 / len).min(2)] += 1;
        }

        let mut examples: Vec<String> = Vec::new();
        for hit in hits {
            if examples.len() == MAX_EXAMPLES {
                break;
            }
            if let Some(i) = document.sentence_at(hit.offset) {
                let sentence = &document.sentences()[i].text;
                if !examples.contains(sentence) {
                    examples.push(sentence.clone());
                }
            }
        }

        Self {
            name: name.to_string(),
            occurrences: hits.len(),
            intensity: theme_intensity(document.word_count(), hits.len()),
            distribution: ThemeDistribution::from_thirds(thirds),
            examples,
        }
    }
}

/// Findings for every cluster of `group` with at least `min` hits, most frequent first.
pub fn detect_patterns(
    ctx: &AnalysisContext<'_>,
    group: ClusterGroup,
    min: usize,
) -> Vec<PatternFinding> {
    let mut found: Vec<PatternFinding> = ctx
        .index
        .group(group)
        .iter()
        .filter(|h| h.occurrences.len() >= min)
        .map(|h| PatternFinding::from_hits(&h.cluster, &h.occurrences, ctx.document))
        .collect();
    found.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    found
}

pub struct ThemeSymbolAnalyzer;

impl DimensionAnalyzer for ThemeSymbolAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::ThemeSymbol
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<DimensionScore> {
        if ctx.document.is_empty() {
            return Ok(DimensionScore::degenerate(
                Dimension::ThemeSymbol,
                "No words to search for themes",
            )
            .with_metric(THEMES_DETECTED, 0.0)
            .with_metric(SYMBOLS_DETECTED, 0.0));
        }

        let themes = detect_patterns(ctx, ClusterGroup::Theme, ctx.settings.theme_min_occurrences);
        let symbols =
            detect_patterns(ctx, ClusterGroup::Symbol, ctx.settings.symbol_min_occurrences);
        let top_intensity = themes.iter().map(|t| t.intensity).fold(0.0, f64::max);

        let raw = (top_intensity / 2.0).min(50.0)
            + (themes.len() as f64 * 10.0).min(30.0)
            + (symbols.len() as f64 * 7.0).min(20.0);

        let mut score = DimensionScore::new(Dimension::ThemeSymbol, raw)
            .with_detail(format!(
                "{} themes and {} symbols recur",
                themes.len(),
                symbols.len()
            ))
            .with_metric(THEMES_DETECTED, themes.len() as f64)
            .with_metric(SYMBOLS_DETECTED, symbols.len() as f64)
            .with_metric("top_intensity", top_intensity);

        for theme in &themes {
            score = score.with_detail(format!(
                "Theme {}: {} occurrences, intensity {:.0}, {}",
                theme.name, theme.occurrences, theme.intensity, theme.distribution
            ));
            for example in &theme.examples {
                score = score.with_detail(format!("  \"{example}\""));
            }
        }
        for symbol in &symbols {
            score = score.with_detail(format!(
                "Symbol {}: {} occurrences, {}",
                symbol.name, symbol.occurrences, symbol.distribution
            ));
        }

        if themes.is_empty() {
            score = score.with_insight(
                "No theme recurs; decide what the story is about and let it surface in key moments",
            );
        } else if themes.len() > 5 {
            score = score.with_insight(format!(
                "{} themes compete for attention; focus on two or three",
                themes.len()
            ));
        }
        if let Some(t) = themes
            .iter()
            .find(|t| t.distribution == ThemeDistribution::Concentrated)
        {
            score = score.with_insight(format!(
                "'{}' clusters in one part of the text; thread it through the whole arc",
                t.name
            ));
        }
        if symbols.is_empty() {
            score = score.with_insight(
                "No recurring symbols; repeat a concrete image so it gathers meaning",
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
    fn test_intensity_breakpoints() {
        assert_eq!(theme_intensity(1000, 0), 0.0);
        assert_eq!(theme_intensity(1000, 1), 40.0);
        assert_eq!(theme_intensity(1000, 2), 60.0);
        assert_eq!(theme_intensity(1000, 4), 80.0);
        assert_eq!(theme_intensity(1000, 10), 100.0);
    }

    #[test]
    fn test_distribution_by_thirds() {
        assert_eq!(
            ThemeDistribution::from_thirds([5, 0, 0]),
            ThemeDistribution::Concentrated
        );
        assert_eq!(
            ThemeDistribution::from_thirds([3, 3, 3]),
            ThemeDistribution::Balanced
        );
        assert_eq!(
            ThemeDistribution::from_thirds([1, 2, 3]),
            ThemeDistribution::Scattered
        );
    }

    #[test]
    fn test_detects_theme_and_symbol() {
        let s = run(
            &ThemeSymbolAnalyzer,
            "Love is all. Her heart ached with love. \
             The light of the moon fell on the light and the dark.",
        );
        assert_eq!(s.metric(THEMES_DETECTED), Some(1.0));
        assert_eq!(s.metric(SYMBOLS_DETECTED), Some(1.0));
        assert_eq!(s.score, 67.0);
        assert!(s.details.iter().any(|d| d.contains("Love & Connection")));
    }

    #[test]
    fn test_examples_are_distinct_and_capped() {
        let text = "Love. Love. love love. Love. Love.";
        let (doc, index) = crate::analyzers::test_support::context_for(text);
        let hits = index.group(ClusterGroup::Theme).get("Love & Connection");
        let finding = PatternFinding::from_hits("Love & Connection", hits, &doc);
        assert_eq!(finding.occurrences, 6);
        assert_eq!(finding.examples, vec!["Love", "love love"]);
    }

    #[test]
    fn test_single_mention_is_not_a_theme() {
        let s = run(&ThemeSymbolAnalyzer, "She spoke of justice once.");
        assert_eq!(s.metric(THEMES_DETECTED), Some(0.0));
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn test_empty_text() {
        let s = run(&ThemeSymbolAnalyzer, "");
        assert_eq!(s.score, 0.0);
        assert_eq!(s.metric(THEMES_DETECTED), Some(0.0));
    }
}
