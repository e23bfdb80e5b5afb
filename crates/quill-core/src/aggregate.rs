//! Combine dimension scores into the final report.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analyzers::fiction::EMOTIONAL_CORE;
use crate::analyzers::theme::{SYMBOLS_DETECTED, THEMES_DETECTED};
use crate::document::Document;
use crate::stats::{mean, std_dev};
use crate::types::{clamp_score, Dimension, DimensionScore};

const MAX_STRENGTHS: usize = 3;
const MAX_WEAKNESSES: usize = 3;
const STRENGTH_THRESHOLD: f64 = 70.0;
const WEAKNESS_THRESHOLD: f64 = 40.0;

/// Which summary the aggregator produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportVariant {
    #[default]
    Standard,
    Tier,
}

/// A group of dimensions scored together in the tier report.
#[derive(Debug, Clone, Copy)]
pub struct Principle {
    pub name: &'static str,
    pub weights: &'static [(Dimension, f64)],
}

pub const PRINCIPLES: [Principle; 2] = [
    Principle {
        name: "Story Architecture",
        weights: &[
            (Dimension::FictionElements, 3.0),
            (Dimension::ThemeSymbol, 2.0),
            (Dimension::Conflict, 2.0),
            (Dimension::SceneSequel, 2.0),
        ],
    },
    Principle {
        name: "Prose Craft",
        weights: &[
            (Dimension::DialogueNarrative, 2.0),
            (Dimension::Sensory, 2.0),
            (Dimension::Readability, 1.0),
        ],
    },
];

/// Weights of every principle combined.
pub fn tier_weights() -> Vec<(Dimension, f64)> {
    PRINCIPLES.iter().flat_map(|p| p.weights.iter().copied()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipleScore {
    pub name: String,
    pub score: f64,
    pub dimensions: Vec<Dimension>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierSummary {
    pub tier: u8,
    pub label: String,
    pub overall_score: f64,
    pub principles: Vec<PrincipleScore>,
}

/// Tier 1 at 80 and above, then 60 and 40; everything else is tier 4.
pub fn tier_for(score: f64) -> u8 {
    if score >= 80.0 {
        1
    } else if score >= 60.0 {
        2
    } else if score >= 40.0 {
        3
    } else {
        4
    }
}

fn tier_label(tier: u8) -> &'static str {
    match tier {
        1 => "polished",
        2 => "solid",
        3 => "developing",
        _ => "early draft",
    }
}

impl TierSummary {
    pub fn from_scores(scores: &[DimensionScore]) -> Self {
        let principles = PRINCIPLES
            .iter()
            .map(|p| PrincipleScore {
                name: p.name.to_string(),
                score: overall_score(scores, Some(p.weights)),
                dimensions: p.weights.iter().map(|(d, _)| *d).collect(),
            })
            .collect();
        let overall = overall_score(scores, Some(tier_weights().as_slice()));
        let tier = tier_for(overall);
        Self {
            tier,
            label: tier_label(tier).to_string(),
            overall_score: overall,
            principles,
        }
    }
}

impl fmt::Display for TierSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tier {} ({})", self.tier, self.label)
    }
}

/// The complete output of one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub dimension_scores: Vec<DimensionScore>,
    pub overall_score: f64,
    pub balance_score: f64,
    pub strengths: Vec<Dimension>,
    pub weaknesses: Vec<Dimension>,
    pub recommendations: Vec<String>,
    pub word_count: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    pub genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<TierSummary>,
}

impl AnalysisReport {
    pub fn score(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.dimension_scores.iter().find(|s| s.dimension == dimension)
    }
}

/// Mean score, or `Σ score·w / Σ w` when weights are given. Dimensions
/// without a weight count 0; a zero total weight falls back to the mean.
pub fn overall_score(scores: &[DimensionScore], weights: Option<&[(Dimension, f64)]>) -> f64 {
    let plain = || mean(&scores.iter().map(|s| s.score).collect::<Vec<_>>());
    let Some(weights) = weights else {
        return clamp_score(plain());
    };
    let weight_of = |d: Dimension| {
        weights
            .iter()
            .find(|(w, _)| *w == d)
            .map_or(0.0, |(_, w)| w.max(0.0))
    };
    let total: f64 = scores.iter().map(|s| weight_of(s.dimension)).sum();
    if total == 0.0 {
        return clamp_score(plain());
    }
    let weighted: f64 = scores.iter().map(|s| s.score * weight_of(s.dimension)).sum();
    clamp_score(weighted / total)
}

/// `max(0, 100 - 2σ)` over the dimension scores; 100 when there are none.
pub fn balance_score(scores: &[DimensionScore]) -> f64 {
    let values: Vec<f64> = scores.iter().map(|s| s.score).collect();
    clamp_score(100.0 - 2.0 * std_dev(&values))
}

/// Up to three dimensions scoring at least 70, best first.
pub fn strengths(scores: &[DimensionScore]) -> Vec<Dimension> {
    let mut strong: Vec<&DimensionScore> = scores
        .iter()
        .filter(|s| s.score >= STRENGTH_THRESHOLD)
        .collect();
    strong.sort_by(|a, b| b.score.total_cmp(&a.score));
    strong.iter().take(MAX_STRENGTHS).map(|s| s.dimension).collect()
}

/// Up to three dimensions scoring under 40, worst first.
pub fn weaknesses(scores: &[DimensionScore]) -> Vec<Dimension> {
    let mut weak: Vec<&DimensionScore> = scores
        .iter()
        .filter(|s| s.score < WEAKNESS_THRESHOLD)
        .collect();
    weak.sort_by(|a, b| a.score.total_cmp(&b.score));
    weak.iter().take(MAX_WEAKNESSES).map(|s| s.dimension).collect()
}

fn metric(scores: &[DimensionScore], dimension: Dimension, key: &str) -> Option<f64> {
    scores
        .iter()
        .find(|s| s.dimension == dimension)
        .and_then(|s| s.metric(key))
}

/// Fixed rules first, then the lead insight of each weak dimension.
pub fn recommendations(scores: &[DimensionScore], balance: f64, max: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let themes = metric(scores, Dimension::ThemeSymbol, THEMES_DETECTED);
    let symbols = metric(scores, Dimension::ThemeSymbol, SYMBOLS_DETECTED);
    let emotion = metric(scores, Dimension::FictionElements, EMOTIONAL_CORE).unwrap_or(0.0);

    if themes.is_some_and(|t| t > 5.0) {
        out.push(
            "Too many themes compete for attention; focus on two or three core themes".to_string(),
        );
    }
    if symbols == Some(0.0) {
        out.push(
            "No symbolic patterns detected; introduce a recurring image or object that carries meaning"
                .to_string(),
        );
    }
    if themes == Some(0.0) && emotion < 10.0 {
        out.push(
            "Thematic and emotional content is nearly absent; clarify what the story is about and what the characters feel"
                .to_string(),
        );
    }
    if balance < 50.0 {
        out.push(
            "Performance is uneven across dimensions; shore up the weakest areas before polishing strengths"
                .to_string(),
        );
    }

    let mut weak: Vec<&DimensionScore> = scores
        .iter()
        .filter(|s| s.score < WEAKNESS_THRESHOLD)
        .collect();
    weak.sort_by(|a, b| a.score.total_cmp(&b.score));
    out.extend(weak.iter().filter_map(|s| s.insights.first().cloned()));

    let mut seen = std::collections::HashSet::new();
    out.retain(|r| seen.insert(r.clone()));
    out.truncate(max);
    out
}

/// Assemble the report from analyzer output in `Dimension::ALL` order.
pub fn build_report(
    dimension_scores: Vec<DimensionScore>,
    document: &Document,
    genre: &str,
    variant: ReportVariant,
    max_recommendations: usize,
) -> AnalysisReport {
    let tier = match variant {
        ReportVariant::Standard => None,
        ReportVariant::Tier => Some(TierSummary::from_scores(&dimension_scores)),
    };
    let overall = match &tier {
        Some(t) => t.overall_score,
        None => overall_score(&dimension_scores, None),
    };
    let balance = balance_score(&dimension_scores);

    AnalysisReport {
        overall_score: overall,
        balance_score: balance,
        strengths: strengths(&dimension_scores),
        weaknesses: weaknesses(&dimension_scores),
        recommendations: recommendations(&dimension_scores, balance, max_recommendations),
        word_count: document.word_count(),
        sentence_count: document.sentence_count(),
        paragraph_count: document.paragraphs().len(),
        genre: genre.to_string(),
        tier,
        dimension_scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[(Dimension, f64)]) -> Vec<DimensionScore> {
        values
            .iter()
            .map(|(d, s)| DimensionScore::new(*d, *s))
            .collect()
    }

    fn all(values: [f64; 7]) -> Vec<DimensionScore> {
        Dimension::ALL
            .iter()
            .zip(values)
            .map(|(d, s)| DimensionScore::new(*d, s))
            .collect()
    }

    #[test]
    fn test_overall_mean_and_weighted() {
        let s = scores(&[(Dimension::Sensory, 80.0), (Dimension::Readability, 40.0)]);
        assert_eq!(overall_score(&s, None), 60.0);
        let w = [(Dimension::Sensory, 3.0), (Dimension::Readability, 1.0)];
        assert_eq!(overall_score(&s, Some(&w)), 70.0);
    }

    #[test]
    fn test_missing_weights_count_zero_and_zero_total_falls_back() {
        let s = scores(&[(Dimension::Sensory, 80.0), (Dimension::Readability, 40.0)]);
        assert_eq!(overall_score(&s, Some(&[(Dimension::Sensory, 2.0)])), 80.0);
        assert_eq!(overall_score(&s, Some(&[(Dimension::Conflict, 2.0)])), 60.0);
        assert_eq!(overall_score(&[], None), 0.0);
    }

    #[test]
    fn test_balance_score() {
        assert_eq!(balance_score(&[]), 100.0);
        assert_eq!(balance_score(&all([50.0; 7])), 100.0);
        let s = scores(&[(Dimension::Sensory, 0.0), (Dimension::Readability, 100.0)]);
        // sigma = 50
        assert_eq!(balance_score(&s), 0.0);
        let s = scores(&[(Dimension::Sensory, 40.0), (Dimension::Readability, 60.0)]);
        assert_eq!(balance_score(&s), 80.0);
    }

    #[test]
    fn test_strengths_and_weaknesses_are_stable() {
        let s = all([90.0, 70.0, 90.0, 80.0, 10.0, 39.9, 10.0]);
        assert_eq!(
            strengths(&s),
            vec![
                Dimension::FictionElements,
                Dimension::DialogueNarrative,
                Dimension::SceneSequel
            ]
        );
        assert_eq!(
            weaknesses(&s),
            vec![Dimension::Conflict, Dimension::Readability, Dimension::Sensory]
        );
    }

    #[test]
    fn test_recommendation_rules_come_first_and_dedupe() {
        let mut s = all([10.0, 20.0, 60.0, 60.0, 5.0, 60.0, 60.0]);
        s[0] = s[0]
            .clone()
            .with_metric(EMOTIONAL_CORE, 0.0)
            .with_insight("Add feeling");
        s[1] = s[1]
            .clone()
            .with_metric(THEMES_DETECTED, 0.0)
            .with_metric(SYMBOLS_DETECTED, 0.0)
            .with_insight("Add feeling");
        s[4] = s[4].clone().with_insight("Raise the stakes");

        let recs = recommendations(&s, 80.0, 5);
        assert!(recs[0].starts_with("No symbolic patterns"));
        assert!(recs[1].starts_with("Thematic and emotional content"));
        assert_eq!(&recs[2..], ["Raise the stakes", "Add feeling"]);
    }

    #[test]
    fn test_recommendations_truncate() {
        let mut s = all([10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        for (i, score) in s.iter_mut().enumerate() {
            *score = score.clone().with_insight(format!("insight {i}"));
        }
        let recs = recommendations(&s, 20.0, 5);
        assert_eq!(recs.len(), 5);
        assert!(recs[0].starts_with("Performance is uneven"));
        assert_eq!(recs[1], "insight 0");
    }

    #[test]
    fn test_too_many_themes_rule() {
        let s = vec![DimensionScore::new(Dimension::ThemeSymbol, 90.0)
            .with_metric(THEMES_DETECTED, 6.0)
            .with_metric(SYMBOLS_DETECTED, 2.0)];
        let recs = recommendations(&s, 100.0, 5);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].starts_with("Too many themes"));
    }

    #[test]
    fn test_tier_summary() {
        let s = all([100.0, 100.0, 50.0, 100.0, 100.0, 50.0, 100.0]);
        let tier = TierSummary::from_scores(&s);
        assert_eq!(tier.principles[0].score, 100.0);
        // (2*50 + 2*50 + 1*100) / 5
        assert_eq!(tier.principles[1].score, 60.0);
        // (900 + 300) / 14
        assert!((tier.overall_score - 1200.0 / 14.0).abs() < 1e-9);
        assert_eq!(tier.tier, 1);
        assert_eq!(tier_for(79.9), 2);
        assert_eq!(tier_for(40.0), 3);
        assert_eq!(tier_for(0.0), 4);
    }

    #[test]
    fn test_build_report_uses_tier_overall() {
        let doc = Document::new("One two. Three.");
        let s = all([100.0, 100.0, 50.0, 100.0, 100.0, 50.0, 100.0]);
        let standard = build_report(s.clone(), &doc, "general", ReportVariant::Standard, 5);
        assert!(standard.tier.is_none());
        assert!((standard.overall_score - 600.0 / 7.0).abs() < 1e-9);
        let tiered = build_report(s, &doc, "general", ReportVariant::Tier, 5);
        assert!((tiered.overall_score - 1200.0 / 14.0).abs() < 1e-9);
        assert_eq!(tiered.word_count, 3);
        assert_eq!(tiered.sentence_count, 2);
        assert_eq!(tiered.paragraph_count, 1);
    }
}
