use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::analyzer::{AnalysisContext, DimensionAnalyzer};
use crate::clusters::{ClusterGroup, ACTION_VERBS};
use crate::document::quoted_spans;
use crate::types::{Dimension, DimensionScore};

/// Words of narration credited to each action verb hit.
pub const ACTION_SPAN_WORDS: usize = 10;

/// Target percentages of dialogue, description and action for a genre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenreProfile {
    pub genre: &'static str,
    pub dialogue: f64,
    pub description: f64,
    pub action: f64,
}

const fn profile(genre: &'static str, dialogue: f64, description: f64, action: f64) -> GenreProfile {
    GenreProfile {
        genre,
        dialogue,
        description,
        action,
    }
}

pub const GENERAL_PROFILE: GenreProfile = profile("general", 30.0, 50.0, 20.0);

const PROFILES: &[GenreProfile] = &[
    GENERAL_PROFILE,
    profile("fantasy", 25.0, 55.0, 20.0),
    profile("science-fiction", 25.0, 55.0, 20.0),
    profile("mystery", 35.0, 45.0, 20.0),
    profile("romance", 40.0, 45.0, 15.0),
    profile("thriller", 30.0, 35.0, 35.0),
    profile("horror", 25.0, 50.0, 25.0),
    profile("literary", 25.0, 60.0, 15.0),
    profile("young-adult", 40.0, 35.0, 25.0),
];

/// Look up a genre profile by name or common alias, case-insensitively.
pub fn genre_profile(genre: &str) -> Option<GenreProfile> {
    let key = genre.trim().to_lowercase().replace([' ', '_'], "-");
    let key = match key.as_str() {
        "sci-fi" | "scifi" | "sf" => "science-fiction",
        "ya" => "young-adult",
        other => other,
    };
    PROFILES.iter().find(|p| p.genre == key).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DialogueBalance {
    Excellent,
    Good,
    NeedsAdjustment,
}

impl DialogueBalance {
    pub fn from_deviation(deviation: f64) -> Self {
        if deviation > 40.0 {
            DialogueBalance::NeedsAdjustment
        } else if deviation > 20.0 {
            DialogueBalance::Good
        } else {
            DialogueBalance::Excellent
        }
    }
}

impl fmt::Display for DialogueBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogueBalance::Excellent => write!(f, "excellent"),
            DialogueBalance::Good => write!(f, "good"),
            DialogueBalance::NeedsAdjustment => write!(f, "needs-adjustment"),
        }
    }
}

/// Word counts split into the three narrative modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeSplit {
    pub dialogue: usize,
    pub action: usize,
    pub description: usize,
}

impl ModeSplit {
    pub fn new(total_words: usize, dialogue_words: usize, action_hits: usize) -> Self {
        let dialogue = dialogue_words.min(total_words);
        let remaining = total_words - dialogue;
        let action = (action_hits * ACTION_SPAN_WORDS).min(remaining);
        Self {
            dialogue,
            action,
            description: remaining - action,
        }
    }

    pub fn total(&self) -> usize {
        self.dialogue + self.action + self.description
    }

    /// `(dialogue, description, action)` as percentages of the total.
    pub fn percentages(&self) -> (f64, f64, f64) {
        let total = self.total();
        if total == 0 {
            return (0.0, 0.0, 0.0);
        }
        let pct = |n: usize| n as f64 * 100.0 / total as f64;
        (pct(self.dialogue), pct(self.description), pct(self.action))
    }

    /// Sum of absolute percentage-point differences from the profile.
    pub fn deviation(&self, target: &GenreProfile) -> f64 {
        let (dialogue, description, action) = self.percentages();
        (dialogue - target.dialogue).abs()
            + (description - target.description).abs()
            + (action - target.action).abs()
    }
}

pub struct DialogueAnalyzer;

impl DimensionAnalyzer for DialogueAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::DialogueNarrative
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<DimensionScore> {
        let doc = ctx.document;
        let total = doc.word_count();
        if total == 0 {
            return Ok(DimensionScore::degenerate(
                Dimension::DialogueNarrative,
                "No words to split into dialogue and narrative",
            ));
        }

        let (target, fallback) = match genre_profile(&ctx.settings.genre) {
            Some(p) => (p, false),
            None => {
                tracing::warn!(
                    genre = %ctx.settings.genre,
                    "unknown genre, using general dialogue targets"
                );
                (GENERAL_PROFILE, true)
            }
        };

        let text = doc.text();
        let dialogue_words: usize = quoted_spans(text)
            .into_iter()
            .map(|span| text[span].split_whitespace().count())
            .sum();
        let action_hits = ctx.index.group(ClusterGroup::ActionVerb).count(ACTION_VERBS);
        let split = ModeSplit::new(total, dialogue_words, action_hits);
        let (dialogue, description, action) = split.percentages();
        let deviation = split.deviation(&target);
        let balance = DialogueBalance::from_deviation(deviation);

        let mut score = DimensionScore::new(Dimension::DialogueNarrative, 100.0 - deviation)
            .with_detail(format!(
                "Dialogue {dialogue:.0}%, description {description:.0}%, action {action:.0}%"
            ))
            .with_detail(format!(
                "Target for {}: dialogue {:.0}%, description {:.0}%, action {:.0}%",
                target.genre, target.dialogue, target.description, target.action
            ))
            .with_detail(format!("Deviation {deviation:.1} points, balance: {balance}"))
            .with_metric("dialogue_percent", dialogue)
            .with_metric("description_percent", description)
            .with_metric("action_percent", action)
            .with_metric("deviation", deviation);
        if fallback {
            score = score.with_detail(format!(
                "Unknown genre '{}', compared against general targets",
                ctx.settings.genre
            ));
        }

        if balance != DialogueBalance::Excellent {
            let gaps = [
                ("dialogue", dialogue - target.dialogue),
                ("description", description - target.description),
                ("action", action - target.action),
            ];
            if let Some((mode, gap)) = gaps
                .iter()
                .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            {
                let direction = if *gap > 0.0 { "Trim" } else { "Add more" };
                score = score.with_insight(format!(
                    "{direction} {mode}: it is {:.0} points off the {} target",
                    gap.abs(),
                    target.genre
                ));
            }
        }
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalysisSettings;
    use crate::analyzers::test_support::{run, run_with};

    #[test]
    fn test_genre_profiles_and_aliases() {
        assert_eq!(genre_profile("General"), Some(GENERAL_PROFILE));
        assert_eq!(genre_profile("sci-fi").unwrap().genre, "science-fiction");
        assert_eq!(genre_profile("Science Fiction").unwrap().genre, "science-fiction");
        assert_eq!(genre_profile("YA").unwrap().dialogue, 40.0);
        assert_eq!(genre_profile("thriller").unwrap().action, 35.0);
        assert!(genre_profile("cookbook").is_none());
    }

    #[test]
    fn test_profiles_sum_to_one_hundred() {
        for p in PROFILES {
            assert_eq!(p.dialogue + p.description + p.action, 100.0, "{}", p.genre);
        }
    }

    #[test]
    fn test_action_words_capped_at_remaining() {
        let split = ModeSplit::new(10, 4, 3);
        assert_eq!(split.dialogue, 4);
        assert_eq!(split.action, 6);
        assert_eq!(split.description, 0);
        assert_eq!(split.total(), 10);
    }

    #[test]
    fn test_balance_thresholds() {
        assert_eq!(DialogueBalance::from_deviation(10.0), DialogueBalance::Excellent);
        assert_eq!(DialogueBalance::from_deviation(20.0), DialogueBalance::Excellent);
        assert_eq!(DialogueBalance::from_deviation(30.0), DialogueBalance::Good);
        assert_eq!(DialogueBalance::from_deviation(40.1), DialogueBalance::NeedsAdjustment);
    }

    #[test]
    fn test_short_passage_needs_adjustment() {
        // 5 words: 1 quoted, 1 action verb credited 4 words, nothing left.
        let s = run(&DialogueAnalyzer, "\"Run,\" she said. He ran.");
        assert_eq!(s.metric("dialogue_percent"), Some(20.0));
        assert_eq!(s.metric("action_percent"), Some(80.0));
        assert_eq!(s.metric("description_percent"), Some(0.0));
        assert_eq!(s.metric("deviation"), Some(120.0));
        assert_eq!(s.score, 0.0);
        assert_eq!(s.insights.len(), 1);
        assert!(s.insights[0].starts_with("Trim action"));
    }

    #[test]
    fn test_exact_profile_scores_full_marks() {
        let quoted = vec!["calm"; 30].join(" ");
        let filler = vec!["calm"; 68].join(" ");
        let text = format!("\"{quoted}\" ran ran {filler}.");
        let s = run(&DialogueAnalyzer, &text);
        assert_eq!(s.metric("deviation"), Some(0.0));
        assert_eq!(s.score, 100.0);
        assert!(s.insights.is_empty());
    }

    #[test]
    fn test_unknown_genre_falls_back_to_general() {
        let settings = AnalysisSettings {
            genre: "cookbook".to_string(),
            ..AnalysisSettings::default()
        };
        let s = run_with(&DialogueAnalyzer, "\"Run,\" she said. He ran.", &settings);
        assert_eq!(s.metric("deviation"), Some(120.0));
        assert!(s.details.iter().any(|d| d.contains("Unknown genre")));
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(run(&DialogueAnalyzer, "").score, 0.0);
    }
}
