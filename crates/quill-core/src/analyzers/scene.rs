use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::analyzer::{AnalysisContext, DimensionAnalyzer};
use crate::types::{Dimension, DimensionScore};
use crate::window::{WindowLabel, WindowSummary};

/// Distinct indicator keywords listed for the most intense scene.
const MAX_PEAK_INDICATORS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneStatus {
    Excellent,
    Good,
    Unbalanced,
}

impl SceneStatus {
    /// `unbalanced` outside [1, 5], `good` outside [1.5, 3], else `excellent`.
    pub fn from_ratio(ratio: f64) -> Self {
        if !(1.0..=5.0).contains(&ratio) {
            SceneStatus::Unbalanced
        } else if !(1.5..=3.0).contains(&ratio) {
            SceneStatus::Good
        } else {
            SceneStatus::Excellent
        }
    }

    /// Like `from_ratio`, but scenes with no sequel at all are always unbalanced.
    pub fn from_counts(scenes: usize, sequels: usize, ratio: f64) -> Self {
        if sequels == 0 && scenes > 0 {
            SceneStatus::Unbalanced
        } else {
            SceneStatus::from_ratio(ratio)
        }
    }

    fn base_score(&self) -> f64 {
        match self {
            SceneStatus::Excellent => 85.0,
            SceneStatus::Good => 65.0,
            SceneStatus::Unbalanced => 35.0,
        }
    }
}

impl fmt::Display for SceneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneStatus::Excellent => write!(f, "excellent"),
            SceneStatus::Good => write!(f, "good"),
            SceneStatus::Unbalanced => write!(f, "unbalanced"),
        }
    }
}

pub struct SceneSequelAnalyzer;

impl DimensionAnalyzer for SceneSequelAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::SceneSequel
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<DimensionScore> {
        if ctx.windows.is_empty() {
            return Ok(DimensionScore::degenerate(
                Dimension::SceneSequel,
                "No words to divide into scenes and sequels",
            ));
        }

        let summary = WindowSummary::from_windows(ctx.windows);
        if summary.indicator_hits == 0 {
            return Ok(DimensionScore::degenerate(
                Dimension::SceneSequel,
                "No scene or sequel indicators found",
            )
            .with_metric("scene_windows", summary.scene_windows as f64)
            .with_metric("sequel_windows", summary.sequel_windows as f64)
            .with_insight(
                "Neither action nor reflection is signalled; alternate goal-driven scenes with reflective sequels",
            ));
        }

        let status =
            SceneStatus::from_counts(summary.scene_windows, summary.sequel_windows, summary.ratio);
        let raw = status.base_score() + (summary.max_intensity * 0.15).min(15.0);

        let mut score = DimensionScore::new(Dimension::SceneSequel, raw)
            .with_detail(format!(
                "{} scene and {} sequel windows of up to {} words",
                summary.scene_windows, summary.sequel_windows, ctx.settings.window_size
            ))
            .with_detail(if summary.sequel_windows == 0 {
                format!("Scene:sequel ratio undefined, no sequels ({status})")
            } else {
                format!("Scene:sequel ratio {:.2} ({status})", summary.ratio)
            })
            .with_detail(format!(
                "Average length: scenes {:.0} words, sequels {:.0} words",
                summary.avg_scene_words, summary.avg_sequel_words
            ))
            .with_metric("scene_windows", summary.scene_windows as f64)
            .with_metric("sequel_windows", summary.sequel_windows as f64)
            .with_metric("ratio", summary.ratio)
            .with_metric("max_intensity", summary.max_intensity);

        if let Some(peak) = ctx
            .windows
            .iter()
            .filter(|w| w.classification == WindowLabel::Scene && w.intensity > 0.0)
            .max_by(|a, b| a.intensity.total_cmp(&b.intensity))
        {
            let mut shown: Vec<&str> = Vec::new();
            for keyword in &peak.matched_indicators {
                if !shown.contains(&keyword.as_str()) {
                    shown.push(keyword);
                }
            }
            let more = shown.len().saturating_sub(MAX_PEAK_INDICATORS);
            shown.truncate(MAX_PEAK_INDICATORS);
            let mut listed = shown.join(", ");
            if more > 0 {
                listed.push_str(&format!(" and {more} more"));
            }
            score = score.with_detail(format!(
                "Most intense scene: window {} (intensity {:.0}, {listed})",
                peak.index + 1,
                peak.intensity,
            ));
        }

        if summary.sequel_windows == 0 {
            score = score.with_insight(
                "Every window reads as action; give characters room to react and decide",
            );
        } else if summary.ratio < 1.0 {
            score = score.with_insight(
                "Reflection outweighs action; convert some sequels into on-page scenes",
            );
        } else if summary.ratio > 5.0 {
            score = score.with_insight(
                "Action rarely pauses; add sequels where characters process what happened",
            );
        } else if status == SceneStatus::Good {
            score = score
                .with_insight("Scene and sequel rhythm is workable; aim for roughly two scenes per sequel");
        }
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalysisSettings;
    use crate::analyzers::test_support::{run, run_with};

    fn with_window(size: usize) -> AnalysisSettings {
        AnalysisSettings {
            window_size: size,
            ..AnalysisSettings::default()
        }
    }

    #[test]
    fn test_status_boundaries() {
        assert_eq!(SceneStatus::from_ratio(0.5), SceneStatus::Unbalanced);
        assert_eq!(SceneStatus::from_ratio(1.0), SceneStatus::Good);
        assert_eq!(SceneStatus::from_ratio(1.5), SceneStatus::Excellent);
        assert_eq!(SceneStatus::from_ratio(3.0), SceneStatus::Excellent);
        assert_eq!(SceneStatus::from_ratio(4.0), SceneStatus::Good);
        assert_eq!(SceneStatus::from_ratio(5.5), SceneStatus::Unbalanced);
    }

    #[test]
    fn test_two_scenes_per_sequel_is_excellent() {
        let text = "ran fought calm calm ran fought calm calm thought calm calm calm.";
        let s = run_with(&SceneSequelAnalyzer, text, &with_window(4));
        assert_eq!(s.metric("scene_windows"), Some(2.0));
        assert_eq!(s.metric("sequel_windows"), Some(1.0));
        assert_eq!(s.metric("ratio"), Some(2.0));
        assert!((s.score - 88.0).abs() < 1e-9, "got {}", s.score);
    }

    #[test]
    fn test_action_only_is_unbalanced() {
        let text = "ran ran ran ran ran ran thought";
        let s = run_with(&SceneSequelAnalyzer, text, &with_window(1));
        assert_eq!(s.metric("ratio"), Some(6.0));
        assert!((s.score - 36.5).abs() < 1e-9, "got {}", s.score);
        assert!(!s.insights.is_empty());
    }

    #[test]
    fn test_scenes_without_sequels_are_unbalanced() {
        assert_eq!(SceneStatus::from_counts(2, 0, 2.0), SceneStatus::Unbalanced);
        assert_eq!(SceneStatus::from_counts(2, 1, 2.0), SceneStatus::Excellent);
        assert_eq!(SceneStatus::from_counts(0, 0, 0.0), SceneStatus::Unbalanced);

        let s = run_with(&SceneSequelAnalyzer, "ran fought ran fought.", &with_window(2));
        assert_eq!(s.metric("scene_windows"), Some(2.0));
        assert_eq!(s.metric("sequel_windows"), Some(0.0));
        assert!((s.score - 38.0).abs() < 1e-9, "got {}", s.score);
        assert!(s.details.iter().any(|d| d.contains("(unbalanced)")));
        assert!(s.insights[0].starts_with("Every window reads as action"));
    }

    #[test]
    fn test_peak_scene_lists_distinct_indicators() {
        let text = "ran fought ".repeat(30);
        let s = run_with(&SceneSequelAnalyzer, &text, &with_window(1000));
        let peak = s
            .details
            .iter()
            .find(|d| d.starts_with("Most intense scene"))
            .unwrap();
        assert!(peak.ends_with("ran, fought)"), "got {peak}");
    }

    #[test]
    fn test_no_indicators_scores_zero() {
        let s = run(&SceneSequelAnalyzer, "The tea was calm and the cups were blue.");
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(run(&SceneSequelAnalyzer, "").score, 0.0);
    }
}
