use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::analyzer::{AnalysisContext, DimensionAnalyzer};
use crate::clusters::{
    ClusterGroup, SENSE_SIGHT, SENSE_SMELL, SENSE_SOUND, SENSE_TASTE, SENSE_TOUCH,
};
use crate::types::{Dimension, DimensionScore};
use crate::window::density_per_thousand;

pub const SENSES: [&str; 5] = [SENSE_SIGHT, SENSE_SOUND, SENSE_TOUCH, SENSE_SMELL, SENSE_TASTE];

const VISUAL_HEAVY_SHARE: f64 = 70.0;
const VARIETY_FLOOR_SHARE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensoryStatus {
    Balanced,
    VisualHeavy,
    NeedsVariety,
}

impl fmt::Display for SensoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensoryStatus::Balanced => write!(f, "balanced"),
            SensoryStatus::VisualHeavy => write!(f, "visual-heavy"),
            SensoryStatus::NeedsVariety => write!(f, "needs-variety"),
        }
    }
}

/// Hit count and percentage share for one sense.
#[derive(Debug, Clone, PartialEq)]
pub struct SenseShare {
    pub sense: &'static str,
    pub count: usize,
    pub percent: f64,
}

/// Percentage shares per sense plus the two balance flags.
pub fn sense_shares(counts: &[(&'static str, usize)]) -> (Vec<SenseShare>, SensoryStatus) {
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    let shares: Vec<SenseShare> = counts
        .iter()
        .map(|(sense, count)| SenseShare {
            sense: *sense,
            count: *count,
            percent: if total == 0 {
                0.0
            } else {
                *count as f64 * 100.0 / total as f64
            },
        })
        .collect();

    if total == 0 {
        return (shares, SensoryStatus::NeedsVariety);
    }
    let sight = shares
        .iter()
        .find(|s| s.sense == SENSE_SIGHT)
        .map_or(0.0, |s| s.percent);
    let status = if sight > VISUAL_HEAVY_SHARE {
        SensoryStatus::VisualHeavy
    } else if shares
        .iter()
        .any(|s| s.sense != SENSE_SIGHT && s.percent < VARIETY_FLOOR_SHARE)
    {
        SensoryStatus::NeedsVariety
    } else {
        SensoryStatus::Balanced
    };
    (shares, status)
}

pub struct SensoryAnalyzer;

impl DimensionAnalyzer for SensoryAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::Sensory
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<DimensionScore> {
        let words = ctx.document.word_count();
        if words == 0 {
            return Ok(DimensionScore::degenerate(
                Dimension::Sensory,
                "No words to analyze for sensory detail",
            ));
        }

        let matches = ctx.index.group(ClusterGroup::Sensory);
        let counts: Vec<(&'static str, usize)> =
            SENSES.iter().map(|s| (*s, matches.count(s))).collect();
        let total: usize = counts.iter().map(|(_, c)| c).sum();
        if total == 0 {
            return Ok(DimensionScore::degenerate(
                Dimension::Sensory,
                "No sensory language detected",
            )
            .with_metric("sensory_hits", 0.0)
            .with_insight(
                "Ground scenes in the senses: add sound, touch, smell and taste, not only sight",
            ));
        }

        let (shares, status) = sense_shares(&counts);
        let senses_used = shares.iter().filter(|s| s.count > 0).count();
        let density = density_per_thousand(total, words);

        let raw = (density * 6.0).min(60.0) + (senses_used as f64 * 8.0).min(40.0);
        let mut score = DimensionScore::new(Dimension::Sensory, raw)
            .with_detail(format!(
                "{total} sensory references ({density:.1} per 1,000 words), status: {status}"
            ))
            .with_metric("sensory_hits", total as f64)
            .with_metric("sensory_density", density)
            .with_metric("senses_used", senses_used as f64);
        for share in &shares {
            score = score
                .with_detail(format!(
                    "{}: {} ({:.0}%)",
                    share.sense, share.count, share.percent
                ))
                .with_metric(&format!("{}_percent", share.sense), share.percent);
        }

        match status {
            SensoryStatus::VisualHeavy => {
                score = score.with_insight(
                    "Description leans heavily on sight; weave in sound, touch, smell and taste",
                );
            }
            SensoryStatus::NeedsVariety => {
                let missing: Vec<&str> = shares
                    .iter()
                    .filter(|s| s.sense != SENSE_SIGHT && s.percent < VARIETY_FLOOR_SHARE)
                    .map(|s| s.sense)
                    .collect();
                score = score.with_insight(format!(
                    "Underused senses: {}; a single concrete detail per scene makes a difference",
                    missing.join(", ")
                ));
            }
            SensoryStatus::Balanced => {}
        }
        if density < 5.0 {
            score = score.with_insight(
                "Sensory detail is sparse; anchor key moments in physical sensation",
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
    fn test_visual_heavy_flag() {
        let (_, status) = sense_shares(&[
            (SENSE_SIGHT, 8),
            (SENSE_SOUND, 1),
            (SENSE_TOUCH, 1),
            (SENSE_SMELL, 0),
            (SENSE_TASTE, 0),
        ]);
        assert_eq!(status, SensoryStatus::VisualHeavy);
    }

    #[test]
    fn test_needs_variety_flag() {
        let (shares, status) = sense_shares(&[
            (SENSE_SIGHT, 5),
            (SENSE_SOUND, 5),
            (SENSE_TOUCH, 5),
            (SENSE_SMELL, 5),
            (SENSE_TASTE, 0),
        ]);
        assert_eq!(status, SensoryStatus::NeedsVariety);
        assert_eq!(shares[0].percent, 25.0);
    }

    #[test]
    fn test_balanced() {
        let (_, status) = sense_shares(&[
            (SENSE_SIGHT, 3),
            (SENSE_SOUND, 2),
            (SENSE_TOUCH, 2),
            (SENSE_SMELL, 1),
            (SENSE_TASTE, 1),
        ]);
        assert_eq!(status, SensoryStatus::Balanced);
    }

    #[test]
    fn test_registers_touch_and_sound() {
        let s = run(
            &SensoryAnalyzer,
            "\"I love you,\" she whispered. He ran through the storm, fear gripping his heart.",
        );
        assert!(s.metric("touch_percent").unwrap() > 0.0);
        assert!(s.metric("sound_percent").unwrap() > 0.0);
        assert!(s.score > 0.0);
    }

    #[test]
    fn test_no_senses_scores_zero() {
        let s = run(&SensoryAnalyzer, "Numbers and figures were listed in order.");
        assert_eq!(s.score, 0.0);
        assert!(!s.insights.is_empty());
    }

    #[test]
    fn test_empty_text() {
        let s = run(&SensoryAnalyzer, "");
        assert_eq!(s.score, 0.0);
    }
}
