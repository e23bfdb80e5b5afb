use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One independently scored axis of manuscript quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "Fiction Elements")]
    FictionElements,
    #[serde(rename = "Theme & Symbol")]
    ThemeSymbol,
    #[serde(rename = "Dialogue/Narrative Ratio")]
    DialogueNarrative,
    #[serde(rename = "Scene/Sequel Balance")]
    SceneSequel,
    #[serde(rename = "Conflict Tracking")]
    Conflict,
    #[serde(rename = "Sensory Balance")]
    Sensory,
    #[serde(rename = "Readability")]
    Readability,
}

impl Dimension {
    /// All dimensions in report order.
    pub const ALL: [Dimension; 7] = [
        Dimension::FictionElements,
        Dimension::ThemeSymbol,
        Dimension::DialogueNarrative,
        Dimension::SceneSequel,
        Dimension::Conflict,
        Dimension::Sensory,
        Dimension::Readability,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dimension::FictionElements => "Fiction Elements",
            Dimension::ThemeSymbol => "Theme & Symbol",
            Dimension::DialogueNarrative => "Dialogue/Narrative Ratio",
            Dimension::SceneSequel => "Scene/Sequel Balance",
            Dimension::Conflict => "Conflict Tracking",
            Dimension::Sensory => "Sensory Balance",
            Dimension::Readability => "Readability",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Coarse qualitative bucket derived from a numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceLevel {
    Absent,
    Weak,
    Moderate,
    Strong,
}

impl PresenceLevel {
    /// The single threshold table every analyzer uses.
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            PresenceLevel::Strong
        } else if score >= 40.0 {
            PresenceLevel::Moderate
        } else if score >= 20.0 {
            PresenceLevel::Weak
        } else {
            PresenceLevel::Absent
        }
    }
}

impl fmt::Display for PresenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenceLevel::Absent => write!(f, "absent"),
            PresenceLevel::Weak => write!(f, "weak"),
            PresenceLevel::Moderate => write!(f, "moderate"),
            PresenceLevel::Strong => write!(f, "strong"),
        }
    }
}

/// Clamp a raw score into `[0, 100]`, mapping non-finite values to 0.
pub fn clamp_score(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// A single keyword hit inside the document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOccurrence {
    pub cluster: String,
    pub keyword: String,
    /// Byte offset of the match start in `Document::text`.
    pub offset: usize,
}

/// A named sub-score inside a dimension (used by Fiction Elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubScore {
    pub name: String,
    pub score: f64,
    pub presence: PresenceLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl SubScore {
    pub fn new(name: impl Into<String>, raw: f64, details: Vec<String>) -> Self {
        let score = clamp_score(raw);
        Self {
            name: name.into(),
            score,
            presence: PresenceLevel::from_score(score),
            details,
        }
    }
}

/// The output of one analyzer. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub score: f64,
    pub presence: PresenceLevel,
    pub details: Vec<String>,
    pub insights: Vec<String>,
    /// Named numeric facts read by the aggregator's recommendation rules.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_scores: Vec<SubScore>,
}

impl DimensionScore {
    pub fn new(dimension: Dimension, raw: f64) -> Self {
        let score = clamp_score(raw);
        Self {
            dimension,
            score,
            presence: PresenceLevel::from_score(score),
            details: Vec::new(),
            insights: Vec::new(),
            metrics: BTreeMap::new(),
            sub_scores: Vec::new(),
        }
    }

    /// Floor score for input the analyzer cannot measure.
    pub fn degenerate(dimension: Dimension, reason: &str) -> Self {
        Self::new(dimension, 0.0).with_detail(reason)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    pub fn with_insight(mut self, insight: impl Into<String>) -> Self {
        self.insights.push(insight.into());
        self
    }

    pub fn with_metric(mut self, key: &str, value: f64) -> Self {
        let value = if value.is_finite() { value } else { 0.0 };
        self.metrics.insert(key.to_string(), value);
        self
    }

    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_thresholds() {
        assert_eq!(PresenceLevel::from_score(100.0), PresenceLevel::Strong);
        assert_eq!(PresenceLevel::from_score(70.0), PresenceLevel::Strong);
        assert_eq!(PresenceLevel::from_score(69.9), PresenceLevel::Moderate);
        assert_eq!(PresenceLevel::from_score(40.0), PresenceLevel::Moderate);
        assert_eq!(PresenceLevel::from_score(39.9), PresenceLevel::Weak);
        assert_eq!(PresenceLevel::from_score(20.0), PresenceLevel::Weak);
        assert_eq!(PresenceLevel::from_score(19.9), PresenceLevel::Absent);
        assert_eq!(PresenceLevel::from_score(0.0), PresenceLevel::Absent);
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(-5.0), 0.0);
        assert_eq!(clamp_score(150.0), 100.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(f64::INFINITY), 0.0);
        assert_eq!(clamp_score(42.5), 42.5);
    }

    #[test]
    fn test_dimension_score_clamps_and_classifies() {
        let s = DimensionScore::new(Dimension::Sensory, 250.0);
        assert_eq!(s.score, 100.0);
        assert_eq!(s.presence, PresenceLevel::Strong);
    }

    #[test]
    fn test_dimension_serializes_with_stable_names() {
        let json = serde_json::to_string(&Dimension::ThemeSymbol).unwrap();
        assert_eq!(json, "\"Theme & Symbol\"");
        let json = serde_json::to_string(&PresenceLevel::Moderate).unwrap();
        assert_eq!(json, "\"moderate\"");
    }

    #[test]
    fn test_with_metric_drops_non_finite() {
        let s = DimensionScore::new(Dimension::Conflict, 10.0).with_metric("density", f64::NAN);
        assert_eq!(s.metric("density"), Some(0.0));
    }
}
