//! Fixed-size word windows classified along a binary axis.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clusters::{ClusterGroup, SCENE_ACTION, SEQUEL_REFLECTION};
use crate::document::Document;
use crate::matcher::OccurrenceIndex;

/// Intensity points per winning indicator, saturating at 100.
pub const INTENSITY_PER_INDICATOR: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowLabel {
    Scene,
    Sequel,
}

impl fmt::Display for WindowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowLabel::Scene => write!(f, "scene"),
            WindowLabel::Sequel => write!(f, "sequel"),
        }
    }
}

/// Two disjoint indicator clusters and the label each one votes for.
#[derive(Debug, Clone)]
pub struct BinaryAxis {
    pub group: ClusterGroup,
    pub first: (WindowLabel, String),
    pub second: (WindowLabel, String),
    /// Label used when both sides count the same, including 0:0.
    pub tie: WindowLabel,
}

impl BinaryAxis {
    /// Action indicators vote scene, reflection indicators vote sequel.
    pub fn scene_sequel(tie: WindowLabel) -> Self {
        Self {
            group: ClusterGroup::SceneIndicator,
            first: (WindowLabel::Scene, SCENE_ACTION.to_string()),
            second: (WindowLabel::Sequel, SEQUEL_REFLECTION.to_string()),
            tie,
        }
    }
}

/// A contiguous slice of the word stream.
#[derive(Debug, Clone, Serialize)]
pub struct Window {
    pub index: usize,
    /// Word range `[start_word, end_word)`.
    pub start_word: usize,
    pub end_word: usize,
    /// Byte range into the document text.
    pub start_offset: usize,
    pub end_offset: usize,
    pub word_count: usize,
    pub classification: WindowLabel,
    pub intensity: f64,
    /// Winning indicator keywords in text order.
    pub matched_indicators: Vec<String>,
    /// Indicator hits on both sides.
    pub indicator_hits: usize,
}

/// Partition the document into windows of `window_size` words and classify each.
pub fn classify_windows(
    document: &Document,
    index: &OccurrenceIndex,
    axis: &BinaryAxis,
    window_size: usize,
) -> Vec<Window> {
    let size = window_size.max(1);
    let total = document.word_count();
    let matches = index.group(axis.group);

    let mut windows = Vec::with_capacity(total.div_ceil(size));
    let mut start_word = 0;
    while start_word < total {
        let end_word = (start_word + size).min(total);
        let span = document.word_span(start_word, end_word);

        let first = matches.in_range(&axis.first.1, span.clone());
        let second = matches.in_range(&axis.second.1, span.clone());

        let (classification, winning) = if first.len() > second.len() {
            (axis.first.0, first)
        } else if second.len() > first.len() {
            (axis.second.0, second)
        } else if axis.tie == axis.first.0 {
            (axis.tie, first)
        } else {
            (axis.tie, second)
        };
        let intensity = if first.len() == second.len() {
            0.0
        } else {
            (winning.len() as f64 * INTENSITY_PER_INDICATOR).min(100.0)
        };

        windows.push(Window {
            index: windows.len(),
            start_word,
            end_word,
            start_offset: span.start,
            end_offset: span.end,
            word_count: end_word - start_word,
            classification,
            intensity,
            matched_indicators: winning.iter().map(|o| o.keyword.clone()).collect(),
            indicator_hits: first.len() + second.len(),
        });
        start_word = end_word;
    }
    windows
}

/// Structural rollup of a set of windows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WindowSummary {
    pub scene_windows: usize,
    pub sequel_windows: usize,
    /// `scene_windows / max(sequel_windows, 1)`; stays finite when there are no sequels.
    pub ratio: f64,
    pub avg_scene_words: f64,
    pub avg_sequel_words: f64,
    pub max_intensity: f64,
    pub indicator_hits: usize,
}

impl WindowSummary {
    pub fn from_windows(windows: &[Window]) -> Self {
        let mut summary = WindowSummary::default();
        let mut scene_words = 0usize;
        let mut sequel_words = 0usize;
        for w in windows {
            match w.classification {
                WindowLabel::Scene => {
                    summary.scene_windows += 1;
                    scene_words += w.word_count;
                }
                WindowLabel::Sequel => {
                    summary.sequel_windows += 1;
                    sequel_words += w.word_count;
                }
            }
            summary.max_intensity = summary.max_intensity.max(w.intensity);
            summary.indicator_hits += w.indicator_hits;
        }
        summary.ratio = summary.scene_windows as f64 / summary.sequel_windows.max(1) as f64;
        summary.avg_scene_words = average(scene_words, summary.scene_windows);
        summary.avg_sequel_words = average(sequel_words, summary.sequel_windows);
        summary
    }
}

fn average(total: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// Occurrences per 1,000 words; 0 for an empty document.
pub fn density_per_thousand(count: usize, words: usize) -> f64 {
    if words == 0 {
        0.0
    } else {
        count as f64 * 1000.0 / words as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clusters::ClusterTable;
    use crate::matcher::CompiledClusters;

    fn index_for(doc: &Document) -> OccurrenceIndex {
        let table = ClusterTable::empty()
            .with_cluster(ClusterGroup::SceneIndicator, SCENE_ACTION, &["ran", "storm"])
            .with_cluster(
                ClusterGroup::SceneIndicator,
                SEQUEL_REFLECTION,
                &["thought", "wondered"],
            );
        OccurrenceIndex::build(doc, &CompiledClusters::compile(&table).unwrap())
    }

    #[test]
    fn test_windows_cover_all_words_without_overlap() {
        let text = (0..2345).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let doc = Document::new(text);
        let windows = classify_windows(
            &doc,
            &index_for(&doc),
            &BinaryAxis::scene_sequel(WindowLabel::Sequel),
            1000,
        );
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].start_word, 0);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end_word, pair[1].start_word);
        }
        assert_eq!(windows.last().unwrap().end_word, 2345);
        assert_eq!(windows[2].word_count, 345);
        assert!(windows[..2].iter().all(|w| w.word_count == 1000));
    }

    #[test]
    fn test_majority_vote_and_intensity() {
        let doc = Document::new("He ran through the storm. She thought.");
        let windows = classify_windows(
            &doc,
            &index_for(&doc),
            &BinaryAxis::scene_sequel(WindowLabel::Sequel),
            1000,
        );
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].classification, WindowLabel::Scene);
        assert_eq!(windows[0].intensity, 20.0);
        assert_eq!(windows[0].matched_indicators, vec!["ran", "storm"]);
        assert_eq!(windows[0].indicator_hits, 3);
    }

    #[test]
    fn test_intensity_saturates() {
        let text = "ran ".repeat(40);
        let doc = Document::new(text);
        let windows = classify_windows(
            &doc,
            &index_for(&doc),
            &BinaryAxis::scene_sequel(WindowLabel::Sequel),
            1000,
        );
        assert_eq!(windows[0].intensity, 100.0);
    }

    #[test]
    fn test_ties_use_configured_label() {
        let doc = Document::new("He ran. He thought.");
        let index = index_for(&doc);
        let sequel = classify_windows(&doc, &index, &BinaryAxis::scene_sequel(WindowLabel::Sequel), 10);
        assert_eq!(sequel[0].classification, WindowLabel::Sequel);
        let scene = classify_windows(&doc, &index, &BinaryAxis::scene_sequel(WindowLabel::Scene), 10);
        assert_eq!(scene[0].classification, WindowLabel::Scene);
        assert_eq!(scene[0].intensity, 0.0);
    }

    #[test]
    fn test_empty_document_has_no_windows() {
        let doc = Document::new("   ");
        let windows = classify_windows(
            &doc,
            &index_for(&doc),
            &BinaryAxis::scene_sequel(WindowLabel::Sequel),
            1000,
        );
        assert!(windows.is_empty());
        let summary = WindowSummary::from_windows(&windows);
        assert_eq!(summary.ratio, 0.0);
    }

    #[test]
    fn test_window_size_zero_is_treated_as_one() {
        let doc = Document::new("a b c");
        let windows = classify_windows(
            &doc,
            &index_for(&doc),
            &BinaryAxis::scene_sequel(WindowLabel::Sequel),
            0,
        );
        assert_eq!(windows.len(), 3);
    }

    #[test]
    fn test_summary_ratio_and_averages() {
        let doc = Document::new("ran ran. thought. ran storm x");
        let windows = classify_windows(
            &doc,
            &index_for(&doc),
            &BinaryAxis::scene_sequel(WindowLabel::Sequel),
            2,
        );
        // [ran ran.] scene, [thought. ran] tie -> sequel, [storm x] scene
        let summary = WindowSummary::from_windows(&windows);
        assert_eq!(summary.scene_windows, 2);
        assert_eq!(summary.sequel_windows, 1);
        assert_eq!(summary.ratio, 2.0);
        assert_eq!(summary.avg_scene_words, 2.0);
    }

    #[test]
    fn test_density_per_thousand() {
        assert_eq!(density_per_thousand(5, 1000), 5.0);
        assert_eq!(density_per_thousand(1, 500), 2.0);
        assert_eq!(density_per_thousand(3, 0), 0.0);
    }
}
