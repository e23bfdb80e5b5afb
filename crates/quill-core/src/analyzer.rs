use anyhow::Result;

use crate::config::AnalysisConfig;
use crate::document::Document;
use crate::matcher::OccurrenceIndex;
use crate::types::{Dimension, DimensionScore};
use crate::window::{Window, WindowLabel};

/// Resolved per-run settings (config file values with caller overrides applied).
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub genre: String,
    pub window_size: usize,
    pub conflict_chunk_chars: usize,
    pub scene_tie_label: WindowLabel,
    pub theme_min_occurrences: usize,
    pub symbol_min_occurrences: usize,
}

impl AnalysisSettings {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            genre: config.genre.clone(),
            window_size: config.window_size.max(1),
            conflict_chunk_chars: config.conflict_chunk_chars.max(1),
            scene_tie_label: config.scene_tie_label,
            theme_min_occurrences: config.theme_min_occurrences.max(1),
            symbol_min_occurrences: config.symbol_min_occurrences.max(1),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

/// Everything an analyzer may read. All of it is immutable and shared.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub document: &'a Document,
    pub index: &'a OccurrenceIndex,
    pub windows: &'a [Window],
    pub settings: &'a AnalysisSettings,
}

/// Trait that each dimensional analyzer must implement.
///
/// Analyzers are pure functions of the context and never see each other's
/// output, so the pipeline runs them in parallel.
pub trait DimensionAnalyzer: Send + Sync {
    /// The dimension this analyzer scores.
    fn dimension(&self) -> Dimension;

    /// Score the document. Degenerate input yields a floor score, not an error.
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<DimensionScore>;
}
