//! Manuscript analysis engine.
//!
//! Text is segmented into a [`Document`], matched once against a
//! [`ClusterTable`], split into scene/sequel windows, scored by seven
//! independent analyzers and aggregated into an [`AnalysisReport`].

pub mod aggregate;
pub mod analyzer;
pub mod analyzers;
pub mod clusters;
pub mod config;
pub mod document;
pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod stats;
pub mod types;
pub mod window;

pub use aggregate::{AnalysisReport, ReportVariant, TierSummary};
pub use analyzer::{AnalysisContext, AnalysisSettings, DimensionAnalyzer};
pub use clusters::{ClusterGroup, ClusterTable, KeywordCluster};
pub use config::Config;
pub use document::Document;
pub use error::AnalysisError;
pub use pipeline::{AnalysisPipeline, AnalyzeOptions};
pub use types::*;

/// Analyze `text` with the built-in clusters and default configuration.
pub fn analyze(text: &str, options: &AnalyzeOptions) -> Result<AnalysisReport, AnalysisError> {
    AnalysisPipeline::new(ClusterTable::builtin(), Config::default())?.analyze(text, options)
}
