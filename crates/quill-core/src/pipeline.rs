use std::time::Instant;

use rayon::prelude::*;

use crate::aggregate::{build_report, AnalysisReport, ReportVariant};
use crate::analyzer::{AnalysisContext, AnalysisSettings, DimensionAnalyzer};
use crate::analyzers::default_analyzers;
use crate::clusters::ClusterTable;
use crate::config::Config;
use crate::document::Document;
use crate::error::AnalysisError;
use crate::matcher::{CompiledClusters, OccurrenceIndex};
use crate::types::DimensionScore;
use crate::window::{classify_windows, BinaryAxis};

/// Per-call overrides on top of the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub genre: Option<String>,
    pub window_size: Option<usize>,
    pub variant: ReportVariant,
}

/// Reusable analysis pipeline. Clusters are compiled once in `new` and
/// shared by every subsequent `analyze` call.
pub struct AnalysisPipeline {
    analyzers: Vec<Box<dyn DimensionAnalyzer>>,
    clusters: CompiledClusters,
    config: Config,
}

impl AnalysisPipeline {
    /// Build a pipeline over `table` plus any custom clusters in `config`.
    pub fn new(table: ClusterTable, config: Config) -> Result<Self, AnalysisError> {
        let mut table = table;
        table.extend_from_config(&config.clusters.custom);
        let clusters = CompiledClusters::compile(&table)
            .map_err(|e| AnalysisError::config(format!("{e:#}")))?;
        Ok(Self {
            analyzers: default_analyzers(),
            clusters,
            config,
        })
    }

    /// Replace the analyzer set.
    pub fn with_analyzers(mut self, analyzers: Vec<Box<dyn DimensionAnalyzer>>) -> Self {
        self.analyzers = analyzers;
        self
    }

    fn settings(&self, options: &AnalyzeOptions) -> Result<AnalysisSettings, AnalysisError> {
        let mut analysis = self.config.analysis.clone();
        if let Some(genre) = &options.genre {
            analysis.genre = genre.clone();
        }
        if let Some(size) = options.window_size {
            analysis.window_size = size;
        }
        if analysis.window_size == 0 {
            return Err(AnalysisError::config("window size must be at least 1"));
        }
        if analysis.conflict_chunk_chars == 0 {
            return Err(AnalysisError::config("conflict_chunk_chars must be at least 1"));
        }
        Ok(AnalysisSettings::from_config(&analysis))
    }

    /// Run every analyzer over `text` and aggregate the results.
    pub fn analyze(
        &self,
        text: &str,
        options: &AnalyzeOptions,
    ) -> Result<AnalysisReport, AnalysisError> {
        let settings = self.settings(options)?;
        let start = Instant::now();

        let document = Document::new(text);
        let index = OccurrenceIndex::build(&document, &self.clusters);
        let axis = BinaryAxis::scene_sequel(settings.scene_tie_label);
        let windows = classify_windows(&document, &index, &axis, settings.window_size);
        tracing::debug!(
            words = document.word_count(),
            sentences = document.sentence_count(),
            windows = windows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "document prepared"
        );

        let ctx = AnalysisContext {
            document: &document,
            index: &index,
            windows: &windows,
            settings: &settings,
        };
        let scores: Vec<DimensionScore> = self
            .analyzers
            .par_iter()
            .map(|analyzer| -> Result<DimensionScore, AnalysisError> {
                let dimension = analyzer.dimension();
                let started = Instant::now();
                let score = analyzer
                    .analyze(&ctx)
                    .map_err(|source| AnalysisError::Analyzer { dimension, source })?;
                tracing::debug!(
                    %dimension,
                    score = score.score,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "analyzer finished"
                );
                Ok(score)
            })
            .collect::<Result<_, AnalysisError>>()?;

        let report = build_report(
            scores,
            &document,
            &settings.genre,
            options.variant,
            self.config.report.max_recommendations,
        );
        tracing::debug!(
            overall = report.overall_score,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "analysis complete"
        );
        Ok(report)
    }

    /// Like `analyze`, rejecting input that is not valid UTF-8.
    pub fn analyze_bytes(
        &self,
        bytes: &[u8],
        options: &AnalyzeOptions,
    ) -> Result<AnalysisReport, AnalysisError> {
        let text = std::str::from_utf8(bytes).map_err(|e| AnalysisError::Encoding {
            offset: e.valid_up_to(),
        })?;
        self.analyze(text, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clusters::ClusterGroup;
    use crate::config::CustomClusterConfig;
    use crate::types::Dimension;

    struct Failing;

    impl DimensionAnalyzer for Failing {
        fn dimension(&self) -> Dimension {
            Dimension::Sensory
        }

        fn analyze(&self, _ctx: &AnalysisContext<'_>) -> anyhow::Result<DimensionScore> {
            anyhow::bail!("sensor offline")
        }
    }

    fn pipeline() -> AnalysisPipeline {
        AnalysisPipeline::new(ClusterTable::builtin(), Config::default()).unwrap()
    }

    #[test]
    fn test_report_has_every_dimension_in_order() {
        let report = pipeline()
            .analyze("He ran. She thought about love.", &AnalyzeOptions::default())
            .unwrap();
        let dims: Vec<Dimension> = report.dimension_scores.iter().map(|s| s.dimension).collect();
        assert_eq!(dims, Dimension::ALL.to_vec());
        assert_eq!(report.genre, "general");
        assert!(report.tier.is_none());
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let err = pipeline()
            .analyze_bytes(&[b'o', b'k', 0xff, b'!'], &AnalyzeOptions::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Encoding { offset: 2 }));
    }

    #[test]
    fn test_analyzer_failure_fails_the_run() {
        let p = pipeline().with_analyzers(vec![Box::new(Failing)]);
        let err = p.analyze("text.", &AnalyzeOptions::default()).unwrap_err();
        match err {
            AnalysisError::Analyzer { dimension, .. } => assert_eq!(dimension, Dimension::Sensory),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_window_is_a_config_error() {
        let options = AnalyzeOptions {
            window_size: Some(0),
            ..AnalyzeOptions::default()
        };
        let err = pipeline().analyze("text.", &options).unwrap_err();
        assert!(matches!(err, AnalysisError::Config { .. }));
    }

    #[test]
    fn test_options_override_config() {
        let options = AnalyzeOptions {
            genre: Some("thriller".to_string()),
            variant: ReportVariant::Tier,
            ..AnalyzeOptions::default()
        };
        let report = pipeline().analyze("He ran.", &options).unwrap();
        assert_eq!(report.genre, "thriller");
        assert!(report.tier.is_some());
    }

    #[test]
    fn test_custom_clusters_from_config_are_matched() {
        let mut config = Config::default();
        config.clusters.custom.push(CustomClusterConfig {
            group: ClusterGroup::Theme,
            name: "Memory & Time".to_string(),
            keywords: vec!["memory".to_string(), "forgotten".to_string()],
        });
        let p = AnalysisPipeline::new(ClusterTable::builtin(), config).unwrap();
        let report = p
            .analyze("A memory, forgotten. Another memory.", &AnalyzeOptions::default())
            .unwrap();
        let theme = report.score(Dimension::ThemeSymbol).unwrap();
        assert!(theme.details.iter().any(|d| d.contains("Memory & Time")));
    }
}
