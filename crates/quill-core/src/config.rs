use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::clusters::ClusterGroup;
use crate::window::WindowLabel;

/// Top-level configuration from `.quill.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub clusters: ClustersConfig,
}

/// Engine tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_genre")]
    pub genre: String,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_chunk_chars")]
    pub conflict_chunk_chars: usize,
    #[serde(default = "default_tie_label")]
    pub scene_tie_label: WindowLabel,
    #[serde(default = "default_theme_min")]
    pub theme_min_occurrences: usize,
    #[serde(default = "default_symbol_min")]
    pub symbol_min_occurrences: usize,
}

fn default_genre() -> String {
    "general".to_string()
}
fn default_window_size() -> usize {
    1000
}
fn default_chunk_chars() -> usize {
    2000
}
fn default_tie_label() -> WindowLabel {
    WindowLabel::Sequel
}
fn default_theme_min() -> usize {
    2
}
fn default_symbol_min() -> usize {
    3
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            genre: default_genre(),
            window_size: default_window_size(),
            conflict_chunk_chars: default_chunk_chars(),
            scene_tie_label: default_tie_label(),
            theme_min_occurrences: default_theme_min(),
            symbol_min_occurrences: default_symbol_min(),
        }
    }
}

/// Report shaping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
}

fn default_max_recommendations() -> usize {
    5
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_recommendations: default_max_recommendations(),
        }
    }
}

/// Extra keyword clusters merged into the built-in tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClustersConfig {
    #[serde(default)]
    pub custom: Vec<CustomClusterConfig>,
}

/// A keyword cluster declared in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomClusterConfig {
    pub group: ClusterGroup,
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Config {
    /// Load configuration from a `.quill.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "failed to parse '{}'. Run `quill init` to create a valid config file",
                path.display()
            )
        })?;
        Ok(config)
    }

    /// Load from `.quill.toml` in the given directory or any ancestor, or return defaults.
    pub fn load_or_default(dir: &Path) -> Self {
        let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let start = if start.is_file() {
            start.parent().map(Path::to_path_buf).unwrap_or(start)
        } else {
            start
        };
        let mut current = start.as_path();
        loop {
            let config_path = current.join(".quill.toml");
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => {
                        tracing::debug!(path = %config_path.display(), "loaded config");
                        config
                    }
                    Err(e) => {
                        tracing::warn!(
                            "failed to load config from '{}': {e:#}. Using defaults.",
                            config_path.display()
                        );
                        Self::default()
                    }
                };
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Self::default()
    }

    /// Generate default TOML content for `quill init`.
    pub fn default_toml() -> String {
        r#"# Quill - Manuscript Analysis Configuration

[analysis]
# Genre profile for the dialogue/narrative targets:
# general, fantasy, science-fiction, mystery, romance, thriller, horror, literary, young-adult
genre = "general"
# Words per scene/sequel classification window
window_size = 1000
# Bytes per chunk when looking for low-conflict sections
conflict_chunk_chars = 2000
# Label given to windows where action and reflection indicators tie
scene_tie_label = "sequel"
# Minimum occurrences before a theme or symbol is reported
theme_min_occurrences = 2
symbol_min_occurrences = 3

[report]
max_recommendations = 5

# Extra keyword clusters. Groups: theme, symbol, conflict, resolution, sensory,
# genre, fiction-element, tense-marker, scene-indicator, action-verb.
# A cluster with an existing name extends that cluster.
# [[clusters.custom]]
# group = "theme"
# name = "Memory & Time"
# keywords = ["memory", "remember", "forgotten", "nostalgia"]
"#
        .to_string()
    }
}
