//! Case-insensitive, word-boundary keyword matching.
//!
//! `CompiledClusters` turns a `ClusterTable` into one regex per cluster, and
//! `OccurrenceIndex` runs every regex once over a document so analyzers can
//! query hits without rescanning the text.

use std::collections::BTreeMap;
use std::ops::Range;

use anyhow::{Context, Result};
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::clusters::{ClusterGroup, ClusterTable, KeywordCluster};
use crate::document::Document;
use crate::types::MatchOccurrence;

/// How a keyword is allowed to match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// `\bkeyword\b`: "art" never matches inside "heart".
    #[default]
    WholeWord,
    /// `\bkeyword\w*\b`: "transform" also matches "transformed".
    Stem,
}

/// One cluster compiled into a single alternation regex.
#[derive(Debug, Clone)]
pub struct CompiledCluster {
    name: String,
    mode: MatchMode,
    /// Normalized keywords, longest first.
    keywords: Vec<String>,
    regex: Regex,
}

impl CompiledCluster {
    /// Returns `Ok(None)` when the cluster has no usable keywords.
    pub fn compile(cluster: &KeywordCluster, mode: MatchMode) -> Result<Option<Self>> {
        let mut keywords: Vec<String> = cluster
            .keywords
            .iter()
            .map(|k| normalize(k))
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Ok(None);
        }
        keywords.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        keywords.dedup();

        let alternation = keywords
            .iter()
            .map(|k| keyword_pattern(k))
            .collect::<Vec<_>>()
            .join("|");
        let suffix = match mode {
            MatchMode::WholeWord => "",
            MatchMode::Stem => r"\w*",
        };
        let pattern = format!(r"(?i)\b(?:{alternation}){suffix}\b");
        let regex = Regex::new(&pattern)
            .with_context(|| format!("invalid keyword pattern in cluster '{}'", cluster.name))?;

        Ok(Some(Self {
            name: cluster.name.clone(),
            mode,
            keywords,
            regex,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All matches in `text`, ordered by offset.
    pub fn find_all(&self, text: &str) -> Vec<MatchOccurrence> {
        self.regex
            .find_iter(text)
            .map(|m| MatchOccurrence {
                cluster: self.name.clone(),
                keyword: self.keyword_for(m.as_str()),
                offset: m.start(),
            })
            .collect()
    }

    fn keyword_for(&self, matched: &str) -> String {
        let normalized = normalize(matched);
        let found = match self.mode {
            MatchMode::WholeWord => self.keywords.iter().find(|k| **k == normalized),
            MatchMode::Stem => self
                .keywords
                .iter()
                .find(|k| normalized.starts_with(k.as_str())),
        };
        found.cloned().unwrap_or(normalized)
    }
}

/// Lowercase and collapse internal whitespace.
fn normalize(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Phrases match literally, with any run of whitespace between words.
fn keyword_pattern(keyword: &str) -> String {
    keyword
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// Occurrences for one cluster.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterHits {
    pub cluster: String,
    pub occurrences: Vec<MatchOccurrence>,
}

/// Cluster name -> occurrences, in cluster declaration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterMatches {
    entries: Vec<ClusterHits>,
}

static EMPTY_MATCHES: ClusterMatches = ClusterMatches {
    entries: Vec::new(),
};

impl ClusterMatches {
    pub fn get(&self, cluster: &str) -> &[MatchOccurrence] {
        self.entries
            .iter()
            .find(|e| e.cluster == cluster)
            .map(|e| e.occurrences.as_slice())
            .unwrap_or(&[])
    }

    pub fn count(&self, cluster: &str) -> usize {
        self.get(cluster).len()
    }

    /// Occurrences of `cluster` whose offset lies in `range`.
    pub fn in_range(&self, cluster: &str, range: Range<usize>) -> &[MatchOccurrence] {
        let occ = self.get(cluster);
        let lo = occ.partition_point(|o| o.offset < range.start);
        let hi = occ.partition_point(|o| o.offset < range.end);
        &occ[lo..hi.max(lo)]
    }

    pub fn count_in(&self, cluster: &str, range: Range<usize>) -> usize {
        self.in_range(cluster, range).len()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.occurrences.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClusterHits> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Match `text` against `clusters`, compiling them on the fly.
///
/// Analyses should prefer `OccurrenceIndex`, which compiles once per table.
pub fn match_clusters(
    text: &str,
    clusters: &[KeywordCluster],
    mode: MatchMode,
) -> Result<ClusterMatches> {
    let mut entries = Vec::with_capacity(clusters.len());
    for cluster in clusters {
        let occurrences = match CompiledCluster::compile(cluster, mode)? {
            Some(compiled) => compiled.find_all(text),
            None => Vec::new(),
        };
        entries.push(ClusterHits {
            cluster: cluster.name.clone(),
            occurrences,
        });
    }
    Ok(ClusterMatches { entries })
}

/// Every cluster of a `ClusterTable`, compiled once and shared across analyses.
#[derive(Debug, Clone, Default)]
pub struct CompiledClusters {
    groups: BTreeMap<ClusterGroup, Vec<CompiledCluster>>,
    declared: BTreeMap<ClusterGroup, Vec<String>>,
}

impl CompiledClusters {
    pub fn compile(table: &ClusterTable) -> Result<Self> {
        let mut groups = BTreeMap::new();
        let mut declared = BTreeMap::new();
        for (group, clusters) in table.groups() {
            let mode = group.match_mode();
            let mut compiled = Vec::with_capacity(clusters.len());
            for cluster in clusters {
                if let Some(c) = CompiledCluster::compile(cluster, mode)
                    .with_context(|| format!("failed to compile {group} clusters"))?
                {
                    compiled.push(c);
                }
            }
            declared.insert(group, clusters.iter().map(|c| c.name.clone()).collect());
            groups.insert(group, compiled);
        }
        Ok(Self { groups, declared })
    }

    pub fn cluster_names(&self, group: ClusterGroup) -> &[String] {
        self.declared.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Shared per-document occurrence index built in a single matcher pass.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceIndex {
    groups: BTreeMap<ClusterGroup, ClusterMatches>,
}

impl OccurrenceIndex {
    pub fn build(document: &Document, clusters: &CompiledClusters) -> Self {
        let text = document.text();
        let groups = clusters
            .groups
            .par_iter()
            .map(|(group, compiled)| {
                let found: BTreeMap<&str, Vec<MatchOccurrence>> = compiled
                    .iter()
                    .map(|c| (c.name(), c.find_all(text)))
                    .collect();
                // Keep declaration order, including clusters with no keywords.
                let entries = clusters
                    .cluster_names(*group)
                    .iter()
                    .map(|name| ClusterHits {
                        cluster: name.clone(),
                        occurrences: found.get(name.as_str()).cloned().unwrap_or_default(),
                    })
                    .collect();
                (*group, ClusterMatches { entries })
            })
            .collect();
        Self { groups }
    }

    pub fn group(&self, group: ClusterGroup) -> &ClusterMatches {
        self.groups.get(&group).unwrap_or(&EMPTY_MATCHES)
    }
}
