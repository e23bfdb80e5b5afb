use std::fmt;
use std::ops::Range;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::analyzer::{AnalysisContext, DimensionAnalyzer};
use crate::clusters::{
    ClusterGroup, CONFLICT_EXTERNAL, CONFLICT_INTERNAL, CONFLICT_INTERPERSONAL, RESOLUTION,
};
use crate::document::Document;
use crate::matcher::ClusterMatches;
use crate::types::{Dimension, DimensionScore};
use crate::window::density_per_thousand;

/// Chunks with fewer conflict hits than this are low-conflict sections.
pub const LOW_CONFLICT_MIN_HITS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    Internal,
    External,
    Interpersonal,
}

impl ConflictKind {
    pub const ALL: [ConflictKind; 3] = [
        ConflictKind::Internal,
        ConflictKind::External,
        ConflictKind::Interpersonal,
    ];

    fn cluster(&self) -> &'static str {
        match self {
            ConflictKind::Internal => CONFLICT_INTERNAL,
            ConflictKind::External => CONFLICT_EXTERNAL,
            ConflictKind::Interpersonal => CONFLICT_INTERPERSONAL,
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cluster())
    }
}

/// One sentence's hit on one conflict set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictEvent {
    pub kind: ConflictKind,
    pub sentence: usize,
    pub keywords: usize,
    pub intensity: f64,
}

/// Intensity grows with the number of same-set keywords in one sentence.
pub fn event_intensity(keywords: usize) -> f64 {
    if keywords == 0 {
        return 0.0;
    }
    (30.0 + 20.0 * (keywords - 1) as f64).min(100.0)
}

/// Per sentence, one event for each conflict set it touches.
pub fn conflict_events(document: &Document, matches: &ClusterMatches) -> Vec<ConflictEvent> {
    let mut events = Vec::new();
    for (i, sentence) in document.sentences().iter().enumerate() {
        for kind in ConflictKind::ALL {
            let k = matches.count_in(kind.cluster(), sentence.span());
            if k > 0 {
                events.push(ConflictEvent {
                    kind,
                    sentence: i,
                    keywords: k,
                    intensity: event_intensity(k),
                });
            }
        }
    }
    events
}

/// Fixed-size byte chunks, each end nudged forward to a char boundary.
pub fn text_chunks(text: &str, chunk: usize) -> Vec<Range<usize>> {
    let chunk = chunk.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + chunk).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }
        chunks.push(start..end);
        start = end;
    }
    chunks
}

pub struct ConflictAnalyzer;

impl DimensionAnalyzer for ConflictAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::Conflict
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<DimensionScore> {
        let doc = ctx.document;
        let words = doc.word_count();
        if words == 0 || doc.sentence_count() == 0 {
            return Ok(DimensionScore::degenerate(
                Dimension::Conflict,
                "No sentences to track conflict in",
            ));
        }

        let matches = ctx.index.group(ClusterGroup::Conflict);
        let resolutions = ctx.index.group(ClusterGroup::Resolution).count(RESOLUTION);
        let events = conflict_events(doc, matches);

        let chunks = text_chunks(doc.text(), ctx.settings.conflict_chunk_chars);
        let low_sections: Vec<&Range<usize>> = chunks
            .iter()
            .filter(|c| {
                ConflictKind::ALL
                    .iter()
                    .map(|k| matches.count_in(k.cluster(), (*c).clone()))
                    .sum::<usize>()
                    < LOW_CONFLICT_MIN_HITS
            })
            .collect();

        if events.is_empty() {
            return Ok(DimensionScore::degenerate(Dimension::Conflict, "No conflict detected")
                .with_detail(format!(
                    "{} of {} sections are low-conflict",
                    low_sections.len(),
                    chunks.len()
                ))
                .with_metric("conflict_events", 0.0)
                .with_metric("low_conflict_sections", low_sections.len() as f64)
                .with_insight(
                    "No conflict detected; give the protagonist something to want and something in the way",
                ));
        }

        let density = density_per_thousand(events.len(), words);
        let kinds_present: Vec<ConflictKind> = ConflictKind::ALL
            .into_iter()
            .filter(|k| events.iter().any(|e| e.kind == *k))
            .collect();
        let max_intensity = events.iter().map(|e| e.intensity).fold(0.0, f64::max);

        let raw = (density * 5.0).min(50.0)
            + (kinds_present.len() as f64 * 10.0).min(30.0)
            + (max_intensity / 5.0).min(20.0);

        let mut score = DimensionScore::new(Dimension::Conflict, raw)
            .with_detail(format!(
                "{} conflict moments ({density:.1} per 1,000 words)",
                events.len()
            ))
            .with_metric("conflict_events", events.len() as f64)
            .with_metric("conflict_density", density)
            .with_metric("conflict_types", kinds_present.len() as f64)
            .with_metric("max_intensity", max_intensity)
            .with_metric("resolutions", resolutions as f64)
            .with_metric("low_conflict_sections", low_sections.len() as f64);

        for kind in ConflictKind::ALL {
            let of_kind: Vec<&ConflictEvent> = events.iter().filter(|e| e.kind == kind).collect();
            if of_kind.is_empty() {
                continue;
            }
            let avg = of_kind.iter().map(|e| e.intensity).sum::<f64>() / of_kind.len() as f64;
            score = score.with_detail(format!(
                "{kind}: {} moments, average intensity {avg:.0}",
                of_kind.len()
            ));
        }
        score = score.with_detail(format!("{resolutions} resolution markers"));
        for section in low_sections.iter().take(5) {
            score = score.with_detail(format!(
                "Low-conflict section at bytes {}-{}",
                section.start, section.end
            ));
        }

        if low_sections.len() * 2 > chunks.len() {
            score = score.with_insight(format!(
                "{} of {} sections carry little conflict; raise the stakes in the quieter stretches",
                low_sections.len(),
                chunks.len()
            ));
        }
        if kinds_present.len() < 2 {
            score = score.with_insight(
                "Conflict comes from a single source; layer internal, external and interpersonal tension",
            );
        }
        if resolutions == 0 {
            score = score
                .with_insight("No resolution markers found; make sure conflicts pay off or resolve");
        }
        if density < 5.0 {
            score = score.with_insight("Conflict is sparse relative to the length of the text");
        }
        Ok(score)
    }
}
